//! Genome browser page with the BigWig / BAM group pickers.

use axum::{extract::State, response::Html};
use igvmb_common::TrackCategory;
use minijinja::context;

use crate::error::ApiError;
use crate::state::{SharedState, BROWSER_TEMPLATE};
use crate::tracks::{bam_listing, bigwig_listing};

pub async fn browser_page(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    let bigwigs = state.catalog.object_groups(TrackCategory::BigWig).await?;
    let bams = state.catalog.object_groups(TrackCategory::Bam).await?;

    let template = state.templates.get_template(BROWSER_TEMPLATE)?;
    let html = template.render(context! {
        igv_js_url => &state.igv_js_url,
        bigwig_list => bigwig_listing(&bigwigs),
        bam_list => bam_listing(&bams),
        bigwig_prefix => TrackCategory::BigWig.path_prefix(),
        bam_prefix => TrackCategory::Bam.path_prefix(),
    })?;
    Ok(Html(html))
}
