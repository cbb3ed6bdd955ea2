//! JSON endpoints consumed by the track loader.

use axum::{
    extract::{Path, State},
    Json,
};
use igvmb_common::{BrowserConfig, Track, TrackCategory};
use tracing::debug;

use crate::error::ApiError;
use crate::state::SharedState;
use crate::tracks::{bam_tracks, bigwig_tracks, default_browser_config};

/// GET /data/default - initial browser configuration
pub async fn default_config(State(state): State<SharedState>) -> Result<Json<BrowserConfig>, ApiError> {
    let reference = state.catalog.reference().await?;
    let annotation = state.catalog.annotation().await?;
    Ok(Json(default_browser_config(&reference, annotation.as_ref())))
}

/// GET /data/bigWigsTrack/{id} - one wig track per file of the group
pub async fn bigwig_group_tracks(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Track>>, ApiError> {
    let group = state.catalog.object_group(TrackCategory::BigWig, &id).await?;
    let tracks = bigwig_tracks(&group);
    debug!(count = tracks.len(), "BigWig tracks built");
    Ok(Json(tracks))
}

/// GET /data/bamTrack/{id} - alignment track of the group
pub async fn bam_group_tracks(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Track>>, ApiError> {
    let group = state.catalog.object_group(TrackCategory::Bam, &id).await?;
    Ok(Json(bam_tracks(&group)))
}
