//! Route table for the track server: page, data endpoints, static files.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::handlers::{
    base::{health, to_browser},
    browser::browser_page,
    data::{bam_group_tracks, bigwig_group_tracks, default_config},
};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.static_dir);
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/",         get(to_browser))
        .route("/index",    get(to_browser))
        .route("/browser",  get(browser_page))
        .route("/browser/", get(browser_page))

        // Data endpoints
        .route("/data/default",           get(default_config))
        .route("/data/bigWigsTrack/{id}", get(bigwig_group_tracks))
        .route("/data/bamTrack/{id}",     get(bam_group_tracks))

        .route("/health", get(health))

        // Static files
        .nest_service("/static", static_dir)

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
