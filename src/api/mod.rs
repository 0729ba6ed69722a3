//! HTTP surface: JSON API routes plus the presentation pages.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::listennotes::EpisodeSource;
use crate::summary::SummaryService;
use crate::web;

pub mod handlers;

/// Shared per-request state. Cloned into every handler; the pool and clients
/// inside are reference-counted handles owned by `main`.
#[derive(Clone)]
pub struct AppState {
    pub summaries: SummaryService,
    pub episodes: Arc<dyn EpisodeSource>,
    pub page_size: u32,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/podcasts", get(handlers::list_podcasts))
        .route(
            "/api/summary",
            get(handlers::get_summary).post(handlers::create_summary),
        )
        .route("/health", get(handlers::health))
        .merge(web::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
