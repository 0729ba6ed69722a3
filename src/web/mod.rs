//! Presentation layer: the browse page and the card fragments its script
//! requests while scrolling.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::error;

use crate::api::handlers::{parse_page, PodcastsQuery};
use crate::api::AppState;

pub mod assets;
pub mod render;

const PAGE_TITLE: &str = "Podcast Summarizer";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/partials/podcasts", get(podcast_cards))
}

async fn index() -> Html<String> {
    Html(render::render_page(PAGE_TITLE))
}

async fn podcast_cards(
    State(state): State<AppState>,
    Query(params): Query<PodcastsQuery>,
) -> Response {
    let Ok(page_no) = parse_page(params.page.as_deref()) else {
        return (
            StatusCode::BAD_REQUEST,
            Html(render::render_error("Invalid page number")),
        )
            .into_response();
    };

    match state
        .episodes
        .search(params.query.as_deref(), state.page_size, page_no)
        .await
    {
        Ok(page) => {
            let has_more = page.has_more(page_no, state.page_size);
            Html(render::render_card_page(&page, page_no, has_more)).into_response()
        }
        Err(err) => {
            error!(error = %format!("{err:#}"), "failed to fetch podcasts");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render::render_error("Failed to fetch podcasts")),
            )
                .into_response()
        }
    }
}
