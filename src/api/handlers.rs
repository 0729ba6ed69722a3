use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;

use super::AppState;
use crate::error::{ApiError, ApiResult};
use crate::model::{SearchPage, Summary};

const MISSING_ID: &str = "Podcast ID is required";

#[derive(Debug, Deserialize)]
pub struct PodcastsQuery {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSummaryBody {
    #[serde(rename = "podcastId", default)]
    pub podcast_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PodcastsResponse {
    pub podcasts: SearchPage,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: Summary,
}

/// Parse a 1-based page number; absent or blank means the first page.
pub fn parse_page(raw: Option<&str>) -> ApiResult<u32> {
    match raw.map(str::trim).filter(|p| !p.is_empty()) {
        None => Ok(1),
        Some(p) => p
            .parse::<u32>()
            .map(|n| n.max(1))
            .map_err(|_| ApiError::validation("Invalid page number")),
    }
}

/// Reject absent or blank ids. Non-blank ids are looked up exactly as sent.
fn required_id(raw: Option<String>) -> ApiResult<String> {
    raw.filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::validation(MISSING_ID))
}

#[instrument(skip_all)]
pub async fn list_podcasts(
    State(state): State<AppState>,
    Query(params): Query<PodcastsQuery>,
) -> ApiResult<Json<PodcastsResponse>> {
    let page = parse_page(params.page.as_deref())?;
    let podcasts = state
        .episodes
        .search(params.query.as_deref(), state.page_size, page)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch podcasts", e))?;
    Ok(Json(PodcastsResponse { podcasts }))
}

/// Retrieve: return the stored summary or 404. Never generates.
#[instrument(skip_all)]
pub async fn get_summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryQuery>,
) -> ApiResult<Json<SummaryResponse>> {
    let podcast_id = required_id(params.id)?;
    let summary = state
        .summaries
        .retrieve(&podcast_id)
        .await
        .map_err(|e| ApiError::upstream("Failed to retrieve podcast summary", e))?
        .ok_or_else(|| ApiError::not_found("Summary not found"))?;
    Ok(Json(SummaryResponse { summary }))
}

/// RetrieveOrCreate: 200 with the stored summary, or 201 after generating one.
#[instrument(skip_all)]
pub async fn create_summary(
    State(state): State<AppState>,
    body: Result<Json<CreateSummaryBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SummaryResponse>)> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(%rejection, "rejected summary request body");
        ApiError::validation(MISSING_ID)
    })?;
    let podcast_id = required_id(body.podcast_id)?;

    let outcome = state
        .summaries
        .retrieve_or_create(&podcast_id)
        .await
        .map_err(|e| ApiError::upstream("Failed to generate podcast summary", e))?;
    let status = if outcome.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(SummaryResponse {
            summary: outcome.into_summary(),
        }),
    ))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
