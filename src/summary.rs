//! Summary retrieval and on-demand generation.
//!
//! `retrieve` only reads the store. `retrieve_or_create` reads the store and,
//! on a miss, fetches the episode, generates a summary and persists it. A store
//! hit never reaches either upstream.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

use crate::db::{self, Pool, StoredSummary};
use crate::gemini::SummaryGenerator;
use crate::listennotes::EpisodeSource;
use crate::model::Summary;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("summary store failed: {0:#}")]
    Store(anyhow::Error),
    #[error("episode fetch failed: {0:#}")]
    Episode(anyhow::Error),
    #[error("summary generation failed: {0:#}")]
    Generation(anyhow::Error),
}

/// How `retrieve_or_create` produced its summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// Already stored; no generation happened in this call.
    Cached(Summary),
    /// Generated and persisted by this call.
    Created(Summary),
}

impl SummaryOutcome {
    pub fn into_summary(self) -> Summary {
        match self {
            SummaryOutcome::Cached(s) | SummaryOutcome::Created(s) => s,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, SummaryOutcome::Created(_))
    }
}

#[derive(Clone)]
pub struct SummaryService {
    pool: Pool,
    episodes: Arc<dyn EpisodeSource>,
    generator: Arc<dyn SummaryGenerator>,
}

impl SummaryService {
    pub fn new(
        pool: Pool,
        episodes: Arc<dyn EpisodeSource>,
        generator: Arc<dyn SummaryGenerator>,
    ) -> Self {
        Self {
            pool,
            episodes,
            generator,
        }
    }

    #[instrument(skip(self))]
    pub async fn retrieve(&self, podcast_id: &str) -> Result<Option<Summary>, SummaryError> {
        db::find_summary_by_podcast_id(&self.pool, podcast_id)
            .await
            .map_err(SummaryError::Store)
    }

    #[instrument(skip(self))]
    pub async fn retrieve_or_create(
        &self,
        podcast_id: &str,
    ) -> Result<SummaryOutcome, SummaryError> {
        if let Some(existing) = self.retrieve(podcast_id).await? {
            return Ok(SummaryOutcome::Cached(existing));
        }

        let episode = self
            .episodes
            .get_episode(podcast_id)
            .await
            .map_err(SummaryError::Episode)?;
        let text = self
            .generator
            .generate(&episode)
            .await
            .map_err(SummaryError::Generation)?;

        let stored = db::create_summary(&self.pool, podcast_id, &text)
            .await
            .map_err(SummaryError::Store)?;
        match stored {
            StoredSummary::Inserted(summary) => {
                info!(podcast_id, summary_id = %summary.id, "stored new summary");
                Ok(SummaryOutcome::Created(summary))
            }
            StoredSummary::Existing(summary) => {
                info!(podcast_id, "summary stored concurrently; returning existing row");
                Ok(SummaryOutcome::Cached(summary))
            }
        }
    }
}
