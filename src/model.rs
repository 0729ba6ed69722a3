use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Show-level metadata attached to an episode.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PodcastRef {
    pub id: String,
    pub title: String,
    pub publisher: String,
}

/// A single podcast episode as returned by the search API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Episode {
    pub id: String,
    pub title: String,
    pub title_original: String,
    pub description: String,
    pub description_highlighted: String,
    pub audio: String,
    pub image: String,
    pub thumbnail: String,
    pub podcast: PodcastRef,
    pub audio_length_sec: u64,
    pub pub_date_ms: i64,
}

/// One page of search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchPage {
    pub count: u32,
    pub total: u64,
    pub results: Vec<Episode>,
}

impl SearchPage {
    /// Whether results remain past this page, given the 1-based page number
    /// and the page size that produced it.
    pub fn has_more(&self, page: u32, page_size: u32) -> bool {
        let seen = u64::from(page.max(1) - 1) * u64::from(page_size) + u64::from(self.count);
        self.count > 0 && seen < self.total
    }
}

/// A generated episode summary as persisted by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Summary {
    pub id: String,
    pub podcast_id: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}
