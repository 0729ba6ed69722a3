//! Wire shapes returned by the Listen Notes API.
//!
//! Search results carry `*_original` / `*_highlighted` variants while the
//! episode lookup endpoint carries plain `title` / `description`; both are
//! normalized into [`Episode`] here so nothing past the adapter sees raw JSON.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tracing::warn;

use crate::model::{Episode, PodcastRef, SearchPage};

#[derive(Deserialize, Debug, Default)]
pub struct RawPodcast {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_original: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub publisher_original: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct RawEpisode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_original: Option<String>,
    #[serde(default)]
    pub title_highlighted: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_original: Option<String>,
    #[serde(default)]
    pub description_highlighted: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub podcast: Option<RawPodcast>,
    #[serde(default)]
    pub audio_length_sec: Option<u64>,
    #[serde(default)]
    pub pub_date_ms: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct RawSearchResponse {
    #[serde(default)]
    pub results: Vec<RawEpisode>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub next_offset: Option<u64>,
}

fn first_non_empty(candidates: [Option<String>; 2]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
}

impl TryFrom<RawEpisode> for Episode {
    type Error = anyhow::Error;

    fn try_from(raw: RawEpisode) -> Result<Self> {
        if raw.id.trim().is_empty() {
            return Err(anyhow!("episode without id"));
        }
        let title = first_non_empty([raw.title, raw.title_original.clone()])
            .ok_or_else(|| anyhow!("episode {} has no title", raw.id))?;
        let title_original = raw.title_original.unwrap_or_else(|| title.clone());
        let description =
            first_non_empty([raw.description, raw.description_original]).unwrap_or_default();
        let description_highlighted = raw
            .description_highlighted
            .unwrap_or_else(|| description.clone());

        let podcast = raw.podcast.unwrap_or_default();
        let podcast = PodcastRef {
            id: podcast.id.unwrap_or_default(),
            title: first_non_empty([podcast.title, podcast.title_original]).unwrap_or_default(),
            publisher: first_non_empty([podcast.publisher, podcast.publisher_original])
                .unwrap_or_default(),
        };

        Ok(Episode {
            id: raw.id,
            title,
            title_original,
            description,
            description_highlighted,
            audio: raw.audio.unwrap_or_default(),
            image: raw.image.unwrap_or_default(),
            thumbnail: raw.thumbnail.unwrap_or_default(),
            podcast,
            audio_length_sec: raw.audio_length_sec.unwrap_or(0),
            pub_date_ms: raw.pub_date_ms.unwrap_or(0),
        })
    }
}

impl TryFrom<RawSearchResponse> for SearchPage {
    type Error = anyhow::Error;

    /// Malformed results are dropped with a warning; `count` excludes them.
    fn try_from(raw: RawSearchResponse) -> Result<Self> {
        let mut results = Vec::with_capacity(raw.results.len());
        let mut skipped = 0u32;
        for item in raw.results {
            match Episode::try_from(item) {
                Ok(ep) => results.push(ep),
                Err(err) => {
                    warn!(error = %err, "skipping malformed search result");
                    skipped += 1;
                }
            }
        }
        let count = raw
            .count
            .unwrap_or(results.len() as u32 + skipped)
            .saturating_sub(skipped);
        Ok(SearchPage {
            count,
            total: raw.total,
            results,
        })
    }
}
