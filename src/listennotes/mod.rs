use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::{debug, warn};

use crate::config::{Config, DEFAULT_QUERY};
use crate::listennotes::model::{RawEpisode, RawSearchResponse};
use crate::model::{Episode, SearchPage};

pub mod model;

const LISTEN_NOTES_API_BASE: &str = "https://listen-api-test.listennotes.com/api/v2/";

/// Source of podcast episodes: free-text search and lookup by id.
#[async_trait]
pub trait EpisodeSource: Send + Sync {
    /// Search episodes. `page` is 1-based; `None` or blank `query` searches the
    /// source's default term.
    async fn search(&self, query: Option<&str>, limit: u32, page: u32) -> Result<SearchPage>;

    async fn get_episode(&self, id: &str) -> Result<Episode>;
}

#[derive(Clone)]
pub struct ListenNotesClient {
    http: Client,
    base_url: Url,
    api_key: String,
    default_query: String,
}

impl fmt::Debug for ListenNotesClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenNotesClient")
            .field("base_url", &self.base_url)
            .field("default_query", &self.default_query)
            .finish_non_exhaustive()
    }
}

impl ListenNotesClient {
    pub fn new(api_key: String) -> Result<Self> {
        let base_url = Url::parse(LISTEN_NOTES_API_BASE).context("invalid Listen Notes URL")?;
        Self::with_base_url(api_key, base_url)
    }

    pub fn with_base_url(api_key: String, mut base_url: Url) -> Result<Self> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = Client::builder()
            .user_agent("podcast-summarizer/0.1")
            .no_proxy()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url,
            api_key,
            default_query: DEFAULT_QUERY.to_string(),
        })
    }

    pub fn with_default_query(mut self, query: impl Into<String>) -> Self {
        self.default_query = query.into();
        self
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let client = match &cfg.listen_notes.base_url {
            Some(url) => {
                let url = Url::parse(url).context("invalid listen_notes.base_url")?;
                Self::with_base_url(cfg.listen_notes.api_key.clone(), url)?
            }
            None => Self::new(cfg.listen_notes.api_key.clone())?,
        };
        Ok(client.with_default_query(cfg.app.default_query.clone()))
    }

    pub fn build_search_request(
        &self,
        query: Option<&str>,
        limit: u32,
        page: u32,
    ) -> Result<reqwest::Request> {
        let q = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(self.default_query.as_str());
        let offset = u64::from(page.max(1) - 1) * u64::from(limit);
        let endpoint = self
            .base_url
            .join("search")
            .context("invalid Listen Notes base URL")?;
        self.http
            .get(endpoint)
            .header("X-ListenAPI-Key", &self.api_key)
            .query(&[
                ("q", q.to_string()),
                ("type", "episode".to_string()),
                ("language", "English".to_string()),
                ("safe_mode", "1".to_string()),
                ("page_size", limit.to_string()),
                ("offset", offset.to_string()),
            ])
            .build()
            .context("failed to build Listen Notes search request")
    }

    pub fn build_episode_request(&self, id: &str) -> Result<reqwest::Request> {
        let mut endpoint = self
            .base_url
            .join("episodes/")
            .context("invalid Listen Notes base URL")?;
        endpoint
            .path_segments_mut()
            .map_err(|_| anyhow!("Listen Notes base URL cannot carry a path"))?
            .pop_if_empty()
            .push(id);
        self.http
            .get(endpoint)
            .header("X-ListenAPI-Key", &self.api_key)
            .build()
            .context("failed to build Listen Notes episode request")
    }

    async fn execute<T: DeserializeOwned>(&self, request: reqwest::Request) -> Result<T> {
        let url = request.url().clone();
        debug!(url = %url.path(), "listen notes request");
        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach Listen Notes")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(%status, path = %url.path(), "Listen Notes API error: {}", body);
            return Err(anyhow!("listen notes error {}: {}", status, body));
        }

        let body = res
            .text()
            .await
            .context("failed to read Listen Notes response")?;
        serde_json::from_str(&body).context("invalid Listen Notes response JSON")
    }
}

#[async_trait]
impl EpisodeSource for ListenNotesClient {
    async fn search(&self, query: Option<&str>, limit: u32, page: u32) -> Result<SearchPage> {
        let request = self.build_search_request(query, limit, page)?;
        let raw: RawSearchResponse = self.execute(request).await?;
        SearchPage::try_from(raw)
    }

    async fn get_episode(&self, id: &str) -> Result<Episode> {
        let request = self.build_episode_request(id)?;
        let raw: RawEpisode = self.execute(request).await?;
        Episode::try_from(raw).with_context(|| format!("malformed episode {}", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn client() -> ListenNotesClient {
        ListenNotesClient::new("ln-key".into()).unwrap()
    }

    fn query_map(request: &reqwest::Request) -> HashMap<String, String> {
        request.url().query_pairs().into_owned().collect()
    }

    #[test]
    fn search_request_maps_page_to_offset() {
        let request = client()
            .build_search_request(Some("rust"), 10, 3)
            .unwrap();
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/api/v2/search");
        let params = query_map(&request);
        assert_eq!(params["q"], "rust");
        assert_eq!(params["type"], "episode");
        assert_eq!(params["language"], "English");
        assert_eq!(params["safe_mode"], "1");
        assert_eq!(params["page_size"], "10");
        assert_eq!(params["offset"], "20");
        assert_eq!(
            request
                .headers()
                .get("X-ListenAPI-Key")
                .and_then(|h| h.to_str().ok())
                .unwrap(),
            "ln-key"
        );
    }

    #[test]
    fn search_request_falls_back_to_default_query() {
        let c = client().with_default_query("technology");
        let params = query_map(&c.build_search_request(None, 5, 0).unwrap());
        assert_eq!(params["q"], "technology");
        assert_eq!(params["offset"], "0");

        let params = query_map(&c.build_search_request(Some("  "), 5, 1).unwrap());
        assert_eq!(params["q"], "technology");
    }

    #[test]
    fn default_query_comes_from_config() {
        let params = query_map(&client().build_search_request(None, 5, 1).unwrap());
        assert_eq!(params["q"], crate::config::DEFAULT_QUERY);
    }

    #[test]
    fn episode_request_escapes_id() {
        let request = client().build_episode_request("abc/123").unwrap();
        assert_eq!(request.url().path(), "/api/v2/episodes/abc%2F123");
    }

    #[test]
    fn base_url_without_trailing_slash_is_normalized() {
        let url = Url::parse("http://127.0.0.1:9/api/v2").unwrap();
        let c = ListenNotesClient::with_base_url("k".into(), url).unwrap();
        let request = c.build_episode_request("ep").unwrap();
        assert_eq!(request.url().path(), "/api/v2/episodes/ep");
    }

    #[test]
    fn debug_redacts_api_key() {
        let rendered = format!("{:?}", client());
        assert!(!rendered.contains("ln-key"));
    }
}
