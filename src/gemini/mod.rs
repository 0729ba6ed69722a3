use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::fmt;
use tracing::{debug, info, warn};

use crate::config::{Config, DEFAULT_MODEL};
use crate::gemini::model::{
    Content, GenerateContentRequest, GenerateContentResponse, HarmBlockThreshold, HarmCategory,
    Part, SafetySetting,
};
use crate::model::Episode;

pub mod model;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/";

/// Finish reasons that mean the candidate text was withheld or cut.
const BLOCKED_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "LANGUAGE",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

/// Turns an episode's metadata into a natural-language summary.
#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    async fn generate(&self, episode: &Episode) -> Result<String>;
}

#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: Url,
    api_key: String,
    model: String,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        let base_url = Url::parse(GEMINI_API_BASE).context("invalid Gemini URL")?;
        Self::with_base_url(api_key, model, base_url)
    }

    pub fn with_base_url(api_key: String, model: String, mut base_url: Url) -> Result<Self> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = Client::builder()
            .user_agent("podcast-summarizer/0.1")
            .no_proxy()
            .build()
            .context("failed to build HTTP client")?;
        let model = if model.trim().is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            model
        };
        Ok(Self {
            http,
            base_url,
            api_key,
            model,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        match &cfg.gemini.base_url {
            Some(url) => {
                let url = Url::parse(url).context("invalid gemini.base_url")?;
                Self::with_base_url(cfg.gemini.api_key.clone(), cfg.gemini.model.clone(), url)
            }
            None => Self::new(cfg.gemini.api_key.clone(), cfg.gemini.model.clone()),
        }
    }

    pub fn build_request(&self, body: &GenerateContentRequest) -> Result<reqwest::Request> {
        let endpoint = self
            .base_url
            .join(&format!("v1beta/models/{}:generateContent", self.model))
            .context("invalid Gemini base URL")?;
        self.http
            .post(endpoint)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .build()
            .context("failed to build Gemini request")
    }

    async fn generate_content(&self, prompt: String) -> Result<String> {
        let body = build_generate_request(prompt);
        let request = self.build_request(&body)?;
        debug!(model = %self.model, "gemini generateContent request");

        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach Gemini")?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(%status, "Gemini API error: {}", body);
            return Err(anyhow!("gemini error {}: {}", status, body));
        }

        let payload: GenerateContentResponse =
            res.json().await.context("invalid Gemini response JSON")?;
        response_text(payload)
    }
}

#[async_trait]
impl SummaryGenerator for GeminiClient {
    async fn generate(&self, episode: &Episode) -> Result<String> {
        if episode.title.trim().is_empty() || episode.description.trim().is_empty() {
            return Err(anyhow!(
                "episode {} needs a title and description to summarize",
                episode.id
            ));
        }
        let text = self.generate_content(build_prompt(episode)).await?;
        info!(episode = %episode.id, chars = text.len(), "generated summary");
        Ok(text)
    }
}

/// Prompt asking for a structured, paragraph-formatted episode summary.
pub fn build_prompt(episode: &Episode) -> String {
    format!(
        "Please provide a comprehensive summary of the following podcast episode:\n\
         \n\
         Title: {title}\n\
         Publisher: {publisher}\n\
         Description: {description}\n\
         \n\
         The summary should include:\n\
         1. Main topics and themes discussed\n\
         2. Key points and insights\n\
         3. Any notable quotes or takeaways\n\
         4. A brief conclusion\n\
         \n\
         Format the summary in clear paragraphs with proper spacing.",
        title = episode.title,
        publisher = episode.podcast.publisher,
        description = episode.description,
    )
}

/// Block medium-and-above harm in every category the API filters.
pub fn safety_settings() -> Vec<SafetySetting> {
    [
        HarmCategory::Harassment,
        HarmCategory::HateSpeech,
        HarmCategory::SexuallyExplicit,
        HarmCategory::DangerousContent,
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold: HarmBlockThreshold::BlockMediumAndAbove,
    })
    .collect()
}

pub fn build_generate_request(prompt: String) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part { text: Some(prompt) }],
        }],
        safety_settings: safety_settings(),
    }
}

/// Extract the generated text, treating safety blocks and empty output as errors.
pub fn response_text(response: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(anyhow!("prompt blocked: {}", reason));
    }
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no candidates in Gemini response"))?;
    if let Some(reason) = candidate
        .finish_reason
        .as_deref()
        .filter(|r| BLOCKED_FINISH_REASONS.contains(r))
    {
        return Err(anyhow!("candidate blocked: {}", reason));
    }
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(anyhow!("empty Gemini response"));
    }
    Ok(text)
}
