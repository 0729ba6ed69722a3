//! Configuration loader and validator for the podcast summarizer.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub listen_notes: ListenNotes,
    pub gemini: Gemini,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub listen_addr: String,
    pub data_dir: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Search term used when the client browses without a query.
    #[serde(default = "default_query")]
    pub default_query: String,
}

/// Listen Notes search API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListenNotes {
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Gemini generative-language API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Gemini {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_page_size() -> u32 {
    10
}

/// Search term used when a browse request carries no query.
pub const DEFAULT_QUERY: &str = "podcast";

/// Gemini model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

fn default_query() -> String {
    DEFAULT_QUERY.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl App {
    /// `data_dir` with a leading `~/` expanded to `$HOME`.
    pub fn resolved_data_dir(&self) -> String {
        match self.data_dir.strip_prefix("~/") {
            Some(rest) => match std::env::var("HOME") {
                Ok(home) => format!("{}/{}", home.trim_end_matches('/'), rest),
                Err(_) => self.data_dir.clone(),
            },
            None => self.data_dir.clone(),
        }
    }
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(self.app.resolved_data_dir())
    }

    /// `DATABASE_URL` if set, otherwise a SQLite file under the data dir.
    pub fn database_url(&self) -> String {
        std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite://{}/summaries.db", self.app.resolved_data_dir()))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("LISTEN_NOTES_API_KEY") {
            self.listen_notes.api_key = key;
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.gemini.api_key = key;
        }
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
/// - API keys may be supplied through `LISTEN_NOTES_API_KEY` / `GEMINI_API_KEY`.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let mut cfg: Config = serde_yaml::from_str(&content)?;
    cfg.apply_env_overrides();
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.listen_addr.trim().is_empty() {
        return Err(ConfigError::Invalid("app.listen_addr must be non-empty"));
    }
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }
    if cfg.app.page_size == 0 {
        return Err(ConfigError::Invalid("app.page_size must be > 0"));
    }
    if cfg.app.default_query.trim().is_empty() {
        return Err(ConfigError::Invalid("app.default_query must be non-empty"));
    }

    if cfg.listen_notes.api_key.trim().is_empty() {
        return Err(ConfigError::Invalid("listen_notes.api_key must be non-empty"));
    }
    if let Some(url) = &cfg.listen_notes.base_url {
        if reqwest::Url::parse(url).is_err() {
            return Err(ConfigError::Invalid("listen_notes.base_url must be a valid URL"));
        }
    }

    if cfg.gemini.api_key.trim().is_empty() {
        return Err(ConfigError::Invalid("gemini.api_key must be non-empty"));
    }
    if cfg.gemini.model.trim().is_empty() {
        return Err(ConfigError::Invalid("gemini.model must be non-empty"));
    }
    if let Some(url) = &cfg.gemini.base_url {
        if reqwest::Url::parse(url).is_err() {
            return Err(ConfigError::Invalid("gemini.base_url must be a valid URL"));
        }
    }

    Ok(())
}

/// Returns a complete example YAML configuration.
pub fn example() -> &'static str {
    r#"app:
  listen_addr: "127.0.0.1:3000"
  data_dir: "./data"
  page_size: 10
  default_query: "podcast"

listen_notes:
  api_key: "YOUR_LISTEN_NOTES_API_KEY"
  # base_url: "https://listen-api-test.listennotes.com/api/v2/"

gemini:
  api_key: "YOUR_GEMINI_API_KEY"
  model: "gemini-1.5-pro"
"#
}
