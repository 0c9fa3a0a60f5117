//! Runtime configuration.
//!
//! Every field has a default, so an empty or missing config file yields a
//! working setup pointed at the public sources. A YAML file may override
//! any subset:
//!
//! ```yaml
//! cache_dir: ./saved_games
//! batch_delay_ms: 2500
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `{id}.html` copies of fetched pages.
    pub cache_dir: PathBuf,
    /// Root of the per-match media directories.
    pub media_root: PathBuf,
    /// Host serving the live episode pages.
    pub page_base_url: String,
    /// Host of the snapshot archive (CDX index and `/web/` captures).
    pub archive_base_url: String,
    /// Host serving spreadsheet CSV exports.
    pub sheet_base_url: String,
    pub request_timeout_secs: u64,
    /// Pause after each networked fetch in a batch download.
    pub batch_delay_ms: u64,
    /// Store pages fetched from the network in `cache_dir`.
    pub write_cache: bool,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("data/saved_games"),
            media_root: PathBuf::from("data/question_media"),
            page_base_url: "http://www.j-archive.com".to_string(),
            archive_base_url: "http://web.archive.org".to_string(),
            sheet_base_url: "https://docs.google.com".to_string(),
            request_timeout_secs: 30,
            batch_delay_ms: 1000,
            write_cache: true,
            user_agent: concat!("trivia_ingest/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Load a YAML config file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml(&text)?;
        info!("Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Build the HTTP client shared by every networked source.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .timeout(self.request_timeout())
            .user_agent(self.user_agent.clone())
            .build()?;
        Ok(client)
    }
}
