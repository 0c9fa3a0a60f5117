//! Episode page retrieval with a cache → snapshot archive → live site fallback.
//!
//! # Tiers
//!
//! | Tier | Source | On failure |
//! |------|--------|------------|
//! | Cache | `{cache_dir}/{id}.html` | escalate |
//! | Snapshot | latest CDX-listed capture under `/web/{timestamp}/{url}` | escalate |
//! | Direct | `{page_base}/showgame.php?game_id={id}` | terminal [`IngestError::Fetch`] |
//!
//! Tiers run strictly in order and the first document found is returned
//! untouched. Nothing here looks inside the markup.

use crate::config::Config;
use crate::error::{IngestError, Result, Tier};
use crate::models::MatchId;
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

static GAME_ID_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"game_id=(\d+)").unwrap());
static CLUE_FOOTER: Lazy<Selector> = Lazy::new(|| Selector::parse(".splash_clue_footer").unwrap());
static FOOTER_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// The page tiers, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageTier {
    Cache,
    Snapshot,
    Direct,
}

const PAGE_TIERS: [PageTier; 3] = [PageTier::Cache, PageTier::Snapshot, PageTier::Direct];

impl From<PageTier> for Tier {
    fn from(tier: PageTier) -> Self {
        match tier {
            PageTier::Cache => Tier::Cache,
            PageTier::Snapshot => Tier::Snapshot,
            PageTier::Direct => Tier::Direct,
        }
    }
}

/// What a single tier produced.
#[derive(Debug)]
enum Attempt {
    Found(String),
    Escalate(String),
    Terminal(IngestError),
}

/// One capture listed by the snapshot index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub timestamp: String,
    pub original: String,
}

#[derive(Debug, Clone)]
pub struct ArchiveFetcher {
    client: Client,
    cache_dir: PathBuf,
    page_base: String,
    archive_base: String,
    write_cache: bool,
    batch_delay: Duration,
}

impl ArchiveFetcher {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            cache_dir: config.cache_dir.clone(),
            page_base: config.page_base_url.trim_end_matches('/').to_string(),
            archive_base: config.archive_base_url.trim_end_matches('/').to_string(),
            write_cache: config.write_cache,
            batch_delay: config.batch_delay(),
        }
    }

    pub fn cache_path(&self, id: &MatchId) -> PathBuf {
        self.cache_dir.join(format!("{id}.html"))
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Canonical live URL of an episode page.
    pub fn page_url(&self, id: &MatchId) -> String {
        format!("{}/showgame.php?game_id={}", self.page_base, id)
    }

    /// Fetch the episode page for `id`.
    pub async fn fetch(&self, id: &MatchId) -> Result<String> {
        self.fetch_with_tier(id).await.map(|(doc, _)| doc)
    }

    /// Fetch the episode page and report which tier supplied it.
    ///
    /// A page that came from the network is written back to the cache when
    /// `write_cache` is set. A failed write is logged and the page is still
    /// returned.
    #[instrument(level = "info", skip_all, fields(%id))]
    pub async fn fetch_with_tier(&self, id: &MatchId) -> Result<(String, Tier)> {
        let (doc, tier) = self.run_tiers(id).await?;
        if tier != Tier::Cache && self.write_cache {
            if let Err(e) = self.store(id, &doc).await {
                warn!(error = %e, "Could not write page to cache");
            }
        }
        Ok((doc, tier))
    }

    async fn run_tiers(&self, id: &MatchId) -> Result<(String, Tier)> {
        check_page_id(id)?;
        for tier in PAGE_TIERS {
            let attempt = match tier {
                PageTier::Cache => self.from_cache(id).await,
                PageTier::Snapshot => self.from_snapshot(id).await,
                PageTier::Direct => self.from_direct(id).await,
            };

            match attempt {
                Attempt::Found(doc) => {
                    info!(tier = %Tier::from(tier), bytes = doc.len(), "Fetched episode page");
                    return Ok((doc, tier.into()));
                }
                Attempt::Escalate(reason) => {
                    debug!(tier = %Tier::from(tier), %reason, "Tier unavailable; escalating");
                }
                Attempt::Terminal(e) => {
                    error!(tier = %Tier::from(tier), error = %e, "Fetch failed");
                    return Err(e);
                }
            }
        }

        Err(IngestError::Fetch {
            id: id.to_string(),
            tier: Tier::Direct,
            reason: "no tier produced a document".to_string(),
        })
    }

    /// Write a document to the cache as one whole-file write.
    #[instrument(level = "debug", skip_all, fields(%id))]
    pub async fn store(&self, id: &MatchId, doc: &str) -> Result<()> {
        check_page_id(id)?;
        fs::create_dir_all(&self.cache_dir).await?;
        fs::write(self.cache_path(id), doc).await?;
        debug!(bytes = doc.len(), "Cached episode page");
        Ok(())
    }

    async fn from_cache(&self, id: &MatchId) -> Attempt {
        let path = self.cache_path(id);
        match fs::read_to_string(&path).await {
            Ok(doc) => Attempt::Found(doc),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Attempt::Escalate("not cached".to_string())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable cache entry");
                Attempt::Escalate(e.to_string())
            }
        }
    }

    async fn from_snapshot(&self, id: &MatchId) -> Attempt {
        match self.snapshot_document(id).await {
            Ok(Some(doc)) => Attempt::Found(doc),
            Ok(None) => Attempt::Escalate("no snapshots listed".to_string()),
            Err(e) => {
                warn!(error = %e, "Snapshot archive lookup failed");
                Attempt::Escalate(e.to_string())
            }
        }
    }

    async fn from_direct(&self, id: &MatchId) -> Attempt {
        match self.get_text(&self.page_url(id)).await {
            Ok(doc) => Attempt::Found(doc),
            Err(e) => Attempt::Terminal(IngestError::Fetch {
                id: id.to_string(),
                tier: Tier::Direct,
                reason: e.to_string(),
            }),
        }
    }

    /// Query the snapshot index and download the latest capture, if any.
    async fn snapshot_document(&self, id: &MatchId) -> Result<Option<String>> {
        let query = self.snapshot_query_url(id)?;
        let listing = self.get_text(query.as_str()).await?;
        debug!(listing = %truncate_for_log(&listing, 300), "Snapshot index response");

        let Some(snapshot) = latest_snapshot(&listing)? else {
            return Ok(None);
        };
        let capture = format!(
            "{}/web/{}/{}",
            self.archive_base, snapshot.timestamp, snapshot.original
        );
        info!(%capture, "Using archived capture");
        Ok(Some(self.get_text(&capture).await?))
    }

    fn snapshot_query_url(&self, id: &MatchId) -> Result<Url> {
        let page = self.page_url(id);
        let without_scheme = page
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(page.as_str());

        let mut url = Url::parse(&format!("{}/cdx/search/cdx", self.archive_base))?;
        url.query_pairs_mut()
            .append_pair("url", without_scheme)
            .append_pair("collapse", "digest")
            .append_pair("limit", "-2")
            .append_pair("fastLatest", "true")
            .append_pair("output", "json");
        Ok(url)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }

    /// Fetch many episode pages into the cache, one at a time.
    ///
    /// After every fetch that reached the network the configured batch
    /// delay is observed before the next identifier. Cache hits do not
    /// wait. An identifier only reports success once its page is on disk.
    /// Results are returned in input order.
    #[instrument(level = "info", skip_all, fields(count = ids.len()))]
    pub async fn download_all(&self, ids: &[MatchId]) -> Vec<(MatchId, Result<Tier>)> {
        let total = ids.len();
        let results: Vec<(MatchId, Result<Tier>)> = stream::iter(ids.iter().cloned().enumerate())
            .then(|(i, id)| async move {
                let outcome = match self.run_tiers(&id).await {
                    Ok((_, Tier::Cache)) => Ok(Tier::Cache),
                    Ok((doc, tier)) => self.store(&id, &doc).await.map(|_| tier),
                    Err(e) => Err(e),
                };

                let networked =
                    !matches!(outcome, Ok(Tier::Cache) | Err(IngestError::InvalidId(_)));
                if networked && i + 1 < total && !self.batch_delay.is_zero() {
                    debug!(delay_ms = self.batch_delay.as_millis() as u64, "Pacing before next fetch");
                    sleep(self.batch_delay).await;
                }
                (id, outcome)
            })
            .collect()
            .await;

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        info!(total, failed, "Batch download finished");
        results
    }

    /// Ask the live site for a random episode identifier.
    #[instrument(level = "info", skip(self))]
    pub async fn random_identifier(&self) -> Result<MatchId> {
        let home = self.get_text(&format!("{}/", self.page_base)).await?;
        let id = random_id_from_front_page(&home)?;
        info!(%id, "Picked random episode");
        Ok(id)
    }
}

/// Pick the newest capture from a CDX JSON listing.
///
/// The listing is an array of rows; a leading `urlkey` header row is
/// skipped. Returns `None` when no capture rows remain.
pub fn latest_snapshot(listing: &str) -> Result<Option<Snapshot>> {
    if listing.trim().is_empty() {
        return Ok(None);
    }
    let rows: Vec<Vec<String>> = serde_json::from_str(listing)?;
    let Some(last) = rows
        .iter()
        .filter(|row| row.first().map(String::as_str) != Some("urlkey"))
        .last()
    else {
        return Ok(None);
    };

    match (last.get(1), last.get(2)) {
        (Some(timestamp), Some(original)) => Ok(Some(Snapshot {
            timestamp: timestamp.clone(),
            original: original.clone(),
        })),
        _ => Err(IngestError::Structure(format!(
            "snapshot row has too few columns: {last:?}"
        ))),
    }
}

/// Episode ids are short digit strings. Anything else is refused before it
/// reaches a cache path or a query string.
fn check_page_id(id: &MatchId) -> Result<()> {
    let text = id.as_str();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IngestError::InvalidId(text.to_string()));
    }
    Ok(())
}

/// Read the episode id out of the second clue footer link on the front page.
fn random_id_from_front_page(html: &str) -> Result<MatchId> {
    let document = Html::parse_document(html);
    document
        .select(&CLUE_FOOTER)
        .nth(1)
        .and_then(|f| f.select(&FOOTER_LINK).next())
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| GAME_ID_PARAM.captures(href))
        .map(|caps| MatchId::new(&caps[1]))
        .ok_or_else(|| IngestError::Structure("front page has no random game link".to_string()))
}
