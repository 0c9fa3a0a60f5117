//! Match sources.
//!
//! Each source turns an identifier into [`RawRecords`]:
//!
//! | Source | Module | Retrieval | Parsing |
//! |--------|--------|-----------|---------|
//! | Episode page | [`page`] | [`archive::ArchiveFetcher`] (cache, snapshot, live) | markup traversal |
//! | Spreadsheet | [`sheet`] | single CSV export fetch | fixed cell positions |
//!
//! Both implement [`RecordSource`], so the normalizer sees one input shape
//! regardless of where the match came from.

pub mod archive;
pub mod page;
pub mod sheet;

use crate::config::Config;
use crate::error::{IngestError, Ingested, Result, Tier};
use crate::media::MediaIndex;
use crate::models::{MatchId, RawRecords};
use archive::ArchiveFetcher;
use reqwest::Client;
use tracing::{info, instrument};
use url::Url;

/// Something that can produce raw match records for an identifier.
#[allow(async_fn_in_trait)]
pub trait RecordSource {
    async fn records(&self, id: &MatchId) -> Result<Ingested<RawRecords>>;
}

/// Archived or live episode pages.
#[derive(Debug, Clone)]
pub struct PageSource {
    fetcher: ArchiveFetcher,
    media: MediaIndex,
}

impl PageSource {
    pub fn new(fetcher: ArchiveFetcher, media: MediaIndex) -> Self {
        Self { fetcher, media }
    }

    pub fn fetcher(&self) -> &ArchiveFetcher {
        &self.fetcher
    }
}

impl RecordSource for PageSource {
    #[instrument(level = "info", skip_all, fields(%id))]
    async fn records(&self, id: &MatchId) -> Result<Ingested<RawRecords>> {
        let document = self.fetcher.fetch(id).await?;
        page::parse_page(&document, id, &self.media)
    }
}

/// Spreadsheet templates exported as CSV.
#[derive(Debug, Clone)]
pub struct SheetSource {
    client: Client,
    sheet_base: String,
}

impl SheetSource {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            sheet_base: config.sheet_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// CSV export URL for a spreadsheet key.
    pub fn export_url(&self, key: &MatchId) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/spreadsheet/ccc", self.sheet_base))?;
        url.query_pairs_mut()
            .append_pair("key", key.as_str())
            .append_pair("output", "csv");
        Ok(url)
    }

    /// Download the export. One attempt; any failure is terminal.
    #[instrument(level = "info", skip_all, fields(%key))]
    pub async fn fetch_rows(&self, key: &MatchId) -> Result<Vec<Vec<String>>> {
        let url = self.export_url(key)?;
        let text = self.download(url).await.map_err(|e| IngestError::Fetch {
            id: key.to_string(),
            tier: Tier::Sheet,
            reason: e.to_string(),
        })?;
        let rows = sheet::read_rows(&text)?;
        info!(rows = rows.len(), bytes = text.len(), "Fetched spreadsheet export");
        Ok(rows)
    }

    async fn download(&self, url: Url) -> Result<String> {
        let text = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text)
    }
}

impl RecordSource for SheetSource {
    async fn records(&self, id: &MatchId) -> Result<Ingested<RawRecords>> {
        let rows = self.fetch_rows(id).await?;
        sheet::parse_sheet(&rows).map(Ingested::Complete)
    }
}
