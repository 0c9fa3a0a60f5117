//! Single entry point: identifier in, [`Match`] out.
//!
//! Identifiers shorter than seven characters are episode ids and go
//! through the page source; anything longer is a spreadsheet key.

use crate::config::Config;
use crate::error::{Ingested, Result};
use crate::media::MediaIndex;
use crate::models::{Match, MatchId, SourceKind};
use crate::normalize::assemble;
use crate::sources::archive::ArchiveFetcher;
use crate::sources::{PageSource, RecordSource, SheetSource};
use reqwest::Client;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct Resolver {
    page: PageSource,
    sheet: SheetSource,
}

impl Resolver {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_client(config, config.http_client()?))
    }

    pub fn with_client(config: &Config, client: Client) -> Self {
        let fetcher = ArchiveFetcher::new(config, client.clone());
        Self {
            page: PageSource::new(fetcher, MediaIndex::new(&config.media_root)),
            sheet: SheetSource::new(config, client),
        }
    }

    pub fn fetcher(&self) -> &ArchiveFetcher {
        self.page.fetcher()
    }

    /// Fetch, parse and validate a match.
    ///
    /// `Ok(Ingested::Incomplete(_))` means the source exists but cannot be
    /// played; `Err` means it could not be retrieved or made sense of.
    #[instrument(level = "info", skip_all, fields(%id))]
    pub async fn resolve(&self, id: &MatchId) -> Result<Ingested<Match>> {
        let kind = id.kind();
        let raw = match kind {
            SourceKind::Page => self.page.records(id).await?,
            SourceKind::Sheet => self.sheet.records(id).await?,
        };

        match raw {
            Ingested::Complete(records) => {
                let game = assemble(records)?;
                info!(source = ?kind, air_date = %game.air_date, "Match ready");
                Ok(Ingested::Complete(game))
            }
            Ingested::Incomplete(why) => {
                info!(source = ?kind, %why, "Match incomplete");
                Ok(Ingested::Incomplete(why))
            }
        }
    }
}
