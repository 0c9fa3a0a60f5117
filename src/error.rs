//! Error taxonomy for the ingestion pipeline.
//!
//! Two kinds of failure reach a caller:
//!
//! - [`IngestError`]: the match could not be retrieved or its source had an
//!   unexpected shape. Treat as "could not be retrieved".
//! - [`Incomplete`]: the source was fetched and is shaped correctly, but
//!   is missing data needed to build a playable match. This is not an
//!   error and travels inside [`Ingested`].

use std::fmt;
use thiserror::Error;

/// Which fetch strategy produced a terminal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Cache,
    Snapshot,
    Direct,
    Sheet,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Cache => "cache",
            Tier::Snapshot => "snapshot",
            Tier::Direct => "direct",
            Tier::Sheet => "sheet",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to fetch {id} ({tier} tier): {reason}")]
    Fetch { id: String, tier: Tier, reason: String },

    #[error("not a valid episode id: {0:?}")]
    InvalidId(String),

    #[error("unexpected source structure: {0}")]
    Structure(String),

    #[error("match failed validation: {0}")]
    Validation(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl IngestError {
    /// Short text suitable for showing to a player.
    pub fn user_message(&self) -> String {
        match self {
            IngestError::Fetch { id, .. } => format!("match {id} could not be retrieved"),
            _ => format!("match could not be retrieved: {self}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;

/// Why a fetched source cannot produce a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incomplete {
    /// A clue cell had no prompt element. `clue` is the index of the cell
    /// in source order; `round` is `None` for the final round.
    MissingPrompt { round: Option<usize>, clue: usize },
    /// No correct-response annotation was found for a clue.
    MissingAnswer {
        round: Option<usize>,
        position: (usize, usize),
    },
    /// The title did not carry an air date.
    MissingDate,
}

impl fmt::Display for Incomplete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Incomplete::MissingPrompt { round: Some(r), clue } => {
                write!(f, "this match is incomplete (round {} clue {} has no prompt)", r + 1, clue + 1)
            }
            Incomplete::MissingPrompt { round: None, .. } => {
                write!(f, "this match is incomplete (final round has no prompt)")
            }
            Incomplete::MissingAnswer { round: Some(r), position } => write!(
                f,
                "this match is incomplete (round {} clue {}-{} has no answer)",
                r + 1,
                position.0,
                position.1
            ),
            Incomplete::MissingAnswer { round: None, .. } => {
                write!(f, "this match is incomplete (final round has no answer)")
            }
            Incomplete::MissingDate => write!(f, "this match is incomplete (no air date)"),
        }
    }
}

/// Outcome of a parse that can legitimately find nothing to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingested<T> {
    Complete(T),
    Incomplete(Incomplete),
}

impl<T> Ingested<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Ingested<U> {
        match self {
            Ingested::Complete(v) => Ingested::Complete(f(v)),
            Ingested::Incomplete(why) => Ingested::Incomplete(why),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Ingested::Complete(_))
    }

    pub fn complete(self) -> Option<T> {
        match self {
            Ingested::Complete(v) => Some(v),
            Ingested::Incomplete(_) => None,
        }
    }
}
