//! Data models for ingested matches.
//!
//! This module defines two layers:
//! - Raw records ([`RawRecords`] and friends): what a parser extracted from
//!   a page or a spreadsheet, before any validation.
//! - Canonical entities ([`Match`], [`Round`], [`FinalRound`], [`Clue`]):
//!   what the normalizer hands to presentation and gameplay. These are
//!   immutable once built.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Number of categories on a board.
pub const BOARD_WIDTH: usize = 6;
/// Number of clues per category.
pub const BOARD_HEIGHT: usize = 5;

/// Identifiers at least this long are spreadsheet file keys.
pub const SHEET_ID_MIN_LEN: usize = 7;

/// Default clue values by (round, row). Second round values are double.
pub const VALUE_TABLE: [[u32; BOARD_HEIGHT]; 2] =
    [[200, 400, 600, 800, 1000], [400, 800, 1200, 1600, 2000]];

/// Table value for a clue, or `None` when the coordinates are off the board.
pub fn table_value(round: usize, row: usize) -> Option<u32> {
    VALUE_TABLE.get(round).and_then(|r| r.get(row)).copied()
}

/// Which parser an identifier routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Page,
    Sheet,
}

/// Identifier of a match: a short numeric episode id or a spreadsheet key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchId(String);

impl MatchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> SourceKind {
        if self.0.chars().count() < SHEET_ID_MIN_LEN {
            SourceKind::Page
        } else {
            SourceKind::Sheet
        }
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        MatchId::new(s)
    }
}

/// Board coordinates, both 0-based. Rows grow downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub column: usize,
    pub row: usize,
}

impl Position {
    pub const fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }
}

/// One recorded contestant response and its score delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub text: String,
    pub delta: i64,
}

/// Visual material attached to a clue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "location", rename_all = "lowercase")]
pub enum MediaReference {
    Local(PathBuf),
    Remote(String),
}

/// A clue as extracted by a parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawClue {
    pub position: Position,
    pub prompt: String,
    pub answer: String,
    pub category: String,
    pub value: u32,
    pub is_daily_double: bool,
    pub has_visual_aid: bool,
    pub media: Option<MediaReference>,
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRound {
    pub categories: Vec<String>,
    pub clues: Vec<RawClue>,
    pub is_second_round: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFinal {
    pub category: String,
    pub prompt: String,
    pub answer: String,
}

/// Parser output shared by every source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecords {
    pub rounds: Vec<RawRound>,
    pub final_round: RawFinal,
    pub air_date: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub position: Position,
    pub prompt: String,
    pub answer: String,
    pub category: String,
    /// `None` only for the final clue.
    pub value: Option<u32>,
    pub is_daily_double: bool,
    pub has_visual_aid: bool,
    pub media: Option<MediaReference>,
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub categories: Vec<String>,
    /// Ordered by column, then row.
    pub clues: Vec<Clue>,
    pub is_second_round: bool,
}

impl Round {
    pub fn clue_at(&self, position: Position) -> Option<&Clue> {
        self.clues.iter().find(|c| c.position == position)
    }

    pub fn daily_doubles(&self) -> impl Iterator<Item = &Clue> {
        self.clues.iter().filter(|c| c.is_daily_double)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalRound {
    pub category: String,
    pub clue: Clue,
}

/// A complete, playable match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub rounds: [Round; 2],
    pub final_round: FinalRound,
    pub air_date: String,
    pub notes: String,
}

impl Match {
    /// Parse the free-form air date when it reads like `May 6, 2019`.
    pub fn parsed_air_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.air_date.trim(), "%B %d, %Y").ok()
    }
}
