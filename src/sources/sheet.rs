//! Spreadsheet template parser.
//!
//! The template is read purely by position (0-based rows below, columns
//! named as in the sheet):
//!
//! ```text
//! row 0        A: -  B..G: categories, round 1   last cell: daily double addresses
//! rows 1..=5   B..G: prompts, rows top to bottom
//! rows 7..=11  B..G: answers, six rows below their prompts
//! row 13       same header layout for round 2
//! rows 14..=18 prompts, rows 20..=24 answers
//! last row     B: final category  C: prompt  D: answer  F: air date  H: notes
//! ```
//!
//! Daily doubles are listed by cell address, e.g. `C3, F16`. Their value
//! stays the table value: the template has nowhere to record a wager.

use crate::error::{IngestError, Result};
use crate::models::{BOARD_HEIGHT, BOARD_WIDTH, Position, RawClue, RawFinal, RawRecords, RawRound, table_value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Header row of each round.
pub const HEADER_ROWS: [usize; 2] = [0, 13];
/// Distance from a prompt row to its answer row.
pub const ANSWER_OFFSET: usize = 6;
/// Sheet column letters of the six category columns.
pub const COLUMN_LETTERS: [char; BOARD_WIDTH] = ['B', 'C', 'D', 'E', 'F', 'G'];

static CELL_ADDRESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]+[0-9]+").unwrap());

/// Read CSV export text into rows of cells.
pub fn read_rows(text: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Parse template rows into raw records.
#[instrument(level = "info", skip_all, fields(rows = rows.len()))]
pub fn parse_sheet(rows: &[Vec<String>]) -> Result<RawRecords> {
    let rounds = HEADER_ROWS
        .iter()
        .enumerate()
        .map(|(index, &header)| parse_round(rows, index, header))
        .collect::<Result<Vec<RawRound>>>()?;

    let last = rows.len().checked_sub(1).ok_or_else(|| {
        IngestError::Structure("spreadsheet is empty".to_string())
    })?;
    let final_round = RawFinal {
        category: cell(rows, last, 1)?.to_string(),
        prompt: cell(rows, last, 2)?.to_string(),
        answer: cell(rows, last, 3)?.to_string(),
    };
    let air_date = cell(rows, last, 5)?.to_string();
    let notes = rows[last].get(7).map(|s| s.trim().to_string()).unwrap_or_default();

    info!(%air_date, "Parsed spreadsheet template");
    Ok(RawRecords {
        rounds,
        final_round,
        air_date,
        notes,
    })
}

fn parse_round(rows: &[Vec<String>], index: usize, header: usize) -> Result<RawRound> {
    let categories = (1..=BOARD_WIDTH)
        .map(|col| cell(rows, header, col).map(str::to_string))
        .collect::<Result<Vec<String>>>()?;

    let daily_doubles = daily_double_addresses(rows[header].last().map(String::as_str).unwrap_or(""));

    let mut clues = Vec::with_capacity(BOARD_WIDTH * BOARD_HEIGHT);
    for row in 0..BOARD_HEIGHT {
        let prompt_row = header + 1 + row;
        let value = table_value(index, row).ok_or_else(|| {
            IngestError::Structure(format!("no table value for round {index} row {row}"))
        })?;

        for (col, category) in categories.iter().enumerate() {
            let address = format!("{}{}", COLUMN_LETTERS[col], prompt_row + 1);
            clues.push(RawClue {
                position: Position::new(col, row),
                prompt: cell(rows, prompt_row, col + 1)?.to_string(),
                answer: cell(rows, prompt_row + ANSWER_OFFSET, col + 1)?.to_string(),
                category: category.clone(),
                value,
                is_daily_double: daily_doubles.contains(&address),
                has_visual_aid: false,
                media: None,
                outcomes: Vec::new(),
            });
        }
    }

    debug!(round = index, daily_doubles = ?daily_doubles, "Parsed spreadsheet round");
    Ok(RawRound {
        categories,
        clues,
        is_second_round: index == 1,
    })
}

/// Cell addresses named in a daily double marker, upper-cased.
pub fn daily_double_addresses(marker: &str) -> HashSet<String> {
    CELL_ADDRESS
        .find_iter(marker)
        .map(|m| m.as_str().to_ascii_uppercase())
        .collect()
}

fn cell(rows: &[Vec<String>], row: usize, col: usize) -> Result<&str> {
    rows.get(row)
        .and_then(|r| r.get(col))
        .map(|s| s.trim())
        .ok_or_else(|| IngestError::Structure(format!("spreadsheet has no cell at row {} column {}", row + 1, col + 1)))
}
