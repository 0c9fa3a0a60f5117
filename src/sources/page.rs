//! Episode page parser.
//!
//! Turns the markup of an archived episode page into [`RawRecords`]. The
//! page layout this expects:
//!
//! - `#game_title > h1` reading `Show #1234 - Monday, May 6, 2019`
//! - `#game_comments` with free-form notes
//! - one `table.round` per board (three for formats with an extra
//!   opening round, in which case the first is dropped), each holding six
//!   `td.category` header cells and up to thirty `td.clue` cells
//! - one `table.final_round`
//!
//! Inside a clue cell the first `.clue_text` is the prompt and carries an
//! id like `clue_J_3_2` (column 3, row 2, 1-based). The correct response
//! sits in an `em.correct_response`, either inline or inside an escaped
//! `onmouseover` attribute on older pages. Contestant responses are
//! `td.right` / `td.wrong` cells.

use crate::error::{Incomplete, Ingested, IngestError, Result};
use crate::media::MediaIndex;
use crate::models::{
    MatchId, MediaReference, Outcome, Position, RawClue, RawFinal, RawRecords, RawRound,
    table_value,
};
use crate::utils::decode_entities;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};

/// Contestant response text meaning nobody answered correctly.
pub const NO_ONE_PLACEHOLDER: &str = "Triple Stumper";

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("#game_title > h1").unwrap());
static COMMENTS: Lazy<Selector> = Lazy::new(|| Selector::parse("#game_comments").unwrap());
static ROUND: Lazy<Selector> = Lazy::new(|| Selector::parse(".round").unwrap());
static FINAL_ROUND: Lazy<Selector> = Lazy::new(|| Selector::parse(".final_round").unwrap());
static CATEGORY: Lazy<Selector> = Lazy::new(|| Selector::parse(".category").unwrap());
static CATEGORY_NAME: Lazy<Selector> = Lazy::new(|| Selector::parse(".category_name").unwrap());
static CLUE: Lazy<Selector> = Lazy::new(|| Selector::parse(".clue").unwrap());
static CLUE_TEXT: Lazy<Selector> = Lazy::new(|| Selector::parse(".clue_text").unwrap());
static DAILY_DOUBLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".clue_value_daily_double").unwrap());
static WRONG: Lazy<Selector> = Lazy::new(|| Selector::parse("td.wrong").unwrap());
static RIGHT: Lazy<Selector> = Lazy::new(|| Selector::parse("td.right").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

static AIR_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"- \w+, (.*?)$").unwrap());
static CORRECT_RESPONSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)correct_response">(.*?)</em"#).unwrap());

/// Parse an episode page.
///
/// Returns [`Ingested::Incomplete`] when the page lacks an air date, a
/// prompt or a correct response anywhere; no partial records are returned.
/// Markup that does not follow the expected layout is an
/// [`IngestError::Structure`].
#[instrument(level = "info", skip_all, fields(%id, bytes = document.len()))]
pub fn parse_page(document: &str, id: &MatchId, media: &MediaIndex) -> Result<Ingested<RawRecords>> {
    let html = Html::parse_document(document);

    let Some(air_date) = air_date(&html) else {
        info!("Episode page has no air date");
        return Ok(Ingested::Incomplete(Incomplete::MissingDate));
    };
    let notes = html
        .select(&COMMENTS)
        .next()
        .map(|c| element_text(&c))
        .unwrap_or_default();

    let sections: Vec<ElementRef> = html.select(&ROUND).collect();
    let sections = select_rounds(sections)?;

    let mut rounds = Vec::with_capacity(2);
    for (index, section) in sections.into_iter().enumerate() {
        match parse_round(section, index, id, media)? {
            Ingested::Complete(round) => rounds.push(round),
            Ingested::Incomplete(why) => {
                info!(%why, "Episode page is incomplete");
                return Ok(Ingested::Incomplete(why));
            }
        }
    }

    let final_round = match parse_final(&html)? {
        Ingested::Complete(f) => f,
        Ingested::Incomplete(why) => {
            info!(%why, "Episode page is incomplete");
            return Ok(Ingested::Incomplete(why));
        }
    };

    info!(
        rounds = rounds.len(),
        clues = rounds.iter().map(|r| r.clues.len()).sum::<usize>(),
        %air_date,
        "Parsed episode page"
    );
    Ok(Ingested::Complete(RawRecords {
        rounds,
        final_round,
        air_date,
        notes,
    }))
}

/// Keep the two standard boards. A third leading board is dropped.
pub fn select_rounds<T>(mut sections: Vec<T>) -> Result<Vec<T>> {
    match sections.len() {
        2 => Ok(sections),
        3 => {
            debug!("Three round sections; dropping the first");
            sections.remove(0);
            Ok(sections)
        }
        n => Err(IngestError::Structure(format!(
            "expected 2 or 3 round sections, found {n}"
        ))),
    }
}

fn air_date(html: &Html) -> Option<String> {
    let title = html.select(&TITLE).next()?;
    let text = element_text(&title);
    AIR_DATE
        .captures(&text)
        .map(|caps| caps[1].trim().to_string())
}

fn parse_round(
    section: ElementRef,
    index: usize,
    id: &MatchId,
    media: &MediaIndex,
) -> Result<Ingested<RawRound>> {
    let categories = section
        .select(&CATEGORY)
        .map(|cell| {
            cell.select(&CATEGORY_NAME)
                .next()
                .map(|name| element_text(&name))
                .ok_or_else(|| IngestError::Structure("category cell without a name".to_string()))
        })
        .collect::<Result<Vec<String>>>()?;

    let mut clues = Vec::new();
    for (k, cell) in section.select(&CLUE).enumerate() {
        match parse_clue(cell, index, k, &categories, id, media)? {
            Ingested::Complete(clue) => clues.push(clue),
            Ingested::Incomplete(why) => return Ok(Ingested::Incomplete(why)),
        }
    }

    debug!(round = index, categories = categories.len(), clues = clues.len(), "Parsed round");
    Ok(Ingested::Complete(RawRound {
        categories,
        clues,
        is_second_round: index == 1,
    }))
}

fn parse_clue(
    cell: ElementRef,
    round: usize,
    k: usize,
    categories: &[String],
    id: &MatchId,
    media: &MediaIndex,
) -> Result<Ingested<RawClue>> {
    let Some(prompt_el) = cell.select(&CLUE_TEXT).next() else {
        return Ok(Ingested::Incomplete(Incomplete::MissingPrompt {
            round: Some(round),
            clue: k,
        }));
    };

    let position = prompt_el
        .value()
        .attr("id")
        .ok_or_else(|| IngestError::Structure("clue text without an id".to_string()))
        .and_then(parse_position)?;

    let category = categories.get(position.column).cloned().ok_or_else(|| {
        IngestError::Structure(format!(
            "clue column {} outside {} categories",
            position.column,
            categories.len()
        ))
    })?;

    let daily_double = cell.select(&DAILY_DOUBLE).next();
    let is_daily_double = daily_double.is_some();
    let value = match daily_double {
        Some(marker) => parse_wager(&element_text(&marker))?,
        None => table_value(round, position.row).ok_or_else(|| {
            IngestError::Structure(format!("no table value for round {round} row {}", position.row))
        })?,
    };

    let Some(answer) = find_answer(&cell.html()) else {
        return Ok(Ingested::Incomplete(Incomplete::MissingAnswer {
            round: Some(round),
            position: (position.column, position.row),
        }));
    };

    let outcomes = contestant_outcomes(cell, value);

    let (has_visual_aid, media_ref) = match media.find(id, round, position) {
        Some(path) => (true, Some(MediaReference::Local(path))),
        None => match prompt_el.select(&LINK).next() {
            Some(link) => (
                true,
                link.value()
                    .attr("href")
                    .map(|href| MediaReference::Remote(href.to_string())),
            ),
            None => (false, None),
        },
    };

    Ok(Ingested::Complete(RawClue {
        position,
        prompt: element_text(&prompt_el),
        answer,
        category,
        value,
        is_daily_double,
        has_visual_aid,
        media: media_ref,
        outcomes,
    }))
}

fn parse_final(html: &Html) -> Result<Ingested<RawFinal>> {
    let section = html
        .select(&FINAL_ROUND)
        .next()
        .ok_or_else(|| IngestError::Structure("no final round section".to_string()))?;

    let category = section
        .select(&CATEGORY_NAME)
        .next()
        .map(|name| element_text(&name))
        .ok_or_else(|| IngestError::Structure("final round without a category".to_string()))?;

    let clue = section
        .select(&CLUE)
        .next()
        .ok_or_else(|| IngestError::Structure("final round without a clue".to_string()))?;

    let Some(prompt_el) = clue.select(&CLUE_TEXT).next() else {
        return Ok(Ingested::Incomplete(Incomplete::MissingPrompt { round: None, clue: 0 }));
    };

    let Some(answer) = find_answer(&section.html()) else {
        return Ok(Ingested::Incomplete(Incomplete::MissingAnswer {
            round: None,
            position: (0, 0),
        }));
    };

    Ok(Ingested::Complete(RawFinal {
        category,
        prompt: element_text(&prompt_el),
        answer,
    }))
}

/// Decode `clue_J_3_2` style ids into a 0-based position.
pub fn parse_position(id: &str) -> Result<Position> {
    let bad = || IngestError::Structure(format!("unrecognised clue id {id:?}"));
    let mut parts = id.rsplit('_');
    let row: usize = parts.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;
    let column: usize = parts.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;
    if row == 0 || column == 0 {
        return Err(bad());
    }
    Ok(Position::new(column - 1, row - 1))
}

/// Read the wager from a daily double marker such as `DD: $1,200`.
pub fn parse_wager(text: &str) -> Result<u32> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits
        .parse()
        .map_err(|_| IngestError::Structure(format!("unreadable daily double wager {text:?}")))
}

/// Extract the correct response from serialized clue markup.
pub fn find_answer(markup: &str) -> Option<String> {
    let decoded = decode_entities(markup);
    CORRECT_RESPONSE
        .captures(&decoded)
        .map(|caps| caps[1].trim().to_string())
}

/// Every recorded response: wrong ones first, then the right one.
///
/// The no-one-answered placeholder is skipped.
fn contestant_outcomes(cell: ElementRef, value: u32) -> Vec<Outcome> {
    let value = i64::from(value);
    let mut outcomes: Vec<Outcome> = cell
        .select(&WRONG)
        .map(|w| element_text(&w))
        .filter(|text| text != NO_ONE_PLACEHOLDER)
        .map(|text| Outcome { text, delta: -value })
        .collect();

    let mut rights = cell.select(&RIGHT);
    if let Some(right) = rights.next() {
        outcomes.push(Outcome {
            text: element_text(&right),
            delta: value,
        });
    }
    if rights.next().is_some() {
        warn!("More than one correct response recorded; keeping the first");
    }
    outcomes
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}
