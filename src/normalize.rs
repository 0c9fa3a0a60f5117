//! Assembly of raw parser output into a validated [`Match`].
//!
//! Both sources go through the same checks here:
//! - exactly two rounds, the second flagged as the higher-value round
//! - six categories per round, each with one clue in every row
//! - clue category names agree with the header of their column
//! - values are positive, and equal the table value unless the clue is a
//!   daily double

use crate::error::{IngestError, Result};
use crate::models::{
    BOARD_HEIGHT, BOARD_WIDTH, Clue, FinalRound, Match, Position, RawClue, RawFinal, RawRecords,
    RawRound, Round, table_value,
};
use itertools::Itertools;
use tracing::{debug, instrument};

#[instrument(level = "info", skip_all)]
pub fn assemble(records: RawRecords) -> Result<Match> {
    if records.rounds.len() != 2 {
        return Err(IngestError::Validation(format!(
            "expected 2 rounds, found {}",
            records.rounds.len()
        )));
    }

    let rounds = records
        .rounds
        .into_iter()
        .enumerate()
        .map(|(index, raw)| assemble_round(index, raw))
        .collect::<Result<Vec<Round>>>()?;
    let rounds: [Round; 2] = rounds
        .try_into()
        .map_err(|_| IngestError::Validation("expected 2 rounds".to_string()))?;

    Ok(Match {
        rounds,
        final_round: assemble_final(records.final_round),
        air_date: records.air_date,
        notes: records.notes,
    })
}

fn assemble_round(index: usize, raw: RawRound) -> Result<Round> {
    let invalid = |msg: String| IngestError::Validation(format!("round {}: {msg}", index + 1));

    if raw.is_second_round != (index == 1) {
        return Err(invalid("second-round flag does not match position".to_string()));
    }
    if raw.categories.len() != BOARD_WIDTH {
        return Err(invalid(format!(
            "expected {BOARD_WIDTH} categories, found {}",
            raw.categories.len()
        )));
    }

    for clue in &raw.clues {
        check_clue(index, &raw.categories, clue).map_err(invalid)?;
    }

    if !raw.clues.iter().map(|c| c.position).all_unique() {
        return Err(invalid("two clues share a board position".to_string()));
    }
    let per_column = raw.clues.iter().counts_by(|c| c.position.column);
    for column in 0..BOARD_WIDTH {
        let filled = per_column.get(&column).copied().unwrap_or(0);
        if filled != BOARD_HEIGHT {
            return Err(invalid(format!(
                "category {:?} has {filled} of {BOARD_HEIGHT} clues",
                raw.categories[column]
            )));
        }
    }

    let clues = raw
        .clues
        .into_iter()
        .sorted_by_key(|c| c.position)
        .map(|c| Clue {
            position: c.position,
            prompt: c.prompt,
            answer: c.answer,
            category: c.category,
            value: Some(c.value),
            is_daily_double: c.is_daily_double,
            has_visual_aid: c.has_visual_aid,
            media: c.media,
            outcomes: c.outcomes,
        })
        .collect::<Vec<_>>();

    debug!(round = index, clues = clues.len(), "Assembled round");
    Ok(Round {
        categories: raw.categories,
        clues,
        is_second_round: raw.is_second_round,
    })
}

fn check_clue(round: usize, categories: &[String], clue: &RawClue) -> std::result::Result<(), String> {
    let Position { column, row } = clue.position;
    if column >= BOARD_WIDTH || row >= BOARD_HEIGHT {
        return Err(format!("clue at {column}-{row} is off the board"));
    }
    if clue.category != categories[column] {
        return Err(format!(
            "clue at {column}-{row} is filed under {:?}, column is {:?}",
            clue.category, categories[column]
        ));
    }
    if clue.value == 0 {
        return Err(format!("clue at {column}-{row} has no value"));
    }
    if !clue.is_daily_double && table_value(round, row) != Some(clue.value) {
        return Err(format!(
            "clue at {column}-{row} is worth {} but the table says {:?}",
            clue.value,
            table_value(round, row)
        ));
    }
    Ok(())
}

fn assemble_final(raw: RawFinal) -> FinalRound {
    FinalRound {
        clue: Clue {
            position: Position::new(0, 0),
            prompt: raw.prompt,
            answer: raw.answer,
            category: raw.category.clone(),
            value: None,
            is_daily_double: false,
            has_visual_aid: false,
            media: None,
            outcomes: Vec::new(),
        },
        category: raw.category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_round(index: usize) -> RawRound {
        let categories: Vec<String> = (0..BOARD_WIDTH).map(|c| format!("Cat {c}")).collect();
        let mut clues = Vec::new();
        for column in 0..BOARD_WIDTH {
            for row in 0..BOARD_HEIGHT {
                clues.push(RawClue {
                    position: Position::new(column, row),
                    prompt: format!("Q {column}-{row}"),
                    answer: format!("A {column}-{row}"),
                    category: categories[column].clone(),
                    value: table_value(index, row).unwrap(),
                    is_daily_double: false,
                    has_visual_aid: false,
                    media: None,
                    outcomes: Vec::new(),
                });
            }
        }
        RawRound {
            categories,
            clues,
            is_second_round: index == 1,
        }
    }

    fn raw_records() -> RawRecords {
        RawRecords {
            rounds: vec![raw_round(0), raw_round(1)],
            final_round: RawFinal {
                category: "Final".to_string(),
                prompt: "FQ".to_string(),
                answer: "FA".to_string(),
            },
            air_date: "May 6, 2019".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_assemble_complete_records() {
        let m = assemble(raw_records()).unwrap();
        assert_eq!(m.rounds.len(), 2);
        assert!(!m.rounds[0].is_second_round);
        assert!(m.rounds[1].is_second_round);
        assert_eq!(m.rounds[0].clues.len(), 30);
        assert_eq!(m.final_round.category, "Final");
        assert_eq!(m.final_round.clue.position, Position::new(0, 0));
        assert_eq!(m.final_round.clue.value, None);
        assert!(!m.final_round.clue.is_daily_double);
        assert_eq!(m.air_date, "May 6, 2019");
    }

    #[test]
    fn test_clues_sorted_by_position() {
        let mut records = raw_records();
        records.rounds[0].clues.reverse();
        let m = assemble(records).unwrap();
        let positions: Vec<Position> = m.rounds[0].clues.iter().map(|c| c.position).collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_daily_double_may_differ_from_table() {
        let mut records = raw_records();
        let clue = &mut records.rounds[1].clues[7];
        clue.is_daily_double = true;
        clue.value = 3000;
        let position = clue.position;

        let m = assemble(records).unwrap();
        let dd = m.rounds[1].clue_at(position).unwrap();
        assert_eq!(dd.value, Some(3000));
        assert_eq!(m.rounds[1].daily_doubles().count(), 1);
    }

    #[test]
    fn test_non_daily_double_off_table_is_rejected() {
        let mut records = raw_records();
        records.rounds[0].clues[3].value = 999;
        assert!(matches!(assemble(records), Err(IngestError::Validation(_))));
    }

    #[test]
    fn test_missing_row_is_rejected() {
        let mut records = raw_records();
        records.rounds[0].clues.pop();
        let err = assemble(records).unwrap_err();
        assert!(err.to_string().contains("4 of 5"));
    }

    #[test]
    fn test_duplicate_position_is_rejected() {
        let mut records = raw_records();
        records.rounds[1].clues[1].position = records.rounds[1].clues[0].position;
        assert!(matches!(assemble(records), Err(IngestError::Validation(_))));
    }

    #[test]
    fn test_wrong_round_count_is_rejected() {
        let mut records = raw_records();
        records.rounds.pop();
        assert!(matches!(assemble(records), Err(IngestError::Validation(_))));
    }

    #[test]
    fn test_category_mismatch_is_rejected() {
        let mut records = raw_records();
        records.rounds[0].clues[0].category = "Elsewhere".to_string();
        assert!(matches!(assemble(records), Err(IngestError::Validation(_))));
    }

    #[test]
    fn test_zero_value_daily_double_is_rejected() {
        let mut records = raw_records();
        records.rounds[0].clues[0].is_daily_double = true;
        records.rounds[0].clues[0].value = 0;
        assert!(matches!(assemble(records), Err(IngestError::Validation(_))));
    }
}
