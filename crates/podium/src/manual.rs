//! Manual override input.
//!
//! Accepts a block of `period,result` lines where `result` is the
//! space-separated finishing order, e.g. `33100002,5 2 9 1 3 4 6 7 8 10`.
//! The whole block is validated before anything is returned, so a bad line
//! never leaves a partially seeded history behind. Manual rows classify
//! big/small on all ten entrants.

use crate::history::HistoryMerger;
use crate::normalize::normalize;
use crate::types::{DrawRecord, PodiumError, PodiumResult, RawDraw, SumWindow};

/// Format hint reported with every manual input error.
pub const MANUAL_FORMAT_HINT: &str = r#"expected "period,n1 n2 ... n10" on each line"#;

/// Parse and validate every non-blank line of a manual input block.
pub fn parse_manual_input(text: &str) -> PodiumResult<Vec<RawDraw>> {
    let mut draws = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((period, result)) = line.split_once(',') else {
            return Err(bad_line(idx + 1, "missing comma"));
        };
        let raw = RawDraw::new(period.trim(), result.trim(), SumWindow::All);
        normalize(&raw).map_err(|e| bad_line(idx + 1, &e.to_string()))?;
        draws.push(raw);
    }

    if draws.is_empty() {
        return Err(PodiumError::ManualInput {
            line: 0,
            hint: format!("no draws given; {MANUAL_FORMAT_HINT}"),
        });
    }
    Ok(draws)
}

/// Build a full history from a manual input block.
pub fn seed_history(text: &str, capacity: usize) -> PodiumResult<Vec<DrawRecord>> {
    let draws = parse_manual_input(text)?;
    let mut merger = HistoryMerger::new(capacity);
    merger.offer_all(&draws);
    Ok(merger.finish())
}

fn bad_line(line: usize, detail: &str) -> PodiumError {
    PodiumError::ManualInput {
        line,
        hint: format!("{detail}; {MANUAL_FORMAT_HINT}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HISTORY_CAPACITY;

    #[test]
    fn test_seed_history() {
        let text = "33100001,1 2 3 4 5 6 7 8 9 10\n\n33100002,5 2 9 1 3 4 6 7 8 10\n";
        let history = seed_history(text, HISTORY_CAPACITY).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].period, "33100002");
        // manual rows sum every entrant
        assert_eq!(history[0].sum, 55);
        assert_eq!(history[0].odd_even, crate::types::OddEven::Odd);
    }

    #[test]
    fn test_missing_comma_reports_line() {
        let text = "33100001,1 2 3 4 5 6 7 8 9 10\n33100002 5 2 9 1 3 4 6 7 8 10";
        match parse_manual_input(text) {
            Err(PodiumError::ManualInput { line, hint }) => {
                assert_eq!(line, 2);
                assert!(hint.contains(MANUAL_FORMAT_HINT));
            }
            other => panic!("expected manual input error, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_entrants_rejected() {
        let err = parse_manual_input("33100001,1 2 3").unwrap_err();
        assert!(matches!(err, PodiumError::ManualInput { line: 1, .. }));
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = parse_manual_input("\n  \n").unwrap_err();
        assert!(matches!(err, PodiumError::ManualInput { line: 0, .. }));
    }
}
