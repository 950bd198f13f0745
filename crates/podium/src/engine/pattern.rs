//! Positional pattern detection and number selection.
//!
//! The pattern compares where recent champions finished in draws roughly
//! 46 periods earlier. Indices into the history are fixed offsets from the
//! latest draw (index 0).

use serde::{Deserialize, Serialize};

use crate::types::{DrawRecord, PatternType};

/// History index of the draw the latest champion is located in.
pub const TARGET_OFFSET: usize = 46;

/// History index of the draw numbers are picked from.
pub const SOURCE_OFFSET: usize = 45;

/// Draws needed for detection: indices 0..=48.
pub const MIN_DETECTION_HISTORY: usize = TARGET_OFFSET + 3;

/// Which half of a finishing order an entrant landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    None,
}

/// Where the champion of `champion_draw` finished in `target_draw`.
pub fn position_of(champion_draw: &DrawRecord, target_draw: &DrawRecord) -> Side {
    match target_draw.position_of(champion_draw.champion()) {
        Some(0..=4) => Side::Left,
        Some(5..=9) => Side::Right,
        _ => Side::None,
    }
}

/// Check the latest three draws for a Left-Right or Right-Left trigger.
///
/// `history` must be descending by period; shorter histories never trigger.
pub fn detect_pattern(history: &[DrawRecord]) -> Option<PatternType> {
    if history.len() < MIN_DETECTION_HISTORY {
        return None;
    }

    let p1 = position_of(&history[0], &history[TARGET_OFFSET]);
    let p2 = position_of(&history[1], &history[TARGET_OFFSET + 1]);
    let p3 = position_of(&history[2], &history[TARGET_OFFSET + 2]);

    match (p1, p2, p3) {
        (Side::Right, Side::Left, Side::Left) => Some(PatternType::LeftRight),
        (Side::Left, Side::Right, Side::Right) => Some(PatternType::RightLeft),
        _ => None,
    }
}

/// Pick four entrants from `history[45]` keyed on where the latest champion
/// finished in `history[46]`.
pub fn select_numbers(history: &[DrawRecord]) -> Option<Vec<u8>> {
    let latest = history.first()?;
    let target = history.get(TARGET_OFFSET)?;
    let source = history.get(SOURCE_OFFSET)?;

    let indices: [usize; 4] = match target.position_of(latest.champion())? {
        0 => [0, 2, 3, 4],
        9 => [5, 6, 7, 9],
        1..=4 => [1, 2, 3, 4],
        5..=8 => [5, 6, 7, 8],
        _ => return None,
    };

    indices
        .iter()
        .map(|&i| source.entrants.get(i).copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::build_record;
    use crate::types::SumWindow;

    fn draw(period: u32, entrants: [u8; 10]) -> DrawRecord {
        build_record(&period.to_string(), entrants.to_vec(), SumWindow::First3).unwrap()
    }

    const IDENTITY: [u8; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

    #[test]
    fn test_position_of() {
        let champ3 = draw(2, [3, 1, 2, 4, 5, 6, 7, 8, 9, 10]);
        let target = draw(1, IDENTITY);
        assert_eq!(position_of(&champ3, &target), Side::Left);

        let champ6 = draw(2, [6, 1, 2, 3, 4, 5, 7, 8, 9, 10]);
        assert_eq!(position_of(&champ6, &target), Side::Right);
    }

    #[test]
    fn test_short_history_never_triggers() {
        let history: Vec<DrawRecord> = (0..48).map(|i| draw(1000 - i, IDENTITY)).collect();
        assert_eq!(detect_pattern(&history), None);
    }

    #[test]
    fn test_select_numbers_by_index() {
        let mut history: Vec<DrawRecord> = (0..50).map(|i| draw(1000 - i, IDENTITY)).collect();
        history[SOURCE_OFFSET] = draw(955, [10, 9, 8, 7, 6, 5, 4, 3, 2, 1]);

        // champion 1 sits at index 0 of the identity target
        assert_eq!(select_numbers(&history), Some(vec![10, 8, 7, 6]));

        history[0] = draw(1000, [10, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(select_numbers(&history), Some(vec![5, 4, 3, 1]));

        history[0] = draw(1000, [3, 1, 2, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(select_numbers(&history), Some(vec![9, 8, 7, 6]));

        history[0] = draw(1000, [7, 1, 2, 3, 4, 5, 6, 8, 9, 10]);
        assert_eq!(select_numbers(&history), Some(vec![5, 4, 3, 2]));
    }
}
