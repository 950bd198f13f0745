//! Deduplicating history merger.
//!
//! Every adapter feeds its candidates through one merger per refresh. A period
//! that is already present is never overwritten, so the first adapter to
//! report a period wins. The finished history is sorted descending by period
//! (plain string comparison) and truncated to the configured capacity.

use std::collections::HashMap;

use crate::normalize::normalize;
use crate::types::{DrawRecord, RawDraw, HISTORY_CAPACITY};

/// Accumulates draws for a single refresh cycle.
#[derive(Debug, Clone)]
pub struct HistoryMerger {
    by_period: HashMap<String, DrawRecord>,
    capacity: usize,
    rejected: usize,
}

impl HistoryMerger {
    pub fn new(capacity: usize) -> Self {
        Self {
            by_period: HashMap::new(),
            capacity,
            rejected: 0,
        }
    }

    /// Normalize a raw draw and insert it unless its period is already known.
    ///
    /// Returns `true` if the draw was inserted.
    pub fn offer(&mut self, raw: &RawDraw) -> bool {
        match normalize(raw) {
            Ok(record) => self.insert(record),
            Err(e) => {
                self.rejected += 1;
                tracing::debug!("merge: dropping raw draw: {e}");
                false
            }
        }
    }

    /// Offer a batch of raw draws, returning how many were inserted.
    pub fn offer_all<'a, I>(&mut self, raws: I) -> usize
    where
        I: IntoIterator<Item = &'a RawDraw>,
    {
        raws.into_iter().filter(|raw| self.offer(raw)).count()
    }

    /// Insert an already-normalized record; first writer wins.
    pub fn insert(&mut self, record: DrawRecord) -> bool {
        if self.by_period.contains_key(&record.period) {
            return false;
        }
        self.by_period.insert(record.period.clone(), record);
        true
    }

    pub fn len(&self) -> usize {
        self.by_period.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_period.is_empty()
    }

    /// Number of raw draws that failed validation.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Sort descending by period and keep the most recent `capacity` draws.
    pub fn finish(self) -> Vec<DrawRecord> {
        let mut draws: Vec<DrawRecord> = self.by_period.into_values().collect();
        draws.sort_by(|a, b| b.period.cmp(&a.period));
        draws.truncate(self.capacity);
        draws
    }
}

impl Default for HistoryMerger {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

/// Merge a list of raw draws into a finished history in one call.
pub fn merge_history(raws: &[RawDraw]) -> Vec<DrawRecord> {
    let mut merger = HistoryMerger::default();
    merger.offer_all(raws);
    merger.finish()
}

/// The period after `period`, by decimal increment of the digit string.
///
/// Leading zeros and width are preserved; a carry out of the top digit
/// lengthens the string.
pub fn next_period(period: &str) -> String {
    let mut digits: Vec<u8> = period.trim().bytes().collect();
    let mut i = digits.len();
    loop {
        if i == 0 {
            digits.insert(0, b'1');
            break;
        }
        i -= 1;
        if digits[i] == b'9' {
            digits[i] = b'0';
        } else {
            digits[i] += 1;
            break;
        }
    }
    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SumWindow;

    fn raw(period: &str, entrants: &str) -> RawDraw {
        RawDraw::new(period, entrants, SumWindow::First3)
    }

    #[test]
    fn test_first_writer_wins() {
        let mut merger = HistoryMerger::default();
        assert!(merger.offer(&raw("100001", "1,2,3,4,5,6,7,8,9,10")));
        assert!(!merger.offer(&raw("100001", "10,9,8,7,6,5,4,3,2,1")));
        let history = merger.finish();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].champion(), 1);
    }

    #[test]
    fn test_sorted_descending_and_truncated() {
        let raws: Vec<RawDraw> = (0..70)
            .map(|i| raw(&format!("{}", 100_000 + (i * 13) % 70), "3,1,2,4,5,6,7,8,9,10"))
            .collect();
        let history = merge_history(&raws);
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert!(history.windows(2).all(|w| w[0].period > w[1].period));
        assert_eq!(history[0].period, "100069");
    }

    #[test]
    fn test_invalid_draws_are_counted_not_inserted() {
        let mut merger = HistoryMerger::default();
        assert!(!merger.offer(&raw("100001", "1,2,3")));
        assert_eq!(merger.rejected(), 1);
        assert!(merger.is_empty());
    }

    #[test]
    fn test_invalid_first_does_not_block_valid_later() {
        let mut merger = HistoryMerger::default();
        merger.offer(&raw("100001", "1,1,1"));
        assert!(merger.offer(&raw("100001", "2,1,3,4,5,6,7,8,9,10")));
        assert_eq!(merger.finish()[0].champion(), 2);
    }

    #[test]
    fn test_next_period() {
        assert_eq!(next_period("20240101001"), "20240101002");
        assert_eq!(next_period("100099"), "100100");
        assert_eq!(next_period("999999"), "1000000");
        assert_eq!(next_period("000009"), "000010");
    }
}
