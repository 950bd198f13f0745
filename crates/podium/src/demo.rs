//! Synthetic demonstration history.
//!
//! Used when every source strategy comes back empty and there is no earlier
//! history to keep showing. Output is deterministic for a given seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::normalize::build_record;
use crate::types::{DrawRecord, SumWindow};

/// `count` random but valid draws, descending from `latest_period`.
pub fn demo_history(count: usize, latest_period: u64, seed: u64) -> Vec<DrawRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut draws = Vec::with_capacity(count);

    for offset in 0..count as u64 {
        let Some(period) = latest_period.checked_sub(offset) else {
            break;
        };
        let mut entrants: Vec<u8> = (1..=10).collect();
        entrants.shuffle(&mut rng);
        if let Ok(record) = build_record(&period.to_string(), entrants, SumWindow::First3) {
            draws.push(record);
        }
    }
    draws
}
