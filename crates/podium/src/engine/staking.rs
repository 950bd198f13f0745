//! Capped martingale stake schedule.
//!
//! | step | base bet | cost | prize on win |
//! |------|----------|------|--------------|
//! | 1    | 10       | 40   | 99           |
//! | 2    | 20       | 80   | 198          |
//! | 3    | 40       | 160  | 396          |
//! | 4    | 80       | 320  | 792          |

use serde::{Deserialize, Serialize};

use crate::types::{Recommendation, RecommendationStatus};

/// Stake schedule parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeSchedule {
    /// Bet per number at step 1.
    pub base_bet: i64,
    /// Payout multiplier as a fraction, `payout_num / payout_den` (9.9 = 99/10).
    pub payout_num: i64,
    pub payout_den: i64,
    /// Highest step before the schedule resets.
    pub max_step: u8,
    /// Numbers covered per recommendation.
    pub numbers_per_bet: i64,
}

impl Default for StakeSchedule {
    fn default() -> Self {
        Self {
            base_bet: 10,
            payout_num: 99,
            payout_den: 10,
            max_step: 4,
            numbers_per_bet: 4,
        }
    }
}

impl StakeSchedule {
    /// Bet per number at `step`: `base_bet × 2^(step-1)`, with `step`
    /// clamped into `1..=max_step`.
    pub fn bet_per_number(&self, step: u8) -> i64 {
        let step = step.clamp(1, self.max_step.clamp(1, 32));
        self.base_bet << (step - 1)
    }

    /// Total outlay at `step`.
    pub fn cost(&self, step: u8) -> i64 {
        self.bet_per_number(step) * self.numbers_per_bet
    }

    /// Prize returned when one covered number wins at `step`.
    pub fn prize(&self, step: u8) -> i64 {
        self.bet_per_number(step) * self.payout_num / self.payout_den
    }

    /// Net result of settling at `step`.
    pub fn profit(&self, step: u8, won: bool) -> i64 {
        let prize = if won { self.prize(step) } else { 0 };
        prize - self.cost(step)
    }

    /// Step for the next recommendation given the last settled one.
    pub fn next_step(&self, last_settled: Option<&Recommendation>) -> u8 {
        match last_settled {
            Some(r) if r.status == RecommendationStatus::Lost && r.betting_step < self.max_step => {
                r.betting_step + 1
            }
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PatternType;
    use chrono::Utc;

    fn settled(step: u8, status: RecommendationStatus) -> Recommendation {
        Recommendation {
            period: "100".into(),
            based_on_period: "99".into(),
            recommended_numbers: vec![1, 2, 3, 4],
            status,
            actual_champion: Some(1),
            pattern_type: PatternType::LeftRight,
            betting_step: step,
            profit: Some(0),
            create_time: Utc::now(),
        }
    }

    #[test]
    fn test_schedule_table() {
        let s = StakeSchedule::default();
        let expected = [(1, 40, 99), (2, 80, 198), (3, 160, 396), (4, 320, 792)];
        for (step, cost, prize) in expected {
            assert_eq!(s.cost(step), cost, "cost at step {step}");
            assert_eq!(s.prize(step), prize, "prize at step {step}");
        }
    }

    #[test]
    fn test_profit() {
        let s = StakeSchedule::default();
        assert_eq!(s.profit(2, true), 118);
        assert_eq!(s.profit(3, false), -160);
        assert_eq!(s.profit(1, true), 59);
        assert_eq!(s.profit(4, false), -320);
    }

    #[test]
    fn test_out_of_range_steps_are_clamped() {
        let s = StakeSchedule::default();
        assert_eq!(s.cost(0), s.cost(1));
        assert_eq!(s.cost(70), s.cost(4));
        assert_eq!(s.profit(u8::MAX, true), s.profit(4, true));
        assert_eq!(s.next_step(Some(&settled(70, RecommendationStatus::Lost))), 1);
    }

    #[test]
    fn test_next_step() {
        let s = StakeSchedule::default();
        assert_eq!(s.next_step(None), 1);
        assert_eq!(s.next_step(Some(&settled(1, RecommendationStatus::Lost))), 2);
        assert_eq!(s.next_step(Some(&settled(3, RecommendationStatus::Lost))), 4);
        assert_eq!(s.next_step(Some(&settled(4, RecommendationStatus::Lost))), 1);
        assert_eq!(s.next_step(Some(&settled(3, RecommendationStatus::Won))), 1);
    }
}
