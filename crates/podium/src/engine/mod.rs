//! Pattern recommendation engine.
//!
//! Each history update runs one settlement pass followed by at most one
//! generation pass. The engine owns the recommendation list; it holds no
//! other state, and anything the caller tracks between runs (such as the
//! period suppressed by a bulk clear) arrives through [`EngineContext`].

pub mod pattern;
pub mod staking;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::history::next_period;
use crate::types::{
    DrawRecord, FeedItem, PatternType, Recommendation, RecommendationStatus, HISTORY_CAPACITY,
};

pub use pattern::{detect_pattern, position_of, select_numbers, Side};
pub use staking::StakeSchedule;

/// Engine tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// History length required before recommendations are generated.
    pub min_history: usize,
    pub schedule: StakeSchedule,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_history: HISTORY_CAPACITY,
            schedule: StakeSchedule::default(),
        }
    }
}

/// Caller-held state passed in on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineContext {
    /// Period that must not be regenerated after a bulk clear.
    pub suppressed_period: Option<String>,
    /// Timestamp stamped on generated recommendations.
    pub now: DateTime<Utc>,
}

impl EngineContext {
    pub fn new(suppressed_period: Option<String>) -> Self {
        Self {
            suppressed_period,
            now: Utc::now(),
        }
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Why a run produced no new recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    InsufficientHistory { have: usize, need: usize },
    NoPattern,
    AlreadyRecommended { period: String },
    Suppressed { period: String },
    NoSelection,
}

/// Everything one engine run did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cycle {
    /// Recommendations settled in this run.
    pub settled: Vec<Recommendation>,
    pub pattern: Option<PatternType>,
    pub generated: Option<Recommendation>,
    pub skipped: Option<SkipReason>,
}

/// Aggregate results over the recommendation list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    pub total: usize,
    pub pending: usize,
    pub won: usize,
    pub lost: usize,
    /// Wins over settled recommendations, `0.0` when none settled.
    pub win_rate: f64,
    pub total_profit: i64,
    /// Consecutive losses counting back from the most recent settlement.
    pub losing_streak: usize,
}

/// Settlement and generation state machine over the draw history.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    /// Newest first.
    recommendations: Vec<Recommendation>,
    config: EngineConfig,
}

impl RecommendationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            recommendations: Vec::new(),
            config,
        }
    }

    /// Resume from a previously saved recommendation list (newest first).
    pub fn with_recommendations(
        config: EngineConfig,
        recommendations: Vec<Recommendation>,
    ) -> Self {
        Self {
            recommendations,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// All recommendations, newest first.
    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    pub fn into_recommendations(self) -> Vec<Recommendation> {
        self.recommendations
    }

    /// Settle what the history allows, then try to generate one recommendation.
    pub fn process(&mut self, history: &[DrawRecord], ctx: &EngineContext) -> Cycle {
        let settled = self.settle(history);
        let pattern = detect_pattern(history);

        let (generated, skipped) = match self.generate(history, ctx) {
            Ok(rec) => (Some(rec), None),
            Err(reason) => {
                tracing::debug!("engine: no recommendation this cycle: {reason:?}");
                (None, Some(reason))
            }
        };

        Cycle {
            settled,
            pattern,
            generated,
            skipped,
        }
    }

    /// Settle every pending recommendation whose period appears in `history`.
    pub fn settle(&mut self, history: &[DrawRecord]) -> Vec<Recommendation> {
        let schedule = self.config.schedule;
        let mut settled = Vec::new();

        for rec in self.recommendations.iter_mut().filter(|r| r.is_pending()) {
            let Some(draw) = history.iter().find(|d| d.period == rec.period) else {
                continue;
            };

            let champion = draw.champion();
            let won = rec.recommended_numbers.contains(&champion);
            rec.actual_champion = Some(champion);
            rec.status = if won {
                RecommendationStatus::Won
            } else {
                RecommendationStatus::Lost
            };
            rec.profit = Some(schedule.profit(rec.betting_step, won));

            tracing::info!(
                "engine: period {} settled {:?} (champion {champion}, step {}, profit {})",
                rec.period,
                rec.status,
                rec.betting_step,
                rec.profit.unwrap_or_default()
            );
            settled.push(rec.clone());
        }
        settled
    }

    /// Generate the recommendation for the period after the latest draw.
    ///
    /// This is the only path that adds recommendations.
    pub fn generate(
        &mut self,
        history: &[DrawRecord],
        ctx: &EngineContext,
    ) -> Result<Recommendation, SkipReason> {
        if history.len() < self.config.min_history {
            return Err(SkipReason::InsufficientHistory {
                have: history.len(),
                need: self.config.min_history,
            });
        }

        let pattern = detect_pattern(history).ok_or(SkipReason::NoPattern)?;

        let latest = &history[0];
        let period = next_period(&latest.period);
        if self.find(&period).is_some() {
            return Err(SkipReason::AlreadyRecommended { period });
        }
        if ctx.suppressed_period.as_deref() == Some(period.as_str()) {
            return Err(SkipReason::Suppressed { period });
        }

        let numbers = select_numbers(history).ok_or(SkipReason::NoSelection)?;
        let step = self.config.schedule.next_step(self.last_settled());

        let rec = Recommendation {
            period,
            based_on_period: latest.period.clone(),
            recommended_numbers: numbers,
            status: RecommendationStatus::Pending,
            actual_champion: None,
            pattern_type: pattern,
            betting_step: step,
            profit: None,
            create_time: ctx.now,
        };

        tracing::info!(
            "engine: {pattern} pattern, recommending {:?} for period {} at step {step}",
            rec.recommended_numbers,
            rec.period
        );
        self.recommendations.insert(0, rec.clone());
        Ok(rec)
    }

    /// Drop every recommendation.
    ///
    /// Returns the period that was in flight, which the caller should pass back
    /// as [`EngineContext::suppressed_period`] so it is not regenerated at once.
    pub fn clear(&mut self, history: &[DrawRecord]) -> Option<String> {
        let dropped = self.recommendations.len();
        self.recommendations.clear();
        let suppressed = history.first().map(|d| next_period(&d.period));
        tracing::info!("engine: cleared {dropped} recommendations, suppressing {suppressed:?}");
        suppressed
    }

    /// Recommendation for a given period, if any.
    pub fn find(&self, period: &str) -> Option<&Recommendation> {
        self.recommendations.iter().find(|r| r.period == period)
    }

    /// Most recent recommendation with a terminal status.
    pub fn last_settled(&self) -> Option<&Recommendation> {
        self.recommendations.iter().find(|r| !r.is_pending())
    }

    /// Feed items for every pending recommendation, newest first.
    pub fn feed(&self) -> Vec<FeedItem> {
        self.recommendations
            .iter()
            .filter(|r| r.is_pending())
            .map(Recommendation::feed_item)
            .collect()
    }

    pub fn stats(&self) -> EngineStats {
        let mut stats = EngineStats {
            total: self.recommendations.len(),
            ..Default::default()
        };

        for rec in &self.recommendations {
            match rec.status {
                RecommendationStatus::Pending => stats.pending += 1,
                RecommendationStatus::Won => stats.won += 1,
                RecommendationStatus::Lost => stats.lost += 1,
            }
            stats.total_profit += rec.profit.unwrap_or_default();
        }

        let settled = stats.won + stats.lost;
        if settled > 0 {
            stats.win_rate = stats.won as f64 / settled as f64;
        }
        stats.losing_streak = self
            .recommendations
            .iter()
            .filter(|r| !r.is_pending())
            .take_while(|r| r.status == RecommendationStatus::Lost)
            .count();

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::build_record;
    use crate::types::SumWindow;

    const IDENTITY: [u8; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

    fn draw(period: u64, entrants: [u8; 10]) -> DrawRecord {
        build_record(&period.to_string(), entrants.to_vec(), SumWindow::First3).unwrap()
    }

    /// 50 draws, latest period 100049, shaped to fire Left-Right:
    /// champions of h[1] and h[2] land left in h[47]/h[48], champion of h[0]
    /// lands right in h[46] at position `right_pos`.
    fn left_right_history(right_pos: usize) -> Vec<DrawRecord> {
        let mut history: Vec<DrawRecord> =
            (0..50u64).map(|i| draw(100_049 - i, IDENTITY)).collect();
        // h[0] champion 1; place 1 at right_pos in h[46]
        let mut target = IDENTITY;
        target.swap(0, right_pos);
        history[46] = draw(100_003, target);
        history
    }

    #[test]
    fn test_left_right_generates_once() {
        let history = left_right_history(7);
        let mut engine = RecommendationEngine::default();
        let ctx = EngineContext::default();

        let cycle = engine.process(&history, &ctx);
        assert_eq!(cycle.pattern, Some(PatternType::LeftRight));
        let rec = cycle.generated.expect("recommendation");
        assert_eq!(rec.period, "100050");
        assert_eq!(rec.based_on_period, "100049");
        assert_eq!(rec.betting_step, 1);
        assert_eq!(rec.recommended_numbers, vec![6, 7, 8, 9]);

        let again = engine.process(&history, &ctx);
        assert!(again.generated.is_none());
        assert_eq!(
            again.skipped,
            Some(SkipReason::AlreadyRecommended {
                period: "100050".into()
            })
        );
        assert_eq!(engine.recommendations().len(), 1);
    }

    #[test]
    fn test_right_left_pattern() {
        let mut history: Vec<DrawRecord> =
            (0..50u64).map(|i| draw(100_049 - i, IDENTITY)).collect();
        // h[1], h[2] champions are 1; put 1 in the right half of h[47], h[48]
        let mut right = IDENTITY;
        right.swap(0, 8);
        history[47] = draw(100_002, right);
        history[48] = draw(100_001, right);
        assert_eq!(detect_pattern(&history), Some(PatternType::RightLeft));
    }

    #[test]
    fn test_no_pattern_is_silent() {
        let history: Vec<DrawRecord> = (0..50u64).map(|i| draw(100_049 - i, IDENTITY)).collect();
        let mut engine = RecommendationEngine::default();
        let cycle = engine.process(&history, &EngineContext::default());
        assert!(cycle.generated.is_none());
        assert_eq!(cycle.skipped, Some(SkipReason::NoPattern));
    }

    #[test]
    fn test_insufficient_history_still_settles() {
        let history = left_right_history(7);
        let mut engine = RecommendationEngine::default();
        engine.process(&history, &EngineContext::default());

        // Only the new draw arrives; champion 6 is recommended.
        let short = vec![draw(100_050, [6, 1, 2, 3, 4, 5, 7, 8, 9, 10])];
        let cycle = engine.process(&short, &EngineContext::default());
        assert_eq!(cycle.settled.len(), 1);
        assert_eq!(cycle.settled[0].status, RecommendationStatus::Won);
        assert_eq!(cycle.settled[0].actual_champion, Some(6));
        assert_eq!(cycle.settled[0].profit, Some(59));
        assert!(matches!(
            cycle.skipped,
            Some(SkipReason::InsufficientHistory { have: 1, need: 50 })
        ));
    }

    #[test]
    fn test_settlement_loss_escalates_step() {
        let mut history = left_right_history(7);
        let mut engine = RecommendationEngine::default();
        engine.process(&history, &EngineContext::default());

        // Period 100050 is won by entrant 2, which was not recommended.
        history.insert(0, draw(100_050, [2, 1, 3, 4, 5, 6, 7, 8, 9, 10]));
        history.truncate(50);
        let cycle = engine.process(&history, &EngineContext::default());
        assert_eq!(cycle.settled[0].status, RecommendationStatus::Lost);
        assert_eq!(cycle.settled[0].profit, Some(-40));

        let last = engine.last_settled().unwrap();
        assert_eq!(engine.config().schedule.next_step(Some(last)), 2);
    }

    #[test]
    fn test_suppressed_period_is_not_regenerated() {
        let history = left_right_history(7);
        let mut engine = RecommendationEngine::default();
        engine.process(&history, &EngineContext::default());

        let suppressed = engine.clear(&history);
        assert_eq!(suppressed.as_deref(), Some("100050"));
        assert!(engine.recommendations().is_empty());

        let cycle = engine.process(&history, &EngineContext::new(suppressed));
        assert_eq!(
            cycle.skipped,
            Some(SkipReason::Suppressed {
                period: "100050".into()
            })
        );
        assert!(engine.recommendations().is_empty());
    }

    #[test]
    fn test_feed_and_stats() {
        let history = left_right_history(7);
        let mut engine = RecommendationEngine::default();
        engine.process(&history, &EngineContext::default());

        let feed = engine.feed();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].period, "100050");
        assert_eq!(feed[0].betting_step, 1);

        let stats = engine.stats();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.win_rate, 0.0);
    }
}
