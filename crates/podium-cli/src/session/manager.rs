//! Podium session lifecycle: state file I/O, refresh and engine runs.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use podium::{
    demo_history, next_period, seed_history, Cycle, DrawPipeline, DrawRecord, EngineConfig,
    EngineContext, EngineStats, FeedItem, PipelineError, Recommendation, RecommendationEngine,
    RefreshSnapshot, HISTORY_CAPACITY,
};

use super::state::StateFile;
use crate::types::CliResult;

/// Draw number of the last demo period of the day.
const DEMO_DAY_LAST_DRAW: u64 = 120;

/// Owns the persisted history and recommendations for one state file.
pub struct PodiumSession {
    file_path: PathBuf,
    history: Vec<DrawRecord>,
    engine: RecommendationEngine,
    suppressed_period: Option<String>,
    dirty: bool,
}

/// Result of one refresh followed by an engine run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    pub snapshot: RefreshSnapshot,
    /// `None` when the engine did not run (demo data, or the source was exhausted).
    pub cycle: Option<Cycle>,
    /// The snapshot holds synthetic draws rather than source data.
    pub demo: bool,
    #[serde(skip)]
    pub exhausted: Option<PipelineError>,
}

/// Summary printed by `podium status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub state_file: String,
    pub history_len: usize,
    pub latest_period: Option<String>,
    pub next_period: Option<String>,
    pub suppressed_period: Option<String>,
    pub feed: Vec<FeedItem>,
    pub stats: EngineStats,
}

impl PodiumSession {
    /// Open the state file at `path`, starting empty if it does not exist.
    pub fn open(path: &str, config: EngineConfig) -> CliResult<Self> {
        let file_path = PathBuf::from(path);
        if file_path.exists() {
            tracing::info!("Opening state file: {}", file_path.display());
        } else {
            tracing::info!("Starting new state file: {}", file_path.display());
        }

        let state = StateFile::load(&file_path)?;
        state.validate(config.schedule.max_step)?;
        tracing::info!(
            "Loaded {} draws and {} recommendations",
            state.history.len(),
            state.recommendations.len()
        );

        Ok(Self {
            file_path,
            history: state.history,
            engine: RecommendationEngine::with_recommendations(config, state.recommendations),
            suppressed_period: state.suppressed_period,
            dirty: false,
        })
    }

    pub fn history(&self) -> &[DrawRecord] {
        &self.history
    }

    /// Recommendations, newest first.
    pub fn recommendations(&self) -> &[Recommendation] {
        self.engine.recommendations()
    }

    pub fn suppressed_period(&self) -> Option<&str> {
        self.suppressed_period.as_deref()
    }

    pub fn feed(&self) -> Vec<FeedItem> {
        self.engine.feed()
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Refresh from `source` and run the engine over the new history.
    ///
    /// An exhausted pipeline keeps the previous history. With no previous
    /// history the snapshot carries demo draws instead, and the engine is
    /// not run on them.
    pub async fn refresh(
        &mut self,
        pipeline: &DrawPipeline,
        source: &str,
    ) -> CliResult<RefreshOutcome> {
        match pipeline.refresh(source).await {
            Ok(snapshot) => {
                self.history = snapshot.draws.clone();
                self.dirty = true;
                let cycle = self.run_engine();
                self.save()?;
                Ok(RefreshOutcome {
                    snapshot,
                    cycle: Some(cycle),
                    demo: false,
                    exhausted: None,
                })
            }
            Err(err) => {
                tracing::warn!("Refresh failed: {err}");
                let (draws, demo) = if self.history.is_empty() {
                    tracing::warn!("No stored history, showing demo draws");
                    (demo_draws(), true)
                } else {
                    (self.history.clone(), false)
                };
                Ok(RefreshOutcome {
                    snapshot: RefreshSnapshot {
                        draws,
                        ..Default::default()
                    },
                    cycle: None,
                    demo,
                    exhausted: Some(err),
                })
            }
        }
    }

    /// Replace the history with a manual input block and run the engine.
    ///
    /// Malformed input is rejected before anything changes.
    pub fn seed(&mut self, text: &str) -> CliResult<Cycle> {
        let history = seed_history(text, HISTORY_CAPACITY)?;
        tracing::info!("Seeded {} draws from manual input", history.len());
        self.history = history;
        self.dirty = true;
        let cycle = self.run_engine();
        self.save()?;
        Ok(cycle)
    }

    /// Drop every recommendation and suppress the in-flight period.
    pub fn clear(&mut self) -> CliResult<Option<String>> {
        self.suppressed_period = self.engine.clear(&self.history);
        self.dirty = true;
        self.save()?;
        Ok(self.suppressed_period.clone())
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state_file: self.file_path.display().to_string(),
            history_len: self.history.len(),
            latest_period: self.history.first().map(|d| d.period.clone()),
            next_period: self.history.first().map(|d| next_period(&d.period)),
            suppressed_period: self.suppressed_period.clone(),
            feed: self.engine.feed(),
            stats: self.engine.stats(),
        }
    }

    /// Save to file if anything changed.
    pub fn save(&mut self) -> CliResult<()> {
        if !self.dirty {
            return Ok(());
        }

        let state = StateFile {
            history: self.history.clone(),
            recommendations: self.engine.recommendations().to_vec(),
            suppressed_period: self.suppressed_period.clone(),
        };
        state.store(&self.file_path)?;

        self.dirty = false;
        tracing::debug!("Saved state file: {}", self.file_path.display());
        Ok(())
    }

    fn run_engine(&mut self) -> Cycle {
        // The suppression only covers the period that was in flight at clear time.
        let lifted = match (&self.suppressed_period, self.history.first()) {
            (Some(suppressed), Some(latest)) => next_period(&latest.period) != *suppressed,
            _ => false,
        };
        if lifted {
            tracing::debug!("Suppression of period {:?} lifted", self.suppressed_period);
            self.suppressed_period = None;
        }

        let ctx = EngineContext::new(self.suppressed_period.clone());
        let cycle = self.engine.process(&self.history, &ctx);
        if !cycle.settled.is_empty() || cycle.generated.is_some() {
            self.dirty = true;
        }
        cycle
    }
}

impl Drop for PodiumSession {
    fn drop(&mut self) {
        if self.dirty {
            if let Err(e) = self.save() {
                tracing::error!("Failed to save on drop: {e}");
            }
        }
    }
}

/// Demo draws for today, numbered like the source's `yyyyMMddNNN` periods.
fn demo_draws() -> Vec<DrawRecord> {
    let now = Utc::now();
    let day: u64 = now.format("%Y%m%d").to_string().parse().unwrap_or_default();
    let latest = day * 1000 + DEMO_DAY_LAST_DRAW;
    demo_history(HISTORY_CAPACITY, latest, now.timestamp() as u64)
}
