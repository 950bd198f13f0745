//! Podium: draw history extraction and positional pattern recommendations
//! for 10-entrant race games.

pub mod demo;
pub mod engine;
pub mod extraction;
pub mod history;
pub mod http_client;
pub mod manual;
pub mod normalize;
pub mod pipeline;
pub mod types;

pub use demo::demo_history;
pub use engine::{
    Cycle, EngineConfig, EngineContext, EngineStats, RecommendationEngine, SkipReason,
    StakeSchedule,
};
pub use extraction::NextDrawInfo;
pub use history::{merge_history, next_period, HistoryMerger};
pub use http_client::HttpClient;
pub use manual::{parse_manual_input, seed_history, MANUAL_FORMAT_HINT};
pub use normalize::normalize;
pub use pipeline::{DrawPipeline, PipelineConfig, RefreshReport};
pub use types::*;
