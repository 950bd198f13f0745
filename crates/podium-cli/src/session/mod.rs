//! Session management for persisted draw history and recommendations.

pub mod manager;
pub mod state;

pub use manager::{PodiumSession, RefreshOutcome, SessionStatus};
pub use state::StateFile;
