//! Podium command-line front end: state persistence, polling and the HTTP feed.

pub mod config;
pub mod session;
pub mod transport;
pub mod types;

pub use config::resolve_state_path;
pub use session::PodiumSession;
pub use types::{CliError, CliResult};
