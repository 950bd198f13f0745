//! Error types for the command-line front end.

use podium::{PipelineError, PodiumError};

/// All errors that can occur outside the core library.
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("State file error: {0}")]
    State(String),

    #[error("Missing source URL: pass --source or set {0}")]
    MissingSource(&'static str),

    #[error(transparent)]
    Podium(#[from] PodiumError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or invalid bearer token on the HTTP feed.
    #[error("Unauthorized")]
    Unauthorized,
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::MissingSource(_) => 2,
            CliError::Podium(PodiumError::ManualInput { .. }) => 3,
            CliError::Pipeline(_) => 4,
            _ => 1,
        }
    }
}

/// Convenience result type.
pub type CliResult<T> = Result<T, CliError>;
