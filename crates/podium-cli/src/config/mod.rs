//! Configuration loading and resolution.

use std::path::PathBuf;
use std::time::Duration;

use podium::pipeline::{PipelineConfig, DEFAULT_API_ENDPOINTS};

/// Environment variable naming the draw source URL.
pub const SOURCE_ENV: &str = "PODIUM_SOURCE";
/// Environment variable naming the state file.
pub const STATE_ENV: &str = "PODIUM_STATE";
/// Environment variable carrying the HTTP feed bearer token.
pub const TOKEN_ENV: &str = "PODIUM_TOKEN";

/// Default polling interval for `watch`.
pub const DEFAULT_POLL_SECS: u64 = 30;

/// Resolve the state file path.
pub fn resolve_state_path(explicit: Option<&str>) -> String {
    if let Some(path) = explicit {
        return path.to_string();
    }

    if let Ok(env_path) = std::env::var(STATE_ENV) {
        return env_path;
    }

    let cwd_state = PathBuf::from(".podium/state.json");
    if cwd_state.exists() {
        return cwd_state.display().to_string();
    }

    resolve_default_state_path()
}

fn resolve_default_state_path() -> String {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());

    format!("{home}/.podium/state.json")
}

/// Resolve the draw source URL: flag first, then environment.
pub fn resolve_source(explicit: Option<&str>) -> Option<String> {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(SOURCE_ENV).ok())
        .filter(|s| !s.trim().is_empty())
}

/// Resolve the HTTP feed bearer token: flag first, then environment.
pub fn resolve_token(explicit: Option<&str>) -> Option<String> {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(TOKEN_ENV).ok())
        .filter(|s| !s.is_empty())
}

/// Build the pipeline configuration from command-line overrides.
pub fn pipeline_config(api_endpoints: &[String], page_timeout_secs: Option<u64>) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    if !api_endpoints.is_empty() {
        config.api_endpoints = api_endpoints.to_vec();
    }
    if let Some(secs) = page_timeout_secs {
        config.page_timeout = Duration::from_secs(secs);
    }
    tracing::debug!(
        "config: {} api endpoints (defaults: {}), page timeout {:?}",
        config.api_endpoints.len(),
        DEFAULT_API_ENDPOINTS.len(),
        config.page_timeout
    );
    config
}
