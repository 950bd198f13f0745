//! On-disk state: history, recommendations and the suppressed period.

use std::path::Path;

use serde::{Deserialize, Serialize};

use podium::normalize::validate_record;
use podium::{DrawRecord, Recommendation};

use crate::types::{CliError, CliResult};

/// Everything persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateFile {
    /// Descending by period.
    #[serde(default)]
    pub history: Vec<DrawRecord>,
    /// Newest first.
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppressed_period: Option<String>,
}

impl StateFile {
    /// Read a state file. A missing file yields the empty state.
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| CliError::State(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Reject hand-edited content the engine cannot run on: malformed draws
    /// and betting steps outside `1..=max_step`.
    pub fn validate(&self, max_step: u8) -> CliResult<()> {
        for record in &self.history {
            validate_record(record).map_err(|e| CliError::State(e.to_string()))?;
        }
        for rec in &self.recommendations {
            if !(1..=max_step).contains(&rec.betting_step) {
                return Err(CliError::State(format!(
                    "Recommendation for period {} has betting step {} outside 1..={max_step}",
                    rec.period, rec.betting_step
                )));
            }
        }
        Ok(())
    }

    /// Write as pretty JSON through a temp file and rename.
    pub fn store(&self, path: &Path) -> CliResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                CliError::State(format!("Failed to create directory {}: {e}", parent.display()))
            })?;
        }

        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}
