//! Core data types for draws, recommendations, and refresh results.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of entrants in every draw.
pub const ENTRANT_COUNT: usize = 10;

/// Maximum number of draws kept in history.
pub const HISTORY_CAPACITY: usize = 50;

/// Sums at or above this value classify as "big".
pub const BIG_THRESHOLD: u32 = 14;

/// Which entrants contribute to a draw's sum.
///
/// API, text-line and manual rows sum the first three entrants; scraped HTML
/// rows sum all ten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SumWindow {
    First3,
    All,
}

impl SumWindow {
    /// Number of leading entrants summed.
    pub fn width(self) -> usize {
        match self {
            SumWindow::First3 => 3,
            SumWindow::All => ENTRANT_COUNT,
        }
    }
}

/// A draw as reported by a source adapter, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDraw {
    pub period: String,
    /// Entrant list as text, delimited by commas and/or whitespace.
    pub entrants: String,
    pub window: SumWindow,
}

impl RawDraw {
    pub fn new(period: impl Into<String>, entrants: impl Into<String>, window: SumWindow) -> Self {
        Self {
            period: period.into(),
            entrants: entrants.into(),
            window,
        }
    }
}

/// Big/small classification of a draw sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BigSmall {
    Big,
    Small,
}

/// Parity of a draw sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OddEven {
    Odd,
    Even,
}

/// One completed draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawRecord {
    pub period: String,
    /// Finishing order; position 0 is the champion.
    pub entrants: Vec<u8>,
    pub sum: u32,
    pub big_small: BigSmall,
    pub odd_even: OddEven,
}

impl DrawRecord {
    /// The entrant in first place.
    pub fn champion(&self) -> u8 {
        self.entrants[0]
    }

    /// Zero-based finishing position of an entrant, if present.
    pub fn position_of(&self, entrant: u8) -> Option<usize> {
        self.entrants.iter().position(|&e| e == entrant)
    }
}

/// Outcome state of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationStatus {
    Pending,
    Won,
    Lost,
}

/// Which positional pattern triggered a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternType {
    #[serde(rename = "Left-Right")]
    LeftRight,
    #[serde(rename = "Right-Left")]
    RightLeft,
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternType::LeftRight => f.write_str("Left-Right"),
            PatternType::RightLeft => f.write_str("Right-Left"),
        }
    }
}

/// One prediction cycle for a single upcoming period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// The period being predicted.
    pub period: String,
    /// Latest known period when this was generated.
    pub based_on_period: String,
    pub recommended_numbers: Vec<u8>,
    pub status: RecommendationStatus,
    pub actual_champion: Option<u8>,
    pub pattern_type: PatternType,
    pub betting_step: u8,
    pub profit: Option<i64>,
    pub create_time: DateTime<Utc>,
}

impl Recommendation {
    pub fn is_pending(&self) -> bool {
        self.status == RecommendationStatus::Pending
    }

    /// The slice of this recommendation an automation consumer needs.
    pub fn feed_item(&self) -> FeedItem {
        FeedItem {
            period: self.period.clone(),
            recommended_numbers: self.recommended_numbers.clone(),
            betting_step: self.betting_step,
        }
    }
}

/// Recommendation as exposed to external consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub period: String,
    pub recommended_numbers: Vec<u8>,
    pub betting_step: u8,
}

/// Result of one refresh of the draw source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSnapshot {
    /// Draws descending by period, at most [`HISTORY_CAPACITY`].
    pub draws: Vec<DrawRecord>,
    pub next_draw_time: Option<String>,
    pub seconds_left: Option<i64>,
    pub next_period: Option<String>,
}

/// Errors that can occur in the core library.
#[derive(thiserror::Error, Debug)]
pub enum PodiumError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid draw {period:?}: {reason}")]
    InvalidDraw { period: String, reason: String },

    #[error("Malformed manual input on line {line}: {hint}")]
    ManualInput { line: usize, hint: String },

    #[error("Extraction error: {0}")]
    Extraction(String),
}

/// Convenience result type.
pub type PodiumResult<T> = Result<T, PodiumError>;

/// Raised only when every extraction strategy came back empty.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("No draw data from any source strategy (transport failed: {transport_failed})")]
    Exhausted { transport_failed: bool },
}
