//! Layered draw extraction.
//!
//! Each source shape has its own adapter: the structured API ([`api`]), the
//! HTML scraping strategies ([`scrape`], with embedded script data handled by
//! [`script_json`]), the free-text line scanner ([`text`]) and the next-draw
//! estimator ([`countdown`]). Adapters only extract; merging and ordering
//! belong to [`crate::history`], and sequencing to [`crate::pipeline`].

pub mod api;
pub mod countdown;
pub mod scrape;
pub mod script_json;
pub mod text;

use scraper::Selector;
use serde_json::Value;

use crate::types::{PodiumError, PodiumResult, RawDraw, SumWindow};

pub use api::{parse_api_payload, ApiPayload};
pub use countdown::{estimate_next_draw, NextDrawInfo};
pub use scrape::{scrape_page, ScrapeOutcome, ScrapeStrategy, SCRAPE_STRATEGIES};
pub use text::scan_text_lines;

/// Field names that carry a completed draw's period, in lookup order.
pub const PERIOD_KEYS: &[&str] = &[
    "preDrawIssue",
    "issue",
    "expect",
    "period",
    "periodNo",
    "qihao",
    "term",
    "drawNo",
    "draw_no",
];

/// Field names that carry a draw's entrant order, in lookup order.
pub const ENTRANT_KEYS: &[&str] = &[
    "preDrawCode",
    "code",
    "opencode",
    "openCode",
    "open_code",
    "numbers",
    "nums",
    "balls",
    "result",
];

/// Map a JSON object with any of the known field spellings to a raw draw.
pub fn raw_from_object(value: &Value, window: SumWindow) -> Option<RawDraw> {
    let obj = value.as_object()?;

    let period = PERIOD_KEYS
        .iter()
        .find_map(|k| obj.get(*k).and_then(scalar_text))?;
    let entrants = ENTRANT_KEYS
        .iter()
        .find_map(|k| obj.get(*k).and_then(entrant_text))?;

    Some(RawDraw::new(period, entrants, window))
}

/// A string or number rendered as trimmed text.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// An entrant list given either as delimited text or as an array.
fn entrant_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            (!parts.is_empty()).then(|| parts.join(","))
        }
        other => scalar_text(other),
    }
}

pub(crate) fn selector(css: &str) -> PodiumResult<Selector> {
    Selector::parse(css).map_err(|e| PodiumError::Extraction(format!("bad selector {css:?}: {e}")))
}

/// Concatenated text of an element, whitespace-separated.
pub(crate) fn element_text(el: &scraper::ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_from_object_string_code() {
        let v = json!({"preDrawIssue": 33123456, "preDrawCode": "03,01,02,04,05,06,07,08,09,10"});
        let raw = raw_from_object(&v, SumWindow::First3).unwrap();
        assert_eq!(raw.period, "33123456");
        assert_eq!(raw.entrants, "03,01,02,04,05,06,07,08,09,10");
        assert_eq!(raw.window, SumWindow::First3);
    }

    #[test]
    fn test_raw_from_object_array_code() {
        let v = json!({"issue": "100200", "numbers": [2, 1, 3, 4, 5, 6, 7, 8, 9, 10]});
        let raw = raw_from_object(&v, SumWindow::All).unwrap();
        assert_eq!(raw.period, "100200");
        assert_eq!(raw.entrants, "2,1,3,4,5,6,7,8,9,10");
    }

    #[test]
    fn test_raw_from_object_missing_fields() {
        assert!(raw_from_object(&json!({"issue": "1"}), SumWindow::All).is_none());
        assert!(raw_from_object(&json!({"code": "1,2"}), SumWindow::All).is_none());
        assert!(raw_from_object(&json!([1, 2]), SumWindow::All).is_none());
    }
}
