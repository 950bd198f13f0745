//! Structured JSON API adapter.
//!
//! Known draw APIs wrap their rows in a handful of envelope shapes:
//! `{"result": {"data": [...]}}`, `{"data": [...]}`, `{"list": [...]}`, a bare
//! array, or a single latest-draw object under `result`/`data`. Rows are
//! mapped through the shared field spellings in [`super::PERIOD_KEYS`] and
//! [`super::ENTRANT_KEYS`]. API rows classify big/small on the first three
//! entrants.

use serde_json::Value;

use super::{raw_from_object, scalar_text};
use crate::types::{PodiumResult, RawDraw, SumWindow};

/// Field names that carry the next scheduled draw time.
const NEXT_TIME_KEYS: &[&str] = &["nextDrawTime", "drawTime", "next_time", "nextTime"];

/// Draws and hints extracted from one API response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiPayload {
    pub draws: Vec<RawDraw>,
    pub next_draw_time: Option<String>,
}

/// Parse one API response body.
///
/// A body that is not JSON is an error; JSON without recognizable rows is an
/// empty payload.
pub fn parse_api_payload(body: &str) -> PodiumResult<ApiPayload> {
    let value: Value = serde_json::from_str(body.trim_start_matches('\u{feff}'))?;

    let rows = locate_rows(&value);
    let draws = rows
        .iter()
        .filter_map(|row| raw_from_object(row, SumWindow::First3))
        .collect();

    let next_draw_time = hint_sources(&value, &rows)
        .into_iter()
        .find_map(|obj| {
            NEXT_TIME_KEYS
                .iter()
                .find_map(|k| obj.get(*k).and_then(scalar_text))
        });

    Ok(ApiPayload {
        draws,
        next_draw_time,
    })
}

fn locate_rows(value: &Value) -> Vec<&Value> {
    if let Some(items) = value.as_array() {
        return items.iter().collect();
    }

    const ARRAY_PATHS: &[&[&str]] = &[
        &["result", "data"],
        &["result", "list"],
        &["data", "list"],
        &["data"],
        &["list"],
        &["rows"],
    ];
    for path in ARRAY_PATHS {
        if let Some(items) = walk(value, path).and_then(Value::as_array) {
            return items.iter().collect();
        }
    }

    const OBJECT_PATHS: &[&[&str]] = &[&["result", "data"], &["result"], &["data"]];
    for path in OBJECT_PATHS {
        if let Some(obj) = walk(value, path).filter(|v| v.is_object()) {
            if raw_from_object(obj, SumWindow::First3).is_some() {
                return vec![obj];
            }
        }
    }

    if raw_from_object(value, SumWindow::First3).is_some() {
        return vec![value];
    }

    Vec::new()
}

/// Objects that may carry a next-draw-time hint, most specific first.
fn hint_sources<'a>(value: &'a Value, rows: &[&'a Value]) -> Vec<&'a Value> {
    let mut sources = Vec::new();
    if let Some(first) = rows.first() {
        sources.push(*first);
    }
    for path in [&["result", "data"][..], &["result"][..], &["data"][..]] {
        if let Some(obj) = walk(value, path).filter(|v| v.is_object()) {
            sources.push(obj);
        }
    }
    sources.push(value);
    sources
}

fn walk<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(*key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_data_envelope() {
        let body = r#"{
            "errorCode": 0,
            "result": {
                "businessCode": 0,
                "data": [
                    {"preDrawIssue": 33100002, "preDrawCode": "05,02,09,01,03,04,06,07,08,10", "drawTime": "2024-01-01 10:05:00"},
                    {"preDrawIssue": 33100001, "preDrawCode": "01,02,03,04,05,06,07,08,09,10"}
                ]
            }
        }"#;
        let payload = parse_api_payload(body).unwrap();
        assert_eq!(payload.draws.len(), 2);
        assert_eq!(payload.draws[0].period, "33100002");
        assert_eq!(payload.draws[0].window, SumWindow::First3);
        assert_eq!(payload.next_draw_time.as_deref(), Some("2024-01-01 10:05:00"));
    }

    #[test]
    fn test_single_object_envelope() {
        let body = r#"{"result": {"data": {"preDrawIssue": "33100003", "preDrawCode": "1,2,3,4,5,6,7,8,9,10", "drawTime": "10:10"}}}"#;
        let payload = parse_api_payload(body).unwrap();
        assert_eq!(payload.draws.len(), 1);
        assert_eq!(payload.next_draw_time.as_deref(), Some("10:10"));
    }

    #[test]
    fn test_bare_array_alternate_names() {
        let body = r#"[{"expect": "100001", "opencode": "2,1,3,4,5,6,7,8,9,10"}]"#;
        let payload = parse_api_payload(body).unwrap();
        assert_eq!(payload.draws[0].period, "100001");
        assert!(payload.next_draw_time.is_none());
    }

    #[test]
    fn test_json_without_rows_is_empty() {
        let payload = parse_api_payload(r#"{"status": "maintenance"}"#).unwrap();
        assert!(payload.draws.is_empty());
    }

    #[test]
    fn test_non_json_is_error() {
        assert!(parse_api_payload("<html>blocked</html>").is_err());
    }
}
