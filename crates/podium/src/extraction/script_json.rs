//! Draw rows embedded as JSON literals inside `<script>` bodies.
//!
//! Pages often ship their initial state as a JavaScript assignment such as
//! `var list = [{issue: '100001', code: '1,2,...'}];`. Array-of-object
//! literals are located with a bracket-balanced scan, then parsed leniently:
//! strict JSON first, and if that fails, again after quoting bare keys,
//! converting single-quoted strings and dropping trailing commas.

use regex::Regex;
use scraper::Html;
use serde_json::Value;

use super::{raw_from_object, selector};
use crate::types::{PodiumResult, RawDraw, SumWindow};

/// Scan every script body for array-of-object literals and map their rows.
pub fn scrape_script_json(document: &Html) -> PodiumResult<Vec<RawDraw>> {
    let script_sel = selector("script")?;

    let mut draws = Vec::new();
    for script in document.select(&script_sel) {
        let body: String = script.text().collect();
        for literal in find_object_arrays(&body) {
            match parse_lenient(literal) {
                Some(Value::Array(items)) => {
                    draws.extend(
                        items
                            .iter()
                            .filter_map(|item| raw_from_object(item, SumWindow::All)),
                    );
                }
                _ => tracing::debug!(
                    "script-json: could not parse literal of {} bytes",
                    literal.len()
                ),
            }
        }
    }
    Ok(draws)
}

/// Locate top-level `[ { ... } ]` literals, honoring nesting and strings.
pub fn find_object_arrays(source: &str) -> Vec<&str> {
    let bytes = source.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'[' && next_non_ws(bytes, i + 1) == Some(b'{') {
            if let Some(end) = matching_close(bytes, i) {
                found.push(&source[i..=end]);
                i = end + 1;
                continue;
            }
        }
        i += 1;
    }
    found
}

fn next_non_ws(bytes: &[u8], from: usize) -> Option<u8> {
    bytes[from.min(bytes.len())..]
        .iter()
        .copied()
        .find(|b| !b.is_ascii_whitespace())
}

/// Index of the `]` closing the `[` at `open`.
fn matching_close(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut escaped = false;

    for (offset, &b) in bytes[open..].iter().enumerate() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' => quote = Some(b),
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return (b == b']').then_some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a JavaScript-ish literal as JSON, repairing common deviations.
pub fn parse_lenient(literal: &str) -> Option<Value> {
    if let Ok(v) = serde_json::from_str(literal) {
        return Some(v);
    }

    let key_re =
        Regex::new(r#"([\{,]\s*)([A-Za-z_$][\w$]*)\s*:"#).expect("bare key regex is valid");
    let trailing_re = Regex::new(r",\s*([\]\}])").expect("trailing comma regex is valid");

    let repaired = single_to_double_quotes(literal);
    let repaired = key_re.replace_all(&repaired, r#"$1"$2":"#);
    let repaired = trailing_re.replace_all(&repaired, "$1");

    serde_json::from_str(&repaired).ok()
}

fn single_to_double_quotes(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in source.chars() {
        match quote {
            None => {
                if c == '\'' {
                    quote = Some('\'');
                    out.push('"');
                } else {
                    if c == '"' {
                        quote = Some('"');
                    }
                    out.push(c);
                }
            }
            Some(q) => {
                if escaped {
                    escaped = false;
                    if q == '\'' && c == '\'' {
                        out.pop();
                        out.push('\'');
                    } else {
                        out.push(c);
                    }
                } else if c == '\\' {
                    escaped = true;
                    out.push(c);
                } else if c == q {
                    quote = None;
                    out.push('"');
                } else if q == '\'' && c == '"' {
                    out.push_str("\\\"");
                } else {
                    out.push(c);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_object_arrays_skips_plain_arrays() {
        let src = r#"var a = [1, 2, 3]; var b = [ {"x": "]"}, {"y": [1]} ]; done();"#;
        let found = find_object_arrays(src);
        assert_eq!(found, vec![r#"[ {"x": "]"}, {"y": [1]} ]"#]);
    }

    #[test]
    fn test_parse_lenient_js_literal() {
        let v = parse_lenient("[{issue: '100001', code: '1,2,3,4,5,6,7,8,9,10',},]").unwrap();
        assert_eq!(v[0]["issue"], "100001");
        assert_eq!(v[0]["code"], "1,2,3,4,5,6,7,8,9,10");
    }

    #[test]
    fn test_parse_lenient_escaped_quotes() {
        let v = parse_lenient(r#"[{name: 'it\'s "ok"'}]"#).unwrap();
        assert_eq!(v[0]["name"], r#"it's "ok""#);
    }

    #[test]
    fn test_scrape_script_json() {
        let html = r#"<html><head><script>
            window.__STATE__ = { history: [
                {expect: '100002', opencode: '02,01,03,04,05,06,07,08,09,10'},
                {"issue": "100001", "numbers": [1,2,3,4,5,6,7,8,9,10]}
            ] };
        </script></head><body></body></html>"#;
        let doc = Html::parse_document(html);
        let draws = scrape_script_json(&doc).unwrap();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].period, "100002");
        assert_eq!(draws[1].entrants, "1,2,3,4,5,6,7,8,9,10");
        assert!(draws.iter().all(|d| d.window == SumWindow::All));
    }
}
