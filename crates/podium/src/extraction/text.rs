//! Last-resort free-text scanner.
//!
//! Looks for lines shaped like `<period> n n n n n n n n n n`: a period of at
//! least six digits followed by ten whitespace-separated 1–2 digit tokens.
//! Markup is blanked out line by line, so a row split across inline tags still
//! matches as long as it sits on one source line. Rows found this way classify
//! big/small on the first three entrants.

use regex::Regex;

use crate::types::{RawDraw, SumWindow};

/// Scan raw page text line by line for free-floating draw rows.
pub fn scan_text_lines(body: &str) -> Vec<RawDraw> {
    let tag_re = Regex::new(r"<[^>]*>").expect("tag regex is valid");
    let line_re = Regex::new(r"\b(\d{6,})\s+(\d{1,2}(?:\s+\d{1,2}){8})\s+(\d{1,2})\b")
        .expect("text line regex is valid");

    let mut draws = Vec::new();
    for line in body.lines() {
        let plain = tag_re.replace_all(line, " ").replace("&nbsp;", " ");
        for caps in line_re.captures_iter(&plain) {
            let nine = caps[2].split_whitespace().collect::<Vec<_>>().join(",");
            draws.push(RawDraw::new(
                &caps[1],
                format!("{nine},{}", &caps[3]),
                SumWindow::First3,
            ));
        }
    }
    draws
}
