//! Next-draw estimation from page text.
//!
//! Draws run on a fixed ~5 minute cadence, so an `MM:SS` value only counts
//! as a countdown when its minutes are below 6. Larger values are clock-of-day
//! text. Rules run in priority order and each output field is filled at most
//! once; a later rule never overwrites an earlier one.

use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Serialize};

use super::{element_text, selector};

/// Minutes at or above this value are not a countdown.
const MAX_COUNTDOWN_MINUTES: u32 = 6;

/// Upcoming-draw hints gathered from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextDrawInfo {
    pub next_draw_time: Option<String>,
    pub seconds_left: Option<i64>,
    pub next_period: Option<String>,
}

impl NextDrawInfo {
    /// Fill every still-empty field from `other`.
    pub fn fill_from(&mut self, other: NextDrawInfo) {
        if self.next_draw_time.is_none() {
            self.next_draw_time = other.next_draw_time;
        }
        if self.seconds_left.is_none() {
            self.seconds_left = other.seconds_left;
        }
        if self.next_period.is_none() {
            self.next_period = other.next_period;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.next_draw_time.is_none() && self.seconds_left.is_none() && self.next_period.is_none()
    }

    fn set_time(&mut self, value: impl Into<String>) {
        self.next_draw_time.get_or_insert_with(|| value.into());
    }

    fn set_seconds(&mut self, value: i64) {
        self.seconds_left.get_or_insert(value);
    }

    fn set_period(&mut self, value: impl Into<String>) {
        self.next_period.get_or_insert_with(|| value.into());
    }
}

/// Run every next-draw rule against a fetched page.
pub fn estimate_next_draw(html: &str) -> NextDrawInfo {
    let document = Html::parse_document(html);
    let text = visible_text(&document);
    let mut info = NextDrawInfo::default();

    // (i) next-draw label, period, then a timer
    let labeled_re = Regex::new(
        r"(?i)(?:next\s*draw|下期|下一期)[^\d]{0,40}?(\d{6,})[\s\S]{0,120}?(\d{1,2}):(\d{2})\b",
    )
    .expect("labeled countdown regex is valid");
    if let Some(caps) = labeled_re.captures(&text) {
        let (minutes, seconds) = (number(&caps[2]), number(&caps[3]));
        info.set_period(&caps[1]);
        if minutes < MAX_COUNTDOWN_MINUTES && seconds < 60 {
            info.set_seconds(i64::from(minutes * 60 + seconds));
        } else {
            info.set_time(format!("{}:{}", &caps[2], &caps[3]));
        }
    }

    // (ii) first bare MM:SS, else (iii) M分S秒
    if info.seconds_left.is_none() {
        let cn_re =
            Regex::new(r"(\d{1,2})\s*分\s*(\d{1,2})\s*秒").expect("cn countdown regex is valid");
        if let Some((minutes, seconds, literal)) = first_mmss(&text) {
            match countdown_seconds(minutes, seconds) {
                Some(secs) => info.set_seconds(secs),
                None => info.set_time(literal),
            }
        } else if let Some(caps) = cn_re.captures(&text) {
            info.set_seconds(i64::from(number(&caps[1]) * 60 + number(&caps[2])));
        }
    }

    // (iv) labeled time of day
    let time_re = Regex::new(
        r"(?i)(?:next\s*draw(?:\s*time)?|draw\s*time|开奖时间)\s*[:：]?\s*(\d{1,2}:\d{2})\b",
    )
    .expect("labeled time regex is valid");
    if let Some(caps) = time_re.captures(&text) {
        info.set_time(&caps[1]);
    }

    // (v) labeled bare period
    let period_re = Regex::new(r"(?i)(?:next\s*(?:draw|period|issue)|下期|下一期)\D{0,20}?(\d{6,})")
        .expect("labeled period regex is valid");
    if let Some(caps) = period_re.captures(&text) {
        info.set_period(&caps[1]);
    }

    // (vi) countdown/timer element
    if info.seconds_left.is_none() {
        if let Some(secs) = timer_element_seconds(&document) {
            info.set_seconds(secs);
        }
    }

    info
}

/// First standalone `MM:SS` in the text, ignoring `HH:MM:SS` clocks.
fn first_mmss(text: &str) -> Option<(u32, u32, String)> {
    let mmss_re = Regex::new(r"(?:^|[^\d:])(\d{1,2}):(\d{2})(?:$|[^\d:])")
        .expect("mmss regex is valid");
    let caps = mmss_re.captures(text)?;
    let literal = format!("{}:{}", &caps[1], &caps[2]);
    Some((number(&caps[1]), number(&caps[2]), literal))
}

/// Seconds left when `minutes:seconds` reads as a countdown.
fn countdown_seconds(minutes: u32, seconds: u32) -> Option<i64> {
    (minutes < MAX_COUNTDOWN_MINUTES && seconds < 60).then(|| i64::from(minutes * 60 + seconds))
}

fn timer_element_seconds(document: &Html) -> Option<i64> {
    let timer_sel = selector(
        r#"[class*="countdown"], [id*="countdown"], [class*="count-down"], [class*="timer"], [id*="timer"]"#,
    )
    .ok()?;
    document
        .select(&timer_sel)
        .next()
        .and_then(|el| first_mmss(&element_text(&el)))
        .and_then(|(minutes, seconds, _)| countdown_seconds(minutes, seconds))
}

/// Text content outside `<script>` and `<style>`.
fn visible_text(document: &Html) -> String {
    document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let parent = node
                .parent()
                .and_then(|p| p.value().as_element().map(|e| e.name().to_string()));
            match parent.as_deref() {
                Some("script") | Some("style") => None,
                _ => Some(text.trim()),
            }
        })
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn number(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}
