//! HTML scraping strategies.
//!
//! The strategies form an ordered registry that [`scrape_page`] walks until
//! one of them yields a valid draw. All public entry points are synchronous
//! because the `scraper` crate's types are `!Send`; the page is parsed and
//! dropped inside [`scrape_page`] so async callers never hold it across an
//! await point.
//!
//! Scraped rows classify big/small on all ten entrants.

use regex::Regex;
use scraper::Html;

use super::{element_text, script_json, selector};
use crate::normalize::normalize;
use crate::types::{PodiumResult, RawDraw, SumWindow, ENTRANT_COUNT};

/// One named scraping strategy.
#[derive(Clone, Copy)]
pub struct ScrapeStrategy {
    pub name: &'static str,
    pub run: fn(&Html) -> PodiumResult<Vec<RawDraw>>,
}

/// Scraping strategies in priority order.
pub const SCRAPE_STRATEGIES: &[ScrapeStrategy] = &[
    ScrapeStrategy {
        name: "result-cards",
        run: scrape_result_cards,
    },
    ScrapeStrategy {
        name: "generic-containers",
        run: scrape_generic_containers,
    },
    ScrapeStrategy {
        name: "script-json",
        run: script_json::scrape_script_json,
    },
    ScrapeStrategy {
        name: "tables",
        run: scrape_tables,
    },
];

/// Draws found by the first productive strategy.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOutcome {
    pub draws: Vec<RawDraw>,
    /// Name of the strategy that produced `draws`.
    pub strategy: Option<&'static str>,
    /// Strategies that failed outright, with their error text.
    pub failures: Vec<(&'static str, String)>,
}

/// Run the scraping strategies over a page until one yields a valid draw.
pub fn scrape_page(html: &str) -> ScrapeOutcome {
    let document = Html::parse_document(html);
    let mut outcome = ScrapeOutcome::default();

    for strategy in SCRAPE_STRATEGIES {
        match (strategy.run)(&document) {
            Ok(draws) => {
                let valid = draws.iter().filter(|d| normalize(d).is_ok()).count();
                if valid > 0 {
                    tracing::debug!(
                        "scrape: strategy '{}' yielded {} candidates ({} valid)",
                        strategy.name,
                        draws.len(),
                        valid
                    );
                    outcome.draws = draws;
                    outcome.strategy = Some(strategy.name);
                    return outcome;
                }
                tracing::debug!("scrape: strategy '{}' found nothing", strategy.name);
            }
            Err(e) => {
                tracing::warn!("scrape: strategy '{}' failed: {e}", strategy.name);
                outcome.failures.push((strategy.name, e.to_string()));
            }
        }
    }

    outcome
}

/// Repeated result cards with a `Draw: <id>` label and numbered ball elements.
pub fn scrape_result_cards(document: &Html) -> PodiumResult<Vec<RawDraw>> {
    let card_sel = selector(
        r#"[class*="result-card"], [class*="draw-card"], [class*="draw-result"], [class*="result-item"]"#,
    )?;
    let ball_sel = selector(r#"[class*="ball"]"#)?;
    let label_re = Regex::new(r"(?i)draw\s*[:：#]?\s*(\d+)").expect("draw label regex is valid");

    let mut draws = Vec::new();
    for card in document.select(&card_sel) {
        let text = element_text(&card);
        let Some(period) = label_re.captures(&text).and_then(|c| c.get(1)) else {
            continue;
        };

        let balls: Vec<String> = card
            .select(&ball_sel)
            .map(|b| element_text(&b))
            .filter(|t| is_ball_token(t))
            .collect();
        if balls.len() < ENTRANT_COUNT {
            continue;
        }

        draws.push(RawDraw::new(
            period.as_str(),
            balls[..ENTRANT_COUNT].join(","),
            SumWindow::All,
        ));
    }
    Ok(draws)
}

/// Any block element with a draw label followed by a long number, and at
/// least ten 1–2 digit text nodes inside it.
pub fn scrape_generic_containers(document: &Html) -> PodiumResult<Vec<RawDraw>> {
    let block_sel = selector("div, li, tr, section, article, p, ul")?;
    let label_re = Regex::new(r"(?i)(?:draw|period|issue|期)\s*[:：#]?\s*(\d{5,})")
        .expect("container label regex is valid");

    let mut draws = Vec::new();
    for block in document.select(&block_sel) {
        let text = element_text(&block);
        let Some(period) = label_re.captures(&text).and_then(|c| c.get(1)) else {
            continue;
        };

        let balls: Vec<&str> = block
            .text()
            .map(str::trim)
            .filter(|t| is_ball_token(t))
            .collect();
        if balls.len() < ENTRANT_COUNT {
            continue;
        }

        draws.push(RawDraw::new(
            period.as_str(),
            balls[..ENTRANT_COUNT].join(","),
            SumWindow::All,
        ));
    }
    Ok(draws)
}

/// Table rows: cell 0 is the period, cell 1 the entrant list.
pub fn scrape_tables(document: &Html) -> PodiumResult<Vec<RawDraw>> {
    let row_sel = selector("tr")?;
    let cell_sel = selector("td, th")?;

    let mut draws = Vec::new();
    for row in document.select(&row_sel) {
        let cells: Vec<String> = row.select(&cell_sel).map(|c| element_text(&c)).collect();
        if cells.len() < 2 {
            continue;
        }

        let period: String = cells[0].chars().take_while(char::is_ascii_digit).collect();
        if period.is_empty() {
            continue;
        }

        draws.push(RawDraw::new(period, cells[1].clone(), SumWindow::All));
    }
    Ok(draws)
}

fn is_ball_token(text: &str) -> bool {
    !text.is_empty() && text.len() <= 2 && text.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balls(nums: &[u8]) -> String {
        nums.iter()
            .map(|n| format!(r#"<span class="ball ball-{n}">{n:02}</span>"#))
            .collect()
    }

    #[test]
    fn test_result_cards() {
        let html = format!(
            r#"<html><body>
            <div class="result-card"><span class="label">Draw: 33100002</span><div class="balls">{}</div></div>
            <div class="result-card"><span class="label">Draw: 33100001</span><div class="balls">{}</div></div>
            </body></html>"#,
            balls(&[3, 1, 2, 4, 5, 6, 7, 8, 9, 10]),
            balls(&[10, 9, 8, 7, 6, 5, 4, 3, 2, 1]),
        );
        let doc = Html::parse_document(&html);
        let draws = scrape_result_cards(&doc).unwrap();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].period, "33100002");
        assert_eq!(draws[0].entrants, "03,01,02,04,05,06,07,08,09,10");
        assert_eq!(draws[0].window, SumWindow::All);
    }

    #[test]
    fn test_result_card_with_too_few_balls_is_skipped() {
        let html = format!(
            r#"<div class="result-card">Draw: 33100002 {}</div>"#,
            balls(&[1, 2, 3])
        );
        let doc = Html::parse_document(&html);
        assert!(scrape_result_cards(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_generic_containers() {
        let html = r#"<ul>
            <li>Period 20240101001 <i>4</i><i>2</i><i>1</i><i>3</i><i>5</i><i>6</i><i>7</i><i>8</i><i>9</i><i>10</i></li>
        </ul>"#;
        let doc = Html::parse_document(html);
        let draws = scrape_generic_containers(&doc).unwrap();
        assert_eq!(draws.len(), 2, "both <ul> and <li> match");
        assert!(draws.iter().all(|d| d.period == "20240101001"));
        assert_eq!(draws[0].entrants, "4,2,1,3,5,6,7,8,9,10");
    }

    #[test]
    fn test_generic_container_period_follows_the_label() {
        let html = r#"<ul>
            <li><span>20240501</span> Draw: 33100002 <i>4</i><i>2</i><i>1</i><i>3</i><i>5</i><i>6</i><i>7</i><i>8</i><i>9</i><i>10</i></li>
        </ul>"#;
        let doc = Html::parse_document(html);
        let draws = scrape_generic_containers(&doc).unwrap();
        assert!(!draws.is_empty());
        assert!(draws.iter().all(|d| d.period == "33100002"));
    }

    #[test]
    fn test_generic_container_without_labeled_period_is_skipped() {
        let html = r#"<div>Draw results 20240501 <i>4</i><i>2</i><i>1</i><i>3</i><i>5</i><i>6</i><i>7</i><i>8</i><i>9</i><i>10</i></div>"#;
        let doc = Html::parse_document(html);
        assert!(scrape_generic_containers(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_tables() {
        let html = r#"<table>
            <tr><th>Issue</th><th>Result</th></tr>
            <tr><td>100002 (10:05)</td><td>2, 1, 3, 4, 5, 6, 7, 8, 9, 10</td></tr>
            <tr><td>100001</td><td>1 2 3 4 5 6 7 8 9 10</td></tr>
        </table>"#;
        let doc = Html::parse_document(html);
        let draws = scrape_tables(&doc).unwrap();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].period, "100002");
        assert_eq!(draws[1].entrants, "1 2 3 4 5 6 7 8 9 10");
    }

    #[test]
    fn test_scrape_page_stops_at_first_productive_strategy() {
        let html = format!(
            r#"<div class="result-card">Draw: 33100002 {}</div>
            <table><tr><td>99999999</td><td>1 2 3 4 5 6 7 8 9 10</td></tr></table>"#,
            balls(&[3, 1, 2, 4, 5, 6, 7, 8, 9, 10])
        );
        let outcome = scrape_page(&html);
        assert_eq!(outcome.strategy, Some("result-cards"));
        assert!(outcome.draws.iter().all(|d| d.period != "99999999"));
    }

    #[test]
    fn test_scrape_page_falls_through_to_tables() {
        let html = r#"<table><tr><td>100001</td><td>1 2 3 4 5 6 7 8 9 10</td></tr></table>"#;
        let outcome = scrape_page(html);
        assert_eq!(outcome.strategy, Some("tables"));
        assert_eq!(outcome.draws.len(), 1);
    }

    #[test]
    fn test_scrape_page_nothing() {
        let outcome = scrape_page("<html><body><p>maintenance</p></body></html>");
        assert!(outcome.draws.is_empty());
        assert!(outcome.strategy.is_none());
    }
}
