//! Refresh pipeline: run the source adapters in order and merge their draws.
//!
//! 1. Structured API endpoints (5 s each), up to the first one that yields
//!    draws. Stops here when the API alone produced draws and a next-draw time.
//! 2. The page itself (10 s): scraping strategies plus next-draw estimation.
//! 3. A re-fetch of the page scanned as free text, only if nothing so far
//!    produced a draw.
//!
//! Every adapter failure is logged and swallowed. The merge map lives inside
//! a single call, so an abandoned refresh leaves nothing half-applied.

use std::time::Duration;

use url::Url;

use crate::extraction::{
    estimate_next_draw, parse_api_payload, scan_text_lines, scrape_page, NextDrawInfo,
};
use crate::history::HistoryMerger;
use crate::http_client::{HttpClient, DEFAULT_USER_AGENT};
use crate::types::{PipelineError, PodiumResult, RefreshSnapshot, HISTORY_CAPACITY};

/// Default API endpoints. Relative entries resolve against the source URL.
pub const DEFAULT_API_ENDPOINTS: &[&str] =
    &["https://api.api68.com/pks/getLotteryPksInfo.do?lotCode=10012"];

/// Tunables for the refresh pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// API endpoint paths or absolute URLs, tried in order.
    pub api_endpoints: Vec<String>,
    pub api_timeout: Duration,
    pub page_timeout: Duration,
    pub user_agent: String,
    /// Maximum draws kept after merging.
    pub capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_endpoints: DEFAULT_API_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            api_timeout: Duration::from_secs(5),
            page_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            capacity: HISTORY_CAPACITY,
        }
    }
}

/// Which adapters contributed to a refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub api_draws: usize,
    pub scraped_draws: usize,
    pub text_draws: usize,
    pub scrape_strategy: Option<&'static str>,
    pub short_circuited: bool,
}

/// The draw extraction pipeline.
#[derive(Clone)]
pub struct DrawPipeline {
    client: HttpClient,
    config: PipelineConfig,
}

impl DrawPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            client: HttpClient::new(&config.user_agent),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every adapter against `source_url` and return the merged history.
    pub async fn refresh(&self, source_url: &str) -> Result<RefreshSnapshot, PipelineError> {
        self.refresh_with_report(source_url)
            .await
            .map(|(snapshot, _)| snapshot)
    }

    /// Like [`refresh`](Self::refresh), also reporting per-adapter yields.
    pub async fn refresh_with_report(
        &self,
        source_url: &str,
    ) -> Result<(RefreshSnapshot, RefreshReport), PipelineError> {
        let mut merger = HistoryMerger::new(self.config.capacity);
        let mut next = NextDrawInfo::default();
        let mut report = RefreshReport::default();
        let mut transport_ok = false;

        // 1. Structured API
        for endpoint in &self.config.api_endpoints {
            match self.fetch_api(source_url, endpoint).await {
                Ok(payload) => {
                    transport_ok = true;
                    report.api_draws += merger.offer_all(&payload.draws);
                    if next.next_draw_time.is_none() {
                        next.next_draw_time = payload.next_draw_time;
                    }
                    if report.api_draws > 0 {
                        break;
                    }
                }
                Err(e) => tracing::warn!("api: endpoint {endpoint} failed: {e}"),
            }
        }

        if report.api_draws > 0 && next.next_draw_time.is_some() {
            report.short_circuited = true;
        } else {
            // 2. Page scraping
            match self.client.get(source_url, self.config.page_timeout).await {
                Ok(resp) => {
                    transport_ok = true;
                    let outcome = scrape_page(&resp.body);
                    report.scraped_draws = merger.offer_all(&outcome.draws);
                    report.scrape_strategy = outcome.strategy;
                    next.fill_from(estimate_next_draw(&resp.body));
                }
                Err(e) => tracing::warn!("scrape: page fetch {source_url} failed: {e}"),
            }

            // 3. Free-text fallback
            if merger.is_empty() {
                match self.client.get(source_url, self.config.page_timeout).await {
                    Ok(resp) => {
                        transport_ok = true;
                        report.text_draws = merger.offer_all(&scan_text_lines(&resp.body));
                    }
                    Err(e) => tracing::warn!("text: page re-fetch {source_url} failed: {e}"),
                }
            }
        }

        if merger.is_empty() {
            tracing::warn!("refresh: no draws from {source_url}");
            return Err(PipelineError::Exhausted {
                transport_failed: !transport_ok,
            });
        }

        let draws = merger.finish();
        tracing::info!(
            "refresh: {} draws (api {}, scraped {}, text {}), latest {}",
            draws.len(),
            report.api_draws,
            report.scraped_draws,
            report.text_draws,
            draws[0].period
        );

        Ok((
            RefreshSnapshot {
                draws,
                next_draw_time: next.next_draw_time,
                seconds_left: next.seconds_left,
                next_period: next.next_period,
            },
            report,
        ))
    }

    async fn fetch_api(
        &self,
        source_url: &str,
        endpoint: &str,
    ) -> PodiumResult<crate::extraction::ApiPayload> {
        let url = Url::parse(source_url)?.join(endpoint)?;
        let resp = self.client.get(url.as_str(), self.config.api_timeout).await?;
        parse_api_payload(&resp.body)
    }
}

impl Default for DrawPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
