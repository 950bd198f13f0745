//! Async HTTP client wrapping reqwest.
//!
//! Not a browser, just HTTP requests with browser-like headers. Every request
//! carries its own timeout so a hung source cannot stall the pipeline.
//! Non-2xx responses are reported as errors.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};

use crate::types::{PodiumError, PodiumResult};

/// Default desktop Chrome user agent.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/131.0.0.0 Safari/537.36";

/// Response from an HTTP GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Original requested URL.
    pub url: String,
    /// Final URL after redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

/// HTTP client for the source adapters.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    /// HTTP/1.1-only fallback client for sites that reject HTTP/2.
    h1_client: reqwest::Client,
}

impl HttpClient {
    /// Create a new HTTP client with the given user agent.
    pub fn new(user_agent: &str) -> Self {
        let client = Self::builder(user_agent).build().unwrap_or_default();
        let h1_client = Self::builder(user_agent)
            .http1_only()
            .build()
            .unwrap_or_default();

        Self { client, h1_client }
    }

    fn builder(user_agent: &str) -> reqwest::ClientBuilder {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.8,*/*;q=0.7",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent.to_string())
            .default_headers(headers)
    }

    /// Perform a single GET request bounded by `timeout`.
    ///
    /// Falls back to HTTP/1.1 on protocol errors (some CDNs reject HTTP/2).
    pub async fn get(&self, url: &str, timeout: Duration) -> PodiumResult<HttpResponse> {
        match self.get_inner(&self.client, url, timeout).await {
            Ok(resp) => Ok(resp),
            Err(PodiumError::Http(e)) => {
                let err_str = format!("{e}");
                if err_str.contains("http2")
                    || err_str.contains("protocol")
                    || err_str.contains("connection closed")
                {
                    tracing::debug!("http: retrying {url} over HTTP/1.1 after: {err_str}");
                    self.get_inner(&self.h1_client, url, timeout).await
                } else {
                    Err(PodiumError::Http(e))
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn get_inner(
        &self,
        client: &reqwest::Client,
        url: &str,
        timeout: Duration,
    ) -> PodiumResult<HttpResponse> {
        let r = client.get(url).timeout(timeout).send().await?;

        let status = r.status().as_u16();
        let final_url = r.url().to_string();
        if !r.status().is_success() {
            return Err(PodiumError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = r.text().await?;

        Ok(HttpResponse {
            url: url.to_string(),
            final_url,
            status,
            body,
        })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let client = HttpClient::default();
        let resp = client
            .get(&format!("{}/page", server.uri()), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, "hello");
    }

    #[tokio::test]
    async fn test_non_success_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = HttpClient::default();
        let err = client
            .get(&format!("{}/down", server.uri()), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, PodiumError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = HttpClient::default();
        let result = client
            .get(&format!("{}/slow", server.uri()), Duration::from_millis(50))
            .await;
        assert!(result.is_err());
    }
}
