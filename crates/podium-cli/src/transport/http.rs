//! HTTP feed: read-only views over the session plus a refresh trigger.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Json as AxumJson, Response},
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use podium::DrawPipeline;

use crate::session::PodiumSession;
use crate::types::{CliError, CliResult};

/// Shared server state passed to all handlers via axum State.
pub struct FeedState {
    pub token: Option<String>,
    pub source: Option<String>,
    pub pipeline: DrawPipeline,
    pub session: Arc<Mutex<PodiumSession>>,
}

/// HTTP transport for dashboards and other feed consumers.
pub struct HttpFeed {
    state: Arc<FeedState>,
}

impl HttpFeed {
    pub fn new(
        session: PodiumSession,
        pipeline: DrawPipeline,
        source: Option<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            state: Arc::new(FeedState {
                token,
                source,
                pipeline,
                session: Arc::new(Mutex::new(session)),
            }),
        }
    }

    /// Build the router. `/health` bypasses authentication.
    pub fn router(&self) -> Router {
        let state = self.state.clone();

        Router::new()
            .route("/feed", get(handle_feed))
            .route("/history", get(handle_history))
            .route("/recommendations", get(handle_recommendations))
            .route("/refresh", post(handle_refresh))
            .layer(middleware::from_fn_with_state(state.clone(), auth_layer))
            .route("/health", get(handle_health))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Run the HTTP server on the given address.
    pub async fn run(&self, addr: &str) -> CliResult<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP feed listening on {addr}");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| CliError::Transport(e.to_string()))?;

        Ok(())
    }
}

/// Checks the bearer token if one is configured.
async fn auth_layer(
    State(state): State<Arc<FeedState>>,
    headers: HeaderMap,
    request: axum::extract::Request,
    next: middleware::Next,
) -> Response {
    if let Some(expected) = &state.token {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected);

        if !authorized {
            return error_response(StatusCode::UNAUTHORIZED, &CliError::Unauthorized);
        }
    }

    next.run(request).await
}

fn error_response(status: StatusCode, err: &CliError) -> Response {
    (
        status,
        AxumJson(serde_json::json!({ "error": err.to_string() })),
    )
        .into_response()
}

async fn handle_health(State(state): State<Arc<FeedState>>) -> AxumJson<serde_json::Value> {
    let session = state.session.lock().await;
    AxumJson(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "draws": session.history().len(),
        "latest": session.history().first().map(|d| d.period.clone()),
    }))
}

async fn handle_feed(State(state): State<Arc<FeedState>>) -> AxumJson<serde_json::Value> {
    let session = state.session.lock().await;
    AxumJson(serde_json::json!(session.feed()))
}

async fn handle_history(State(state): State<Arc<FeedState>>) -> AxumJson<serde_json::Value> {
    let session = state.session.lock().await;
    AxumJson(serde_json::json!(session.history()))
}

async fn handle_recommendations(
    State(state): State<Arc<FeedState>>,
) -> AxumJson<serde_json::Value> {
    let session = state.session.lock().await;
    AxumJson(serde_json::json!(session.recommendations()))
}

async fn handle_refresh(State(state): State<Arc<FeedState>>) -> Response {
    let Some(source) = state.source.as_deref() else {
        return error_response(
            StatusCode::BAD_REQUEST,
            &CliError::MissingSource(crate::config::SOURCE_ENV),
        );
    };

    let mut session = state.session.lock().await;
    match session.refresh(&state.pipeline, source).await {
        Ok(outcome) => {
            let status = if outcome.exhausted.is_some() {
                StatusCode::BAD_GATEWAY
            } else {
                StatusCode::OK
            };
            (status, AxumJson(serde_json::json!(outcome))).into_response()
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}
