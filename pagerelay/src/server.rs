//! HTTP surface: router, request extraction, and JSON formatting.
//!
//! One relay route plus a health probe. The handler validates the `url`
//! parameter, applies the origin policy from the `Host` and `Referer`
//! headers, and hands off to [`relay_page`]. Errors become JSON bodies of the
//! shape `{ "error": <message> }` with the status from
//! [`RelayError::status_code`].

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::access;
use crate::config::RelayConfig;
use crate::errors::RelayError;
use crate::fetch::PageFetcher;
use crate::relay::{relay_page, RelayResult};

/// Shared state for the relay handlers.
#[derive(Clone)]
pub struct AppState {
    /// The fetcher used for outbound requests.
    pub fetcher: Arc<dyn PageFetcher>,
    /// Service configuration.
    pub config: Arc<RelayConfig>,
}

#[derive(Debug, Deserialize)]
struct RelayParams {
    url: Option<String>,
}

/// Builds the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/proxy", get(relay_handler))
        .route("/healthz", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn relay_handler(
    State(state): State<AppState>,
    Query(params): Query<RelayParams>,
    headers: HeaderMap,
) -> Result<Json<RelayResult>, RelayError> {
    let url = params
        .url
        .as_deref()
        .filter(|url| !url.is_empty())
        .ok_or(RelayError::MissingUrl)?;

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok());
    let referer = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok());
    if !access::is_request_allowed(host, referer) {
        return Err(RelayError::Forbidden);
    }

    let result = relay_page(state.fetcher.as_ref(), url, &state.config).await?;
    Ok(Json(result))
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "relay request failed");
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
