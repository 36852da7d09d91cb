//! Error types for the relay.
//!
//! Every request either succeeds or terminates with exactly one of these
//! variants; nothing is retried. The one recoverable failure mode — a decode
//! with an unknown charset label — never reaches this enum, because
//! [`crate::charset::decode_bytes`] falls back to UTF-8 internally.

use axum::http::StatusCode;
use thiserror::Error;

/// The error taxonomy for a relay request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The `url` query parameter was missing or empty.
    #[error("URL parameter is required")]
    MissingUrl,

    /// The origin-access policy rejected the request.
    #[error("Forbidden: External access denied")]
    Forbidden,

    /// The upstream server answered with a non-2xx status.
    #[error("Failed to fetch: {status} {status_text}")]
    UpstreamStatus {
        /// Upstream HTTP status code.
        status: u16,
        /// Upstream reason phrase, `"Unknown"` for non-standard codes.
        status_text: String,
    },

    /// The fetch failed below the HTTP layer (DNS, TLS, timeout, bad URL).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// A meta-refresh target could not be resolved against the page URL.
    #[error("Invalid redirect URL: {0}")]
    RedirectTarget(#[from] url::ParseError),
}

impl RelayError {
    /// The HTTP status code this error maps to on the response.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingUrl => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::UpstreamStatus { .. } | Self::Transport(_) | Self::RedirectTarget(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
