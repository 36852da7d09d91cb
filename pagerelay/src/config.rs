//! Configuration for the relay service.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the relay server and its outbound fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// User agent sent on every outbound fetch.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum number of meta-refresh redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Outbound request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// How many leading bytes to inspect when sniffing a meta charset.
    #[serde(default = "default_sniff_window")]
    pub sniff_window: usize,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}

fn default_max_redirects() -> usize {
    5
}

fn default_timeout() -> f64 {
    30.0
}

fn default_sniff_window() -> usize {
    1024
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
            timeout_seconds: default_timeout(),
            sniff_window: default_sniff_window(),
        }
    }
}

impl RelayConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from `PAGERELAY_*` environment variables.
    ///
    /// Unset variables keep their defaults; values that fail to parse are
    /// logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("PAGERELAY_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(ua) = std::env::var("PAGERELAY_USER_AGENT") {
            config.user_agent = ua;
        }
        if let Ok(raw) = std::env::var("PAGERELAY_MAX_REDIRECTS") {
            match raw.parse() {
                Ok(n) => config.max_redirects = n,
                Err(_) => {
                    tracing::warn!(value = %raw, "ignoring unparsable PAGERELAY_MAX_REDIRECTS");
                }
            }
        }
        if let Ok(raw) = std::env::var("PAGERELAY_TIMEOUT_SECONDS") {
            match raw.parse::<f64>() {
                Ok(secs) if secs.is_finite() && secs >= 0.0 => config.timeout_seconds = secs,
                _ => {
                    tracing::warn!(value = %raw, "ignoring unparsable PAGERELAY_TIMEOUT_SECONDS");
                }
            }
        }
        if let Ok(raw) = std::env::var("PAGERELAY_SNIFF_WINDOW") {
            match raw.parse() {
                Ok(bytes) => config.sniff_window = bytes,
                Err(_) => {
                    tracing::warn!(value = %raw, "ignoring unparsable PAGERELAY_SNIFF_WINDOW");
                }
            }
        }
        config
    }

    /// Sets the bind address.
    #[must_use]
    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the meta-refresh redirect bound.
    #[must_use]
    pub fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Sets the outbound timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Gets the outbound timeout as a `Duration`.
    ///
    /// Values a `Duration` cannot represent (negative, NaN, infinite) fall
    /// back to the default timeout rather than panicking.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_seconds)
            .unwrap_or_else(|_| Duration::from_secs_f64(default_timeout()))
    }
}
