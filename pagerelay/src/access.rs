//! Origin-access policy for incoming requests.
//!
//! The check is substring containment, not origin parsing: a `Referer` that
//! contains the `Host` header anywhere passes. That is the documented,
//! intentionally weak behavior of this service — a basic deterrent against
//! third-party embedding, not an authentication boundary.

/// Whether the host names a local development deployment.
#[must_use]
pub fn is_local_host(host: &str) -> bool {
    host.contains("localhost") || host.contains("127.0.0.1")
}

/// Decides whether a request may proceed to the fetch stage.
///
/// Local hosts always pass. Everything else passes only when a `Referer` is
/// present and contains the `Host` header value as a substring. A missing
/// `Host` header denies.
#[must_use]
pub fn is_request_allowed(host: Option<&str>, referer: Option<&str>) -> bool {
    match host {
        Some(host) if is_local_host(host) => true,
        Some(host) => referer.is_some_and(|referer| referer.contains(host)),
        None => false,
    }
}
