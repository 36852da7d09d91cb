//! # Pagerelay
//!
//! A server-side relay for pages a browser cannot fetch directly because of
//! cross-origin restrictions. One endpoint fetches the target page, decodes
//! it to text, follows HTML meta-refresh redirects up to a bound, and returns
//! the final HTML and resolved URL as JSON:
//!
//! ```text
//! GET /api/proxy?url=https://example.com/
//! => { "contents": "<html>...</html>", "finalUrl": "https://example.com/" }
//! ```
//!
//! The relay is stateless per request: every fetch is buffered fully in
//! memory and returned once, with no cache and no streaming.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc
)]

pub mod access;
pub mod charset;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod html;
pub mod relay;
pub mod server;

pub use config::RelayConfig;
pub use errors::RelayError;
pub use fetch::{FetchAttempt, HttpFetcher, PageFetcher};
pub use relay::{relay_page, RelayResult};
pub use server::{router, AppState};
