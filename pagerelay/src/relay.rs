//! The fetch/decode/redirect loop.
//!
//! Each iteration fetches the current target, determines the text encoding,
//! decodes the buffered body, and checks the result for a meta-refresh
//! redirect. Refresh targets are resolved against the final URL of the fetch
//! that produced them, so relative targets follow the page they appeared on.
//! The loop state (`target`, `redirect_count`) is local to one invocation;
//! nothing is shared across requests.

use serde::{Deserialize, Serialize};

use crate::charset;
use crate::config::RelayConfig;
use crate::errors::RelayError;
use crate::fetch::{FetchAttempt, PageFetcher};
use crate::html;

/// The success payload: the decoded page and where it was finally found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResult {
    /// Decoded HTML of the last fetched page.
    pub contents: String,
    /// URL of the last successfully fetched resource.
    #[serde(rename = "finalUrl")]
    pub final_url: String,
}

/// Fetches `url`, following up to `config.max_redirects` meta-refresh
/// redirects, and returns the decoded page.
///
/// A chain longer than the bound is not an error: the loop stops following,
/// logs a warning, and returns the last page as-is. Upstream non-2xx
/// responses and transport failures terminate with [`RelayError`].
pub async fn relay_page(
    fetcher: &dyn PageFetcher,
    url: &str,
    config: &RelayConfig,
) -> Result<RelayResult, RelayError> {
    let mut target = url.to_string();
    let mut redirect_count = 0usize;

    loop {
        let attempt = fetcher.fetch(&target).await?;
        if !attempt.is_success() {
            return Err(RelayError::UpstreamStatus {
                status: attempt.status,
                status_text: attempt.status_text,
            });
        }

        let encoding = determine_encoding(&attempt, config.sniff_window);
        let page = charset::decode_bytes(&attempt.body, &encoding);

        match html::find_meta_refresh(&page.html) {
            Some(next) if redirect_count < config.max_redirects => {
                let resolved = attempt.final_url.join(&next)?;
                tracing::debug!(target = %resolved, "following meta refresh");
                target = resolved.into();
                redirect_count += 1;
            }
            Some(_) => {
                tracing::warn!(max = config.max_redirects, "max meta-refresh redirects reached");
                return Ok(RelayResult {
                    contents: page.html,
                    final_url: attempt.final_url.to_string(),
                });
            }
            None => {
                return Ok(RelayResult {
                    contents: page.html,
                    final_url: attempt.final_url.to_string(),
                });
            }
        }
    }
}

/// Determines the decode encoding for one fetch.
///
/// Header `charset=` token first; otherwise a meta tag sniffed from the
/// leading bytes; otherwise UTF-8.
fn determine_encoding(attempt: &FetchAttempt, sniff_window: usize) -> String {
    if let Some(charset) = attempt
        .content_type
        .as_deref()
        .and_then(charset::charset_from_content_type)
    {
        return charset;
    }
    let prefix = charset::sniff_prefix(&attempt.body, sniff_window);
    html::sniff_meta_charset(&prefix).unwrap_or_else(|| "utf-8".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MockPageFetcher;
    use pretty_assertions::assert_eq;
    use url::Url;

    fn page(final_url: &str, body: &str) -> FetchAttempt {
        FetchAttempt {
            final_url: Url::parse(final_url).unwrap(),
            status: 200,
            status_text: "OK".to_string(),
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: body.as_bytes().to_vec(),
        }
    }

    fn refresh_to(target: &str) -> String {
        format!(r#"<html><head><meta http-equiv="refresh" content="0;URL={target}" /></head></html>"#)
    }

    #[tokio::test]
    async fn test_single_fetch_without_refresh() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url == "https://example.com/start")
            .times(1)
            .returning(|_| Ok(page("https://example.com/start", "<html>hello</html>")));

        let result = relay_page(&fetcher, "https://example.com/start", &RelayConfig::new())
            .await
            .unwrap();
        assert_eq!(result.contents, "<html>hello</html>");
        assert_eq!(result.final_url, "https://example.com/start");
    }

    #[tokio::test]
    async fn test_relative_refresh_resolves_against_final_url() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url == "https://example.com/start")
            .times(1)
            .returning(|_| Ok(page("https://example.com/start", &refresh_to("/next"))));
        fetcher
            .expect_fetch()
            .withf(|url| url == "https://example.com/next")
            .times(1)
            .returning(|_| Ok(page("https://example.com/next", "<html>arrived</html>")));

        let result = relay_page(&fetcher, "https://example.com/start", &RelayConfig::new())
            .await
            .unwrap();
        assert_eq!(result.contents, "<html>arrived</html>");
        assert_eq!(result.final_url, "https://example.com/next");
    }

    #[tokio::test]
    async fn test_final_url_reflects_transport_redirect() {
        let mut fetcher = MockPageFetcher::new();
        // The client followed a 3xx internally; final_url differs from target.
        fetcher
            .expect_fetch()
            .withf(|url| url == "https://example.com/old")
            .times(1)
            .returning(|_| Ok(page("https://example.com/new", "<html>moved</html>")));

        let result = relay_page(&fetcher, "https://example.com/old", &RelayConfig::new())
            .await
            .unwrap();
        assert_eq!(result.final_url, "https://example.com/new");
    }

    #[tokio::test]
    async fn test_refresh_chain_stops_after_bound() {
        let mut fetcher = MockPageFetcher::new();
        // Pages /0 through /6 each redirect to the next one.
        for i in 0..6 {
            let from = format!("https://chain.test/{i}");
            let next = format!("/{}", i + 1);
            fetcher
                .expect_fetch()
                .withf(move |url| url == from)
                .times(1)
                .returning(move |url| Ok(page(url, &refresh_to(&next))));
        }

        let result = relay_page(&fetcher, "https://chain.test/0", &RelayConfig::new())
            .await
            .unwrap();
        // Five follow-throughs, then the sixth page comes back unfollowed,
        // refresh tag and all.
        assert_eq!(result.final_url, "https://chain.test/5");
        assert!(result.contents.contains("URL=/6"));
    }

    #[tokio::test]
    async fn test_upstream_non_2xx_is_an_error() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().times(1).returning(|_| {
            Ok(FetchAttempt {
                final_url: Url::parse("https://example.com/missing").unwrap(),
                status: 404,
                status_text: "Not Found".to_string(),
                content_type: None,
                body: Vec::new(),
            })
        });

        let err = relay_page(&fetcher, "https://example.com/missing", &RelayConfig::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch: 404 Not Found");
    }

    #[tokio::test]
    async fn test_decodes_body_using_header_charset() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().times(1).returning(|_| {
            Ok(FetchAttempt {
                final_url: Url::parse("https://example.jp/").unwrap(),
                status: 200,
                status_text: "OK".to_string(),
                content_type: Some("text/html; charset=shift_jis".to_string()),
                // "テスト" in Shift_JIS.
                body: vec![0x83, 0x65, 0x83, 0x58, 0x83, 0x67],
            })
        });

        let result = relay_page(&fetcher, "https://example.jp/", &RelayConfig::new())
            .await
            .unwrap();
        assert_eq!(result.contents, "テスト");
    }

    #[tokio::test]
    async fn test_sniffs_meta_charset_when_header_is_silent() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().times(1).returning(|_| {
            let mut body = br#"<html><head><meta charset="euc-jp"></head><body>"#.to_vec();
            // "テスト" in EUC-JP.
            body.extend_from_slice(&[0xa5, 0xc6, 0xa5, 0xb9, 0xa5, 0xc8]);
            Ok(FetchAttempt {
                final_url: Url::parse("https://example.jp/").unwrap(),
                status: 200,
                status_text: "OK".to_string(),
                content_type: Some("text/html".to_string()),
                body,
            })
        });

        let result = relay_page(&fetcher, "https://example.jp/", &RelayConfig::new())
            .await
            .unwrap();
        assert!(result.contents.contains("テスト"));
    }

    #[test]
    fn test_relay_result_serializes_with_camel_case_final_url() {
        let result = RelayResult {
            contents: "<html></html>".to_string(),
            final_url: "https://example.com/".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["finalUrl"], "https://example.com/");
        assert_eq!(json["contents"], "<html></html>");
    }
}
