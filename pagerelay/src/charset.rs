//! Charset extraction and byte-to-text decoding.
//!
//! Raw response bytes are not self-describing, so the encoding comes from the
//! `Content-Type` header when it carries a `charset=` token, from a sniffed
//! meta tag otherwise (see [`crate::html`]), or defaults to UTF-8. Decoding
//! itself goes through `encoding_rs` and never fails: an unknown label falls
//! back to UTF-8 with a warning, and malformed sequences decode to
//! replacement characters.

use encoding_rs::{Encoding, UTF_8};

/// A decoded page body together with the encoding that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    /// The decoded text.
    pub html: String,
    /// Canonical name of the encoding actually used.
    pub encoding_used: &'static str,
}

/// Extracts the charset token from a `Content-Type` header value.
///
/// Takes the substring after the first `charset=`, truncates at the next `;`,
/// and trims whitespace. Returns `None` when no token is present.
///
/// An empty token (as in `charset=;`) also counts as absent, so detection
/// falls through to meta-tag sniffing instead of treating the empty string as
/// an unknown label and dropping straight to the UTF-8 fallback.
#[must_use]
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    let start = content_type.find("charset=")? + "charset=".len();
    let rest = &content_type[start..];
    let end = rest.find(';').unwrap_or(rest.len());
    let token = rest[..end].trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Decodes `bytes` using the encoding named by `label`.
///
/// An unrecognized label logs a warning and decodes as UTF-8 instead; this is
/// the terminal recovery path and never raises.
#[must_use]
pub fn decode_bytes(bytes: &[u8], label: &str) -> DecodedPage {
    let encoding = match Encoding::for_label(label.trim().as_bytes()) {
        Some(encoding) => encoding,
        None => {
            tracing::warn!(label, "failed to decode with requested charset, falling back to utf-8");
            UTF_8
        }
    };
    let (text, used, _had_errors) = encoding.decode(bytes);
    DecodedPage {
        html: text.into_owned(),
        encoding_used: used.name(),
    }
}

/// Lossily decodes the leading `window` bytes as UTF-8 for meta-tag sniffing.
#[must_use]
pub fn sniff_prefix(bytes: &[u8], window: usize) -> String {
    let end = bytes.len().min(window);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_charset_from_content_type() {
        assert_eq!(
            charset_from_content_type("text/html; charset=shift_jis"),
            Some("shift_jis".to_string()),
        );
        assert_eq!(
            charset_from_content_type("text/html; charset=euc-jp; boundary=x"),
            Some("euc-jp".to_string()),
        );
        assert_eq!(
            charset_from_content_type("text/html; charset= utf-8 "),
            Some("utf-8".to_string()),
        );
        assert_eq!(charset_from_content_type("text/html"), None);
        assert_eq!(charset_from_content_type("text/html; charset=;"), None);
    }

    #[test]
    fn test_decode_shift_jis() {
        // "テスト" in Shift_JIS.
        let bytes = [0x83, 0x65, 0x83, 0x58, 0x83, 0x67];
        let page = decode_bytes(&bytes, "shift_jis");
        assert_eq!(page.html, "テスト");
        assert_eq!(page.encoding_used, "Shift_JIS");
    }

    #[test]
    fn test_decode_unknown_label_falls_back_to_utf8() {
        let page = decode_bytes("hello".as_bytes(), "x-no-such-charset");
        assert_eq!(page.html, "hello");
        assert_eq!(page.encoding_used, "UTF-8");
    }

    #[test]
    fn test_decode_invalid_bytes_never_raises() {
        let page = decode_bytes(&[0xff, 0xfe, 0xfd], "utf-8");
        // Malformed input decodes to replacement characters rather than failing.
        assert!(!page.html.is_empty());
    }

    #[test]
    fn test_sniff_prefix_respects_window() {
        let body = "a".repeat(2048);
        assert_eq!(sniff_prefix(body.as_bytes(), 1024).len(), 1024);
        assert_eq!(sniff_prefix(b"short", 1024), "short");
    }
}
