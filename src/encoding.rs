//! Character decoding for raw web input.
//!
//! Implements the decode cascade used by the parser adapter: a charset
//! declared in an early meta tag wins, otherwise strict UTF-8, then
//! Latin-1, then UTF-8 with replacement characters as the last resort.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use regex::Regex;

/// `<meta charset="...">`
static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>;]+)"#).expect("meta charset regex")
});

/// `<meta http-equiv="Content-Type" content="...; charset=...">`
static HTTP_EQUIV_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]*charset\s*=\s*([^"'\s>;]+)"#,
    )
    .expect("http-equiv charset regex")
});

/// Charset declared in the document head, if any. Only the first 1024
/// bytes are examined.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]);
    META_CHARSET
        .captures(&head)
        .or_else(|| HTTP_EQUIV_CHARSET.captures(&head))
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()))
}

/// Decode raw bytes into a UTF-8 string.
#[must_use]
pub fn decode_bytes(bytes: &[u8]) -> String {
    if let Some(encoding) = declared_encoding(bytes) {
        let (decoded, _, _) = encoding.decode(bytes);
        return decoded.into_owned();
    }

    match std::str::from_utf8(bytes) {
        Ok(valid) => valid.to_string(),
        Err(_) => {
            // Latin-1 never fails to decode; a high replacement-free yield
            // still beats lossy UTF-8 for legacy western pages.
            let (decoded, _, had_errors) = WINDOWS_1252.decode(bytes);
            if had_errors {
                let (lossy, _, _) = UTF_8.decode(bytes);
                lossy.into_owned()
            } else {
                decoded.into_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_passthrough() {
        assert_eq!(decode_bytes("héllo".as_bytes()), "héllo");
    }

    #[test]
    fn declared_charset_wins() {
        let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body>Caf\xE9</body></html>";
        assert!(decode_bytes(html).contains("Caf\u{e9}"));
    }

    #[test]
    fn http_equiv_charset() {
        let html = b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=windows-1252\"><p>\x93quoted\x94</p>";
        let decoded = decode_bytes(html);
        assert!(decoded.contains("\u{201C}quoted\u{201D}"));
    }

    #[test]
    fn latin1_fallback_without_declaration() {
        let html = b"<html><body>Caf\xE9</body></html>";
        assert!(decode_bytes(html).contains("Caf\u{e9}"));
    }

    #[test]
    fn declared_encoding_only_in_head_window() {
        let mut html = vec![b' '; 2048];
        html.extend_from_slice(b"<meta charset=\"ISO-8859-1\">");
        assert!(declared_encoding(&html).is_none());
    }
}
