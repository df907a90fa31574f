//! Parser adapter: raw bytes in, repaired DOM out.
//!
//! Accepts either a string or a byte buffer, sniffs and undoes GZIP/Zlib
//! compression, decodes to UTF-8, applies two small repairs for markup
//! that trips HTML5 parsers, and rejects inputs that are not plausibly
//! HTML documents.

use std::io::Read;
use std::sync::LazyLock;

use dom_query::Document;
use flate2::read::{GzDecoder, ZlibDecoder};
use regex::Regex;
use tracing::{debug, warn};

use crate::encoding::decode_bytes;
use crate::error::{Error, Result};
use crate::options::ExtractionOptions;

/// Raw input handed to the extraction entry points.
#[derive(Debug, Clone, Copy)]
pub enum RawContent<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
}

impl<'a> From<&'a str> for RawContent<'a> {
    fn from(value: &'a str) -> Self {
        RawContent::Text(value)
    }
}

impl<'a> From<&'a [u8]> for RawContent<'a> {
    fn from(value: &'a [u8]) -> Self {
        RawContent::Bytes(value)
    }
}

impl<'a> From<&'a String> for RawContent<'a> {
    fn from(value: &'a String) -> Self {
        RawContent::Text(value.as_str())
    }
}

impl<'a> From<&'a Vec<u8>> for RawContent<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        RawContent::Bytes(value.as_slice())
    }
}

/// DOCTYPE declarations with a stray slash confuse the html5 tokenizer.
static MALFORMED_DOCTYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*!\s*DOCTYPE[^>]*/[^<]*>").expect("doctype regex")
});

/// Self-closed `<html .../>` near the top of the file.
static SELF_CLOSING_HTML: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(html[^>]*?)\s*/>").expect("html tag regex"));

fn looks_gzip(bytes: &[u8]) -> bool {
    bytes.len() > 3 && bytes[0] == 0x1f && bytes[1] == 0x8b && bytes[2] == 0x08
}

fn looks_zlib(bytes: &[u8]) -> bool {
    bytes.len() > 2
        && bytes[0] == 0x78
        && matches!(bytes[1], 0x01 | 0x5e | 0x9c | 0xda)
}

/// Undo GZIP or Zlib compression when the magic bytes announce it.
/// Decompression failures fall back to the raw buffer.
fn decompress(bytes: &[u8], max_size: usize) -> Vec<u8> {
    let mut out = Vec::new();
    if looks_gzip(bytes) {
        let mut decoder = GzDecoder::new(bytes).take(max_size as u64 + 1);
        if decoder.read_to_end(&mut out).is_ok() && !out.is_empty() {
            return out;
        }
        warn!("gzip magic found but decompression failed, using raw bytes");
    } else if looks_zlib(bytes) {
        let mut decoder = ZlibDecoder::new(bytes).take(max_size as u64 + 1);
        if decoder.read_to_end(&mut out).is_ok() && !out.is_empty() {
            return out;
        }
        warn!("zlib magic found but decompression failed, using raw bytes");
    }
    bytes.to_vec()
}

/// Repair markup defects that make the parse unusable.
fn repair_markup(html: &str) -> String {
    let html = MALFORMED_DOCTYPE.replace(html, "");

    // Only rewrite a self-closed <html/> when it appears in the first
    // three lines; deeper occurrences are somebody else's markup.
    let head_len: usize = html
        .split_inclusive('\n')
        .take(3)
        .map(str::len)
        .sum();
    let (head, tail) = html.split_at(head_len.min(html.len()));
    let repaired_head = SELF_CLOSING_HTML.replace(head, "<$1>");
    format!("{repaired_head}{tail}")
}

/// Quick sanity gate for non-HTML payloads (JSON, images, plain text).
fn looks_like_html(html: &str, doc: &Document) -> bool {
    let head: String = html.chars().take(50).collect::<String>().to_lowercase();
    if head.contains("html") {
        return true;
    }
    doc.select("body").children().length() >= 2
}

/// Parse raw content into a DOM rooted at `<html>`.
///
/// Rejects inputs outside the configured size bounds and buffers that do
/// not look like HTML at all.
pub fn parse_content(content: RawContent<'_>, options: &ExtractionOptions) -> Result<Document> {
    let html = match content {
        RawContent::Text(text) => {
            if text.len() > options.max_file_size {
                return Err(Error::InputRejected("input above max_file_size"));
            }
            text.to_string()
        }
        RawContent::Bytes(bytes) => {
            if bytes.len() > options.max_file_size {
                return Err(Error::InputRejected("input above max_file_size"));
            }
            let bytes = decompress(bytes, options.max_file_size);
            if bytes.len() > options.max_file_size {
                return Err(Error::InputRejected("decompressed input above max_file_size"));
            }
            decode_bytes(&bytes)
        }
    };

    if html.len() < options.min_file_size {
        return Err(Error::InputRejected("input below min_file_size"));
    }

    let repaired = repair_markup(&html);
    let doc = Document::from(repaired.as_str());

    if !looks_like_html(&repaired, &doc) {
        debug!("input rejected by HTML sanity gate");
        return Err(Error::InputRejected("not an HTML document"));
    }

    Ok(doc)
}
