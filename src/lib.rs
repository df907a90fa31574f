//! # websift
//!
//! Turns arbitrary HTML documents into the main readable article text
//! plus metadata, discarding boilerplate: navigation, footers, ads,
//! related-links blocks, share widgets, comment forms, cookie banners.
//!
//! The pipeline parses raw bytes into a DOM, extracts metadata, cleans
//! the tree, runs a cascade of extractors (selector-driven primary,
//! readability scoring, paragraph classifier, naive baseline), converts
//! the winner into a small TEI-flavoured markup vocabulary and
//! serializes it to the requested format.
//!
//! ## Quick start
//!
//! ```rust
//! use websift::{extract, ExtractionOptions};
//!
//! let html = r#"<html><body><article>
//! <h1>Breaking News</h1>
//! <p>This is the main content of the article. It contains enough text
//! to pass the extractor's length gates without any trouble at all.</p>
//! <p>Boilerplate like navigation and footers is stripped away.</p>
//! </article></body></html>"#;
//!
//! let options = ExtractionOptions { min_file_size: 10, min_output_size: 50, ..Default::default() };
//! let text = extract(html, &options).unwrap();
//! assert!(text.contains("Breaking News"));
//! ```

pub mod baseline;
pub mod cascade;
pub mod classifier;
pub mod cleaner;
pub mod dedup;
pub mod document;
pub mod encoding;
mod error;
pub mod extractor;
pub mod lru;
pub mod markup;
mod options;
pub mod output;
pub mod parser;
pub mod readability;
pub mod selectors;
pub mod tree;
pub mod url_utils;

/// Metadata extraction (Open Graph, meta tags, JSON-LD, DOM heuristics).
pub mod metadata;

use dom_query::Document as Dom;
use tracing::debug;

pub use document::{MetaData, TextDocument};
pub use error::{Error, Result};
pub use options::{ExtractionOptions, Focus, OutputFormat};
pub use parser::RawContent;

use crate::markup::Node;

/// Reset the process-wide deduplication counter and simhash memo.
///
/// Callers must ensure no extraction is in flight.
pub fn reset_caches() {
    dedup::reset_caches();
}

/// Language gate: reject documents that declare a language other than the
/// requested one. Checks `http-equiv` and `og:locale` declarations before
/// the `<html lang>` attribute; absent declarations pass.
fn language_gate(dom: &Dom, target: Option<&str>) -> bool {
    let Some(target) = target else { return true };

    for (selector, attribute) in [
        (r#"meta[http-equiv="content-language"]"#, "content"),
        (r#"meta[property="og:locale"]"#, "content"),
        ("html", "lang"),
    ] {
        let value = tree::attr(&dom.select(selector), attribute);
        let code = value
            .split(['-', '_', ','])
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        if code.len() == 2 {
            return code == target.to_lowercase();
        }
    }
    true
}

fn full_extraction(
    content: RawContent<'_>,
    options: &ExtractionOptions,
) -> Option<TextDocument> {
    let options = options.clone().normalized();

    let dom = match parser::parse_content(content, &options) {
        Ok(dom) => dom,
        Err(err) => {
            debug!(%err, "input rejected");
            return None;
        }
    };

    if !language_gate(&dom, options.target_language.as_deref()) {
        debug!("language gate rejected document");
        return None;
    }

    let mut meta = if options.with_metadata {
        metadata::extract_metadata(&dom, options.source_url.as_deref(), &options)
    } else {
        MetaData::default()
    };

    // URL blacklist gate on the canonical URL.
    let canonical = meta
        .url
        .clone()
        .or_else(|| options.source_url.clone());
    if let Some(url) = &canonical {
        if options.url_blacklist.contains(url) {
            debug!(%url, "URL blacklist hit");
            return None;
        }
    }

    if options.only_with_metadata
        && (meta.date.is_none() || meta.title.is_none() || meta.url.is_none())
    {
        debug!("missing required metadata fields");
        return None;
    }

    // The fallbacks need the tree as parsed; the cleaner mutates.
    let backup = Dom::from(dom.html().to_string());
    let cleaned = cleaner::clean_document(dom, &options);

    let result = cascade::run(&cleaned, &backup, &options, canonical.as_deref());

    let mut body = result.body.body;

    // Deduplication runs after the cascade so every extractor's output
    // passes through the same counter exactly once.
    if options.deduplicate {
        body.children.retain(|child| match child {
            markup::Child::Element(el) => !dedup::duplicate_test(&el.plain_text(), &options),
            markup::Child::Text(text) => !dedup::duplicate_test(text, &options),
        });
    }

    let raw_text = body.plain_text();
    let mut commentsbody = result.comments.map(|c| c.body);
    let comments_raw = commentsbody
        .as_ref()
        .map(Node::plain_text)
        .unwrap_or_default();

    // Final length gates.
    if raw_text.chars().count() < options.min_output_size
        && comments_raw.chars().count() < options.min_output_comm_size
    {
        debug!(len = raw_text.chars().count(), "output below size thresholds");
        return None;
    }

    // Document-level duplicate detection.
    if options.deduplicate && dedup::duplicate_test(&raw_text, &options) {
        debug!("document-level duplicate");
        return None;
    }

    meta.fingerprint = Some(dedup::content_fingerprint(
        meta.title.as_deref().unwrap_or_default(),
        &raw_text,
    ));
    if meta.filedate.is_none() {
        meta.filedate = Some(chrono::Utc::now().format("%Y-%m-%d").to_string());
    }

    output::prepare(&mut body);
    if let Some(comments) = &mut commentsbody {
        output::prepare(comments);
    }

    let mut document = TextDocument {
        metadata: meta,
        body,
        commentsbody,
        raw_text,
        ..TextDocument::default()
    };
    document.text = output::serialize_body(&document.body, options.output_format);
    document.comments = document
        .commentsbody
        .as_ref()
        .map(|c| output::serialize_body(c, options.output_format))
        .unwrap_or_default();

    Some(document)
}

/// Extract the main content of an HTML document as a string in the
/// configured output format. Returns `None` when the input is rejected.
pub fn extract<'a>(
    content: impl Into<RawContent<'a>>,
    options: &ExtractionOptions,
) -> Option<String> {
    let effective = options.clone().normalized();
    let document = full_extraction(content.into(), &effective)?;
    Some(match effective.output_format {
        OutputFormat::Json | OutputFormat::Xml | OutputFormat::XmlTei | OutputFormat::Csv => {
            output::serialize(&document, &effective)
        }
        _ => document.text.clone(),
    })
}

/// Extract content and metadata together.
pub fn extract_with_metadata<'a>(
    content: impl Into<RawContent<'a>>,
    options: &ExtractionOptions,
) -> Option<TextDocument> {
    let options = ExtractionOptions { with_metadata: true, ..options.clone() };
    full_extraction(content.into(), &options)
}

/// Like [`extract_with_metadata`], and additionally honors
/// [`OutputFormat::Structured`], in which case the returned document's
/// `text` stays empty and the markup tree is the result.
pub fn bare_extraction<'a>(
    content: impl Into<RawContent<'a>>,
    options: &ExtractionOptions,
) -> Option<TextDocument> {
    let mut document = full_extraction(content.into(), &options.clone().normalized())?;
    if options.output_format == OutputFormat::Structured {
        document.text = String::new();
        document.comments = String::new();
    }
    Some(document)
}

/// Extract metadata only.
pub fn extract_metadata<'a>(
    content: impl Into<RawContent<'a>>,
    default_url: Option<&str>,
) -> Option<TextDocument> {
    let options = ExtractionOptions {
        with_metadata: true,
        min_file_size: 0,
        ..ExtractionOptions::default()
    };
    let dom = parser::parse_content(content.into(), &options).ok()?;
    let meta = metadata::extract_metadata(&dom, default_url, &options);
    Some(TextDocument { metadata: meta, ..TextDocument::default() })
}

/// Run only the naive baseline extractor.
pub fn baseline_extraction<'a>(
    content: impl Into<RawContent<'a>>,
) -> Option<(Node, String, usize)> {
    let options = ExtractionOptions { min_file_size: 0, ..ExtractionOptions::default() };
    let dom = parser::parse_content(content.into(), &options).ok()?;
    Some(baseline::baseline(&dom))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient() -> ExtractionOptions {
        ExtractionOptions { min_file_size: 10, min_output_size: 10, ..Default::default() }
    }

    #[test]
    fn extract_returns_text() {
        let html = concat!(
            "<html><body><article>",
            "<p>Enough article text to pass the gates, with several words in each sentence.</p>",
            "<p>A second paragraph keeps the extraction comfortably above the threshold.</p>",
            "</article></body></html>",
        );
        let text = extract(html, &lenient()).unwrap();
        assert!(text.contains("Enough article text"));
    }

    #[test]
    fn language_gate_rejects_mismatch() {
        let html = concat!(
            r#"<html lang="de"><body><article>"#,
            "<p>Genug Text im Artikel, um die Schwellen problemlos zu bestehen, wirklich.</p>",
            "</article></body></html>",
        );
        let options = ExtractionOptions {
            target_language: Some("en".to_string()),
            ..lenient()
        };
        assert!(extract(html, &options).is_none());

        let options = ExtractionOptions {
            target_language: Some("de".to_string()),
            ..lenient()
        };
        assert!(extract(html, &options).is_some());
    }

    #[test]
    fn url_blacklist_rejects() {
        let html = concat!(
            r#"<html><head><link rel="canonical" href="https://example.org/spam"></head>"#,
            "<body><article><p>Body text long enough for the output threshold to pass.</p>",
            "</article></body></html>",
        );
        let mut options = ExtractionOptions { ..lenient() };
        options.url_blacklist.insert("https://example.org/spam".to_string());
        assert!(extract(html, &options).is_none());
    }

    #[test]
    fn only_with_metadata_requires_fields() {
        let html = concat!(
            "<html><body><article>",
            "<p>Body text long enough for the output threshold, but no metadata at all.</p>",
            "</article></body></html>",
        );
        let options = ExtractionOptions { only_with_metadata: true, ..lenient() };
        assert!(extract(html, &options).is_none());
    }

    #[test]
    fn short_output_rejected() {
        let html = "<html><body><p>tiny</p><p>also tiny</p></body></html>";
        let options = ExtractionOptions { min_file_size: 10, ..Default::default() };
        assert!(extract(html, &options).is_none());
    }

    #[test]
    fn metadata_attached() {
        let html = concat!(
            r#"<html><head><meta property="og:title" content="OG Title"></head>"#,
            "<body><article>",
            "<p>Body text long enough for the output threshold to pass with margin.</p>",
            "</article></body></html>",
        );
        let document = extract_with_metadata(html, &lenient()).unwrap();
        assert_eq!(document.metadata.title.as_deref(), Some("OG Title"));
        assert!(document.metadata.fingerprint.is_some());
    }

    #[test]
    fn structured_output_keeps_tree() {
        let html = concat!(
            "<html><body><article>",
            "<p>Body text long enough for the output threshold to pass with margin.</p>",
            "</article></body></html>",
        );
        let options = ExtractionOptions {
            output_format: OutputFormat::Structured,
            ..lenient()
        };
        let document = bare_extraction(html, &options).unwrap();
        assert!(document.text.is_empty());
        assert!(document.body.has_tag(markup::Tag::P));
    }
}
