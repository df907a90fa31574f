//! Extractor cascade.
//!
//! Orders the extractors, compares their outputs and picks a winner:
//! selector-driven primary first, the readability scorer when the primary
//! comes back thin, the paragraph classifier when both look damaged, and
//! the naive baseline as the last resort.

use dom_query::Document;
use tracing::debug;

use crate::baseline::baseline;
use crate::classifier::classify_paragraphs;
use crate::extractor::{self, Extracted};
use crate::markup::Tag;
use crate::options::ExtractionOptions;
use crate::readability;

/// A serialized JSON blob masquerading as article text.
fn looks_like_json(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('{') && trimmed.contains("\":")
}

/// Outcome of the full cascade.
pub struct CascadeResult {
    pub body: Extracted,
    pub comments: Option<Extracted>,
}

/// Run the cascade over the cleaned document, with the untouched backup
/// tree available for the fallbacks.
#[must_use]
pub fn run(
    cleaned: &Document,
    backup: &Document,
    options: &ExtractionOptions,
    base_url: Option<&str>,
) -> CascadeResult {
    let comments = extractor::extract_comments(cleaned, options);
    let primary = extractor::extract_primary(cleaned, options, base_url);

    // A recall run that already found plenty of text skips the fallbacks.
    if options.focus.is_recall() && primary.len > 10 * options.min_extracted_size {
        return CascadeResult { body: primary, comments };
    }
    if options.fast {
        return CascadeResult { body: finalize(primary, backup, options, false), comments };
    }

    let readable = readability::extract_readable(backup, options);
    let (chosen, residual) = match readable {
        Some(readable) => {
            let has_subheads = readable.doc.select("h2, h3, h4").length() > 0;
            let residual = readable.residual_widgets;
            let root = readable.doc.select("div").first();
            let secondary = extractor::build_from_dom(&root, options, base_url);
            debug!(primary_len = primary.len, readability_len = secondary.len, "comparing extractors");

            if prefer_readability(&primary, &secondary, has_subheads, options) {
                (secondary, residual)
            } else {
                (primary, false)
            }
        }
        None => (primary, false),
    };

    CascadeResult { body: finalize(chosen, backup, options, residual), comments }
}

/// Decision table between the primary output and the readability output.
fn prefer_readability(
    primary: &Extracted,
    secondary: &Extracted,
    secondary_has_subheads: bool,
    options: &ExtractionOptions,
) -> bool {
    let len1 = primary.len;
    let len2 = secondary.len;

    if len1 > 2 * len2 {
        return false;
    }
    if len1 == 0 && len2 > 0 {
        return true;
    }
    if len2 > 2 * len1 && !looks_like_json(&secondary.text) {
        return true;
    }
    if !primary.body.has_tag(Tag::P) && len2 > 2 * options.min_extracted_size {
        return true;
    }
    if primary.body.count_tag(Tag::Table) > primary.body.count_tag(Tag::P)
        && len2 > 2 * options.min_extracted_size
    {
        return true;
    }
    options.focus.is_recall()
        && !primary.body.has_tag(Tag::Head)
        && secondary_has_subheads
        && len2 > len1
}

/// Last line of defense: paragraph classifier, then baseline rescue.
fn finalize(
    chosen: Extracted,
    backup: &Document,
    options: &ExtractionOptions,
    residual_widgets: bool,
) -> Extracted {
    let mut current = chosen;

    if residual_widgets || current.len < options.min_extracted_size {
        let (body, text) = classify_paragraphs(backup);
        let classified = Extracted {
            len: text.chars().count(),
            body,
            text,
        };
        if classified.len > 0 && current.len <= 4 * classified.len {
            debug!(classified_len = classified.len, "substituting paragraph classifier output");
            current = classified;
        }
    }

    if current.len < options.min_extracted_size && !options.focus.is_precision() {
        let (body, text, len) = baseline(backup);
        if len > current.len {
            debug!(baseline_len = len, "substituting baseline output");
            current = Extracted { body, text, len };
        }
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner;

    fn run_pipeline(html: &str, options: &ExtractionOptions) -> CascadeResult {
        let backup = Document::from(html);
        let cleaned = cleaner::clean_document(Document::from(html), options);
        run(&cleaned, &backup, options, None)
    }

    #[test]
    fn marked_up_article_uses_primary() {
        let html = concat!(
            "<html><body>",
            r#"<div class="article-body">"#,
            "<p>First paragraph of the marked-up article with a decent amount of text inside.</p>",
            "<p>Second paragraph of the marked-up article keeps the primary extractor happy.</p>",
            "<p>Third paragraph rounds out the body so the length gate is comfortably met here.</p>",
            "</div></body></html>",
        );
        let result = run_pipeline(html, &ExtractionOptions::default());
        assert!(result.body.text.contains("First paragraph"));
        assert!(result.body.len > 200);
    }

    #[test]
    fn unmarked_page_falls_through_to_scoring() {
        // No selector family matches, no article tag: the primary returns
        // nothing and readability or the classifier has to step in.
        let html = concat!(
            "<html><body>",
            r#"<table><tr><td class="page">"#,
            "<p>Legacy table layout paragraph number one, with commas, length, and substance enough to score points.</p>",
            "<p>Legacy table layout paragraph number two, which also carries plenty of readable article text in it.</p>",
            "<p>Legacy table layout paragraph number three, further lengthening the only real content cell here.</p>",
            "</td></tr></table>",
            "</body></html>",
        );
        let result = run_pipeline(html, &ExtractionOptions::default());
        assert!(result.body.text.contains("Legacy table layout paragraph number one"));
    }

    #[test]
    fn thin_output_rescued_by_baseline() {
        let html = concat!(
            "<html><body>",
            "<span>Stray text outside any paragraph structure that only the baseline will pick up, ",
            "going on long enough to matter for the final length comparison in the cascade.</span>",
            "</body></html>",
        );
        let result = run_pipeline(html, &ExtractionOptions::default());
        assert!(result.body.text.contains("Stray text"));
    }

    #[test]
    fn json_blob_detection() {
        assert!(looks_like_json(r#"{"key": "value"}"#));
        assert!(!looks_like_json("Ordinary sentence."));
    }
}
