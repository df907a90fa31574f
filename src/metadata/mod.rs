//! Metadata extraction.
//!
//! Sources are consulted in priority order, each filling only the fields
//! still missing: Open Graph, standard meta tags, JSON-LD, DOM
//! heuristics. URL, hostname, license and date handling live in
//! `dom_meta`; author cleanup in `author`.

pub mod author;
pub mod dom_meta;
pub mod json_ld;
pub mod meta_tags;

use dom_query::Document;
use tracing::debug;

use crate::document::MetaData;
use crate::options::ExtractionOptions;
use crate::url_utils;

/// Extract all metadata from a parsed document.
#[must_use]
pub fn extract_metadata(
    doc: &Document,
    default_url: Option<&str>,
    options: &ExtractionOptions,
) -> MetaData {
    let mut meta = MetaData::default();

    // 1. Open Graph.
    meta_tags::examine_open_graph(doc, &mut meta);

    // 2. Standard meta tags.
    meta_tags::examine_meta_tags(doc, &mut meta);

    // 3. Structured data.
    json_ld::examine_json_ld(doc, &mut meta);

    // 4. DOM heuristics for whatever is still missing.
    dom_meta::examine_dom(doc, &mut meta);

    // 5. Canonical URL, with the caller's URL as last resort.
    dom_meta::examine_canonical_url(doc, &mut meta);
    if meta.url.is_none() {
        if let Some(fallback) = default_url.or(options.source_url.as_deref()) {
            if url_utils::is_valid_url(fallback) {
                meta.url = Some(fallback.to_string());
            }
        }
    }
    if meta.hostname.is_none() {
        meta.hostname = meta.url.as_deref().and_then(url_utils::extract_hostname);
    }

    // 6. License and date.
    dom_meta::examine_license(doc, &mut meta);
    dom_meta::examine_date(doc, &mut meta);

    // 7. Language declarations.
    if meta.language.is_none() {
        meta.language = dom_meta::declared_language(doc);
    }

    // 8. Author cleanup and blacklist.
    if let Some(raw) = meta.author.take() {
        meta.author = author::normalize_author(&raw, &options.author_blacklist);
    }

    tidy(&mut meta);
    debug!(title = ?meta.title, url = ?meta.url, "metadata extracted");
    meta
}

/// Trim text fields and drop the ones that end up empty.
fn tidy(meta: &mut MetaData) {
    for field in [
        &mut meta.title,
        &mut meta.author,
        &mut meta.description,
        &mut meta.sitename,
        &mut meta.pagetype,
    ] {
        if let Some(value) = field {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                *field = None;
            } else if trimmed.len() != value.len() {
                *field = Some(trimmed.to_string());
            }
        }
    }
    meta.categories.retain(|c| !c.trim().is_empty());
    meta.tags.retain(|t| !t.trim().is_empty());
    meta.categories.dedup();
    meta.tags.dedup();
}
