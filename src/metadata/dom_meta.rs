//! DOM-based metadata heuristics.
//!
//! The last stop of the metadata cascade: page titles from headings and
//! the `<title>` tag, canonical URLs, licenses from footer anchors, date
//! harvesting from well-known meta tags and visible timestamps.

use std::sync::LazyLock;

use chrono::NaiveDate;
use dom_query::Document;
use regex::Regex;

use crate::document::MetaData;
use crate::selectors::meta_rules;
use crate::selectors::{find_all, find_first};
use crate::tree;
use crate::url_utils;

/// Separators between article title and site name in `<title>`.
const TITLE_SEPARATORS: &[char] = &[
    '–', '•', '·', '—', '|', '⁄', '*', '⋆', '~', '‹', '«', '<', '›', '»', '>', ':', '-',
];

static CC_LICENSE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(by-nc-nd|by-nc-sa|by-nc|by-nd|by-sa|by|zero)/([1-9]\.[0-9])")
        .expect("license path regex")
});

static CC_LICENSE_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(creative commons|cc)\s+(by[a-z-]*)(\s+[1-9]\.[0-9])?")
        .expect("license text regex")
});

// No trailing boundary: ISO datetimes continue with "T..." right after
// the day.
static DATE_ISO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})").expect("iso date regex"));
static DATE_US: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("us date regex"));
static DATE_WORDY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})\.?\s+([A-Z][a-z]{2,8})\.?\s+(\d{4})\b").expect("wordy date regex")
});

fn fill(slot: &mut Option<String>, value: &str) {
    if slot.is_none() && !value.trim().is_empty() {
        *slot = Some(value.trim().to_string());
    }
}

/// Title, author, categories and tags from the visible DOM.
pub fn examine_dom(doc: &Document, meta: &mut MetaData) {
    let root = doc.select("html");

    if meta.title.is_none() {
        // A single h1 is authoritative.
        let h1 = doc.select("h1");
        if h1.length() == 1 {
            fill(&mut meta.title, &tree::trimmed_text(&h1));
        }
    }
    if meta.title.is_none() {
        let title_tag = tree::trimmed_text(&doc.select("title"));
        if !title_tag.is_empty() {
            fill(&mut meta.title, &strip_site_suffix(&title_tag));
        }
    }
    if meta.title.is_none() {
        if let Some(hit) = find_first(&root, meta_rules::title_rule) {
            fill(&mut meta.title, &tree::trimmed_text(&hit));
        }
    }
    if meta.title.is_none() {
        let h2 = doc.select("h2").first();
        fill(&mut meta.title, &tree::trimmed_text(&h2));
    }

    if meta.author.is_none() {
        if let Some(hit) = find_first(&root, meta_rules::author_rule) {
            fill(&mut meta.author, &tree::trimmed_text(&hit));
        }
    }

    if meta.categories.is_empty() {
        for hit in find_all(&root, meta_rules::category_rule) {
            for link in hit.select("a").iter() {
                let label = tree::trimmed_text(&link);
                if !label.is_empty() && !meta.categories.iter().any(|c| *c == label) {
                    meta.categories.push(label);
                }
            }
        }
    }
    if meta.tags.is_empty() {
        for hit in find_all(&root, meta_rules::tag_rule) {
            for link in hit.select("a").iter() {
                let label = tree::trimmed_text(&link);
                if !label.is_empty() && !meta.tags.iter().any(|t| *t == label) {
                    meta.tags.push(label);
                }
            }
        }
    }
}

/// Cut the site name off a `<title>` value: the part before the first
/// separator is the article title in the overwhelming majority of pages.
fn strip_site_suffix(title: &str) -> String {
    for sep in TITLE_SEPARATORS {
        if let Some(index) = title.find(*sep) {
            let head = title[..index].trim();
            // Leading separators ("- Site: Title") would leave nothing.
            if head.chars().count() >= 5 {
                return head.to_string();
            }
        }
    }
    title.trim().to_string()
}

/// Canonical URL: `rel=canonical`, `<base>`, then the x-default alternate.
/// Fills only when earlier sources left the URL empty.
pub fn examine_canonical_url(doc: &Document, meta: &mut MetaData) {
    if meta.url.is_some() {
        return;
    }
    let mut candidate = None;
    for selector in [
        r#"link[rel="canonical"]"#,
        "base",
        r#"link[rel="alternate"][hreflang="x-default"]"#,
    ] {
        let href = tree::attr(&doc.select(selector), "href");
        if !href.trim().is_empty() {
            candidate = Some(href.trim().to_string());
            break;
        }
    }
    let Some(candidate) = candidate else { return };

    if url_utils::is_valid_url(&candidate) {
        meta.url = Some(candidate);
    } else if candidate.starts_with('/') {
        // Root-relative: borrow scheme and host from social meta tags.
        if let Some(base) = social_base_url(doc) {
            if let Some(resolved) = url_utils::resolve_link(&candidate, Some(&base)) {
                meta.url = Some(resolved);
            }
        }
    }

    if let Some(url) = &meta.url {
        meta.hostname = url_utils::extract_hostname(url);
    }
}

/// Scheme+host of any `og:url` or `twitter:url` meta, for resolving
/// root-relative canonicals.
fn social_base_url(doc: &Document) -> Option<String> {
    for selector in [r#"meta[property="og:url"]"#, r#"meta[name="twitter:url"]"#] {
        let content = tree::attr(&doc.select(selector), "content");
        if url_utils::is_valid_url(content.trim()) {
            return Some(content.trim().to_string());
        }
    }
    None
}

/// License from `rel=license` anchors, else a strict text match in
/// footer anchors.
pub fn examine_license(doc: &Document, meta: &mut MetaData) {
    if meta.license.is_some() {
        return;
    }

    for anchor in doc.select(r#"a[rel="license"]"#).iter() {
        let href = tree::attr(&anchor, "href");
        if let Some(c) = CC_LICENSE_PATH.captures(&href) {
            meta.license = Some(format!("CC {} {}", c[1].to_uppercase(), &c[2]));
            return;
        }
        let text = tree::trimmed_text(&anchor);
        if !text.is_empty() {
            meta.license = Some(text);
            return;
        }
    }

    for anchor in doc
        .select(r#"footer a, div[class*="footer"] a, div[id*="footer"] a"#)
        .iter()
    {
        let text = tree::trimmed_text(&anchor);
        if CC_LICENSE_TEXT.is_match(&text) {
            meta.license = Some(text);
            return;
        }
    }
}

/// Publication date from well-known meta tags, `<time>` elements, then
/// date-like patterns in text; normalized to `YYYY-MM-DD`.
pub fn examine_date(doc: &Document, meta: &mut MetaData) {
    if meta.date.is_some() {
        meta.date = meta.date.take().and_then(|d| normalize_date(&d));
        if meta.date.is_some() {
            return;
        }
    }

    for selector in [
        r#"meta[property="article:published_time"]"#,
        r#"meta[name="dc.date"]"#,
        r#"meta[name="dc.date.issued"]"#,
        r#"meta[property="og:updated_time"]"#,
        r#"meta[property="article:modified_time"]"#,
    ] {
        let content = tree::attr(&doc.select(selector), "content");
        if let Some(date) = normalize_date(&content) {
            meta.date = Some(date);
            return;
        }
    }

    for time in doc.select("time").iter() {
        let datetime = tree::attr(&time, "datetime");
        let candidate = if datetime.is_empty() {
            tree::trimmed_text(&time)
        } else {
            datetime
        };
        if let Some(date) = normalize_date(&candidate) {
            meta.date = Some(date);
            return;
        }
    }

    // Visible timestamps near the top of the page.
    let body_text: String = tree::trimmed_text(&doc.select("body"))
        .chars()
        .take(2000)
        .collect();
    if let Some(date) = normalize_date(&body_text) {
        meta.date = Some(date);
    }
}

/// Find and normalize the first date-like pattern in a string.
#[must_use]
pub fn normalize_date(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(c) = DATE_ISO.captures(text) {
        let date = NaiveDate::from_ymd_opt(c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?)?;
        return Some(date.format("%Y-%m-%d").to_string());
    }
    if let Some(c) = DATE_US.captures(text) {
        let date = NaiveDate::from_ymd_opt(c[3].parse().ok()?, c[1].parse().ok()?, c[2].parse().ok()?)?;
        return Some(date.format("%Y-%m-%d").to_string());
    }
    if let Some(c) = DATE_WORDY.captures(text) {
        let month = month_number(&c[2])?;
        let date = NaiveDate::from_ymd_opt(c[3].parse().ok()?, month, c[1].parse().ok()?)?;
        return Some(date.format("%Y-%m-%d").to_string());
    }
    None
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let months = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ];
    months
        .iter()
        .position(|m| m.starts_with(&lower) || lower.starts_with(&m[..3]))
        .map(|i| u32::try_from(i + 1).unwrap_or(1))
}

/// Language declared by the document itself.
#[must_use]
pub fn declared_language(doc: &Document) -> Option<String> {
    for (selector, attribute) in [
        (r#"meta[http-equiv="content-language"]"#, "content"),
        ("html", "lang"),
    ] {
        let value = tree::attr(&doc.select(selector), attribute);
        let code = value.split(['-', '_', ',']).next().unwrap_or_default().trim().to_lowercase();
        if code.len() == 2 {
            return Some(code);
        }
    }
    None
}
