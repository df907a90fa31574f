//! JSON-LD (schema.org) metadata extraction.
//!
//! Each `<script type="application/ld+json">` block is decoded and walked
//! for article, webpage, person and organization schemas. Malformed JSON
//! gets a second chance through regex scraping: broken structured data is
//! endemic and still worth mining.

use std::sync::LazyLock;

use dom_query::Document;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::document::MetaData;

static SCHEMA_CONTEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://schema\.org").expect("schema context regex"));

/// Article-like schema types.
const ARTICLE_TYPES: &[&str] = &[
    "Article",
    "AdvertiserContentArticle",
    "BlogPosting",
    "LiveBlogPosting",
    "NewsArticle",
    "AnalysisNewsArticle",
    "OpinionNewsArticle",
    "ReportageNewsArticle",
    "ReviewNewsArticle",
    "Report",
    "SatiricalArticle",
    "ScholarlyArticle",
    "MedicalScholarlyArticle",
    "SocialMediaPosting",
    "TechArticle",
];

/// Page-like schema types (a weaker signal than articles).
const PAGE_TYPES: &[&str] = &[
    "WebPage",
    "AboutPage",
    "CheckoutPage",
    "CollectionPage",
    "ContactPage",
    "FAQPage",
    "ItemPage",
    "MediumPage",
    "ProfilePage",
    "QAPage",
    "RealEstateListing",
    "SearchResultsPage",
];

// Regex fallbacks for JSON that does not decode.
static RX_AUTHOR_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""author"\s*:\s*\{[^}]*?"name"\s*:\s*"([^"]+)""#).expect("author object regex")
});
static RX_AUTHOR_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""author"\s*:\s*"([^"]+)""#).expect("author string regex")
});
static RX_PUBLISHER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""publisher"\s*:\s*\{[^}]*?"name"\s*:\s*"([^"]+)""#).expect("publisher regex")
});
static RX_CATEGORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""articleSection"\s*:\s*"([^"]+)""#).expect("category regex")
});
static RX_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""@type"\s*:\s*"([^"]+)""#).expect("type regex"));
static RX_HEADLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""headline"\s*:\s*"([^"]+)""#).expect("headline regex"));
static RX_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""name"\s*:\s*"([^"]+)""#).expect("name regex"));

fn fill(slot: &mut Option<String>, value: &str) {
    if slot.is_none() && !value.trim().is_empty() {
        *slot = Some(value.trim().to_string());
    }
}

/// Examine every JSON-LD block in the document.
pub fn examine_json_ld(doc: &Document, meta: &mut MetaData) {
    for script in doc.select(r#"script[type="application/ld+json"]"#).iter() {
        let raw = script.text().trim().to_string();
        if raw.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(data) => walk_value(&data, meta, true),
            Err(err) => {
                debug!(%err, "malformed JSON-LD, falling back to regex scraping");
                scrape_with_regexes(&raw, meta);
            }
        }
    }
}

fn context_matches(value: &Value) -> bool {
    match value.get("@context") {
        Some(Value::String(ctx)) => SCHEMA_CONTEXT.is_match(ctx),
        Some(Value::Array(items)) => items
            .iter()
            .any(|i| i.as_str().is_some_and(|s| SCHEMA_CONTEXT.is_match(s))),
        // Nested graph nodes inherit the outer context.
        None => true,
        _ => false,
    }
}

fn walk_value(value: &Value, meta: &mut MetaData, top_level: bool) {
    match value {
        Value::Array(items) => {
            for item in items {
                walk_value(item, meta, top_level);
            }
        }
        Value::Object(map) => {
            if top_level && !context_matches(value) {
                return;
            }
            // @graph and live blog wrappers hold the real payloads.
            for wrapper in ["@graph", "liveBlogUpdate"] {
                if let Some(inner) = map.get(wrapper) {
                    walk_value(inner, meta, false);
                }
            }
            examine_object(value, meta);
        }
        _ => {}
    }
}

fn type_names(value: &Value) -> Vec<String> {
    match value.get("@type") {
        Some(Value::String(t)) => vec![t.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|i| i.as_str().map(ToString::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Person objects may spell the name out in parts.
fn person_name(value: &Value) -> Option<String> {
    if let Some(name) = value.get("name").and_then(Value::as_str) {
        if !name.trim().is_empty() {
            return Some(name.trim().to_string());
        }
    }
    let parts: Vec<&str> = ["givenName", "additionalName", "familyName"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

fn author_names(value: &Value) -> Option<String> {
    match value {
        Value::String(name) => {
            let name = name.trim();
            (!name.is_empty()).then(|| name.to_string())
        }
        Value::Object(_) => person_name(value),
        Value::Array(items) => {
            let names: Vec<String> = items.iter().filter_map(author_names).collect();
            (!names.is_empty()).then(|| names.join("; "))
        }
        _ => None,
    }
}

fn examine_object(value: &Value, meta: &mut MetaData) {
    let types = type_names(value);
    let is_article = types.iter().any(|t| ARTICLE_TYPES.contains(&t.as_str()));
    let is_page = types.iter().any(|t| PAGE_TYPES.contains(&t.as_str()));

    if let Some(first_type) = types.first() {
        if is_article || is_page {
            fill(&mut meta.pagetype, first_type);
        }
    }

    if is_article || is_page {
        if let Some(author) = value.get("author").and_then(author_names) {
            fill(&mut meta.author, &author);
        }
        if let Some(headline) = value.get("headline").and_then(Value::as_str) {
            fill(&mut meta.title, headline);
        } else if is_article {
            if let Some(name) = value.get("name").and_then(Value::as_str) {
                fill(&mut meta.title, name);
            }
        }
        if let Some(date) = value.get("datePublished").and_then(Value::as_str) {
            fill(&mut meta.date, date);
        }
        match value.get("articleSection") {
            Some(Value::String(section)) => push_unique(&mut meta.categories, section),
            Some(Value::Array(sections)) => {
                for section in sections.iter().filter_map(Value::as_str) {
                    push_unique(&mut meta.categories, section);
                }
            }
            _ => {}
        }
        if let Some(publisher) = value.get("publisher") {
            if let Some(name) = person_name(publisher) {
                fill(&mut meta.sitename, &name);
            }
        }
    }

    if types.iter().any(|t| t == "Person") {
        if let Some(name) = person_name(value) {
            fill(&mut meta.author, &name);
        }
    }
    if types.iter().any(|t| t == "Organization" || t == "NewsMediaOrganization") {
        if let Some(name) = person_name(value) {
            fill(&mut meta.sitename, &name);
        }
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() && !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Regex pass over JSON that failed to decode.
fn scrape_with_regexes(raw: &str, meta: &mut MetaData) {
    if let Some(c) = RX_AUTHOR_OBJECT
        .captures(raw)
        .or_else(|| RX_AUTHOR_STRING.captures(raw))
    {
        fill(&mut meta.author, &c[1]);
    }
    if let Some(c) = RX_PUBLISHER.captures(raw) {
        fill(&mut meta.sitename, &c[1]);
    }
    for c in RX_CATEGORY.captures_iter(raw) {
        push_unique(&mut meta.categories, &c[1]);
    }
    if let Some(c) = RX_TYPE.captures(raw) {
        if ARTICLE_TYPES.contains(&&c[1]) || PAGE_TYPES.contains(&&c[1]) {
            fill(&mut meta.pagetype, &c[1]);
        }
    }
    if let Some(c) = RX_HEADLINE.captures(raw) {
        fill(&mut meta.title, &c[1]);
    } else if let Some(c) = RX_NAME.captures(raw) {
        fill(&mut meta.title, &c[1]);
    }
}
