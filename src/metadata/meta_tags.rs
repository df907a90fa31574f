//! Open Graph and standard meta tag extraction.

use dom_query::Document;

use crate::document::MetaData;
use crate::tree;
use crate::url_utils;

/// `name`/`property`/`itemprop` values carrying the author.
const AUTHOR_NAMES: &[&str] = &[
    "author",
    "article:author",
    "citation_author",
    "creator",
    "dc.creator",
    "dc:creator",
    "dcterms.creator",
    "dcsext.author",
    "parsely-author",
    "rbauthors",
    "sailthru.author",
    "byl",
    "atc-metaauthor",
];

const DESCRIPTION_NAMES: &[&str] = &[
    "description",
    "dc.description",
    "dcterms.description",
    "sailthru.description",
    "twitter:description",
];

const SITENAME_NAMES: &[&str] = &["twitter:site", "application-name"];

const TITLE_NAMES: &[&str] = &[
    "citation_title",
    "dc.title",
    "parsely-title",
    "sailthru.title",
    "headline",
    "twitter:title",
    "title",
];

const TAG_NAMES: &[&str] = &[
    "article:tag",
    "keywords",
    "parsely-tags",
    "citation_keywords",
    "dcterms.subject",
    "shareaholic:keywords",
];

const IMAGE_NAMES: &[&str] = &["twitter:image", "twitter:image:src"];

/// Key under which a `<meta>` element publishes its value.
fn meta_key(sel: &dom_query::Selection) -> String {
    for attribute in ["property", "name", "itemprop"] {
        let value = tree::attr(sel, attribute);
        if !value.is_empty() {
            return value.to_lowercase();
        }
    }
    String::new()
}

fn fill(slot: &mut Option<String>, content: &str) {
    if slot.is_none() && !content.trim().is_empty() {
        *slot = Some(content.trim().to_string());
    }
}

/// Open Graph pass: `og:*` properties fill the core fields.
pub fn examine_open_graph(doc: &Document, meta: &mut MetaData) {
    for sel in doc.select("meta").iter() {
        let content = tree::attr(&sel, "content");
        if content.trim().is_empty() {
            continue;
        }
        match meta_key(&sel).as_str() {
            "og:title" => fill(&mut meta.title, &content),
            "og:description" => fill(&mut meta.description, &content),
            "og:site_name" => fill(&mut meta.sitename, &content),
            "og:image" | "og:image:url" | "og:image:secure_url" => {
                fill(&mut meta.image, &content);
            }
            "og:type" => fill(&mut meta.pagetype, &content),
            "og:url" => {
                if url_utils::is_valid_url(content.trim()) {
                    fill(&mut meta.url, &content);
                }
            }
            "og:author" | "og:article:author" => fill(&mut meta.author, &content),
            "og:locale" => fill(&mut meta.language, normalize_locale(&content).as_str()),
            _ => {}
        }
    }
}

/// Locale declarations like `en_US` reduce to the bare language code.
fn normalize_locale(locale: &str) -> String {
    locale
        .split(['_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Standard meta tag pass: named tags fill what Open Graph left open.
pub fn examine_meta_tags(doc: &Document, meta: &mut MetaData) {
    for sel in doc.select("meta").iter() {
        let content = tree::attr(&sel, "content");
        if content.trim().is_empty() {
            continue;
        }
        let key = meta_key(&sel);
        let key = key.as_str();

        if AUTHOR_NAMES.contains(&key) {
            fill(&mut meta.author, &content);
        } else if DESCRIPTION_NAMES.contains(&key) {
            fill(&mut meta.description, &content);
        } else if SITENAME_NAMES.contains(&key) {
            // Twitter site handles come with a leading @.
            fill(&mut meta.sitename, content.trim_start_matches('@'));
        } else if TITLE_NAMES.contains(&key) {
            fill(&mut meta.title, &content);
        } else if TAG_NAMES.contains(&key) {
            for tag in content.split(',') {
                let tag = tag.trim();
                if !tag.is_empty() && !meta.tags.iter().any(|t| t == tag) {
                    meta.tags.push(tag.to_string());
                }
            }
        } else if IMAGE_NAMES.contains(&key) {
            fill(&mut meta.image, &content);
        } else if key == "twitter:url" {
            if url_utils::is_valid_url(content.trim()) {
                fill(&mut meta.url, &content);
            }
        } else if key == "content-language" {
            fill(&mut meta.language, &content.to_lowercase());
        }
    }
}
