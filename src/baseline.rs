//! Naive baseline extractor.
//!
//! The safety net at the bottom of the cascade: structured data first,
//! then `<article>` containers, then every paragraph-like element, then
//! whatever text the body holds. Quality is secondary to never returning
//! nothing for a page that visibly has text.

use std::collections::HashSet;

use dom_query::{Document, Selection};
use serde_json::Value;

use crate::markup::{Node, Tag};
use crate::tree;

const MIN_BASELINE_LEN: usize = 100;

/// Pull every `articleBody` string out of the page's JSON-LD blocks.
fn json_ld_article_body(doc: &Document) -> Option<String> {
    let mut collected = String::new();
    for script in doc.select(r#"script[type="application/ld+json"]"#).iter() {
        let raw = script.text().trim().to_string();
        if raw.is_empty() {
            continue;
        }
        let Ok(data) = serde_json::from_str::<Value>(&raw) else {
            continue;
        };
        collect_article_bodies(&data, &mut collected);
    }

    let collected = collected.trim().to_string();
    if collected.is_empty() {
        return None;
    }
    // Embedded markup: parse and take the text.
    if collected.contains("<p>") {
        let inner = Document::from(format!("<div>{collected}</div>"));
        return Some(tree::trimmed_text(&inner.select("div")));
    }
    Some(collected)
}

fn collect_article_bodies(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(body)) = map.get("articleBody") {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(body);
            }
            for nested in map.values() {
                collect_article_bodies(nested, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_article_bodies(item, out);
            }
        }
        _ => {}
    }
}

fn paragraph_body(text: &str) -> Node {
    let mut body = Node::new(Tag::Body);
    body.push_element(Node::with_text(Tag::P, text));
    body
}

/// Run the baseline cascade. Always returns a body, possibly empty.
#[must_use]
pub fn baseline(doc: &Document) -> (Node, String, usize) {
    // 1. Structured data.
    if let Some(body_text) = json_ld_article_body(doc) {
        if body_text.chars().count() > MIN_BASELINE_LEN {
            let len = body_text.chars().count();
            return (paragraph_body(&body_text), body_text, len);
        }
    }

    // 2. Article containers.
    let mut article_text = String::new();
    for article in doc.select("article").iter() {
        let text = tree::trimmed_text(&article);
        if text.chars().count() > MIN_BASELINE_LEN {
            if !article_text.is_empty() {
                article_text.push('\n');
            }
            article_text.push_str(&text);
        }
    }
    if !article_text.is_empty() {
        let len = article_text.chars().count();
        return (paragraph_body(&article_text), article_text, len);
    }

    // 3. Paragraph-like elements, deduplicated.
    let mut seen: HashSet<String> = HashSet::new();
    let mut body = Node::new(Tag::Body);
    let mut combined = String::new();
    for sel in doc
        .select("blockquote, code, p, pre, q, quote")
        .nodes()
        .iter()
        .map(|n| Selection::from(n.clone()))
    {
        let text = tree::trimmed_text(&sel);
        if text.is_empty() || seen.contains(&text) {
            continue;
        }
        seen.insert(text.clone());
        if !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(&text);
        body.push_element(Node::with_text(Tag::P, &text));
    }
    if combined.chars().count() > MIN_BASELINE_LEN {
        let len = combined.chars().count();
        return (body, combined, len);
    }

    // 4. Whole body text, line by line.
    let body_text = tree::trimmed_text(&doc.select("body"));
    let lines: Vec<String> = body_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ToString::to_string)
        .collect();
    let joined = lines.join("\n");
    if !joined.is_empty() {
        let len = joined.chars().count();
        return (paragraph_body(&joined), joined, len);
    }

    // Last resort: space-normalized text of the whole document.
    let fallback = tree::collapse_whitespace(&doc.select("html").text());
    let len = fallback.chars().count();
    (paragraph_body(&fallback), fallback, len)
}
