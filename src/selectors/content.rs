//! Body selector families.
//!
//! Three tiers of container markers, tried in order by the primary
//! extractor. The first tier carries the specific article-body markers,
//! the second the looser story/area markers of older CMS themes, the
//! third catches generic main-content wrappers.

use dom_query::Selection;

use super::{matches_any, Rule};
use crate::tree;

/// Tags eligible as a body container.
fn container_tag(sel: &Selection) -> bool {
    matches!(
        tree::tag_name(sel).as_str(),
        "article" | "div" | "main" | "section" | "td"
    )
}

/// Tier 1: explicit article-body markers.
const BODY_MARKERS: &[&str] = &[
    "post-text",
    "post-body",
    "entry-content",
    "article-content",
    "article-body",
    "articlebody",
    "article__content",
    "article__body",
    "page-content",
    "text-content",
    "body-text",
    "art-content",
];

/// Tier 2: looser story/area markers.
const STORY_MARKERS: &[&str] = &[
    "storycontent",
    "story-content",
    "story-body",
    "postarea",
    "post-entry",
    "postcontent",
    "post-content",
    "fulltext",
    "field-body",
    "single-content",
    "single-post",
];

/// Tier 3: generic main-content wrappers.
const MAIN_MARKERS: &[&str] = &["content-main", "content_main", "main-content", "content-body"];

#[must_use]
pub fn body_rule_primary(sel: &Selection) -> bool {
    container_tag(sel)
        && (matches_any(sel, BODY_MARKERS)
            || tree::attr(sel, "itemprop") == "articleBody")
}

#[must_use]
pub fn body_rule_story(sel: &Selection) -> bool {
    container_tag(sel) && matches_any(sel, STORY_MARKERS)
}

#[must_use]
pub fn body_rule_main(sel: &Selection) -> bool {
    container_tag(sel) && matches_any(sel, MAIN_MARKERS)
}

/// Ordered body families; the first non-empty match wins.
pub static BODY_RULES: &[Rule] = &[body_rule_primary, body_rule_story, body_rule_main];

/// Structural fallbacks used when no family matches: `<article>`, then
/// `role="main"`, then the first `<main>`.
#[must_use]
pub fn structural_fallback<'a>(root: &Selection<'a>) -> Option<Selection<'a>> {
    for selector in ["article", "*[role=\"main\"]", "main"] {
        let hit = root.select(selector);
        if let Some(node) = hit.nodes().first() {
            return Some(Selection::from(node.clone()));
        }
    }
    None
}
