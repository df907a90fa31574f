//! Metadata selector families: title, author, category, tag elements.

use dom_query::Selection;

use super::matches_any;
use crate::tree;

const TITLE_MARKERS: &[&str] = &[
    "post-title",
    "entry-title",
    "article-title",
    "articletitle",
    "headline",
    "page-title",
    "title-text",
];

const AUTHOR_MARKERS: &[&str] = &[
    "author",
    "byline",
    "writer",
    "submitted-by",
    "posted-by",
    "screenname",
];

const CATEGORY_MARKERS: &[&str] = &[
    "category",
    "categories",
    "post-category",
    "cat-links",
    "section-name",
];

const TAG_MARKERS: &[&str] = &["tag-list", "post-tags", "tagcloud", "tag-links", "keywords"];

#[must_use]
pub fn title_rule(sel: &Selection) -> bool {
    let tag = tree::tag_name(sel);
    matches!(tag.as_str(), "h1" | "h2" | "h3" | "div" | "span" | "p")
        && matches_any(sel, TITLE_MARKERS)
}

#[must_use]
pub fn author_rule(sel: &Selection) -> bool {
    let tag = tree::tag_name(sel);
    if matches!(tag.as_str(), "script" | "style" | "time") {
        return false;
    }
    if tree::attr(sel, "rel") == "author" || tree::attr(sel, "itemprop") == "author" {
        return true;
    }
    matches_any(sel, AUTHOR_MARKERS)
}

#[must_use]
pub fn category_rule(sel: &Selection) -> bool {
    matches_any(sel, CATEGORY_MARKERS)
}

#[must_use]
pub fn tag_rule(sel: &Selection) -> bool {
    matches_any(sel, TAG_MARKERS)
}
