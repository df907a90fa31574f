//! Comment section selectors.

use dom_query::Selection;

use super::{matches_any, Rule};
use crate::tree;

const COMMENT_MARKERS: &[&str] = &[
    "commentlist",
    "comment-list",
    "comments-content",
    "comment-content",
    "post-comments",
    "disqus_thread",
    "dsq-comments",
    "comol",
    "comment-",
];

/// Container elements holding reader comments.
#[must_use]
pub fn comments_rule(sel: &Selection) -> bool {
    matches!(
        tree::tag_name(sel).as_str(),
        "div" | "section" | "ol" | "ul" | "dl" | "aside"
    ) && matches_any(sel, COMMENT_MARKERS)
}

pub static COMMENT_RULES: &[Rule] = &[comments_rule];

/// Markers removed *inside* a matched comment section (forms, signup
/// prompts, social plumbing around the actual comments).
const COMMENT_DISCARD_MARKERS: &[&str] = &[
    "comment-form",
    "comment-respond",
    "reply-form",
    "signin",
    "signup",
    "login",
    "akismet",
    "comment-subscription",
];

#[must_use]
pub fn comments_discard_rule(sel: &Selection) -> bool {
    matches_any(sel, COMMENT_DISCARD_MARKERS)
}
