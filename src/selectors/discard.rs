//! Discard selector families.
//!
//! Union semantics: an element matching any applicable family is removed.
//! The overall family always applies; teasers are kept in recall focus,
//! the precision-extra family only applies in precision focus.

use dom_query::Selection;

use super::{attr_haystack, matches_any};
use crate::tree;

/// Site chrome, engagement widgets and monetization blocks.
const OVERALL_DISCARD_MARKERS: &[&str] = &[
    "footer",
    "related",
    "shar",
    "share",
    "social",
    "syndication",
    "embed",
    "newsletter",
    "subnav",
    "cookie",
    "tags",
    "sidebar",
    "banner",
    "meta",
    "menu",
    "nav",
    "navbar",
    "breadcrumb",
    "author",
    "byline",
    "rating",
    "widget",
    "outbrain",
    "taboola",
    "criteo",
    "consent",
    "modal-content",
    "permission",
    "most-popular",
    "premium",
    "paid-content",
    "blurred",
    "login",
    "signup",
    "subscribe",
    "masthead",
    "pagination",
    "popup",
    "print-",
    "disclaimer",
    "sponsor",
    "advert",
    "promo",
];

/// Markers that would otherwise be caught by the overall family but sit
/// on genuine content containers.
const DISCARD_SALVAGE_MARKERS: &[&str] = &[
    "article-body",
    "articlebody",
    "article-content",
    "post-content",
    "entry-content",
    "story-body",
    "page-content",
];

/// Teaser/preview snippets pointing at other articles.
const TEASER_MARKERS: &[&str] = &["teaser", "read-more", "readmore", "more-link", "preview-"];

/// Looser markers removed only in precision focus.
const PRECISION_DISCARD_MARKERS: &[&str] = &[
    "widget",
    "sidebar",
    "supplemental",
    "secondary",
    "complementary",
    "recommend",
    "trending",
    "popular",
];

/// Author-box markers removed from body content (author data is taken
/// from metadata instead).
const AUTHOR_DISCARD_MARKERS: &[&str] = &[
    "author-bio",
    "author-box",
    "author-info",
    "about-author",
    "bio-box",
    "vcard",
];

/// Overall discard family.
#[must_use]
pub fn overall_discard_rule(sel: &Selection) -> bool {
    let tag = tree::tag_name(sel);
    if matches!(tag.as_str(), "body" | "html" | "article" | "main") {
        return false;
    }
    if !matches_any(sel, OVERALL_DISCARD_MARKERS) {
        return false;
    }
    // Compound names like "article-body-meta-container" stay.
    !matches_any(sel, DISCARD_SALVAGE_MARKERS)
}

#[must_use]
pub fn teaser_rule(sel: &Selection) -> bool {
    matches_any(sel, TEASER_MARKERS)
}

#[must_use]
pub fn precision_discard_rule(sel: &Selection) -> bool {
    matches_any(sel, PRECISION_DISCARD_MARKERS)
}

#[must_use]
pub fn author_discard_rule(sel: &Selection) -> bool {
    matches_any(sel, AUTHOR_DISCARD_MARKERS)
}

/// Hidden-element family: inline styles, aria state and hiding classes.
#[must_use]
pub fn hidden_rule(sel: &Selection) -> bool {
    tree::is_hidden(sel)
}

/// Union of the families applicable under the given focus.
#[must_use]
pub fn should_discard(sel: &Selection, precision: bool, recall: bool) -> bool {
    if hidden_rule(sel) || overall_discard_rule(sel) || author_discard_rule(sel) {
        return true;
    }
    if !recall && teaser_rule(sel) {
        return true;
    }
    precision && precision_discard_rule(sel)
}

/// Cheap pre-check used before walking attribute values.
#[must_use]
pub fn has_attributes(sel: &Selection) -> bool {
    !attr_haystack(sel).trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom_query::Document;

    #[test]
    fn chrome_is_discarded() {
        let doc = Document::from(concat!(
            r#"<div class="site-footer">f</div>"#,
            r#"<div class="social-share">s</div>"#,
            r#"<div class="cookie-consent">c</div>"#,
            r#"<div class="breadcrumb">b</div>"#,
        ));
        for sel in tree::descendants(&doc.select("body")) {
            assert!(overall_discard_rule(&sel), "should discard {}", tree::class(&sel));
        }
    }

    #[test]
    fn content_container_is_salvaged() {
        let doc = Document::from(r#"<div class="article-body-share-ready">x</div>"#);
        assert!(!overall_discard_rule(&doc.select("div")));
    }

    #[test]
    fn article_tag_never_discarded() {
        let doc = Document::from(r#"<article class="tags-enabled">x</article>"#);
        assert!(!overall_discard_rule(&doc.select("article")));
    }

    #[test]
    fn teaser_only_outside_recall() {
        let doc = Document::from(r#"<div class="teaser">read more</div>"#);
        let div = doc.select("div");
        assert!(should_discard(&div, false, false));
        assert!(!should_discard(&div, false, true));
    }

    #[test]
    fn precision_extra_family() {
        let doc = Document::from(r#"<div class="trending-now">x</div>"#);
        let div = doc.select("div");
        assert!(should_discard(&div, true, false));
        assert!(!should_discard(&div, false, false));
    }

    #[test]
    fn plain_content_kept() {
        let doc = Document::from(r#"<p>Just a paragraph.</p>"#);
        assert!(!should_discard(&doc.select("p"), true, false));
    }
}
