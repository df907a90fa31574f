//! DOM tree utilities.
//!
//! Small helpers over `dom_query` selections used across the pipeline:
//! normalized text access, attribute shorthands, hidden-element probing
//! and the link-density measure that drives boilerplate decisions.

use dom_query::{Document, Selection};

/// Tag name of the first node, lowercase, empty when not an element.
#[must_use]
pub fn tag_name(sel: &Selection) -> String {
    sel.nodes()
        .first()
        .and_then(dom_query::NodeRef::node_name)
        .map(|t| t.to_lowercase())
        .unwrap_or_default()
}

/// Attribute value, empty string when missing.
#[inline]
#[must_use]
pub fn attr(sel: &Selection, name: &str) -> String {
    sel.attr(name).map(|v| v.to_string()).unwrap_or_default()
}

#[inline]
#[must_use]
pub fn class(sel: &Selection) -> String {
    attr(sel, "class")
}

#[inline]
#[must_use]
pub fn id(sel: &Selection) -> String {
    attr(sel, "id")
}

/// Concatenated class and id, the haystack most discard rules match on.
#[must_use]
pub fn class_id(sel: &Selection) -> String {
    let mut combined = class(sel);
    combined.push(' ');
    combined.push_str(&id(sel));
    combined
}

/// Subtree text with outer whitespace trimmed.
#[must_use]
pub fn trimmed_text(sel: &Selection) -> String {
    sel.text().trim().to_string()
}

/// Character count of the trimmed subtree text.
#[must_use]
pub fn text_len(sel: &Selection) -> usize {
    sel.text().trim().chars().count()
}

/// Collapse runs of whitespace into single spaces.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_gap = false;
    for c in text.chars() {
        if c.is_whitespace() || c == '\u{a0}' {
            in_gap = true;
        } else {
            if in_gap && !out.is_empty() {
                out.push(' ');
            }
            in_gap = false;
            out.push(c);
        }
    }
    out
}

/// Whether non-whitespace text exists beyond bare punctuation.
#[must_use]
pub fn has_real_text(text: &str) -> bool {
    text.chars().any(|c| c.is_alphanumeric())
}

/// Hidden-element probe: inline style, `aria-hidden`, or one of the
/// conventional hiding class names.
#[must_use]
pub fn is_hidden(sel: &Selection) -> bool {
    let style = attr(sel, "style").to_lowercase();
    if style.contains("display:none") || style.contains("display: none") {
        return true;
    }
    if attr(sel, "aria-hidden") == "true" {
        return true;
    }
    let class_id = class_id(sel).to_lowercase();
    ["hidden", "hide-", "noprint"]
        .iter()
        .any(|p| class_id.contains(p))
}

/// Ratio of anchor text to total text in the subtree, in `[0, 1]`.
/// Empty elements count as zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn link_density(sel: &Selection) -> f64 {
    let total = text_len(sel);
    if total == 0 {
        return 0.0;
    }
    let mut link_chars = 0usize;
    for link in sel.select("a").iter() {
        link_chars += link.text().trim().chars().count();
    }
    (link_chars.min(total) as f64) / (total as f64)
}

/// All element descendants of a selection, document order.
#[must_use]
pub fn descendants<'a>(sel: &Selection<'a>) -> Vec<Selection<'a>> {
    sel.select("*")
        .nodes()
        .iter()
        .map(|n| Selection::from(n.clone()))
        .collect()
}

/// Direct element children.
#[must_use]
pub fn element_children<'a>(sel: &Selection<'a>) -> Vec<Selection<'a>> {
    sel.children()
        .nodes()
        .iter()
        .filter(|n| n.is_element())
        .map(|n| Selection::from(n.clone()))
        .collect()
}

/// Deep-clone a selection into its own document.
#[must_use]
pub fn clone_subtree(sel: &Selection) -> Document {
    Document::from(sel.html().to_string())
}

/// Drop every attribute of the first node in the selection.
pub fn clear_attributes(sel: &Selection) {
    let names: Vec<String> = sel
        .nodes()
        .first()
        .map(|node| {
            node.attrs()
                .iter()
                .map(|a| a.name.local.to_string())
                .collect()
        })
        .unwrap_or_default();
    for name in names {
        sel.remove_attr(&name);
    }
}

/// Escape text for embedding into generated HTML/XML.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
