//! Selector catalog.
//!
//! Declarative lists of class/id/role/itemprop substring patterns, grouped
//! by intent, compiled into predicate functions over DOM elements. The
//! catalog is ordered: for selection operations (body, comments, title)
//! the first family that matches wins; for discard operations the union
//! of matching families is removed.

pub mod comments;
pub mod content;
pub mod discard;
pub mod meta_rules;

use dom_query::Selection;

use crate::tree;

/// A predicate over one DOM element.
pub type Rule = fn(&Selection) -> bool;

/// Lowercased haystack of the attributes pattern families match on.
#[must_use]
pub fn attr_haystack(sel: &Selection) -> String {
    let mut hay = tree::class(sel);
    hay.push(' ');
    hay.push_str(&tree::id(sel));
    hay.push(' ');
    hay.push_str(&tree::attr(sel, "role"));
    hay.push(' ');
    hay.push_str(&tree::attr(sel, "itemprop"));
    hay.to_lowercase()
}

/// True when any needle occurs in the attribute haystack.
#[must_use]
pub fn matches_any(sel: &Selection, needles: &[&str]) -> bool {
    let hay = attr_haystack(sel);
    needles.iter().any(|n| hay.contains(n))
}

/// First element (document order) matching the rule.
#[must_use]
pub fn find_first<'a>(root: &Selection<'a>, rule: Rule) -> Option<Selection<'a>> {
    root.select("*")
        .nodes()
        .iter()
        .map(|n| Selection::from(n.clone()))
        .find(rule)
}

/// All elements (document order) matching the rule.
#[must_use]
pub fn find_all<'a>(root: &Selection<'a>, rule: Rule) -> Vec<Selection<'a>> {
    root.select("*")
        .nodes()
        .iter()
        .map(|n| Selection::from(n.clone()))
        .filter(rule)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom_query::Document;

    #[test]
    fn haystack_covers_all_attributes() {
        let doc = Document::from(
            r#"<div class="Article-Body" id="Main" role="main" itemprop="articleBody">x</div>"#,
        );
        let hay = attr_haystack(&doc.select("div"));
        assert!(hay.contains("article-body"));
        assert!(hay.contains("main"));
        assert!(hay.contains("articlebody"));
    }

    #[test]
    fn find_first_in_document_order() {
        let doc = Document::from(
            r#"<div><section><p class="pick">first</p></section><p class="pick">second</p></div>"#,
        );
        fn picks(sel: &Selection) -> bool {
            matches_any(sel, &["pick"])
        }
        let hit = find_first(&doc.select("div"), picks).unwrap();
        assert_eq!(hit.text().as_ref(), "first");
    }

    #[test]
    fn find_all_collects_every_match() {
        let doc = Document::from(
            r#"<div><p class="pick">1</p><span>x</span><p class="pick">2</p></div>"#,
        );
        fn picks(sel: &Selection) -> bool {
            matches_any(sel, &["pick"])
        }
        assert_eq!(find_all(&doc.select("div"), picks).len(), 2);
    }
}
