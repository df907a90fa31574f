//! Selector-driven primary extractor.
//!
//! Picks a body subtree through the selector catalog, prunes unwanted
//! sections, converts the survivors into the internal vocabulary and
//! walks them into an owned markup tree. Comments are pulled out first so
//! they cannot leak into the main body.

use dom_query::{Document, NodeRef, Selection};
use tracing::debug;

use crate::cleaner;
use crate::markup::{Attr, Node, Tag};
use crate::options::ExtractionOptions;
use crate::selectors::comments::{comments_discard_rule, COMMENT_RULES};
use crate::selectors::content::{structural_fallback, BODY_RULES};
use crate::selectors::discard::should_discard;
use crate::selectors::find_all;
use crate::tree;

/// Output of one extractor run.
#[derive(Debug, Clone)]
pub struct Extracted {
    pub body: Node,
    pub text: String,
    pub len: usize,
}

impl Extracted {
    #[must_use]
    pub fn empty() -> Self {
        Self { body: Node::new(Tag::Body), text: String::new(), len: 0 }
    }

    #[must_use]
    pub fn from_body(body: Node) -> Self {
        let text = body.plain_text();
        let len = text.chars().count();
        Self { body, text, len }
    }
}

/// Tags the walk may emit, decided per call from the options.
#[derive(Debug)]
struct PotentialTags {
    tables: bool,
    images: bool,
    links: bool,
    divs: bool,
}

/// Remove boilerplate sections from a candidate subtree.
fn prune_unwanted_sections(subtree: &Selection, options: &ExtractionOptions) {
    let precision = options.focus.is_precision();
    let recall = options.focus.is_recall();

    for sel in tree::descendants(subtree) {
        if should_discard(&sel, precision, recall) {
            sel.remove();
        }
    }

    for selector in &options.prune_selectors {
        subtree.select(selector).remove();
    }

    // Two passes of link-density deletion: removing one menu changes the
    // densities of what wrapped it.
    let threshold = if precision { 0.25 } else { 0.5 };
    for _ in 0..2 {
        for sel in subtree
            .select("div, ul, p")
            .nodes()
            .iter()
            .map(|n| Selection::from(n.clone()))
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
        {
            if tree::text_len(&sel) > 0 && tree::link_density(&sel) > threshold {
                sel.remove();
            }
        }
    }

    if precision || options.include_tables {
        for table in subtree
            .select("table")
            .nodes()
            .iter()
            .map(|n| Selection::from(n.clone()))
            .collect::<Vec<_>>()
        {
            if tree::link_density(&table) > 0.5 {
                table.remove();
            }
        }
    }
}

/// Candidate subtrees in priority order: first matching selector family,
/// then the structural fallbacks.
fn body_candidates<'a>(root: &Selection<'a>) -> Vec<Selection<'a>> {
    for rule in BODY_RULES {
        let hits = find_all(root, *rule);
        if !hits.is_empty() {
            return hits;
        }
    }
    structural_fallback(root).into_iter().collect()
}

fn attr_or_none(sel: &Selection, node: &mut Node, html_attr: &str, attr: Attr) {
    let value = tree::attr(sel, html_attr);
    if !value.is_empty() {
        node.set_attr(attr, &value);
    }
}

/// Walk the children of a converted DOM element into a markup node.
fn build_children(parent: &NodeRef, out: &mut Node, potential: &PotentialTags, options: &ExtractionOptions) {
    let mut cursor = parent.first_child();
    while let Some(node) = cursor {
        cursor = node.next_sibling();

        if !node.is_element() {
            if node.is_text() {
                let text = node.text().to_string();
                if !text.trim().is_empty() {
                    out.push_text(&tree::collapse_whitespace(&text));
                    out.push_text(" ");
                }
            }
            continue;
        }

        let sel = Selection::from(node.clone());
        if let Some(child) = build_element(&sel, potential, options) {
            out.push_element(child);
        } else if unwraps_into_parent(&tree::tag_name(&sel)) {
            build_children(&node, out, potential, options);
        }
    }
}

/// Tags without a markup counterpart dissolve into their parent.
fn unwraps_into_parent(tag: &str) -> bool {
    !matches!(tag, "script" | "style" | "textarea" | "option")
}

/// Convert one converted-DOM element into an owned markup node.
#[allow(clippy::too_many_lines)]
fn build_element(sel: &Selection, potential: &PotentialTags, options: &ExtractionOptions) -> Option<Node> {
    let tag = tree::tag_name(sel);
    let dom_node = sel.nodes().first()?.clone();

    match tag.as_str() {
        "p" => {
            let mut p = Node::new(Tag::P);
            // A paragraph drowning in links is navigation in disguise:
            // keep the text, drop the refs. Anchors are already `ref`
            // elements at this point.
            let total = tree::text_len(sel);
            let mut ref_chars = 0usize;
            for link in sel.select("ref").iter() {
                ref_chars += link.text().trim().chars().count();
            }
            build_children(&dom_node, &mut p, potential, options);
            if total > 0 && ref_chars * 10 > total * 8 {
                p = flatten_refs(p);
            }
            finish_segment(p, options)
        }
        "head" => {
            let mut head = Node::new(Tag::Head);
            attr_or_none(sel, &mut head, "rend", Attr::Rend);
            build_children(&dom_node, &mut head, potential, options);
            (!head.is_empty()).then_some(head)
        }
        "hi" => {
            let mut hi = Node::new(Tag::Hi);
            attr_or_none(sel, &mut hi, "rend", Attr::Rend);
            build_children(&dom_node, &mut hi, potential, options);
            (!hi.is_empty()).then_some(hi)
        }
        "list" => {
            let mut list = Node::new(Tag::List);
            attr_or_none(sel, &mut list, "rend", Attr::Rend);
            build_children(&dom_node, &mut list, potential, options);
            (list.element_count() > 0).then_some(list)
        }
        "item" => {
            let mut item = Node::new(Tag::Item);
            build_children(&dom_node, &mut item, potential, options);
            finish_segment(item, options)
        }
        "quote" | "code" => {
            let markup_tag = if tag == "code" { Tag::Code } else { Tag::Quote };
            let mut block = Node::new(markup_tag);
            attr_or_none(sel, &mut block, "lang", Attr::Lang);
            build_children(&dom_node, &mut block, potential, options);
            finish_segment(block, options)
        }
        "del" => {
            let mut del = Node::new(Tag::Del).with_attr(Attr::Rend, "overstrike");
            build_children(&dom_node, &mut del, potential, options);
            (!del.is_empty()).then_some(del)
        }
        "ref" => {
            if !potential.links {
                return None;
            }
            let mut link = Node::new(Tag::Ref);
            attr_or_none(sel, &mut link, "target", Attr::Target);
            build_children(&dom_node, &mut link, potential, options);
            (!link.is_empty()).then_some(link)
        }
        "graphic" => {
            if !potential.images {
                return None;
            }
            let mut graphic = Node::new(Tag::Graphic);
            attr_or_none(sel, &mut graphic, "src", Attr::Src);
            attr_or_none(sel, &mut graphic, "alt", Attr::Alt);
            attr_or_none(sel, &mut graphic, "title", Attr::Title);
            Some(graphic)
        }
        "lb" => Some(Node::new(Tag::Lb)),
        "table" => {
            if !potential.tables {
                return None;
            }
            let mut table = Node::new(Tag::Table);
            build_children(&dom_node, &mut table, potential, options);
            (table.element_count() > 0).then_some(table)
        }
        "tr" => {
            let mut row = Node::new(Tag::Row);
            build_children(&dom_node, &mut row, potential, options);
            (row.element_count() > 0).then_some(row)
        }
        "td" | "th" => {
            let mut cell = Node::new(Tag::Cell);
            if tag == "th" {
                cell.set_attr(Attr::Role, "head");
            }
            build_children(&dom_node, &mut cell, potential, options);
            Some(cell)
        }
        "figcaption" => {
            let mut caption = Node::new(Tag::P);
            build_children(&dom_node, &mut caption, potential, options);
            (!caption.is_empty()).then_some(caption)
        }
        "div" | "section" | "article" | "main" => {
            if !potential.divs {
                return None;
            }
            let mut div = Node::new(Tag::Div);
            build_children(&dom_node, &mut div, potential, options);
            (!div.is_empty()).then_some(div)
        }
        _ => None,
    }
}

/// Replace ref children with their text content.
fn flatten_refs(node: Node) -> Node {
    let mut out = Node::new(node.tag);
    out.attrs = node.attrs;
    for child in node.children {
        match child {
            crate::markup::Child::Element(el) if el.tag == Tag::Ref => {
                out.push_text(&el.plain_text());
            }
            other => out.children.push(other),
        }
    }
    out
}

fn finish_segment(node: Node, _options: &ExtractionOptions) -> Option<Node> {
    (!node.is_empty()).then_some(node)
}

/// Whether the subtree's paragraphs carry enough text on their own; when
/// not, plain divs join the potential tag set.
fn needs_div_recovery(subtree: &Selection, options: &ExtractionOptions) -> bool {
    let factor = if options.focus.is_precision() { 1 } else { 3 };
    let mut p_len = 0usize;
    for p in subtree.select("p").iter() {
        p_len += p.text().trim().chars().count();
    }
    p_len < options.min_extracted_size * factor || subtree.select("p").length() == 0
}

/// Run the primary extraction over a cleaned document.
#[must_use]
pub fn extract_primary(doc: &Document, options: &ExtractionOptions, base_url: Option<&str>) -> Extracted {
    let root = doc.select("body");
    let candidates = body_candidates(&root);
    if candidates.is_empty() {
        debug!("no body candidate matched");
        return Extracted::empty();
    }

    for candidate in candidates {
        prune_unwanted_sections(&candidate, options);

        let potential = PotentialTags {
            tables: options.include_tables,
            images: options.include_images,
            links: options.include_links,
            divs: needs_div_recovery(&candidate, options),
        };

        cleaner::convert_tags(&candidate, options, base_url);

        let mut body = Node::new(Tag::Body);
        if let Some(node) = candidate.nodes().first() {
            build_children(node, &mut body, &potential, options);
        }

        // Trailing headings announce sections that were pruned away.
        while matches!(
            body.children.last(),
            Some(crate::markup::Child::Element(n)) if n.tag == Tag::Head
        ) {
            body.children.pop();
        }

        if body.element_count() > 1 {
            return Extracted::from_body(body);
        }
        if body.element_count() == 1 && !body.is_empty() {
            return Extracted::from_body(body);
        }
    }

    Extracted::empty()
}

/// Convert an arbitrary DOM subtree (fallback output) into a markup body.
#[must_use]
pub fn build_from_dom(subtree: &Selection, options: &ExtractionOptions, base_url: Option<&str>) -> Extracted {
    let potential = PotentialTags {
        tables: options.include_tables,
        images: options.include_images,
        links: options.include_links,
        divs: true,
    };
    cleaner::convert_tags(subtree, options, base_url);

    let mut body = Node::new(Tag::Body);
    if let Some(node) = subtree.nodes().first() {
        build_children(node, &mut body, &potential, options);
    }
    Extracted::from_body(body)
}

/// Extract the comments section and detach it from the document.
#[must_use]
pub fn extract_comments(doc: &Document, options: &ExtractionOptions) -> Option<Extracted> {
    let root = doc.select("body");
    let mut comments_body = Node::new(Tag::Body);

    for rule in COMMENT_RULES {
        let sections = find_all(&root, *rule);
        for section in sections {
            for junk in tree::descendants(&section) {
                if comments_discard_rule(&junk) {
                    junk.remove();
                }
            }

            if options.include_comments {
                let potential = PotentialTags {
                    tables: false,
                    images: false,
                    links: options.include_links,
                    divs: false,
                };
                cleaner::convert_tags(&section, options, None);
                if let Some(node) = section.nodes().first() {
                    build_children(node, &mut comments_body, &potential, options);
                }
            }

            // Detached regardless of the toggle so the main pass cannot
            // pick comment text up.
            section.remove();
        }
        if comments_body.element_count() > 0 {
            break;
        }
    }

    if !options.include_comments || comments_body.element_count() == 0 {
        return None;
    }
    let extracted = Extracted::from_body(comments_body);
    (extracted.len >= options.min_extracted_comm_size).then_some(extracted)
}
