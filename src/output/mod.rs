//! Markup converter and serializers.
//!
//! The owned markup tree is tidied by two pre-passes, then rendered into
//! the requested wire format. All serializers consume the same prepared
//! tree, which keeps the formats consistent with one another.

pub mod csv;
pub mod html;
pub mod json;
pub mod markdown;
pub mod tei;
pub mod txt;
pub mod xml;

use crate::document::TextDocument;
use crate::markup::{Attr, Child, Node, Tag};
use crate::options::{ExtractionOptions, OutputFormat};

/// Elements allowed to keep presentation attributes.
fn keeps_attributes(tag: Tag) -> bool {
    matches!(
        tag,
        Tag::Cell
            | Tag::Row
            | Tag::Del
            | Tag::Graphic
            | Tag::Head
            | Tag::Hi
            | Tag::Item
            | Tag::List
            | Tag::Ref
    )
}

fn attribute_allowed(tag: Tag, attr: Attr) -> bool {
    match attr {
        Attr::Rend | Attr::Rendition | Attr::Role | Attr::Type => true,
        Attr::Target => tag == Tag::Ref,
        // Graphics carry their source description everywhere.
        Attr::Src | Attr::Alt | Attr::Title => tag == Tag::Graphic,
        Attr::Lang => tag == Tag::Code,
    }
}

/// Tidy the tree before serialization: merge double-nested blocks, drop
/// empty elements, clamp attributes to the allowed set.
pub fn prepare(node: &mut Node) {
    collapse_nested(node);
    drop_empty(node, false);
    clean_attributes(node);
}

/// `<p><p>text</p></p>` and friends collapse into the outer element,
/// except under containers where nesting is structural.
fn collapse_nested(node: &mut Node) {
    for child in &mut node.children {
        if let Child::Element(el) = child {
            collapse_nested(el);
        }
    }

    if matches!(node.tag, Tag::Cell | Tag::Item | Tag::Quote) {
        return;
    }

    let mut rebuilt: Vec<Child> = Vec::with_capacity(node.children.len());
    for child in node.children.drain(..) {
        match child {
            Child::Element(el)
                if el.tag == node.tag
                    && matches!(el.tag, Tag::Head | Tag::Code | Tag::P) =>
            {
                rebuilt.extend(el.children);
            }
            other => rebuilt.push(other),
        }
    }
    node.children = rebuilt;
}

/// Remove empty elements; graphics and anything inside code survive.
fn drop_empty(node: &mut Node, inside_code: bool) {
    let inside_code = inside_code || node.tag == Tag::Code;
    for child in &mut node.children {
        if let Child::Element(el) = child {
            drop_empty(el, inside_code);
        }
    }
    if inside_code {
        return;
    }
    node.children.retain(|child| match child {
        Child::Element(el) => {
            el.tag == Tag::Graphic || el.tag == Tag::Lb || !el.is_empty()
        }
        Child::Text(_) => true,
    });
}

fn clean_attributes(node: &mut Node) {
    if keeps_attributes(node.tag) {
        node.attrs.retain(|(attr, _)| attribute_allowed(node.tag, *attr));
    } else if node.tag != Tag::Code {
        node.attrs.clear();
    }
    for child in &mut node.children {
        if let Child::Element(el) = child {
            clean_attributes(el);
        }
    }
}

/// Serialize a document into the requested format.
#[must_use]
pub fn serialize(document: &TextDocument, options: &ExtractionOptions) -> String {
    match options.output_format {
        OutputFormat::Txt | OutputFormat::Structured => txt::render(&document.body),
        OutputFormat::Markdown => markdown::render(&document.body),
        OutputFormat::Json => json::render(document),
        OutputFormat::Xml => xml::render(document),
        OutputFormat::XmlTei => tei::render(document),
        OutputFormat::Csv => csv::render(document),
        OutputFormat::Html => html::render(&document.body),
    }
}

/// Serialize just a body tree in the requested format (used for the
/// comments tree).
#[must_use]
pub fn serialize_body(body: &Node, format: OutputFormat) -> String {
    match format {
        OutputFormat::Markdown => markdown::render(body),
        OutputFormat::Html => html::render(body),
        _ => txt::render(body),
    }
}
