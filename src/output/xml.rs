//! XML rendering: `<doc>` with metadata attributes and the markup tree.

use crate::document::TextDocument;
use crate::markup::{Child, Node};
use crate::tree::escape_text;

/// Serialize a markup node into internal XML.
pub fn write_node(node: &Node, out: &mut String) {
    out.push('<');
    out.push_str(node.tag.as_str());
    for (attr, value) in &node.attrs {
        out.push(' ');
        out.push_str(attr.as_str());
        out.push_str("=\"");
        out.push_str(&escape_text(value));
        out.push('"');
    }
    if node.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &node.children {
        match child {
            Child::Text(text) => out.push_str(&escape_text(text)),
            Child::Element(el) => write_node(el, out),
        }
    }
    out.push_str("</");
    out.push_str(node.tag.as_str());
    out.push('>');
}

fn push_attr(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_text(value));
        out.push('"');
    }
}

/// Render the whole document as an XML `<doc>`.
#[must_use]
pub fn render(document: &TextDocument) -> String {
    let meta = &document.metadata;
    let mut out = String::from("<doc");
    push_attr(&mut out, "sitename", meta.sitename.as_deref());
    push_attr(&mut out, "title", meta.title.as_deref());
    push_attr(&mut out, "author", meta.author.as_deref());
    push_attr(&mut out, "date", meta.date.as_deref());
    push_attr(&mut out, "url", meta.url.as_deref());
    push_attr(&mut out, "hostname", meta.hostname.as_deref());
    push_attr(&mut out, "description", meta.description.as_deref());
    if !meta.categories.is_empty() {
        push_attr(&mut out, "categories", Some(&meta.categories.join(",")));
    }
    if !meta.tags.is_empty() {
        push_attr(&mut out, "tags", Some(&meta.tags.join(",")));
    }
    push_attr(&mut out, "license", meta.license.as_deref());
    push_attr(&mut out, "fingerprint", meta.fingerprint.as_deref());
    out.push('>');

    out.push_str("<main>");
    for child in &document.body.children {
        match child {
            Child::Text(text) => out.push_str(&escape_text(text)),
            Child::Element(el) => write_node(el, &mut out),
        }
    }
    out.push_str("</main>");

    if let Some(comments) = &document.commentsbody {
        out.push_str("<comments>");
        for child in &comments.children {
            match child {
                Child::Text(text) => out.push_str(&escape_text(text)),
                Child::Element(el) => write_node(el, &mut out),
            }
        }
        out.push_str("</comments>");
    }

    out.push_str("</doc>");
    out
}
