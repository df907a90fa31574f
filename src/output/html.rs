//! HTML rendering: internal markup back to display-ready HTML.

use crate::markup::{Attr, Child, Node, Tag};
use crate::tree::escape_text;

fn html_tag(node: &Node) -> (String, Vec<(String, String)>) {
    match node.tag {
        Tag::Body => ("div".to_string(), vec![]),
        Tag::P => ("p".to_string(), vec![]),
        Tag::Head => {
            let level = node
                .attr(Attr::Rend)
                .and_then(|r| r.strip_prefix('h'))
                .and_then(|n| n.parse::<u8>().ok())
                .unwrap_or(3)
                .clamp(1, 6);
            (format!("h{level}"), vec![])
        }
        Tag::Hi => match node.attr(Attr::Rend) {
            Some("#b") => ("strong".to_string(), vec![]),
            Some("#u") => ("u".to_string(), vec![]),
            Some("#t") => ("code".to_string(), vec![]),
            Some("#sub") => ("sub".to_string(), vec![]),
            Some("#sup") => ("sup".to_string(), vec![]),
            _ => ("em".to_string(), vec![]),
        },
        Tag::List => match node.attr(Attr::Rend) {
            Some("ol") => ("ol".to_string(), vec![]),
            _ => ("ul".to_string(), vec![]),
        },
        Tag::Item => ("li".to_string(), vec![]),
        Tag::Quote => ("blockquote".to_string(), vec![]),
        Tag::Code => ("pre".to_string(), vec![]),
        Tag::Del => ("del".to_string(), vec![]),
        Tag::Table => ("table".to_string(), vec![]),
        Tag::Row => ("tr".to_string(), vec![]),
        Tag::Cell => {
            if node.attr(Attr::Role) == Some("head") {
                ("th".to_string(), vec![])
            } else {
                ("td".to_string(), vec![])
            }
        }
        Tag::Graphic => {
            let mut attrs = vec![];
            if let Some(src) = node.attr(Attr::Src) {
                attrs.push(("src".to_string(), src.to_string()));
            }
            if let Some(alt) = node.attr(Attr::Alt) {
                attrs.push(("alt".to_string(), alt.to_string()));
            }
            ("img".to_string(), attrs)
        }
        Tag::Ref => {
            let mut attrs = vec![];
            if let Some(target) = node.attr(Attr::Target) {
                attrs.push(("href".to_string(), target.to_string()));
            }
            ("a".to_string(), attrs)
        }
        Tag::Lb => ("br".to_string(), vec![]),
        Tag::Div => ("div".to_string(), vec![]),
    }
}

fn write_html(node: &Node, out: &mut String) {
    let (tag, attrs) = html_tag(node);
    out.push('<');
    out.push_str(&tag);
    for (name, value) in &attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_text(value));
        out.push('"');
    }
    if matches!(tag.as_str(), "br" | "img") {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &node.children {
        match child {
            Child::Text(text) => out.push_str(&escape_text(text)),
            Child::Element(el) => write_html(el, out),
        }
    }
    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}

/// Render a body tree as an HTML fragment.
#[must_use]
pub fn render(body: &Node) -> String {
    let mut out = String::new();
    write_html(body, &mut out);
    out
}
