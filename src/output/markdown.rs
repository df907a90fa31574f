//! Markdown rendering of the markup tree.
//!
//! Same line structure as the plain-text renderer, plus inline emphasis,
//! heading markers, fenced code and link syntax.

use crate::markup::{Attr, Child, Node, Tag};
use crate::tree;

/// Render a body tree as Markdown.
#[must_use]
pub fn render(body: &Node) -> String {
    let mut out = String::new();
    render_blocks(body, &mut out, 0);
    let mut text = out
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    while text.contains("\n\n\n") {
        text = text.replace("\n\n\n", "\n\n");
    }
    text.trim().to_string()
}

fn heading_level(rend: Option<&str>) -> usize {
    rend.and_then(|r| r.strip_prefix('h'))
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(3)
        .clamp(1, 6)
}

fn inline_text(node: &Node) -> String {
    let mut out = String::new();
    for child in &node.children {
        match child {
            Child::Text(text) => {
                let collapsed = tree::collapse_whitespace(text);
                if !collapsed.is_empty() {
                    if !out.is_empty() && !out.ends_with(' ') {
                        out.push(' ');
                    }
                    out.push_str(&collapsed);
                }
            }
            Child::Element(el) => {
                let rendered = inline_element(el);
                if !rendered.is_empty() {
                    if !out.is_empty() && !out.ends_with(' ') {
                        out.push(' ');
                    }
                    out.push_str(&rendered);
                }
            }
        }
    }
    out.trim().to_string()
}

fn inline_element(el: &Node) -> String {
    match el.tag {
        Tag::Hi => {
            let inner = inline_text(el);
            if inner.is_empty() {
                return String::new();
            }
            match el.attr(Attr::Rend) {
                Some("#b") => format!("**{inner}**"),
                Some("#i") => format!("*{inner}*"),
                Some("#u") => format!("__{inner}__"),
                Some("#t") => format!("`{inner}`"),
                _ => inner,
            }
        }
        Tag::Del => {
            let inner = inline_text(el);
            if inner.is_empty() {
                String::new()
            } else {
                format!("~~{inner}~~")
            }
        }
        Tag::Ref => {
            let inner = inline_text(el);
            match el.attr(Attr::Target) {
                Some(target) if !inner.is_empty() => format!("[{inner}]({target})"),
                _ if inner.is_empty() => String::new(),
                _ => format!("[{inner}]"),
            }
        }
        Tag::Code => {
            let inner = el.plain_text();
            format!("`{}`", inner.replace('\n', " "))
        }
        Tag::Graphic => graphic_markdown(el),
        Tag::Lb => "\n".to_string(),
        _ => inline_text(el),
    }
}

fn graphic_markdown(el: &Node) -> String {
    let title = el.attr(Attr::Title).unwrap_or_default();
    let alt = el.attr(Attr::Alt).unwrap_or_default();
    let src = el.attr(Attr::Src).unwrap_or_default();
    format!("![{title} {alt}]({src})")
}

fn render_blocks(node: &Node, out: &mut String, depth: usize) {
    for child in &node.children {
        match child {
            Child::Text(text) => {
                let collapsed = tree::collapse_whitespace(text);
                if !collapsed.is_empty() {
                    out.push_str(&collapsed);
                    out.push('\n');
                }
            }
            Child::Element(el) => render_block(el, out, depth),
        }
    }
}

fn render_block(el: &Node, out: &mut String, depth: usize) {
    match el.tag {
        Tag::Head => {
            let level = heading_level(el.attr(Attr::Rend));
            out.push('\n');
            out.push_str(&"#".repeat(level));
            out.push(' ');
            out.push_str(&inline_text(el));
            out.push_str("\n\n");
        }
        Tag::P => {
            out.push_str(&inline_text(el));
            out.push_str("\n\n");
        }
        Tag::List => {
            let ordered = el.attr(Attr::Rend) == Some("ol");
            let mut index = 0usize;
            for child in &el.children {
                if let Child::Element(item) = child {
                    index += 1;
                    let indent = "  ".repeat(depth);
                    if ordered {
                        out.push_str(&format!("{indent}{index}. "));
                    } else {
                        out.push_str(&format!("{indent}- "));
                    }
                    out.push_str(&inline_text(item));
                    out.push('\n');
                }
            }
            out.push('\n');
        }
        Tag::Quote => {
            let inner = el.plain_text();
            for line in inner.lines() {
                out.push_str("> ");
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
        Tag::Code => {
            let inner = el.plain_text();
            if inner.contains('\n') || el.has_tag(Tag::Lb) {
                out.push_str("```");
                if let Some(lang) = el.attr(Attr::Lang) {
                    out.push_str(lang);
                }
                out.push('\n');
                out.push_str(&inner);
                out.push_str("\n```\n\n");
            } else {
                out.push('`');
                out.push_str(&inner);
                out.push_str("`\n\n");
            }
        }
        Tag::Table => render_table(el, out),
        Tag::Graphic => {
            out.push_str(&graphic_markdown(el));
            out.push_str("\n\n");
        }
        Tag::Lb => out.push('\n'),
        Tag::Del => {
            out.push_str(&inline_element(el));
            out.push_str("\n\n");
        }
        _ => render_blocks(el, out, depth),
    }
}

fn render_table(table: &Node, out: &mut String) {
    let rows: Vec<&Node> = table
        .children
        .iter()
        .filter_map(|c| match c {
            Child::Element(el) if el.tag == Tag::Row => Some(el),
            _ => None,
        })
        .collect();
    let columns = rows
        .iter()
        .map(|r| r.element_count())
        .max()
        .unwrap_or(0);
    if columns == 0 {
        return;
    }

    for (row_index, row) in rows.iter().enumerate() {
        let cells: Vec<String> = row
            .children
            .iter()
            .filter_map(|c| match c {
                Child::Element(el) if el.tag == Tag::Cell => {
                    Some(inline_text(el).replace('\n', " "))
                }
                _ => None,
            })
            .collect();
        out.push_str("| ");
        out.push_str(&cells.join(" | "));
        for _ in cells.len()..columns {
            out.push_str(" |");
        }
        out.push_str(" |\n");

        let is_head = row
            .children
            .iter()
            .filter_map(|c| match c {
                Child::Element(el) => Some(el),
                Child::Text(_) => None,
            })
            .all(|c| c.attr(Attr::Role) == Some("head"));
        if row_index == 0 && is_head {
            out.push_str(&"|---".repeat(columns));
            out.push_str("|\n");
        }
    }
    out.push('\n');
}
