//! Plain-text rendering of the markup tree.

use crate::markup::{Attr, Child, Node, Tag};
use crate::tree;

/// Render a body tree as plain text, one block per line.
#[must_use]
pub fn render(body: &Node) -> String {
    let mut out = String::new();
    render_children(body, &mut out);
    finish(&out)
}

fn finish(out: &str) -> String {
    let lines: Vec<&str> = out.lines().map(str::trim_end).collect();
    let mut text = lines.join("\n");
    while text.contains("\n\n\n") {
        text = text.replace("\n\n\n", "\n\n");
    }
    text.trim().to_string()
}

fn ensure_newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn render_children(node: &Node, out: &mut String) {
    for child in &node.children {
        match child {
            Child::Text(text) => {
                let collapsed = tree::collapse_whitespace(text);
                if !collapsed.is_empty() {
                    if !out.is_empty() && !out.ends_with('\n') && !out.ends_with(' ') {
                        out.push(' ');
                    }
                    out.push_str(&collapsed);
                }
            }
            Child::Element(el) => render_element(el, out),
        }
    }
}

fn render_element(el: &Node, out: &mut String) {
    match el.tag {
        Tag::Table => {
            ensure_newline(out);
            render_table(el, out);
        }
        Tag::Graphic => {
            ensure_newline(out);
            out.push_str(&graphic_text(el));
            out.push('\n');
        }
        Tag::Lb => out.push('\n'),
        Tag::List => {
            ensure_newline(out);
            for item in element_children(el) {
                render_children(item, out);
                ensure_newline(out);
            }
        }
        Tag::Head | Tag::P | Tag::Quote | Tag::Code | Tag::Div => {
            ensure_newline(out);
            render_children(el, out);
            if el.tag != Tag::Div {
                ensure_newline(out);
            }
        }
        _ => render_children(el, out),
    }
}

fn element_children(node: &Node) -> Vec<&Node> {
    node.children
        .iter()
        .filter_map(|c| match c {
            Child::Element(el) => Some(el),
            Child::Text(_) => None,
        })
        .collect()
}

/// A graphic without text renders as its alt/title/source triple.
fn graphic_text(el: &Node) -> String {
    let direct_text: String = el
        .children
        .iter()
        .filter_map(|c| match c {
            Child::Text(t) => Some(t.trim()),
            Child::Element(_) => None,
        })
        .collect();
    if !direct_text.is_empty() {
        return direct_text;
    }
    let title = el.attr(Attr::Title).unwrap_or_default();
    let alt = el.attr(Attr::Alt).unwrap_or_default();
    let src = el.attr(Attr::Src).unwrap_or_default();
    format!("![{title} {alt}]({src})")
}

fn render_table(table: &Node, out: &mut String) {
    let rows: Vec<&Node> = element_children(table)
        .into_iter()
        .filter(|n| n.tag == Tag::Row)
        .collect();
    let columns = rows
        .iter()
        .map(|r| element_children(r).len())
        .max()
        .unwrap_or(0);
    if columns == 0 {
        return;
    }

    for row in rows {
        let cells = element_children(row);
        let mut line = String::from("| ");
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                line.push_str(" | ");
            }
            let mut cell_text = String::new();
            render_children(cell, &mut cell_text);
            line.push_str(cell_text.replace('\n', " ").trim());
        }
        for _ in cells.len()..columns {
            line.push('|');
        }
        out.push_str(line.trim_end());
        out.push('\n');

        let is_head_row = !cells.is_empty()
            && cells.iter().all(|c| c.attr(Attr::Role) == Some("head"));
        if is_head_row {
            out.push_str(&"|---".repeat(columns));
            out.push_str("|\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_with(children: Vec<Node>) -> Node {
        let mut body = Node::new(Tag::Body);
        for child in children {
            body.push_element(child);
        }
        body
    }

    #[test]
    fn blocks_become_lines() {
        let body = body_with(vec![
            Node::with_text(Tag::Head, "Title").with_attr(Attr::Rend, "h1"),
            Node::with_text(Tag::P, "First paragraph."),
            Node::with_text(Tag::P, "Second paragraph."),
        ]);
        assert_eq!(render(&body), "Title\nFirst paragraph.\nSecond paragraph.");
    }

    #[test]
    fn inline_elements_space_separated() {
        let mut p = Node::with_text(Tag::P, "before");
        p.push_element(Node::with_text(Tag::Hi, "middle").with_attr(Attr::Rend, "#i"));
        p.push_text(" after");
        let body = body_with(vec![p]);
        assert_eq!(render(&body), "before middle after");
    }

    #[test]
    fn list_items_on_own_lines() {
        let mut list = Node::new(Tag::List).with_attr(Attr::Rend, "ul");
        list.push_element(Node::with_text(Tag::Item, "one"));
        list.push_element(Node::with_text(Tag::Item, "two"));
        let body = body_with(vec![list]);
        assert_eq!(render(&body), "one\ntwo");
    }

    #[test]
    fn graphic_placeholder() {
        let graphic = Node::new(Tag::Graphic)
            .with_attr(Attr::Src, "https://example.org/i.jpg")
            .with_attr(Attr::Alt, "a cat")
            .with_attr(Attr::Title, "Cat");
        let body = body_with(vec![graphic]);
        assert_eq!(render(&body), "![Cat a cat](https://example.org/i.jpg)");
    }

    #[test]
    fn table_rendering_with_head_separator() {
        let mut table = Node::new(Tag::Table);
        let mut head_row = Node::new(Tag::Row);
        for label in ["Name", "Score"] {
            head_row.push_element(
                Node::with_text(Tag::Cell, label).with_attr(Attr::Role, "head"),
            );
        }
        table.push_element(head_row);
        let mut row = Node::new(Tag::Row);
        row.push_element(Node::with_text(Tag::Cell, "Jane"));
        row.push_element(Node::with_text(Tag::Cell, "12"));
        table.push_element(row);

        let body = body_with(vec![table]);
        assert_eq!(render(&body), "| Name | Score\n|---|---|\n| Jane | 12");
    }

    #[test]
    fn short_row_padded() {
        let mut table = Node::new(Tag::Table);
        let mut full = Node::new(Tag::Row);
        full.push_element(Node::with_text(Tag::Cell, "a"));
        full.push_element(Node::with_text(Tag::Cell, "b"));
        table.push_element(full);
        let mut short = Node::new(Tag::Row);
        short.push_element(Node::with_text(Tag::Cell, "c"));
        table.push_element(short);

        let body = body_with(vec![table]);
        assert_eq!(render(&body), "| a | b\n| c|");
    }
}
