//! TEI-XML rendering.
//!
//! Produces a `<TEI>` document with a full header (file description,
//! publication and source statements, profile, application info) and the
//! body under `<text><body><div type="entry">`. The body markup is
//! restricted to the TEI-safe subset: headings become `<ab
//! type="header">`, attributes outside the TEI set are dropped.

use crate::document::TextDocument;
use crate::markup::{Attr, Child, Node, Tag};
use crate::tree::escape_text;

const TEI_NS: &str = "http://www.tei-c.org/ns/1.0";

fn open(out: &mut String, tag: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
}

fn close(out: &mut String, tag: &str) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn simple(out: &mut String, tag: &str, text: &str) {
    open(out, tag);
    out.push_str(&escape_text(text));
    close(out, tag);
}

/// Attributes TEI output keeps.
fn tei_attr_allowed(attr: Attr) -> bool {
    matches!(
        attr,
        Attr::Rend | Attr::Rendition | Attr::Role | Attr::Target | Attr::Type
    )
}

/// Write one markup node under the TEI constraints.
fn write_tei_node(node: &Node, out: &mut String) {
    // Headings are paragraph-level `ab` blocks in this profile.
    let (tag, extra_attr) = if node.tag == Tag::Head {
        ("ab", Some(("type", "header")))
    } else {
        (node.tag.as_str(), None)
    };

    out.push('<');
    out.push_str(tag);
    if let Some((name, value)) = extra_attr {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
    }
    for (attr, value) in &node.attrs {
        if tei_attr_allowed(*attr) {
            out.push(' ');
            out.push_str(attr.as_str());
            out.push_str("=\"");
            out.push_str(&escape_text(value));
            out.push('"');
        }
    }
    if node.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &node.children {
        match child {
            Child::Text(text) => out.push_str(&escape_text(text)),
            Child::Element(el) => write_tei_node(el, out),
        }
    }
    close(out, tag);
}

fn write_header(document: &TextDocument, out: &mut String) {
    let meta = &document.metadata;

    open(out, "teiHeader");
    open(out, "fileDesc");

    open(out, "titleStmt");
    if let Some(title) = &meta.title {
        out.push_str("<title type=\"main\">");
        out.push_str(&escape_text(title));
        close(out, "title");
    }
    if let Some(author) = &meta.author {
        simple(out, "author", author);
    }
    close(out, "titleStmt");

    open(out, "publicationStmt");
    if let Some(sitename) = &meta.sitename {
        simple(out, "publisher", sitename);
    }
    open(out, "availability");
    if let Some(license) = &meta.license {
        simple(out, "p", license);
    }
    close(out, "availability");
    close(out, "publicationStmt");

    open(out, "notesStmt");
    if let Some(id) = &meta.id {
        out.push_str("<note type=\"id\">");
        out.push_str(&escape_text(id));
        close(out, "note");
    }
    if let Some(fingerprint) = &meta.fingerprint {
        out.push_str("<note type=\"fingerprint\">");
        out.push_str(&escape_text(fingerprint));
        close(out, "note");
    }
    close(out, "notesStmt");

    open(out, "sourceDesc");
    open(out, "bibl");
    let bibl: Vec<&str> = [
        meta.title.as_deref(),
        meta.author.as_deref(),
        meta.sitename.as_deref(),
        meta.date.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();
    out.push_str(&escape_text(&bibl.join(", ")));
    close(out, "bibl");
    open(out, "biblFull");
    open(out, "titleStmt");
    if let Some(title) = &meta.title {
        simple(out, "title", title);
    }
    close(out, "titleStmt");
    open(out, "publicationStmt");
    if let Some(url) = &meta.url {
        out.push_str("<ptr target=\"");
        out.push_str(&escape_text(url));
        out.push_str("\"/>");
    }
    if let Some(date) = &meta.date {
        simple(out, "date", date);
    }
    close(out, "publicationStmt");
    close(out, "biblFull");
    close(out, "sourceDesc");

    close(out, "fileDesc");

    open(out, "profileDesc");
    if let Some(description) = &meta.description {
        open(out, "abstract");
        simple(out, "p", description);
        close(out, "abstract");
    }
    if !meta.categories.is_empty() || !meta.tags.is_empty() {
        open(out, "textClass");
        if !meta.categories.is_empty() {
            out.push_str("<keywords scheme=\"categories\">");
            for category in &meta.categories {
                simple(out, "term", category);
            }
            close(out, "keywords");
        }
        if !meta.tags.is_empty() {
            out.push_str("<keywords scheme=\"tags\">");
            for tag in &meta.tags {
                simple(out, "term", tag);
            }
            close(out, "keywords");
        }
        close(out, "textClass");
    }
    open(out, "creation");
    out.push_str("<date type=\"download\">");
    out.push_str(&escape_text(meta.filedate.as_deref().unwrap_or_default()));
    close(out, "date");
    close(out, "creation");
    close(out, "profileDesc");

    open(out, "encodingDesc");
    open(out, "appInfo");
    out.push_str(&format!(
        "<application ident=\"websift\" version=\"{}\">",
        env!("CARGO_PKG_VERSION")
    ));
    simple(out, "label", "websift");
    close(out, "application");
    close(out, "appInfo");
    close(out, "encodingDesc");

    close(out, "teiHeader");
}

/// Render the document as TEI-XML.
#[must_use]
pub fn render(document: &TextDocument) -> String {
    let mut out = format!("<TEI xmlns=\"{TEI_NS}\">");
    write_header(document, &mut out);

    open(&mut out, "text");
    open(&mut out, "body");
    out.push_str("<div type=\"entry\">");
    for child in &document.body.children {
        match child {
            Child::Text(text) => out.push_str(&escape_text(text)),
            Child::Element(el) => write_tei_node(el, &mut out),
        }
    }
    close(&mut out, "div");
    if let Some(comments) = &document.commentsbody {
        out.push_str("<div type=\"comments\">");
        for child in &comments.children {
            match child {
                Child::Text(text) => out.push_str(&escape_text(text)),
                Child::Element(el) => write_tei_node(el, &mut out),
            }
        }
        close(&mut out, "div");
    }
    close(&mut out, "body");
    close(&mut out, "text");
    close(&mut out, "TEI");
    out
}

/// Tags allowed inside the TEI body.
pub const TEI_BODY_TAGS: &[&str] = &[
    "ab", "body", "cell", "code", "del", "div", "graphic", "head", "hi", "item", "lb", "list",
    "p", "quote", "ref", "row", "table",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TextDocument {
        let mut document = TextDocument::default();
        document.metadata.title = Some("The Title".to_string());
        document.metadata.author = Some("Jane Doe".to_string());
        document.metadata.sitename = Some("Example".to_string());
        document.metadata.url = Some("https://example.org/a".to_string());
        document.metadata.fingerprint = Some("abcd1234abcd1234".to_string());
        document.metadata.description = Some("About things.".to_string());
        document.metadata.categories = vec!["News".to_string()];
        document
            .body
            .push_element(Node::with_text(Tag::Head, "Section").with_attr(Attr::Rend, "h2"));
        document.body.push_element(Node::with_text(Tag::P, "Text."));
        document
    }

    #[test]
    fn header_structure() {
        let tei = render(&sample());
        assert!(tei.starts_with(r#"<TEI xmlns="http://www.tei-c.org/ns/1.0">"#));
        assert!(tei.contains("<teiHeader><fileDesc><titleStmt>"));
        assert!(tei.contains(r#"<title type="main">The Title</title>"#));
        assert!(tei.contains("<publisher>Example</publisher>"));
        assert!(tei.contains(r#"<note type="fingerprint">abcd1234abcd1234</note>"#));
        assert!(tei.contains(r#"<keywords scheme="categories"><term>News</term></keywords>"#));
        assert!(tei.contains(r#"<application ident="websift""#));
    }

    #[test]
    fn headings_become_ab_blocks() {
        let tei = render(&sample());
        assert!(tei.contains(r#"<ab type="header" rend="h2">Section</ab>"#));
        assert!(!tei.contains("<head"));
    }

    #[test]
    fn body_wrapped_in_entry_div() {
        let tei = render(&sample());
        assert!(tei.contains(r#"<text><body><div type="entry">"#));
        assert!(tei.ends_with("</div></body></text></TEI>"));
    }

    #[test]
    fn only_tei_tags_in_body() {
        let tei = render(&sample());
        let body_start = tei.find("<text>").unwrap();
        let body = &tei[body_start..];
        for tag_match in regex::Regex::new(r"</?([a-zA-Z]+)").unwrap().captures_iter(body) {
            let name = &tag_match[1];
            assert!(
                TEI_BODY_TAGS.contains(&name) || name == "text",
                "unexpected tag {name} in TEI body"
            );
        }
    }
}
