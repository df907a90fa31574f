//! Internal markup tree.
//!
//! The extraction pipeline converts the kept DOM subtree into a small,
//! closed, TEI-flavoured vocabulary. The tree is owned by the resulting
//! document; the DOM it came from is not referenced again. Children
//! interleave text runs and elements, which keeps mixed content (`some
//! <hi>emphasised</hi> words`) intact without a text/tail model.

/// The closed tag vocabulary. Nothing else survives conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Body,
    P,
    Head,
    Hi,
    List,
    Item,
    Quote,
    Code,
    Del,
    Table,
    Row,
    Cell,
    Graphic,
    Ref,
    Lb,
    Div,
}

impl Tag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Body => "body",
            Tag::P => "p",
            Tag::Head => "head",
            Tag::Hi => "hi",
            Tag::List => "list",
            Tag::Item => "item",
            Tag::Quote => "quote",
            Tag::Code => "code",
            Tag::Del => "del",
            Tag::Table => "table",
            Tag::Row => "row",
            Tag::Cell => "cell",
            Tag::Graphic => "graphic",
            Tag::Ref => "ref",
            Tag::Lb => "lb",
            Tag::Div => "div",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "body" => Tag::Body,
            "p" => Tag::P,
            "head" => Tag::Head,
            "hi" => Tag::Hi,
            "list" => Tag::List,
            "item" => Tag::Item,
            "quote" => Tag::Quote,
            "code" => Tag::Code,
            "del" => Tag::Del,
            "table" => Tag::Table,
            "row" => Tag::Row,
            "cell" => Tag::Cell,
            "graphic" => Tag::Graphic,
            "ref" => Tag::Ref,
            "lb" => Tag::Lb,
            "div" => Tag::Div,
            _ => return None,
        })
    }

    /// Block-level tags terminate a line in the plain-text rendering.
    #[must_use]
    pub fn is_block(self) -> bool {
        matches!(
            self,
            Tag::Body
                | Tag::P
                | Tag::Head
                | Tag::List
                | Tag::Item
                | Tag::Quote
                | Tag::Code
                | Tag::Table
                | Tag::Row
                | Tag::Graphic
                | Tag::Lb
                | Tag::Div
        )
    }
}

/// The restricted attribute set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    Rend,
    Rendition,
    Role,
    Target,
    Type,
    Src,
    Alt,
    Title,
    Lang,
}

impl Attr {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Attr::Rend => "rend",
            Attr::Rendition => "rendition",
            Attr::Role => "role",
            Attr::Target => "target",
            Attr::Type => "type",
            Attr::Src => "src",
            Attr::Alt => "alt",
            Attr::Title => "title",
            Attr::Lang => "lang",
        }
    }
}

/// One child slot: a text run or a nested element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Text(String),
    Element(Node),
}

/// An element of the internal markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub tag: Tag,
    pub attrs: Vec<(Attr, String)>,
    pub children: Vec<Child>,
}

impl Node {
    #[must_use]
    pub fn new(tag: Tag) -> Self {
        Self { tag, attrs: Vec::new(), children: Vec::new() }
    }

    #[must_use]
    pub fn with_text(tag: Tag, text: &str) -> Self {
        let mut node = Self::new(tag);
        node.push_text(text);
        node
    }

    #[must_use]
    pub fn with_attr(mut self, attr: Attr, value: &str) -> Self {
        self.set_attr(attr, value);
        self
    }

    pub fn set_attr(&mut self, attr: Attr, value: &str) {
        if let Some(slot) = self.attrs.iter_mut().find(|(a, _)| *a == attr) {
            slot.1 = value.to_string();
        } else {
            self.attrs.push((attr, value.to_string()));
        }
    }

    #[must_use]
    pub fn attr(&self, attr: Attr) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(a, _)| *a == attr)
            .map(|(_, v)| v.as_str())
    }

    /// Append a text run, merging into a trailing text child if present.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Child::Text(existing)) = self.children.last_mut() {
            existing.push_str(text);
        } else {
            self.children.push(Child::Text(text.to_string()));
        }
    }

    pub fn push_element(&mut self, node: Node) {
        self.children.push(Child::Element(node));
    }

    /// Direct element children count.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.children
            .iter()
            .filter(|c| matches!(c, Child::Element(_)))
            .count()
    }

    /// Count descendants (including self) carrying the given tag.
    #[must_use]
    pub fn count_tag(&self, tag: Tag) -> usize {
        let own = usize::from(self.tag == tag);
        own + self
            .children
            .iter()
            .filter_map(|c| match c {
                Child::Element(n) => Some(n.count_tag(tag)),
                Child::Text(_) => None,
            })
            .sum::<usize>()
    }

    /// Whether any descendant (including self) carries the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tag == tag
            || self.children.iter().any(|c| match c {
                Child::Element(n) => n.has_tag(tag),
                Child::Text(_) => false,
            })
    }

    /// Concatenated text of the subtree. Block boundaries become newlines,
    /// everything else is space-separated; used for length gates, the
    /// language gate and fingerprinting.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        normalize_block_text(&out)
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Child::Text(t) => {
                    let trimmed = t.trim();
                    if !trimmed.is_empty() {
                        if !out.is_empty() && !out.ends_with('\n') && !out.ends_with(' ') {
                            out.push(' ');
                        }
                        out.push_str(trimmed);
                    }
                }
                Child::Element(n) => {
                    n.collect_text(out);
                    if n.tag.is_block() && !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                }
            }
        }
    }

    /// True when the subtree holds no non-whitespace text and no graphic.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        if self.tag == Tag::Graphic {
            return false;
        }
        self.children.iter().all(|c| match c {
            Child::Text(t) => t.trim().is_empty(),
            Child::Element(n) => n.tag != Tag::Lb && n.is_empty(),
        })
    }

    /// Run `f` on every descendant element, depth-first.
    pub fn visit<F: FnMut(&Node)>(&self, f: &mut F) {
        f(self);
        for child in &self.children {
            if let Child::Element(n) = child {
                n.visit(f);
            }
        }
    }
}

fn normalize_block_text(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().map(str::trim).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.retain(|l| !l.is_empty());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_body() -> Node {
        let mut body = Node::new(Tag::Body);
        body.push_element(
            Node::with_text(Tag::Head, "Title").with_attr(Attr::Rend, "h1"),
        );
        let mut p = Node::with_text(Tag::P, "Hello ");
        p.push_element(Node::with_text(Tag::Hi, "world").with_attr(Attr::Rend, "#i"));
        p.push_text(" again");
        body.push_element(p);
        body
    }

    #[test]
    fn text_merging() {
        let mut p = Node::new(Tag::P);
        p.push_text("a");
        p.push_text("b");
        assert_eq!(p.children.len(), 1);
        assert_eq!(p.plain_text(), "ab");
    }

    #[test]
    fn plain_text_blocks_become_lines() {
        let body = sample_body();
        assert_eq!(body.plain_text(), "Title\nHello world again");
    }

    #[test]
    fn counting_and_lookup() {
        let body = sample_body();
        assert_eq!(body.count_tag(Tag::P), 1);
        assert_eq!(body.count_tag(Tag::Hi), 1);
        assert!(body.has_tag(Tag::Head));
        assert!(!body.has_tag(Tag::Table));
    }

    #[test]
    fn empty_detection() {
        let mut p = Node::new(Tag::P);
        p.push_text("   ");
        assert!(p.is_empty());

        let graphic = Node::new(Tag::Graphic);
        assert!(!graphic.is_empty());

        let mut quote = Node::new(Tag::Quote);
        quote.push_element(Node::with_text(Tag::P, "text"));
        assert!(!quote.is_empty());
    }

    #[test]
    fn attr_roundtrip() {
        let mut node = Node::new(Tag::Ref);
        node.set_attr(Attr::Target, "https://example.org");
        node.set_attr(Attr::Target, "https://example.org/2");
        assert_eq!(node.attr(Attr::Target), Some("https://example.org/2"));
        assert_eq!(node.attrs.len(), 1);
    }

    #[test]
    fn tag_names_roundtrip() {
        for tag in [Tag::Body, Tag::Hi, Tag::Graphic, Tag::Lb, Tag::Cell] {
            assert_eq!(Tag::from_name(tag.as_str()), Some(tag));
        }
        assert_eq!(Tag::from_name("span"), None);
    }
}
