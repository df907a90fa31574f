//! Multi-pass HTML cleaner and tag conversion.
//!
//! The cleaner is the only component that mutates the DOM. It unwraps
//! cosmetic tags, deletes whole categories of non-content elements,
//! prunes empty leftovers, and finally rewrites the survivors into the
//! internal tag vocabulary that the serializers understand.

use std::sync::LazyLock;

use dom_query::{Document, Selection};
use tracing::debug;

use crate::options::ExtractionOptions;
use crate::tree;
use crate::url_utils;

/// Tags unwrapped in place, children and interior text preserved.
static STRIPPED_TAGS: &[&str] = &[
    "abbr", "acronym", "address", "bdi", "bdo", "big", "cite", "data", "dfn", "font", "hgroup",
    "img", "ins", "mark", "meta", "ruby", "small", "tbody", "template", "tfoot", "thead",
];

/// Tags deleted with their whole subtree.
static CLEANED_TAGS: &[&str] = &[
    "aside", "embed", "footer", "form", "head", "iframe", "menu", "object", "script", "applet",
    "audio", "canvas", "figure", "map", "picture", "svg", "video", "area", "blink", "button",
    "datalist", "dialog", "frame", "frameset", "fieldset", "link", "input", "ins", "label",
    "legend", "marquee", "math", "menuitem", "nav", "noindex", "noscript", "optgroup", "option",
    "output", "param", "progress", "rp", "rt", "rtc", "select", "source", "style", "track",
    "textarea", "time", "use",
];

/// Tags dropped when left without element children or real text.
static PRUNED_IF_EMPTY: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    vec![
        "article", "b", "blockquote", "dd", "div", "dt", "em", "h1", "h2", "h3", "h4", "h5",
        "h6", "i", "li", "main", "p", "pre", "q", "section", "span", "strong",
    ]
});

/// Inline formatting rewritten into `hi` elements.
static FORMATTING_TAGS: &[&str] = &[
    "em", "i", "b", "strong", "u", "kbd", "samp", "tt", "var", "sub", "sup",
];

fn hi_rend(tag: &str) -> &'static str {
    match tag {
        "em" | "i" => "#i",
        "b" | "strong" => "#b",
        "u" => "#u",
        "kbd" | "samp" | "tt" | "var" => "#t",
        "sub" => "#sub",
        "sup" => "#sup",
        _ => "#i",
    }
}

/// Run the strip/delete/prune passes over a parsed document.
///
/// Takes the document by value: in recall focus the pre-deletion snapshot
/// is restored (and returned) when deletion would leave no paragraphs.
#[must_use]
pub fn clean_document(doc: Document, options: &ExtractionOptions) -> Document {
    let root = doc.select("html");

    // Pass 1: unwrap cosmetic wrappers.
    let strip: Vec<&str> = STRIPPED_TAGS
        .iter()
        .copied()
        .filter(|t| !(options.include_images && *t == "img"))
        .collect();
    root.strip_elements(&strip);

    // Pass 2: delete non-content subtrees, with a snapshot escape hatch
    // in recall focus.
    let snapshot = if options.focus.is_recall() && doc.select("p").length() > 0 {
        Some(doc.html().to_string())
    } else {
        None
    };

    let mut delete: Vec<&str> = CLEANED_TAGS
        .iter()
        .copied()
        .filter(|t| !(options.include_images && matches!(*t, "figure" | "picture" | "source")))
        .collect();
    if !options.include_tables {
        delete.extend(["table", "td", "th", "tr"]);
    } else {
        // A figure wrapping a data table is layout, not media.
        for figure in doc.select("figure").iter() {
            if figure.select("table").length() > 0 {
                figure.rename("div");
            }
        }
    }
    for tag in delete {
        doc.select(tag).remove();
    }

    if let Some(saved) = snapshot {
        if doc.select("p").length() == 0 {
            debug!("cleaning removed every paragraph, restoring snapshot");
            let restored = Document::from(saved.as_str());
            prune_empty_elements(&restored);
            return restored;
        }
    }

    // Pass 3: drop empty leftovers.
    prune_empty_elements(&doc);

    doc
}

/// Remove elements from the prunable set that carry neither element
/// children nor real text. Reverse document order so that a parent whose
/// children just vanished is caught in the same pass.
fn prune_empty_elements(doc: &Document) {
    let nodes: Vec<Selection> = tree::descendants(&doc.select("html"));
    for sel in nodes.into_iter().rev() {
        let tag = tree::tag_name(&sel);
        if !PRUNED_IF_EMPTY.contains(&tag.as_str()) {
            continue;
        }
        if tree::element_children(&sel).is_empty() && !tree::has_real_text(&sel.text()) {
            sel.remove();
        }
    }
}

/// Heuristic for `<pre>` blocks that are actually code listings.
fn pre_is_code(pre: &Selection) -> bool {
    let children = tree::element_children(pre);
    if children.len() == 1 && tree::tag_name(&children[0]) == "span" {
        return true;
    }
    if pre.select("span[class^=\"hljs\"]").length() > 0 {
        return true;
    }
    let text = pre.text().to_string();
    ["{", "(\"", "('", "\n    "].iter().any(|m| text.contains(m))
}

/// Rewrite the cleaned DOM into the internal tag vocabulary, in place.
///
/// After this pass the subtree only contains tags the serializer knows;
/// anything left untouched is unwrapped later during tree building.
pub fn convert_tags(root: &Selection, options: &ExtractionOptions, base_url: Option<&str>) {
    // Lists and their items.
    for tag in ["ol", "ul", "dl"] {
        for list in root.select(tag).iter() {
            list.rename("list");
            tree::clear_attributes(&list);
            list.set_attr("rend", tag);
        }
    }
    for tag in ["li", "dd", "dt"] {
        for item in root.select(tag).iter() {
            item.rename("item");
            tree::clear_attributes(&item);
        }
    }

    // Headings keep only their level.
    for level in 1..=6u8 {
        let name = format!("h{level}");
        for heading in root.select(&name).iter() {
            heading.rename("head");
            tree::clear_attributes(&heading);
            heading.set_attr("rend", &name);
        }
    }

    for lb in root.select("br, hr").iter() {
        lb.rename("lb");
        tree::clear_attributes(&lb);
    }

    // Details/summary before quotes: summary becomes a heading.
    for summary in root.select("details > summary").iter() {
        summary.rename("head");
        tree::clear_attributes(&summary);
        summary.set_attr("rend", "h3");
    }
    for details in root.select("details").iter() {
        details.rename("div");
        tree::clear_attributes(&details);
    }

    // Code vs quote for pre blocks.
    for pre in root.select("pre").iter() {
        if pre_is_code(&pre) {
            pre.rename("code");
        } else {
            pre.rename("quote");
        }
        tree::clear_attributes(&pre);
    }
    for quote in root.select("blockquote, q").iter() {
        quote.rename("quote");
        tree::clear_attributes(&quote);
    }

    for del in root.select("del, s, strike").iter() {
        del.rename("del");
        tree::clear_attributes(&del);
        del.set_attr("rend", "overstrike");
    }

    if options.include_images {
        for img in root.select("img").iter() {
            let src = {
                let direct = tree::attr(&img, "src");
                if direct.is_empty() {
                    tree::attr(&img, "data-src")
                } else {
                    direct
                }
            };
            let alt = tree::attr(&img, "alt");
            let title = tree::attr(&img, "title");
            img.rename("graphic");
            tree::clear_attributes(&img);
            if !src.is_empty() {
                let resolved = url_utils::resolve_link(&src, base_url).unwrap_or(src);
                img.set_attr("src", &resolved);
            }
            if !alt.is_empty() {
                img.set_attr("alt", &alt);
            }
            if !title.is_empty() {
                img.set_attr("title", &title);
            }
        }
    }

    // Links: keep as refs or unwrap entirely.
    if options.include_links {
        for link in root.select("a").iter() {
            let href = tree::attr(&link, "href");
            link.rename("ref");
            tree::clear_attributes(&link);
            if let Some(target) = url_utils::resolve_link(&href, base_url) {
                link.set_attr("target", &target);
            }
        }
    } else {
        root.strip_elements(&["a"]);
    }

    // Inline formatting: hi elements or plain text.
    if options.include_formatting {
        for &tag in FORMATTING_TAGS {
            for hit in root.select(tag).iter() {
                hit.rename("hi");
                tree::clear_attributes(&hit);
                hit.set_attr("rend", hi_rend(tag));
            }
        }
    } else {
        root.strip_elements(FORMATTING_TAGS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Focus;

    fn page(body: &str) -> Document {
        Document::from(format!("<html><head><title>t</title></head><body>{body}</body></html>"))
    }

    #[test]
    fn strips_cosmetic_wrappers() {
        let doc = page("<p>keep <small>this text</small> intact</p>");
        let doc = clean_document(doc, &ExtractionOptions::default());
        assert_eq!(doc.select("small").length(), 0);
        assert!(doc.select("p").text().contains("this text"));
    }

    #[test]
    fn deletes_chrome_subtrees() {
        let doc = page("<nav>menu</nav><p>content</p><footer>legal</footer><script>x()</script>");
        let doc = clean_document(doc, &ExtractionOptions::default());
        assert_eq!(doc.select("nav, footer, script").length(), 0);
        assert_eq!(doc.select("p").length(), 1);
    }

    #[test]
    fn tables_removed_on_demand() {
        let doc = page("<table><tr><td>cell</td></tr></table><p>text</p>");
        let options = ExtractionOptions {
            include_tables: false,
            ..ExtractionOptions::default()
        };
        let doc = clean_document(doc, &options);
        assert_eq!(doc.select("table").length(), 0);
    }

    #[test]
    fn figure_with_table_becomes_div() {
        let doc = page("<figure><table><tr><td>data</td></tr></table></figure>");
        let doc = clean_document(doc, &ExtractionOptions::default());
        assert_eq!(doc.select("figure").length(), 0);
        assert_eq!(doc.select("table").length(), 1);
    }

    #[test]
    fn recall_snapshot_restores_paragraphs() {
        // The only paragraph sits inside a form, which pass 2 deletes.
        let doc = page("<form><p>only paragraph here</p></form>");
        let options = ExtractionOptions {
            focus: Focus::Recall,
            ..ExtractionOptions::default()
        };
        let doc = clean_document(doc, &options);
        assert_eq!(doc.select("p").length(), 1);
    }

    #[test]
    fn empty_elements_pruned_with_parents() {
        let doc = page("<div><p>   </p></div><p>real text</p>");
        let doc = clean_document(doc, &ExtractionOptions::default());
        assert_eq!(doc.select("div").length(), 0);
        assert_eq!(doc.select("p").length(), 1);
    }

    #[test]
    fn cleaning_is_idempotent() {
        let doc = page(concat!(
            "<nav>menu</nav><div><span></span></div>",
            "<article><p>body text</p><aside>related</aside></article>",
        ));
        let once = clean_document(doc, &ExtractionOptions::default());
        let first = once.html().to_string();
        let twice = clean_document(once, &ExtractionOptions::default());
        assert_eq!(first, twice.html().to_string());
    }

    #[test]
    fn converts_lists_and_headings() {
        let doc = page("<h2 class=\"x\">Sub</h2><ul><li>one</li><li>two</li></ul>");
        let body = doc.select("body");
        convert_tags(&body, &ExtractionOptions::default(), None);
        assert_eq!(doc.select("head[rend=\"h2\"]").length(), 1);
        assert_eq!(doc.select("list[rend=\"ul\"]").length(), 1);
        assert_eq!(doc.select("item").length(), 2);
    }

    #[test]
    fn pre_with_braces_is_code() {
        let doc = page("<pre>fn main() { }</pre><pre>A plain quotation block</pre>");
        let body = doc.select("body");
        convert_tags(&body, &ExtractionOptions::default(), None);
        assert_eq!(doc.select("code").length(), 1);
        assert_eq!(doc.select("quote").length(), 1);
    }

    #[test]
    fn links_unwrapped_by_default() {
        let doc = page(r#"<p>go <a href="/there">there</a> now</p>"#);
        let body = doc.select("body");
        convert_tags(&body, &ExtractionOptions::default(), None);
        assert_eq!(doc.select("a, ref").length(), 0);
        assert!(doc.select("p").text().contains("there"));
    }

    #[test]
    fn links_resolved_when_kept() {
        let doc = page(r#"<p><a href="/there">there</a></p>"#);
        let body = doc.select("body");
        let options = ExtractionOptions {
            include_links: true,
            ..ExtractionOptions::default()
        };
        convert_tags(&body, &options, Some("https://example.org/page"));
        let target = tree::attr(&doc.select("ref"), "target");
        assert_eq!(target, "https://example.org/there");
    }

    #[test]
    fn formatting_mapped_to_hi() {
        let doc = page("<p><b>bold</b> and <em>italic</em></p>");
        let body = doc.select("body");
        let options = ExtractionOptions {
            include_formatting: true,
            ..ExtractionOptions::default()
        };
        convert_tags(&body, &options, None);
        assert_eq!(doc.select("hi[rend=\"#b\"]").length(), 1);
        assert_eq!(doc.select("hi[rend=\"#i\"]").length(), 1);
    }
}
