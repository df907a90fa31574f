//! End-to-end extraction scenarios.

use websift::markup::{Attr, Child, Node, Tag};
use websift::{bare_extraction, extract, ExtractionOptions, Focus, OutputFormat};

fn lenient() -> ExtractionOptions {
    ExtractionOptions {
        min_file_size: 10,
        min_output_size: 20,
        min_extracted_size: 50,
        ..ExtractionOptions::default()
    }
}

const NAV_AND_FOOTER: &str = "<html><body><nav>Menu</nav><article><h1>Breaking News</h1><p>This is the main content of the article. It contains important information that readers want to see.</p><p>Trafilatura automatically removes boilerplate content like navigation, footers, and ads.</p></article><footer>Copyright 2026</footer></body></html>";

#[test]
fn nav_and_footer_removed() {
    let text = extract(NAV_AND_FOOTER, &lenient()).unwrap();
    assert!(text.contains("Breaking News"));
    assert!(text.contains("main content"));
    assert!(text.contains("automatically removes boilerplate"));
    assert!(!text.contains("Menu"));
    assert!(!text.contains("Copyright 2026"));
}

fn assert_closed_markup(node: &Node) {
    // Tag is an enum, so the vocabulary is closed by construction; the
    // attribute set still needs checking.
    let allowed = [
        Attr::Rend,
        Attr::Rendition,
        Attr::Role,
        Attr::Target,
        Attr::Type,
        Attr::Src,
        Attr::Alt,
        Attr::Title,
        Attr::Lang,
    ];
    node.visit(&mut |n| {
        for (attr, _) in &n.attrs {
            assert!(allowed.contains(attr), "attribute {attr:?} on {:?}", n.tag);
        }
    });
}

#[test]
fn closed_markup_invariant() {
    let inputs = [
        NAV_AND_FOOTER,
        concat!(
            "<html><body><article><h2>Section</h2>",
            "<ul><li>First item with some text</li><li>Second item with some text</li></ul>",
            "<blockquote>A quoted passage of reasonable length sits here.</blockquote>",
            "<table><tr><th>k</th><th>v</th></tr><tr><td>a</td><td>1</td></tr></table>",
            "<p>Closing paragraph with enough text to keep the extraction gates happy.</p>",
            "</article></body></html>",
        ),
    ];
    for html in inputs {
        let options = ExtractionOptions {
            include_formatting: true,
            include_links: true,
            include_images: true,
            ..lenient()
        };
        let document = bare_extraction(html, &options).unwrap();
        assert_closed_markup(&document.body);
        if let Some(comments) = &document.commentsbody {
            assert_closed_markup(comments);
        }
    }
}

#[test]
fn txt_paragraphs_subset_of_markdown() {
    let html = concat!(
        "<html><body><article>",
        "<h2>A Section Heading</h2>",
        "<p>First paragraph with plain text only, no inline markup anywhere in sight.</p>",
        "<p>Second paragraph, also plain, also long enough to be kept by the gates.</p>",
        "</article></body></html>",
    );
    let txt = extract(html, &lenient()).unwrap();
    let md = extract(
        html,
        &ExtractionOptions { output_format: OutputFormat::Markdown, ..lenient() },
    )
    .unwrap();

    for paragraph in txt.lines().map(str::trim).filter(|l| !l.is_empty()) {
        assert!(md.contains(paragraph), "markdown output lost {paragraph:?}");
    }
}

#[test]
fn focus_monotonicity_spot_check() {
    let html = concat!(
        "<html><body>",
        r#"<div class="article-body">"#,
        "<p>The core paragraph carries the actual story text and survives all focus modes.</p>",
        "<p>A second core paragraph backs it up with more real, readable article prose.</p>",
        r#"<div class="teaser">Read more: our other big story of the day</div>"#,
        r#"<div class="recommended">Recommended for you elsewhere on the site</div>"#,
        "</div></body></html>",
    );
    let len = |focus: Focus| {
        extract(html, &ExtractionOptions { focus, ..lenient() })
            .map(|t| t.chars().count())
            .unwrap_or(0)
    };
    let precision = len(Focus::Precision);
    let balanced = len(Focus::Balanced);
    let recall = len(Focus::Recall);
    assert!(precision <= balanced, "precision {precision} > balanced {balanced}");
    assert!(balanced <= recall, "balanced {balanced} > recall {recall}");
}

#[test]
fn duplicate_segments_suppressed_across_documents() {
    websift::reset_caches();
    let repeated = "This exact disclaimer paragraph is repeated across every single page of the site, well beyond the duplicate threshold.";
    let page = |unique: &str| {
        format!(
            "<html><body><article><p>{repeated}</p><p>Unique lead paragraph number {unique} with enough text of its own to pass the extraction threshold, padded with further ordinary sentences so the primary extraction is comfortably above the fallback limits.</p></article></body></html>"
        )
    };
    let options = ExtractionOptions { deduplicate: true, ..lenient() };

    // max_repetitions = 2: the segment may appear twice, the third
    // occurrence is dropped.
    let first = extract(&page("one"), &options).unwrap();
    assert!(first.contains("exact disclaimer"));
    let second = extract(&page("two"), &options).unwrap();
    assert!(second.contains("exact disclaimer"));
    let third = extract(&page("three"), &options).unwrap();
    assert!(!third.contains("exact disclaimer"), "third occurrence kept");
    assert!(third.contains("Unique lead paragraph number three"));
    websift::reset_caches();
}

#[test]
fn language_gate() {
    let html = concat!(
        r#"<html lang="de"><body><article>"#,
        "<p>Der Inhalt dieses Artikels ist lang genug, um alle Schwellenwerte zu erfuellen.</p>",
        "</article></body></html>",
    );
    let mismatch = ExtractionOptions {
        target_language: Some("en".to_string()),
        ..lenient()
    };
    assert!(extract(html, &mismatch).is_none());

    let matching = ExtractionOptions {
        target_language: Some("de".to_string()),
        ..lenient()
    };
    assert!(extract(html, &matching).is_some());

    // No declaration at all: the gate lets it through.
    let undeclared = concat!(
        "<html><body><article>",
        "<p>Undeclared-language content that is nevertheless long enough to extract.</p>",
        "</article></body></html>",
    );
    assert!(extract(undeclared, &mismatch).is_some());
}

#[test]
fn url_blacklist_gate() {
    let html = concat!(
        r#"<html><head><link rel="canonical" href="https://example.org/blocked"></head>"#,
        "<body><article>",
        "<p>Content of a blacklisted page, easily long enough to extract otherwise.</p>",
        "</article></body></html>",
    );
    let mut options = lenient();
    options
        .url_blacklist
        .insert("https://example.org/blocked".to_string());
    assert!(extract(html, &options).is_none());

    let mut other = lenient();
    other.url_blacklist.insert("https://example.org/other".to_string());
    assert!(extract(html, &other).is_some());
}

#[test]
fn formatting_preserved_in_markdown() {
    let html = concat!(
        "<html><body><article>",
        "<p>Some <b>bold words</b> and some <em>italic words</em> in a long enough sentence ",
        "to pass every extraction threshold without difficulty.</p>",
        "</article></body></html>",
    );
    let options = ExtractionOptions { output_format: OutputFormat::Markdown, ..lenient() };
    let md = extract(html, &options).unwrap();
    assert!(md.contains("**bold words**"));
    assert!(md.contains("*italic words*"));
}

#[test]
fn links_kept_on_request() {
    let html = concat!(
        "<html><body><article>",
        r#"<p>A paragraph that mentions <a href="https://example.org/ref">a source</a> inline, "#,
        "surrounded by plenty of ordinary text so the link is clearly not navigation.</p>",
        "</article></body></html>",
    );
    let without = extract(html, &lenient()).unwrap();
    assert!(without.contains("a source"));

    let options = ExtractionOptions {
        include_links: true,
        output_format: OutputFormat::Markdown,
        ..lenient()
    };
    let with = extract(html, &options).unwrap();
    assert!(with.contains("[a source](https://example.org/ref)"));
}

#[test]
fn structured_output_returns_tree() {
    let options = ExtractionOptions {
        output_format: OutputFormat::Structured,
        ..lenient()
    };
    let document = bare_extraction(NAV_AND_FOOTER, &options).unwrap();
    assert!(document.body.has_tag(Tag::P));
    let mut paragraphs = 0;
    document.body.visit(&mut |n| {
        if n.tag == Tag::P {
            paragraphs += 1;
        }
    });
    assert!(paragraphs >= 2);
    // Children interleave text and elements under the body root.
    assert!(document
        .body
        .children
        .iter()
        .any(|c| matches!(c, Child::Element(_))));
}
