//! Generic readability fallback.
//!
//! A port of the arc90 scoring model: paragraphs push score onto their
//! ancestors, class names and tag kinds seed or penalize candidates, link
//! density scales the totals, and the best candidate's neighborhood is
//! collected and sanitized. Used when the selector-driven extractor comes
//! back thin.

use std::collections::HashMap;
use std::sync::LazyLock;

use dom_query::{Document, NodeId, Selection};
use regex::Regex;
use tracing::debug;

use crate::options::ExtractionOptions;
use crate::tree;

const MIN_TEXT_LENGTH: usize = 25;

static POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)article|body|content|entry|hentry|main|page|pagination|post|text|blog|story")
        .expect("positive class regex")
});

static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)button|combx|comment|com-|contact|figure|foot|footer|footnote|form|input|masthead|media|meta|outbrain|promo|related|scroll|shoutbox|sidebar|sponsor|shopping|tags|tool|widget",
    )
    .expect("negative class regex")
});

static UNLIKELY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)combx|comment|community|disqus|extra|foot|header|menu|remark|rss|shoutbox|sidebar|sponsor|ad-break|agegate|pagination|pager|popup|tweet|twitter",
    )
    .expect("unlikely candidate regex")
});

static MAYBE_CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)and|article|body|column|main|shadow").expect("maybe candidate regex")
});

static BLOCK_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(a|blockquote|dl|div|img|ol|p|pre|table|ul)").expect("block content regex")
});

static VIDEO_EMBED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?(youtube|vimeo)\.com").expect("video embed regex")
});

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.( |$)").expect("sentence end regex"));

/// Class/id weight: ±25 per matching attribute.
fn class_weight(sel: &Selection) -> f64 {
    let mut weight = 0.0;
    for value in [tree::class(sel), tree::id(sel)] {
        if value.is_empty() {
            continue;
        }
        if POSITIVE.is_match(&value) {
            weight += 25.0;
        }
        if NEGATIVE.is_match(&value) {
            weight -= 25.0;
        }
    }
    weight
}

/// Per-tag seed score.
fn tag_seed(tag: &str) -> f64 {
    match tag {
        "div" | "article" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" | "form" | "aside" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" | "header" | "footer" | "nav" => -5.0,
        _ => 0.0,
    }
}

fn node_id(sel: &Selection) -> Option<NodeId> {
    sel.nodes().first().map(|n| n.id)
}

/// Outcome of the readability pass: the collected article and whether any
/// elements the cascade considers unsanitary survived.
pub struct Readable {
    pub doc: Document,
    pub text: String,
    pub residual_widgets: bool,
}

/// Elements whose survival signals a poor extraction to the cascade.
const SANITIZED_ELEMENTS: &str = "aside, audio, button, fieldset, figure, footer, iframe, input, label, link, nav, noindex, noscript, object, option, select, source, svg, time";

/// Run the readability algorithm over a document clone.
pub fn extract_readable(source: &Document, options: &ExtractionOptions) -> Option<Readable> {
    // First attempt is ruthless: strip unlikely candidates before scoring.
    for ruthless in [true, false] {
        let doc = Document::from(source.html().to_string());
        if let Some(result) = attempt(&doc, options, ruthless) {
            return Some(result);
        }
        debug!(ruthless, "readability attempt produced no candidate");
    }
    None
}

fn attempt(doc: &Document, options: &ExtractionOptions, ruthless: bool) -> Option<Readable> {
    if ruthless {
        remove_unlikely_candidates(doc);
    }
    transform_misused_divs(doc);

    let scores = score_paragraphs(doc);
    let (best_id, best_score) = scores
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(id, score)| (*id, *score))?;

    let best = find_by_id(doc, best_id)?;
    let article = collect_siblings(&best, best_score, &scores);
    sanitize(&article, &scores, options);

    let root = article.select("div").first();
    let text = tree::trimmed_text(&root);
    if text.is_empty() {
        return None;
    }

    let residual_widgets = article.select(SANITIZED_ELEMENTS).length() > 0;
    Some(Readable { doc: article, text, residual_widgets })
}

fn find_by_id<'a>(doc: &'a Document, id: NodeId) -> Option<Selection<'a>> {
    doc.select("*")
        .nodes()
        .iter()
        .find(|n| n.id == id)
        .map(|n| Selection::from(n.clone()))
}

/// Pre-pass: drop elements whose class+id scream navigation or social
/// unless they also carry a content marker.
fn remove_unlikely_candidates(doc: &Document) {
    let nodes = tree::descendants(&doc.select("html"));
    for sel in nodes {
        let combined = tree::class_id(&sel);
        if combined.trim().is_empty() {
            continue;
        }
        if !UNLIKELY.is_match(&combined) || MAYBE_CANDIDATE.is_match(&combined) {
            continue;
        }
        if matches!(tree::tag_name(&sel).as_str(), "body" | "html") {
            continue;
        }
        sel.remove();
    }
}

/// Divs used as paragraphs (no block-level children) become paragraphs.
fn transform_misused_divs(doc: &Document) {
    for div in doc.select("div").iter() {
        if !BLOCK_CONTENT.is_match(&div.inner_html()) {
            div.rename("p");
        }
    }
}

/// Score candidate ancestors from their paragraph content, then scale by
/// link density.
fn score_paragraphs(doc: &Document) -> HashMap<NodeId, f64> {
    let mut scores: HashMap<NodeId, f64> = HashMap::new();

    for paragraph in doc.select("p, pre, td").iter() {
        let text = tree::trimmed_text(&paragraph);
        let text_len = text.chars().count();
        if text_len < MIN_TEXT_LENGTH {
            continue;
        }

        let parent = paragraph.parent();
        if parent.is_empty() {
            continue;
        }
        let grandparent = parent.parent();

        #[allow(clippy::cast_precision_loss)]
        let content_score =
            1.0 + text.matches(',').count() as f64 + ((text_len / 100).min(3)) as f64;

        if let Some(parent_id) = node_id(&parent) {
            let entry = scores
                .entry(parent_id)
                .or_insert_with(|| class_weight(&parent) + tag_seed(&tree::tag_name(&parent)));
            *entry += content_score;
        }
        if !grandparent.is_empty() {
            if let Some(gp_id) = node_id(&grandparent) {
                let entry = scores.entry(gp_id).or_insert_with(|| {
                    class_weight(&grandparent) + tag_seed(&tree::tag_name(&grandparent))
                });
                *entry += content_score / 2.0;
            }
        }
    }

    // Link-density scaling over all candidates.
    let ids: Vec<NodeId> = scores.keys().copied().collect();
    for id in ids {
        if let Some(sel) = find_by_id(doc, id) {
            let density = tree::link_density(&sel);
            if let Some(score) = scores.get_mut(&id) {
                *score *= 1.0 - density;
            }
        }
    }

    scores
}

/// Gather the best candidate and qualifying siblings into a fresh div.
fn collect_siblings(
    best: &Selection,
    best_score: f64,
    scores: &HashMap<NodeId, f64>,
) -> Document {
    let threshold = (best_score * 0.2).max(10.0);
    let best_id = node_id(best);

    let parent = best.parent();
    let siblings: Vec<Selection> = if parent.is_empty() {
        vec![best.clone()]
    } else {
        tree::element_children(&parent)
    };

    let mut kept_html = String::new();
    for sibling in &siblings {
        let id = node_id(sibling);
        let keep = if id == best_id {
            true
        } else if id.and_then(|i| scores.get(&i)).copied().unwrap_or(0.0) >= threshold {
            true
        } else if tree::tag_name(sibling) == "p" {
            let text = tree::trimmed_text(sibling);
            let len = text.chars().count();
            let density = tree::link_density(sibling);
            (len > 80 && density < 0.25)
                || (len <= 80 && density == 0.0 && SENTENCE_END.is_match(&text))
        } else {
            false
        };

        if keep {
            kept_html.push_str(&sibling.html());
        }
    }

    Document::from(format!("<div>{kept_html}</div>"))
}

/// Post-sanitization of the collected article.
fn sanitize(article: &Document, scores: &HashMap<NodeId, f64>, options: &ExtractionOptions) {
    // Suspicious headings.
    for heading in article.select("h1, h2, h3, h4, h5, h6").iter() {
        if class_weight(&heading) < 0.0 || tree::link_density(&heading) > 0.33 {
            heading.remove();
        }
    }

    article.select("form, textarea").remove();

    for iframe in article.select("iframe").iter() {
        if VIDEO_EMBED.is_match(&tree::attr(&iframe, "src")) {
            iframe.replace_with_html("VIDEO");
        } else {
            iframe.remove();
        }
    }

    clean_conditionally(article, scores, options);
}

#[allow(clippy::cast_precision_loss)]
fn clean_conditionally(
    article: &Document,
    scores: &HashMap<NodeId, f64>,
    _options: &ExtractionOptions,
) {
    let candidates: Vec<Selection> = article
        .select("table, ul, div, aside, header, footer, section")
        .nodes()
        .iter()
        .map(|n| Selection::from(n.clone()))
        .collect();

    // Reverse document order: inner containers are judged before the
    // wrappers that contain them.
    for sel in candidates.into_iter().rev() {
        let weight = class_weight(&sel)
            + node_id(&sel).and_then(|i| scores.get(&i)).copied().unwrap_or(0.0);
        if weight < 0.0 {
            sel.remove();
            continue;
        }

        let text = tree::trimmed_text(&sel);
        if text.matches(',').count() >= 10 {
            continue;
        }

        let p_count = sel.select("p").length();
        let img_count = sel.select("img, graphic").length();
        let li_count = sel.select("li").length().saturating_sub(100);
        let input_total = sel.select("input").length();
        let hidden_inputs = sel.select(r#"input[type="hidden"]"#).length();
        let input_count = input_total.saturating_sub(hidden_inputs);
        let embed_count = sel.select("embed, object").length();
        let density = tree::link_density(&sel);
        let content_length = text.chars().count();
        let tag = tree::tag_name(&sel);

        let mut remove = false;
        if img_count > p_count && img_count > 1 {
            remove = true;
        } else if li_count > p_count && !matches!(tag.as_str(), "ul" | "ol") {
            remove = true;
        } else if input_count > p_count / 3 && input_count > 0 {
            remove = true;
        } else if content_length < MIN_TEXT_LENGTH && (img_count == 0 || img_count > 2) {
            remove = true;
        } else if weight < 25.0 && density > 0.2 {
            remove = true;
        } else if weight >= 25.0 && density > 0.5 {
            remove = true;
        } else if (embed_count == 1 && content_length < 75) || embed_count > 1 {
            remove = true;
        }

        // Empty containers flanked by substantial siblings are layout
        // scaffolding worth keeping intact.
        if remove && content_length == 0 {
            let prev_len = sel.prev_sibling().text().trim().chars().count();
            let next_len = sel.next_sibling().text().trim().chars().count();
            if prev_len > MIN_TEXT_LENGTH || next_len > MIN_TEXT_LENGTH {
                remove = false;
            }
        }

        if remove {
            sel.remove();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_page() -> Document {
        Document::from(concat!(
            "<html><body>",
            r#"<div id="nav-sidebar" class="sidebar"><a href="/1">One</a><a href="/2">Two</a></div>"#,
            r#"<div class="article-content">"#,
            "<p>The first paragraph of the story carries enough text to score, with commas, clauses, and general substance to push points onto its parent container.</p>",
            "<p>A second paragraph continues the story at length, adding more sentences and more score for the same candidate element in the tree.</p>",
            "<p>A third paragraph seals the decision in favour of this candidate.</p>",
            "</div>",
            r#"<div class="footer-widget">Subscribe to our newsletter</div>"#,
            "</body></html>",
        ))
    }

    #[test]
    fn picks_the_paragraph_rich_candidate() {
        let result = extract_readable(&article_page(), &ExtractionOptions::default()).unwrap();
        assert!(result.text.contains("first paragraph of the story"));
        assert!(result.text.contains("third paragraph"));
        assert!(!result.text.contains("Subscribe"));
    }

    #[test]
    fn class_weights() {
        let doc = Document::from(concat!(
            r#"<div id="a" class="article-content">x</div>"#,
            r#"<div id="b" class="sidebar-widget">x</div>"#,
            r#"<div id="c" class="content sidebar">x</div>"#,
        ));
        assert!(class_weight(&doc.select("#a")) > 0.0);
        assert!(class_weight(&doc.select("#b")) < 0.0);
        // Positive and negative on the same attribute cancel out.
        assert!((class_weight(&doc.select("#c"))).abs() < f64::EPSILON);
    }

    #[test]
    fn unlikely_candidates_removed() {
        let doc = Document::from(
            r#"<html><body><div class="disqus-extra">gone</div><div class="comment-main">kept</div></body></html>"#,
        );
        remove_unlikely_candidates(&doc);
        assert_eq!(doc.select("div").length(), 1);
        assert!(doc.select("div").text().contains("kept"));
    }

    #[test]
    fn misused_divs_become_paragraphs() {
        let doc = Document::from(
            "<html><body><div>just text</div><div><p>has blocks</p></div></body></html>",
        );
        transform_misused_divs(&doc);
        // The outer wrapper with a <p> child stays a div.
        assert_eq!(doc.select("body > p").length(), 1);
        assert_eq!(doc.select("body > div").length(), 1);
    }

    #[test]
    fn video_iframes_become_markers() {
        let doc = Document::from(concat!(
            "<div>",
            r#"<iframe src="https://www.youtube.com/embed/xyz"></iframe>"#,
            r#"<iframe src="https://ads.example.org/frame"></iframe>"#,
            "</div>",
        ));
        sanitize(&doc, &HashMap::new(), &ExtractionOptions::default());
        assert_eq!(doc.select("iframe").length(), 0);
        assert!(doc.select("div").text().contains("VIDEO"));
    }

    #[test]
    fn link_heavy_section_dropped() {
        let doc = Document::from(concat!(
            "<div><div class=\"inner\">",
            r#"<a href="/a">Read this</a> <a href="/b">And this</a> <a href="/c">More</a>"#,
            "</div></div>",
        ));
        clean_conditionally(&doc, &HashMap::new(), &ExtractionOptions::default());
        assert_eq!(doc.select(".inner").length(), 0);
    }

    #[test]
    fn prose_section_survives() {
        let doc = Document::from(concat!(
            "<div><div class=\"inner\">",
            "<p>Plenty of real text, long enough to pass the length gate, with no links at all in sight.</p>",
            "</div></div>",
        ));
        clean_conditionally(&doc, &HashMap::new(), &ExtractionOptions::default());
        assert_eq!(doc.select(".inner").length(), 1);
    }

    #[test]
    fn no_candidate_on_empty_page() {
        let doc = Document::from("<html><body><span>hi</span></body></html>");
        assert!(extract_readable(&doc, &ExtractionOptions::default()).is_none());
    }
}
