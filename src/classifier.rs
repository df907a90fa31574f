//! Paragraph-level boilerplate classifier.
//!
//! Last-resort extractor: every leaf block is judged on its own by link
//! density, word count and stop-word share. Paragraphs that read like
//! prose survive; menu entries, button labels and credit lines do not.

use dom_query::{Document, Selection};

use crate::markup::{Node, Tag};
use crate::tree;

/// Maximum share of anchor text for a paragraph to count as prose.
const MAX_LINK_DENSITY: f64 = 0.4;

/// Below this word count the stop-word share must clear the bar.
const SHORT_PARAGRAPH_WORDS: usize = 10;

/// Minimum stop-word share for short paragraphs.
const MIN_STOPWORD_SHARE: f64 = 0.3;

/// Hard word-count floor.
const MIN_WORDS: usize = 3;

/// Default stop-word list (English).
const STOPWORDS_EN: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "an", "and", "any", "are", "as",
    "at", "be", "been", "being", "below", "between", "both", "but", "by", "can", "did", "do",
    "does", "doing", "down", "during", "each", "else", "few", "for", "from", "further", "had",
    "has", "have", "having", "he", "her", "here", "his", "how", "i", "if", "in", "into", "is",
    "it", "its", "just", "more", "most", "my", "no", "nor", "not", "now", "of", "off", "on",
    "once", "only", "or", "other", "our", "out", "over", "own", "same", "she", "so", "some",
    "such", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "those", "through", "to", "too", "under", "until", "up", "very", "was", "we", "were", "what",
    "when", "where", "which", "while", "who", "whom", "why", "will", "with", "you", "your",
];

/// Language codes with dedicated stop-word lists planned; only English is
/// wired up today.
pub const KNOWN_LANGUAGES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("bg", "Bulgarian"),
    ("cz", "Czech"),
    ("da", "Danish"),
    ("de", "German"),
    ("en", "English"),
    ("el", "Greek"),
    ("es", "Spanish"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("hr", "Croatian"),
    ("hu", "Hungarian"),
    ("ko", "Korean"),
    ("id", "Indonesian"),
    ("it", "Italian"),
    ("no", "Norwegian"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("sr", "Serbian"),
    ("sv", "Swedish"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("ur", "Urdu"),
    ("vi", "Vietnamese"),
];

fn stopword_share(words: &[&str]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let hits = words
        .iter()
        .filter(|w| {
            let lower = w.to_lowercase();
            let bare = lower.trim_matches(|c: char| !c.is_alphanumeric());
            STOPWORDS_EN.contains(&bare)
        })
        .count();
    #[allow(clippy::cast_precision_loss)]
    {
        hits as f64 / words.len() as f64
    }
}

/// Judge one paragraph: true means boilerplate.
#[must_use]
pub fn is_boilerplate(sel: &Selection) -> bool {
    if tree::link_density(sel) > MAX_LINK_DENSITY {
        return true;
    }
    let text = tree::trimmed_text(sel);
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < MIN_WORDS {
        return true;
    }
    words.len() < SHORT_PARAGRAPH_WORDS && stopword_share(&words) < MIN_STOPWORD_SHARE
}

const CANDIDATE_BLOCKS: &str = "p, div, li, td, th";

/// Classify every leaf block of the document and collect the good ones
/// into a fresh body of plain paragraphs.
#[must_use]
pub fn classify_paragraphs(doc: &Document) -> (Node, String) {
    let mut body = Node::new(Tag::Body);

    for sel in doc
        .select(CANDIDATE_BLOCKS)
        .nodes()
        .iter()
        .map(|n| Selection::from(n.clone()))
    {
        // Only leaf-most blocks: a wrapper div repeats its children's text.
        if sel.select(CANDIDATE_BLOCKS).length() > 0 {
            continue;
        }
        if is_boilerplate(&sel) {
            continue;
        }
        let text = tree::collapse_whitespace(&tree::trimmed_text(&sel));
        if !text.is_empty() {
            body.push_element(Node::with_text(Tag::P, &text));
        }
    }

    let text = body.plain_text();
    (body, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prose_paragraph_kept() {
        let doc = Document::from(
            "<p>This is a perfectly ordinary sentence with enough of the usual words in it.</p>",
        );
        assert!(!is_boilerplate(&doc.select("p")));
    }

    #[test]
    fn link_heavy_paragraph_rejected() {
        let doc = Document::from(
            r#"<p><a href="/a">Home page link</a> <a href="/b">Another link here</a> x</p>"#,
        );
        assert!(is_boilerplate(&doc.select("p")));
    }

    #[test]
    fn two_word_label_rejected() {
        let doc = Document::from("<p>Read more</p>");
        assert!(is_boilerplate(&doc.select("p")));
    }

    #[test]
    fn short_but_stopword_rich_kept() {
        let doc = Document::from("<p>It was the best of times.</p>");
        assert!(!is_boilerplate(&doc.select("p")));
    }

    #[test]
    fn short_nav_label_rejected() {
        let doc = Document::from("<p>Politics Sports Business Weather Travel</p>");
        assert!(is_boilerplate(&doc.select("p")));
    }

    #[test]
    fn classification_builds_paragraph_body() {
        let doc = Document::from(concat!(
            "<html><body>",
            "<div><p>The good paragraph has the usual amount of ordinary text in it.</p></div>",
            "<li>Home</li>",
            "<p>Another decent paragraph that a reader would actually want to keep here.</p>",
            "</body></html>",
        ));
        let (body, text) = classify_paragraphs(&doc);
        assert_eq!(body.count_tag(Tag::P), 2);
        assert!(text.contains("good paragraph"));
        assert!(!text.contains("Home"));
    }

    #[test]
    fn language_table_is_complete() {
        assert_eq!(KNOWN_LANGUAGES.len(), 30);
        assert!(KNOWN_LANGUAGES.iter().any(|(c, _)| *c == "en"));
    }
}
