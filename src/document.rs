//! Extraction result types.

use crate::markup::{Node, Tag};

/// Metadata gathered from a document's head, structured data and DOM.
///
/// Every field is optional; extraction fills what it can and leaves the
/// rest empty.
#[derive(Debug, Clone, Default)]
pub struct MetaData {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub hostname: Option<String>,
    pub description: Option<String>,
    pub sitename: Option<String>,
    pub date: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub id: Option<String>,
    pub fingerprint: Option<String>,
    pub license: Option<String>,
    pub language: Option<String>,
    pub image: Option<String>,
    pub pagetype: Option<String>,
    /// Date the file was processed (set by the shell, not the extractor).
    pub filedate: Option<String>,
}

/// The extraction result: metadata plus the internal markup trees and
/// their serializations.
#[derive(Debug, Clone)]
pub struct TextDocument {
    pub metadata: MetaData,

    /// Main content tree; always present, possibly empty.
    pub body: Node,

    /// Comments tree, when comment extraction ran and found anything.
    pub commentsbody: Option<Node>,

    /// Serialized body in the requested output format.
    pub text: String,

    /// Serialized comments in the requested output format.
    pub comments: String,

    /// Pre-serialization text used for fingerprinting and gating.
    pub raw_text: String,
}

impl Default for TextDocument {
    fn default() -> Self {
        Self {
            metadata: MetaData::default(),
            body: Node::new(Tag::Body),
            commentsbody: None,
            text: String::new(),
            comments: String::new(),
            raw_text: String::new(),
        }
    }
}
