//! Configuration options for content extraction.
//!
//! `ExtractionOptions` controls the whole pipeline: the precision/recall
//! focus, feature toggles, size thresholds and blacklists. Invalid values
//! are rejected at construction; the extraction entry points themselves
//! never fail on options.

use std::collections::HashSet;
use std::str::FromStr;

use crate::error::Error;

/// Selector aggressiveness knob.
///
/// `Precision` favours fewer false positives, `Recall` fewer false
/// negatives. When both are requested, recall wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Balanced,
    Precision,
    Recall,
}

impl Focus {
    #[inline]
    #[must_use]
    pub fn is_precision(self) -> bool {
        self == Focus::Precision
    }

    #[inline]
    #[must_use]
    pub fn is_recall(self) -> bool {
        self == Focus::Recall
    }
}

/// Output serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Txt,
    Markdown,
    Json,
    Xml,
    XmlTei,
    Csv,
    Html,
    /// Return the internal markup tree itself (only via `bare_extraction`).
    Structured,
}

impl OutputFormat {
    /// File extension used by the CLI when writing to a directory.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Xml | OutputFormat::XmlTei => "xml",
            OutputFormat::Html => "html",
            _ => "txt",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" | "text" => Ok(OutputFormat::Txt),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "xml" => Ok(OutputFormat::Xml),
            "xmltei" | "tei" => Ok(OutputFormat::XmlTei),
            "csv" => Ok(OutputFormat::Csv),
            "html" => Ok(OutputFormat::Html),
            "structured" => Ok(OutputFormat::Structured),
            other => Err(Error::InvalidOption(format!("unknown output format: {other}"))),
        }
    }
}

/// Configuration options for one extraction call.
///
/// All fields are public; use `Default::default()` for standard settings
/// and [`ExtractionOptions::normalized`] before running the pipeline.
///
/// # Example
///
/// ```rust
/// use websift::{ExtractionOptions, Focus};
///
/// let options = ExtractionOptions {
///     focus: Focus::Precision,
///     include_links: true,
///     ..ExtractionOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct ExtractionOptions {
    /// Precision/recall trade-off.
    pub focus: Focus,

    /// Extract the comments section alongside the main body.
    pub include_comments: bool,

    /// Preserve inline formatting (`hi` elements) in the output.
    pub include_formatting: bool,

    /// Keep link targets (`ref` elements) instead of unwrapping anchors.
    pub include_links: bool,

    /// Keep images as `graphic` elements.
    pub include_images: bool,

    /// Keep tables.
    pub include_tables: bool,

    /// Skip the fallback cascade, use the primary extractor only.
    pub fast: bool,

    /// Drop repeated text segments through the process-wide counter.
    pub deduplicate: bool,

    /// Run metadata extraction and attach it to the result.
    pub with_metadata: bool,

    /// Reject documents missing any of date, title or URL.
    pub only_with_metadata: bool,

    /// Expected document language (ISO 639-1). Documents that declare a
    /// different language are rejected.
    pub target_language: Option<String>,

    /// Source URL of the document, used for link resolution and as the
    /// canonical-URL fallback.
    pub source_url: Option<String>,

    /// Minimum length of extracted body text before fallbacks kick in.
    pub min_extracted_size: usize,

    /// Minimum length of serialized output below which the document is
    /// rejected (unless the comments section passes its own bar).
    pub min_output_size: usize,

    /// Comment-section equivalents of the two thresholds above.
    pub min_extracted_comm_size: usize,
    pub min_output_comm_size: usize,

    /// Minimum segment length considered by the deduplicator.
    pub min_duplcheck_size: usize,

    /// Occurrences after which a segment counts as duplicated.
    pub max_repetitions: usize,

    /// Input size bounds enforced by the parser adapter (bytes).
    pub max_file_size: usize,
    pub min_file_size: usize,

    /// Author names filtered from metadata (case-insensitive).
    pub author_blacklist: HashSet<String>,

    /// Canonical URLs whose documents are rejected outright.
    pub url_blacklist: HashSet<String>,

    /// Extra CSS selectors pruned from the tree before extraction.
    pub prune_selectors: Vec<String>,

    /// Serialization format for `text`/`comments`.
    pub output_format: OutputFormat,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            focus: Focus::Balanced,
            include_comments: true,
            include_formatting: false,
            include_links: false,
            include_images: false,
            include_tables: true,
            fast: false,
            deduplicate: false,
            with_metadata: false,
            only_with_metadata: false,
            target_language: None,
            source_url: None,
            min_extracted_size: 250,
            min_output_size: 200,
            min_extracted_comm_size: 100,
            min_output_comm_size: 100,
            min_duplcheck_size: 100,
            max_repetitions: 2,
            max_file_size: 20_000_000,
            min_file_size: 200,
            author_blacklist: HashSet::new(),
            url_blacklist: HashSet::new(),
            prune_selectors: Vec::new(),
            output_format: OutputFormat::Txt,
        }
    }
}

impl ExtractionOptions {
    /// Apply the cross-field implications and return the effective options.
    ///
    /// Markdown output implies formatting; a URL blacklist, the
    /// metadata-required mode and TEI output all imply metadata extraction.
    /// Recall focus is kept as-is (it already overrides precision by
    /// construction of [`Focus`]).
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.output_format == OutputFormat::Markdown {
            self.include_formatting = true;
        }
        if !self.url_blacklist.is_empty()
            || self.only_with_metadata
            || matches!(
                self.output_format,
                OutputFormat::Json | OutputFormat::Xml | OutputFormat::XmlTei | OutputFormat::Csv
            )
        {
            self.with_metadata = true;
        }
        self
    }
}
