//! CSV (tab-separated) rendering.

use crate::document::TextDocument;
use crate::output::txt;

const DELIMITER: char = '\t';

/// Quote-escape a field when it contains the delimiter, quotes or
/// newlines; inner quotes are doubled.
fn escape_field(field: &str) -> String {
    if field.contains(DELIMITER) || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render the document as one tab-separated record with a header line.
#[must_use]
pub fn render(document: &TextDocument) -> String {
    let meta = &document.metadata;
    let columns = [
        meta.url.clone().unwrap_or_default(),
        meta.id.clone().unwrap_or_default(),
        meta.fingerprint.clone().unwrap_or_default(),
        meta.hostname.clone().unwrap_or_default(),
        meta.title.clone().unwrap_or_default(),
        meta.image.clone().unwrap_or_default(),
        meta.date.clone().unwrap_or_default(),
        txt::render(&document.body),
        document
            .commentsbody
            .as_ref()
            .map(txt::render)
            .unwrap_or_default(),
        meta.license.clone().unwrap_or_default(),
        meta.pagetype.clone().unwrap_or_default(),
    ];

    let header = [
        "url",
        "id",
        "fingerprint",
        "hostname",
        "title",
        "image",
        "date",
        "text",
        "comments",
        "license",
        "pagetype",
    ]
    .join(&DELIMITER.to_string());

    let record: Vec<String> = columns.iter().map(|c| escape_field(c)).collect();
    format!("{header}\n{}", record.join(&DELIMITER.to_string()))
}
