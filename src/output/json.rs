//! JSON rendering of the extraction result.

use serde_json::json;

use crate::document::TextDocument;
use crate::output::txt;

/// Render the document as a JSON object with the canonical field names.
#[must_use]
pub fn render(document: &TextDocument) -> String {
    let meta = &document.metadata;
    let value = json!({
        "source": meta.url,
        "source-hostname": meta.hostname,
        "title": meta.title,
        "author": meta.author,
        "date": meta.date,
        "description": meta.description,
        "categories": meta.categories,
        "tags": meta.tags,
        "fingerprint": meta.fingerprint,
        "id": meta.id,
        "license": meta.license,
        "language": meta.language,
        "image": meta.image,
        "pagetype": meta.pagetype,
        "text": txt::render(&document.body),
        "comments": document.commentsbody.as_ref().map(txt::render),
    });
    value.to_string()
}
