//! Output format integration tests.

use websift::{extract, ExtractionOptions, OutputFormat};

const PAGE: &str = concat!(
    "<html><head>",
    r#"<meta property="og:title" content="Format Test">"#,
    r#"<meta property="og:site_name" content="Example Site">"#,
    r#"<link rel="canonical" href="https://example.org/formats">"#,
    "</head><body><article>",
    "<h1>Format Test</h1>",
    "<p>A paragraph long enough to clear every extraction threshold without effort, ",
    "so that each serializer has real content to work with.</p>",
    "<p>A second paragraph so the output has more than one block to serialize.</p>",
    "</article></body></html>",
);

fn options(format: OutputFormat) -> ExtractionOptions {
    ExtractionOptions {
        output_format: format,
        min_file_size: 10,
        min_output_size: 20,
        min_extracted_size: 50,
        ..ExtractionOptions::default()
    }
}

#[test]
fn txt_output() {
    let text = extract(PAGE, &options(OutputFormat::Txt)).unwrap();
    assert!(text.contains("Format Test"));
    assert!(!text.contains('<'));
}

#[test]
fn markdown_output_has_heading() {
    let md = extract(PAGE, &options(OutputFormat::Markdown)).unwrap();
    assert!(md.contains("# Format Test"));
}

#[test]
fn json_output_fields() {
    let json = extract(PAGE, &options(OutputFormat::Json)).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["title"], "Format Test");
    assert_eq!(parsed["source"], "https://example.org/formats");
    assert_eq!(parsed["source-hostname"], "example.org");
    assert!(parsed["text"].as_str().unwrap().contains("paragraph long enough"));
    assert!(parsed["fingerprint"].as_str().unwrap().len() == 16);
}

#[test]
fn xml_output_structure() {
    let xml = extract(PAGE, &options(OutputFormat::Xml)).unwrap();
    assert!(xml.starts_with("<doc"));
    assert!(xml.contains(r#"title="Format Test""#));
    assert!(xml.contains("<main>"));
    assert!(xml.contains("<p>"));
}

#[test]
fn tei_output_structure() {
    let tei = extract(PAGE, &options(OutputFormat::XmlTei)).unwrap();
    assert!(tei.starts_with(r#"<TEI xmlns="http://www.tei-c.org/ns/1.0">"#));
    assert!(tei.contains("<teiHeader>"));
    assert!(tei.contains(r#"<div type="entry">"#));
    // Headings are retagged for TEI.
    assert!(tei.contains(r#"<ab type="header""#));
}

#[test]
fn csv_output_structure() {
    let csv = extract(PAGE, &options(OutputFormat::Csv)).unwrap();
    let mut lines = csv.lines();
    let header = lines.next().unwrap();
    assert_eq!(
        header,
        "url\tid\tfingerprint\thostname\ttitle\timage\tdate\ttext\tcomments\tlicense\tpagetype"
    );
    let record = lines.next().unwrap();
    assert!(record.starts_with("https://example.org/formats\t"));
}

#[test]
fn html_output_renders_tags() {
    let html = extract(PAGE, &options(OutputFormat::Html)).unwrap();
    assert!(html.contains("<h1>Format Test</h1>") || html.contains("<h1>"));
    assert!(html.contains("<p>"));
}
