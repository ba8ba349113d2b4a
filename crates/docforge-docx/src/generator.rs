//! Renders an [`ExtractionResult`] into a `.docx` package.
//!
//! Output depends only on the extraction result: ZIP entries carry a fixed
//! timestamp and permissions, and the document body contains no clock
//! readings, so identical inputs yield byte-identical packages.

use std::io::{Cursor, Write};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use docforge_core::{Error, Result};
use docforge_ingest::ExtractionResult;

use crate::parts;
use crate::xml::{Align, BodyBuilder};

/// Media type of the generated artifact.
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const TITLE: &str = "Extracted Document";

/// A generated `.docx` package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedDocument {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Hex SHA-256 of `bytes`.
    pub sha256: String,
}

impl GeneratedDocument {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Build the `.docx` package for an extraction result.
pub fn generate(extraction: &ExtractionResult) -> Result<GeneratedDocument> {
    let document = render_document(extraction);
    let core = parts::core_properties(
        TITLE,
        &extraction.metadata.issuer_id,
        &format!("Converted from {}", extraction.source_filename),
    );

    let entries: [(&str, &str); 6] = [
        ("[Content_Types].xml", parts::CONTENT_TYPES),
        ("_rels/.rels", parts::PACKAGE_RELS),
        ("docProps/core.xml", core.as_str()),
        ("word/document.xml", document.as_str()),
        ("word/_rels/document.xml.rels", parts::DOCUMENT_RELS),
        ("word/styles.xml", parts::STYLES),
    ];

    let bytes = write_package(&entries)?;
    let sha256 = hex::encode(Sha256::digest(&bytes));
    debug!(
        "Generated {} byte document for {} (sha256={})",
        bytes.len(),
        extraction.source_filename,
        sha256
    );

    Ok(GeneratedDocument { bytes, sha256 })
}

/// `word/document.xml`: title, metadata table, content, footer.
fn render_document(extraction: &ExtractionResult) -> String {
    let metadata_rows = [
        ("Original File", extraction.source_filename.clone()),
        ("File Size", format!("{} bytes", group_thousands(extraction.source_size))),
        ("Issuer ID", extraction.metadata.issuer_id.clone()),
        ("User Email", extraction.metadata.user_email.clone()),
        ("Original Format", extraction.original_format()),
    ];

    let mut body = BodyBuilder::new();
    body.styled("Title", Align::Center, TITLE)
        .styled("Heading1", Align::Left, "Document Information")
        .key_value_table(&metadata_rows)
        .page_break()
        .styled("Heading1", Align::Left, "Document Content");

    for line in extraction.text.split('\n') {
        body.paragraph(line);
    }

    body.page_break().italic(
        Align::Center,
        &format!("Generated by DocForge for issuer {}", extraction.metadata.issuer_id),
    );
    body.finish()
}

fn write_package(entries: &[(&str, &str)]) -> Result<Vec<u8>> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        zip.start_file(*name, options)
            .map_err(|e| Error::Generation(format!("failed to start {}: {}", name, e)))?;
        zip.write_all(content.as_bytes())
            .map_err(|e| Error::Generation(format!("failed to write {}: {}", name, e)))?;
    }
    let cursor = zip
        .finish()
        .map_err(|e| Error::Generation(format!("failed to finish package: {}", e)))?;
    Ok(cursor.into_inner())
}

/// `1234567` → `1,234,567`.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use docforge_core::SubmissionMetadata;
    use std::io::Read;

    fn extraction(text: &str) -> ExtractionResult {
        ExtractionResult {
            text: text.to_string(),
            metadata: SubmissionMetadata::new("I-1", "a@b.com"),
            source_filename: "notes.txt".to_string(),
            source_size: text.len() as u64,
        }
    }

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut out = String::new();
        entry.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_package_layout() {
        let doc = generate(&extraction("hello")).unwrap();
        assert!(!doc.is_empty());
        assert_eq!(&doc.bytes[..2], b"PK");

        let archive = zip::ZipArchive::new(Cursor::new(&doc.bytes[..])).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for expected in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "word/document.xml",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
        ] {
            assert!(names.contains(&expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_document_contains_text_and_metadata() {
        let doc = generate(&extraction("first line\nsecond line")).unwrap();
        let xml = read_entry(&doc.bytes, "word/document.xml");

        assert!(xml.contains("Extracted Document"));
        assert!(xml.contains(">first line<"));
        assert!(xml.contains(">second line<"));
        assert!(xml.contains(">I-1<"));
        assert!(xml.contains(">a@b.com<"));
        assert!(xml.contains(">notes.txt<"));
        assert!(xml.contains(">22 bytes<"));
        assert!(xml.contains(">TXT<"));

        let core = read_entry(&doc.bytes, "docProps/core.xml");
        assert!(core.contains("<dc:creator>I-1</dc:creator>"));
    }

    #[test]
    fn test_markup_is_escaped() {
        let doc = generate(&extraction("<b>bold</b> & \u{1}done")).unwrap();
        let xml = read_entry(&doc.bytes, "word/document.xml");
        assert!(xml.contains("&lt;b&gt;bold&lt;/b&gt; &amp; done"));
        assert!(!xml.contains("<b>bold"));
    }

    #[test]
    fn test_deterministic() {
        let a = generate(&extraction("same input\nsame output")).unwrap();
        let b = generate(&extraction("same input\nsame output")).unwrap();
        assert_eq!(a.bytes, b.bytes);
        assert_eq!(a.sha256, b.sha256);

        let c = generate(&extraction("different input")).unwrap();
        assert_ne!(a.sha256, c.sha256);
    }

    #[test]
    fn test_metadata_changes_output() {
        let a = extraction("text");
        let mut b = extraction("text");
        b.metadata.user_email = "c@d.org".to_string();
        assert_ne!(generate(&a).unwrap().bytes, generate(&b).unwrap().bytes);
    }

    #[test]
    fn test_empty_text() {
        let doc = generate(&extraction("")).unwrap();
        let xml = read_entry(&doc.bytes, "word/document.xml");
        assert!(xml.contains("Document Content"));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(10_485_760), "10,485,760");
    }
}
