//! Text extraction from validated uploads.

use serde::Serialize;
use tracing::debug;

use docforge_core::{Error, Result, SubmissionMetadata, UploadedFile};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decoded text plus everything the generator needs to describe its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub text: String,
    pub metadata: SubmissionMetadata,
    /// Sanitized name of the uploaded file.
    pub source_filename: String,
    /// Size of the uploaded payload in bytes.
    pub source_size: u64,
}

impl ExtractionResult {
    /// Uppercase extension of the source file, e.g. `TXT`.
    pub fn original_format(&self) -> String {
        std::path::Path::new(&self.source_filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_uppercase())
            .unwrap_or_else(|| "TXT".to_string())
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}

/// Decode raw bytes as UTF-8, dropping a leading BOM and normalizing line endings.
pub fn decode_text(bytes: &[u8]) -> Result<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes).map_err(|e| {
        Error::Extraction(format!("invalid UTF-8 at byte {}", e.valid_up_to()))
    })?;

    if text.contains('\r') {
        Ok(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Ok(text.to_string())
    }
}

/// Extract the text of an already validated upload.
pub fn extract(file: &UploadedFile, metadata: &SubmissionMetadata) -> Result<ExtractionResult> {
    let text = decode_text(&file.bytes)?;
    let result = ExtractionResult {
        text,
        metadata: metadata.clone(),
        source_filename: crate::validate::sanitize_filename(&file.filename),
        source_size: file.size(),
    };
    debug!(
        "Extracted {} lines from {}",
        result.line_count(),
        result.source_filename
    );
    Ok(result)
}
