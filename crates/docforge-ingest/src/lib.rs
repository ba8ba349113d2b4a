//! DocForge Ingest — upload validation and text extraction.

pub mod extract;
pub mod validate;

pub use extract::{decode_text, extract, ExtractionResult};
pub use validate::{sanitize_filename, Validator};
