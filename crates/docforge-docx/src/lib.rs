//! DocForge Docx — deterministic WordprocessingML package generation.

pub mod generator;
pub mod parts;
pub mod xml;

pub use generator::{generate, GeneratedDocument, DOCX_MEDIA_TYPE};
