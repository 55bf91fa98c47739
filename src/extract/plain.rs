use std::path::Path;

use super::{extraction_error, DocumentFormat, DocumentReader};
use crate::error::Result;

/// Plain text files are returned verbatim
pub struct PlainTextReader;

impl DocumentReader for PlainTextReader {
    fn read_text(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)?;
        String::from_utf8(bytes).map_err(|e| extraction_error(path, format!("invalid UTF-8: {}", e)))
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::PlainText
    }
}
