use lopdf::Document;
use std::path::Path;
use tracing::debug;

use super::{extraction_error, join_units, DocumentFormat, DocumentReader};
use crate::error::Result;

/// PDF reader: one unit per page, in page order
pub struct PdfReader;

impl DocumentReader for PdfReader {
    fn read_text(&self, path: &Path) -> Result<String> {
        let document = Document::load(path).map_err(|e| extraction_error(path, e))?;
        if document.is_encrypted() {
            return Err(extraction_error(path, "document is encrypted"));
        }

        // BTreeMap keyed by page number, so iteration is already in page order
        let pages = document.get_pages();
        debug!("{} has {} pages", path.display(), pages.len());

        let mut texts = Vec::with_capacity(pages.len());
        for page_number in pages.keys() {
            let text = document
                .extract_text(&[*page_number])
                .map_err(|e| extraction_error(path, format!("page {}: {}", page_number, e)))?;
            texts.push(text);
        }

        Ok(join_units(texts))
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::write_pdf;
    use super::*;
    use crate::error::DoclingoError;

    #[test]
    fn test_pages_prefixed_and_joined_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.pdf");
        write_pdf(&path, &["First page", "Second page"]);

        // lopdf ends each page's text with a newline
        let text = PdfReader.read_text(&path).unwrap();
        assert_eq!(text, " First page\n\n\n Second page\n");
    }

    #[test]
    fn test_garbage_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, "%PDF-1.5 truncated").unwrap();

        let err = PdfReader.read_text(&path).unwrap_err();
        assert!(matches!(err, DoclingoError::Extraction { .. }));
    }
}
