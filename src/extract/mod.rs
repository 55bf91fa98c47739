// Document text extraction
//
// Each supported format has its own reader behind the DocumentReader trait:
// - PlainText: file content verbatim
// - WordProcessor: body paragraphs of an OOXML (.docx) package
// - Pdf: plain text of every page
//
// Paragraph and page units are each prefixed with a single space and joined
// with a blank line. All readers return native UTF-8 text.

pub mod docx;
pub mod pdf;
pub mod plain;

use std::path::Path;
use tracing::debug;

use crate::error::{DoclingoError, Result};

/// Separator placed between extracted paragraphs or pages
pub const UNIT_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    WordProcessor,
    Pdf,
}

impl DocumentFormat {
    /// Detect the format from the file extension (ASCII case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("txt") => Ok(Self::PlainText),
            Some("docx") => Ok(Self::WordProcessor),
            Some("pdf") => Ok(Self::Pdf),
            _ => Err(DoclingoError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::PlainText => "txt",
            Self::WordProcessor => "docx",
            Self::Pdf => "pdf",
        }
    }
}

/// Reads the textual content of one document format
pub trait DocumentReader: Send + Sync {
    /// Read the full text of the document at `path`
    fn read_text(&self, path: &Path) -> Result<String>;

    /// Format handled by this reader
    fn format(&self) -> DocumentFormat;
}

/// Factory for creating document readers
pub struct ReaderFactory;

impl ReaderFactory {
    pub fn create_reader(format: DocumentFormat) -> Box<dyn DocumentReader> {
        match format {
            DocumentFormat::PlainText => Box::new(plain::PlainTextReader),
            DocumentFormat::WordProcessor => Box::new(docx::DocxReader),
            DocumentFormat::Pdf => Box::new(pdf::PdfReader),
        }
    }
}

/// Extract the text of a single file, dispatching on its extension
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let format = DocumentFormat::from_path(path)?;

    if !path.is_file() {
        return Err(DoclingoError::FileNotFound(path.display().to_string()));
    }

    debug!("Extracting {} as {}", path.display(), format.extension());
    ReaderFactory::create_reader(format).read_text(path)
}

/// Prefix every unit with a single space and join them with a blank line
pub(crate) fn join_units<I, S>(units: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    units
        .into_iter()
        .map(|unit| format!(" {}", unit.as_ref()))
        .collect::<Vec<_>>()
        .join(UNIT_SEPARATOR)
}

pub(crate) fn extraction_error(path: &Path, reason: impl ToString) -> DoclingoError {
    DoclingoError::Extraction {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
