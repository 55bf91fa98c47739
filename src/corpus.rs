use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{DoclingoError, Result};
use crate::extract::{extract_text, DocumentFormat};

/// Extracted document texts keyed by file name
pub type Corpus = HashMap<String, String>;

/// Extract every file directly inside `dir`.
///
/// Entries are visited in directory-listing order. The first entry whose
/// extension is not docx, pdf or txt (subdirectories included) aborts the
/// whole scan, as does any extraction failure; no partial corpus is returned.
pub fn load_corpus<P: AsRef<Path>>(dir: P) -> Result<Corpus> {
    let dir = dir.as_ref();
    info!("Loading corpus from: {}", dir.display());

    if !dir.exists() {
        return Err(DoclingoError::FileNotFound(dir.display().to_string()));
    }
    if !dir.is_dir() {
        return Err(DoclingoError::Config(format!(
            "Input path is not a directory: {}",
            dir.display()
        )));
    }

    let mut corpus = Corpus::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            DoclingoError::Io(e.into_io_error().unwrap_or_else(|| {
                std::io::Error::other(format!("Failed to list {}", dir.display()))
            }))
        })?;
        let path = entry.path();

        // Reject before touching the file so the error names the offending entry
        DocumentFormat::from_path(path)?;
        if entry.file_type().is_dir() {
            return Err(DoclingoError::UnsupportedFormat(path.display().to_string()));
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        let text = extract_text(path)?;
        debug!("Extracted {} characters from {}", text.chars().count(), file_name);
        corpus.insert(file_name, text);
    }

    info!("Loaded {} documents", corpus.len());
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::docx::test_support::write_docx;
    use crate::extract::pdf::test_support::write_pdf;
    use assert_fs::prelude::*;

    #[test]
    fn test_mixed_directory_has_one_entry_per_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.txt").write_str("plain text, verbatim\n").unwrap();
        write_docx(temp.child("b.docx").path(), &["Para one", "Para two"]);
        write_pdf(temp.child("c.pdf").path(), &["Only page"]);

        let corpus = load_corpus(temp.path()).unwrap();

        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus["a.txt"], "plain text, verbatim\n");
        assert_eq!(corpus["b.docx"], " Para one\n\n Para two");
        assert_eq!(corpus["c.pdf"], " Only page\n");
    }

    #[test]
    fn test_unsupported_file_aborts_scan() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.txt").write_str("fine").unwrap();
        temp.child("slides.pptx").write_str("not supported").unwrap();

        let err = load_corpus(temp.path()).unwrap_err();
        match err {
            DoclingoError::UnsupportedFormat(name) => assert!(name.ends_with("slides.pptx")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_subdirectory_is_unsupported() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("nested").create_dir_all().unwrap();

        let err = load_corpus(temp.path()).unwrap_err();
        assert!(matches!(err, DoclingoError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_broken_document_propagates_extraction_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("broken.docx").write_str("not a zip").unwrap();

        let err = load_corpus(temp.path()).unwrap_err();
        assert!(matches!(err, DoclingoError::Extraction { .. }));
    }

    #[test]
    fn test_empty_directory() {
        let temp = assert_fs::TempDir::new().unwrap();
        assert!(load_corpus(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_file_path_is_config_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("a.txt");
        file.write_str("not a directory").unwrap();

        let err = load_corpus(file.path()).unwrap_err();
        assert!(matches!(err, DoclingoError::Config(_)));
    }

    #[test]
    fn test_missing_directory() {
        let err = load_corpus("/definitely/not/here").unwrap_err();
        assert!(matches!(err, DoclingoError::FileNotFound(_)));
    }
}
