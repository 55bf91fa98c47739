use thiserror::Error;

#[derive(Error, Debug)]
pub enum DoclingoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unsupported format: {0} (supported: docx, pdf, txt)")]
    UnsupportedFormat(String),

    #[error("Failed to extract text from {path}: {reason}")]
    Extraction { path: String, reason: String },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model backend error: {0}")]
    Backend(String),

    #[error("Prompt needs about {estimated} tokens but the context window is {limit}")]
    ContextOverflow { estimated: usize, limit: usize },

    #[error("Model returned no choices")]
    EmptyCompletion,

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
}

pub type Result<T> = std::result::Result<T, DoclingoError>;
