//! doclingo - Document Translation with Local Language Models
//!
//! Extracts text from docx, pdf and txt files, segments it into sentences,
//! and translates it in both directions between a fixed language pair using
//! a chat-completion model served by ollama or llama.cpp.

pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod extract;
pub mod segment;
pub mod setup;
pub mod translate;
