use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Source language, overrides the configuration
    #[arg(long, global = true)]
    pub source: Option<String>,

    /// Target language, overrides the configuration
    #[arg(long, global = true)]
    pub target: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the text of every document in a directory (printed as JSON)
    Extract {
        /// Directory containing only docx, pdf and txt files
        #[arg(short, long)]
        input_dir: PathBuf,
    },

    /// Print the sentences of a document, one per line
    Sentences {
        /// Input document
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Split a document on a paragraph delimiter (printed as JSON)
    Paragraphs {
        /// Input document
        #[arg(short, long)]
        input: PathBuf,

        /// Delimiter; \n, \t and \\ escapes are understood
        #[arg(short, long, default_value = "\\n\\n")]
        delimiter: String,
    },

    /// Translate text or a document with the configured model
    Translate {
        /// Text to translate
        #[arg(short, long, conflicts_with = "input", required_unless_present = "input")]
        text: Option<String>,

        /// Document to segment, chunk and translate
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Translate from the target language back to the source language
        #[arg(short, long)]
        reverse: bool,
    },

    /// Check that the model backend is reachable and the model is available
    Check,
}

/// Expand `\n`, `\t`, `\r` and `\\` in a delimiter given on the command line
pub fn unescape_delimiter(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}
