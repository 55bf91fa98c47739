// Text segmentation
//
// - Sentences: SentenceSegmenter trait, default implementation on Unicode
//   sentence boundaries with per-language refinements
// - Paragraphs: naive delimiter split over already extracted text

pub mod paragraph;
pub mod unicode;

pub use paragraph::{split_paragraph, split_paragraphs};
pub use unicode::UnicodeSentenceSegmenter;

use crate::config::SegmenterLanguage;

/// Splits raw text into trimmed sentences, in document order
pub trait SentenceSegmenter: Send + Sync {
    /// Segment `text`; identical input always yields identical output
    fn segment(&self, text: &str) -> Vec<String>;

    /// Language whose boundary rules this segmenter applies
    fn language(&self) -> SegmenterLanguage;
}

/// Factory for creating sentence segmenters
pub struct SegmenterFactory;

impl SegmenterFactory {
    pub fn create(language: SegmenterLanguage) -> Box<dyn SentenceSegmenter> {
        Box::new(UnicodeSentenceSegmenter::new(language))
    }
}
