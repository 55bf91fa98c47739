use unicode_segmentation::UnicodeSegmentation;

use super::SentenceSegmenter;
use crate::config::SegmenterLanguage;

/// Abbreviations after which an English sentence boundary is ignored
const ENGLISH_ABBREVIATIONS: &[&str] = &[
    "mr.", "mrs.", "ms.", "dr.", "prof.", "st.", "jr.", "sr.", "vs.", "e.g.", "i.e.", "no.",
];

/// Sentence segmentation on Unicode (UAX #29) sentence boundaries
pub struct UnicodeSentenceSegmenter {
    language: SegmenterLanguage,
}

impl UnicodeSentenceSegmenter {
    pub fn new(language: SegmenterLanguage) -> Self {
        Self { language }
    }

    /// Whether the boundary after `pending` should be ignored for this language
    fn joins_next(&self, pending: &str, bound: &str) -> bool {
        match self.language {
            SegmenterLanguage::English => {
                !bound.ends_with(['\n', '\r', '\u{2029}']) && ends_with_abbreviation(pending)
            }
            SegmenterLanguage::Korean | SegmenterLanguage::Generic => false,
        }
    }
}

impl SentenceSegmenter for UnicodeSentenceSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut pending = String::new();

        for bound in text.split_sentence_bounds() {
            pending.push_str(bound);
            if self.joins_next(&pending, bound) {
                continue;
            }
            push_trimmed(&mut sentences, &pending);
            pending.clear();
        }
        push_trimmed(&mut sentences, &pending);

        sentences
    }

    fn language(&self) -> SegmenterLanguage {
        self.language
    }
}

fn push_trimmed(sentences: &mut Vec<String>, pending: &str) {
    let sentence = pending.trim();
    if !sentence.is_empty() {
        sentences.push(sentence.to_string());
    }
}

fn ends_with_abbreviation(text: &str) -> bool {
    text.split_whitespace()
        .last()
        .map(|word| word.trim_start_matches(['(', '"', '\'', '“', '‘']).to_lowercase())
        .is_some_and(|word| ENGLISH_ABBREVIATIONS.contains(&word.as_str()))
}
