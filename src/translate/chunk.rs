//! Token estimates and sentence-bounded chunking.
//!
//! The estimate is a heuristic, not the model's tokenizer: Hangul, kana and
//! CJK ideographs count as one token each, every other character as a
//! quarter token. Chunks are built greedily from whole sentences so that no
//! chunk's estimate exceeds the budget.

use unicode_segmentation::UnicodeSegmentation;

use super::ChatMessage;

/// Tokens a chat template adds around each message
pub const MESSAGE_OVERHEAD_TOKENS: usize = 4;

/// Approximate token count of `text`
pub fn estimate_tokens(text: &str) -> usize {
    let quarters: usize = text
        .chars()
        .map(|c| if is_dense(c) { 4 } else { 1 })
        .sum();
    quarters.div_ceil(4)
}

/// Approximate token count of a whole message list, template overhead included
pub fn estimate_messages(messages: &[ChatMessage]) -> usize {
    messages
        .iter()
        .map(|message| estimate_tokens(&message.content) + MESSAGE_OVERHEAD_TOKENS)
        .sum()
}

fn is_dense(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x11FF     // Hangul Jamo
        | 0x3000..=0x303F   // CJK symbols and punctuation
        | 0x3040..=0x30FF   // Hiragana, Katakana
        | 0x3130..=0x318F   // Hangul compatibility Jamo
        | 0x3400..=0x4DBF   // CJK extension A
        | 0x4E00..=0x9FFF   // CJK unified ideographs
        | 0xAC00..=0xD7A3   // Hangul syllables
        | 0xFF00..=0xFFEF   // Halfwidth and fullwidth forms
    )
}

/// Group sentences into chunks whose estimate stays within `budget`.
///
/// Sentences are joined with a single space and never split across chunks,
/// except a sentence that alone exceeds the budget: it is cut on word bounds.
/// A single word larger than the budget becomes its own chunk.
pub fn chunk_sentences<S: AsRef<str>>(sentences: &[S], budget: usize) -> Vec<String> {
    let budget = budget.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in sentences {
        let sentence = sentence.as_ref().trim();
        if sentence.is_empty() {
            continue;
        }

        if estimate_tokens(sentence) > budget {
            flush(&mut chunks, &mut current);
            chunks.extend(split_oversized(sentence, budget));
            continue;
        }

        if current.is_empty() {
            current.push_str(sentence);
            continue;
        }

        let candidate = format!("{} {}", current, sentence);
        if estimate_tokens(&candidate) > budget {
            flush(&mut chunks, &mut current);
            current.push_str(sentence);
        } else {
            current = candidate;
        }
    }
    flush(&mut chunks, &mut current);

    chunks
}

fn split_oversized(sentence: &str, budget: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for word in sentence.split_word_bounds() {
        let fits = estimate_tokens(&current) + estimate_tokens(word) <= budget;
        if !fits && !current.trim().is_empty() {
            flush(&mut pieces, &mut current);
        }
        current.push_str(word);
    }
    flush(&mut pieces, &mut current);

    pieces
}

fn flush(chunks: &mut Vec<String>, current: &mut String) {
    let chunk = current.trim();
    if !chunk.is_empty() {
        chunks.push(chunk.to_string());
    }
    current.clear();
}
