use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;
use std::path::Path;

use super::{extraction_error, join_units, DocumentFormat, DocumentReader};
use crate::error::Result;

const DOCUMENT_PART: &str = "word/document.xml";

/// Word-processor (.docx) reader: one unit per body paragraph
pub struct DocxReader;

impl DocumentReader for DocxReader {
    fn read_text(&self, path: &Path) -> Result<String> {
        let file = std::fs::File::open(path)?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| extraction_error(path, e))?;
        let mut part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| extraction_error(path, format!("{}: {}", DOCUMENT_PART, e)))?;

        let mut xml = String::new();
        part.read_to_string(&mut xml)
            .map_err(|e| extraction_error(path, format!("{}: {}", DOCUMENT_PART, e)))?;

        let paragraphs = body_paragraphs(&xml).map_err(|reason| extraction_error(path, reason))?;
        Ok(join_units(paragraphs))
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::WordProcessor
    }
}

/// Collect the text of every `w:p` that is a direct child of `w:body`, in document order.
///
/// Text comes from `w:t` runs (hyperlinks and insertions included); run-level
/// `w:tab` becomes a tab and `w:br`/`w:cr` a newline. Text boxes anchored inside
/// a paragraph and tables are not part of the body paragraph list.
fn body_paragraphs(xml: &str) -> std::result::Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    // Stack depth at which the open body paragraph started, and its text so far
    let mut current: Option<(usize, String)> = None;
    let mut in_text = false;
    let mut paragraphs = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| e.to_string())?;
        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                match current {
                    None if name == b"p" && parent_is(&stack, b"body") => {
                        current = Some((stack.len(), String::new()));
                    }
                    Some((depth, _)) if name == b"t" && in_run(&stack, depth) => {
                        in_text = true;
                    }
                    _ => {}
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name();
                match (&mut current, name.as_ref()) {
                    (None, b"p") if parent_is(&stack, b"body") => paragraphs.push(String::new()),
                    (Some((depth, text)), b"tab") if in_run(&stack, *depth) => text.push('\t'),
                    (Some((depth, text)), b"br" | b"cr") if in_run(&stack, *depth) => text.push('\n'),
                    _ => {}
                }
            }
            Event::Text(t) => {
                if in_text {
                    if let Some((_, text)) = current.as_mut() {
                        let unescaped = t.unescape().map_err(|e| e.to_string())?;
                        text.push_str(&unescaped);
                    }
                }
            }
            Event::CData(t) => {
                if in_text {
                    if let Some((_, text)) = current.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                    }
                }
            }
            Event::End(_) => {
                let name = stack.pop().unwrap_or_default();
                if name == b"t" {
                    in_text = false;
                }
                if name == b"p" {
                    if let Some((depth, _)) = current {
                        if depth == stack.len() {
                            if let Some((_, text)) = current.take() {
                                paragraphs.push(text);
                            }
                        }
                    }
                }
            }
            Event::Eof => {
                if !stack.is_empty() || current.is_some() {
                    return Err(format!("unexpected end of {}", DOCUMENT_PART));
                }
                break;
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn parent_is(stack: &[Vec<u8>], name: &[u8]) -> bool {
    stack.last().is_some_and(|parent| parent.as_slice() == name)
}

/// True when the innermost element is a run of the open paragraph, not of a nested text box
fn in_run(stack: &[Vec<u8>], paragraph_depth: usize) -> bool {
    parent_is(stack, b"r")
        && !stack[paragraph_depth..]
            .iter()
            .any(|name| name.as_slice() == b"txbxContent")
}
