//! Page-level text extraction backed by `lopdf`.

use super::types::LoadError;
use lopdf::Document;
use std::path::Path;

/// Text extracted from one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// One-based page number.
    pub number: u32,
    /// Extracted text, possibly empty for image-only pages.
    pub text: String,
}

/// Load a PDF from disk and return the text of every page in page order.
///
/// A page whose text cannot be decoded (for example a composite font without a `ToUnicode`
/// map) is kept with empty text so the remaining pages stay usable.
pub fn load_pages(path: &Path) -> Result<Vec<PageText>, LoadError> {
    let document = Document::load(path)?;
    Ok(extract_pages(&document))
}

fn extract_pages(document: &Document) -> Vec<PageText> {
    let pages = document.get_pages();
    let mut extracted = Vec::with_capacity(pages.len());
    let mut undecodable = 0usize;

    for &number in pages.keys() {
        let text = match document.extract_text(&[number]) {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(page = number, error = %error, "Skipping undecodable page text");
                undecodable += 1;
                String::new()
            }
        };
        extracted.push(PageText { number, text });
    }

    tracing::debug!(pages = extracted.len(), undecodable, "Extracted page text");
    extracted
}

/// Concatenate page texts with a blank line between pages, skipping blank pages.
pub fn join_pages(pages: &[PageText]) -> String {
    pages
        .iter()
        .map(|page| page.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
#[path = "../../tests/support/pdf.rs"]
pub(crate) mod fixtures;
