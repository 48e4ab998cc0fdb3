//! Sliding-window text splitting.
//!
//! Text is first split on natural boundaries (paragraphs, lines, sentences, words) by
//! `semchunk-rs` into base windows of at most `chunk_size - overlap` characters. A second pass
//! prefixes each window with the tail of its predecessor, up to `overlap` characters, so spans
//! that straddle a boundary stay retrievable. The overlapped window is trimmed from the front
//! whenever the joining space would push it past `chunk_size`.

use semchunk_rs::Chunker;
use std::sync::Arc;

use super::types::ChunkingError;

type SizeCounter = Arc<dyn Fn(&str) -> usize + Send + Sync>;

/// Split `text` into windows of at most `chunk_size` characters overlapping by up to `overlap`.
///
/// Returns an empty vector when the input is all whitespace.
pub(crate) fn chunk_text(
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<String>, ChunkingError> {
    if chunk_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    if overlap >= chunk_size {
        return Err(ChunkingError::OverlapTooLarge {
            overlap,
            chunk_size,
        });
    }
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(chunk_text_with_counter(
        text,
        chunk_size,
        overlap,
        char_counter(),
    ))
}

fn char_counter() -> SizeCounter {
    Arc::new(|segment: &str| segment.chars().count())
}

fn chunk_text_with_counter(
    text: &str,
    chunk_size: usize,
    overlap: usize,
    counter: SizeCounter,
) -> Vec<String> {
    let counter_for_chunker = counter.clone();
    let base_size = chunk_size.saturating_sub(overlap).max(1);
    let chunker = Chunker::new(
        base_size,
        Box::new(move |segment: &str| counter_for_chunker.as_ref()(segment)),
    );
    let base_chunks: Vec<String> = chunker
        .chunk(text)
        .into_iter()
        .filter(|chunk| !chunk.trim().is_empty())
        .collect();
    apply_overlap(base_chunks, chunk_size, overlap, &counter)
}

/// Prefix every window after the first with the tail of the previous base window.
fn apply_overlap(
    chunks: Vec<String>,
    chunk_size: usize,
    overlap: usize,
    counter: &SizeCounter,
) -> Vec<String> {
    let effective_overlap = overlap.min(chunk_size.saturating_sub(1));
    if chunks.len() < 2 || effective_overlap == 0 {
        return chunks;
    }

    let mut overlapped = Vec::with_capacity(chunks.len());
    let mut previous: Option<String> = None;

    for current in chunks {
        let window = match &previous {
            Some(previous) => build_overlapped_chunk(
                previous,
                &current,
                effective_overlap,
                chunk_size,
                counter,
            ),
            None => current.clone(),
        };
        overlapped.push(window);
        previous = Some(current);
    }

    overlapped
}

fn build_overlapped_chunk(
    previous: &str,
    current: &str,
    overlap: usize,
    chunk_size: usize,
    counter: &SizeCounter,
) -> String {
    let tail = tail_within_limit(previous, overlap, counter);
    let mut combined = String::with_capacity(tail.len() + current.len() + 1);

    if !tail.is_empty() {
        combined.push_str(tail);
        if !ends_with_whitespace(tail) && !starts_with_whitespace(current) {
            combined.push(' ');
        }
    }

    combined.push_str(current);
    trim_to_budget(&combined, chunk_size, counter).to_string()
}

/// Longest suffix of `text` (leading whitespace dropped) whose size fits `limit`.
fn tail_within_limit<'a>(text: &'a str, limit: usize, counter: &SizeCounter) -> &'a str {
    if limit == 0 {
        return "";
    }

    for (start, _) in text.char_indices() {
        let candidate = text[start..].trim_start();
        if counter.as_ref()(candidate) <= limit {
            return candidate;
        }
    }

    ""
}

fn trim_to_budget<'a>(text: &'a str, budget: usize, counter: &SizeCounter) -> &'a str {
    if counter.as_ref()(text) <= budget {
        return text;
    }
    tail_within_limit(text, budget, counter)
}

fn starts_with_whitespace(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_whitespace)
}

fn ends_with_whitespace(text: &str) -> bool {
    text.chars().next_back().is_some_and(char::is_whitespace)
}
