//! Whitespace normalization and chunking of extracted document text.
//!
//! Speech engines handle bounded inputs far more reliably than one giant
//! string, so the pipeline slices the normalized text into fixed-size
//! chunks. Both the recording and the speaking pass call [`chunk_text`]
//! independently; there is no shared cursor between them.

/// Upper bound on the character length of a single chunk.
pub const MAX_CHUNK_CHARS: usize = 1200;

/// Collapse every whitespace run to a single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Slice `text` (normalized first) into consecutive chunks of at most
/// `max_chars` characters. Empty text yields no chunks. `max_chars` must
/// be greater than zero.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let normalized = normalize_whitespace(text);
    if normalized.is_empty() {
        return Vec::new();
    }
    let chars: Vec<char> = normalized.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
