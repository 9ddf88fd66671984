//! Overlapping text chunking.
//!
//! Target chunk size is ~500 characters with ~50 characters of overlap
//! between consecutive chunks. Chunk boundaries prefer whitespace so a
//! chunk rarely cuts a word in half, and always land on a UTF-8
//! character boundary.

/// How far back from the target boundary we search for whitespace
/// before giving up and cutting mid-word.
const BREAK_SEARCH_WINDOW: usize = 60;

/// Split `text` into overlapping chunks.
///
/// `overlap` must be smaller than `chunk_size` (enforced by config
/// validation). Leading/trailing whitespace is trimmed from each chunk;
/// empty chunks are dropped.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if text.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < text.len() {
        let hard_end = (start + chunk_size).min(text.len());
        let end = if hard_end == text.len() {
            hard_end
        } else {
            break_point(text, hard_end)
        };

        let chunk = text[start..end].trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        if end == text.len() {
            break;
        }

        // Step forward, keeping `overlap` characters of context. The
        // boundary floor can round back onto `start` in multibyte text,
        // so strict progress is enforced by stepping to the next char
        // boundary when that happens.
        let next = end.saturating_sub(overlap).max(start + 1);
        let advanced = floor_char_boundary(text, next);
        start = if advanced > start {
            advanced
        } else {
            ceil_char_boundary(text, start + 1)
        };
    }

    chunks
}

/// Find a chunk boundary at or before `pos`, preferring whitespace
/// within the search window and always landing on a char boundary.
fn break_point(text: &str, pos: usize) -> usize {
    let pos = floor_char_boundary(text, pos);
    let window_start = floor_char_boundary(text, pos.saturating_sub(BREAK_SEARCH_WINDOW));

    text[window_start..pos]
        .rfind(char::is_whitespace)
        .map(|offset| window_start + offset)
        .filter(|&b| b > window_start)
        .unwrap_or(pos)
}

/// Largest index `<= pos` that is a UTF-8 character boundary.
fn floor_char_boundary(text: &str, mut pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    while pos > 0 && !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Smallest index `>= pos` that is a UTF-8 character boundary.
fn ceil_char_boundary(text: &str, mut pos: usize) -> usize {
    while pos < text.len() && !text.is_char_boundary(pos) {
        pos += 1;
    }
    pos.min(text.len())
}
