//! Match highlighting

use serde::{Deserialize, Serialize};

/// Half-open character range `[start, end)` of a matched substring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
}

/// Non-overlapping, leftmost-first occurrences of `term` in `text`.
///
/// Matching is case-insensitive. Offsets count chars of `text` itself, so a
/// char whose lowercase form is longer (`İ` lowers to two chars) still maps
/// back to one position. A match that starts or ends inside such an
/// expansion covers the whole original char.
pub fn find_highlights(text: &str, term: &str) -> Vec<Highlight> {
    let needle: String = term.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return Vec::new();
    }
    let needle_chars = needle.chars().count();

    // origin[i] is the char index in `text` that lowered char i came from
    let mut haystack = String::with_capacity(text.len());
    let mut origin = Vec::with_capacity(text.len());
    for (idx, c) in text.chars().enumerate() {
        for lower in c.to_lowercase() {
            haystack.push(lower);
            origin.push(idx);
        }
    }

    let mut highlights = Vec::new();
    let mut last_byte = 0;
    let mut last_char = 0;
    for (byte_idx, _) in haystack.match_indices(&needle) {
        last_char += haystack[last_byte..byte_idx].chars().count();
        last_byte = byte_idx;
        let end = last_char + needle_chars;
        highlights.push(Highlight {
            start: origin[last_char],
            end: origin[end - 1] + 1,
        });
    }
    highlights
}

/// Wrap each highlighted span of `text` in `open`/`close` markers.
///
/// Spans are applied in the order given; a span that overlaps an earlier one
/// or runs past the end of the text is clipped.
pub fn highlight_text(text: &str, highlights: &[Highlight], open: &str, close: &str) -> String {
    if highlights.is_empty() {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + highlights.len() * (open.len() + close.len()));
    let mut cursor = 0;
    for span in highlights {
        let start = span.start.clamp(cursor, chars.len());
        let end = span.end.clamp(start, chars.len());
        if start == end {
            continue;
        }
        out.extend(&chars[cursor..start]);
        out.push_str(open);
        out.extend(&chars[start..end]);
        out.push_str(close);
        cursor = end;
    }
    out.extend(&chars[cursor..]);
    out
}
