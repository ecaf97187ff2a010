//! Grapheme segmentation of incoming chunks.
//!
//! Splits text into user-perceived characters so the reveal never shows half
//! of a combining sequence, a ZWJ emoji, or a flag. Every segmenter satisfies
//! the round-trip invariant: concatenating the output yields the input.

use serde::Deserialize;
use unicode_segmentation::UnicodeSegmentation;

/// Split `text` into extended grapheme clusters.
///
/// ```
/// # use tokflow::reveal::segment::segment;
/// assert_eq!(segment("e\u{301}x"), vec!["e\u{301}", "x"]);
/// assert!(segment("").is_empty());
/// ```
pub fn segment(text: &str) -> Vec<&str> {
    text.graphemes(true).collect()
}

/// Split `text` into one unit per Unicode scalar value.
///
/// Fallback used when grapheme segmentation is disabled.
///
/// ```
/// # use tokflow::reveal::segment::segment_codepoints;
/// assert_eq!(segment_codepoints("e\u{301}"), vec!["e", "\u{301}"]);
/// ```
pub fn segment_codepoints(text: &str) -> Vec<&str> {
    text.char_indices()
        .map(|(start, ch)| &text[start..start + ch.len_utf8()])
        .collect()
}

/// Segmentation strategy used by a reveal scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segmenter {
    /// Extended grapheme clusters (default).
    #[default]
    Graphemes,
    /// One unit per code point.
    Codepoints,
}

impl Segmenter {
    /// Segment `text` with this strategy.
    pub fn segment<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self {
            Segmenter::Graphemes => segment(text),
            Segmenter::Codepoints => segment_codepoints(text),
        }
    }
}
