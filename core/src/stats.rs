use serde::{Deserialize, Serialize};

/// Counters gathered during one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripStats {
    /// Characters pulled from the source.
    pub chars_read: u64,
    /// Characters handed to the caller.
    pub chars_emitted: u64,
    /// Outermost comments that were closed. Nested comments count once.
    pub comments_removed: u64,
    /// Deepest nesting level reached.
    pub max_depth: usize,
    /// The input ended while a comment was still open.
    pub unterminated: bool,
    /// Line breaks emitted from inside comments.
    pub line_breaks_preserved: u64,
}

impl StripStats {
    /// Characters dropped from the output.
    pub fn chars_removed(&self) -> u64 {
        self.chars_read.saturating_sub(self.chars_emitted)
    }

    /// Whether the scan found anything to strip.
    pub fn stripped_anything(&self) -> bool {
        self.comments_removed > 0 || self.unterminated
    }
}
