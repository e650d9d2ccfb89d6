//! Streaming removal of `/* ... */` block comments from SQL scripts.
//!
//! This crate provides a single-pass lexer that drops block comments while
//! leaving every other character, whitespace and line breaks included,
//! exactly as it was:
//!
//! - [`CommentStrippingReader`] — the state machine. Wraps a UTF-8 byte
//!   source ([`CommentStrippingReader::new`]), a string
//!   ([`CommentStrippingReader::from_text`]) or any decoded character source
//!   ([`CommentStrippingReader::from_chars`]), and yields the cleaned text all
//!   at once or character by character.
//! - [`Utf8Chars`] — incremental UTF-8 decoder used for byte sources.
//! - [`StripOptions`] / [`StripStats`] — per-scan knobs and counters.
//!
//! Comments nest: an inner `*/` closes only the innermost comment. A comment
//! left open at end of input silently swallows the rest of the script. A `*/`
//! outside any comment is plain text. The lexer knows nothing else about SQL;
//! in particular it does not track string literals, so `'/*'` inside a
//! literal opens a comment.
//!
//! # Example
//!
//! ```
//! use sqlstrip_core::strip_comments;
//!
//! let script = "\
//! select id, /* legacy */ name
//! from users /* todo: /* index */ this */
//! where note = '*/';
//! ";
//!
//! assert_eq!(
//!     strip_comments(script),
//!     "select id,  name\nfrom users \nwhere note = '*/';\n",
//! );
//! ```

mod decode;
mod error;
mod options;
mod reader;
mod stats;

pub use decode::Utf8Chars;
pub use error::{Result, StripError};
pub use options::StripOptions;
pub use reader::{CommentStrippingReader, TextChars};
pub use stats::StripStats;

/// Strips block comments from in-memory text.
pub fn strip_comments(text: &str) -> String {
    strip_comments_with(text, &StripOptions::default()).0
}

/// Strips block comments from in-memory text with explicit options, also
/// returning the scan counters.
pub fn strip_comments_with(text: &str, options: &StripOptions) -> (String, StripStats) {
    let mut reader = CommentStrippingReader::from_text(text).with_options(*options);
    let mut out = String::with_capacity(text.len());
    // A string source never yields errors.
    out.extend(reader.by_ref().flatten());
    (out, *reader.stats())
}
