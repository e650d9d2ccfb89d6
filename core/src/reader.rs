//! The block-comment state machine.
//!
//! [`CommentStrippingReader`] pulls characters from a source one at a time and
//! tracks a single piece of state, the comment nesting depth:
//!
//! - at depth 0, `/*` opens a comment and every other character is emitted;
//! - at depth > 0, `/*` nests one level deeper, `*/` closes one level, and
//!   every other character is discarded.
//!
//! A stray `*/` at depth 0 is ordinary text. Running out of input inside a
//! comment ends the scan without error. The only buffering is one character
//! of lookahead, used to tell `/*` and `*/` from a lone `/` or `*`.

use std::io::BufRead;
use std::iter::Map;
use std::str::Chars;

use tracing::{debug, trace};

use crate::decode::Utf8Chars;
use crate::error::Result;
use crate::options::StripOptions;
use crate::stats::StripStats;

/// Character source over an in-memory string.
pub type TextChars<'a> = Map<Chars<'a>, fn(char) -> Result<char>>;

/// Streaming reader that drops `/* ... */` block comments from a character
/// source while passing every other character through unchanged.
///
/// The reader borrows nothing from and closes nothing on the source; it can
/// be taken back with [`into_inner`](Self::into_inner).
///
/// # Examples
///
/// ```
/// use sqlstrip_core::CommentStrippingReader;
///
/// let script = "select /* a /* nested */ comment */ 1;\n";
/// let mut reader = CommentStrippingReader::new(script.as_bytes());
/// assert_eq!(reader.read_to_string().unwrap(), "select  1;\n");
/// assert_eq!(reader.stats().comments_removed, 1);
/// assert_eq!(reader.stats().max_depth, 2);
/// ```
///
/// The reader is also an iterator, for callers that want to stream output:
///
/// ```
/// use sqlstrip_core::CommentStrippingReader;
///
/// let reader = CommentStrippingReader::from_text("a/**/b");
/// let out: String = reader.collect::<Result<_, _>>().unwrap();
/// assert_eq!(out, "ab");
/// ```
pub struct CommentStrippingReader<S> {
    source: S,
    lookahead: Option<char>,
    depth: usize,
    options: StripOptions,
    stats: StripStats,
    finished: bool,
}

impl<R: BufRead> CommentStrippingReader<Utf8Chars<R>> {
    /// Wraps a UTF-8 byte source.
    pub fn new(reader: R) -> Self {
        Self::from_chars(Utf8Chars::new(reader))
    }
}

impl<'a> CommentStrippingReader<TextChars<'a>> {
    /// Wraps already-decoded text.
    pub fn from_text(text: &'a str) -> Self {
        Self::from_chars(text.chars().map(Ok as fn(char) -> Result<char>))
    }
}

impl<S> CommentStrippingReader<S>
where
    S: Iterator<Item = Result<char>>,
{
    /// Wraps any source of decoded characters.
    pub fn from_chars<I>(chars: I) -> Self
    where
        I: IntoIterator<IntoIter = S, Item = Result<char>>,
    {
        Self {
            source: chars.into_iter(),
            lookahead: None,
            depth: 0,
            options: StripOptions::default(),
            stats: StripStats::default(),
            finished: false,
        }
    }

    /// Replaces the default [`StripOptions`].
    pub fn with_options(mut self, options: StripOptions) -> Self {
        self.options = options;
        self
    }

    /// Current comment nesting depth. Zero outside comments.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Counters for the scan so far.
    pub fn stats(&self) -> &StripStats {
        &self.stats
    }

    /// Options this reader was built with.
    pub fn options(&self) -> &StripOptions {
        &self.options
    }

    /// Returns the source. A pending lookahead character is dropped.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Drains the source and returns everything outside block comments.
    ///
    /// Source errors are returned as-is. Characters already emitted before the
    /// error are discarded along with the partial result; incremental callers
    /// that need them should iterate instead.
    pub fn read_to_string(&mut self) -> Result<String> {
        let mut out = String::new();
        for ch in self.by_ref() {
            out.push(ch?);
        }
        Ok(out)
    }

    fn pull(&mut self) -> Option<Result<char>> {
        if let Some(ch) = self.lookahead.take() {
            return Some(Ok(ch));
        }
        let item = self.source.next()?;
        if item.is_ok() {
            self.stats.chars_read += 1;
        }
        Some(item)
    }

    fn open_comment(&mut self) {
        self.depth += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.depth);
        trace!(depth = self.depth, "entered block comment");
    }

    fn close_comment(&mut self) {
        self.depth -= 1;
        if self.depth == 0 {
            self.stats.comments_removed += 1;
        }
        trace!(depth = self.depth, "left block comment");
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if self.depth > 0 {
            self.stats.unterminated = true;
            debug!(
                depth = self.depth,
                "input ended inside an unterminated block comment"
            );
        }
    }

    fn scan_next(&mut self) -> Option<Result<char>> {
        loop {
            let ch = match self.pull() {
                Some(Ok(ch)) => ch,
                Some(Err(err)) => return Some(Err(err)),
                None => {
                    self.finish();
                    return None;
                }
            };

            // `*` only needs a lookahead inside a comment; at depth 0 a
            // following `/` is passed through either way.
            if ch == '/' || (ch == '*' && self.depth > 0) {
                let next = match self.pull() {
                    Some(Ok(next)) => Some(next),
                    Some(Err(err)) => {
                        self.lookahead = Some(ch);
                        return Some(Err(err));
                    }
                    None => None,
                };
                match (ch, next) {
                    ('/', Some('*')) => {
                        self.open_comment();
                        continue;
                    }
                    ('*', Some('/')) => {
                        self.close_comment();
                        continue;
                    }
                    _ => self.lookahead = next,
                }
            }

            if self.depth == 0 {
                self.stats.chars_emitted += 1;
                return Some(Ok(ch));
            }
            if self.options.preserve_line_breaks && matches!(ch, '\n' | '\r') {
                self.stats.chars_emitted += 1;
                self.stats.line_breaks_preserved += 1;
                return Some(Ok(ch));
            }
        }
    }
}

impl<S> Iterator for CommentStrippingReader<S>
where
    S: Iterator<Item = Result<char>>,
{
    type Item = Result<char>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        self.scan_next()
    }
}
