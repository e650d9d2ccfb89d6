//! Incremental UTF-8 decoding over a [`BufRead`] source.
//!
//! [`Utf8Chars`] turns a byte stream into a stream of `char`s without
//! buffering the whole input. Multi-byte sequences may straddle `fill_buf`
//! boundaries; the partially read sequence is held until it completes, so a
//! read error in the middle of a character loses nothing.

use std::io::{self, BufRead};

use crate::error::{Result, StripError};

const BOM: char = '\u{FEFF}';

/// Iterator of decoded characters read from a byte source.
///
/// A leading byte-order mark is skipped. Malformed sequences yield
/// [`StripError::InvalidUtf8`] carrying the absolute offset of the sequence;
/// decoding resumes at the next byte that could start a character.
///
/// # Examples
///
/// ```
/// use sqlstrip_core::Utf8Chars;
///
/// let chars: Vec<char> = Utf8Chars::new("\u{FEFF}é*".as_bytes())
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(chars, vec!['é', '*']);
/// ```
pub struct Utf8Chars<R> {
    inner: R,
    offset: u64,
    at_start: bool,
    had_bom: bool,
    partial: [u8; 4],
    partial_len: usize,
    partial_width: usize,
    partial_start: u64,
}

impl<R: BufRead> Utf8Chars<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            at_start: true,
            had_bom: false,
            partial: [0; 4],
            partial_len: 0,
            partial_width: 0,
            partial_start: 0,
        }
    }

    /// Bytes consumed from the source so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Whether a leading byte-order mark was skipped.
    pub fn had_bom(&self) -> bool {
        self.had_bom
    }

    /// Returns the wrapped source. Bytes of an incomplete character are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.inner.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    fn bump(&mut self) {
        self.inner.consume(1);
        self.offset += 1;
    }

    fn invalid(&mut self) -> StripError {
        self.partial_len = 0;
        StripError::InvalidUtf8 {
            offset: self.partial_start,
        }
    }

    fn decode_next(&mut self) -> Result<Option<char>> {
        if self.partial_len == 0 {
            let Some(lead) = self.peek_byte()? else {
                return Ok(None);
            };
            self.partial_start = self.offset;
            self.bump();

            match sequence_width(lead) {
                0 => {
                    return Err(StripError::InvalidUtf8 {
                        offset: self.partial_start,
                    });
                }
                1 => return Ok(Some(char::from(lead))),
                width => {
                    self.partial[0] = lead;
                    self.partial_len = 1;
                    self.partial_width = width;
                }
            }
        }

        while self.partial_len < self.partial_width {
            let Some(byte) = self.peek_byte()? else {
                return Err(self.invalid());
            };
            // Leave a non-continuation byte in place; it may start the next char.
            if byte & 0xC0 != 0x80 {
                return Err(self.invalid());
            }
            self.bump();
            self.partial[self.partial_len] = byte;
            self.partial_len += 1;
        }

        let width = self.partial_width;
        self.partial_len = 0;
        match std::str::from_utf8(&self.partial[..width]) {
            Ok(text) => Ok(text.chars().next()),
            // Overlong forms and surrogates pass the width check but not this one.
            Err(_) => Err(StripError::InvalidUtf8 {
                offset: self.partial_start,
            }),
        }
    }
}

impl<R: BufRead> Iterator for Utf8Chars<R> {
    type Item = Result<char>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let decoded = self.decode_next().transpose()?;
            if self.at_start {
                match decoded {
                    Ok(BOM) => {
                        self.at_start = false;
                        self.had_bom = true;
                        continue;
                    }
                    // Nothing was decoded yet; a retry may still find the BOM.
                    Err(StripError::Io(_)) => {}
                    _ => self.at_start = false,
                }
            }
            return Some(decoded);
        }
    }
}

/// Encoded length implied by a lead byte, or 0 when the byte cannot start a
/// character.
fn sequence_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}
