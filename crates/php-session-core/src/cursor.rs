//! Character cursor over the session text.
//!
//! The cursor offers a single read primitive, [`Cursor::consume_until`].
//! Positions are tracked twice: a byte index used for slicing the borrowed
//! input, and a character offset used only in error messages.

use memchr::{memchr, memchr2, memchr3};

/// A forward-only cursor over borrowed input.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    /// Input text.
    input: &'a str,
    /// Current byte position in the input.
    pos: usize,
    /// Number of characters consumed so far.
    offset: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor positioned at the start of `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            offset: 0,
        }
    }

    /// Characters consumed so far, delimiters included.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The unconsumed part of the input.
    #[inline]
    pub fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Whether every character has been consumed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Consume characters up to the first of `delimiters` and return them.
    ///
    /// The delimiter itself is consumed and dropped. When the input runs out
    /// before any delimiter shows up, everything that was left is returned;
    /// callers validate the text they get back.
    ///
    /// Delimiters must be ASCII. UTF-8 never reuses ASCII byte values inside
    /// multi-byte sequences, so a byte search stays character-correct.
    pub fn consume_until(&mut self, delimiters: &[u8]) -> &'a str {
        debug_assert!(delimiters.iter().all(u8::is_ascii));

        let rest = &self.input.as_bytes()[self.pos..];
        let found = match *delimiters {
            [] => None,
            [a] => memchr(a, rest),
            [a, b] => memchr2(a, b, rest),
            [a, b, c] => memchr3(a, b, c, rest),
            _ => rest.iter().position(|byte| delimiters.contains(byte)),
        };

        let start = self.pos;
        let end = found.map_or(self.input.len(), |idx| start + idx);
        let consumed = &self.input[start..end];
        self.offset += consumed.chars().count();
        self.pos = end;

        if found.is_some() {
            self.pos += 1;
            self.offset += 1;
        }

        consumed
    }
}
