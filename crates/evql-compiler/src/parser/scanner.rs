//! Character cursor with line/column tracking.
//!
//! Lines are 1-based, columns are 0-based and counted in chars. A newline
//! advances the line and resets the column.

use std::str::Chars;

/// Location of the cursor in the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset.
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Clone, Debug)]
pub struct Scanner<'src> {
    source: &'src str,
    position: Position,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            position: Position {
                offset: 0,
                line: 1,
                column: 0,
            },
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.position.offset >= self.source.len()
    }

    pub fn remainder(&self) -> &'src str {
        &self.source[self.position.offset..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().next()
    }

    /// The char `n` positions ahead; `peek_nth(0)` is `peek()`.
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().nth(n)
    }

    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position.offset += c.len_utf8();
        if c == '\n' {
            self.position.line += 1;
            self.position.column = 0;
        } else {
            self.position.column += 1;
        }
        Some(c)
    }

    /// Advance until the cursor reaches byte `offset`.
    ///
    /// Offsets behind the cursor are ignored; the cursor never moves backwards.
    pub fn advance_to(&mut self, offset: usize) {
        while self.position.offset < offset && self.advance().is_some() {}
    }

    fn rest(&self) -> Chars<'src> {
        self.remainder().chars()
    }
}

/// Longest valid UTF-8 prefix of `bytes`.
///
/// Scanning of raw input stops at the first byte sequence that fails to decode.
pub fn decode_prefix(bytes: &[u8]) -> &str {
    match std::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => std::str::from_utf8(&bytes[..err.valid_up_to()]).unwrap_or_default(),
    }
}
