use std::str::Chars;

use text_size::{TextLen, TextSize};

pub(crate) const EOF_CHAR: char = '\0';

#[derive(Clone)]
pub(crate) struct Cursor<'src> {
    chars: Chars<'src>,
    len: TextSize,
    token_start: TextSize,
}

impl<'src> Cursor<'src> {
    pub(crate) fn new(text: &'src str, offset: TextSize) -> Self {
        let chars = text[usize::from(offset)..].chars();
        Self { chars, len: text.text_len(), token_start: offset }
    }

    pub(crate) fn offset(&self) -> TextSize {
        self.len - self.chars.as_str().text_len()
    }

    pub(crate) fn token_start(&self) -> TextSize {
        self.token_start
    }

    pub(crate) fn reset_pos_within_token(&mut self) {
        self.token_start = self.offset();
    }

    pub(crate) fn rest(&self) -> &'src str {
        self.chars.as_str()
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    pub(crate) fn peek(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn second(&self) -> char {
        self.nth(1)
    }

    pub(crate) fn nth(&self, n: usize) -> char {
        self.chars.clone().nth(n).unwrap_or(EOF_CHAR)
    }

    pub(crate) fn matches(&self, c: char) -> bool {
        self.peek() == c
    }

    pub(crate) fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    pub(crate) fn advance(&mut self) -> char {
        self.chars.next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn eat(&mut self, c: char) -> bool {
        let matched = self.matches(c);
        if matched {
            self.advance();
        }
        matched
    }

    pub(crate) fn eat_str(&mut self, prefix: &str) -> bool {
        let matched = self.starts_with(prefix);
        if matched {
            self.bump_bytes(prefix.len());
        }
        matched
    }

    /// Skips `n` bytes, which must end on a char boundary.
    pub(crate) fn bump_bytes(&mut self, n: usize) {
        self.chars = self.chars.as_str()[n..].chars();
    }

    pub(crate) fn advance_while(&mut self, f: impl Fn(char) -> bool + Copy) {
        while !self.is_eof() && f(self.peek()) {
            self.advance();
        }
    }

    /// Consumes `\n`, `\r\n` or `\r`.
    pub(crate) fn eat_newline(&mut self) {
        if !self.eat_str("\r\n") && matches!(self.peek(), '\n' | '\r') {
            self.advance();
        }
    }
}
