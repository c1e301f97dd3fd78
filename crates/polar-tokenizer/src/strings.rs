//! Quoted strings, interpolation and heredocs.

use std::rc::Rc;

use polar_errors::LexicalError;
use polar_yellow::SyntaxKind::{self, *};
use polar_yellow::LiteralValue;
use text_size::{TextRange, TextSize};

use crate::literals::{self, Quote, is_label_char, is_label_start};
use crate::{Heredoc, LexState, Lexer};

/// Result of scanning ahead for the closing quote.
struct QuotedScan {
    /// Byte length up to and including the closing quote.
    len: Option<usize>,
    interpolates: bool,
}

fn scan_quoted(rest: &str, quote: u8) -> QuotedScan {
    let bytes = rest.as_bytes();
    let mut interpolates = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b if b == quote => return QuotedScan { len: Some(i + 1), interpolates },
            b'$' if quote != b'\'' && starts_interpolation(&rest[i + 1..]) => interpolates = true,
            b'{' if quote != b'\'' && bytes.get(i + 1) == Some(&b'$') => interpolates = true,
            _ => {}
        }
        i += 1;
    }
    QuotedScan { len: None, interpolates }
}

/// Whether the text after a `$` starts a variable or `${`.
fn starts_interpolation(after_dollar: &str) -> bool {
    after_dollar.chars().next().is_some_and(|c| c == '{' || is_label_start(c))
}

impl Lexer<'_> {
    /// `b'...'`, `b"..."` and heredocs, which need to look past their first character.
    pub(crate) fn prefixed_literal(&mut self) -> Option<SyntaxKind> {
        if self.cursor.starts_with("<<<") {
            return self.heredoc_start();
        }
        if !matches!(self.cursor.peek(), 'b' | 'B') {
            return None;
        }

        match self.cursor.second() {
            '\'' => {
                self.cursor.bump_bytes(2);
                Some(self.single_quoted())
            }
            '"' => {
                self.cursor.bump_bytes(2);
                Some(self.double_quoted())
            }
            '<' if self.cursor.rest()[1..].starts_with("<<<")
                && literals::heredoc_header(&self.cursor.rest()[4..]).is_some() =>
            {
                self.cursor.advance();
                self.heredoc_start()
            }
            _ => None,
        }
    }

    pub(crate) fn single_quoted(&mut self) -> SyntaxKind {
        match scan_quoted(self.cursor.rest(), b'\'').len {
            Some(len) => {
                self.cursor.bump_bytes(len);
                let inner = quoted_inner(self.token_text(), '\'');
                self.value = Some(LiteralValue::string(literals::unescape_single(inner)));
                CONSTANT_ENCAPSED_STRING
            }
            None => self.unterminated_string(),
        }
    }

    pub(crate) fn double_quoted(&mut self) -> SyntaxKind {
        match scan_quoted(self.cursor.rest(), b'"') {
            QuotedScan { len: Some(len), interpolates: false } => {
                self.cursor.bump_bytes(len);
                let inner = quoted_inner(self.token_text(), '"');
                self.value = Some(LiteralValue::string(self.unescape(inner, Quote::Double)));
                CONSTANT_ENCAPSED_STRING
            }
            QuotedScan { len: Some(_), interpolates: true } => {
                self.push_state(LexState::DoubleQuotes);
                DOUBLE_QUOTE
            }
            QuotedScan { len: None, .. } => self.unterminated_string(),
        }
    }

    pub(crate) fn backtick(&mut self) -> SyntaxKind {
        if scan_quoted(self.cursor.rest(), b'`').len.is_none() {
            return self.unterminated_string();
        }
        self.push_state(LexState::Backquote);
        BACKTICK
    }

    /// The rest of the input becomes one raw token without a value.
    fn unterminated_string(&mut self) -> SyntaxKind {
        self.cursor.bump_bytes(self.cursor.rest().len());
        self.token_error(LexicalError::UnterminatedString);
        ENCAPSED_AND_WHITESPACE
    }

    fn unescape(&mut self, text: &str, quote: Quote) -> Vec<u8> {
        let mut errors = Vec::new();
        let value = literals::unescape(text, quote, &mut errors);
        for error in errors {
            self.token_error(error);
        }
        value
    }

    /// Body of a double-quoted or backtick string.
    pub(crate) fn encaps_token(&mut self, quote: Quote) -> SyntaxKind {
        let (closer, kind) = match quote {
            Quote::Backtick => ('`', BACKTICK),
            Quote::Double | Quote::Heredoc => ('"', DOUBLE_QUOTE),
        };
        if self.cursor.eat(closer) {
            self.pop_state();
            return kind;
        }
        if let Some(kind) = self.interpolation_start() {
            return kind;
        }

        self.scan_encaps_text(Some(closer), None);
        let value = self.unescape(self.token_text(), quote);
        self.value = Some(LiteralValue::string(value));
        ENCAPSED_AND_WHITESPACE
    }

    /// `$name`, `{$` or `${` at the cursor.
    fn interpolation_start(&mut self) -> Option<SyntaxKind> {
        if self.cursor.matches('$') && is_label_start(self.cursor.second()) {
            self.cursor.advance();
            self.cursor.advance_while(is_label_char);

            if self.cursor.matches('[') {
                self.push_state(LexState::VarOffset);
            } else if self.property_follows() {
                self.push_state(LexState::LookingForProperty);
            }
            return Some(VARIABLE);
        }
        if self.cursor.starts_with("{$") {
            self.cursor.advance();
            self.push_state(LexState::Scripting);
            return Some(CURLY_OPEN);
        }
        if self.cursor.eat_str("${") {
            self.push_state(LexState::LookingForVarname);
            return Some(DOLLAR_OPEN_CURLY_BRACES);
        }
        None
    }

    fn property_follows(&self) -> bool {
        let rest = self.cursor.rest();
        let after = rest.strip_prefix("->").or_else(|| rest.strip_prefix("?->"));
        after.and_then(|after| after.chars().next()).is_some_and(is_label_start)
    }

    /// Advances over string content up to `closer`, an interpolation or `end`.
    fn scan_encaps_text(&mut self, closer: Option<char>, end: Option<TextSize>) {
        loop {
            if self.cursor.is_eof() || end.is_some_and(|end| self.cursor.offset() >= end) {
                return;
            }
            match self.cursor.peek() {
                c if Some(c) == closer => return,
                '\\' => {
                    self.cursor.advance();
                    if !matches!(self.cursor.peek(), '\n' | '\r') {
                        self.cursor.advance();
                    }
                    continue;
                }
                '$' if starts_interpolation(&self.cursor.rest()[1..]) => return,
                '{' if self.cursor.second() == '$' => return,
                _ => {}
            }
            self.cursor.advance();
        }
    }

    pub(crate) fn property_token(&mut self) -> SyntaxKind {
        if self.cursor.eat_str("->") {
            return OBJECT_OPERATOR;
        }
        if self.cursor.eat_str("?->") {
            return NULLSAFE_OBJECT_OPERATOR;
        }
        self.pop_state();
        if is_label_start(self.cursor.peek()) {
            self.cursor.advance_while(is_label_char);
            return IDENTIFIER;
        }
        self.lex_kind()
    }

    pub(crate) fn varname_token(&mut self) -> SyntaxKind {
        self.cursor.advance_while(is_label_char);
        self.set_state(LexState::Scripting);
        STRING_VARNAME
    }

    /// Inside `$var[...]` in a string: a number, a bare word or a variable.
    pub(crate) fn var_offset_token(&mut self) -> SyntaxKind {
        match self.cursor.peek() {
            '[' => {
                self.cursor.advance();
                LBRACKET
            }
            ']' => {
                self.cursor.advance();
                self.pop_state();
                RBRACKET
            }
            '-' => {
                self.cursor.advance();
                MINUS
            }
            '0'..='9' => {
                self.cursor.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');
                self.value = Some(num_string_value(self.token_text()));
                NUM_STRING
            }
            '$' if is_label_start(self.cursor.second()) => {
                self.cursor.advance();
                self.cursor.advance_while(is_label_char);
                VARIABLE
            }
            c if is_label_start(c) => {
                self.cursor.advance_while(is_label_char);
                IDENTIFIER
            }
            _ => {
                self.pop_state();
                self.lex_kind()
            }
        }
    }

    /// `<<<LABEL`, with the closing label located before anything is committed.
    fn heredoc_start(&mut self) -> Option<SyntaxKind> {
        let rest = self.cursor.rest();
        let header = literals::heredoc_header(&rest[3..])?;
        let header_len = 3 + header.len;
        self.cursor.bump_bytes(header_len);

        let Some(closing) = literals::find_heredoc_closing(&rest[header_len..], header.label)
        else {
            self.cursor.bump_bytes(self.cursor.rest().len());
            self.token_error(LexicalError::UnterminatedHeredoc { label: header.label.into() });
            return Some(ENCAPSED_AND_WHITESPACE);
        };

        let closing_offset = self.cursor.offset() + TextSize::new(closing.offset as u32);
        if closing.mixed {
            let width = TextSize::new(closing.indentation.width as u32);
            let range = TextRange::at(closing_offset, width);
            self.error(LexicalError::MixedHeredocIndentation, range);
        }

        self.push_state(LexState::Heredoc(Rc::new(Heredoc {
            label: header.label.into(),
            nowdoc: header.nowdoc,
            indentation: closing.indentation,
            closing: closing_offset,
        })));
        Some(START_HEREDOC)
    }

    pub(crate) fn heredoc_token(&mut self, heredoc: &Heredoc) -> SyntaxKind {
        let offset = self.cursor.offset();
        if offset == heredoc.closing {
            self.cursor.bump_bytes(heredoc.indentation.width + heredoc.label.len());
            self.pop_state();
            return END_HEREDOC;
        }
        if offset > heredoc.closing {
            self.pop_state();
            return self.lex_kind();
        }

        if heredoc.nowdoc {
            self.cursor.bump_bytes(usize::from(heredoc.closing - offset));
        } else {
            if let Some(kind) = self.interpolation_start() {
                return kind;
            }
            self.scan_encaps_text(None, Some(heredoc.closing));
        }

        let mut text = self.token_text();
        if self.cursor.offset() == heredoc.closing {
            text = literals::trim_final_newline(text);
        }

        let mut errors = Vec::new();
        let at_line_start = self.starts_line(offset);
        let body = literals::strip_indentation(text, heredoc.indentation, at_line_start, &mut errors);
        let value = if heredoc.nowdoc {
            body.into_bytes()
        } else {
            literals::unescape(&body, Quote::Heredoc, &mut errors)
        };
        for error in errors {
            self.token_error(error);
        }

        self.value = Some(LiteralValue::string(value));
        ENCAPSED_AND_WHITESPACE
    }
}

/// The text between the opening and closing quote, skipping a `b` prefix.
fn quoted_inner(text: &str, quote: char) -> &str {
    let start = text.find(quote).map_or(0, |index| index + 1);
    &text[start..text.len() - 1]
}

/// Plain decimal offsets that fit an `i64` are integers, anything else a string.
fn num_string_value(text: &str) -> LiteralValue {
    let is_decimal = text == "0" || (!text.starts_with('0') && text.bytes().all(|b| b.is_ascii_digit()));
    match text.parse::<i64>() {
        Ok(value) if is_decimal => LiteralValue::Integer(value),
        _ => LiteralValue::string(text),
    }
}
