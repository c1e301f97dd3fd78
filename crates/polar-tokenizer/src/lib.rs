//! Lossless lexer for PHP source text.
//!
//! Every byte of the input ends up either in a token's text or in the trivia
//! attached to it, so the tokens of a buffer print back to the buffer itself.
//! Literal tokens additionally carry their computed value.

mod cursor;
mod literals;
mod strings;

use std::rc::Rc;

use cursor::Cursor;
use literals::{IntegerValue, is_label_char, is_label_start};
pub use polar_errors::{Diagnostic, LexicalError};
use polar_yellow::SyntaxKind::*;
pub use polar_yellow::{LiteralValue, SyntaxKind, Token, TokenFlags, Trivia, TriviaPiece};
use text_size::{TextRange, TextSize};

/// Where lexing of a buffer begins.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LexerMode {
    /// The buffer is PHP code.
    #[default]
    Scripting,
    /// The buffer is a file: inline HTML until the first open tag.
    Initial,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LexerOptions {
    pub mode: LexerMode,
    /// Accept `<?` as an open tag.
    pub short_open_tag: bool,
}

impl LexerOptions {
    /// Options for lexing a whole `.php` file.
    pub fn file() -> Self {
        Self { mode: LexerMode::Initial, ..Self::default() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum LexState {
    Initial,
    Scripting,
    /// Inside `${...}`, `->{...}` or `::{...}`, whose `}` ends an operand.
    OperandBraces,
    DoubleQuotes,
    Backquote,
    Heredoc(Rc<Heredoc>),
    /// After `$var` in a string, when `->name` follows.
    LookingForProperty,
    /// After `${` in a string.
    LookingForVarname,
    /// After `$var` in a string, when `[` follows.
    VarOffset,
}

#[derive(Debug, PartialEq, Eq)]
struct Heredoc {
    label: Box<str>,
    nowdoc: bool,
    indentation: literals::Indentation,
    /// Start of the line holding the closing label.
    closing: TextSize,
}

impl LexState {
    fn initial(mode: LexerMode) -> Self {
        match mode {
            LexerMode::Scripting => Self::Scripting,
            LexerMode::Initial => Self::Initial,
        }
    }

    fn is_scripting(&self) -> bool {
        matches!(self, Self::Scripting | Self::OperandBraces)
    }
}

/// Saved lexer position, see [`Lexer::checkpoint`] and [`lex`].
#[derive(Clone, Debug)]
pub struct LexerCheckpoint {
    offset: TextSize,
    options: LexerOptions,
    states: Vec<LexState>,
    prev: SyntaxKind,
    operand_ends: [bool; 2],
    diagnostics: usize,
}

impl LexerCheckpoint {
    /// The position before the first token of a buffer lexed with `options`.
    pub fn start(options: LexerOptions) -> Self {
        Self {
            offset: TextSize::new(0),
            options,
            states: vec![LexState::initial(options.mode)],
            prev: EOF,
            operand_ends: [false; 2],
            diagnostics: 0,
        }
    }

    pub fn offset(&self) -> TextSize {
        self.offset
    }
}

type ErrorHandler<'src> = Box<dyn FnMut(&Diagnostic) + 'src>;

pub struct Lexer<'src> {
    text: &'src str,
    cursor: Cursor<'src>,
    options: LexerOptions,
    states: Vec<LexState>,
    /// Kind of the last token.
    prev: SyntaxKind,
    /// Whether each of the last two tokens can end an operand, most recent last.
    operand_ends: [bool; 2],
    value: Option<LiteralValue>,
    flags: TokenFlags,
    trivia_pieces: Vec<TriviaPiece>,
    diagnostics: Vec<Diagnostic>,
    on_error: Option<ErrorHandler<'src>>,
    /// Anomalies starting before this offset were passed to `on_error`
    /// before the last [`Lexer::restore`].
    reported_until: TextSize,
}

impl<'src> Lexer<'src> {
    pub fn new(text: &'src str, options: LexerOptions) -> Self {
        Self::at(text, TextSize::new(0), options)
    }

    /// Starts lexing at `offset`, which must be on a char boundary.
    pub fn at(text: &'src str, offset: TextSize, options: LexerOptions) -> Self {
        Self {
            text,
            cursor: Cursor::new(text, offset),
            options,
            states: vec![LexState::initial(options.mode)],
            prev: EOF,
            operand_ends: [false; 2],
            value: None,
            flags: TokenFlags::empty(),
            trivia_pieces: Vec::with_capacity(4),
            diagnostics: Vec::new(),
            on_error: None,
            reported_until: TextSize::new(0),
        }
    }

    /// Registers the callback invoked for every lexical anomaly.
    pub fn with_error_handler(mut self, on_error: impl FnMut(&Diagnostic) + 'src) -> Self {
        self.on_error = Some(Box::new(on_error));
        self
    }

    pub fn offset(&self) -> TextSize {
        self.cursor.offset()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn checkpoint(&self) -> LexerCheckpoint {
        LexerCheckpoint {
            offset: self.cursor.offset(),
            options: self.options,
            states: self.states.clone(),
            prev: self.prev,
            operand_ends: self.operand_ends,
            diagnostics: self.diagnostics.len(),
        }
    }

    /// Rewinds to `checkpoint`. Diagnostics collected since are dropped.
    /// Anomalies met again while re-lexing text that was already lexed are
    /// not passed to the error handler a second time.
    pub fn restore(&mut self, checkpoint: LexerCheckpoint) {
        self.reported_until = self.reported_until.max(self.cursor.offset());
        self.cursor = Cursor::new(self.text, checkpoint.offset);
        self.options = checkpoint.options;
        self.states = checkpoint.states;
        self.prev = checkpoint.prev;
        self.operand_ends = checkpoint.operand_ends;
        self.diagnostics.truncate(checkpoint.diagnostics);
    }

    /// Lexes the next token. After the end of input, every call returns `EOF`.
    pub fn next_token(&mut self) -> Token {
        self.settle_state();

        let leading_start = self.cursor.offset();
        let leading = self.trivia(false);

        self.cursor.reset_pos_within_token();
        self.value = None;
        self.flags = TokenFlags::empty();

        let in_operand_braces = *self.state() == LexState::OperandBraces;
        let kind = self.lex_kind();
        let range = self.token_range();
        let trailing = self.trivia(true);

        if leading.contains_newline() || self.starts_line(leading_start) {
            self.flags |= TokenFlags::AT_START_OF_LINE;
        }
        let ends_operand = match kind {
            RBRACE => in_operand_braces,
            CLASS_KW => self.prev == PAAMAYIM_NEKUDOTAYIM,
            kind => ends_operand(kind),
        };
        self.prev = kind;
        self.operand_ends = [self.operand_ends[1], ends_operand];

        Token::new(kind, range, &self.text[range])
            .with_flags(self.flags)
            .with_leading_trivia(leading)
            .with_trailing_trivia(trailing)
            .with_value(self.value.take())
    }

    /// Feeds every token, `EOF` included, to `on_token` in source order.
    pub fn tokenize(mut self, mut on_token: impl FnMut(&Token, &Trivia, &Trivia)) {
        loop {
            let token = self.next_token();
            on_token(&token, token.leading_trivia(), token.trailing_trivia());
            if token.kind() == EOF {
                break;
            }
        }
    }

    fn state(&self) -> &LexState {
        &self.states[self.states.len() - 1]
    }

    fn push_state(&mut self, state: LexState) {
        self.states.push(state);
    }

    fn pop_state(&mut self) {
        if self.states.len() > 1 {
            self.states.pop();
        }
    }

    fn set_state(&mut self, state: LexState) {
        if let Some(top) = self.states.last_mut() {
            *top = state;
        }
    }

    /// `${name[` and `${name}` start a variable name; any other `${` is an expression.
    fn settle_state(&mut self) {
        if *self.state() == LexState::LookingForVarname && !self.varname_follows() {
            self.set_state(LexState::Scripting);
        }
    }

    fn varname_follows(&self) -> bool {
        let mut chars = self.cursor.rest().chars();
        if !chars.next().is_some_and(is_label_start) {
            return false;
        }
        matches!(chars.find(|&c| !is_label_char(c)), Some('[' | '}'))
    }

    fn token_text(&self) -> &'src str {
        &self.text[self.token_range()]
    }

    fn token_range(&self) -> TextRange {
        TextRange::new(self.cursor.token_start(), self.cursor.offset())
    }

    fn starts_line(&self, offset: TextSize) -> bool {
        let offset = usize::from(offset);
        offset == 0 || matches!(self.text.as_bytes()[offset - 1], b'\n' | b'\r')
    }

    fn error(&mut self, error: LexicalError, range: TextRange) {
        tracing::debug!(code = error.code(), ?range, "{error}");
        let diagnostic = Diagnostic::lexical(&error, range);
        if let Some(on_error) = &mut self.on_error
            && range.start() >= self.reported_until
        {
            on_error(&diagnostic);
        }
        self.diagnostics.push(diagnostic);
    }

    fn token_error(&mut self, error: LexicalError) {
        self.error(error, self.token_range());
    }

    fn lex_kind(&mut self) -> SyntaxKind {
        if self.cursor.is_eof() {
            return EOF;
        }

        match self.state().clone() {
            LexState::Initial => self.inline_html(),
            LexState::Scripting | LexState::OperandBraces => self.scripting(),
            LexState::DoubleQuotes => self.encaps_token(literals::Quote::Double),
            LexState::Backquote => self.encaps_token(literals::Quote::Backtick),
            LexState::Heredoc(heredoc) => self.heredoc_token(&heredoc),
            LexState::LookingForProperty => self.property_token(),
            LexState::LookingForVarname => self.varname_token(),
            LexState::VarOffset => self.var_offset_token(),
        }
    }

    /// Collects trivia in scripting state. Trailing trivia stops before a newline.
    fn trivia(&mut self, trailing: bool) -> Trivia {
        if !self.state().is_scripting() {
            return Trivia::empty();
        }

        loop {
            let piece = match self.cursor.peek() {
                ' ' => TriviaPiece::Spaces(self.run(' ')),
                '\t' => TriviaPiece::Tabs(self.run('\t')),
                '\n' if !trailing => TriviaPiece::Newlines(self.run('\n')),
                '\r' if !trailing && self.cursor.second() == '\n' => {
                    let mut count = 0;
                    while self.cursor.eat_str("\r\n") {
                        count += 1;
                    }
                    TriviaPiece::CarriageReturnLineFeeds(count)
                }
                '\r' if !trailing => TriviaPiece::CarriageReturns(self.run('\r')),
                '#' if self.cursor.second() != '[' => self.line_comment(),
                '/' if self.cursor.second() == '/' => self.line_comment(),
                '/' if self.cursor.second() == '*' => self.block_comment(),
                _ => break,
            };
            self.trivia_pieces.push(piece);
        }

        Trivia::new(self.trivia_pieces.drain(..))
    }

    fn run(&mut self, c: char) -> u32 {
        let mut count = 0;
        while self.cursor.eat(c) {
            count += 1;
        }
        count
    }

    /// `//` and `#` comments end before a newline or a close tag.
    fn line_comment(&mut self) -> TriviaPiece {
        let start = self.cursor.offset();
        self.cursor.advance();
        while !self.cursor.is_eof()
            && !matches!(self.cursor.peek(), '\n' | '\r')
            && !self.cursor.starts_with("?>")
        {
            self.cursor.advance();
        }
        TriviaPiece::LineComment(self.slice(start).into())
    }

    fn block_comment(&mut self) -> TriviaPiece {
        let start = self.cursor.offset();
        let rest = self.cursor.rest();
        let is_doc = rest.starts_with("/**") && rest[3..].starts_with(char::is_whitespace);

        match rest[2..].find("*/") {
            Some(end) => self.cursor.bump_bytes(end + 4),
            None => {
                self.cursor.bump_bytes(rest.len());
                let range = TextRange::new(start, self.cursor.offset());
                self.error(LexicalError::UnterminatedComment, range);
            }
        }

        let text = self.slice(start).into();
        if is_doc { TriviaPiece::DocComment(text) } else { TriviaPiece::BlockComment(text) }
    }

    fn slice(&self, start: TextSize) -> &'src str {
        &self.text[TextRange::new(start, self.cursor.offset())]
    }

    fn inline_html(&mut self) -> SyntaxKind {
        if let Some(kind) = self.open_tag() {
            return kind;
        }

        loop {
            self.cursor.advance_while(|c| c != '<');
            if self.cursor.is_eof() || self.open_tag_len().is_some() {
                break;
            }
            self.cursor.advance();
        }

        self.value = Some(LiteralValue::string(self.token_text()));
        INLINE_HTML
    }

    fn open_tag(&mut self) -> Option<SyntaxKind> {
        let (len, kind) = self.open_tag_len()?;
        self.cursor.bump_bytes(len);
        self.set_state(LexState::Scripting);
        Some(kind)
    }

    /// `<?php` swallows one following whitespace character.
    fn open_tag_len(&self) -> Option<(usize, SyntaxKind)> {
        let rest = self.cursor.rest();
        if rest.starts_with("<?=") {
            return Some((3, OPEN_TAG_WITH_ECHO));
        }
        if rest.as_bytes().get(..5).is_some_and(|tag| tag.eq_ignore_ascii_case(b"<?php")) {
            return match rest.as_bytes().get(5) {
                None => Some((5, OPEN_TAG)),
                Some(b'\r') if rest[6..].starts_with('\n') => Some((7, OPEN_TAG)),
                Some(b' ' | b'\t' | b'\n' | b'\r') => Some((6, OPEN_TAG)),
                Some(_) => None,
            };
        }
        if self.options.short_open_tag && rest.starts_with("<?") {
            return Some((2, OPEN_TAG));
        }
        None
    }

    fn scripting(&mut self) -> SyntaxKind {
        if let Some(kind) = self.prefixed_literal() {
            return kind;
        }

        let first_char = self.cursor.advance();
        match first_char {
            '$' if is_label_start(self.cursor.peek()) => {
                self.cursor.advance_while(is_label_char);
                VARIABLE
            }
            '$' => DOLLAR,
            c if is_label_start(c) => self.identifier(),
            '0'..='9' => self.number(first_char),
            '.' if self.cursor.peek().is_ascii_digit() => self.number(first_char),
            '\'' => self.single_quoted(),
            '"' => self.double_quoted(),
            '`' => self.backtick(),
            '+' => self.either('+', INC, '=', PLUS_EQUAL, PLUS),
            '-' if self.cursor.eat('>') => OBJECT_OPERATOR,
            '-' => self.either('-', DEC, '=', MINUS_EQUAL, MINUS),
            '*' if self.cursor.eat('*') => self.with_equal(POW_EQUAL, POW),
            '*' => self.with_equal(MUL_EQUAL, MUL),
            '/' => self.with_equal(DIV_EQUAL, DIV),
            '%' => self.with_equal(MOD_EQUAL, MOD),
            '.' if self.cursor.eat_str("..") => ELLIPSIS,
            '.' => self.with_equal(CONCAT_EQUAL, CONCAT),
            '=' if self.cursor.eat('>') => DOUBLE_ARROW,
            '=' if self.cursor.eat('=') => self.with_equal(IS_IDENTICAL, IS_EQUAL),
            '=' => EQUAL,
            '!' if self.cursor.eat('=') => self.with_equal(IS_NOT_IDENTICAL, IS_NOT_EQUAL),
            '!' => EXCLAMATION,
            '<' if self.cursor.eat_str("=>") => SPACESHIP,
            '<' if self.cursor.eat('<') => self.with_equal(SL_EQUAL, SL),
            '<' if self.cursor.eat('>') => IS_NOT_EQUAL,
            '<' => self.with_equal(IS_SMALLER_OR_EQUAL, IS_SMALLER),
            '>' if self.cursor.eat('>') => self.with_equal(SR_EQUAL, SR),
            '>' => self.with_equal(IS_GREATER_OR_EQUAL, IS_GREATER),
            '&' => self.either('&', BOOLEAN_AND, '=', AND_EQUAL, AMPERSAND),
            '|' => self.either('|', BOOLEAN_OR, '=', OR_EQUAL, PIPE),
            '^' => self.with_equal(XOR_EQUAL, CARET),
            '~' => TILDE,
            '?' if self.cursor.eat('>') => {
                self.cursor.eat_newline();
                self.set_state(LexState::Initial);
                CLOSE_TAG
            }
            '?' if self.cursor.eat('?') => self.with_equal(COALESCE_EQUAL, COALESCE),
            '?' if self.cursor.eat_str("->") => NULLSAFE_OBJECT_OPERATOR,
            '?' => QUESTION,
            ':' if self.cursor.eat(':') => PAAMAYIM_NEKUDOTAYIM,
            ':' => COLON,
            ';' => SEMICOLON,
            ',' => COMMA,
            '(' => self.cast().unwrap_or(LPAREN),
            ')' => RPAREN,
            '[' => LBRACKET,
            ']' => RBRACKET,
            '{' => {
                let state = match self.prev {
                    DOLLAR | OBJECT_OPERATOR | NULLSAFE_OBJECT_OPERATOR | PAAMAYIM_NEKUDOTAYIM => {
                        LexState::OperandBraces
                    }
                    _ => LexState::Scripting,
                };
                self.push_state(state);
                LBRACE
            }
            '}' => {
                self.pop_state();
                RBRACE
            }
            '@' => AT,
            '\\' => NS_SEPARATOR,
            '#' if self.cursor.eat('[') => ATTRIBUTE,
            _ => {
                self.token_error(LexicalError::UnexpectedCharacter);
                UNKNOWN
            }
        }
    }

    fn either(
        &mut self,
        first: char,
        first_kind: SyntaxKind,
        second: char,
        second_kind: SyntaxKind,
        otherwise: SyntaxKind,
    ) -> SyntaxKind {
        if self.cursor.eat(first) {
            first_kind
        } else if self.cursor.eat(second) {
            second_kind
        } else {
            otherwise
        }
    }

    fn with_equal(&mut self, with: SyntaxKind, without: SyntaxKind) -> SyntaxKind {
        if self.cursor.eat('=') { with } else { without }
    }

    /// `(int)`, `( string )` and friends; spaces and tabs are allowed inside.
    fn cast(&mut self) -> Option<SyntaxKind> {
        let rest = self.cursor.rest();
        let inner = rest.trim_start_matches([' ', '\t']);
        let name_len = inner.bytes().take_while(u8::is_ascii_alphabetic).count();
        let after = inner[name_len..].trim_start_matches([' ', '\t']);
        if name_len == 0 || !after.starts_with(')') {
            return None;
        }

        let kind = match inner[..name_len].to_ascii_lowercase().as_str() {
            "int" | "integer" => INT_CAST,
            "bool" | "boolean" => BOOL_CAST,
            "float" | "double" | "real" => DOUBLE_CAST,
            "string" | "binary" => STRING_CAST,
            "array" => ARRAY_CAST,
            "object" => OBJECT_CAST,
            "unset" => UNSET_CAST,
            _ => return None,
        };
        self.cursor.bump_bytes(rest.len() - after.len() + 1);
        Some(kind)
    }

    fn identifier(&mut self) -> SyntaxKind {
        self.cursor.advance_while(is_label_char);
        let text = self.token_text();

        let keyword = if text.eq_ignore_ascii_case("die") {
            Some(EXIT_KW)
        } else {
            SyntaxKind::from_keyword(text)
        };

        match keyword {
            Some(_) if matches!(self.prev, OBJECT_OPERATOR | NULLSAFE_OBJECT_OPERATOR) => {
                self.flags |= TokenFlags::ESCAPED_IDENTIFIER;
                IDENTIFIER
            }
            Some(keyword) if keyword != CLASS_KW && self.prev == PAAMAYIM_NEKUDOTAYIM => {
                self.flags |= TokenFlags::ESCAPED_IDENTIFIER;
                IDENTIFIER
            }
            Some(keyword) => keyword,
            None => IDENTIFIER,
        }
    }

    fn number(&mut self, first_char: char) -> SyntaxKind {
        if first_char == '0' {
            let radix = match self.cursor.peek() {
                'x' | 'X' => 16,
                'b' | 'B' => 2,
                'o' | 'O' => 8,
                _ => 0,
            };
            if radix != 0 && self.cursor.second().is_digit(radix) {
                self.cursor.advance();
                self.digits(radix);
                return self.integer_literal(&self.token_text()[2..], radix);
            }
        }

        let mut is_double = first_char == '.';
        self.digits(10);
        if !is_double && self.cursor.matches('.') && self.cursor.second() != '.' {
            self.cursor.advance();
            self.digits(10);
            is_double = true;
        }
        if matches!(self.cursor.peek(), 'e' | 'E') {
            let exponent_digit = match self.cursor.second() {
                '+' | '-' => self.cursor.nth(2),
                c => c,
            };
            if exponent_digit.is_ascii_digit() {
                self.cursor.advance();
                if !self.cursor.eat('+') {
                    self.cursor.eat('-');
                }
                self.digits(10);
                is_double = true;
            }
        }

        let text = self.token_text();
        if is_double {
            self.value = literals::double_value(text).map(LiteralValue::Double);
            return DNUMBER;
        }
        if text.len() > 1 && text.starts_with('0') {
            return self.integer_literal(&text[1..], 8);
        }
        self.integer_literal(text, 10)
    }

    /// Digits with single `_` separators. Octal literals are scanned as
    /// decimal so that `8` and `9` end up in the token.
    fn digits(&mut self, radix: u32) {
        let scan_radix = if radix == 8 { 10 } else { radix };
        loop {
            match self.cursor.peek() {
                c if c.is_digit(scan_radix) => {}
                '_' if self.cursor.second().is_digit(scan_radix) => {}
                _ => return,
            }
            self.cursor.advance();
        }
    }

    fn integer_literal(&mut self, digits: &str, radix: u32) -> SyntaxKind {
        match literals::integer_value(digits, radix) {
            IntegerValue::Integer(value) => self.value = Some(LiteralValue::Integer(value)),
            IntegerValue::Boundary if self.after_unary_minus() => {
                self.value = Some(LiteralValue::Integer(i64::MIN));
                self.flags |= TokenFlags::NEEDS_LITERAL_OVERFLOW_CORRECTION;
            }
            IntegerValue::Boundary => {
                self.value = Some(LiteralValue::Double(9_223_372_036_854_775_808.0));
                return DNUMBER;
            }
            IntegerValue::Double(value) => {
                self.value = Some(LiteralValue::Double(value));
                return DNUMBER;
            }
            IntegerValue::Invalid => {
                self.flags |= TokenFlags::INVALID_LITERAL;
                self.token_error(LexicalError::InvalidNumericLiteral);
            }
        }
        LNUMBER
    }

    /// Whether the previous token is a `-` in prefix position.
    fn after_unary_minus(&self) -> bool {
        self.prev == MINUS && !self.operand_ends[0]
    }
}

/// Kinds after which a `-` is a binary operator.
fn ends_operand(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        VARIABLE
            | IDENTIFIER
            | LNUMBER
            | DNUMBER
            | CONSTANT_ENCAPSED_STRING
            | STRING_VARNAME
            | END_HEREDOC
            | DOUBLE_QUOTE
            | BACKTICK
            | RPAREN
            | RBRACKET
            | INC
            | DEC
            | CLASS_C_KW
            | DIR_KW
            | FILE_KW
            | FUNC_C_KW
            | LINE_KW
            | METHOD_C_KW
            | NS_C_KW
            | TRAIT_C_KW
    )
}

/// Lexes the token at `position` and returns it with the position just past
/// its trailing trivia.
///
/// The position carries the lexer state along with the offset, so starting
/// from [`LexerCheckpoint::start`] and feeding every returned position back in
/// yields the same tokens as [`tokenize`]. Anomalies are not reported; use a
/// [`Lexer`] with an error handler for those.
pub fn lex(text: &str, position: LexerCheckpoint) -> (Token, LexerCheckpoint) {
    let mut lexer = Lexer::new(text, position.options);
    lexer.restore(position);
    let token = lexer.next_token();
    (token, LexerCheckpoint { diagnostics: 0, ..lexer.checkpoint() })
}

/// Lexes `text` to the end, calling `on_token` with each token and its
/// leading and trailing trivia. The last token is `EOF`.
pub fn tokenize(
    text: &str,
    options: LexerOptions,
    on_token: impl FnMut(&Token, &Trivia, &Trivia),
) {
    Lexer::new(text, options).tokenize(on_token);
}

#[cfg(test)]
mod tests;
