//! The lexical unit handed from the lexer to the tree.

use std::fmt;

use text_size::{TextRange, TextSize};

use crate::{SyntaxKind, Trivia};

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct TokenFlags: u8 {
        /// The token is the first one on its line.
        const AT_START_OF_LINE = 1 << 0;
        /// A reserved word spelled in identifier position, lexed as `IDENTIFIER`.
        const ESCAPED_IDENTIFIER = 1 << 1;
        /// `-` followed by the integer literal `9223372036854775808`: the pair
        /// denotes `i64::MIN` and must not be negated again.
        const NEEDS_LITERAL_OVERFLOW_CORRECTION = 1 << 2;
        const INVALID_LITERAL = 1 << 3;
    }
}

/// Semantic value computed by the lexer for literal tokens.
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    Integer(i64),
    Double(f64),
    /// Escape-resolved bytes; not necessarily UTF-8.
    String(Box<[u8]>),
}

impl LiteralValue {
    pub fn string(bytes: impl Into<Vec<u8>>) -> Self {
        Self::String(bytes.into().into_boxed_slice())
    }

    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Self::Integer(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match *self {
            Self::Double(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::String(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// An immutable token. `with_*` methods return an updated copy.
#[derive(Clone, PartialEq)]
pub struct Token {
    kind: SyntaxKind,
    range: TextRange,
    text: Box<str>,
    flags: TokenFlags,
    leading: Trivia,
    trailing: Trivia,
    value: Option<LiteralValue>,
}

impl Token {
    pub fn new(kind: SyntaxKind, range: TextRange, text: impl Into<Box<str>>) -> Self {
        debug_assert!(kind.is_token(), "{kind:?} is not a token kind");
        Self {
            kind,
            range,
            text: text.into(),
            flags: TokenFlags::empty(),
            leading: Trivia::empty(),
            trailing: Trivia::empty(),
            value: None,
        }
    }

    /// A token with the canonical spelling of `kind` (empty if it has none).
    pub fn synthesized(kind: SyntaxKind) -> Self {
        let text = kind.text().unwrap_or_default();
        Self::new(kind, TextRange::empty(TextSize::new(0)), text)
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    /// The range of the raw text in the source buffer, excluding trivia.
    pub fn range(&self) -> TextRange {
        self.range
    }

    /// The exact original bytes, including unresolved escape sequences.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn flags(&self) -> TokenFlags {
        self.flags
    }

    pub fn leading_trivia(&self) -> &Trivia {
        &self.leading
    }

    pub fn trailing_trivia(&self) -> &Trivia {
        &self.trailing
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&LiteralValue> {
        self.value.as_ref()
    }

    pub fn is_at_start_of_line(&self) -> bool {
        self.flags.contains(TokenFlags::AT_START_OF_LINE)
    }

    pub fn is_invalid_literal(&self) -> bool {
        self.flags.contains(TokenFlags::INVALID_LITERAL)
    }

    pub fn needs_literal_overflow_correction(&self) -> bool {
        self.flags.contains(TokenFlags::NEEDS_LITERAL_OVERFLOW_CORRECTION)
    }

    /// Length of leading trivia, text and trailing trivia.
    pub fn full_text_len(&self) -> TextSize {
        self.leading.text_len() + TextSize::of(&*self.text) + self.trailing.text_len()
    }

    pub fn with_kind(mut self, kind: SyntaxKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_text(mut self, text: impl Into<Box<str>>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_flags(mut self, flags: TokenFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_leading_trivia(mut self, trivia: Trivia) -> Self {
        self.leading = trivia;
        self
    }

    pub fn with_trailing_trivia(mut self, trivia: Trivia) -> Self {
        self.trailing = trivia;
        self
    }

    pub fn with_value(mut self, value: Option<LiteralValue>) -> Self {
        self.value = value;
        self
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Token");
        debug.field("kind", &self.kind).field("range", &self.range).field("text", &self.text);
        if !self.flags.is_empty() {
            debug.field("flags", &self.flags);
        }
        if let Some(value) = &self.value {
            debug.field("value", value);
        }
        debug.finish_non_exhaustive()
    }
}

/// Writes leading trivia, text and trailing trivia.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.leading, self.text, self.trailing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TriviaPiece;

    #[test]
    fn with_methods_leave_original_untouched() {
        let original = Token::new(SyntaxKind::VARIABLE, TextRange::empty(0.into()), "$a");
        let renamed = original.clone().with_text("$b").with_flags(TokenFlags::AT_START_OF_LINE);

        assert_eq!(original.text(), "$a");
        assert!(!original.is_at_start_of_line());
        assert_eq!(renamed.text(), "$b");
        assert!(renamed.is_at_start_of_line());
    }

    #[test]
    fn display_includes_trivia() {
        let token = Token::synthesized(SyntaxKind::SEMICOLON)
            .with_leading_trivia(Trivia::new([TriviaPiece::Spaces(2)]))
            .with_trailing_trivia(Trivia::new([TriviaPiece::LineComment("// end".into())]));

        assert_eq!(token.to_string(), "  ;// end");
        assert_eq!(token.full_text_len(), TextSize::new(9));
    }
}
