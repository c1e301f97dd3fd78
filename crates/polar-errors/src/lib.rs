use std::fmt;

pub use text_size::TextRange;

/// A lexical anomaly. None of these stop tokenization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexicalError {
    #[error("Invalid numeric literal")]
    InvalidNumericLiteral,
    #[error("Unterminated string literal")]
    UnterminatedString,
    #[error("Unterminated heredoc, expected closing label `{label}`")]
    UnterminatedHeredoc { label: String },
    #[error("Unterminated comment")]
    UnterminatedComment,
    #[error("Invalid UTF-8 codepoint escape sequence")]
    InvalidUnicodeEscape,
    #[error("Invalid UTF-8 codepoint escape sequence: Codepoint too large")]
    UnicodeEscapeTooLarge,
    #[error("Invalid body indentation level (expecting an indentation level of at least {expected})")]
    InvalidHeredocBodyIndentation { expected: usize },
    #[error("Invalid indentation - tabs and spaces cannot be mixed")]
    MixedHeredocIndentation,
    #[error("Unexpected character")]
    UnexpectedCharacter,
}

impl LexicalError {
    /// Stable numeric code of this anomaly.
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidNumericLiteral => 1001,
            Self::UnterminatedString => 1002,
            Self::UnterminatedHeredoc { .. } => 1003,
            Self::UnterminatedComment => 1004,
            Self::InvalidUnicodeEscape => 1005,
            Self::UnicodeEscapeTooLarge => 1006,
            Self::InvalidHeredocBodyIndentation { .. } => 1007,
            Self::MixedHeredocIndentation => 1008,
            Self::UnexpectedCharacter => 1009,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    message: String,
    code: u32,
    range: TextRange,
}

impl Diagnostic {
    /// Code shared by all diagnostics reported by the grammar client.
    pub const SYNTAX: u32 = 2001;

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn error(message: impl Into<String>, range: TextRange) -> Self {
        Self { message: message.into(), code: Self::SYNTAX, range }
    }

    pub fn lexical(error: &LexicalError, range: TextRange) -> Self {
        Self { message: error.to_string(), code: error.code(), range }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error[{}] at {:?}: {}", self.code, self.range, self.message)
    }
}
