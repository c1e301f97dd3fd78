//! Trivia pieces attached to tokens.

use std::fmt;

use text_size::TextSize;

/// A trivia fragment: a run of one whitespace character or a comment.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TriviaPiece {
    Spaces(u32),
    Tabs(u32),
    Newlines(u32),
    CarriageReturns(u32),
    CarriageReturnLineFeeds(u32),
    /// `// ...` or `# ...`, without the terminating newline.
    LineComment(Box<str>),
    /// `/* ... */`
    BlockComment(Box<str>),
    /// `/** ... */`
    DocComment(Box<str>),
}

impl TriviaPiece {
    pub fn text_len(&self) -> TextSize {
        let len = match self {
            Self::Spaces(n) | Self::Tabs(n) | Self::Newlines(n) | Self::CarriageReturns(n) => *n,
            Self::CarriageReturnLineFeeds(n) => n * 2,
            Self::LineComment(text) | Self::BlockComment(text) | Self::DocComment(text) => {
                text.len() as u32
            }
        };
        TextSize::new(len)
    }

    /// Returns `true` if this piece ends a line.
    pub fn is_newline(&self) -> bool {
        matches!(self, Self::Newlines(_) | Self::CarriageReturns(_) | Self::CarriageReturnLineFeeds(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Self::LineComment(_) | Self::BlockComment(_) | Self::DocComment(_))
    }

    /// Extends a run of the same character, returning `false` if `self` is not such a run.
    pub(crate) fn try_extend(&mut self, other: &Self) -> bool {
        match (self, other) {
            (Self::Spaces(n), Self::Spaces(m))
            | (Self::Tabs(n), Self::Tabs(m))
            | (Self::Newlines(n), Self::Newlines(m))
            | (Self::CarriageReturns(n), Self::CarriageReturns(m))
            | (Self::CarriageReturnLineFeeds(n), Self::CarriageReturnLineFeeds(m)) => {
                *n += m;
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for TriviaPiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (unit, count) = match self {
            Self::Spaces(n) => (" ", *n),
            Self::Tabs(n) => ("\t", *n),
            Self::Newlines(n) => ("\n", *n),
            Self::CarriageReturns(n) => ("\r", *n),
            Self::CarriageReturnLineFeeds(n) => ("\r\n", *n),
            Self::LineComment(text) | Self::BlockComment(text) | Self::DocComment(text) => {
                return f.write_str(text);
            }
        };
        for _ in 0..count {
            f.write_str(unit)?;
        }
        Ok(())
    }
}

/// An ordered run of trivia pieces on one side of a token.
#[derive(Clone, Default, Eq, Hash, PartialEq)]
pub struct Trivia {
    pieces: Box<[TriviaPiece]>,
}

impl fmt::Debug for Trivia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trivia")
            .field("pieces", &self.pieces())
            .field("total_len", &self.text_len())
            .finish()
    }
}

impl Trivia {
    pub fn new(pieces: impl IntoIterator<Item = TriviaPiece>) -> Self {
        let mut merged: Vec<TriviaPiece> = Vec::new();
        for piece in pieces {
            if !merged.last_mut().is_some_and(|last| last.try_extend(&piece)) {
                merged.push(piece);
            }
        }
        Self { pieces: merged.into_boxed_slice() }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn pieces(&self) -> &[TriviaPiece] {
        &self.pieces
    }

    pub fn text_len(&self) -> TextSize {
        self.pieces.iter().map(TriviaPiece::text_len).sum()
    }

    pub fn contains_newline(&self) -> bool {
        self.pieces.iter().any(TriviaPiece::is_newline)
    }
}

impl fmt::Display for Trivia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.pieces.iter().try_for_each(|piece| fmt::Display::fmt(piece, f))
    }
}
