//! Immutable raw syntax trees with attached trivia.
//!
//! Tokens carry their exact source text, their leading and trailing trivia and
//! an optional literal value. Layout nodes hold their children in fixed slots
//! described by [`schema`]. A tree prints back to the exact text it was built
//! from, and nodes are freely shared between tree versions.

mod arena;
mod raw;
pub mod schema;
mod syntax_kind;
mod syntax_set;
mod token;
mod trivia;

pub use arena::{ArenaStats, SyntaxArena};
pub use raw::{Presence, RawSyntax, RawSyntaxNode, SchemaError, Tokens};
/// Token and node kinds used throughout the tree.
pub use syntax_kind::{SyntaxKind, TokenCategory};
/// Compact set for grouping `SyntaxKind` values.
pub use syntax_set::SyntaxSet;
pub use token::{LiteralValue, Token, TokenFlags};
pub use trivia::{Trivia, TriviaPiece};
pub use text_size::{TextRange, TextSize};
