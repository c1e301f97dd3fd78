//! Immutable, reference-counted raw syntax nodes.
//!
//! A node is either a token leaf or a layout node whose children follow the
//! schema of its kind. Nodes are shared between tree versions: editing with
//! [`RawSyntax::with_child`] allocates a new parent and reuses every other child.

use std::fmt::{self, Write as _};
use std::ops::Deref;

use text_size::{TextRange, TextSize};
use triomphe::Arc;

use crate::schema::{self, Layout};
use crate::{SyntaxArena, SyntaxKind, Token};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Presence {
    Present,
    Missing,
}

/// A violation of the per-kind layout schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{kind:?} is not a layout kind")]
    NotLayout { kind: SyntaxKind },
    #[error("{kind:?} expects {expected} children, found {found}")]
    ChildCount { kind: SyntaxKind, expected: usize, found: usize },
    #[error("{kind:?} child #{index} ({slot}) cannot be {found:?}")]
    ChildKind { kind: SyntaxKind, index: usize, slot: &'static str, found: SyntaxKind },
}

pub struct RawSyntax {
    kind: SyntaxKind,
    presence: Presence,
    text_len: TextSize,
    data: RawSyntaxData,
}

enum RawSyntaxData {
    Token(Token),
    Layout(Box<[RawSyntaxNode]>),
}

/// Shared handle to a [`RawSyntax`] node.
#[derive(Clone)]
pub struct RawSyntaxNode(Arc<RawSyntax>);

impl Deref for RawSyntaxNode {
    type Target = RawSyntax;

    #[inline]
    fn deref(&self) -> &RawSyntax {
        &self.0
    }
}

impl RawSyntaxNode {
    pub(crate) fn new(raw: RawSyntax) -> Self {
        Self(Arc::new(raw))
    }

    /// Identity comparison.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Children compare by identity first and fall back to structure.
impl PartialEq for RawSyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl PartialEq for RawSyntax {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind || self.presence != other.presence {
            return false;
        }
        match (&self.data, &other.data) {
            (RawSyntaxData::Token(lhs), RawSyntaxData::Token(rhs)) => lhs == rhs,
            (RawSyntaxData::Layout(lhs), RawSyntaxData::Layout(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

impl RawSyntax {
    pub fn make_token(arena: &SyntaxArena, token: Token) -> RawSyntaxNode {
        Self::make_token_with_presence(arena, token, Presence::Present)
    }

    pub fn make_token_with_presence(
        arena: &SyntaxArena,
        token: Token,
        presence: Presence,
    ) -> RawSyntaxNode {
        let text_len = token.full_text_len();
        arena.alloc(Self { kind: token.kind(), presence, text_len, data: RawSyntaxData::Token(token) })
    }

    /// Creates a present layout node.
    ///
    /// # Panics
    ///
    /// If `children` does not match the schema of `kind`. That is a bug in
    /// the caller, not a property of the input being parsed.
    #[track_caller]
    pub fn make_layout(
        arena: &SyntaxArena,
        kind: SyntaxKind,
        children: Vec<RawSyntaxNode>,
    ) -> RawSyntaxNode {
        if let Err(err) = check_children(kind, &children) {
            panic!("invalid layout: {err}");
        }
        let text_len = children.iter().map(|child| child.text_len).sum();
        arena.alloc(Self {
            kind,
            presence: Presence::Present,
            text_len,
            data: RawSyntaxData::Layout(children.into_boxed_slice()),
        })
    }

    /// The canonical Missing placeholder for a slot of kind `kind`.
    pub fn missing(arena: &SyntaxArena, kind: SyntaxKind) -> RawSyntaxNode {
        arena.missing(kind)
    }

    #[track_caller]
    pub fn missing_token(arena: &SyntaxArena, kind: SyntaxKind) -> RawSyntaxNode {
        assert!(kind.is_token(), "{kind:?} is not a token kind");
        arena.missing(kind)
    }

    /// Missing tokens have no text; missing layouts have no children.
    pub(crate) fn new_missing(kind: SyntaxKind) -> Self {
        let data = if kind.is_token() {
            RawSyntaxData::Token(Token::new(kind, TextRange::empty(TextSize::new(0)), ""))
        } else {
            RawSyntaxData::Layout(Box::default())
        };
        Self { kind, presence: Presence::Missing, text_len: TextSize::new(0), data }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    #[inline]
    pub fn presence(&self) -> Presence {
        self.presence
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        self.presence == Presence::Missing
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        self.presence == Presence::Present
    }

    #[inline]
    pub fn is_token(&self) -> bool {
        matches!(self.data, RawSyntaxData::Token(_))
    }

    #[inline]
    pub fn is_layout(&self) -> bool {
        !self.is_token()
    }

    /// Full text length including trivia of every token.
    #[inline]
    pub fn text_len(&self) -> TextSize {
        self.text_len
    }

    pub fn token(&self) -> Option<&Token> {
        match &self.data {
            RawSyntaxData::Token(token) => Some(token),
            RawSyntaxData::Layout(_) => None,
        }
    }

    pub fn children(&self) -> &[RawSyntaxNode] {
        match &self.data {
            RawSyntaxData::Token(_) => &[],
            RawSyntaxData::Layout(children) => children,
        }
    }

    pub fn child(&self, index: usize) -> Option<&RawSyntaxNode> {
        self.children().get(index)
    }

    /// Returns a copy of this layout with child `index` replaced.
    ///
    /// The receiver is left untouched and all other children are shared.
    #[track_caller]
    pub fn with_child(
        &self,
        arena: &SyntaxArena,
        index: usize,
        child: RawSyntaxNode,
    ) -> RawSyntaxNode {
        let RawSyntaxData::Layout(children) = &self.data else {
            panic!("cannot replace a child of token {:?}", self.kind);
        };
        assert!(index < children.len(), "{:?} has no child #{index}", self.kind);

        let mut children = children.to_vec();
        children[index] = child;
        Self::make_layout(arena, self.kind, children)
    }

    /// Checks the direct children of this node against its schema.
    pub fn validate(&self) -> Result<(), SchemaError> {
        match &self.data {
            RawSyntaxData::Token(_) => Ok(()),
            RawSyntaxData::Layout(children) if self.is_missing() && children.is_empty() => Ok(()),
            RawSyntaxData::Layout(children) => check_children(self.kind, children),
        }
    }

    /// Validates this node and all of its descendants.
    pub fn validate_tree(&self) -> Result<(), SchemaError> {
        self.validate()?;
        self.children().iter().try_for_each(|child| child.validate_tree())
    }

    /// Present tokens in source order.
    pub fn tokens(&self) -> Tokens<'_> {
        Tokens { stack: vec![self] }
    }

    pub fn debug_tree(&self) -> String {
        let mut buf = String::new();
        self.write_debug_tree(&mut buf, 0);
        buf
    }

    fn write_debug_tree(&self, buf: &mut String, indent: usize) {
        _ = write!(buf, "{:indent$}{:?}", "", self.kind, indent = indent * 2);
        match &self.data {
            _ if self.is_missing() => buf.push_str(" <missing>\n"),
            RawSyntaxData::Token(token) => {
                _ = writeln!(buf, " {:?}", token.text());
            }
            RawSyntaxData::Layout(children) => {
                buf.push('\n');
                for child in children {
                    child.write_debug_tree(buf, indent + 1);
                }
            }
        }
    }
}

fn check_children(kind: SyntaxKind, children: &[RawSyntaxNode]) -> Result<(), SchemaError> {
    let layout = schema::layout(kind);
    match layout {
        Layout::Token => return Err(SchemaError::NotLayout { kind }),
        Layout::Fixed(slots) if slots.len() != children.len() => {
            return Err(SchemaError::ChildCount {
                kind,
                expected: slots.len(),
                found: children.len(),
            });
        }
        Layout::Fixed(_) | Layout::Collection { .. } => {}
    }

    for (index, child) in children.iter().enumerate() {
        if !layout.accepts(index, child.kind) {
            let slot = layout.slot(index).map_or("element", |slot| slot.name);
            return Err(SchemaError::ChildKind { kind, index, slot, found: child.kind });
        }
    }

    Ok(())
}

/// Preorder iterator over present tokens.
pub struct Tokens<'a> {
    stack: Vec<&'a RawSyntax>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a Token;

    fn next(&mut self) -> Option<&'a Token> {
        while let Some(node) = self.stack.pop() {
            match &node.data {
                RawSyntaxData::Token(token) if node.is_present() => return Some(token),
                RawSyntaxData::Token(_) => {}
                RawSyntaxData::Layout(children) => {
                    self.stack.extend(children.iter().rev().map(|child| &**child));
                }
            }
        }
        None
    }
}

/// Writes the exact source text covered by the node.
impl fmt::Display for RawSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tokens().try_for_each(|token| fmt::Display::fmt(token, f))
    }
}

impl fmt::Display for RawSyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}

impl fmt::Debug for RawSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            RawSyntaxData::Token(token) => {
                f.debug_tuple("Token").field(&self.presence).field(token).finish()
            }
            RawSyntaxData::Layout(children) => f
                .debug_struct("Layout")
                .field("kind", &self.kind)
                .field("presence", &self.presence)
                .field("children", children)
                .finish(),
        }
    }
}

impl fmt::Debug for RawSyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::*;
    use crate::{Trivia, TriviaPiece};

    fn token(arena: &SyntaxArena, kind: SyntaxKind, text: &str) -> RawSyntaxNode {
        RawSyntax::make_token(arena, Token::new(kind, TextRange::empty(0.into()), text))
    }

    fn variable(arena: &SyntaxArena, name: &str) -> RawSyntaxNode {
        RawSyntax::make_layout(arena, VARIABLE_EXPR, vec![token(arena, VARIABLE, name)])
    }

    #[test]
    fn layout_text_is_concatenation_of_tokens() {
        let arena = SyntaxArena::new();
        let plus = RawSyntax::make_token(
            &arena,
            Token::new(PLUS, TextRange::empty(0.into()), "+")
                .with_leading_trivia(Trivia::new([TriviaPiece::Spaces(1)]))
                .with_trailing_trivia(Trivia::new([TriviaPiece::Spaces(1)])),
        );
        let binary = RawSyntax::make_layout(
            &arena,
            BINARY_EXPR,
            vec![variable(&arena, "$a"), plus, variable(&arena, "$b")],
        );

        assert_eq!(binary.to_string(), "$a + $b");
        assert_eq!(binary.text_len(), TextSize::new(7));
        assert!(binary.validate_tree().is_ok());
    }

    #[test]
    #[should_panic(expected = "BINARY_EXPR expects 3 children, found 1")]
    fn wrong_arity_is_fatal() {
        let arena = SyntaxArena::new();
        RawSyntax::make_layout(&arena, BINARY_EXPR, vec![variable(&arena, "$a")]);
    }

    #[test]
    #[should_panic(expected = "PAREN_EXPR child #0 (lparen) cannot be RPAREN")]
    fn wrong_child_kind_is_fatal() {
        let arena = SyntaxArena::new();
        RawSyntax::make_layout(
            &arena,
            PAREN_EXPR,
            vec![token(&arena, RPAREN, ")"), variable(&arena, "$a"), token(&arena, RPAREN, ")")],
        );
    }

    #[test]
    fn missing_placeholders_are_canonical() {
        let arena = SyntaxArena::new();
        let first = RawSyntax::missing(&arena, EXPR);
        let second = RawSyntax::missing(&arena, EXPR);

        assert!(first.ptr_eq(&second));
        assert!(first.is_missing());
        assert!(first.children().is_empty());
        assert!(RawSyntax::missing_token(&arena, SEMICOLON).token().is_some());
        assert_eq!(arena.stats().nodes, 1);
        assert_eq!(arena.stats().tokens, 1);
    }

    #[test]
    fn partially_missing_layout_is_present() {
        let arena = SyntaxArena::new();
        let stmt = RawSyntax::make_layout(
            &arena,
            EXPR_STMT,
            vec![variable(&arena, "$a"), RawSyntax::missing_token(&arena, SEMICOLON)],
        );

        assert!(stmt.is_present());
        assert_eq!(stmt.to_string(), "$a");
        assert_eq!(stmt.tokens().count(), 1);
    }

    #[test]
    fn with_child_shares_untouched_children() {
        let arena = SyntaxArena::new();
        let lhs = variable(&arena, "$a");
        let binary = RawSyntax::make_layout(
            &arena,
            BINARY_EXPR,
            vec![lhs.clone(), token(&arena, PLUS, "+"), variable(&arena, "$b")],
        );

        let edited = binary.with_child(&arena, 2, variable(&arena, "$c"));

        assert_eq!(binary.to_string(), "$a+$b");
        assert_eq!(edited.to_string(), "$a+$c");
        assert!(edited.children()[0].ptr_eq(&lhs));
        assert!(edited.children()[1].ptr_eq(&binary.children()[1]));
        assert!(binary != edited);
    }

    #[test]
    fn structural_equality() {
        let arena = SyntaxArena::new();
        let first = variable(&arena, "$a");
        let second = variable(&arena, "$a");

        assert!(!first.ptr_eq(&second));
        assert_eq!(first, second);
        assert_ne!(first, variable(&arena, "$b"));
        assert_ne!(RawSyntax::missing(&arena, EXPR), RawSyntax::missing(&arena, STMT));
    }

    #[test]
    fn validate_reports_foreign_kinds() {
        let arena = SyntaxArena::new();
        let list = RawSyntax::make_layout(&arena, INNER_STATEMENT_LIST, vec![]);
        assert!(list.validate().is_ok());

        let err = check_children(EXPR_LIST, &[variable(&arena, "$a")]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::ChildKind { kind: EXPR_LIST, index: 0, slot: "element", found: VARIABLE_EXPR }
        );
    }

    #[test]
    fn debug_tree() {
        let arena = SyntaxArena::new();
        let stmt = RawSyntax::make_layout(
            &arena,
            EXPR_STMT,
            vec![variable(&arena, "$a"), RawSyntax::missing_token(&arena, SEMICOLON)],
        );

        assert_eq!(
            stmt.debug_tree(),
            "EXPR_STMT\n  VARIABLE_EXPR\n    VARIABLE \"$a\"\n  SEMICOLON <missing>\n"
        );
    }
}
