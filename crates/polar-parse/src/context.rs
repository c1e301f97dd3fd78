use drop_bomb::DropBomb;
use polar_yellow::schema::{self, Layout};
use polar_yellow::{RawSyntax, SyntaxArena, SyntaxKind, TextSize, Token};

use crate::parsed::{ParsedRawSyntaxNode, expected_kind, record_children};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParsingMode {
    /// Nodes go straight into the arena.
    Recording,
    /// Nodes are deferred until the enclosing region is committed.
    Backtracking,
}

/// Decides whether nodes are recorded or deferred, and owns the arena they
/// are recorded into.
#[derive(Debug, Default)]
pub struct SyntaxParsingContext {
    arena: SyntaxArena,
    /// Start offsets of the open backtracking regions, innermost last.
    regions: Vec<TextSize>,
}

impl SyntaxParsingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arena(&self) -> &SyntaxArena {
        &self.arena
    }

    pub fn into_arena(self) -> SyntaxArena {
        self.arena
    }

    pub fn mode(&self) -> ParsingMode {
        if self.regions.is_empty() { ParsingMode::Recording } else { ParsingMode::Backtracking }
    }

    /// Start offsets of the open backtracking regions, outermost first.
    pub fn open_regions(&self) -> &[TextSize] {
        &self.regions
    }

    pub fn is_backtracking(&self) -> bool {
        self.mode() == ParsingMode::Backtracking
    }

    /// Enters a region starting at `start` that may be rolled back. Regions
    /// nest.
    pub fn begin_backtracking(&mut self, start: TextSize) -> BacktrackScope {
        self.regions.push(start);
        let depth = self.regions.len();
        tracing::trace!(depth, ?start, "entering backtracking region");
        BacktrackScope {
            depth,
            start,
            bomb: DropBomb::new("BacktrackScope must be either committed or abandoned"),
        }
    }

    fn leave(&mut self, scope: &BacktrackScope) {
        assert_eq!(
            (self.regions.len(), self.regions.last().copied()),
            (scope.depth, Some(scope.start)),
            "backtracking regions must be closed innermost first"
        );
        self.regions.pop();
    }

    pub fn record_token(&self, token: Token) -> ParsedRawSyntaxNode {
        ParsedRawSyntaxNode::Recorded(RawSyntax::make_token(&self.arena, token))
    }

    pub fn defer_token(token: Token) -> ParsedRawSyntaxNode {
        ParsedRawSyntaxNode::DeferredToken(token)
    }

    pub fn make_token(&self, token: Token) -> ParsedRawSyntaxNode {
        match self.mode() {
            ParsingMode::Recording => self.record_token(token),
            ParsingMode::Backtracking => Self::defer_token(token),
        }
    }

    pub fn record_missing(&self, kind: SyntaxKind) -> ParsedRawSyntaxNode {
        ParsedRawSyntaxNode::Recorded(RawSyntax::missing(&self.arena, kind))
    }

    pub fn defer_missing(kind: SyntaxKind) -> ParsedRawSyntaxNode {
        ParsedRawSyntaxNode::DeferredMissing(kind)
    }

    pub fn make_missing(&self, kind: SyntaxKind) -> ParsedRawSyntaxNode {
        match self.mode() {
            ParsingMode::Recording => self.record_missing(kind),
            ParsingMode::Backtracking => Self::defer_missing(kind),
        }
    }

    /// Records a layout node. `Null` children become Missing placeholders.
    ///
    /// # Panics
    ///
    /// If `children` does not fit the schema of `kind`.
    #[track_caller]
    pub fn record_layout(
        &self,
        kind: SyntaxKind,
        children: Vec<ParsedRawSyntaxNode>,
    ) -> ParsedRawSyntaxNode {
        let children = record_children(&self.arena, kind, children);
        ParsedRawSyntaxNode::Recorded(RawSyntax::make_layout(&self.arena, kind, children))
    }

    /// Describes a layout node without allocating it.
    ///
    /// # Panics
    ///
    /// If `children` does not fit the schema of `kind`.
    #[track_caller]
    pub fn defer_layout(kind: SyntaxKind, children: Vec<ParsedRawSyntaxNode>) -> ParsedRawSyntaxNode {
        check_deferred(kind, &children);
        let children = children
            .into_iter()
            .enumerate()
            .map(|(index, child)| match child {
                ParsedRawSyntaxNode::Null => Self::defer_missing(expected_kind(kind, index)),
                child => child,
            })
            .collect();
        ParsedRawSyntaxNode::DeferredLayout { kind, children }
    }

    #[track_caller]
    pub fn make_layout(
        &self,
        kind: SyntaxKind,
        children: Vec<ParsedRawSyntaxNode>,
    ) -> ParsedRawSyntaxNode {
        match self.mode() {
            ParsingMode::Recording => self.record_layout(kind, children),
            ParsingMode::Backtracking => Self::defer_layout(kind, children),
        }
    }
}

/// Deferred layouts are checked as strictly as recorded ones.
#[track_caller]
fn check_deferred(kind: SyntaxKind, children: &[ParsedRawSyntaxNode]) {
    let layout = schema::layout(kind);
    match layout {
        Layout::Token => panic!("invalid layout: {kind:?} is not a layout kind"),
        Layout::Fixed(slots) => assert!(
            slots.len() == children.len(),
            "invalid layout: {kind:?} expects {} children, found {}",
            slots.len(),
            children.len()
        ),
        Layout::Collection { .. } => {}
    }

    for (index, child) in children.iter().enumerate() {
        if let Some(found) = child.kind() {
            assert!(
                layout.accepts(index, found),
                "invalid layout: {kind:?} child #{index} cannot be {found:?}"
            );
        }
    }
}

/// An open backtracking region, see [`SyntaxParsingContext::begin_backtracking`].
pub struct BacktrackScope {
    depth: usize,
    start: TextSize,
    bomb: DropBomb,
}

impl BacktrackScope {
    /// Closes the region keeping `node`. Closing the outermost region records
    /// every deferred node reachable from `node`.
    pub fn commit(
        mut self,
        ctx: &mut SyntaxParsingContext,
        node: ParsedRawSyntaxNode,
    ) -> ParsedRawSyntaxNode {
        self.bomb.defuse();
        ctx.leave(&self);
        if ctx.is_backtracking() {
            return node;
        }

        let deferred = node.deferred_count();
        tracing::trace!(start = ?self.start, deferred, "committing backtracking region");
        node.into_recorded(&ctx.arena).map_or(ParsedRawSyntaxNode::Null, ParsedRawSyntaxNode::Recorded)
    }

    /// Closes the region dropping everything deferred inside it.
    pub fn abandon(mut self, ctx: &mut SyntaxParsingContext) {
        self.bomb.defuse();
        ctx.leave(&self);
        tracing::trace!(depth = self.depth, start = ?self.start, "abandoning backtracking region");
    }
}
