use polar_yellow::schema::{self, Layout};
use polar_yellow::{RawSyntax, RawSyntaxNode, SyntaxArena, SyntaxKind, Token};

/// A node handed out by the parsing context.
///
/// Outside of backtracking every node is `Recorded`: it already lives in the
/// arena. While backtracking, nodes are deferred descriptions that cost no
/// arena allocation and are either recorded on commit or dropped.
#[derive(Clone, Debug, Default)]
pub enum ParsedRawSyntaxNode {
    /// No node. Builders replace it with the Missing placeholder of the slot.
    #[default]
    Null,
    DeferredToken(Token),
    DeferredLayout { kind: SyntaxKind, children: Vec<ParsedRawSyntaxNode> },
    DeferredMissing(SyntaxKind),
    Recorded(RawSyntaxNode),
}

impl ParsedRawSyntaxNode {
    pub fn kind(&self) -> Option<SyntaxKind> {
        match self {
            Self::Null => None,
            Self::DeferredToken(token) => Some(token.kind()),
            Self::DeferredLayout { kind, .. } | Self::DeferredMissing(kind) => Some(*kind),
            Self::Recorded(node) => Some(node.kind()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::DeferredToken(_) | Self::DeferredLayout { .. } | Self::DeferredMissing(_))
    }

    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded(_))
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Self::DeferredMissing(_) => true,
            Self::Recorded(node) => node.is_missing(),
            Self::Null | Self::DeferredToken(_) | Self::DeferredLayout { .. } => false,
        }
    }

    pub fn recorded(&self) -> Option<&RawSyntaxNode> {
        match self {
            Self::Recorded(node) => Some(node),
            _ => None,
        }
    }

    /// The token of a token node, deferred or recorded.
    pub fn token(&self) -> Option<&Token> {
        match self {
            Self::DeferredToken(token) => Some(token),
            Self::Recorded(node) => node.token(),
            _ => None,
        }
    }

    pub fn children_len(&self) -> usize {
        match self {
            Self::DeferredLayout { children, .. } => children.len(),
            Self::Recorded(node) => node.children().len(),
            Self::Null | Self::DeferredToken(_) | Self::DeferredMissing(_) => 0,
        }
    }

    /// Child `index`, or `Null` if there is none.
    pub fn child(&self, index: usize) -> Self {
        match self {
            Self::DeferredLayout { children, .. } => children.get(index).cloned().unwrap_or_default(),
            Self::Recorded(node) => node.child(index).cloned().map_or(Self::Null, Self::Recorded),
            Self::Null | Self::DeferredToken(_) | Self::DeferredMissing(_) => Self::Null,
        }
    }

    /// Number of deferred nodes reachable from this one.
    pub fn deferred_count(&self) -> usize {
        match self {
            Self::Null | Self::Recorded(_) => 0,
            Self::DeferredToken(_) | Self::DeferredMissing(_) => 1,
            Self::DeferredLayout { children, .. } => {
                1 + children.iter().map(Self::deferred_count).sum::<usize>()
            }
        }
    }

    /// Records every deferred node of this subgraph, children first.
    ///
    /// A `Null` child of a deferred layout becomes the Missing placeholder of
    /// its slot. Returns `None` for `Null`.
    pub fn into_recorded(self, arena: &SyntaxArena) -> Option<RawSyntaxNode> {
        let node = match self {
            Self::Null => return None,
            Self::DeferredToken(token) => RawSyntax::make_token(arena, token),
            Self::DeferredMissing(kind) => RawSyntax::missing(arena, kind),
            Self::DeferredLayout { kind, children } => {
                let children = record_children(arena, kind, children);
                RawSyntax::make_layout(arena, kind, children)
            }
            Self::Recorded(node) => node,
        };
        Some(node)
    }
}

impl From<RawSyntaxNode> for ParsedRawSyntaxNode {
    fn from(node: RawSyntaxNode) -> Self {
        Self::Recorded(node)
    }
}

pub(crate) fn record_children(
    arena: &SyntaxArena,
    kind: SyntaxKind,
    children: Vec<ParsedRawSyntaxNode>,
) -> Vec<RawSyntaxNode> {
    children
        .into_iter()
        .enumerate()
        .map(|(index, child)| {
            child
                .into_recorded(arena)
                .unwrap_or_else(|| RawSyntax::missing(arena, expected_kind(kind, index)))
        })
        .collect()
}

/// Kind of the Missing placeholder for child `index` of `kind`.
pub(crate) fn expected_kind(kind: SyntaxKind, index: usize) -> SyntaxKind {
    match schema::layout(kind) {
        Layout::Collection { element, .. } => element,
        layout => layout.slot(index).map_or(SyntaxKind::UNKNOWN, |slot| slot.expected),
    }
}
