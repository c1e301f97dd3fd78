use std::cell::{Cell, RefCell};
use std::fmt;

use rustc_hash::FxHashMap;

use crate::{RawSyntax, RawSyntaxNode, SyntaxKind};

/// Number of raw nodes allocated through an arena.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ArenaStats {
    pub nodes: usize,
    pub tokens: usize,
}

impl ArenaStats {
    pub fn total(self) -> usize {
        self.nodes + self.tokens
    }
}

/// Allocation domain for raw syntax nodes.
///
/// Every recorded node of a parse is created through the same arena, which
/// also owns the canonical Missing placeholder of each kind. Nodes do not
/// point back to their arena and outlive it freely.
#[derive(Default)]
pub struct SyntaxArena {
    missing: RefCell<FxHashMap<SyntaxKind, RawSyntaxNode>>,
    stats: Cell<ArenaStats>,
}

impl SyntaxArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ArenaStats {
        self.stats.get()
    }

    pub(crate) fn alloc(&self, raw: RawSyntax) -> RawSyntaxNode {
        let mut stats = self.stats.get();
        if raw.is_token() {
            stats.tokens += 1;
        } else {
            stats.nodes += 1;
        }
        self.stats.set(stats);

        RawSyntaxNode::new(raw)
    }

    pub(crate) fn missing(&self, kind: SyntaxKind) -> RawSyntaxNode {
        if let Some(node) = self.missing.borrow().get(&kind) {
            return node.clone();
        }

        let node = self.alloc(RawSyntax::new_missing(kind));
        self.missing.borrow_mut().insert(kind, node.clone());
        node
    }
}

impl fmt::Debug for SyntaxArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxArena")
            .field("stats", &self.stats.get())
            .field("missing", &self.missing.borrow().len())
            .finish()
    }
}
