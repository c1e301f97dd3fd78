use std::mem;

use polar_errors::Diagnostic;
use polar_tokenizer::{Lexer, LexerCheckpoint, LexerOptions};
use polar_yellow::{SyntaxKind, SyntaxSet, Token};

use crate::context::{BacktrackScope, SyntaxParsingContext};
use crate::parsed::ParsedRawSyntaxNode;

pub(crate) struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
    ctx: SyntaxParsingContext,
    diagnostics: Vec<Diagnostic>,
}

/// Everything needed to rewind the parser, see [`Parser::checkpoint`].
pub(crate) struct Checkpoint {
    lexer: LexerCheckpoint,
    current: Token,
    diagnostics: usize,
    scope: BacktrackScope,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(text: &'src str, options: LexerOptions) -> Self {
        let mut lexer = Lexer::new(text, options);
        let current = lexer.next_token();
        Self { lexer, current, ctx: SyntaxParsingContext::new(), diagnostics: Vec::new() }
    }

    pub(crate) fn ctx(&self) -> &SyntaxParsingContext {
        &self.ctx
    }

    pub(crate) fn peek_kind(&self) -> SyntaxKind {
        self.current.kind()
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn at_set(&self, set: &SyntaxSet) -> bool {
        set.contains(self.peek_kind())
    }

    /// Consumes the current token. At the end of input the `EOF` token is
    /// returned without advancing.
    pub(crate) fn bump(&mut self) -> ParsedRawSyntaxNode {
        let next = if self.at(SyntaxKind::EOF) { self.current.clone() } else { self.lexer.next_token() };
        let token = mem::replace(&mut self.current, next);
        self.ctx.make_token(token)
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> ParsedRawSyntaxNode {
        if self.at(kind) { self.bump() } else { ParsedRawSyntaxNode::Null }
    }

    /// Consumes a token of `kind`, or reports it and leaves the slot empty.
    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> ParsedRawSyntaxNode {
        if self.at(kind) {
            return self.bump();
        }
        self.error(&format!("expected {}", describe(kind)));
        ParsedRawSyntaxNode::Null
    }

    pub(crate) fn error(&mut self, message: &str) {
        let range = self.current.range();
        tracing::debug!(?range, "{message}");
        self.diagnostics.push(Diagnostic::error(message, range));
    }

    /// Starts a speculative parse. Nodes made until the checkpoint is
    /// committed or rewound are deferred.
    pub(crate) fn checkpoint(&mut self) -> Checkpoint {
        Checkpoint {
            lexer: self.lexer.checkpoint(),
            current: self.current.clone(),
            diagnostics: self.diagnostics.len(),
            scope: self.ctx.begin_backtracking(self.current.range().start()),
        }
    }

    pub(crate) fn commit(
        &mut self,
        checkpoint: Checkpoint,
        node: ParsedRawSyntaxNode,
    ) -> ParsedRawSyntaxNode {
        checkpoint.scope.commit(&mut self.ctx, node)
    }

    /// Returns to `checkpoint`, forgetting every token and diagnostic since.
    pub(crate) fn rewind(&mut self, checkpoint: Checkpoint) {
        let Checkpoint { lexer, current, diagnostics, scope } = checkpoint;
        self.lexer.restore(lexer);
        self.current = current;
        self.diagnostics.truncate(diagnostics);
        scope.abandon(&mut self.ctx);
    }

    /// Lexical and syntax diagnostics, in source order.
    pub(crate) fn finish(self) -> (SyntaxParsingContext, Vec<Diagnostic>) {
        let Parser { lexer, current: _, ctx, diagnostics } = self;
        let mut all = lexer.into_diagnostics();
        all.extend(diagnostics);
        all.sort_by_key(|diagnostic| diagnostic.range().start());
        (ctx, all)
    }
}

fn describe(kind: SyntaxKind) -> String {
    match kind.text() {
        Some(text) => format!("'{text}'"),
        None => kind.display_name().to_owned(),
    }
}
