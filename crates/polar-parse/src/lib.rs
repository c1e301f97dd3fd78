//! Syntax tree construction on top of the lexer.
//!
//! Nodes are created through a [`SyntaxParsingContext`]: directly in the
//! arena while recording, or as [`ParsedRawSyntaxNode`] descriptions while a
//! speculative parse may still be rolled back. [`parse`] is a small grammar
//! client driving both modes.

mod context;
mod grammar;
mod parsed;
mod parser;
mod syntax;
#[cfg(test)]
mod tests;

pub use context::{BacktrackScope, ParsingMode, SyntaxParsingContext};
pub use parsed::ParsedRawSyntaxNode;
use polar_errors::Diagnostic;
use polar_tokenizer::LexerOptions;
use polar_yellow::{ArenaStats, RawSyntax, RawSyntaxNode, SyntaxKind};
pub use syntax::*;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ParseOptions {
    pub lexer: LexerOptions,
}

impl ParseOptions {
    /// Options for parsing a whole `.php` file.
    pub fn file() -> Self {
        Self { lexer: LexerOptions::file() }
    }
}

/// The result of parsing a buffer: always a tree, plus what went wrong.
#[derive(Debug)]
pub struct Parse {
    root: RawSyntaxNode,
    diagnostics: Vec<Diagnostic>,
    stats: ArenaStats,
}

impl Parse {
    /// The `SOURCE_FILE` node.
    pub fn root(&self) -> &RawSyntaxNode {
        &self.root
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Arena allocations made while parsing.
    pub fn stats(&self) -> ArenaStats {
        self.stats
    }

    pub fn debug_tree(&self) -> String {
        self.root.debug_tree()
    }
}

pub fn parse(text: &str, options: ParseOptions) -> Parse {
    let mut parser = parser::Parser::new(text, options.lexer);
    let source_file = grammar::source_file(&mut parser);
    let (ctx, diagnostics) = parser.finish();

    let arena = ctx.into_arena();
    let root = source_file
        .into_raw()
        .into_recorded(&arena)
        .unwrap_or_else(|| RawSyntax::missing(&arena, SyntaxKind::SOURCE_FILE));

    tracing::debug!(stats = ?arena.stats(), diagnostics = diagnostics.len(), "parsed source file");
    Parse { root, diagnostics, stats: arena.stats() }
}
