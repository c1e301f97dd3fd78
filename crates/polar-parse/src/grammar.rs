use polar_yellow::SyntaxKind::*;
use polar_yellow::SyntaxSet;
use polar_yellow::schema::{CAST_TOKENS, LITERAL_TOKENS, PREFIX_OPERATORS};

use crate::parser::Parser;
use crate::syntax::{ParsedSourceFileSyntax, ParsedSyntax as _, SourceFileSyntaxBuilder};

mod exprs;
mod stmts;
mod strings;

/// Tokens that may start an expression.
const EXPR_FIRST: SyntaxSet = SyntaxSet::new([
    VARIABLE,
    IDENTIFIER,
    LPAREN,
    DOUBLE_QUOTE,
    BACKTICK,
    START_HEREDOC,
])
.union(&LITERAL_TOKENS)
.union(&PREFIX_OPERATORS)
.union(&CAST_TOKENS);

/// Tokens that end the construct around an expression.
const EXPR_FOLLOW: SyntaxSet = SyntaxSet::new([
    SEMICOLON,
    COMMA,
    RPAREN,
    RBRACKET,
    RBRACE,
    CLOSE_TAG,
    EOF,
]);

pub(crate) fn source_file(p: &mut Parser<'_>) -> ParsedSourceFileSyntax {
    let statements = stmts::statement_list(p, false);
    let eof = p.bump();

    SourceFileSyntaxBuilder::new()
        .use_statements(statements.into_raw())
        .use_eof(eof)
        .build(p.ctx())
}
