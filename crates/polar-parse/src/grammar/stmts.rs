use polar_yellow::SyntaxKind::*;
use polar_yellow::SyntaxSet;

use super::{EXPR_FIRST, exprs};
use crate::parsed::ParsedRawSyntaxNode;
use crate::parser::Parser;
use crate::syntax::*;

const TERMINATORS: SyntaxSet = SyntaxSet::new([SEMICOLON, CLOSE_TAG]);

const TAGS: SyntaxSet = SyntaxSet::new([INLINE_HTML, OPEN_TAG, CLOSE_TAG]);

/// Where skipping a malformed statement stops.
const STMT_RECOVERY: SyntaxSet = SyntaxSet::new([
    SEMICOLON,
    LBRACE,
    RBRACE,
    EOF,
    ECHO_KW,
    RETURN_KW,
    IF_KW,
    WHILE_KW,
    INLINE_HTML,
    OPEN_TAG,
    OPEN_TAG_WITH_ECHO,
    CLOSE_TAG,
]);

/// Statements up to the end of input, or up to `}` inside a block.
pub(super) fn statement_list(p: &mut Parser<'_>, in_block: bool) -> ParsedInnerStatementListSyntax {
    let mut statements = InnerStatementListSyntaxBuilder::new();
    while !p.at(EOF) && !(in_block && p.at(RBRACE)) {
        statements = statements.add_element(statement(p));
    }
    statements.build(p.ctx())
}

fn statement(p: &mut Parser<'_>) -> ParsedRawSyntaxNode {
    match p.peek_kind() {
        kind if TAGS.contains(kind) => {
            let token = p.bump();
            ParsedInlineHtmlStmtSyntax::make(p.ctx(), token).into_raw()
        }
        ECHO_KW | OPEN_TAG_WITH_ECHO => echo_stmt(p),
        RETURN_KW => return_stmt(p),
        LBRACE => block_stmt(p),
        IF_KW => if_stmt(p),
        WHILE_KW => while_stmt(p),
        IDENTIFIER => label_or_expr_stmt(p),
        SEMICOLON => {
            let semicolon = p.bump();
            ParsedExprStmtSyntax::make(p.ctx(), ParsedRawSyntaxNode::Null, semicolon).into_raw()
        }
        kind if EXPR_FIRST.contains(kind) => expr_stmt(p),
        _ => unknown_stmt(p),
    }
}

/// `;`, or a close tag which ends a statement as well.
fn terminator(p: &mut Parser<'_>) -> ParsedRawSyntaxNode {
    if p.at_set(&TERMINATORS) {
        return p.bump();
    }
    p.error("expected ';'");
    ParsedRawSyntaxNode::Null
}

fn expr_stmt(p: &mut Parser<'_>) -> ParsedRawSyntaxNode {
    let expr = exprs::expr(p);
    let semicolon = terminator(p);
    ParsedExprStmtSyntax::make(p.ctx(), expr, semicolon).into_raw()
}

/// `name:` is only known to be a label once the colon is seen, so the name
/// is parsed speculatively.
fn label_or_expr_stmt(p: &mut Parser<'_>) -> ParsedRawSyntaxNode {
    let checkpoint = p.checkpoint();
    let label = p.bump();
    if p.at(COLON) {
        let colon = p.bump();
        let label = ParsedLabelStmtSyntax::make(p.ctx(), label, colon);
        return p.commit(checkpoint, label.into_raw());
    }

    p.rewind(checkpoint);
    expr_stmt(p)
}

fn echo_stmt(p: &mut Parser<'_>) -> ParsedRawSyntaxNode {
    let echo = p.bump();

    let mut items = ExprListSyntaxBuilder::new();
    loop {
        let expr = exprs::expr(p);
        let comma = p.eat(COMMA);
        let done = comma.is_null();
        items = items.add_element(ParsedExprListItemSyntax::make(p.ctx(), expr, comma).into_raw());
        if done {
            break;
        }
    }
    let items = items.build(p.ctx());

    let semicolon = terminator(p);
    EchoStmtSyntaxBuilder::new()
        .use_echo_keyword(echo)
        .use_exprs(items.into_raw())
        .use_semicolon(semicolon)
        .build(p.ctx())
        .into_raw()
}

fn return_stmt(p: &mut Parser<'_>) -> ParsedRawSyntaxNode {
    let mut builder = ReturnStmtSyntaxBuilder::new().use_return_keyword(p.bump());
    if !p.at_set(&TERMINATORS) && !p.at(EOF) {
        builder = builder.use_expr(exprs::expr(p));
    }
    builder.use_semicolon(terminator(p)).build(p.ctx()).into_raw()
}

fn block_stmt(p: &mut Parser<'_>) -> ParsedRawSyntaxNode {
    let lbrace = p.bump();
    let statements = statement_list(p, true);
    let rbrace = p.expect(RBRACE);
    ParsedBlockStmtSyntax::make(p.ctx(), lbrace, statements.into_raw(), rbrace).into_raw()
}

fn if_stmt(p: &mut Parser<'_>) -> ParsedRawSyntaxNode {
    let if_keyword = p.bump();
    let lparen = p.expect(LPAREN);
    let condition = exprs::expr(p);
    let rparen = p.expect(RPAREN);
    let body = nested_statement(p);

    let mut builder = IfStmtSyntaxBuilder::new()
        .use_if_keyword(if_keyword)
        .use_lparen(lparen)
        .use_condition(condition)
        .use_rparen(rparen)
        .use_body(body);

    if p.at(ELSE_KW) {
        let else_keyword = p.bump();
        let body = nested_statement(p);
        let else_clause = ParsedElseClauseSyntax::make(p.ctx(), else_keyword, body);
        builder = builder.use_else_clause(else_clause.into_raw());
    }
    builder.build(p.ctx()).into_raw()
}

fn while_stmt(p: &mut Parser<'_>) -> ParsedRawSyntaxNode {
    let while_keyword = p.bump();
    let lparen = p.expect(LPAREN);
    let condition = exprs::expr(p);
    let rparen = p.expect(RPAREN);
    let body = nested_statement(p);
    ParsedWhileStmtSyntax::make(p.ctx(), while_keyword, lparen, condition, rparen, body).into_raw()
}

/// The statement controlled by `if`, `else` or `while`.
fn nested_statement(p: &mut Parser<'_>) -> ParsedRawSyntaxNode {
    if p.at(EOF) || p.at(RBRACE) {
        p.error("expected statement");
        return ParsedRawSyntaxNode::Null;
    }
    statement(p)
}

/// Skips at least one token, and on to the next likely statement start.
fn unknown_stmt(p: &mut Parser<'_>) -> ParsedRawSyntaxNode {
    // An unterminated string has been reported by the lexer already.
    if !p.at(ENCAPSED_AND_WHITESPACE) {
        p.error("expected statement");
    }

    let mut tokens = UnknownStmtSyntaxBuilder::new().add_element(p.bump());
    while !p.at_set(&STMT_RECOVERY) {
        tokens = tokens.add_element(p.bump());
    }
    if p.at(SEMICOLON) {
        tokens = tokens.add_element(p.bump());
    }
    tokens.build(p.ctx()).into_raw()
}
