use polar_yellow::SyntaxKind::*;

use super::exprs;
use crate::parsed::ParsedRawSyntaxNode;
use crate::parser::Parser;
use crate::syntax::*;

/// `"..."`, `` `...` `` and heredocs with interpolated parts.
pub(super) fn encapsed_string(p: &mut Parser<'_>) -> ParsedRawSyntaxNode {
    let close_kind = match p.peek_kind() {
        BACKTICK => BACKTICK,
        START_HEREDOC => END_HEREDOC,
        _ => DOUBLE_QUOTE,
    };
    let open = p.bump();

    let mut parts = EncapsListSyntaxBuilder::new();
    loop {
        let part = match p.peek_kind() {
            ENCAPSED_AND_WHITESPACE => {
                let text = p.bump();
                ParsedEncapsStringPartSyntax::make(p.ctx(), text).into_raw()
            }
            VARIABLE => encaps_variable(p),
            CURLY_OPEN | DOLLAR_OPEN_CURLY_BRACES => embedded_expr(p),
            _ => break,
        };
        parts = parts.add_element(part);
    }
    let parts = parts.build(p.ctx());

    let close = p.expect(close_kind);
    EncapsedStringExprSyntaxBuilder::new()
        .use_open(open)
        .use_parts(parts.into_raw())
        .use_close(close)
        .build(p.ctx())
        .into_raw()
}

/// `$var`, `$var[offset]` or `$var->name`.
fn encaps_variable(p: &mut Parser<'_>) -> ParsedRawSyntaxNode {
    let variable = p.bump();
    match p.peek_kind() {
        LBRACKET => {
            let lbracket = p.bump();
            let minus = p.eat(MINUS);
            let offset = match p.peek_kind() {
                NUM_STRING | IDENTIFIER | VARIABLE => p.bump(),
                _ => p.expect(NUM_STRING),
            };
            let rbracket = p.expect(RBRACKET);
            ParsedEncapsArrayOffsetSyntax::make(p.ctx(), variable, lbracket, minus, offset, rbracket)
                .into_raw()
        }
        OBJECT_OPERATOR | NULLSAFE_OBJECT_OPERATOR => {
            let operator = p.bump();
            let name = p.expect(IDENTIFIER);
            ParsedEncapsPropertyFetchSyntax::make(p.ctx(), variable, operator, name).into_raw()
        }
        _ => ParsedEncapsVariableSyntax::make(p.ctx(), variable).into_raw(),
    }
}

/// `{$expr}` or `${expr}`.
fn embedded_expr(p: &mut Parser<'_>) -> ParsedRawSyntaxNode {
    let open = p.bump();
    let expr = if p.at(STRING_VARNAME) {
        let name = p.bump();
        let name = ParsedVarnameExprSyntax::make(p.ctx(), name).into_raw();
        exprs::postfix_expr(p, name)
    } else {
        exprs::expr(p)
    };
    let rbrace = p.expect(RBRACE);
    ParsedEncapsEmbedExprSyntax::make(p.ctx(), open, expr, rbrace).into_raw()
}
