use polar_yellow::SyntaxKind::{self, *};
use polar_yellow::schema::{ASSIGNMENT_OPERATORS, CAST_TOKENS, LITERAL_TOKENS, PREFIX_OPERATORS};

use super::{EXPR_FIRST, EXPR_FOLLOW, strings};
use crate::parsed::ParsedRawSyntaxNode;
use crate::parser::Parser;
use crate::syntax::*;

/// Binding power of `!`, which sits below `instanceof`.
const NOT_BP: u8 = 35;
/// Binding power of the other prefix operators and casts.
const UNARY_BP: u8 = 39;
const PRINT_BP: u8 = 7;
const CLONE_BP: u8 = 43;

pub(super) fn expr(p: &mut Parser<'_>) -> ParsedRawSyntaxNode {
    expr_bp(p, 0)
}

/// Left and right binding power of an infix operator.
fn infix_binding_power(kind: SyntaxKind) -> Option<(u8, u8)> {
    let bp = match kind {
        OR_KW => (1, 2),
        XOR_KW => (3, 4),
        AND_KW => (5, 6),
        kind if ASSIGNMENT_OPERATORS.contains(kind) => (8, 7),
        COALESCE => (12, 11),
        BOOLEAN_OR => (13, 14),
        BOOLEAN_AND => (15, 16),
        PIPE => (17, 18),
        CARET => (19, 20),
        AMPERSAND => (21, 22),
        IS_EQUAL | IS_NOT_EQUAL | IS_IDENTICAL | IS_NOT_IDENTICAL | SPACESHIP => (23, 24),
        IS_SMALLER | IS_SMALLER_OR_EQUAL | IS_GREATER | IS_GREATER_OR_EQUAL => (25, 26),
        CONCAT => (27, 28),
        SL | SR => (29, 30),
        PLUS | MINUS => (31, 32),
        MUL | DIV | MOD => (33, 34),
        INSTANCEOF_KW => (37, 38),
        POW => (42, 41),
        _ => return None,
    };
    Some(bp)
}

fn expr_bp(p: &mut Parser<'_>, min_bp: u8) -> ParsedRawSyntaxNode {
    let mut lhs = unary_expr(p);

    loop {
        let kind = p.peek_kind();
        let Some((left_bp, right_bp)) = infix_binding_power(kind) else { break };
        if left_bp < min_bp {
            break;
        }

        let operator = p.bump();
        let rhs = expr_bp(p, right_bp);
        lhs = if ASSIGNMENT_OPERATORS.contains(kind) {
            ParsedAssignExprSyntax::make(p.ctx(), lhs, operator, rhs).into_raw()
        } else {
            ParsedBinaryExprSyntax::make(p.ctx(), lhs, operator, rhs).into_raw()
        };
    }

    lhs
}

fn unary_expr(p: &mut Parser<'_>) -> ParsedRawSyntaxNode {
    let kind = p.peek_kind();
    if PREFIX_OPERATORS.contains(kind) {
        let bp = match kind {
            EXCLAMATION => NOT_BP,
            PRINT_KW => PRINT_BP,
            CLONE_KW => CLONE_BP,
            _ => UNARY_BP,
        };
        let operator = p.bump();
        let operand = expr_bp(p, bp);
        return ParsedPrefixExprSyntax::make(p.ctx(), operator, operand).into_raw();
    }
    if CAST_TOKENS.contains(kind) {
        let cast = p.bump();
        let operand = expr_bp(p, UNARY_BP);
        return ParsedCastExprSyntax::make(p.ctx(), cast, operand).into_raw();
    }

    match primary_expr(p) {
        Some(primary) => postfix_expr(p, primary),
        None => unknown_expr(p),
    }
}

pub(super) fn postfix_expr(p: &mut Parser<'_>, mut lhs: ParsedRawSyntaxNode) -> ParsedRawSyntaxNode {
    loop {
        lhs = match p.peek_kind() {
            LPAREN => call_expr(p, lhs),
            OBJECT_OPERATOR | NULLSAFE_OBJECT_OPERATOR => {
                let operator = p.bump();
                let member = match p.peek_kind() {
                    IDENTIFIER | VARIABLE => p.bump(),
                    _ => p.expect(IDENTIFIER),
                };
                ParsedMemberAccessExprSyntax::make(p.ctx(), lhs, operator, member).into_raw()
            }
            LBRACKET => {
                let lbracket = p.bump();
                let index = if p.at(RBRACKET) { ParsedRawSyntaxNode::Null } else { expr(p) };
                let rbracket = p.expect(RBRACKET);
                ArrayAccessExprSyntaxBuilder::new()
                    .use_base(lhs)
                    .use_lbracket(lbracket)
                    .use_index(index)
                    .use_rbracket(rbracket)
                    .build(p.ctx())
                    .into_raw()
            }
            INC | DEC => {
                let operator = p.bump();
                ParsedPostfixExprSyntax::make(p.ctx(), lhs, operator).into_raw()
            }
            _ => return lhs,
        };
    }
}

fn call_expr(p: &mut Parser<'_>, callee: ParsedRawSyntaxNode) -> ParsedRawSyntaxNode {
    let lparen = p.bump();

    let mut arguments = ArgumentListSyntaxBuilder::new();
    while !p.at(RPAREN) && !p.at(EOF) {
        let expr = expr(p);
        let comma = p.eat(COMMA);
        let done = comma.is_null();
        arguments = arguments.add_element(ParsedArgumentSyntax::make(p.ctx(), expr, comma).into_raw());
        if done {
            break;
        }
    }
    let arguments = arguments.build(p.ctx());

    let rparen = p.expect(RPAREN);
    ParsedCallExprSyntax::make(p.ctx(), callee, lparen, arguments.into_raw(), rparen).into_raw()
}

fn primary_expr(p: &mut Parser<'_>) -> Option<ParsedRawSyntaxNode> {
    let kind = p.peek_kind();
    let node = match kind {
        kind if LITERAL_TOKENS.contains(kind) => {
            let literal = p.bump();
            ParsedLiteralExprSyntax::make(p.ctx(), literal).into_raw()
        }
        VARIABLE => {
            let variable = p.bump();
            ParsedVariableExprSyntax::make(p.ctx(), variable).into_raw()
        }
        IDENTIFIER => {
            let name = p.bump();
            ParsedNameExprSyntax::make(p.ctx(), name).into_raw()
        }
        LPAREN => {
            let lparen = p.bump();
            let expr = expr(p);
            let rparen = p.expect(RPAREN);
            ParsedParenExprSyntax::make(p.ctx(), lparen, expr, rparen).into_raw()
        }
        DOUBLE_QUOTE | BACKTICK | START_HEREDOC => strings::encapsed_string(p),
        _ => return None,
    };
    Some(node)
}

/// Wraps a token that cannot start an expression, or leaves the expression
/// missing when the surrounding construct ends here.
fn unknown_expr(p: &mut Parser<'_>) -> ParsedRawSyntaxNode {
    debug_assert!(!EXPR_FIRST.contains(p.peek_kind()));

    if p.at_set(&EXPR_FOLLOW) {
        p.error("expected expression");
        return ParsedRawSyntaxNode::Null;
    }
    // An unterminated string has been reported by the lexer already.
    if !p.at(ENCAPSED_AND_WHITESPACE) {
        p.error("expected expression");
    }
    let token = p.bump();
    ParsedUnknownExprSyntax::make(p.ctx(), vec![token]).into_raw()
}
