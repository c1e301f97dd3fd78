//! Typed façades, builders and recorders over [`ParsedRawSyntaxNode`].
//!
//! Every façade is a thin wrapper that resolves child names through the
//! layout schema. `record`/`defer`/`make` create a node of the façade's kind
//! from its children; builders collect children one slot at a time and fill
//! unset slots with Missing placeholders.

use polar_yellow::SyntaxKind::{self, *};
use polar_yellow::schema::{self, EXPR_KINDS, STMT_KINDS};

use crate::context::SyntaxParsingContext;
use crate::parsed::ParsedRawSyntaxNode;

/// Downcasting over the closed set of syntax kinds.
pub trait ParsedSyntax: Sized {
    /// The kind a node of this type is created with.
    fn kind_of() -> SyntaxKind;

    /// Whether `node` may be viewed as this type.
    fn class_of(node: &ParsedRawSyntaxNode) -> bool {
        node.kind() == Some(Self::kind_of())
    }

    fn cast(node: ParsedRawSyntaxNode) -> Option<Self>;

    fn raw(&self) -> &ParsedRawSyntaxNode;

    fn into_raw(self) -> ParsedRawSyntaxNode;
}

#[track_caller]
fn slot_index(kind: SyntaxKind, name: &str) -> usize {
    match schema::layout(kind).slot_index(name) {
        Some(index) => index,
        None => panic!("{kind:?} has no slot `{name}`"),
    }
}

fn slot_count(kind: SyntaxKind) -> usize {
    schema::layout(kind).slots().len()
}

macro_rules! layout_nodes {
    ($(
        $(#[$meta:meta])*
        $kind:ident => $parsed:ident, $builder:ident {
            $($slot:ident: $setter:ident, $getter:ident;)*
        }
    )*) => {$(
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $parsed(ParsedRawSyntaxNode);

        impl ParsedSyntax for $parsed {
            fn kind_of() -> SyntaxKind {
                $kind
            }

            fn cast(node: ParsedRawSyntaxNode) -> Option<Self> {
                Self::class_of(&node).then_some(Self(node))
            }

            fn raw(&self) -> &ParsedRawSyntaxNode {
                &self.0
            }

            fn into_raw(self) -> ParsedRawSyntaxNode {
                self.0
            }
        }

        impl $parsed {
            pub fn record(ctx: &SyntaxParsingContext, $($slot: ParsedRawSyntaxNode),*) -> Self {
                Self(ctx.record_layout($kind, vec![$($slot),*]))
            }

            pub fn defer($($slot: ParsedRawSyntaxNode),*) -> Self {
                Self(SyntaxParsingContext::defer_layout($kind, vec![$($slot),*]))
            }

            pub fn make(ctx: &SyntaxParsingContext, $($slot: ParsedRawSyntaxNode),*) -> Self {
                Self(ctx.make_layout($kind, vec![$($slot),*]))
            }

            $(
                pub fn $getter(&self) -> ParsedRawSyntaxNode {
                    self.0.child(slot_index($kind, stringify!($slot)))
                }
            )*
        }

        #[derive(Debug)]
        pub struct $builder {
            children: Vec<ParsedRawSyntaxNode>,
        }

        impl Default for $builder {
            fn default() -> Self {
                Self { children: vec![ParsedRawSyntaxNode::Null; slot_count($kind)] }
            }
        }

        impl $builder {
            pub fn new() -> Self {
                Self::default()
            }

            $(
                pub fn $setter(mut self, node: ParsedRawSyntaxNode) -> Self {
                    self.children[slot_index($kind, stringify!($slot))] = node;
                    self
                }
            )*

            /// Builds the node; unset slots hold Missing placeholders.
            pub fn build(self, ctx: &SyntaxParsingContext) -> $parsed {
                $parsed(ctx.make_layout($kind, self.children))
            }
        }
    )*

        #[cfg(test)]
        pub(crate) const LAYOUT_BUILDERS: &[(SyntaxKind, fn(&SyntaxParsingContext) -> ParsedRawSyntaxNode)] = &[
            $(($kind, |ctx| $builder::new().build(ctx).into_raw()),)*
        ];
    };
}

macro_rules! collection_nodes {
    ($(
        $(#[$meta:meta])*
        $kind:ident => $parsed:ident, $builder:ident;
    )*) => {$(
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $parsed(ParsedRawSyntaxNode);

        impl ParsedSyntax for $parsed {
            fn kind_of() -> SyntaxKind {
                $kind
            }

            fn cast(node: ParsedRawSyntaxNode) -> Option<Self> {
                Self::class_of(&node).then_some(Self(node))
            }

            fn raw(&self) -> &ParsedRawSyntaxNode {
                &self.0
            }

            fn into_raw(self) -> ParsedRawSyntaxNode {
                self.0
            }
        }

        impl $parsed {
            pub fn record(ctx: &SyntaxParsingContext, elements: Vec<ParsedRawSyntaxNode>) -> Self {
                Self(ctx.record_layout($kind, elements))
            }

            pub fn defer(elements: Vec<ParsedRawSyntaxNode>) -> Self {
                Self(SyntaxParsingContext::defer_layout($kind, elements))
            }

            pub fn make(ctx: &SyntaxParsingContext, elements: Vec<ParsedRawSyntaxNode>) -> Self {
                Self(ctx.make_layout($kind, elements))
            }

            pub fn len(&self) -> usize {
                self.0.children_len()
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            pub fn deferred_element(&self, index: usize) -> ParsedRawSyntaxNode {
                self.0.child(index)
            }
        }

        #[derive(Debug, Default)]
        pub struct $builder {
            elements: Vec<ParsedRawSyntaxNode>,
        }

        impl $builder {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn add_element(mut self, node: ParsedRawSyntaxNode) -> Self {
                self.elements.push(node);
                self
            }

            pub fn is_empty(&self) -> bool {
                self.elements.is_empty()
            }

            pub fn build(self, ctx: &SyntaxParsingContext) -> $parsed {
                $parsed(ctx.make_layout($kind, self.elements))
            }
        }
    )*

        #[cfg(test)]
        pub(crate) const COLLECTION_BUILDERS: &[(SyntaxKind, fn(&SyntaxParsingContext) -> ParsedRawSyntaxNode)] = &[
            $(($kind, |ctx| $builder::new().build(ctx).into_raw()),)*
        ];
    };
}

macro_rules! node_families {
    ($(
        $(#[$meta:meta])*
        $kind:ident => $parsed:ident($set:ident);
    )*) => {$(
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $parsed(ParsedRawSyntaxNode);

        impl ParsedSyntax for $parsed {
            fn kind_of() -> SyntaxKind {
                $kind
            }

            fn class_of(node: &ParsedRawSyntaxNode) -> bool {
                node.kind().is_some_and(|kind| $set.contains(kind))
            }

            fn cast(node: ParsedRawSyntaxNode) -> Option<Self> {
                Self::class_of(&node).then_some(Self(node))
            }

            fn raw(&self) -> &ParsedRawSyntaxNode {
                &self.0
            }

            fn into_raw(self) -> ParsedRawSyntaxNode {
                self.0
            }
        }
    )*};
}

node_families! {
    /// Any expression node.
    EXPR => ParsedExprSyntax(EXPR_KINDS);
    /// Any statement node.
    STMT => ParsedStmtSyntax(STMT_KINDS);
}

collection_nodes! {
    INNER_STATEMENT_LIST => ParsedInnerStatementListSyntax, InnerStatementListSyntaxBuilder;
    EXPR_LIST => ParsedExprListSyntax, ExprListSyntaxBuilder;
    ARGUMENT_LIST => ParsedArgumentListSyntax, ArgumentListSyntaxBuilder;
    ENCAPS_LIST => ParsedEncapsListSyntax, EncapsListSyntaxBuilder;
    /// Tokens skipped while recovering from a malformed statement.
    UNKNOWN_STMT => ParsedUnknownStmtSyntax, UnknownStmtSyntaxBuilder;
    /// Tokens skipped while recovering from a malformed expression.
    UNKNOWN_EXPR => ParsedUnknownExprSyntax, UnknownExprSyntaxBuilder;
}

layout_nodes! {
    SOURCE_FILE => ParsedSourceFileSyntax, SourceFileSyntaxBuilder {
        statements: use_statements, deferred_statements;
        eof: use_eof, deferred_eof;
    }
    EXPR_STMT => ParsedExprStmtSyntax, ExprStmtSyntaxBuilder {
        expr: use_expr, deferred_expr;
        semicolon: use_semicolon, deferred_semicolon;
    }
    /// `echo a, b;` and `<?= a ?>`.
    ECHO_STMT => ParsedEchoStmtSyntax, EchoStmtSyntaxBuilder {
        echo_keyword: use_echo_keyword, deferred_echo_keyword;
        exprs: use_exprs, deferred_exprs;
        semicolon: use_semicolon, deferred_semicolon;
    }
    EXPR_LIST_ITEM => ParsedExprListItemSyntax, ExprListItemSyntaxBuilder {
        expr: use_expr, deferred_expr;
        trailing_comma: use_trailing_comma, deferred_trailing_comma;
    }
    RETURN_STMT => ParsedReturnStmtSyntax, ReturnStmtSyntaxBuilder {
        return_keyword: use_return_keyword, deferred_return_keyword;
        expr: use_expr, deferred_expr;
        semicolon: use_semicolon, deferred_semicolon;
    }
    BLOCK_STMT => ParsedBlockStmtSyntax, BlockStmtSyntaxBuilder {
        lbrace: use_lbrace, deferred_lbrace;
        statements: use_statements, deferred_statements;
        rbrace: use_rbrace, deferred_rbrace;
    }
    IF_STMT => ParsedIfStmtSyntax, IfStmtSyntaxBuilder {
        if_keyword: use_if_keyword, deferred_if_keyword;
        lparen: use_lparen, deferred_lparen;
        condition: use_condition, deferred_condition;
        rparen: use_rparen, deferred_rparen;
        body: use_body, deferred_body;
        else_clause: use_else_clause, deferred_else_clause;
    }
    ELSE_CLAUSE => ParsedElseClauseSyntax, ElseClauseSyntaxBuilder {
        else_keyword: use_else_keyword, deferred_else_keyword;
        body: use_body, deferred_body;
    }
    WHILE_STMT => ParsedWhileStmtSyntax, WhileStmtSyntaxBuilder {
        while_keyword: use_while_keyword, deferred_while_keyword;
        lparen: use_lparen, deferred_lparen;
        condition: use_condition, deferred_condition;
        rparen: use_rparen, deferred_rparen;
        body: use_body, deferred_body;
    }
    LABEL_STMT => ParsedLabelStmtSyntax, LabelStmtSyntaxBuilder {
        label: use_label, deferred_label;
        colon: use_colon, deferred_colon;
    }
    /// Inline HTML and the tags around it.
    INLINE_HTML_STMT => ParsedInlineHtmlStmtSyntax, InlineHtmlStmtSyntaxBuilder {
        token: use_token, deferred_token;
    }
    LITERAL_EXPR => ParsedLiteralExprSyntax, LiteralExprSyntaxBuilder {
        literal: use_literal, deferred_literal;
    }
    VARIABLE_EXPR => ParsedVariableExprSyntax, VariableExprSyntaxBuilder {
        variable: use_variable, deferred_variable;
    }
    NAME_EXPR => ParsedNameExprSyntax, NameExprSyntaxBuilder {
        name: use_name, deferred_name;
    }
    /// The name in `${name}`.
    VARNAME_EXPR => ParsedVarnameExprSyntax, VarnameExprSyntaxBuilder {
        name: use_name, deferred_name;
    }
    PREFIX_EXPR => ParsedPrefixExprSyntax, PrefixExprSyntaxBuilder {
        operator: use_operator, deferred_operator;
        operand: use_operand, deferred_operand;
    }
    POSTFIX_EXPR => ParsedPostfixExprSyntax, PostfixExprSyntaxBuilder {
        operand: use_operand, deferred_operand;
        operator: use_operator, deferred_operator;
    }
    BINARY_EXPR => ParsedBinaryExprSyntax, BinaryExprSyntaxBuilder {
        lhs: use_lhs, deferred_lhs;
        operator: use_operator, deferred_operator;
        rhs: use_rhs, deferred_rhs;
    }
    ASSIGN_EXPR => ParsedAssignExprSyntax, AssignExprSyntaxBuilder {
        target: use_target, deferred_target;
        operator: use_operator, deferred_operator;
        value: use_value, deferred_value;
    }
    PAREN_EXPR => ParsedParenExprSyntax, ParenExprSyntaxBuilder {
        lparen: use_lparen, deferred_lparen;
        expr: use_expr, deferred_expr;
        rparen: use_rparen, deferred_rparen;
    }
    CAST_EXPR => ParsedCastExprSyntax, CastExprSyntaxBuilder {
        cast: use_cast, deferred_cast;
        operand: use_operand, deferred_operand;
    }
    CALL_EXPR => ParsedCallExprSyntax, CallExprSyntaxBuilder {
        callee: use_callee, deferred_callee;
        lparen: use_lparen, deferred_lparen;
        arguments: use_arguments, deferred_arguments;
        rparen: use_rparen, deferred_rparen;
    }
    ARGUMENT => ParsedArgumentSyntax, ArgumentSyntaxBuilder {
        expr: use_expr, deferred_expr;
        trailing_comma: use_trailing_comma, deferred_trailing_comma;
    }
    MEMBER_ACCESS_EXPR => ParsedMemberAccessExprSyntax, MemberAccessExprSyntaxBuilder {
        base: use_base, deferred_base;
        operator: use_operator, deferred_operator;
        member: use_member, deferred_member;
    }
    ARRAY_ACCESS_EXPR => ParsedArrayAccessExprSyntax, ArrayAccessExprSyntaxBuilder {
        base: use_base, deferred_base;
        lbracket: use_lbracket, deferred_lbracket;
        index: use_index, deferred_index;
        rbracket: use_rbracket, deferred_rbracket;
    }
    /// Double-quoted, backtick and heredoc strings with interpolation.
    ENCAPSED_STRING_EXPR => ParsedEncapsedStringExprSyntax, EncapsedStringExprSyntaxBuilder {
        open: use_open, deferred_open;
        parts: use_parts, deferred_parts;
        close: use_close, deferred_close;
    }
    ENCAPS_STRING_PART => ParsedEncapsStringPartSyntax, EncapsStringPartSyntaxBuilder {
        text: use_text, deferred_text;
    }
    ENCAPS_VARIABLE => ParsedEncapsVariableSyntax, EncapsVariableSyntaxBuilder {
        variable: use_variable, deferred_variable;
    }
    /// `$var[offset]` inside a string.
    ENCAPS_ARRAY_OFFSET => ParsedEncapsArrayOffsetSyntax, EncapsArrayOffsetSyntaxBuilder {
        variable: use_variable, deferred_variable;
        lbracket: use_lbracket, deferred_lbracket;
        minus: use_minus, deferred_minus;
        offset: use_offset, deferred_offset;
        rbracket: use_rbracket, deferred_rbracket;
    }
    /// `$var->name` inside a string.
    ENCAPS_PROPERTY_FETCH => ParsedEncapsPropertyFetchSyntax, EncapsPropertyFetchSyntaxBuilder {
        variable: use_variable, deferred_variable;
        operator: use_operator, deferred_operator;
        name: use_name, deferred_name;
    }
    /// `{$expr}` and `${expr}` inside a string.
    ENCAPS_EMBED_EXPR => ParsedEncapsEmbedExprSyntax, EncapsEmbedExprSyntaxBuilder {
        open: use_open, deferred_open;
        expr: use_expr, deferred_expr;
        rbrace: use_rbrace, deferred_rbrace;
    }
}

#[cfg(test)]
mod tests {
    use polar_yellow::{TextRange, Token};

    use super::*;

    fn token(kind: SyntaxKind, text: &str) -> Token {
        Token::new(kind, TextRange::empty(0.into()), text)
    }

    #[test]
    fn builder_keeps_set_slots() {
        let ctx = SyntaxParsingContext::new();
        let paren = ParenExprSyntaxBuilder::new()
            .use_lparen(ctx.make_token(token(LPAREN, "(")))
            .build(&ctx);

        assert_eq!(paren.deferred_lparen().token().map(Token::text), Some("("));
        assert!(paren.deferred_expr().is_missing());
        assert_eq!(paren.deferred_rparen().kind(), Some(RPAREN));
    }

    #[test]
    fn families_cast_by_membership() {
        let ctx = SyntaxParsingContext::new();
        let variable =
            ParsedVariableExprSyntax::make(&ctx, ctx.make_token(token(VARIABLE, "$a"))).into_raw();

        assert!(ParsedExprSyntax::class_of(&variable));
        assert!(!ParsedStmtSyntax::class_of(&variable));
        assert!(ParsedVariableExprSyntax::cast(variable.clone()).is_some());
        assert!(ParsedNameExprSyntax::cast(variable).is_none());
        assert_eq!(ParsedExprSyntax::kind_of(), EXPR);
    }

    #[test]
    fn collection_builder_appends() {
        let ctx = SyntaxParsingContext::new();
        let list = UnknownStmtSyntaxBuilder::new()
            .add_element(ctx.make_token(token(RPAREN, ")")))
            .add_element(ctx.make_token(token(RBRACKET, "]")))
            .build(&ctx);

        assert_eq!(list.len(), 2);
        assert_eq!(list.deferred_element(1).kind(), Some(RBRACKET));
        assert!(list.deferred_element(2).is_null());
    }

    #[test]
    #[should_panic(expected = "invalid layout: VARIABLE_EXPR child #0 (variable) cannot be IDENTIFIER")]
    fn recorder_rejects_wrong_child_kind() {
        let ctx = SyntaxParsingContext::new();
        ParsedVariableExprSyntax::record(&ctx, ctx.make_token(token(IDENTIFIER, "a")));
    }
}
