//! Per-kind layout schema: slot count, slot names and accepted kinds.
//!
//! This table is the single source of truth for node arity. Builders fill
//! unset slots from it and `RawSyntax::validate` checks children against it.

use crate::SyntaxKind::{self, *};
use crate::SyntaxSet;

/// One child position of a fixed layout.
#[derive(Debug)]
pub struct Slot {
    pub name: &'static str,
    /// Kind of the Missing placeholder used when the slot is not filled.
    pub expected: SyntaxKind,
    pub accepts: SyntaxSet,
}

impl Slot {
    const fn new(name: &'static str, expected: SyntaxKind, accepts: SyntaxSet) -> Self {
        Self { name, expected, accepts }
    }

    const fn one(name: &'static str, kind: SyntaxKind) -> Self {
        Self::new(name, kind, SyntaxSet::new([kind]))
    }

    const fn expr(name: &'static str) -> Self {
        Self::new(name, EXPR, EXPR_KINDS)
    }

    const fn stmt(name: &'static str) -> Self {
        Self::new(name, STMT, STMT_KINDS)
    }
}

#[derive(Debug)]
pub enum Layout {
    /// A token leaf.
    Token,
    /// Exactly one child per slot.
    Fixed(&'static [Slot]),
    /// Any number of children, each a member of `accepts`.
    Collection { element: SyntaxKind, accepts: SyntaxSet },
}

impl Layout {
    pub fn slots(&self) -> &'static [Slot] {
        match self {
            Self::Fixed(slots) => slots,
            Self::Token | Self::Collection { .. } => &[],
        }
    }

    /// The declared child count, `None` for collections.
    pub fn children_count(&self) -> Option<usize> {
        match self {
            Self::Token => Some(0),
            Self::Fixed(slots) => Some(slots.len()),
            Self::Collection { .. } => None,
        }
    }

    pub fn slot(&self, index: usize) -> Option<&'static Slot> {
        self.slots().get(index)
    }

    pub fn slot_index(&self, name: &str) -> Option<usize> {
        self.slots().iter().position(|slot| slot.name == name)
    }

    /// Whether `kind` may appear at child position `index`.
    pub fn accepts(&self, index: usize, kind: SyntaxKind) -> bool {
        match self {
            Self::Token => false,
            Self::Fixed(slots) => slots.get(index).is_some_and(|slot| slot.accepts.contains(kind)),
            Self::Collection { accepts, .. } => accepts.contains(kind),
        }
    }
}

pub const EXPR_KINDS: SyntaxSet = SyntaxSet::new([
    EXPR,
    LITERAL_EXPR,
    VARIABLE_EXPR,
    NAME_EXPR,
    VARNAME_EXPR,
    PREFIX_EXPR,
    POSTFIX_EXPR,
    BINARY_EXPR,
    ASSIGN_EXPR,
    PAREN_EXPR,
    CAST_EXPR,
    CALL_EXPR,
    MEMBER_ACCESS_EXPR,
    ARRAY_ACCESS_EXPR,
    ENCAPSED_STRING_EXPR,
    UNKNOWN_EXPR,
]);

pub const STMT_KINDS: SyntaxSet = SyntaxSet::new([
    STMT,
    EXPR_STMT,
    ECHO_STMT,
    RETURN_STMT,
    BLOCK_STMT,
    IF_STMT,
    WHILE_STMT,
    LABEL_STMT,
    INLINE_HTML_STMT,
    UNKNOWN_STMT,
]);

pub const ENCAPS_KINDS: SyntaxSet = SyntaxSet::new([
    ENCAPS_STRING_PART,
    ENCAPS_VARIABLE,
    ENCAPS_ARRAY_OFFSET,
    ENCAPS_PROPERTY_FETCH,
    ENCAPS_EMBED_EXPR,
]);

pub const LITERAL_TOKENS: SyntaxSet = SyntaxSet::new([
    LNUMBER,
    DNUMBER,
    CONSTANT_ENCAPSED_STRING,
    CLASS_C_KW,
    DIR_KW,
    FILE_KW,
    FUNC_C_KW,
    LINE_KW,
    METHOD_C_KW,
    NS_C_KW,
    TRAIT_C_KW,
]);

pub const PREFIX_OPERATORS: SyntaxSet =
    SyntaxSet::new([MINUS, PLUS, EXCLAMATION, TILDE, INC, DEC, AT, AMPERSAND, CLONE_KW, PRINT_KW]);

pub const POSTFIX_OPERATORS: SyntaxSet = SyntaxSet::new([INC, DEC]);

pub const BINARY_OPERATORS: SyntaxSet = SyntaxSet::new([
    PLUS,
    MINUS,
    MUL,
    DIV,
    MOD,
    POW,
    CONCAT,
    IS_EQUAL,
    IS_NOT_EQUAL,
    IS_IDENTICAL,
    IS_NOT_IDENTICAL,
    IS_SMALLER,
    IS_GREATER,
    IS_SMALLER_OR_EQUAL,
    IS_GREATER_OR_EQUAL,
    SPACESHIP,
    BOOLEAN_AND,
    BOOLEAN_OR,
    AMPERSAND,
    PIPE,
    CARET,
    SL,
    SR,
    COALESCE,
    AND_KW,
    OR_KW,
    XOR_KW,
    INSTANCEOF_KW,
]);

pub const ASSIGNMENT_OPERATORS: SyntaxSet = SyntaxSet::new([
    EQUAL,
    PLUS_EQUAL,
    MINUS_EQUAL,
    MUL_EQUAL,
    DIV_EQUAL,
    CONCAT_EQUAL,
    MOD_EQUAL,
    POW_EQUAL,
    AND_EQUAL,
    OR_EQUAL,
    XOR_EQUAL,
    SL_EQUAL,
    SR_EQUAL,
    COALESCE_EQUAL,
]);

pub const CAST_TOKENS: SyntaxSet = SyntaxSet::new([
    INT_CAST,
    DOUBLE_CAST,
    STRING_CAST,
    ARRAY_CAST,
    OBJECT_CAST,
    BOOL_CAST,
    UNSET_CAST,
]);

const STATEMENT_TERMINATORS: SyntaxSet = SyntaxSet::new([SEMICOLON, CLOSE_TAG]);

const SEMICOLON_SLOT: Slot = Slot::new("semicolon", SEMICOLON, STATEMENT_TERMINATORS);

const SOURCE_FILE_SLOTS: &[Slot] =
    &[Slot::one("statements", INNER_STATEMENT_LIST), Slot::one("eof", EOF)];

const EXPR_STMT_SLOTS: &[Slot] = &[Slot::expr("expr"), SEMICOLON_SLOT];

const ECHO_STMT_SLOTS: &[Slot] = &[
    Slot::new("echo_keyword", ECHO_KW, SyntaxSet::new([ECHO_KW, OPEN_TAG_WITH_ECHO])),
    Slot::one("exprs", EXPR_LIST),
    SEMICOLON_SLOT,
];

const EXPR_LIST_ITEM_SLOTS: &[Slot] = &[Slot::expr("expr"), Slot::one("trailing_comma", COMMA)];

const RETURN_STMT_SLOTS: &[Slot] =
    &[Slot::one("return_keyword", RETURN_KW), Slot::expr("expr"), SEMICOLON_SLOT];

const BLOCK_STMT_SLOTS: &[Slot] = &[
    Slot::one("lbrace", LBRACE),
    Slot::one("statements", INNER_STATEMENT_LIST),
    Slot::one("rbrace", RBRACE),
];

const IF_STMT_SLOTS: &[Slot] = &[
    Slot::one("if_keyword", IF_KW),
    Slot::one("lparen", LPAREN),
    Slot::expr("condition"),
    Slot::one("rparen", RPAREN),
    Slot::stmt("body"),
    Slot::one("else_clause", ELSE_CLAUSE),
];

const ELSE_CLAUSE_SLOTS: &[Slot] = &[Slot::one("else_keyword", ELSE_KW), Slot::stmt("body")];

const WHILE_STMT_SLOTS: &[Slot] = &[
    Slot::one("while_keyword", WHILE_KW),
    Slot::one("lparen", LPAREN),
    Slot::expr("condition"),
    Slot::one("rparen", RPAREN),
    Slot::stmt("body"),
];

const LABEL_STMT_SLOTS: &[Slot] = &[Slot::one("label", IDENTIFIER), Slot::one("colon", COLON)];

const INLINE_HTML_STMT_SLOTS: &[Slot] =
    &[Slot::new("token", INLINE_HTML, SyntaxSet::new([INLINE_HTML, OPEN_TAG, CLOSE_TAG]))];

const LITERAL_EXPR_SLOTS: &[Slot] = &[Slot::new("literal", LNUMBER, LITERAL_TOKENS)];

const VARIABLE_EXPR_SLOTS: &[Slot] = &[Slot::one("variable", VARIABLE)];

const NAME_EXPR_SLOTS: &[Slot] = &[Slot::one("name", IDENTIFIER)];

const VARNAME_EXPR_SLOTS: &[Slot] = &[Slot::one("name", STRING_VARNAME)];

const PREFIX_EXPR_SLOTS: &[Slot] =
    &[Slot::new("operator", MINUS, PREFIX_OPERATORS), Slot::expr("operand")];

const POSTFIX_EXPR_SLOTS: &[Slot] =
    &[Slot::expr("operand"), Slot::new("operator", INC, POSTFIX_OPERATORS)];

const BINARY_EXPR_SLOTS: &[Slot] =
    &[Slot::expr("lhs"), Slot::new("operator", PLUS, BINARY_OPERATORS), Slot::expr("rhs")];

const ASSIGN_EXPR_SLOTS: &[Slot] =
    &[Slot::expr("target"), Slot::new("operator", EQUAL, ASSIGNMENT_OPERATORS), Slot::expr("value")];

const PAREN_EXPR_SLOTS: &[Slot] =
    &[Slot::one("lparen", LPAREN), Slot::expr("expr"), Slot::one("rparen", RPAREN)];

const CAST_EXPR_SLOTS: &[Slot] =
    &[Slot::new("cast", INT_CAST, CAST_TOKENS), Slot::expr("operand")];

const CALL_EXPR_SLOTS: &[Slot] = &[
    Slot::expr("callee"),
    Slot::one("lparen", LPAREN),
    Slot::one("arguments", ARGUMENT_LIST),
    Slot::one("rparen", RPAREN),
];

const ARGUMENT_SLOTS: &[Slot] = &[Slot::expr("expr"), Slot::one("trailing_comma", COMMA)];

const MEMBER_ACCESS_EXPR_SLOTS: &[Slot] = &[
    Slot::expr("base"),
    Slot::new(
        "operator",
        OBJECT_OPERATOR,
        SyntaxSet::new([OBJECT_OPERATOR, NULLSAFE_OBJECT_OPERATOR]),
    ),
    Slot::new("member", IDENTIFIER, SyntaxSet::new([IDENTIFIER, VARIABLE])),
];

const ARRAY_ACCESS_EXPR_SLOTS: &[Slot] = &[
    Slot::expr("base"),
    Slot::one("lbracket", LBRACKET),
    Slot::expr("index"),
    Slot::one("rbracket", RBRACKET),
];

const ENCAPSED_STRING_EXPR_SLOTS: &[Slot] = &[
    Slot::new("open", DOUBLE_QUOTE, SyntaxSet::new([DOUBLE_QUOTE, BACKTICK, START_HEREDOC])),
    Slot::one("parts", ENCAPS_LIST),
    Slot::new("close", DOUBLE_QUOTE, SyntaxSet::new([DOUBLE_QUOTE, BACKTICK, END_HEREDOC])),
];

const ENCAPS_STRING_PART_SLOTS: &[Slot] = &[Slot::one("text", ENCAPSED_AND_WHITESPACE)];

const ENCAPS_VARIABLE_SLOTS: &[Slot] = &[Slot::one("variable", VARIABLE)];

const ENCAPS_ARRAY_OFFSET_SLOTS: &[Slot] = &[
    Slot::one("variable", VARIABLE),
    Slot::one("lbracket", LBRACKET),
    Slot::one("minus", MINUS),
    Slot::new("offset", NUM_STRING, SyntaxSet::new([NUM_STRING, IDENTIFIER, VARIABLE])),
    Slot::one("rbracket", RBRACKET),
];

const ENCAPS_PROPERTY_FETCH_SLOTS: &[Slot] = &[
    Slot::one("variable", VARIABLE),
    Slot::new(
        "operator",
        OBJECT_OPERATOR,
        SyntaxSet::new([OBJECT_OPERATOR, NULLSAFE_OBJECT_OPERATOR]),
    ),
    Slot::one("name", IDENTIFIER),
];

const ENCAPS_EMBED_EXPR_SLOTS: &[Slot] = &[
    Slot::new("open", CURLY_OPEN, SyntaxSet::new([CURLY_OPEN, DOLLAR_OPEN_CURLY_BRACES])),
    Slot::expr("expr"),
    Slot::one("rbrace", RBRACE),
];

/// Looks up the layout schema of `kind`.
pub fn layout(kind: SyntaxKind) -> Layout {
    if kind.is_token() {
        return Layout::Token;
    }

    let slots: &'static [Slot] = match kind {
        EXPR | STMT => &[],
        SOURCE_FILE => SOURCE_FILE_SLOTS,
        INNER_STATEMENT_LIST => {
            return Layout::Collection { element: STMT, accepts: STMT_KINDS };
        }
        EXPR_STMT => EXPR_STMT_SLOTS,
        ECHO_STMT => ECHO_STMT_SLOTS,
        EXPR_LIST => {
            return Layout::Collection {
                element: EXPR_LIST_ITEM,
                accepts: SyntaxSet::new([EXPR_LIST_ITEM]),
            };
        }
        EXPR_LIST_ITEM => EXPR_LIST_ITEM_SLOTS,
        RETURN_STMT => RETURN_STMT_SLOTS,
        BLOCK_STMT => BLOCK_STMT_SLOTS,
        IF_STMT => IF_STMT_SLOTS,
        ELSE_CLAUSE => ELSE_CLAUSE_SLOTS,
        WHILE_STMT => WHILE_STMT_SLOTS,
        LABEL_STMT => LABEL_STMT_SLOTS,
        INLINE_HTML_STMT => INLINE_HTML_STMT_SLOTS,
        UNKNOWN_STMT | UNKNOWN_EXPR => {
            return Layout::Collection { element: UNKNOWN, accepts: SyntaxSet::ANY };
        }
        LITERAL_EXPR => LITERAL_EXPR_SLOTS,
        VARIABLE_EXPR => VARIABLE_EXPR_SLOTS,
        NAME_EXPR => NAME_EXPR_SLOTS,
        VARNAME_EXPR => VARNAME_EXPR_SLOTS,
        PREFIX_EXPR => PREFIX_EXPR_SLOTS,
        POSTFIX_EXPR => POSTFIX_EXPR_SLOTS,
        BINARY_EXPR => BINARY_EXPR_SLOTS,
        ASSIGN_EXPR => ASSIGN_EXPR_SLOTS,
        PAREN_EXPR => PAREN_EXPR_SLOTS,
        CAST_EXPR => CAST_EXPR_SLOTS,
        CALL_EXPR => CALL_EXPR_SLOTS,
        ARGUMENT_LIST => {
            return Layout::Collection { element: ARGUMENT, accepts: SyntaxSet::new([ARGUMENT]) };
        }
        ARGUMENT => ARGUMENT_SLOTS,
        MEMBER_ACCESS_EXPR => MEMBER_ACCESS_EXPR_SLOTS,
        ARRAY_ACCESS_EXPR => ARRAY_ACCESS_EXPR_SLOTS,
        ENCAPSED_STRING_EXPR => ENCAPSED_STRING_EXPR_SLOTS,
        ENCAPS_LIST => {
            return Layout::Collection { element: ENCAPS_STRING_PART, accepts: ENCAPS_KINDS };
        }
        ENCAPS_STRING_PART => ENCAPS_STRING_PART_SLOTS,
        ENCAPS_VARIABLE => ENCAPS_VARIABLE_SLOTS,
        ENCAPS_ARRAY_OFFSET => ENCAPS_ARRAY_OFFSET_SLOTS,
        ENCAPS_PROPERTY_FETCH => ENCAPS_PROPERTY_FETCH_SLOTS,
        ENCAPS_EMBED_EXPR => ENCAPS_EMBED_EXPR_SLOTS,
        _ => unreachable!("{kind:?} is a token kind"),
    };

    Layout::Fixed(slots)
}
