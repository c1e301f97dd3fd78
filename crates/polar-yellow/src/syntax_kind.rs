//! Static kind tables: every token and node kind with its spelling and category.

/// Broad category of a token kind.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TokenCategory {
    Keyword,
    Punctuator,
    Literal,
    Misc,
}

macro_rules! syntax_kinds {
    (
        punctuators { $($punct:ident => $punct_text:literal,)* }
        keywords { $($kw:ident => $kw_text:literal,)* }
        literals { $($lit:ident => $lit_name:literal,)* }
        misc { $($misc:ident => $misc_name:literal,)* }
        nodes { $($node:ident,)* }
    ) => {
        #[allow(non_camel_case_types)]
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        #[repr(u16)]
        pub enum SyntaxKind {
            $($punct,)*
            $($kw,)*
            $($lit,)*
            $($misc,)*
            $($node,)*
        }

        impl SyntaxKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [Self] = &[
                $(Self::$punct,)*
                $(Self::$kw,)*
                $(Self::$lit,)*
                $(Self::$misc,)*
                $(Self::$node,)*
            ];

            /// Layout (non-token) kinds, in declaration order.
            pub const LAYOUTS: &'static [Self] = &[$(Self::$node,)*];

            const KEYWORDS: &'static [Self] = &[$(Self::$kw,)*];

            pub const COUNT: usize = Self::ALL.len();

            /// The fixed spelling of this kind, if it has one.
            pub const fn text(self) -> Option<&'static str> {
                match self {
                    $(Self::$punct => Some($punct_text),)*
                    $(Self::$kw => Some($kw_text),)*
                    _ => None,
                }
            }

            /// Human readable name used in diagnostics.
            pub const fn display_name(self) -> &'static str {
                match self {
                    $(Self::$punct => $punct_text,)*
                    $(Self::$kw => $kw_text,)*
                    $(Self::$lit => $lit_name,)*
                    $(Self::$misc => $misc_name,)*
                    $(Self::$node => stringify!($node),)*
                }
            }

            /// Category of a token kind; `None` for layout kinds.
            pub const fn category(self) -> Option<TokenCategory> {
                match self {
                    $(Self::$punct => Some(TokenCategory::Punctuator),)*
                    $(Self::$kw => Some(TokenCategory::Keyword),)*
                    $(Self::$lit => Some(TokenCategory::Literal),)*
                    $(Self::$misc => Some(TokenCategory::Misc),)*
                    $(Self::$node => None,)*
                }
            }
        }
    };
}

syntax_kinds! {
    punctuators {
        PLUS => "+",
        MINUS => "-",
        MUL => "*",
        DIV => "/",
        MOD => "%",
        POW => "**",
        CONCAT => ".",
        INC => "++",
        DEC => "--",
        EQUAL => "=",
        PLUS_EQUAL => "+=",
        MINUS_EQUAL => "-=",
        MUL_EQUAL => "*=",
        DIV_EQUAL => "/=",
        CONCAT_EQUAL => ".=",
        MOD_EQUAL => "%=",
        POW_EQUAL => "**=",
        AND_EQUAL => "&=",
        OR_EQUAL => "|=",
        XOR_EQUAL => "^=",
        SL_EQUAL => "<<=",
        SR_EQUAL => ">>=",
        COALESCE_EQUAL => "??=",
        IS_EQUAL => "==",
        IS_NOT_EQUAL => "!=",
        IS_IDENTICAL => "===",
        IS_NOT_IDENTICAL => "!==",
        IS_SMALLER => "<",
        IS_GREATER => ">",
        IS_SMALLER_OR_EQUAL => "<=",
        IS_GREATER_OR_EQUAL => ">=",
        SPACESHIP => "<=>",
        BOOLEAN_AND => "&&",
        BOOLEAN_OR => "||",
        EXCLAMATION => "!",
        AMPERSAND => "&",
        PIPE => "|",
        CARET => "^",
        TILDE => "~",
        SL => "<<",
        SR => ">>",
        QUESTION => "?",
        COALESCE => "??",
        COLON => ":",
        PAAMAYIM_NEKUDOTAYIM => "::",
        SEMICOLON => ";",
        COMMA => ",",
        LPAREN => "(",
        RPAREN => ")",
        LBRACKET => "[",
        RBRACKET => "]",
        LBRACE => "{",
        RBRACE => "}",
        OBJECT_OPERATOR => "->",
        NULLSAFE_OBJECT_OPERATOR => "?->",
        DOUBLE_ARROW => "=>",
        ELLIPSIS => "...",
        AT => "@",
        DOLLAR => "$",
        NS_SEPARATOR => "\\",
        ATTRIBUTE => "#[",
        DOUBLE_QUOTE => "\"",
        BACKTICK => "`",
        DOLLAR_OPEN_CURLY_BRACES => "${",
        CURLY_OPEN => "{",
        INT_CAST => "(int)",
        DOUBLE_CAST => "(float)",
        STRING_CAST => "(string)",
        ARRAY_CAST => "(array)",
        OBJECT_CAST => "(object)",
        BOOL_CAST => "(bool)",
        UNSET_CAST => "(unset)",
    }
    keywords {
        ABSTRACT_KW => "abstract",
        AND_KW => "and",
        ARRAY_KW => "array",
        AS_KW => "as",
        BREAK_KW => "break",
        CALLABLE_KW => "callable",
        CASE_KW => "case",
        CATCH_KW => "catch",
        CLASS_KW => "class",
        CLONE_KW => "clone",
        CONST_KW => "const",
        CONTINUE_KW => "continue",
        DECLARE_KW => "declare",
        DEFAULT_KW => "default",
        DO_KW => "do",
        ECHO_KW => "echo",
        ELSE_KW => "else",
        ELSEIF_KW => "elseif",
        EMPTY_KW => "empty",
        ENDDECLARE_KW => "enddeclare",
        ENDFOR_KW => "endfor",
        ENDFOREACH_KW => "endforeach",
        ENDIF_KW => "endif",
        ENDSWITCH_KW => "endswitch",
        ENDWHILE_KW => "endwhile",
        EVAL_KW => "eval",
        EXIT_KW => "exit",
        EXTENDS_KW => "extends",
        FINAL_KW => "final",
        FINALLY_KW => "finally",
        FN_KW => "fn",
        FOR_KW => "for",
        FOREACH_KW => "foreach",
        FUNCTION_KW => "function",
        GLOBAL_KW => "global",
        GOTO_KW => "goto",
        HALT_COMPILER_KW => "__halt_compiler",
        IF_KW => "if",
        IMPLEMENTS_KW => "implements",
        INCLUDE_KW => "include",
        INCLUDE_ONCE_KW => "include_once",
        INSTANCEOF_KW => "instanceof",
        INSTEADOF_KW => "insteadof",
        INTERFACE_KW => "interface",
        ISSET_KW => "isset",
        LIST_KW => "list",
        MATCH_KW => "match",
        NAMESPACE_KW => "namespace",
        NEW_KW => "new",
        OR_KW => "or",
        PRINT_KW => "print",
        PRIVATE_KW => "private",
        PROTECTED_KW => "protected",
        PUBLIC_KW => "public",
        READONLY_KW => "readonly",
        REQUIRE_KW => "require",
        REQUIRE_ONCE_KW => "require_once",
        RETURN_KW => "return",
        STATIC_KW => "static",
        SWITCH_KW => "switch",
        THROW_KW => "throw",
        TRAIT_KW => "trait",
        TRY_KW => "try",
        UNSET_KW => "unset",
        USE_KW => "use",
        VAR_KW => "var",
        WHILE_KW => "while",
        XOR_KW => "xor",
        YIELD_KW => "yield",
        CLASS_C_KW => "__CLASS__",
        DIR_KW => "__DIR__",
        FILE_KW => "__FILE__",
        FUNC_C_KW => "__FUNCTION__",
        LINE_KW => "__LINE__",
        METHOD_C_KW => "__METHOD__",
        NS_C_KW => "__NAMESPACE__",
        TRAIT_C_KW => "__TRAIT__",
    }
    literals {
        LNUMBER => "integer literal",
        DNUMBER => "floating-point literal",
        IDENTIFIER => "identifier",
        VARIABLE => "variable",
        CONSTANT_ENCAPSED_STRING => "string literal",
        ENCAPSED_AND_WHITESPACE => "string content",
        STRING_VARNAME => "variable name",
        NUM_STRING => "string offset",
        START_HEREDOC => "heredoc start",
        END_HEREDOC => "heredoc end",
        INLINE_HTML => "inline HTML",
    }
    misc {
        OPEN_TAG => "open tag",
        OPEN_TAG_WITH_ECHO => "open tag with echo",
        CLOSE_TAG => "close tag",
        UNKNOWN => "unknown token",
        EOF => "end of file",
    }
    nodes {
        EXPR,
        STMT,
        SOURCE_FILE,
        INNER_STATEMENT_LIST,
        EXPR_STMT,
        ECHO_STMT,
        EXPR_LIST,
        EXPR_LIST_ITEM,
        RETURN_STMT,
        BLOCK_STMT,
        IF_STMT,
        ELSE_CLAUSE,
        WHILE_STMT,
        LABEL_STMT,
        INLINE_HTML_STMT,
        UNKNOWN_STMT,
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
        ARGUMENT_LIST,
        ARGUMENT,
        MEMBER_ACCESS_EXPR,
        ARRAY_ACCESS_EXPR,
        ENCAPSED_STRING_EXPR,
        ENCAPS_LIST,
        ENCAPS_STRING_PART,
        ENCAPS_VARIABLE,
        ENCAPS_ARRAY_OFFSET,
        ENCAPS_PROPERTY_FETCH,
        ENCAPS_EMBED_EXPR,
        UNKNOWN_EXPR,
    }
}

impl SyntaxKind {
    #[inline]
    pub const fn is_token(self) -> bool {
        (self as u16) < (Self::EXPR as u16)
    }

    #[inline]
    pub const fn is_layout(self) -> bool {
        !self.is_token()
    }

    #[inline]
    pub const fn is_keyword(self) -> bool {
        matches!(self.category(), Some(TokenCategory::Keyword))
    }

    /// Looks up a keyword by its spelling, ignoring ASCII case.
    pub fn from_keyword(ident: &str) -> Option<Self> {
        Self::KEYWORDS
            .iter()
            .copied()
            .find(|kind| kind.text().is_some_and(|text| text.eq_ignore_ascii_case(ident)))
    }

    /// Catch-all kinds produced by error recovery.
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::UNKNOWN_STMT | Self::UNKNOWN_EXPR | Self::UNKNOWN)
    }
}
