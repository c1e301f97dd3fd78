use std::fmt::Write as _;

use expect_test::{Expect, expect};
use polar_tokenizer::LexerOptions;
use polar_yellow::SyntaxKind::{self, *};
use polar_yellow::{ArenaStats, RawSyntax, RawSyntaxNode, Token, schema};
use rustc_hash::FxHashSet;

use crate::syntax::{COLLECTION_BUILDERS, LAYOUT_BUILDERS};
use crate::*;

fn check_with(text: &str, options: ParseOptions, expect: Expect) {
    let parse = parse(text, options);
    assert_eq!(parse.root().to_string(), text);
    assert_eq!(parse.root().validate_tree(), Ok(()));

    let mut actual = parse.debug_tree();
    for diagnostic in parse.diagnostics() {
        _ = writeln!(actual, "error {:?}: {}", diagnostic.range(), diagnostic.message());
    }
    expect.assert_eq(&actual);
}

fn check(text: &str, expect: Expect) {
    check_with(text, ParseOptions::default(), expect);
}

#[test]
fn binary_precedence() {
    check(
        "$a = 1 + 2 * 3;",
        expect![[r#"
            SOURCE_FILE
              INNER_STATEMENT_LIST
                EXPR_STMT
                  ASSIGN_EXPR
                    VARIABLE_EXPR
                      VARIABLE "$a"
                    EQUAL "="
                    BINARY_EXPR
                      LITERAL_EXPR
                        LNUMBER "1"
                      PLUS "+"
                      BINARY_EXPR
                        LITERAL_EXPR
                          LNUMBER "2"
                        MUL "*"
                        LITERAL_EXPR
                          LNUMBER "3"
                  SEMICOLON ";"
              EOF ""
        "#]],
    );
}

#[test]
fn postfix_chain_and_prefix() {
    check(
        "foo($x, 2)->bar[0]++ . -$y ** 2;",
        expect![[r#"
            SOURCE_FILE
              INNER_STATEMENT_LIST
                EXPR_STMT
                  BINARY_EXPR
                    POSTFIX_EXPR
                      ARRAY_ACCESS_EXPR
                        MEMBER_ACCESS_EXPR
                          CALL_EXPR
                            NAME_EXPR
                              IDENTIFIER "foo"
                            LPAREN "("
                            ARGUMENT_LIST
                              ARGUMENT
                                VARIABLE_EXPR
                                  VARIABLE "$x"
                                COMMA ","
                              ARGUMENT
                                LITERAL_EXPR
                                  LNUMBER "2"
                                COMMA <missing>
                            RPAREN ")"
                          OBJECT_OPERATOR "->"
                          IDENTIFIER "bar"
                        LBRACKET "["
                        LITERAL_EXPR
                          LNUMBER "0"
                        RBRACKET "]"
                      INC "++"
                    CONCAT "."
                    PREFIX_EXPR
                      MINUS "-"
                      BINARY_EXPR
                        VARIABLE_EXPR
                          VARIABLE "$y"
                        POW "**"
                        LITERAL_EXPR
                          LNUMBER "2"
                  SEMICOLON ";"
              EOF ""
        "#]],
    );
}

#[test]
fn if_else_and_echo() {
    check(
        "if ($a) { echo $b, 'c'; } else return;",
        expect![[r#"
            SOURCE_FILE
              INNER_STATEMENT_LIST
                IF_STMT
                  IF_KW "if"
                  LPAREN "("
                  VARIABLE_EXPR
                    VARIABLE "$a"
                  RPAREN ")"
                  BLOCK_STMT
                    LBRACE "{"
                    INNER_STATEMENT_LIST
                      ECHO_STMT
                        ECHO_KW "echo"
                        EXPR_LIST
                          EXPR_LIST_ITEM
                            VARIABLE_EXPR
                              VARIABLE "$b"
                            COMMA ","
                          EXPR_LIST_ITEM
                            LITERAL_EXPR
                              CONSTANT_ENCAPSED_STRING "'c'"
                            COMMA <missing>
                        SEMICOLON ";"
                    RBRACE "}"
                  ELSE_CLAUSE
                    ELSE_KW "else"
                    RETURN_STMT
                      RETURN_KW "return"
                      EXPR <missing>
                      SEMICOLON ";"
              EOF ""
        "#]],
    );
}

#[test]
fn while_with_cast() {
    check(
        "while ($i < 3) $s .= (string) $i;",
        expect![[r#"
            SOURCE_FILE
              INNER_STATEMENT_LIST
                WHILE_STMT
                  WHILE_KW "while"
                  LPAREN "("
                  BINARY_EXPR
                    VARIABLE_EXPR
                      VARIABLE "$i"
                    IS_SMALLER "<"
                    LITERAL_EXPR
                      LNUMBER "3"
                  RPAREN ")"
                  EXPR_STMT
                    ASSIGN_EXPR
                      VARIABLE_EXPR
                        VARIABLE "$s"
                      CONCAT_EQUAL ".="
                      CAST_EXPR
                        STRING_CAST "(string)"
                        VARIABLE_EXPR
                          VARIABLE "$i"
                    SEMICOLON ";"
              EOF ""
        "#]],
    );
}

#[test]
fn label_and_interpolation() {
    check(
        r#"label: "x $y[1] {$z->w}";"#,
        expect![[r#"
            SOURCE_FILE
              INNER_STATEMENT_LIST
                LABEL_STMT
                  IDENTIFIER "label"
                  COLON ":"
                EXPR_STMT
                  ENCAPSED_STRING_EXPR
                    DOUBLE_QUOTE "\""
                    ENCAPS_LIST
                      ENCAPS_STRING_PART
                        ENCAPSED_AND_WHITESPACE "x "
                      ENCAPS_ARRAY_OFFSET
                        VARIABLE "$y"
                        LBRACKET "["
                        MINUS <missing>
                        NUM_STRING "1"
                        RBRACKET "]"
                      ENCAPS_STRING_PART
                        ENCAPSED_AND_WHITESPACE " "
                      ENCAPS_EMBED_EXPR
                        CURLY_OPEN "{"
                        MEMBER_ACCESS_EXPR
                          VARIABLE_EXPR
                            VARIABLE "$z"
                          OBJECT_OPERATOR "->"
                          IDENTIFIER "w"
                        RBRACE "}"
                    DOUBLE_QUOTE "\""
                  SEMICOLON ";"
              EOF ""
        "#]],
    );
}

#[test]
fn heredoc_expression() {
    check(
        "echo <<<EOT\n  a $b\n  EOT;\n",
        expect![[r#"
            SOURCE_FILE
              INNER_STATEMENT_LIST
                ECHO_STMT
                  ECHO_KW "echo"
                  EXPR_LIST
                    EXPR_LIST_ITEM
                      ENCAPSED_STRING_EXPR
                        START_HEREDOC "<<<EOT\n"
                        ENCAPS_LIST
                          ENCAPS_STRING_PART
                            ENCAPSED_AND_WHITESPACE "  a "
                          ENCAPS_VARIABLE
                            VARIABLE "$b"
                          ENCAPS_STRING_PART
                            ENCAPSED_AND_WHITESPACE "\n"
                        END_HEREDOC "  EOT"
                      COMMA <missing>
                  SEMICOLON ";"
              EOF ""
        "#]],
    );
}

#[test]
fn inline_html_and_echo_tag() {
    check_with(
        "<p><?= $a ?></p>",
        ParseOptions::file(),
        expect![[r#"
            SOURCE_FILE
              INNER_STATEMENT_LIST
                INLINE_HTML_STMT
                  INLINE_HTML "<p>"
                ECHO_STMT
                  OPEN_TAG_WITH_ECHO "<?="
                  EXPR_LIST
                    EXPR_LIST_ITEM
                      VARIABLE_EXPR
                        VARIABLE "$a"
                      COMMA <missing>
                  CLOSE_TAG "?>"
                INLINE_HTML_STMT
                  INLINE_HTML "</p>"
              EOF ""
        "#]],
    );
}

#[test]
fn missing_expression_and_stray_token() {
    check(
        "$a = ;\n)",
        expect![[r#"
            SOURCE_FILE
              INNER_STATEMENT_LIST
                EXPR_STMT
                  ASSIGN_EXPR
                    VARIABLE_EXPR
                      VARIABLE "$a"
                    EQUAL "="
                    EXPR <missing>
                  SEMICOLON ";"
                UNKNOWN_STMT
                  RPAREN ")"
              EOF ""
            error 5..6: expected expression
            error 7..8: expected statement
        "#]],
    );
}

#[test]
fn unknown_expression() {
    check(
        "$a = => 1;",
        expect![[r#"
            SOURCE_FILE
              INNER_STATEMENT_LIST
                EXPR_STMT
                  ASSIGN_EXPR
                    VARIABLE_EXPR
                      VARIABLE "$a"
                    EQUAL "="
                    UNKNOWN_EXPR
                      DOUBLE_ARROW "=>"
                  SEMICOLON <missing>
                EXPR_STMT
                  LITERAL_EXPR
                    LNUMBER "1"
                  SEMICOLON ";"
              EOF ""
            error 5..7: expected expression
            error 8..9: expected ';'
        "#]],
    );
}

#[test]
fn lexical_diagnostics_are_reported() {
    let parse = parse("$a = 08;", ParseOptions::default());
    let messages: Vec<_> =
        parse.diagnostics().iter().map(|d| (d.code(), d.message().to_owned())).collect();

    assert_eq!(messages, [(1001, "Invalid numeric literal".to_owned())]);
}

#[test]
fn malformed_input_still_round_trips() {
    let sources = [
        "if (",
        "}}})",
        "echo",
        "\"abc $x",
        "$a[",
        "${a}",
        "while ($a) { if ($b) }",
        "/* open",
        "<<<EOT\n  $a\n  EOT",
        "function foo() { return 1; }",
        "$a->class->b?->c()['d'] ??= -(int) 1.5e3 <=> !$b instanceof C;",
    ];
    for text in sources {
        let parse = parse(text, ParseOptions::default());
        assert_eq!(parse.root().to_string(), text);
        assert_eq!(parse.root().validate_tree(), Ok(()), "{text}");
    }

    let html = "<html>\n<?php if ($a): ?>\n<b><?= $a, $b ?></b>\n<?php } ?>\n";
    let parse = parse(html, ParseOptions::file());
    assert_eq!(parse.root().to_string(), html);
    assert_eq!(parse.root().validate_tree(), Ok(()));
}

/// Yields pseudo-random PHP-ish buffers from a fixed seed (xorshift64).
struct Fragments(u64);

impl Fragments {
    const ALPHABET: &[&str] = &[
        "$a", " ", "\n", "\"", "'", "{", "}", "${", "->", "<<<EOT\n", "EOT", "08", "1", "-",
        "+", "=", "?>", "<?php ", "/*", "*/", "//", "\\", "(int)", ";", "(", ")", "[", "]", "`",
        "if", "else", "while", "echo", ":", ",", "é",
    ];

    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn text(&mut self) -> String {
        let len = self.next() % 24;
        (0..len).map(|_| Self::ALPHABET[(self.next() % Self::ALPHABET.len() as u64) as usize]).collect()
    }
}

#[test]
fn random_fragments_round_trip() {
    let mut fragments = Fragments(0x2545_f491_4f6c_dd1d);
    for _ in 0..1000 {
        let text = fragments.text();
        for options in [ParseOptions::default(), ParseOptions::file()] {
            let parse = parse(&text, options);
            assert_eq!(parse.root().to_string(), text);
            assert_eq!(parse.root().validate_tree(), Ok(()), "{text:?}");
        }
    }
}

fn distinct_nodes(root: &RawSyntaxNode) -> usize {
    let mut seen = FxHashSet::default();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if seen.insert(&**node as *const RawSyntax) {
            stack.extend(node.children());
        }
    }
    seen.len()
}

#[test]
fn abandoned_labels_allocate_nothing() {
    let parse = parse("foo: bar(); baz;", ParseOptions::default());

    assert_eq!(parse.root().children()[0].children()[0].kind(), LABEL_STMT);
    assert_eq!(parse.root().children()[0].children()[1].kind(), EXPR_STMT);
    assert_eq!(parse.stats().total(), distinct_nodes(parse.root()));
}

/// `$total = count($items) + 1;`, built through `ctx`.
fn sample(ctx: &SyntaxParsingContext) -> ParsedRawSyntaxNode {
    let mut tokens = Vec::new();
    polar_tokenizer::tokenize(
        "$total = count($items) + 1;",
        LexerOptions::default(),
        |token, _, _| tokens.push(token.clone()),
    );
    let mut tokens = tokens.into_iter().map(|token| ctx.make_token(token));
    let mut next = || tokens.next().unwrap_or_default();

    let total = ParsedVariableExprSyntax::make(ctx, next());
    let equal = next();
    let count = ParsedNameExprSyntax::make(ctx, next());
    let lparen = next();
    let items = ParsedVariableExprSyntax::make(ctx, next());
    let argument = ParsedArgumentSyntax::make(ctx, items.into_raw(), ParsedRawSyntaxNode::Null);
    let arguments = ParsedArgumentListSyntax::make(ctx, vec![argument.into_raw()]);
    let call = CallExprSyntaxBuilder::new()
        .use_callee(count.into_raw())
        .use_lparen(lparen)
        .use_arguments(arguments.into_raw())
        .use_rparen(next())
        .build(ctx);
    let plus = next();
    let one = ParsedLiteralExprSyntax::make(ctx, next());
    let sum = ParsedBinaryExprSyntax::make(ctx, call.into_raw(), plus, one.into_raw());
    let assign = ParsedAssignExprSyntax::make(ctx, total.into_raw(), equal, sum.into_raw());
    ParsedExprStmtSyntax::make(ctx, assign.into_raw(), next()).into_raw()
}

#[test]
fn deferred_and_recorded_trees_are_equal() {
    let recording = SyntaxParsingContext::new();
    let recorded = sample(&recording);
    assert!(recorded.is_recorded());

    let mut backtracking = SyntaxParsingContext::new();
    let scope = backtracking.begin_backtracking(0.into());
    let deferred = sample(&backtracking);
    assert!(deferred.is_deferred());
    assert_eq!(backtracking.arena().stats().total(), 0);

    let statement = ParsedExprStmtSyntax::cast(deferred.clone()).unwrap();
    let assign = ParsedAssignExprSyntax::cast(statement.deferred_expr()).unwrap();
    assert_eq!(assign.deferred_operator().token().map(Token::text), Some("="));

    let committed = scope.commit(&mut backtracking, deferred);
    let recorded = recorded.recorded().unwrap();
    let committed = committed.recorded().unwrap();

    assert_eq!(recorded, committed);
    assert_eq!(committed.to_string(), "$total = count($items) + 1;");
    assert_eq!(recording.arena().stats(), backtracking.arena().stats());
}

#[test]
fn abandoned_region_allocates_nothing() {
    let mut ctx = SyntaxParsingContext::new();
    let scope = ctx.begin_backtracking(0.into());

    let node = sample(&ctx);
    assert_eq!(node.deferred_count(), 20);
    drop(node);
    scope.abandon(&mut ctx);

    assert_eq!(ctx.arena().stats(), ArenaStats::default());
}

#[test]
fn every_layout_kind_has_a_builder() {
    let covered: Vec<SyntaxKind> =
        LAYOUT_BUILDERS.iter().chain(COLLECTION_BUILDERS).map(|&(kind, _)| kind).collect();

    for &kind in SyntaxKind::LAYOUTS {
        if !matches!(kind, EXPR | STMT) {
            assert!(covered.contains(&kind), "{kind:?} has no builder");
        }
    }
}

#[test]
fn empty_builders_fill_every_slot_with_missing() {
    let ctx = SyntaxParsingContext::new();

    for &(kind, build) in LAYOUT_BUILDERS {
        let node = build(&ctx).into_recorded(ctx.arena()).unwrap();
        let slots = schema::layout(kind).slots();

        assert_eq!(node.kind(), kind);
        assert!(node.is_present(), "{kind:?}");
        assert_eq!(node.children().len(), slots.len(), "{kind:?}");
        for (child, slot) in node.children().iter().zip(slots) {
            assert!(child.is_missing(), "{kind:?}.{}", slot.name);
            assert_eq!(child.kind(), slot.expected, "{kind:?}.{}", slot.name);
        }
        assert_eq!(node.validate(), Ok(()));
    }
}

#[test]
fn empty_builders_defer_while_backtracking() {
    let mut ctx = SyntaxParsingContext::new();

    for &(kind, build) in LAYOUT_BUILDERS.iter().chain(COLLECTION_BUILDERS) {
        let scope = ctx.begin_backtracking(0.into());
        let node = build(&ctx);
        assert!(node.is_deferred(), "{kind:?}");
        assert_eq!(node.kind(), Some(kind));
        scope.abandon(&mut ctx);
    }

    assert_eq!(ctx.arena().stats().total(), 0);
}
