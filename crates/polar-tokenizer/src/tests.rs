use std::fmt::Write as _;

use expect_test::{Expect, expect};

use super::*;

fn tokens_with(text: &str, options: LexerOptions) -> Vec<Token> {
    let mut tokens = Vec::new();
    tokenize(text, options, |token, _, _| tokens.push(token.clone()));
    tokens
}

fn tokens(text: &str) -> Vec<Token> {
    tokens_with(text, LexerOptions::default())
}

fn kinds(text: &str) -> Vec<SyntaxKind> {
    tokens(text).iter().map(Token::kind).collect()
}

fn errors(text: &str) -> Vec<Diagnostic> {
    let mut errors = Vec::new();
    Lexer::new(text, LexerOptions::default())
        .with_error_handler(|diagnostic| errors.push(diagnostic.clone()))
        .tokenize(|_, _, _| {});
    errors
}

fn check(text: &str, expect: Expect) {
    let mut buf = String::new();
    tokenize(text, LexerOptions::default(), |token, _, _| {
        _ = write!(buf, "{:?} {:?}", token.kind(), token.text());
        match token.value() {
            Some(LiteralValue::Integer(value)) => _ = write!(buf, " = {value}"),
            Some(LiteralValue::Double(value)) => _ = write!(buf, " = {value:?}"),
            Some(LiteralValue::String(bytes)) => {
                _ = write!(buf, " = {:?}", String::from_utf8_lossy(bytes));
            }
            None => {}
        }
        buf.push('\n');
    });
    expect.assert_eq(&buf);
}

fn assert_round_trip(text: &str, options: LexerOptions) {
    let mut printed = String::new();
    tokenize(text, options, |token, leading, trailing| {
        _ = write!(printed, "{leading}{}{trailing}", token.text());
    });
    assert_eq!(printed, text);
}

#[test]
fn punctuation_without_trivia() {
    let tokens = tokens("+-*/%{}->");
    let kinds: Vec<_> = tokens.iter().map(Token::kind).collect();

    assert_eq!(kinds, [PLUS, MINUS, MUL, DIV, MOD, LBRACE, RBRACE, OBJECT_OPERATOR, EOF]);
    assert!(
        tokens
            .iter()
            .all(|token| token.leading_trivia().is_empty() && token.trailing_trivia().is_empty())
    );
}

#[test]
fn longest_operator_wins() {
    assert_eq!(
        kinds("<=> **= ??= ... !== <<= ?-> :: =>"),
        [
            SPACESHIP,
            POW_EQUAL,
            COALESCE_EQUAL,
            ELLIPSIS,
            IS_NOT_IDENTICAL,
            SL_EQUAL,
            NULLSAFE_OBJECT_OPERATOR,
            PAAMAYIM_NEKUDOTAYIM,
            DOUBLE_ARROW,
            EOF
        ]
    );
}

#[test]
fn negated_boundary_integer() {
    let tokens = tokens("-9223372036854775808");

    assert_eq!(tokens[0].kind(), MINUS);
    assert_eq!(tokens[1].kind(), LNUMBER);
    assert_eq!(tokens[1].value(), Some(&LiteralValue::Integer(i64::MIN)));
    assert!(tokens[1].needs_literal_overflow_correction());
}

#[test]
fn boundary_integer_without_minus_is_double() {
    let tokens = tokens("9223372036854775808");

    assert_eq!(tokens[0].kind(), DNUMBER);
    assert_eq!(tokens[0].value(), Some(&LiteralValue::Double(9223372036854775808.0)));
    assert!(!tokens[0].needs_literal_overflow_correction());
}

#[test]
fn binary_minus_does_not_correct_overflow() {
    let tokens = tokens("$a - 9223372036854775808");

    assert_eq!(tokens[2].kind(), DNUMBER);
    assert!(!tokens[2].needs_literal_overflow_correction());

    let tokens = self::tokens("(- 9223372036854775808)");
    assert_eq!(tokens[2].kind(), LNUMBER);
    assert!(tokens[2].needs_literal_overflow_correction());

    let tokens = self::tokens("${'a'} - 9223372036854775808");
    assert_eq!(tokens[3].kind(), RBRACE);
    assert_eq!(tokens[5].kind(), DNUMBER);
    assert!(!tokens[5].needs_literal_overflow_correction());

    let tokens = self::tokens("$a->{'b'} - 9223372036854775808");
    assert_eq!(tokens[6].kind(), DNUMBER);

    let tokens = self::tokens("Foo::class - 9223372036854775808");
    assert_eq!(tokens[2].kind(), CLASS_KW);
    assert_eq!(tokens[4].kind(), DNUMBER);
    assert!(!tokens[4].needs_literal_overflow_correction());

    let tokens = self::tokens("{ } -9223372036854775808");
    assert_eq!(tokens[3].kind(), LNUMBER);
    assert!(tokens[3].needs_literal_overflow_correction());
}

#[test]
fn keywords_after_double_colon_are_identifiers() {
    let tokens = tokens("Foo::list");
    assert_eq!(tokens[2].kind(), IDENTIFIER);
    assert!(tokens[2].flags().contains(TokenFlags::ESCAPED_IDENTIFIER));
}

#[test]
fn hex_boundary() {
    let max = tokens("0x7fffffffffffffff");
    assert_eq!(max[0].kind(), LNUMBER);
    assert_eq!(max[0].value(), Some(&LiteralValue::Integer(i64::MAX)));

    let overflow = tokens("0x8000000000000000");
    assert_eq!(overflow[0].kind(), DNUMBER);
    assert_eq!(overflow[0].value(), Some(&LiteralValue::Double(9223372036854775808.0)));
}

#[test]
fn invalid_octal_literals() {
    for text in ["08123", "0071239"] {
        let tokens = tokens(text);
        assert_eq!(tokens.len(), 2, "{text}");
        assert_eq!(tokens[0].kind(), LNUMBER);
        assert_eq!(tokens[0].text(), text);
        assert!(tokens[0].is_invalid_literal());
        assert!(!tokens[0].has_value());

        let errors = errors(text);
        assert_eq!(errors.len(), 1, "{text}");
        assert_eq!(errors[0].message(), "Invalid numeric literal");
        assert_eq!(errors[0].code(), 1001);
    }
}

#[test]
fn numeric_literals() {
    let cases = [
        ("0", LiteralValue::Integer(0)),
        ("017", LiteralValue::Integer(15)),
        ("0o17", LiteralValue::Integer(15)),
        ("0b101", LiteralValue::Integer(5)),
        ("0X1f", LiteralValue::Integer(31)),
        ("1_000", LiteralValue::Integer(1000)),
        ("1.5", LiteralValue::Double(1.5)),
        (".5", LiteralValue::Double(0.5)),
        ("1e3", LiteralValue::Double(1000.0)),
        ("1E-3", LiteralValue::Double(0.001)),
        ("18446744073709551616", LiteralValue::Double(18446744073709551616.0)),
    ];

    for (text, value) in cases {
        let tokens = tokens(text);
        assert_eq!(tokens.len(), 2, "{text}");
        assert_eq!(tokens[0].text(), text);
        assert_eq!(tokens[0].value(), Some(&value), "{text}");
    }
}

#[test]
fn single_quoted_escapes() {
    let text = r"'a \n \\ \'b\''";
    let tokens = tokens(text);

    assert_eq!(tokens[0].kind(), CONSTANT_ENCAPSED_STRING);
    assert_eq!(tokens[0].text(), text);
    assert_eq!(tokens[0].value().and_then(LiteralValue::as_bytes), Some(&b"a \\n \\ 'b'"[..]));
}

#[test]
fn double_quoted_without_interpolation() {
    let tokens = tokens(r#"b"\t\x41\$a""#);

    assert_eq!(tokens[0].kind(), CONSTANT_ENCAPSED_STRING);
    assert_eq!(tokens[0].value().and_then(LiteralValue::as_bytes), Some(&b"\tA$a"[..]));
}

#[test]
fn interpolated_string() {
    check(
        r#""a $b[0] {$c->d}${e}\n""#,
        expect![[r#"
            DOUBLE_QUOTE "\""
            ENCAPSED_AND_WHITESPACE "a " = "a "
            VARIABLE "$b"
            LBRACKET "["
            NUM_STRING "0" = 0
            RBRACKET "]"
            ENCAPSED_AND_WHITESPACE " " = " "
            CURLY_OPEN "{"
            VARIABLE "$c"
            OBJECT_OPERATOR "->"
            IDENTIFIER "d"
            RBRACE "}"
            DOLLAR_OPEN_CURLY_BRACES "${"
            STRING_VARNAME "e"
            RBRACE "}"
            ENCAPSED_AND_WHITESPACE "\\n" = "\n"
            DOUBLE_QUOTE "\""
            EOF ""
        "#]],
    );
}

#[test]
fn backtick_string() {
    assert_eq!(kinds("`ls $d`"), [BACKTICK, ENCAPSED_AND_WHITESPACE, VARIABLE, BACKTICK, EOF]);
}

#[test]
fn indented_heredoc() {
    check(
        "<<<EOT\n    a $x\n     b\n    EOT;\n",
        expect![[r#"
            START_HEREDOC "<<<EOT\n"
            ENCAPSED_AND_WHITESPACE "    a " = "a "
            VARIABLE "$x"
            ENCAPSED_AND_WHITESPACE "\n     b\n" = "\n b"
            END_HEREDOC "    EOT"
            SEMICOLON ";"
            EOF ""
        "#]],
    );
}

#[test]
fn nowdoc_keeps_dollars() {
    check(
        "<<<'RAW'\n  $x\n  RAW",
        expect![[r#"
            START_HEREDOC "<<<'RAW'\n"
            ENCAPSED_AND_WHITESPACE "  $x\n" = "$x"
            END_HEREDOC "  RAW"
            EOF ""
        "#]],
    );
}

#[test]
fn under_indented_heredoc_body() {
    let errors = errors("<<<EOT\n  a\n    EOT;");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), 1007);
}

#[test]
fn unterminated_literals() {
    for (text, code) in [("\"abc $a", 1002), ("'abc", 1002), ("<<<EOT\nabc\n", 1003)] {
        let tokens = tokens(text);
        assert_eq!(tokens.len(), 2, "{text}");
        assert_eq!(tokens[0].kind(), ENCAPSED_AND_WHITESPACE);
        assert_eq!(tokens[0].text(), text);
        assert!(!tokens[0].has_value());

        let errors = errors(text);
        assert_eq!(errors.iter().map(Diagnostic::code).collect::<Vec<_>>(), [code], "{text}");
    }
}

#[test]
fn trivia_attachment() {
    let tokens = tokens("$a = 1; // note\n  $b");

    assert!(tokens[0].is_at_start_of_line());
    assert!(!tokens[1].is_at_start_of_line());
    assert_eq!(
        tokens[3].trailing_trivia().pieces(),
        [TriviaPiece::Spaces(1), TriviaPiece::LineComment("// note".into())]
    );
    assert_eq!(tokens[4].kind(), VARIABLE);
    assert_eq!(
        tokens[4].leading_trivia().pieces(),
        [TriviaPiece::Newlines(1), TriviaPiece::Spaces(2)]
    );
    assert!(tokens[4].is_at_start_of_line());
}

#[test]
fn comments() {
    let tokens = tokens("/** doc */ $a /* c */# end");

    assert_eq!(
        tokens[0].leading_trivia().pieces(),
        [TriviaPiece::DocComment("/** doc */".into()), TriviaPiece::Spaces(1)]
    );
    assert_eq!(
        tokens[0].trailing_trivia().pieces(),
        [
            TriviaPiece::Spaces(1),
            TriviaPiece::BlockComment("/* c */".into()),
            TriviaPiece::LineComment("# end".into())
        ]
    );
    assert_eq!(tokens[1].kind(), EOF);

    assert_eq!(errors("/* open").iter().map(Diagnostic::code).collect::<Vec<_>>(), [1004]);
}

#[test]
fn keywords() {
    assert_eq!(kinds("CLASS die Echo foo"), [CLASS_KW, EXIT_KW, ECHO_KW, IDENTIFIER, EOF]);

    let tokens = tokens("$a->class");
    assert_eq!(tokens[2].kind(), IDENTIFIER);
    assert!(tokens[2].flags().contains(TokenFlags::ESCAPED_IDENTIFIER));
}

#[test]
fn casts() {
    let tokens = tokens("( int )$a");
    assert_eq!(tokens[0].kind(), INT_CAST);
    assert_eq!(tokens[0].text(), "( int )");

    assert_eq!(kinds("(Boolean)(real)(binary)"), [BOOL_CAST, DOUBLE_CAST, STRING_CAST, EOF]);
    assert_eq!(kinds("(foo)"), [LPAREN, IDENTIFIER, RPAREN, EOF]);
}

#[test]
fn inline_html_and_tags() {
    let tokens = tokens_with("<p><?php echo 1 ?>\n</p>", LexerOptions::file());
    let texts: Vec<_> = tokens.iter().map(|token| (token.kind(), token.text())).collect();

    assert_eq!(
        texts,
        [
            (INLINE_HTML, "<p>"),
            (OPEN_TAG, "<?php "),
            (ECHO_KW, "echo"),
            (LNUMBER, "1"),
            (CLOSE_TAG, "?>\n"),
            (INLINE_HTML, "</p>"),
            (EOF, ""),
        ]
    );
}

#[test]
fn short_open_tag_is_opt_in() {
    let options = LexerOptions { short_open_tag: true, ..LexerOptions::file() };
    let kinds: Vec<_> = tokens_with("<? $a", options).iter().map(Token::kind).collect();
    assert_eq!(kinds, [OPEN_TAG, VARIABLE, EOF]);

    let kinds: Vec<_> = tokens_with("<? $a", LexerOptions::file()).iter().map(Token::kind).collect();
    assert_eq!(kinds, [INLINE_HTML, EOF]);
}

#[test]
fn round_trip() {
    let scripts = [
        "$a = 1;\r\n\r\n\t// c\r\n$b .= \"x{$a}y\";",
        "<<<EOT\n  a\n  EOT;\n<<<'N'\nx\nN;\n",
        "\"unterminated $a",
        "/* open",
        "$x = `ls -l`; echo ${a} . \"${b}[0]\" . $c[1] . \"$d->e\";",
        "echo 0x1F, 0b11, 017, 1_000.5e3, 08, (string) $a;",
        "\u{feff}$é = '\u{1f600}';",
    ];
    for text in scripts {
        assert_round_trip(text, LexerOptions::default());
    }

    assert_round_trip(
        "<html>\n<?php if ($a): ?>\n  <b><?= $a ?></b>\n<?php endif; ?>\n",
        LexerOptions::file(),
    );
}

/// Yields pseudo-random PHP-ish buffers from a fixed seed (xorshift64).
struct Fragments(u64);

impl Fragments {
    const ALPHABET: &[&str] = &[
        "$a", " ", "\n", "\"", "'", "{", "}", "${", "->", "<<<EOT\n", "EOT", "08",
        "9223372036854775808", "-", "?>", "<?php ", "/*", "*/", "//", "#", "\\", "(int)", ";",
        "(", ")", "[", "]", "`", "\r\n", "é", "::", "class", "x",
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
    let mut fragments = Fragments(0x9e37_79b9_7f4a_7c15);
    for _ in 0..2000 {
        let text = fragments.text();
        assert_round_trip(&text, LexerOptions::default());
        assert_round_trip(&text, LexerOptions::file());
    }
}

#[test]
fn checkpoint_and_restore() {
    let mut lexer = Lexer::new("$a + $b", LexerOptions::default());
    assert_eq!(lexer.next_token().kind(), VARIABLE);

    let checkpoint = lexer.checkpoint();
    assert_eq!(lexer.next_token().kind(), PLUS);
    assert_eq!(lexer.next_token().kind(), VARIABLE);

    lexer.restore(checkpoint);
    let plus = lexer.next_token();
    assert_eq!(plus.kind(), PLUS);
    assert_eq!(plus.range(), TextRange::at(3.into(), 1.into()));
}

#[test]
fn restore_does_not_report_twice() {
    let mut calls = 0;
    {
        let mut lexer = Lexer::new("$a 08 $b 09", LexerOptions::default())
            .with_error_handler(|_| calls += 1);
        lexer.next_token();
        let checkpoint = lexer.checkpoint();
        assert_eq!(lexer.next_token().kind(), LNUMBER);
        assert_eq!(lexer.next_token().kind(), VARIABLE);

        lexer.restore(checkpoint);
        assert_eq!(lexer.next_token().kind(), LNUMBER);
        assert_eq!(lexer.diagnostics().len(), 1);
        lexer.next_token();
        lexer.next_token();
        assert_eq!(lexer.diagnostics().len(), 2);
    }
    assert_eq!(calls, 2);
}

#[test]
fn lex_from_position() {
    let text = "$a + 1";

    let (token, next) = lex(text, LexerCheckpoint::start(LexerOptions::default()));
    assert_eq!((token.kind(), next.offset()), (VARIABLE, 3.into()));

    let (token, next) = lex(text, next);
    assert_eq!((token.kind(), next.offset()), (PLUS, 5.into()));

    let (token, next) = lex(text, next);
    assert_eq!(token.value(), Some(&LiteralValue::Integer(1)));
    assert_eq!(lex(text, next).0.kind(), EOF);
}

#[test]
fn lex_loop_matches_tokenize() {
    let cases = [
        ("$x = \"a {$b->c} ${d} $e[0]\";", LexerOptions::default()),
        ("<<<EOT\n  a $b\n  EOT;\n", LexerOptions::default()),
        ("-9223372036854775808 - 9223372036854775808", LexerOptions::default()),
        ("<p><?= `ls $d` ?></p>", LexerOptions::file()),
    ];
    for (text, options) in cases {
        let mut lexed = Vec::new();
        let mut position = LexerCheckpoint::start(options);
        loop {
            let (token, next) = lex(text, position);
            position = next;
            let kind = token.kind();
            lexed.push(token);
            if kind == EOF {
                break;
            }
        }
        assert_eq!(lexed, tokens_with(text, options), "{text:?}");
    }
}
