//! Literal value computation: integers, escape sequences and heredoc bodies.

use polar_errors::LexicalError;

pub(crate) fn is_label_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

pub(crate) fn is_label_char(c: char) -> bool {
    is_label_start(c) || c.is_ascii_digit()
}

fn is_label_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// Value of an integer literal, before the unary minus is taken into account.
#[derive(Debug, PartialEq)]
pub(crate) enum IntegerValue {
    Integer(i64),
    /// A magnitude of exactly 2^63, which is `i64::MIN` once negated.
    Boundary,
    Double(f64),
    /// A digit outside the radix, e.g. `8` in an octal literal.
    Invalid,
}

/// Evaluates `digits` (without a base prefix, `_` separators allowed).
pub(crate) fn integer_value(digits: &str, radix: u32) -> IntegerValue {
    let mut magnitude = Some(0u64);
    for c in digits.chars().filter(|&c| c != '_') {
        let Some(digit) = c.to_digit(radix) else {
            return IntegerValue::Invalid;
        };
        magnitude = magnitude
            .and_then(|m| m.checked_mul(u64::from(radix)))
            .and_then(|m| m.checked_add(u64::from(digit)));
    }

    match magnitude {
        Some(m) => match i64::try_from(m) {
            Ok(value) => IntegerValue::Integer(value),
            Err(_) if m == 1 << 63 => IntegerValue::Boundary,
            Err(_) => IntegerValue::Double(overflowed(digits, radix)),
        },
        None => IntegerValue::Double(overflowed(digits, radix)),
    }
}

fn overflowed(digits: &str, radix: u32) -> f64 {
    let digits = digits.chars().filter(|&c| c != '_');
    if radix == 10 {
        return digits.collect::<String>().parse().unwrap_or(f64::INFINITY);
    }
    digits.filter_map(|c| c.to_digit(radix)).fold(0.0, |acc, digit| {
        acc * f64::from(radix) + f64::from(digit)
    })
}

pub(crate) fn double_value(text: &str) -> Option<f64> {
    text.chars().filter(|&c| c != '_').collect::<String>().parse().ok()
}

/// Single-quoted strings only know `\\` and `\'`.
pub(crate) fn unescape_single(text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match (bytes[i], bytes.get(i + 1)) {
            (b'\\', Some(&next @ (b'\\' | b'\''))) => {
                out.push(next);
                i += 2;
            }
            (b, _) => {
                out.push(b);
                i += 1;
            }
        }
    }
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Quote {
    Double,
    Backtick,
    Heredoc,
}

/// Resolves escape sequences of double-quoted, backtick and heredoc bodies.
///
/// Unknown sequences are kept verbatim. Malformed `\u{..}` escapes are kept
/// verbatim as well and reported through `errors`.
pub(crate) fn unescape(text: &str, quote: Quote, errors: &mut Vec<LexicalError>) -> Vec<u8> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 == bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let simple = match bytes[i + 1] {
            b'n' => Some(b'\n'),
            b't' => Some(b'\t'),
            b'r' => Some(b'\r'),
            b'v' => Some(0x0b),
            b'e' => Some(0x1b),
            b'f' => Some(0x0c),
            b'\\' => Some(b'\\'),
            b'$' => Some(b'$'),
            b'"' if quote == Quote::Double => Some(b'"'),
            b'`' if quote == Quote::Backtick => Some(b'`'),
            _ => None,
        };
        if let Some(byte) = simple {
            out.push(byte);
            i += 2;
            continue;
        }

        match bytes[i + 1] {
            b'0'..=b'7' => {
                let digits = digit_run(&bytes[i + 1..], 3, |b| matches!(b, b'0'..=b'7'));
                let value = bytes[i + 1..i + 1 + digits]
                    .iter()
                    .fold(0u32, |acc, &b| acc * 8 + u32::from(b - b'0'));
                out.push(value as u8);
                i += 1 + digits;
            }
            b'x' if bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit) => {
                let digits = digit_run(&bytes[i + 2..], 2, |b| b.is_ascii_hexdigit());
                let value = bytes[i + 2..i + 2 + digits]
                    .iter()
                    .fold(0u32, |acc, &b| acc * 16 + hex_digit(b));
                out.push(value as u8);
                i += 2 + digits;
            }
            b'u' if bytes.get(i + 2) == Some(&b'{') => {
                match unicode_escape(&bytes[i + 3..]) {
                    Ok((code_point, len)) => {
                        push_code_point(&mut out, code_point);
                        i += 3 + len;
                    }
                    Err(error) => {
                        errors.push(error);
                        out.extend_from_slice(b"\\u");
                        i += 2;
                    }
                }
            }
            _ => {
                out.push(b'\\');
                i += 1;
            }
        }
    }

    out
}

fn digit_run(bytes: &[u8], max: usize, is_digit: impl Fn(u8) -> bool) -> usize {
    bytes.iter().take(max).take_while(|&&b| is_digit(b)).count()
}

fn hex_digit(b: u8) -> u32 {
    char::from(b).to_digit(16).unwrap_or(0)
}

/// Parses `hex}` after `\u{`, returning the code point and the consumed length.
fn unicode_escape(bytes: &[u8]) -> Result<(u32, usize), LexicalError> {
    let digits = bytes.iter().take_while(|b| b.is_ascii_hexdigit()).count();
    if digits == 0 || bytes.get(digits) != Some(&b'}') {
        return Err(LexicalError::InvalidUnicodeEscape);
    }

    let code_point = bytes[..digits]
        .iter()
        .try_fold(0u32, |acc, &b| acc.checked_mul(16).map(|acc| acc + hex_digit(b)));
    match code_point {
        Some(code_point) if code_point <= 0x10ffff => Ok((code_point, digits + 1)),
        _ => Err(LexicalError::UnicodeEscapeTooLarge),
    }
}

/// UTF-8 encoding that also accepts surrogate code points.
fn push_code_point(out: &mut Vec<u8>, cp: u32) {
    match cp {
        0..=0x7f => out.push(cp as u8),
        0x80..=0x7ff => out.extend([0xc0 | (cp >> 6) as u8, 0x80 | (cp & 0x3f) as u8]),
        0x800..=0xffff => out.extend([
            0xe0 | (cp >> 12) as u8,
            0x80 | ((cp >> 6) & 0x3f) as u8,
            0x80 | (cp & 0x3f) as u8,
        ]),
        _ => out.extend([
            0xf0 | (cp >> 18) as u8,
            0x80 | ((cp >> 12) & 0x3f) as u8,
            0x80 | ((cp >> 6) & 0x3f) as u8,
            0x80 | (cp & 0x3f) as u8,
        ]),
    }
}

pub(crate) struct HeredocHeader<'a> {
    /// Length of the header after `<<<`, including the newline.
    pub(crate) len: usize,
    pub(crate) label: &'a str,
    pub(crate) nowdoc: bool,
}

/// Parses `[ \t]*("LABEL"|'LABEL'|LABEL)\n` following `<<<`.
pub(crate) fn heredoc_header(s: &str) -> Option<HeredocHeader<'_>> {
    let bytes = s.as_bytes();
    let mut i = bytes.iter().take_while(|b| matches!(b, b' ' | b'\t')).count();

    let quote = match bytes.get(i) {
        Some(&quote @ (b'"' | b'\'')) => {
            i += 1;
            Some(quote)
        }
        _ => None,
    };

    let label_start = i;
    if !bytes.get(i).is_some_and(|&b| is_label_byte(b) && !b.is_ascii_digit()) {
        return None;
    }
    while bytes.get(i).is_some_and(|&b| is_label_byte(b)) {
        i += 1;
    }
    let label = &s[label_start..i];

    if let Some(quote) = quote {
        if bytes.get(i) != Some(&quote) {
            return None;
        }
        i += 1;
    }

    match bytes.get(i) {
        Some(b'\n') => i += 1,
        Some(b'\r') if bytes.get(i + 1) == Some(&b'\n') => i += 2,
        Some(b'\r') => i += 1,
        _ => return None,
    }

    Some(HeredocHeader { len: i, label, nowdoc: quote == Some(b'\'') })
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Indentation {
    pub(crate) width: usize,
    pub(crate) uses_tabs: bool,
}

pub(crate) struct HeredocClosing {
    /// Offset of the closing line relative to the body start.
    pub(crate) offset: usize,
    pub(crate) indentation: Indentation,
    pub(crate) mixed: bool,
}

/// Finds the first line of `body` made of optional indentation and `label`.
pub(crate) fn find_heredoc_closing(body: &str, label: &str) -> Option<HeredocClosing> {
    let mut line_start = 0;
    loop {
        let line = &body[line_start..];
        let width = line.bytes().take_while(|b| matches!(b, b' ' | b'\t')).count();
        let after = &line[width..];
        if after.starts_with(label)
            && !after.as_bytes().get(label.len()).is_some_and(|&b| is_label_byte(b))
        {
            let whitespace = &line[..width];
            return Some(HeredocClosing {
                offset: line_start,
                indentation: Indentation { width, uses_tabs: whitespace.starts_with('\t') },
                mixed: whitespace.contains(' ') && whitespace.contains('\t'),
            });
        }

        let newline = line.find(['\n', '\r'])?;
        line_start += newline + newline_len(&line[newline..]);
    }
}

fn newline_len(s: &str) -> usize {
    if s.starts_with("\r\n") { 2 } else { 1 }
}

/// Removes a trailing `\n`, `\r\n` or `\r`.
pub(crate) fn trim_final_newline(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .or_else(|| text.strip_suffix('\r'))
        .unwrap_or(text)
}

/// Strips the closing-label indentation from every line of a heredoc body
/// fragment. The first line is left alone unless `at_line_start`.
pub(crate) fn strip_indentation(
    text: &str,
    indentation: Indentation,
    at_line_start: bool,
    errors: &mut Vec<LexicalError>,
) -> String {
    if indentation.width == 0 {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut line_start = at_line_start;

    while !rest.is_empty() {
        if line_start {
            let width = rest
                .bytes()
                .take(indentation.width)
                .take_while(|b| matches!(b, b' ' | b'\t'))
                .count();
            let whitespace = &rest[..width];
            rest = &rest[width..];

            if whitespace.bytes().any(|b| (b == b'\t') != indentation.uses_tabs) {
                push_once(errors, LexicalError::MixedHeredocIndentation);
            }
            if width < indentation.width && !rest.is_empty() && !rest.starts_with(['\n', '\r']) {
                push_once(
                    errors,
                    LexicalError::InvalidHeredocBodyIndentation { expected: indentation.width },
                );
            }
        }

        let line_len = match rest.find(['\n', '\r']) {
            Some(newline) => newline + newline_len(&rest[newline..]),
            None => rest.len(),
        };
        out.push_str(&rest[..line_len]);
        rest = &rest[line_len..];
        line_start = true;
    }

    out
}

fn push_once(errors: &mut Vec<LexicalError>, error: LexicalError) {
    if !errors.contains(&error) {
        errors.push(error);
    }
}
