// ABOUTME: nom-based recursive-descent parser for TGTL's bracket/brace syntax.

use std::rc::Rc;

use nom::branch::alt;
use nom::{Err as NomErr, IResult, Parser};

use crate::error::TgtlError;
use crate::value::{BlockNode, CommandNode, Value};

/// A parse failure, carrying the remaining input at the point of failure and
/// an optional message. `Err::Error` means "this alternative did not match,
/// try the next one"; `Err::Failure` means "this alternative started to
/// match but the input is malformed", and aborts the surrounding `alt`.
#[derive(Debug, Clone)]
pub struct ParseErr<'a> {
    pub input: &'a str,
    pub message: Option<String>,
}

impl<'a> ParseErr<'a> {
    fn at(input: &'a str) -> Self {
        ParseErr {
            input,
            message: None,
        }
    }
}

impl<'a> nom::error::ParseError<&'a str> for ParseErr<'a> {
    fn from_error_kind(input: &'a str, _kind: nom::error::ErrorKind) -> Self {
        ParseErr::at(input)
    }

    fn append(_input: &'a str, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

pub type PResult<'a, T> = IResult<&'a str, T, ParseErr<'a>>;

fn not_applicable<'a, T>(input: &'a str) -> PResult<'a, T> {
    Err(NomErr::Error(ParseErr::at(input)))
}

fn fail<'a, T>(input: &'a str, message: &str) -> PResult<'a, T> {
    Err(NomErr::Failure(ParseErr {
        input,
        message: Some(message.to_string()),
    }))
}

/// A letter for TGTL's purposes is an ASCII letter, any code point past the
/// ASCII range, an underscore, or a slash - matching both the first and
/// every later character of a `Word` token.
pub fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || (c as u32) > 128 || c == '_' || c == '/'
}

pub fn is_number(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_ws(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_rs_char(c: char) -> bool {
    c == '\n' || c == '\r' || c == ';'
}

fn skip_ws(input: &str) -> &str {
    input.trim_start_matches(is_ws)
}

fn skip_rs(input: &str) -> &str {
    skip_ws(input).trim_start_matches(is_rs_char)
}

fn skip_ws_rs(input: &str) -> &str {
    input.trim_start_matches(|c| is_ws(c) || is_rs_char(c))
}

fn parse_comment(input: &str) -> PResult<Value> {
    if !input.starts_with('#') {
        return not_applicable(input);
    }
    match input.find(['\n', '\r']) {
        Some(idx) => Ok((&input[idx..], Value::Comment(Rc::from(&input[..idx])))),
        None => fail(input, "unexpected EOF in comment"),
    }
}

fn parse_word(input: &str) -> PResult<Value> {
    let mut chars = input.char_indices();
    match chars.next() {
        Some((_, c)) if is_letter(c) => {}
        _ => return not_applicable(input),
    }
    for (idx, c) in chars {
        if !(is_letter(c) || is_number(c)) {
            return Ok((&input[idx..], Value::word(&input[..idx])));
        }
    }
    fail(input, "unexpected EOF in string")
}

fn parse_escape(input: &str) -> PResult<char> {
    let rest = match input.strip_prefix('\\') {
        Some(r) => r,
        None => return not_applicable(input),
    };
    let c = match rest.chars().next() {
        Some(c) => c,
        None => return fail(rest, "Unexpected end of input."),
    };
    let resolved = match c {
        'a' => '\u{07}',
        'b' => '\u{08}',
        'e' => '\u{1B}',
        'f' => '\u{0C}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        '\\' => '\\',
        '"' => '"',
        _ => return fail(rest, "Unknown escape sequence character"),
    };
    Ok((&rest[c.len_utf8()..], resolved))
}

fn parse_string(input: &str) -> PResult<Value> {
    let mut rest = match input.strip_prefix('"') {
        Some(r) => r,
        None => return not_applicable(input),
    };
    let mut out = String::new();
    loop {
        let c = match rest.chars().next() {
            Some(c) => c,
            None => return fail(rest, "Unexpected end of input."),
        };
        if c == '\\' {
            let (next_rest, esc) = parse_escape(rest)?;
            out.push(esc);
            rest = next_rest;
        } else if c == '"' {
            return Ok((&rest[c.len_utf8()..], Value::string(out)));
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
}

fn parse_raw_string(input: &str) -> PResult<Value> {
    let mut rest = match input.strip_prefix('`') {
        Some(r) => r,
        None => return not_applicable(input),
    };
    let mut out = String::new();
    loop {
        let c = match rest.chars().next() {
            Some(c) => c,
            None => return fail(rest, "Unexpected end of input."),
        };
        rest = &rest[c.len_utf8()..];
        if c == '`' {
            return Ok((rest, Value::string(out)));
        }
        out.push(c);
    }
}

/// A lone `+`/`-` with no following digits is a parse error - a deliberate
/// deviation from the reference parser, which silently produces `Int(0)` in
/// that case.
fn parse_integer(input: &str) -> PResult<Value> {
    let mut first_chars = input.chars();
    let first = match first_chars.next() {
        Some(c) => c,
        None => return not_applicable(input),
    };
    let (neg, mut rest, has_sign) = match first {
        '-' => (-1i64, &input[1..], true),
        '+' => (1i64, &input[1..], true),
        c if c.is_ascii_digit() => (1i64, input, false),
        _ => return not_applicable(input),
    };
    let mut value: i64 = 0;
    let mut digits = 0usize;
    loop {
        match rest.chars().next() {
            None => {
                return fail(rest, "unexpected EOF in number");
            }
            Some(c) if c.is_ascii_digit() => {
                value = value * 10 + (c as i64 - '0' as i64);
                digits += 1;
                rest = &rest[1..];
            }
            Some(_) => {
                if digits == 0 && has_sign {
                    return fail(rest, "expected digits after sign");
                }
                if digits == 0 {
                    return not_applicable(rest);
                }
                return Ok((rest, Value::Int(neg * value)));
            }
        }
    }
}

/// Re-parses a value's string form as an integer, the way the `int` builtin
/// converts a `String`/`Word` into an `Int` by reusing the literal grammar
/// rather than a separate numeric parser. A trailing space is appended
/// before parsing, the way the reference `int_` appends one to its operand's
/// string form, so a bare `"42"` at true EOF doesn't trip `parse_integer`'s
/// "unterminated token" rule.
pub fn parse_integer_literal(input: &str) -> Result<i64, TgtlError> {
    let padded = format!("{input} ");
    match parse_integer(&padded) {
        Ok((rest, Value::Int(n))) if rest == " " => Ok(n),
        _ => Err(TgtlError::from_string(format!("Cannot convert \"{input}\" to Int"))),
    }
}

fn parse_literal(input: &str) -> PResult<Value> {
    alt((parse_word, parse_string, parse_integer, parse_raw_string)).parse(input)
}

fn parse_getter(input: &str) -> PResult<Value> {
    let rest = match input.strip_prefix('$') {
        Some(r) => r,
        None => return not_applicable(input),
    };
    if rest.starts_with('$') {
        let (rest, inner) = parse_getter(rest)?;
        return Ok((rest, Value::Getter(Box::new(inner))));
    }
    match parse_literal(rest) {
        Ok((rest, key)) => Ok((rest, Value::Getter(Box::new(key)))),
        Err(NomErr::Error(_)) => fail(rest, "Expected literal after getter $"),
        Err(e) => Err(e),
    }
}

fn parse_evaluation(input: &str) -> PResult<Value> {
    let rest = match input.strip_prefix('[') {
        Some(r) => r,
        None => return not_applicable(input),
    };
    let (rest, cmd) = parse_command(rest)?;
    match rest.strip_prefix(']') {
        Some(rest) => {
            let node = match cmd {
                Value::Command(node) => node,
                other => unreachable!("parse_command always returns Command, got {other:?}"),
            };
            Ok((rest, Value::Evaluation(node)))
        }
        None => fail(rest, "Expected end of evaluation ]"),
    }
}

fn parse_block(input: &str) -> PResult<Value> {
    let rest = match input.strip_prefix('{') {
        Some(r) => r,
        None => return not_applicable(input),
    };
    let (rest, statements) = parse_statements(rest)?;
    let rest = skip_ws_rs(rest);
    match rest.strip_prefix('}') {
        Some(rest) => Ok((rest, Value::Block(Rc::new(BlockNode { statements })))),
        None => fail(rest, "Expected end of block }"),
    }
}

fn parse_order(input: &str) -> PResult<Value> {
    alt((parse_literal, parse_evaluation)).parse(input)
}

fn parse_parameter(input: &str) -> PResult<Value> {
    alt((parse_literal, parse_evaluation, parse_block, parse_getter)).parse(input)
}

fn parse_parameters(input: &str) -> PResult<Vec<Value>> {
    let mut params = Vec::new();
    let mut rest = input;
    loop {
        let after_ws = skip_ws(rest);
        if after_ws.len() == rest.len() {
            return Ok((rest, params));
        }
        match parse_parameter(after_ws) {
            Ok((next_rest, val)) => {
                params.push(val);
                rest = next_rest;
            }
            Err(NomErr::Error(_)) => return Ok((after_ws, params)),
            Err(e) => return Err(e),
        }
    }
}

fn parse_command(input: &str) -> PResult<Value> {
    let (rest, order) = parse_order(input)?;
    let (rest, parameters) = parse_parameters(rest)?;
    Ok((rest, Value::Command(Rc::new(CommandNode { order, parameters }))))
}

fn parse_statement(input: &str) -> PResult<Option<Value>> {
    let input = skip_ws(input);
    match alt((parse_command, parse_block, parse_comment)).parse(input) {
        Ok((rest, v)) => Ok((rest, Some(v))),
        Err(NomErr::Error(_)) => Ok((input, None)),
        Err(e) => Err(e),
    }
}

fn parse_statements(input: &str) -> PResult<Vec<Value>> {
    let mut statements = Vec::new();
    let mut rest = input;
    loop {
        let (next_rest, stmt) = parse_statement(rest)?;
        rest = next_rest;
        if let Some(s) = stmt {
            statements.push(s);
        }
        let before_sep = rest;
        rest = skip_rs(rest);
        if rest.is_empty() {
            return Ok((rest, statements));
        }
        if rest.len() == before_sep.len() {
            return Ok((before_sep, statements));
        }
    }
}

fn byte_offset(original: &str, remaining: &str) -> i64 {
    (original.len() - remaining.len()) as i64
}

/// Parses an entire script into one top-level `Block`, matching the
/// command line runner's "whole file is one statement list" model.
pub fn parse_script(input: &str) -> Result<Value, TgtlError> {
    match parse_statements(input) {
        Ok((rest, statements)) => {
            let rest = skip_ws_rs(rest);
            if !rest.is_empty() {
                let snippet: String = rest.chars().take(40).collect();
                return Err(TgtlError::at(
                    format!("unexpected trailing input near: {snippet}"),
                    byte_offset(input, rest),
                ));
            }
            Ok(Value::Block(Rc::new(BlockNode { statements })))
        }
        Err(NomErr::Error(e)) | Err(NomErr::Failure(e)) => Err(TgtlError::at(
            e.message.unwrap_or_else(|| "parse error".to_string()),
            byte_offset(input, e.input),
        )),
        Err(NomErr::Incomplete(_)) => Err(TgtlError::from_string("incomplete input")),
    }
}

pub fn parse(input: &str) -> Result<Value, TgtlError> {
    parse_script(input)
}
