// ABOUTME: rustyline Helper impl - tab completion and syntax highlighting for the REPL.

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::env::Environment;

const COLOR_RESET: &str = "\x1b[0m";
const COLOR_BRACKET: &str = "\x1b[1;34m";
const COLOR_WORD: &str = "\x1b[36m";
const COLOR_NUMBER: &str = "\x1b[33m";
const COLOR_STRING: &str = "\x1b[32m";
const COLOR_GETTER: &str = "\x1b[1;33m";
const COLOR_COMMENT: &str = "\x1b[90m";

/// Feeds completion requests to `Environment::complete` and colorizes the
/// REPL's input line, mirroring the reference implementation's
/// `WordCompleter`.
pub struct TgtlHelper {
    env: Rc<RefCell<Environment>>,
}

impl TgtlHelper {
    pub fn new(env: Rc<RefCell<Environment>>) -> Self {
        TgtlHelper { env }
    }
}

impl Helper for TgtlHelper {}

impl Completer for TgtlHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = word_start(line, pos);
        let prefix = &line[start..pos];
        let matches = self
            .env
            .borrow()
            .complete(prefix)
            .into_iter()
            .map(|m| Pair {
                display: m.clone(),
                replacement: m,
            })
            .collect();
        Ok((start, matches))
    }
}

fn word_start(line: &str, pos: usize) -> usize {
    line[..pos]
        .rfind(|c: char| c.is_whitespace() || "{}[]$".contains(c))
        .map(|idx| idx + 1)
        .unwrap_or(0)
}

impl Hinter for TgtlHelper {
    type Hint = String;
}

impl Validator for TgtlHelper {}

impl Highlighter for TgtlHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let highlighted = highlight_line(line);
        if highlighted == line {
            Cow::Borrowed(line)
        } else {
            Cow::Owned(highlighted)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn highlight_line(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '#' => {
                out.push_str(COLOR_COMMENT);
                while i < chars.len() && chars[i] != '\n' {
                    out.push(chars[i]);
                    i += 1;
                }
                out.push_str(COLOR_RESET);
            }
            '"' => {
                out.push_str(COLOR_STRING);
                out.push('"');
                i += 1;
                while i < chars.len() && chars[i] != '"' {
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        out.push(chars[i]);
                        out.push(chars[i + 1]);
                        i += 2;
                    } else {
                        out.push(chars[i]);
                        i += 1;
                    }
                }
                if i < chars.len() {
                    out.push('"');
                    i += 1;
                }
                out.push_str(COLOR_RESET);
            }
            '$' => {
                out.push_str(COLOR_GETTER);
                out.push('$');
                i += 1;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    out.push(chars[i]);
                    i += 1;
                }
                out.push_str(COLOR_RESET);
            }
            '{' | '}' | '[' | ']' => {
                out.push_str(COLOR_BRACKET);
                out.push(chars[i]);
                i += 1;
                out.push_str(COLOR_RESET);
            }
            c if c.is_ascii_digit() || ((c == '-' || c == '+') && i + 1 < chars.len() && chars[i + 1].is_ascii_digit()) => {
                let start = i;
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                out.push_str(COLOR_NUMBER);
                out.extend(&chars[start..i]);
                out.push_str(COLOR_RESET);
            }
            c if c.is_whitespace() => {
                out.push(c);
                i += 1;
            }
            _ => {
                let start = i;
                while i < chars.len()
                    && !chars[i].is_whitespace()
                    && !"{}[]$\"#".contains(chars[i])
                {
                    i += 1;
                }
                out.push_str(COLOR_WORD);
                out.extend(&chars[start..i]);
                out.push_str(COLOR_RESET);
            }
        }
    }
    out
}
