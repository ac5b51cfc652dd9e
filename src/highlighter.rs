// ABOUTME: REPL editor helper: bracket-aware highlighting and multi-line input

use rustyline::highlight::MatchingBracketHighlighter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline_derive::{Completer, Helper, Highlighter, Hinter};

/// rustyline helper for the REPL: matching-bracket highlighting plus a
/// validator that keeps reading while delimiters are unbalanced, so forms
/// can span lines.
#[derive(Completer, Helper, Highlighter, Hinter, Default)]
pub struct LispHelper {
    #[rustyline(Highlighter)]
    highlighter: MatchingBracketHighlighter,
}

impl LispHelper {
    pub fn new() -> Self {
        LispHelper::default()
    }
}

impl Validator for LispHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(validate_brackets(ctx.input()))
    }
}

/// Incomplete while any delimiter or string is open; unbalanced closers are
/// left for the parser to report with a position.
fn validate_brackets(input: &str) -> ValidationResult {
    let mut stack = Vec::new();
    let mut chars = input.chars();
    let mut in_string = false;
    let mut in_comment = false;

    while let Some(c) = chars.next() {
        if in_comment {
            if c == '\n' {
                in_comment = false;
            }
            continue;
        }
        if in_string {
            match c {
                '\\' => {
                    chars.next();
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            ';' => in_comment = true,
            '(' | '[' | '{' => stack.push(c),
            ')' | ']' | '}' => {
                stack.pop();
            }
            _ => {}
        }
    }

    if in_string || !stack.is_empty() {
        ValidationResult::Incomplete
    } else {
        ValidationResult::Valid(None)
    }
}
