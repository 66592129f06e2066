use winnow::ascii::{digit1, till_line_ending};
use winnow::combinator::{alt, cut_err, opt, repeat};
use winnow::error::{ContextError, ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_while};

use crate::Value;

// -- Whitespace & comments --------------------------------------------------

pub(super) fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_whitespace()).void(),
            ("//", till_line_ending).void(),
            ('#', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

// -- Identifiers & keywords -------------------------------------------------

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub(super) fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1, |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_ident_char),
    )
        .take()
        .parse_next(input)
}

/// A whole-word keyword: `contains` matches, `containsX` does not.
pub(super) fn keyword<'i>(
    word: &'static str,
) -> impl Parser<&'i str, &'i str, ErrMode<ContextError>> {
    ident
        .verify(move |s: &str| s == word)
        .context(StrContext::Expected(StrContextValue::StringLiteral(word)))
}

// -- Literals ---------------------------------------------------------------

/// A double-quoted string. `\n \t \r \\ \"` are unescaped; any other `\X` is
/// kept as written so regex escapes like `\d` survive.
pub(super) fn string_literal(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    cut_err(string_body)
        .context(StrContext::Label("string literal"))
        .parse_next(input)
}

fn string_body(input: &mut &str) -> ModalResult<String> {
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            '"' => return Ok(s),
            '\\' => {
                let esc = any.parse_next(input)?;
                match esc {
                    '"' => s.push('"'),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    'r' => s.push('\r'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

/// An unsigned decimal: `Int` without a fractional part, `Float` with one.
/// Literals that overflow `f64` are rejected.
pub(super) fn number_literal(input: &mut &str) -> ModalResult<Value> {
    (digit1, opt(('.', digit1)))
        .take()
        .try_map(|text: &str| {
            if text.contains('.') {
                return text.parse::<f64>().map(Value::Float);
            }
            // Integers too large for i64 degrade to floats.
            match text.parse::<i64>() {
                Ok(i) => Ok(Value::Int(i)),
                Err(_) => text.parse::<f64>().map(Value::Float),
            }
        })
        .verify(|value: &Value| !matches!(value, Value::Float(f) if !f.is_finite()))
        .context(StrContext::Label("number"))
        .parse_next(input)
}

// -- Nesting ----------------------------------------------------------------

/// Byte offset of the first `(` nested more than `limit` deep. String
/// literals and comments are skipped; unbalanced input is left to the
/// grammar.
pub(super) fn nesting_overflow(source: &str, limit: usize) -> Option<usize> {
    let mut depth = 0_usize;
    let mut chars = source.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        match c {
            '"' => {
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => {
                            chars.next();
                        }
                        '"' => break,
                        _ => {}
                    }
                }
            }
            '#' => {
                chars.by_ref().find(|&(_, c)| c == '\n');
            }
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                chars.by_ref().find(|&(_, c)| c == '\n');
            }
            '(' => {
                depth += 1;
                if depth > limit {
                    return Some(offset);
                }
            }
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}
