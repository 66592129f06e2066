//! Rule-language parser.
//!
//! Scannerless: [`token`] holds the lexical parsers (whitespace, comments,
//! identifiers, literals) and [`grammar`] the rule and expression
//! productions built on them.

mod error;
mod grammar;
mod token;

use winnow::error::ContextError;
use winnow::Parser;

pub use error::ParseError;

use crate::Rule;

/// Deepest parenthesis nesting accepted in rule source. Aggregation bodies
/// and `prop(..)` count as one level each.
pub const MAX_NESTING: usize = 128;

/// Parse exactly one rule, optionally surrounded by whitespace and comments.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a single well-formed rule,
/// including when a literal `matches` pattern is not a valid regex.
pub fn parse(source: &str) -> Result<Rule, ParseError> {
    check_nesting(source)?;
    grammar::single_rule
        .parse(source)
        .map_err(|e| convert(source, &e))
}

/// Parse zero or more rules from one source text.
///
/// # Errors
///
/// Returns [`ParseError`] at the first malformed rule.
pub fn parse_rules(source: &str) -> Result<Vec<Rule>, ParseError> {
    check_nesting(source)?;
    grammar::rule_list
        .parse(source)
        .map_err(|e| convert(source, &e))
}

fn check_nesting(source: &str) -> Result<(), ParseError> {
    match token::nesting_overflow(source, MAX_NESTING) {
        Some(offset) => Err(ParseError::new(
            format!("expressions nest deeper than {MAX_NESTING} levels"),
            source,
            offset,
        )),
        None => Ok(()),
    }
}

fn convert(source: &str, err: &winnow::error::ParseError<&str, ContextError>) -> ParseError {
    let message = err.inner().to_string();
    let message = if message.is_empty() {
        "unexpected input".to_owned()
    } else {
        message
    };
    ParseError::new(message, source, err.offset())
}
