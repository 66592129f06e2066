use std::fmt;

use regex::{Regex, RegexBuilder};

const CASE_INSENSITIVE_PREFIX: &str = "(?i)";

/// A compiled regular expression together with the source it was built from.
///
/// A leading `(?i)` is stripped and the rest compiled case-insensitively.
/// Matching is a search: the pattern must anchor with `^`/`$` to match the
/// whole input.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] if the pattern is not a valid regular expression.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = match source.strip_prefix(CASE_INSENSITIVE_PREFIX) {
            Some(rest) => RegexBuilder::new(rest).case_insensitive(true).build()?,
            None => Regex::new(source)?,
        };
        Ok(Self {
            source: source.to_owned(),
            regex,
        })
    }

    /// The pattern text as written, including any `(?i)` prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
