use thiserror::Error;

use crate::parse::ParseError;
use crate::ValidationError;

/// Load-time failure covering parsing and validation.
///
/// Returned by [`RuleSetBuilder::try_build()`](crate::RuleSetBuilder::try_build)
/// and [`RuleSet::from_source()`](crate::RuleSet::from_source), and carried by
/// each [`Rejection`](crate::Rejection).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
