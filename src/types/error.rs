use thiserror::Error;

/// A rule parsed but is not fit to be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown identifier '{identifier}' in rule '{rule}'")]
    UnknownIdentifier { rule: String, identifier: String },

    #[error("rule '{rule}' has no selectors")]
    NoSelectors { rule: String },

    #[error("duplicate rule name '{name}'")]
    DuplicateRule { name: String },
}

/// A fault raised while evaluating an expression.
///
/// Distinct from an assertion evaluating to `false`: it means the rule asks
/// for something the evaluator cannot compute, not that the node is
/// non-compliant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("type error: {0}")]
    Type(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid regex pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("relation nesting exceeds the depth limit of {limit}")]
    DepthExceeded { limit: usize },
}
