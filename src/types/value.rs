use std::fmt;

use super::expr::CastType;

/// Runtime values produced by expression evaluation and by node properties.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// An absent or unresolvable value.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
}

/// A value that has been coerced to a number for arithmetic or ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn parse(text: &str) -> Option<Number> {
        let text = text.trim();
        if let Ok(i) = text.parse::<i64>() {
            return Some(Number::Int(i));
        }
        text.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Number::Float)
    }
}

impl Value {
    /// Only `Bool(true)` counts as true for guards, assertions and logic.
    #[must_use]
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
        }
    }

    /// Numbers pass through; strings are parsed after trimming. Everything
    /// else, including booleans, does not coerce.
    pub(crate) fn to_number(&self) -> Option<Number> {
        match self {
            Value::Int(i) => Some(Number::Int(*i)),
            Value::Float(f) => Some(Number::Float(*f)),
            Value::String(s) => Number::parse(s),
            Value::Null | Value::Bool(_) => None,
        }
    }

    /// Apply an `as <type>` cast. A cast of `Null`, or one that cannot be
    /// performed, yields `Null`.
    #[must_use]
    pub fn cast(&self, to: CastType) -> Value {
        match to {
            CastType::Int => self.cast_int().map_or(Value::Null, Value::Int),
            CastType::String => match self {
                Value::Null => Value::Null,
                other => Value::String(other.to_string()),
            },
            CastType::Bool => self.cast_bool().map_or(Value::Null, Value::Bool),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn cast_int(&self) -> Option<i64> {
        let number = match self {
            Value::Bool(b) => return Some(i64::from(*b)),
            Value::Int(i) => return Some(*i),
            Value::Float(f) => Number::Float(*f),
            Value::String(s) => Number::parse(s)?,
            Value::Null => return None,
        };
        match number {
            Number::Int(i) => Some(i),
            Number::Float(f) => {
                let t = f.trunc();
                (t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64).then_some(t as i64)
            }
        }
    }

    /// The `as bool` coercion, also used by the equality fallback.
    #[must_use]
    pub fn cast_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::String(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    None
                }
            }
            Value::Int(i) => Some(*i != 0),
            Value::Float(f) => Some(*f != 0.0),
            Value::Null => None,
        }
    }

    /// Language equality for `==`: value equality first (integers and floats
    /// compare numerically, strings never coerce to numbers), then a boolean
    /// fallback when at least one side is a `Bool`.
    #[must_use]
    pub fn equals(&self, other: &Value) -> bool {
        if self.strict_eq(other) {
            return true;
        }
        if !matches!(self, Value::Bool(_)) && !matches!(other, Value::Bool(_)) {
            return false;
        }
        match (self.cast_bool(), other.cast_bool()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::float_cmp)]
    fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Unquoted text form, used by `as string`, `~=`, `contains` and `matches`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
        }
    }
}
