use std::fmt;
use std::ops::Not;

use super::pattern::Pattern;
use super::Value;

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `!x`: true unless `x` is exactly `true`.
    Not,
    /// `-x`: numeric negation.
    Neg,
}

/// Infix operators, listed loosest-binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    /// `==`: value equality, with `Int` and `Float` compared numerically and
    /// no string-to-number coercion. When the values differ and at least one
    /// side is a `Bool`, both sides are compared as `as bool` casts (both
    /// must cast to non-null). Without a `Bool` operand there is no
    /// fallback, so `2 == 1` is false.
    Eq,
    /// `!=`: the negation of `==`.
    Neq,
    /// `~=`: trimmed, case-insensitive string equality.
    LooseEq,
    Contains,
    Matches,
    Lt,
    Lte,
    Gt,
    Gte,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::LooseEq => "~=",
            BinaryOp::Contains => "contains",
            BinaryOp::Matches => "matches",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

/// Named traversals from the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Children,
    Ancestors,
    Siblings,
    NextFocus,
    PrevFocus,
}

impl Relation {
    pub const ALL: [Relation; 5] = [
        Relation::Children,
        Relation::Ancestors,
        Relation::Siblings,
        Relation::NextFocus,
        Relation::PrevFocus,
    ];

    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Relation::Children => "children",
            Relation::Ancestors => "ancestors",
            Relation::Siblings => "siblings",
            Relation::NextFocus => "next_focus",
            Relation::PrevFocus => "prev_focus",
        }
    }

    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.keyword() == word)
    }
}

/// Quantifier applied to every node of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Any,
    All,
    None,
}

impl Quantifier {
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Quantifier::Any => "any",
            Quantifier::All => "all",
            Quantifier::None => "none",
        }
    }
}

/// The fixed vocabulary of boolean node states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolState {
    Focusable,
    Enabled,
    Hidden,
    Checked,
    Toggled,
    MergesDescendants,
    HasTap,
    HasLongPress,
    IsEmpty,
    IsNotEmpty,
}

impl BoolState {
    pub const ALL: [BoolState; 10] = [
        BoolState::Focusable,
        BoolState::Enabled,
        BoolState::Hidden,
        BoolState::Checked,
        BoolState::Toggled,
        BoolState::MergesDescendants,
        BoolState::HasTap,
        BoolState::HasLongPress,
        BoolState::IsEmpty,
        BoolState::IsNotEmpty,
    ];

    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            BoolState::Focusable => "focusable",
            BoolState::Enabled => "enabled",
            BoolState::Hidden => "hidden",
            BoolState::Checked => "checked",
            BoolState::Toggled => "toggled",
            BoolState::MergesDescendants => "merges_descendants",
            BoolState::HasTap => "has_tap",
            BoolState::HasLongPress => "has_long_press",
            BoolState::IsEmpty => "is_empty",
            BoolState::IsNotEmpty => "is_not_empty",
        }
    }

    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.keyword() == word)
    }
}

/// Target type of an `as` cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastType {
    Int,
    String,
    Bool,
}

impl CastType {
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            CastType::Int => "int",
            CastType::String => "string",
            CastType::Bool => "bool",
        }
    }
}

/// How a `prop("name")` access is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropAccess {
    /// The raw property value, `Null` when unresolved.
    Raw,
    /// `prop("name") as <type>`.
    Cast(CastType),
    /// `prop("name").is_resolved`: presence, independent of the value.
    IsResolved,
}

/// Expression AST produced by the parser and walked by the interpreter.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    State(BoolState),
    Prop {
        name: String,
        access: PropAccess,
    },
    /// A bare name: `role`, `widgetType`/`type`, or a dynamic property.
    Ident(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    /// `left matches "<literal>"`, with the pattern compiled at parse time.
    RegexMatch(Box<Expr>, Pattern),
    Aggregate {
        relation: Relation,
        quantifier: Quantifier,
        body: Box<Expr>,
    },
    Length(Relation),
}

impl Expr {
    #[must_use]
    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
        Expr::Binary(Box::new(left), op, Box::new(right))
    }

    #[must_use]
    pub fn and(self, other: Expr) -> Expr {
        Expr::binary(self, BinaryOp::And, other)
    }

    #[must_use]
    pub fn or(self, other: Expr) -> Expr {
        Expr::binary(self, BinaryOp::Or, other)
    }

    #[must_use]
    pub fn equals(self, other: impl Into<Value>) -> Expr {
        Expr::binary(self, BinaryOp::Eq, Expr::Literal(other.into()))
    }

    #[must_use]
    pub fn gt(self, other: impl Into<Value>) -> Expr {
        Expr::binary(self, BinaryOp::Gt, Expr::Literal(other.into()))
    }

    #[must_use]
    pub fn lt(self, other: impl Into<Value>) -> Expr {
        Expr::binary(self, BinaryOp::Lt, Expr::Literal(other.into()))
    }

    /// Wrap in `<relation>.<quantifier>(self)`.
    #[must_use]
    pub fn over(self, relation: Relation, quantifier: Quantifier) -> Expr {
        Expr::Aggregate {
            relation,
            quantifier,
            body: Box::new(self),
        }
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Unary(UnaryOp::Not, Box::new(self))
    }
}

#[must_use]
pub fn prop(name: &str) -> Expr {
    Expr::Prop {
        name: name.to_owned(),
        access: PropAccess::Raw,
    }
}

#[must_use]
pub fn prop_as(name: &str, cast: CastType) -> Expr {
    Expr::Prop {
        name: name.to_owned(),
        access: PropAccess::Cast(cast),
    }
}

#[must_use]
pub fn ident(name: &str) -> Expr {
    Expr::Ident(name.to_owned())
}

#[must_use]
pub fn literal(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

pub(crate) fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in text.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

/// Plain decimal with at least one fractional digit, the only float form the
/// lexer reads back. `f64`'s `Display` never switches to exponent notation.
fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    let text = v.to_string();
    if v.is_finite() && !text.contains('.') {
        write!(f, "{text}.0")
    } else {
        f.write_str(&text)
    }
}

/// Renders rule-language source. Compound expressions are fully
/// parenthesized, so the output re-parses to the same tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(Value::String(s)) => write_quoted(f, s),
            Expr::Literal(Value::Float(v)) => write_float(f, *v),
            Expr::Literal(v) => write!(f, "{v}"),
            Expr::State(state) => f.write_str(state.keyword()),
            Expr::Prop { name, access } => {
                f.write_str("prop(")?;
                write_quoted(f, name)?;
                f.write_str(")")?;
                match access {
                    PropAccess::Raw => Ok(()),
                    PropAccess::Cast(cast) => write!(f, " as {}", cast.keyword()),
                    PropAccess::IsResolved => f.write_str(".is_resolved"),
                }
            }
            Expr::Ident(name) => f.write_str(name),
            Expr::Unary(UnaryOp::Not, inner) => write!(f, "(!{inner})"),
            Expr::Unary(UnaryOp::Neg, inner) => write!(f, "(-{inner})"),
            Expr::Binary(a, op, b) => write!(f, "({a} {} {b})", op.symbol()),
            Expr::RegexMatch(a, pattern) => {
                write!(f, "({a} matches ")?;
                write_quoted(f, pattern.as_str())?;
                f.write_str(")")
            }
            Expr::Aggregate {
                relation,
                quantifier,
                body,
            } => write!(f, "{}.{}({body})", relation.keyword(), quantifier.keyword()),
            Expr::Length(relation) => write!(f, "{}.length", relation.keyword()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prop_eq_literal() {
        let expr = prop("label").equals("OK");
        assert_eq!(
            expr,
            Expr::Binary(
                Box::new(Expr::Prop {
                    name: "label".to_owned(),
                    access: PropAccess::Raw,
                }),
                BinaryOp::Eq,
                Box::new(Expr::Literal(Value::String("OK".to_owned()))),
            )
        );
    }

    #[test]
    fn and_chaining_is_left_associative() {
        let expr = ident("a").and(ident("b")).and(ident("c"));
        match &expr {
            Expr::Binary(left, BinaryOp::And, right) => {
                assert_eq!(**right, ident("c"));
                assert!(matches!(left.as_ref(), Expr::Binary(_, BinaryOp::And, _)));
            }
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn not_wraps_in_unary() {
        let expr = !Expr::State(BoolState::Hidden);
        assert!(matches!(expr, Expr::Unary(UnaryOp::Not, _)));
    }

    #[test]
    fn keywords_round_trip() {
        for state in BoolState::ALL {
            assert_eq!(BoolState::from_keyword(state.keyword()), Some(state));
        }
        for relation in Relation::ALL {
            assert_eq!(Relation::from_keyword(relation.keyword()), Some(relation));
        }
        assert_eq!(Relation::from_keyword("parent"), None);
        assert_eq!(BoolState::from_keyword("visible"), None);
    }

    #[test]
    fn display_renders_source() {
        let expr = Expr::State(BoolState::Focusable)
            .over(Relation::Children, Quantifier::Any)
            .and(prop_as("size", CastType::Int).gt(2_i64));
        assert_eq!(
            expr.to_string(),
            r#"(children.any(focusable) && (prop("size") as int > 2))"#
        );
    }

    #[test]
    fn display_escapes_strings() {
        let expr = literal("say \"hi\"\n\\d");
        assert_eq!(expr.to_string(), r#""say \"hi\"\n\\d""#);
        assert_eq!(literal(2.0_f64).to_string(), "2.0");
    }

    #[test]
    fn display_floats_without_exponent() {
        assert_eq!(literal(0.000_000_1_f64).to_string(), "0.0000001");
        assert_eq!(literal(1e20_f64).to_string(), "100000000000000000000.0");
        assert_eq!(literal(0.25_f64).to_string(), "0.25");
    }
}
