mod audit_report;
mod context;
mod error;
mod expr;
mod kind_map;
mod pattern;
mod rule;
mod ruleset;
mod schema;
mod tree;
mod value;

pub use audit_report::{AuditReport, Fault, Violation};
pub use context::Context;
pub use error::{RuntimeError, ValidationError};
pub use expr::{
    ident, literal, prop, prop_as, BinaryOp, BoolState, CastType, Expr, PropAccess, Quantifier,
    Relation, UnaryOp,
};
pub use kind_map::KindMap;
pub use pattern::Pattern;
pub use rule::{Rule, Selector};
pub use ruleset::{Rejection, RuleSet, RuleSetBuilder};
pub use schema::Schema;
pub use tree::{NodeRef, WidgetNode, WidgetTree};
pub use value::Value;

pub(crate) use value::Number;
