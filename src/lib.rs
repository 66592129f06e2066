//! A tree-aware rule language for auditing UI widget trees for
//! accessibility.
//!
//! Rules are parsed from text, validated against a [`Schema`] of known
//! property names, and evaluated against any node type implementing
//! [`Context`]:
//!
//! ```
//! use a11yql::{parse, validate, Interpreter, KindMap, Schema, WidgetNode, WidgetTree};
//!
//! let rule = parse(r#"
//!     rule "icon_button_label" on type(IconButton) {
//!         meta { severity: "error" }
//!         when: enabled
//!         ensure: prop("tooltip").is_resolved || label ~= "close"
//!         report: "Icon buttons need a tooltip"
//!     }
//! "#).unwrap();
//! validate(&rule, &Schema::new().with("tooltip").with("label")).unwrap();
//!
//! let tree = WidgetTree::new(WidgetNode::new("button", "IconButton").focusable(true));
//! let interpreter = Interpreter::new(KindMap::default());
//! assert_eq!(interpreter.evaluate(&rule, &tree.root()), Ok(false));
//! ```

mod error;
mod evaluate;
pub mod parse;
mod types;
mod validate;

pub use error::Error;
pub use evaluate::{evaluate, Interpreter};
pub use parse::{parse, parse_rules, ParseError};
pub use types::{
    ident, literal, prop, prop_as, AuditReport, BinaryOp, BoolState, CastType, Context, Expr,
    Fault, KindMap, NodeRef, Pattern, PropAccess, Quantifier, Rejection, Relation, Rule, RuleSet,
    RuleSetBuilder, RuntimeError, Schema, Selector, UnaryOp, ValidationError, Value, Violation,
    WidgetNode, WidgetTree,
};
pub use validate::validate;
