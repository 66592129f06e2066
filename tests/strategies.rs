#![allow(dead_code)]

use std::collections::BTreeMap;

use a11yql::{
    ident, literal, prop, BinaryOp, BoolState, CastType, Expr, Pattern, PropAccess, Quantifier,
    Relation, Rule, Selector, UnaryOp, Value, WidgetNode, WidgetTree,
};
use proptest::prelude::*;

// --- Fixed vocabulary ---
// Roles and widget types are drawn from small sets so that selectors match
// often enough to exercise the assertion phase.

pub const ROLES: &[&str] = &["button", "text", "image", "textField", "slider", "toggle"];
pub const TYPES: &[&str] = &["ElevatedButton", "IconButton", "Text", "Image", "Row", "Column"];
pub const PROPS: &[&str] = &["label", "size", "hint", "count"];
const BUILTINS: &[&str] = &["role", "widgetType", "type"];
const STRINGS: &[&str] = &["", "OK", "  Submit ", "10", "abc", "say \"hi\"", "back\\slash", "tab\tstop"];
const PATTERNS: &[&str] = &["^OK$", "(?i)submit", "\\d+", "^$", "a|b"];

/// A property value: strings (numeric and not), numbers, booleans or null.
pub fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000_i64..1000).prop_map(Value::Int),
        (-1000.0_f64..1000.0).prop_map(Value::Float),
        prop::sample::select(STRINGS).prop_map(Value::from),
    ]
}

fn arb_widget() -> impl Strategy<Value = WidgetNode> {
    (
        prop::sample::select(ROLES),
        prop::sample::select(TYPES),
        prop::collection::vec(any::<bool>(), 8),
        prop::collection::vec((prop::sample::select(PROPS), arb_value()), 0..3),
    )
        .prop_map(|(role, widget_type, flags, props)| {
            let node = WidgetNode::new(role, widget_type)
                .focusable(flags[0])
                .enabled(flags[1])
                .hidden(flags[2])
                .checked(flags[3])
                .toggled(flags[4])
                .merges_descendants(flags[5])
                .tap(flags[6])
                .long_press(flags[7]);
            props
                .into_iter()
                .fold(node, |node, (name, value)| node.set(name, value))
        })
}

/// A widget tree of bounded depth and fan-out.
pub fn arb_tree() -> impl Strategy<Value = WidgetTree> {
    arb_widget()
        .prop_recursive(3, 24, 4, |inner| {
            (arb_widget(), prop::collection::vec(inner, 0..4))
                .prop_map(|(node, children)| node.children(children))
        })
        .prop_map(WidgetTree::new)
}

fn arb_relation() -> impl Strategy<Value = Relation> {
    prop::sample::select(Relation::ALL.to_vec())
}

fn arb_quantifier() -> impl Strategy<Value = Quantifier> {
    prop::sample::select(vec![Quantifier::Any, Quantifier::All, Quantifier::None])
}

fn arb_cast() -> impl Strategy<Value = CastType> {
    prop::sample::select(vec![CastType::Int, CastType::String, CastType::Bool])
}

/// Literals in the forms the parser produces: unsigned numbers (including
/// very small and very large floats), booleans and strings.
fn arb_literal() -> impl Strategy<Value = Expr> {
    prop_oneof![
        (0_i64..100).prop_map(literal),
        (0_u32..40).prop_map(|quarters| literal(f64::from(quarters) / 4.0)),
        (1_u32..1000).prop_map(|n| literal(f64::from(n) * 1e-9)),
        (1_u32..1000).prop_map(|n| literal(f64::from(n) * 1e25)),
        (0.0_f64..1e300).prop_map(literal),
        any::<bool>().prop_map(literal),
        prop::sample::select(STRINGS).prop_map(literal),
    ]
}

fn arb_leaf_expr() -> impl Strategy<Value = Expr> {
    prop_oneof![
        arb_literal(),
        prop::sample::select(BoolState::ALL.to_vec()).prop_map(Expr::State),
        prop::sample::select(PROPS).prop_map(prop),
        (prop::sample::select(PROPS), arb_cast()).prop_map(|(name, cast)| Expr::Prop {
            name: name.to_owned(),
            access: PropAccess::Cast(cast),
        }),
        prop::sample::select(PROPS).prop_map(|name| Expr::Prop {
            name: name.to_owned(),
            access: PropAccess::IsResolved,
        }),
        prop::sample::select(PROPS).prop_map(ident),
        prop::sample::select(BUILTINS).prop_map(ident),
        arb_relation().prop_map(Expr::Length),
    ]
}

const BINARY_OPS: &[BinaryOp] = &[
    BinaryOp::Or,
    BinaryOp::And,
    BinaryOp::Eq,
    BinaryOp::Neq,
    BinaryOp::LooseEq,
    BinaryOp::Contains,
    BinaryOp::Lt,
    BinaryOp::Lte,
    BinaryOp::Gt,
    BinaryOp::Gte,
    BinaryOp::Add,
    BinaryOp::Sub,
    BinaryOp::Mul,
    BinaryOp::Div,
];

/// An expression tree of bounded depth covering every AST variant.
///
/// `matches` appears either with a precompiled pattern or with a property on
/// the right, never with a string literal on the right of a `Binary`, which
/// the parser always turns into a `RegexMatch`.
pub fn arb_expr() -> impl Strategy<Value = Expr> {
    arb_leaf_expr().prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), prop::sample::select(BINARY_OPS), inner.clone())
                .prop_map(|(a, op, b)| Expr::binary(a, op, b)),
            inner.clone().prop_map(|e| !e),
            inner
                .clone()
                .prop_map(|e| Expr::Unary(UnaryOp::Neg, Box::new(e))),
            (inner.clone(), prop::sample::select(PATTERNS)).prop_map(|(e, source)| {
                let pattern = Pattern::new(source).expect("fixed patterns are valid");
                Expr::RegexMatch(Box::new(e), pattern)
            }),
            (inner.clone(), prop::sample::select(PROPS))
                .prop_map(|(e, name)| Expr::binary(e, BinaryOp::Matches, prop(name))),
            (arb_relation(), arb_quantifier(), inner)
                .prop_map(|(relation, quantifier, body)| body.over(relation, quantifier)),
        ]
    })
}

fn arb_selector() -> impl Strategy<Value = Selector> {
    prop_oneof![
        1 => Just(Selector::Any),
        3 => prop::sample::select(ROLES).prop_map(|r| Selector::Role(r.to_owned())),
        3 => prop::sample::select(TYPES).prop_map(|t| Selector::Type(t.to_owned())),
        2 => prop::sample::select(vec!["input", "action"]).prop_map(|k| Selector::Kind(k.to_owned())),
    ]
}

/// A complete rule named `generated`.
pub fn arb_rule() -> impl Strategy<Value = Rule> {
    (
        prop::collection::vec(arb_selector(), 1..3),
        prop::option::of(arb_expr()),
        arb_expr(),
        prop::option::of(prop::sample::select(vec!["error", "warning"])),
    )
        .prop_map(|(selectors, when, ensure, severity)| Rule {
            name: "generated".to_owned(),
            selectors,
            meta: severity
                .map(|s| BTreeMap::from([("severity".to_owned(), s.to_owned())]))
                .unwrap_or_default(),
            when,
            ensure,
            report: "generated rule failed".to_owned(),
        })
}

/// 1..=6 rules with distinct names.
pub fn arb_rules() -> impl Strategy<Value = Vec<Rule>> {
    prop::collection::vec(arb_rule(), 1..=6).prop_map(|rules| {
        rules
            .into_iter()
            .enumerate()
            .map(|(i, rule)| Rule {
                name: format!("rule_{i}"),
                ..rule
            })
            .collect()
    })
}
