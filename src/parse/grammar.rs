use std::collections::BTreeMap;

use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat, terminated};
use winnow::error::{ContextError, ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;

use crate::types::{
    BinaryOp, BoolState, CastType, Expr, Pattern, PropAccess, Quantifier, Relation, Rule,
    Selector, UnaryOp,
};
use crate::Value;

use super::token::{ident, keyword, number_literal, string_literal, ws};

type Level = fn(&mut &str) -> ModalResult<Expr>;
type OpParser = fn(&mut &str) -> ModalResult<BinaryOp>;

// -- Operators --------------------------------------------------------------

fn or_op(input: &mut &str) -> ModalResult<BinaryOp> {
    "||".value(BinaryOp::Or).parse_next(input)
}

fn and_op(input: &mut &str) -> ModalResult<BinaryOp> {
    "&&".value(BinaryOp::And).parse_next(input)
}

fn equality_op(input: &mut &str) -> ModalResult<BinaryOp> {
    alt((
        "==".value(BinaryOp::Eq),
        "!=".value(BinaryOp::Neq),
        "~=".value(BinaryOp::LooseEq),
        keyword("contains").value(BinaryOp::Contains),
        keyword("matches").value(BinaryOp::Matches),
    ))
    .parse_next(input)
}

fn relational_op(input: &mut &str) -> ModalResult<BinaryOp> {
    alt((
        "<=".value(BinaryOp::Lte),
        "<".value(BinaryOp::Lt),
        ">=".value(BinaryOp::Gte),
        ">".value(BinaryOp::Gt),
    ))
    .parse_next(input)
}

fn additive_op(input: &mut &str) -> ModalResult<BinaryOp> {
    alt(('+'.value(BinaryOp::Add), '-'.value(BinaryOp::Sub))).parse_next(input)
}

fn multiplicative_op(input: &mut &str) -> ModalResult<BinaryOp> {
    alt(('*'.value(BinaryOp::Mul), '/'.value(BinaryOp::Div))).parse_next(input)
}

// -- Expressions (precedence: || < && < equality < relational < additive
//    < multiplicative < prefix < primary) ----------------------------------

pub(super) fn expr(input: &mut &str) -> ModalResult<Expr> {
    left_assoc(input, and_expr, or_op)
}

fn and_expr(input: &mut &str) -> ModalResult<Expr> {
    left_assoc(input, equality, and_op)
}

/// Right-hand side of an equality-level operator.
enum Operand {
    Expr(Expr),
    Pattern(Pattern),
}

fn equality(input: &mut &str) -> ModalResult<Expr> {
    let first = relational(input)?;
    let rest: Vec<(BinaryOp, Operand)> = repeat(0.., equality_tail).parse_next(input)?;
    Ok(rest.into_iter().fold(first, |acc, (op, rhs)| match rhs {
        Operand::Pattern(pattern) => Expr::RegexMatch(Box::new(acc), pattern),
        Operand::Expr(rhs) => Expr::binary(acc, op, rhs),
    }))
}

fn equality_tail(input: &mut &str) -> ModalResult<(BinaryOp, Operand)> {
    let op = preceded(ws, equality_op).parse_next(input)?;
    let rhs = if op == BinaryOp::Matches {
        cut_err(preceded(ws, relational.try_map(match_operand)))
            .context(StrContext::Label("matches operand"))
            .parse_next(input)?
    } else {
        Operand::Expr(cut_err(relational).parse_next(input)?)
    };
    Ok((op, rhs))
}

/// Literal patterns are compiled now so a bad regex fails the parse.
fn match_operand(rhs: Expr) -> Result<Operand, regex::Error> {
    match rhs {
        Expr::Literal(Value::String(source)) => Pattern::new(&source).map(Operand::Pattern),
        other => Ok(Operand::Expr(other)),
    }
}

fn relational(input: &mut &str) -> ModalResult<Expr> {
    left_assoc(input, additive, relational_op)
}

fn additive(input: &mut &str) -> ModalResult<Expr> {
    left_assoc(input, multiplicative, additive_op)
}

fn multiplicative(input: &mut &str) -> ModalResult<Expr> {
    left_assoc(input, unary, multiplicative_op)
}

fn left_assoc(input: &mut &str, operand: Level, op: OpParser) -> ModalResult<Expr> {
    let first = operand(input)?;
    let rest: Vec<(BinaryOp, Expr)> =
        repeat(0.., (preceded(ws, op), cut_err(operand))).parse_next(input)?;
    Ok(rest
        .into_iter()
        .fold(first, |acc, (op, rhs)| Expr::binary(acc, op, rhs)))
}

/// Longest run of prefix operators in front of one operand.
const MAX_PREFIX_OPS: usize = 32;

fn prefix_op(input: &mut &str) -> ModalResult<UnaryOp> {
    alt(('!'.value(UnaryOp::Not), '-'.value(UnaryOp::Neg))).parse_next(input)
}

fn unary(input: &mut &str) -> ModalResult<Expr> {
    let ops: Vec<UnaryOp> =
        repeat(0..=MAX_PREFIX_OPS, preceded(ws, prefix_op)).parse_next(input)?;
    let operand = if ops.is_empty() {
        primary(input)?
    } else {
        cut_err(primary)
            .context(StrContext::Label("prefix operand"))
            .parse_next(input)?
    };
    Ok(ops
        .into_iter()
        .rev()
        .fold(operand, |inner, op| Expr::Unary(op, Box::new(inner))))
}

fn primary(input: &mut &str) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    alt((
        delimited('(', cut_err(expr), cut_err((ws, ')'))),
        string_literal.map(|s| Expr::Literal(Value::String(s))),
        number_literal.map(Expr::Literal),
        word,
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "expression",
    )))
    .parse_next(input)
}

/// Everything that starts with a name: literals, `prop(..)`, relation
/// traversals, boolean states and bare identifiers.
fn word(input: &mut &str) -> ModalResult<Expr> {
    let name = ident.parse_next(input)?;
    match name {
        "true" => return Ok(Expr::Literal(Value::Bool(true))),
        "false" => return Ok(Expr::Literal(Value::Bool(false))),
        "prop" => {
            if opt((ws, '(')).parse_next(input)?.is_some() {
                return prop_access(input).map_err(ErrMode::cut);
            }
        }
        _ => {}
    }
    if let Some(relation) = Relation::from_keyword(name) {
        if opt((ws, '.')).parse_next(input)?.is_some() {
            return traversal(input, relation).map_err(ErrMode::cut);
        }
    }
    if let Some(state) = BoolState::from_keyword(name) {
        return Ok(Expr::State(state));
    }
    Ok(Expr::Ident(name.to_owned()))
}

/// `"name")` plus an optional `.is_resolved` or `as <type>` suffix; the
/// opening parenthesis has been consumed.
fn prop_access(input: &mut &str) -> ModalResult<Expr> {
    let name = delimited(ws, string_literal, (ws, ')'))
        .context(StrContext::Expected(StrContextValue::Description(
            "quoted property name",
        )))
        .parse_next(input)?;
    let access = opt(alt((
        preceded((ws, '.'), cut_err(keyword("is_resolved"))).value(PropAccess::IsResolved),
        preceded((ws, keyword("as")), cut_err(preceded(ws, cast_type))).map(PropAccess::Cast),
    )))
    .parse_next(input)?;
    Ok(Expr::Prop {
        name,
        access: access.unwrap_or(PropAccess::Raw),
    })
}

fn cast_type(input: &mut &str) -> ModalResult<CastType> {
    alt((
        keyword("int").value(CastType::Int),
        keyword("string").value(CastType::String),
        keyword("bool").value(CastType::Bool),
    ))
    .parse_next(input)
}

/// `length` or `<any|all|none>(expr)`; the relation and dot have been consumed.
fn traversal(input: &mut &str, relation: Relation) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    let quantifier = alt((
        keyword("length").value(None),
        keyword("any").value(Some(Quantifier::Any)),
        keyword("all").value(Some(Quantifier::All)),
        keyword("none").value(Some(Quantifier::None)),
    ))
    .parse_next(input)?;
    let Some(quantifier) = quantifier else {
        return Ok(Expr::Length(relation));
    };
    let body = delimited((ws, '('), expr, (ws, ')')).parse_next(input)?;
    Ok(Expr::Aggregate {
        relation,
        quantifier,
        body: Box::new(body),
    })
}

// -- Selectors --------------------------------------------------------------

fn selector_arg(input: &mut &str) -> ModalResult<String> {
    delimited((ws, '(', ws), ident, (ws, ')'))
        .map(str::to_owned)
        .parse_next(input)
}

fn selector(input: &mut &str) -> ModalResult<Selector> {
    ws.parse_next(input)?;
    alt((
        keyword("any").value(Selector::Any),
        preceded(keyword("role"), cut_err(selector_arg)).map(Selector::Role),
        preceded(keyword("type"), cut_err(selector_arg)).map(Selector::Type),
        preceded(keyword("kind"), cut_err(selector_arg)).map(Selector::Kind),
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "selector",
    )))
    .parse_next(input)
}

fn selectors(input: &mut &str) -> ModalResult<Vec<Selector>> {
    let first = cut_err(selector).parse_next(input)?;
    let rest: Vec<Selector> =
        repeat(0.., preceded((ws, "||"), cut_err(selector))).parse_next(input)?;
    let mut all = Vec::with_capacity(rest.len() + 1);
    all.push(first);
    all.extend(rest);
    Ok(all)
}

// -- Rule definitions -------------------------------------------------------

fn meta_entry(input: &mut &str) -> ModalResult<(String, String)> {
    let key = preceded(ws, alt((ident.map(str::to_owned), string_literal))).parse_next(input)?;
    let value = cut_err(preceded((ws, ':', ws), string_literal))
        .context(StrContext::Expected(StrContextValue::Description(
            "quoted meta value",
        )))
        .parse_next(input)?;
    opt((ws, ',')).parse_next(input)?;
    Ok((key, value))
}

fn meta_block(input: &mut &str) -> ModalResult<BTreeMap<String, String>> {
    let entries: Vec<(String, String)> = preceded(
        (ws, keyword("meta")),
        cut_err(delimited((ws, '{'), repeat(0.., meta_entry), (ws, '}'))),
    )
    .parse_next(input)?;
    Ok(entries.into_iter().collect())
}

fn clause<'i>(name: &'static str) -> impl Parser<&'i str, Expr, ErrMode<ContextError>> {
    preceded((ws, keyword(name)), cut_err(preceded((ws, ':'), expr)))
}

fn rule_def(input: &mut &str) -> ModalResult<Rule> {
    preceded(ws, keyword("rule")).parse_next(input)?;

    let name = cut_err(preceded(ws, string_literal))
        .context(StrContext::Expected(StrContextValue::Description(
            "quoted rule name",
        )))
        .parse_next(input)?;

    cut_err(preceded(ws, keyword("on"))).parse_next(input)?;
    let selectors = selectors(input)?;

    cut_err((ws, '{'))
        .context(StrContext::Expected(StrContextValue::CharLiteral('{')))
        .parse_next(input)?;

    let meta = opt(meta_block).parse_next(input)?.unwrap_or_default();
    let when = opt(clause("when")).parse_next(input)?;

    let ensure = cut_err(clause("ensure"))
        .context(StrContext::Expected(StrContextValue::Description(
            "ensure clause",
        )))
        .parse_next(input)?;

    let report = cut_err(preceded((ws, keyword("report"), ws, ':', ws), string_literal))
        .context(StrContext::Expected(StrContextValue::Description(
            "report clause",
        )))
        .parse_next(input)?;

    cut_err((ws, '}'))
        .context(StrContext::Expected(StrContextValue::CharLiteral('}')))
        .parse_next(input)?;

    Ok(Rule {
        name,
        selectors,
        meta,
        when,
        ensure,
        report,
    })
}

// -- Top-level parsers ------------------------------------------------------

pub(super) fn single_rule(input: &mut &str) -> ModalResult<Rule> {
    terminated(rule_def, ws).parse_next(input)
}

pub(super) fn rule_list(input: &mut &str) -> ModalResult<Vec<Rule>> {
    terminated(repeat(0.., rule_def), ws).parse_next(input)
}
