use crate::types::{
    BinaryOp, BoolState, Context, Expr, KindMap, Number, Pattern, PropAccess, Quantifier,
    Relation, Rule, RuntimeError, Selector, UnaryOp,
};
use crate::Value;

/// Evaluates rules against nodes.
///
/// Holds the [`KindMap`] used by `kind(..)` selectors and an optional budget
/// on nested relation traversals. Evaluation is pure: an `Interpreter` can be
/// shared across threads and used concurrently.
///
/// # Example
///
/// ```
/// use a11yql::{parse, Interpreter, KindMap, WidgetNode, WidgetTree};
///
/// let rule = parse(r#"rule "label" on kind(action) {
///     ensure: prop("label").is_resolved
///     report: "Actions need a label"
/// }"#).unwrap();
///
/// let tree = WidgetTree::new(WidgetNode::new("button", "Button").set("label", "OK"));
/// let interpreter = Interpreter::new(KindMap::default());
/// assert_eq!(interpreter.evaluate(&rule, &tree.root()), Ok(true));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    kinds: KindMap,
    max_depth: Option<usize>,
}

impl Interpreter {
    #[must_use]
    pub fn new(kinds: KindMap) -> Self {
        Self {
            kinds,
            max_depth: None,
        }
    }

    /// Limit how deeply `any`/`all`/`none` traversals may nest.
    ///
    /// A limit of `0` rejects every aggregation. Exceeding the limit is
    /// [`RuntimeError::DepthExceeded`].
    #[must_use]
    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }

    #[must_use]
    pub fn kinds(&self) -> &KindMap {
        &self.kinds
    }

    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Whether any of the rule's selectors matches the node.
    #[must_use]
    pub fn applies<C: Context>(&self, rule: &Rule, node: &C) -> bool {
        self.walker().applies(rule, node)
    }

    /// Run the selection, filtering and assertion phases.
    ///
    /// Returns `Ok(true)` when the rule does not apply, when its `when` guard
    /// is anything but `true`, or when `ensure` is `true`; `Ok(false)` is a
    /// violation.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] if the guard or the assertion cannot be
    /// computed.
    pub fn evaluate<C: Context>(&self, rule: &Rule, node: &C) -> Result<bool, RuntimeError> {
        self.walker().evaluate(rule, node)
    }

    /// Evaluate a single expression with `node` as the current node.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] on type errors, division by zero, an invalid
    /// dynamic pattern or an exceeded depth budget.
    pub fn eval<C: Context>(&self, expr: &Expr, node: &C) -> Result<Value, RuntimeError> {
        self.walker().eval(expr, node, 0)
    }

    fn walker(&self) -> Walker<'_> {
        Walker {
            kinds: &self.kinds,
            max_depth: self.max_depth,
        }
    }
}

/// Evaluate one rule against one node with the given kind table.
///
/// Shorthand for `Interpreter::new(kinds.clone()).evaluate(rule, node)`
/// without the clone.
///
/// # Errors
///
/// Returns [`RuntimeError`] if the guard or the assertion cannot be computed.
pub fn evaluate<C: Context>(rule: &Rule, node: &C, kinds: &KindMap) -> Result<bool, RuntimeError> {
    Walker {
        kinds,
        max_depth: None,
    }
    .evaluate(rule, node)
}

struct Walker<'k> {
    kinds: &'k KindMap,
    max_depth: Option<usize>,
}

impl Walker<'_> {
    fn applies<C: Context>(&self, rule: &Rule, node: &C) -> bool {
        rule.selectors.iter().any(|selector| match selector {
            Selector::Any => true,
            Selector::Role(role) => node.role() == role,
            Selector::Type(widget_type) => node.widget_type() == widget_type,
            Selector::Kind(kind) => self.kinds.contains(kind, node.role()),
        })
    }

    fn evaluate<C: Context>(&self, rule: &Rule, node: &C) -> Result<bool, RuntimeError> {
        if !self.applies(rule, node) {
            return Ok(true);
        }
        if let Some(when) = &rule.when {
            if !self.eval(when, node, 0)?.is_true() {
                return Ok(true);
            }
        }
        Ok(self.eval(&rule.ensure, node, 0)?.is_true())
    }

    fn eval<C: Context>(&self, expr: &Expr, node: &C, depth: usize) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::State(state) => Ok(Value::Bool(read_state(*state, node))),
            Expr::Ident(name) => Ok(lookup(node, name)),
            Expr::Prop { name, access } => Ok(match access {
                PropAccess::Raw => lookup(node, name),
                PropAccess::Cast(to) => lookup(node, name).cast(*to),
                PropAccess::IsResolved => Value::Bool(node.is_property_resolved(name)),
            }),
            Expr::Unary(UnaryOp::Not, inner) => {
                Ok(Value::Bool(!self.eval(inner, node, depth)?.is_true()))
            }
            Expr::Unary(UnaryOp::Neg, inner) => negate(&self.eval(inner, node, depth)?),
            Expr::Binary(a, op, b) => self.binary(a, *op, b, node, depth),
            Expr::RegexMatch(left, pattern) => {
                let left = self.eval(left, node, depth)?;
                Ok(Value::Bool(!left.is_null() && pattern.is_match(&left.to_string())))
            }
            Expr::Aggregate {
                relation,
                quantifier,
                body,
            } => {
                let depth = self.descend(depth)?;
                with_related(node, *relation, |nodes| {
                    self.quantify(nodes, *quantifier, body, depth)
                })
                .map(Value::Bool)
            }
            Expr::Length(relation) => {
                let count = with_related(node, *relation, |nodes| nodes.count());
                Ok(Value::Int(i64::try_from(count).unwrap_or(i64::MAX)))
            }
        }
    }

    fn binary<C: Context>(
        &self,
        a: &Expr,
        op: BinaryOp,
        b: &Expr,
        node: &C,
        depth: usize,
    ) -> Result<Value, RuntimeError> {
        match op {
            BinaryOp::And => {
                if !self.eval(a, node, depth)?.is_true() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.eval(b, node, depth)?.is_true()))
            }
            BinaryOp::Or => {
                if self.eval(a, node, depth)?.is_true() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.eval(b, node, depth)?.is_true()))
            }
            _ => {
                let left = self.eval(a, node, depth)?;
                let right = self.eval(b, node, depth)?;
                apply(op, &left, &right)
            }
        }
    }

    fn quantify<C: Context>(
        &self,
        nodes: &mut dyn Iterator<Item = C>,
        quantifier: Quantifier,
        body: &Expr,
        depth: usize,
    ) -> Result<bool, RuntimeError> {
        for item in nodes {
            let hit = self.eval(body, &item, depth)?.is_true();
            match (quantifier, hit) {
                (Quantifier::Any, true) => return Ok(true),
                (Quantifier::All, false) | (Quantifier::None, true) => return Ok(false),
                _ => {}
            }
        }
        Ok(quantifier != Quantifier::Any)
    }

    fn descend(&self, depth: usize) -> Result<usize, RuntimeError> {
        let next = depth + 1;
        match self.max_depth {
            Some(limit) if next > limit => Err(RuntimeError::DepthExceeded { limit }),
            _ => Ok(next),
        }
    }
}

fn read_state<C: Context>(state: BoolState, node: &C) -> bool {
    match state {
        BoolState::Focusable => node.is_focusable(),
        BoolState::Enabled => node.is_enabled(),
        BoolState::Hidden => node.is_hidden(),
        BoolState::Checked => node.is_checked(),
        BoolState::Toggled => node.is_toggled(),
        BoolState::MergesDescendants => node.merges_descendants(),
        BoolState::HasTap => node.has_tap(),
        BoolState::HasLongPress => node.has_long_press(),
        BoolState::IsEmpty => node.is_empty(),
        BoolState::IsNotEmpty => !node.is_empty(),
    }
}

fn lookup<C: Context>(node: &C, name: &str) -> Value {
    match name {
        "role" => Value::from(node.role()),
        "widgetType" | "type" => Value::from(node.widget_type()),
        _ => node.property(name).unwrap_or(Value::Null),
    }
}

fn with_related<C: Context, R>(
    node: &C,
    relation: Relation,
    f: impl FnOnce(&mut dyn Iterator<Item = C>) -> R,
) -> R {
    match relation {
        Relation::Children => f(&mut node.children()),
        Relation::Ancestors => f(&mut node.ancestors()),
        Relation::Siblings => f(&mut node.siblings()),
        Relation::NextFocus => f(&mut node.next_focus()),
        Relation::PrevFocus => f(&mut node.prev_focus()),
    }
}

#[allow(clippy::cast_precision_loss)]
fn negate(value: &Value) -> Result<Value, RuntimeError> {
    match value.to_number() {
        Some(Number::Int(i)) => Ok(i.checked_neg().map_or(Value::Float(-(i as f64)), Value::Int)),
        Some(Number::Float(f)) => Ok(Value::Float(-f)),
        None => Err(RuntimeError::Type(format!(
            "cannot negate {}",
            value.type_name()
        ))),
    }
}

fn apply(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    let result = match op {
        BinaryOp::And => left.is_true() && right.is_true(),
        BinaryOp::Or => left.is_true() || right.is_true(),
        BinaryOp::Eq => left.equals(right),
        BinaryOp::Neq => !left.equals(right),
        BinaryOp::LooseEq => loose_text(left) == loose_text(right),
        BinaryOp::Contains => !left.is_null() && left.to_string().contains(&right.to_string()),
        BinaryOp::Matches => dynamic_match(left, right)?,
        BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => compare(op, left, right),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            return arithmetic(op, left, right);
        }
    };
    Ok(Value::Bool(result))
}

fn loose_text(value: &Value) -> String {
    value.to_string().trim().to_lowercase()
}

fn dynamic_match(left: &Value, right: &Value) -> Result<bool, RuntimeError> {
    if left.is_null() {
        return Ok(false);
    }
    let source = right.to_string();
    let pattern = Pattern::new(&source).map_err(|e| RuntimeError::InvalidPattern {
        message: e.to_string(),
        pattern: source,
    })?;
    Ok(pattern.is_match(&left.to_string()))
}

/// Ordering is numeric only; a side that does not coerce makes it `false`.
fn compare(op: BinaryOp, left: &Value, right: &Value) -> bool {
    let (Some(x), Some(y)) = (left.to_number(), right.to_number()) else {
        return false;
    };
    let ordering = match (x, y) {
        (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
        _ => x.as_f64().partial_cmp(&y.as_f64()),
    };
    ordering.is_some_and(|ordering| match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Lte => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    })
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    let (Some(x), Some(y)) = (left.to_number(), right.to_number()) else {
        return Err(RuntimeError::Type(format!(
            "cannot apply '{}' to {} and {}",
            op.symbol(),
            left.type_name(),
            right.type_name()
        )));
    };

    if op == BinaryOp::Div {
        let divisor = y.as_f64();
        if divisor == 0.0 {
            return Err(RuntimeError::DivisionByZero);
        }
        return Ok(Value::Float(x.as_f64() / divisor));
    }

    if let (Number::Int(a), Number::Int(b)) = (x, y) {
        let exact = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            _ => a.checked_mul(b),
        };
        if let Some(v) = exact {
            return Ok(Value::Int(v));
        }
    }

    let (a, b) = (x.as_f64(), y.as_f64());
    Ok(Value::Float(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        _ => a * b,
    }))
}
