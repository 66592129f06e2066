use std::collections::HashSet;
use std::fmt;
use std::time::Instant;

use tracing::{debug, error, instrument, warn};

use super::audit_report::{AuditReport, Fault, Violation};
use super::context::Context;
use super::error::{RuntimeError, ValidationError};
use super::kind_map::KindMap;
use super::rule::Rule;
use super::schema::Schema;
use crate::evaluate::Interpreter;
use crate::Error;

#[derive(Debug)]
enum Input {
    Source(String),
    Rule(Rule),
}

/// Builder for loading a [`RuleSet`].
///
/// Inputs are processed in the order they were added. A source text may
/// hold any number of rules.
///
/// # Example
///
/// ```
/// use a11yql::{RuleSetBuilder, Schema};
///
/// let ruleset = RuleSetBuilder::new()
///     .schema(Schema::new().with("label"))
///     .source(r#"
///         rule "button_label" on role(button) {
///             ensure: prop("label").is_resolved
///             report: "Buttons need a label"
///         }
///     "#)
///     .try_build()
///     .unwrap();
/// assert_eq!(ruleset.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    inputs: Vec<Input>,
    schema: Option<Schema>,
    kinds: KindMap,
    max_depth: Option<usize>,
}

impl RuleSetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate identifiers against `schema`. Without a schema only the
    /// structural checks run.
    #[must_use]
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Kind table for `kind(..)` selectors. Defaults to [`KindMap::default()`].
    #[must_use]
    pub fn kinds(mut self, kinds: KindMap) -> Self {
        self.kinds = kinds;
        self
    }

    /// See [`Interpreter::with_max_depth()`].
    #[must_use]
    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }

    /// Add rule source text.
    #[must_use]
    pub fn source(mut self, text: &str) -> Self {
        self.inputs.push(Input::Source(text.to_owned()));
        self
    }

    /// Add an already parsed rule.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.inputs.push(Input::Rule(rule));
        self
    }

    /// Load every input, skipping the ones that fail.
    ///
    /// A source that fails to parse, or a rule that fails validation or
    /// repeats an earlier rule's name, is logged and kept in
    /// [`RuleSet::rejected()`]; the remaining rules still load.
    #[must_use]
    pub fn build(self) -> RuleSet {
        let interpreter = self.interpreter();
        let (rules, rejected) = load(self.inputs, self.schema.as_ref());
        RuleSet {
            rules,
            interpreter,
            rejected,
        }
    }

    /// Load every input, failing on the first rejected one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] or [`Error::Validation`] for the first input
    /// that [`build()`](Self::build) would have skipped.
    pub fn try_build(self) -> Result<RuleSet, Error> {
        let ruleset = self.build();
        match ruleset.rejected.into_iter().next() {
            Some(rejection) => Err(rejection.error),
            None => Ok(RuleSet {
                rejected: Vec::new(),
                ..ruleset
            }),
        }
    }

    fn interpreter(&self) -> Interpreter {
        let interpreter = Interpreter::new(self.kinds.clone());
        match self.max_depth {
            Some(limit) => interpreter.with_max_depth(limit),
            None => interpreter,
        }
    }
}

fn load(inputs: Vec<Input>, schema: Option<&Schema>) -> (Vec<Rule>, Vec<Rejection>) {
    let mut rules = Vec::new();
    let mut rejected = Vec::new();
    let mut names = HashSet::new();

    for input in inputs {
        let parsed = match input {
            Input::Rule(rule) => vec![rule],
            Input::Source(text) => match crate::parse::parse_rules(&text) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(error = %e, "rejected rule source");
                    rejected.push(Rejection {
                        rule: None,
                        error: e.into(),
                    });
                    continue;
                }
            },
        };

        for rule in parsed {
            match admit(&rule, schema, &names) {
                Ok(()) => {
                    debug!(rule = %rule.name, "loaded rule");
                    names.insert(rule.name.clone());
                    rules.push(rule);
                }
                Err(e) => {
                    warn!(rule = %rule.name, error = %e, "rejected rule");
                    rejected.push(Rejection {
                        rule: Some(rule.name),
                        error: e.into(),
                    });
                }
            }
        }
    }
    (rules, rejected)
}

fn admit(rule: &Rule, schema: Option<&Schema>, names: &HashSet<String>) -> Result<(), ValidationError> {
    if names.contains(&rule.name) {
        return Err(ValidationError::DuplicateRule {
            name: rule.name.clone(),
        });
    }
    match schema {
        Some(schema) => crate::validate::validate(rule, schema),
        None if rule.selectors.is_empty() => Err(ValidationError::NoSelectors {
            rule: rule.name.clone(),
        }),
        None => Ok(()),
    }
}

/// An input refused at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// The rule's name, `None` when a whole source failed to parse.
    pub rule: Option<String>,
    pub error: Error,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rule {
            Some(name) => write!(f, "rule '{name}': {}", self.error),
            None => write!(f, "source: {}", self.error),
        }
    }
}

/// A loaded, immutable set of rules. Thread-safe and designed to live
/// behind `Arc`.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<Rule>,
    interpreter: Interpreter,
    rejected: Vec<Rejection>,
}

impl RuleSet {
    #[must_use]
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::new()
    }

    /// Parse source text into a rule set with the default kind table and no
    /// schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] on the first parse or load failure.
    pub fn from_source(text: &str) -> Result<Self, Error> {
        RuleSetBuilder::new().source(text).try_build()
    }

    /// Loaded rules, in load order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Inputs skipped by [`RuleSetBuilder::build()`].
    #[must_use]
    pub fn rejected(&self) -> &[Rejection] {
        &self.rejected
    }

    #[must_use]
    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Evaluate every rule against one node, in load order.
    pub fn check<C: Context>(&self, node: &C) -> Vec<(&str, Result<bool, RuntimeError>)> {
        self.rules
            .iter()
            .map(|rule| (rule.name.as_str(), self.interpreter.evaluate(rule, node)))
            .collect()
    }

    /// Evaluate every rule against every node.
    ///
    /// `node_index` in the report is the position in `nodes`. Runtime errors
    /// are logged and collected as faults; they never stop the sweep.
    #[instrument(skip_all, fields(rules = self.rules.len()))]
    pub fn audit<C, I>(&self, nodes: I) -> AuditReport
    where
        C: Context,
        I: IntoIterator<Item = C>,
    {
        let start = Instant::now();
        let mut violations = Vec::new();
        let mut faults = Vec::new();
        let mut nodes_checked = 0;

        for (node_index, node) in nodes.into_iter().enumerate() {
            nodes_checked += 1;
            for rule in &self.rules {
                match self.interpreter.evaluate(rule, &node) {
                    Ok(true) => {}
                    Ok(false) => violations.push(Violation {
                        rule: rule.name.clone(),
                        report: rule.report.clone(),
                        node_index,
                        role: node.role().to_owned(),
                        widget_type: node.widget_type().to_owned(),
                    }),
                    Err(e) => {
                        error!(rule = %rule.name, node_index, role = node.role(), error = %e, "rule evaluation failed");
                        faults.push(Fault {
                            rule: rule.name.clone(),
                            node_index,
                            role: node.role().to_owned(),
                            error: e,
                        });
                    }
                }
            }
        }

        let duration = start.elapsed();
        debug!(
            nodes_checked,
            violations = violations.len(),
            faults = faults.len(),
            ?duration,
            "audit finished"
        );
        AuditReport::new(violations, faults, nodes_checked, duration)
    }

    /// Sweep `root` and all of its descendants in depth-first pre-order.
    pub fn audit_tree<C: Context>(&self, root: C) -> AuditReport {
        self.audit(pre_order(root))
    }
}

fn pre_order<C: Context>(root: C) -> impl Iterator<Item = C> {
    let mut stack = vec![root];
    std::iter::from_fn(move || {
        let node = stack.pop()?;
        let first = stack.len();
        stack.extend(node.children());
        stack[first..].reverse();
        Some(node)
    })
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RuleSet({} rules, {} rejected)",
            self.rules.len(),
            self.rejected.len(),
        )
    }
}
