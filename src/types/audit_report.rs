use std::fmt;
use std::time::Duration;

use super::error::RuntimeError;

/// A node for which a rule's assertion evaluated to `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Violation {
    pub rule: String,
    /// The rule's `report` text, verbatim.
    pub report: String,
    /// Position of the node in the sweep order.
    pub node_index: usize,
    pub role: String,
    pub widget_type: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] node {} ({}: {}): {}",
            self.rule, self.node_index, self.role, self.widget_type, self.report
        )
    }
}

/// A `(rule, node)` pair whose evaluation raised a [`RuntimeError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub rule: String,
    pub node_index: usize,
    pub role: String,
    pub error: RuntimeError,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] node {} ({}): {}",
            self.rule, self.node_index, self.role, self.error
        )
    }
}

/// Result of sweeping a rule set over a sequence of nodes, returned by
/// [`RuleSet::audit()`](super::ruleset::RuleSet::audit) and
/// [`RuleSet::audit_tree()`](super::ruleset::RuleSet::audit_tree).
#[derive(Debug, Clone)]
#[must_use]
pub struct AuditReport {
    violations: Vec<Violation>,
    faults: Vec<Fault>,
    nodes_checked: usize,
    duration: Duration,
}

impl AuditReport {
    pub(crate) fn new(
        violations: Vec<Violation>,
        faults: Vec<Fault>,
        nodes_checked: usize,
        duration: Duration,
    ) -> Self {
        Self {
            violations,
            faults,
            nodes_checked,
            duration,
        }
    }

    /// Violations in sweep order: by node, then by rule load order.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    #[must_use]
    pub fn faults(&self) -> &[Fault] {
        &self.faults
    }

    #[must_use]
    pub fn nodes_checked(&self) -> usize {
        self.nodes_checked
    }

    /// Wall-clock duration of the sweep.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// No violations and no faults.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.faults.is_empty()
    }

    /// Violations raised by one rule.
    pub fn violations_of<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.violations.iter().filter(move |v| v.rule == rule)
    }
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes checked, {} violations, {} faults, duration: {:?}",
            self.nodes_checked,
            self.violations.len(),
            self.faults.len(),
            self.duration
        )?;
        for violation in &self.violations {
            write!(f, "\n  violation {violation}")?;
        }
        for fault in &self.faults {
            write!(f, "\n  fault {fault}")?;
        }
        Ok(())
    }
}
