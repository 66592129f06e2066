use std::collections::BTreeMap;
use std::fmt;

use super::expr::{write_quoted, Expr};

/// Decides whether a rule applies to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Matches every node.
    Any,
    /// Matches nodes whose role equals the name.
    Role(String),
    /// Matches nodes whose widget type equals the name.
    Type(String),
    /// Matches nodes whose role is listed under the kind in the
    /// [`KindMap`](super::KindMap).
    Kind(String),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Any => f.write_str("any"),
            Selector::Role(name) => write!(f, "role({name})"),
            Selector::Type(name) => write!(f, "type({name})"),
            Selector::Kind(name) => write!(f, "kind({name})"),
        }
    }
}

/// A parsed accessibility rule.
///
/// Rules are produced by [`parse`](crate::parse()) and are immutable once
/// validated. `selectors` are OR-combined; `when` is an optional guard and
/// `ensure` the assertion. `report` is kept verbatim: `${...}` in it is plain
/// text.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: String,
    pub selectors: Vec<Selector>,
    pub meta: BTreeMap<String, String>,
    pub when: Option<Expr>,
    pub ensure: Expr,
    pub report: String,
}

impl Rule {
    /// Look up a `meta` entry.
    #[must_use]
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("rule ")?;
        write_quoted(f, &self.name)?;
        f.write_str(" on ")?;
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_str(" || ")?;
            }
            write!(f, "{selector}")?;
        }
        writeln!(f, " {{")?;
        if !self.meta.is_empty() {
            writeln!(f, "    meta {{")?;
            for (key, value) in &self.meta {
                f.write_str("        ")?;
                if is_bare_key(key) {
                    f.write_str(key)?;
                } else {
                    write_quoted(f, key)?;
                }
                f.write_str(": ")?;
                write_quoted(f, value)?;
                writeln!(f)?;
            }
            writeln!(f, "    }}")?;
        }
        if let Some(when) = &self.when {
            writeln!(f, "    when: {when}")?;
        }
        writeln!(f, "    ensure: {}", self.ensure)?;
        f.write_str("    report: ")?;
        write_quoted(f, &self.report)?;
        write!(f, "\n}}")
    }
}

fn is_bare_key(key: &str) -> bool {
    key.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::expr::{prop, PropAccess};

    fn sample() -> Rule {
        Rule {
            name: "button_label".into(),
            selectors: vec![Selector::Role("button".into()), Selector::Kind("action".into())],
            meta: BTreeMap::from([("severity".to_owned(), "error".to_owned())]),
            when: None,
            ensure: Expr::Prop {
                name: "label".into(),
                access: PropAccess::IsResolved,
            },
            report: "Button needs a label: ${widgetType}".into(),
        }
    }

    #[test]
    fn meta_lookup() {
        let rule = sample();
        assert_eq!(rule.meta("severity"), Some("error"));
        assert_eq!(rule.meta("wcag"), None);
    }

    #[test]
    fn selector_display() {
        assert_eq!(Selector::Any.to_string(), "any");
        assert_eq!(Selector::Type("My_Widget".into()).to_string(), "type(My_Widget)");
    }

    #[test]
    fn display_renders_rule_source() {
        let mut rule = sample();
        rule.when = Some(prop("label").equals("x"));
        let text = rule.to_string();
        assert!(text.starts_with("rule \"button_label\" on role(button) || kind(action) {"));
        assert!(text.contains("severity: \"error\""));
        rule.meta.insert("wcag-level".into(), "AA".into());
        assert!(rule.to_string().contains("\"wcag-level\": \"AA\""));
        assert!(text.contains("when: (prop(\"label\") == \"x\")"));
        assert!(text.contains("ensure: prop(\"label\").is_resolved"));
        assert!(text.contains("report: \"Button needs a label: ${widgetType}\""));
    }
}
