use crate::types::{Expr, Rule, Schema, ValidationError};

/// Check that a rule only references names the schema knows about.
///
/// Walks `when` (if present) then `ensure`, left to right, and reports the
/// first bare identifier or `prop("..")` name that is neither registered in
/// `schema` nor one of `role`, `widgetType`, `type`.
///
/// # Errors
///
/// Returns [`ValidationError::NoSelectors`] for a rule without selectors and
/// [`ValidationError::UnknownIdentifier`] for the first unknown name.
pub fn validate(rule: &Rule, schema: &Schema) -> Result<(), ValidationError> {
    if rule.selectors.is_empty() {
        return Err(ValidationError::NoSelectors {
            rule: rule.name.clone(),
        });
    }
    if let Some(when) = &rule.when {
        check_identifiers(when, &rule.name, schema)?;
    }
    check_identifiers(&rule.ensure, &rule.name, schema)
}

fn check_identifiers(expr: &Expr, rule_name: &str, schema: &Schema) -> Result<(), ValidationError> {
    match expr {
        Expr::Ident(name) | Expr::Prop { name, .. } => {
            if !schema.allows(name) {
                return Err(ValidationError::UnknownIdentifier {
                    rule: rule_name.to_owned(),
                    identifier: name.clone(),
                });
            }
            Ok(())
        }
        Expr::Binary(a, _, b) => {
            check_identifiers(a, rule_name, schema)?;
            check_identifiers(b, rule_name, schema)
        }
        Expr::Unary(_, inner) | Expr::RegexMatch(inner, _) => {
            check_identifiers(inner, rule_name, schema)
        }
        Expr::Aggregate { body, .. } => check_identifiers(body, rule_name, schema),
        Expr::Literal(_) | Expr::State(_) | Expr::Length(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn schema() -> Schema {
        Schema::new().with("label").with("hint")
    }

    #[test]
    fn known_names_pass() {
        let rule = parse(
            r#"rule "r" on role(button) {
                when: prop("hint").is_resolved && role == "button"
                ensure: label ~= "ok" || widgetType == "Text" || type == "Text"
                report: "x"
            }"#,
        )
        .unwrap();
        assert_eq!(validate(&rule, &schema()), Ok(()));
    }

    #[test]
    fn unknown_identifier_in_ensure() {
        let rule = parse(r#"rule "typo" on any { ensure: lable == "x" report: "x" }"#).unwrap();
        assert_eq!(
            validate(&rule, &schema()),
            Err(ValidationError::UnknownIdentifier {
                rule: "typo".into(),
                identifier: "lable".into(),
            })
        );
    }

    #[test]
    fn guard_is_checked_before_assertion() {
        let rule = parse(
            r#"rule "r" on any { when: first == 1 ensure: second == 2 report: "x" }"#,
        )
        .unwrap();
        let err = validate(&rule, &schema()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownIdentifier {
                rule: "r".into(),
                identifier: "first".into(),
            }
        );
    }

    #[test]
    fn recurses_into_aggregates_and_regex_operands() {
        let aggregate =
            parse(r#"rule "r" on any { ensure: children.any(-size > 1) report: "x" }"#).unwrap();
        assert!(matches!(
            validate(&aggregate, &schema()),
            Err(ValidationError::UnknownIdentifier { identifier, .. }) if identifier == "size"
        ));

        let regex =
            parse(r#"rule "r" on any { ensure: prop("title") matches "^A" report: "x" }"#).unwrap();
        assert!(matches!(
            validate(&regex, &schema()),
            Err(ValidationError::UnknownIdentifier { identifier, .. }) if identifier == "title"
        ));
    }

    #[test]
    fn states_and_lengths_are_leaves() {
        let rule = parse(
            r#"rule "r" on any { ensure: focusable && children.length > 0 report: "x" }"#,
        )
        .unwrap();
        assert_eq!(validate(&rule, &Schema::new()), Ok(()));
    }

    #[test]
    fn rule_without_selectors_is_rejected() {
        let mut rule = parse(r#"rule "r" on any { ensure: true report: "x" }"#).unwrap();
        rule.selectors.clear();
        assert_eq!(
            validate(&rule, &schema()),
            Err(ValidationError::NoSelectors { rule: "r".into() })
        );
    }
}
