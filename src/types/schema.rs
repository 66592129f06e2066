use std::collections::HashSet;

/// Names every rule is allowed to reference without being registered.
pub(crate) const IMPLICIT_NAMES: [&str; 3] = ["role", "widgetType", "type"];

/// The set of property names a host can supply for its nodes.
///
/// Rules are validated against a schema before they are evaluated: every
/// bare identifier and every `prop("..")` must name a registered property or
/// one of the built-ins `role`, `widgetType` and `type`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    names: HashSet<String>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a property name (builder form).
    #[must_use]
    pub fn with(mut self, name: &str) -> Self {
        self.register(name);
        self
    }

    /// Register a property name. Returns `false` if it was already known.
    pub fn register(&mut self, name: &str) -> bool {
        self.names.insert(name.to_owned())
    }

    /// Whether a rule may reference `name`, counting the built-ins.
    #[must_use]
    pub fn allows(&self, name: &str) -> bool {
        IMPLICIT_NAMES.contains(&name) || self.names.contains(name)
    }

    /// The number of registered names, not counting the built-ins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Schema {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for Schema {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.names.extend(iter.into_iter().map(Into::into));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_allow() {
        let mut schema = Schema::new();
        assert!(schema.register("label"));
        assert!(!schema.register("label"));
        assert!(schema.allows("label"));
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn builtins_always_allowed() {
        let schema = Schema::new();
        assert!(schema.is_empty());
        for name in ["role", "widgetType", "type"] {
            assert!(schema.allows(name), "{name} should be implicit");
        }
        assert!(!schema.allows("label"));
    }

    #[test]
    fn collect_from_iterator() {
        let schema: Schema = ["label", "tooltip"].into_iter().collect();
        assert!(schema.allows("tooltip"));
        assert!(!schema.allows("hint"));
        let mut names: Vec<&str> = schema.iter().collect();
        names.sort_unstable();
        assert_eq!(names, ["label", "tooltip"]);
    }

    #[test]
    fn builder_and_extend() {
        let mut schema = Schema::new().with("label");
        schema.extend(["hint", "value"]);
        assert_eq!(schema.len(), 3);
    }
}
