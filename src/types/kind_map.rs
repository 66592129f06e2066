use std::collections::HashMap;

/// Maps a selector kind (`kind(input)`) to the roles it covers.
///
/// Passed explicitly to the [`Interpreter`](crate::Interpreter). The default
/// maps `input -> [textField, slider, switchRole]` and
/// `action -> [button, toggle]`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct KindMap {
    kinds: HashMap<String, Vec<String>>,
}

impl KindMap {
    /// An empty map: every `kind(..)` selector fails to match.
    #[must_use]
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Add or replace the roles for a kind.
    #[must_use]
    pub fn with_kind<I, S>(mut self, kind: &str, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(kind, roles);
        self
    }

    pub fn insert<I, S>(&mut self, kind: &str, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kinds
            .insert(kind.to_owned(), roles.into_iter().map(Into::into).collect());
    }

    #[must_use]
    pub fn roles(&self, kind: &str) -> Option<&[String]> {
        self.kinds.get(kind).map(Vec::as_slice)
    }

    /// Whether `role` is listed under `kind`.
    #[must_use]
    pub fn contains(&self, kind: &str, role: &str) -> bool {
        self.roles(kind)
            .is_some_and(|roles| roles.iter().any(|r| r == role))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl Default for KindMap {
    fn default() -> Self {
        Self::new()
            .with_kind("input", ["textField", "slider", "switchRole"])
            .with_kind("action", ["button", "toggle"])
    }
}
