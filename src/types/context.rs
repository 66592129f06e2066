use super::Value;

/// Read-only view of one widget-tree node, implemented by the host.
///
/// The interpreter only reads through this trait and never constructs or
/// mutates nodes. Implementors are usually cheap handles (a reference or an
/// index into an arena) so that relations can hand out owned `Self` values
/// lazily instead of copying subtrees.
///
/// `next_focus` and `prev_focus` default to empty sequences; `is_checked` and
/// `is_toggled` default to `false`; `is_empty` defaults to "has no children".
pub trait Context: Sized {
    fn role(&self) -> &str;

    fn widget_type(&self) -> &str;

    fn is_focusable(&self) -> bool;

    fn is_enabled(&self) -> bool;

    fn is_hidden(&self) -> bool;

    fn is_checked(&self) -> bool {
        false
    }

    fn is_toggled(&self) -> bool {
        false
    }

    fn merges_descendants(&self) -> bool;

    fn has_tap(&self) -> bool;

    fn has_long_press(&self) -> bool;

    fn is_empty(&self) -> bool {
        self.children().next().is_none()
    }

    /// Direct children, in order.
    fn children(&self) -> impl Iterator<Item = Self> + '_;

    /// Ancestors, nearest first.
    fn ancestors(&self) -> impl Iterator<Item = Self> + '_;

    /// The other children of this node's parent.
    fn siblings(&self) -> impl Iterator<Item = Self> + '_;

    fn next_focus(&self) -> impl Iterator<Item = Self> + '_ {
        std::iter::empty()
    }

    fn prev_focus(&self) -> impl Iterator<Item = Self> + '_ {
        std::iter::empty()
    }

    /// A dynamic property value, `None` when it is absent or unresolvable.
    fn property(&self, name: &str) -> Option<Value>;

    /// Whether the property has a statically known value.
    fn is_property_resolved(&self, name: &str) -> bool;
}
