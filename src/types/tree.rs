use std::collections::BTreeMap;

use super::context::Context;
use super::value::Value;

/// An owned widget description, assembled with builder methods and then
/// frozen into a [`WidgetTree`].
///
/// ```
/// use a11yql::WidgetNode;
///
/// let form = WidgetNode::new("column", "Column")
///     .child(WidgetNode::new("textField", "TextField").focusable(true).set("label", "Email"))
///     .child(WidgetNode::new("button", "ElevatedButton").focusable(true).tap(true));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetNode {
    role: String,
    widget_type: String,
    focusable: bool,
    enabled: bool,
    hidden: bool,
    checked: bool,
    toggled: bool,
    merges_descendants: bool,
    tap: bool,
    long_press: bool,
    properties: BTreeMap<String, Value>,
    children: Vec<WidgetNode>,
}

impl WidgetNode {
    /// A visible, enabled, non-focusable node without properties.
    #[must_use]
    pub fn new(role: &str, widget_type: &str) -> Self {
        Self {
            role: role.to_owned(),
            widget_type: widget_type.to_owned(),
            focusable: false,
            enabled: true,
            hidden: false,
            checked: false,
            toggled: false,
            merges_descendants: false,
            tap: false,
            long_press: false,
            properties: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn focusable(mut self, yes: bool) -> Self {
        self.focusable = yes;
        self
    }

    #[must_use]
    pub fn enabled(mut self, yes: bool) -> Self {
        self.enabled = yes;
        self
    }

    #[must_use]
    pub fn hidden(mut self, yes: bool) -> Self {
        self.hidden = yes;
        self
    }

    #[must_use]
    pub fn checked(mut self, yes: bool) -> Self {
        self.checked = yes;
        self
    }

    #[must_use]
    pub fn toggled(mut self, yes: bool) -> Self {
        self.toggled = yes;
        self
    }

    #[must_use]
    pub fn merges_descendants(mut self, yes: bool) -> Self {
        self.merges_descendants = yes;
        self
    }

    #[must_use]
    pub fn tap(mut self, yes: bool) -> Self {
        self.tap = yes;
        self
    }

    #[must_use]
    pub fn long_press(mut self, yes: bool) -> Self {
        self.long_press = yes;
        self
    }

    /// Set a dynamic property. Setting `Value::Null` records the property as
    /// present but unresolved.
    #[must_use]
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(name.to_owned(), value.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: WidgetNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = WidgetNode>) -> Self {
        self.children.extend(children);
        self
    }
}

#[derive(Debug, Clone)]
struct Slot {
    node: WidgetNode,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// A frozen widget tree stored as a flat arena in depth-first pre-order.
///
/// Nodes are addressed by their pre-order index; index `0` is the root.
#[derive(Debug, Clone)]
pub struct WidgetTree {
    slots: Vec<Slot>,
}

#[allow(clippy::len_without_is_empty)]
impl WidgetTree {
    #[must_use]
    pub fn new(root: WidgetNode) -> Self {
        let mut tree = Self { slots: Vec::new() };
        tree.flatten(root, None);
        tree
    }

    fn flatten(&mut self, mut node: WidgetNode, parent: Option<usize>) -> usize {
        let index = self.slots.len();
        let children = std::mem::take(&mut node.children);
        self.slots.push(Slot {
            node,
            parent,
            children: Vec::with_capacity(children.len()),
        });
        for child in children {
            let child_index = self.flatten(child, Some(index));
            self.slots[index].children.push(child_index);
        }
        index
    }

    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            index: 0,
        }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<NodeRef<'_>> {
        (index < self.slots.len()).then_some(NodeRef { tree: self, index })
    }

    /// Every node in depth-first pre-order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
        (0..self.slots.len()).map(move |index| NodeRef { tree: self, index })
    }

    /// The number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }
}

/// A cheap handle to one node of a [`WidgetTree`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a WidgetTree,
    index: usize,
}

impl<'a> NodeRef<'a> {
    /// Pre-order index of this node in its tree.
    #[must_use]
    pub fn index(self) -> usize {
        self.index
    }

    #[must_use]
    pub fn parent(self) -> Option<NodeRef<'a>> {
        self.slot().parent.map(|index| self.at(index))
    }

    fn slot(self) -> &'a Slot {
        &self.tree.slots[self.index]
    }

    fn widget(self) -> &'a WidgetNode {
        &self.slot().node
    }

    fn at(self, index: usize) -> NodeRef<'a> {
        NodeRef {
            tree: self.tree,
            index,
        }
    }

    fn child_refs(self) -> impl Iterator<Item = NodeRef<'a>> {
        self.slot().children.iter().map(move |&index| self.at(index))
    }

    fn is_focus_stop(self) -> bool {
        let widget = self.widget();
        widget.focusable && !widget.hidden
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for NodeRef<'_> {}

impl Context for NodeRef<'_> {
    fn role(&self) -> &str {
        &self.widget().role
    }

    fn widget_type(&self) -> &str {
        &self.widget().widget_type
    }

    fn is_focusable(&self) -> bool {
        self.widget().focusable
    }

    fn is_enabled(&self) -> bool {
        self.widget().enabled
    }

    fn is_hidden(&self) -> bool {
        self.widget().hidden
    }

    fn is_checked(&self) -> bool {
        self.widget().checked
    }

    fn is_toggled(&self) -> bool {
        self.widget().toggled
    }

    fn merges_descendants(&self) -> bool {
        self.widget().merges_descendants
    }

    fn has_tap(&self) -> bool {
        self.widget().tap
    }

    fn has_long_press(&self) -> bool {
        self.widget().long_press
    }

    fn is_empty(&self) -> bool {
        self.slot().children.is_empty()
    }

    fn children(&self) -> impl Iterator<Item = Self> + '_ {
        self.child_refs()
    }

    fn ancestors(&self) -> impl Iterator<Item = Self> + '_ {
        std::iter::successors(self.parent(), |node| node.parent())
    }

    fn siblings(&self) -> impl Iterator<Item = Self> + '_ {
        let index = self.index;
        self.parent()
            .into_iter()
            .flat_map(NodeRef::child_refs)
            .filter(move |node| node.index != index)
    }

    /// The next focusable, visible node in pre-order, if any.
    fn next_focus(&self) -> impl Iterator<Item = Self> + '_ {
        (self.index + 1..self.tree.len())
            .map(|index| self.at(index))
            .find(|node| node.is_focus_stop())
            .into_iter()
    }

    /// The previous focusable, visible node in pre-order, if any.
    fn prev_focus(&self) -> impl Iterator<Item = Self> + '_ {
        (0..self.index)
            .rev()
            .map(|index| self.at(index))
            .find(|node| node.is_focus_stop())
            .into_iter()
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.widget()
            .properties
            .get(name)
            .filter(|value| !value.is_null())
            .cloned()
    }

    fn is_property_resolved(&self, name: &str) -> bool {
        self.widget()
            .properties
            .get(name)
            .is_some_and(|value| !value.is_null())
    }
}
