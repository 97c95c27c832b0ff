#![forbid(unsafe_code)]

//! Static composite.

use crate::node::{AnyView, NodeId, Reconciler, View};

/// A fixed list of views contributing their controls in order.
///
/// A group owns no control: its children's controls are placed directly in
/// the nearest enclosing container.
#[derive(Clone, Default)]
pub struct Group {
    children: Vec<AnyView>,
}

impl Group {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a child view.
    pub fn child(mut self, view: impl View) -> Self {
        self.children.push(view.into_any());
        self
    }

    /// Append an already shared child view.
    pub fn child_any(mut self, view: AnyView) -> Self {
        self.children.push(view);
        self
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the group has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl FromIterator<AnyView> for Group {
    fn from_iter<I: IntoIterator<Item = AnyView>>(iter: I) -> Self {
        Self {
            children: iter.into_iter().collect(),
        }
    }
}

impl View for Group {
    fn build_node(&self, rec: &mut Reconciler, node: NodeId) {
        for (index, child) in self.children.iter().enumerate() {
            rec.add_node(node, index, child.clone());
        }
    }

    fn update_node(&self, rec: &mut Reconciler, node: NodeId) {
        rec.reconcile_children(node, &self.children);
    }
}
