#![forbid(unsafe_code)]

//! Dynamic composite over a list of items.

use std::rc::Rc;

use crate::node::{AnyView, NodeId, Reconciler, View};

/// One child view per item, made by a shared mapping function.
///
/// Items are matched to existing children by position: when the list grows
/// the new tail is built and its controls inserted after the existing ones,
/// and when it shrinks the surplus tail is removed.
pub struct ForEach<T> {
    items: Vec<T>,
    make: Rc<dyn Fn(&T) -> AnyView>,
}

impl<T> Clone for ForEach<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            make: Rc::clone(&self.make),
        }
    }
}

impl<T: 'static> ForEach<T> {
    /// Map `items` to views with `make`.
    pub fn new<V, F>(items: impl IntoIterator<Item = T>, make: F) -> Self
    where
        V: View,
        F: Fn(&T) -> V + 'static,
    {
        Self {
            items: items.into_iter().collect(),
            make: Rc::new(move |item: &T| make(item).into_any()),
        }
    }

    /// Reuse the mapping function of `self` for a new list of items.
    pub fn with_items(&self, items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
            make: Rc::clone(&self.make),
        }
    }

    /// The items.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    fn views(&self) -> Vec<AnyView> {
        self.items.iter().map(|item| (self.make)(item)).collect()
    }
}

impl<T: 'static> View for ForEach<T> {
    fn build_node(&self, rec: &mut Reconciler, node: NodeId) {
        for (index, view) in self.views().into_iter().enumerate() {
            rec.add_node(node, index, view);
        }
    }

    fn update_node(&self, rec: &mut Reconciler, node: NodeId) {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            items = self.items.len(),
            children = rec.children(node).len(),
            "for_each update"
        );
        rec.reconcile_children(node, &self.views());
    }
}
