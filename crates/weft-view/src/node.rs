#![forbid(unsafe_code)]

//! Node reconciler: view descriptions to a persistent control tree.
//!
//! A [`View`] is an immutable description, rebuilt by the application on
//! every pass and shared as [`AnyView`]. The [`Reconciler`] keeps a tree of
//! nodes mirroring the descriptions and, through each view's hooks, the
//! [`ControlTree`] they produce.
//!
//! Views come in three shapes, told apart only by what they do in their
//! hooks:
//!
//! - **Primitives** own one control ([`Reconciler::set_control`]) and
//!   contribute exactly that control.
//! - **Composites** own no control and contribute their children's controls,
//!   concatenated in order.
//! - **Modifiers** own no control, have one child, and may wrap each control
//!   that child contributes ([`View::pass_control`], [`Reconciler::wrap`]).
//!
//! When a composite's child list changes during an update, the affected
//! controls are announced to the nearest ancestor that owns a control, with
//! the index shifted past preceding siblings, through
//! [`View::insert_control`] and [`View::remove_control`]. Top-level controls
//! are attached to the control tree's root.

use std::any::TypeId;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;
use weft_core::geometry::Size;

use crate::control::{ControlBehavior, ControlId, ControlTree};

/// Shared, type-erased view description.
pub type AnyView = Rc<dyn View>;

/// Handle to a node in a [`Reconciler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Errors from reconciling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// The new description is a different kind of view than the node holds.
    StructuralMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// The node does not exist (destroyed or never created).
    UnknownNode(NodeId),
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuralMismatch { expected, found } => {
                write!(f, "cannot update {expected} node with {found}")
            }
            Self::UnknownNode(id) => write!(f, "unknown node {}", id.0),
        }
    }
}

impl std::error::Error for ReconcileError {}

/// An immutable view description.
///
/// `build_node` and `update_node` are required; the remaining hooks default
/// to doing nothing, which is right for leaves and plain composites.
pub trait View: 'static {
    /// Populate a freshly created node: add child nodes, create the control.
    fn build_node(&self, rec: &mut Reconciler, node: NodeId);

    /// Bring a node built from an earlier description of the same type up to
    /// date with `self`. The node already holds `self`.
    fn update_node(&self, rec: &mut Reconciler, node: NodeId);

    /// After building: attach the controls of child nodes to this node's
    /// control.
    fn load_data(&self, _rec: &mut Reconciler, _node: NodeId) {}

    /// A control contributed by this node's children appeared at `index`.
    fn insert_control(&self, _rec: &mut Reconciler, _node: NodeId, _index: usize) {}

    /// The control contributed by this node's children at `index` is going
    /// away.
    fn remove_control(&self, _rec: &mut Reconciler, _node: NodeId, _index: usize) {}

    /// Map a control contributed by this node's children before it is handed
    /// to an ancestor.
    fn pass_control(&self, _rec: &mut Reconciler, _node: NodeId, control: ControlId) -> ControlId {
        control
    }

    /// Name of the concrete view type, for errors and logs.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Identity of the concrete view type. Updates require a match.
    fn view_type(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// Erase into an [`AnyView`].
    fn into_any(self) -> AnyView
    where
        Self: Sized,
    {
        Rc::new(self)
    }
}

struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    view: AnyView,
    control: Option<ControlId>,
    /// `(wrapped, wrapper)` pairs made by [`Reconciler::wrap`].
    wrappers: SmallVec<[(ControlId, ControlId); 1]>,
}

/// Node arena plus the control tree it drives.
pub struct Reconciler {
    nodes: Vec<Option<Node>>,
    free: Vec<u32>,
    root: Option<NodeId>,
    controls: ControlTree,
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("nodes", &self.len())
            .field("root", &self.root)
            .field("controls", &self.controls)
            .finish()
    }
}

impl Reconciler {
    /// Create a reconciler driving `controls`.
    pub fn new(controls: ControlTree) -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            controls,
        }
    }

    /// Create a reconciler over a headless control tree of `size`.
    pub fn headless(size: Size) -> Self {
        Self::new(ControlTree::headless(size))
    }

    /// The control tree.
    #[inline]
    pub fn controls(&self) -> &ControlTree {
        &self.controls
    }

    /// The control tree, mutably.
    #[inline]
    pub fn controls_mut(&mut self) -> &mut ControlTree {
        &mut self.controls
    }

    /// The root node, once [`set_root`](Self::set_root) has run.
    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Whether no nodes exist.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` addresses a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.index()), Some(Some(_)))
    }

    fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("stale node id {id:?}"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("stale node id {id:?}"),
        }
    }

    /// Parent of `id`; `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Children of `id` in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// The `index`-th child of `id`.
    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.node(id).children.get(index).copied()
    }

    /// The description `id` currently holds.
    pub fn view(&self, id: NodeId) -> &AnyView {
        &self.node(id).view
    }

    /// The control `id` owns, if it is a primitive.
    pub fn control(&self, id: NodeId) -> Option<ControlId> {
        self.node(id).control
    }

    /// Wrapper controls `id` has made, in creation order.
    pub fn wrappers(&self, id: NodeId) -> Vec<ControlId> {
        self.node(id).wrappers.iter().map(|&(_, w)| w).collect()
    }

    fn alloc(&mut self, parent: Option<NodeId>, view: AnyView) -> NodeId {
        let node = Node {
            parent,
            children: Vec::new(),
            view,
            control: None,
            wrappers: SmallVec::new(),
        };
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx as usize] = Some(node);
                NodeId(idx)
            }
            None => {
                let idx = self.nodes.len() as u32;
                self.nodes.push(Some(node));
                NodeId(idx)
            }
        }
    }

    fn build(&mut self, id: NodeId, view: &AnyView) {
        view.build_node(self, id);
        view.load_data(self, id);
    }

    // =========================================================================
    // Building (called from view hooks)
    // =========================================================================

    /// Create and build a child of `parent` at `index` (clamped).
    ///
    /// Used while building. Nothing is announced to ancestors: containers
    /// pick up their content's controls in [`View::load_data`].
    pub fn add_node(&mut self, parent: NodeId, index: usize, view: AnyView) -> NodeId {
        let id = self.alloc(Some(parent), view.clone());
        let siblings = &mut self.node_mut(parent).children;
        let index = index.min(siblings.len());
        siblings.insert(index, id);
        self.build(id, &view);
        id
    }

    /// Give `node` its control.
    pub fn set_control(&mut self, node: NodeId, behavior: Box<dyn ControlBehavior>) -> ControlId {
        let control = self.controls.create(behavior);
        self.node_mut(node).control = Some(control);
        control
    }

    /// The wrapper `node` made around `inner`, creating it with `make` on
    /// first use.
    ///
    /// A new wrapper gets `inner` as its only child.
    pub fn wrap<F>(&mut self, node: NodeId, inner: ControlId, make: F) -> ControlId
    where
        F: FnOnce() -> Box<dyn ControlBehavior>,
    {
        if let Some(&(_, wrapper)) = self.node(node).wrappers.iter().find(|(i, _)| *i == inner) {
            return wrapper;
        }
        let wrapper = self.controls.create(make());
        self.controls.add_child(wrapper, inner, 0);
        self.node_mut(node).wrappers.push((inner, wrapper));
        wrapper
    }

    // =========================================================================
    // Control production
    // =========================================================================

    /// Number of controls `node` contributes to its nearest control-owning
    /// ancestor.
    pub fn size(&self, node: NodeId) -> usize {
        if self.node(node).control.is_some() {
            1
        } else {
            self.content_size(node)
        }
    }

    /// Number of controls `node`'s children contribute, ignoring any control
    /// `node` owns itself.
    pub fn content_size(&self, node: NodeId) -> usize {
        self.node(node).children.iter().map(|&c| self.size(c)).sum()
    }

    /// The `index`-th control `node` contributes.
    ///
    /// Modifiers on the way map the control through [`View::pass_control`].
    pub fn control_at(&mut self, node: NodeId, index: usize) -> Option<ControlId> {
        match self.node(node).control {
            Some(control) => (index == 0).then_some(control),
            None => self.content_control(node, index),
        }
    }

    /// The `index`-th control contributed by `node`'s children.
    ///
    /// Containers use this to find the control announced by
    /// [`View::insert_control`] and to collect their content in
    /// [`View::load_data`].
    pub fn content_control(&mut self, node: NodeId, index: usize) -> Option<ControlId> {
        let mut offset = index;
        let children = self.node(node).children.clone();
        for child in children {
            let size = self.size(child);
            if offset < size {
                let inner = self.control_at(child, offset)?;
                let view = self.node(node).view.clone();
                return Some(view.pass_control(self, node, inner));
            }
            offset -= size;
        }
        None
    }

    /// Every control contributed by `node`'s children, in order.
    pub fn content_controls(&mut self, node: NodeId) -> Vec<ControlId> {
        (0..self.content_size(node))
            .filter_map(|index| self.content_control(node, index))
            .collect()
    }

    fn offset_of(&self, parent: NodeId, child: NodeId) -> usize {
        self.node(parent)
            .children
            .iter()
            .take_while(|&&c| c != child)
            .map(|&c| self.size(c))
            .sum()
    }

    fn propagate_insert(&mut self, origin: NodeId, index: usize) {
        let (mut node, mut index) = (origin, index);
        loop {
            if self.node(node).control.is_some() {
                let view = self.node(node).view.clone();
                view.insert_control(self, node, index);
                return;
            }
            match self.node(node).parent {
                Some(parent) => {
                    index += self.offset_of(parent, node);
                    node = parent;
                }
                None => {
                    if let Some(control) = self.control_at(node, index) {
                        let root = self.controls.root();
                        self.controls.add_child(root, control, index);
                    }
                    return;
                }
            }
        }
    }

    fn propagate_remove(&mut self, origin: NodeId, index: usize) {
        let (mut node, mut index) = (origin, index);
        // Modifier nodes passed on the way up, innermost first.
        let mut modifiers: SmallVec<[NodeId; 4]> = SmallVec::new();
        loop {
            if let Some(container) = self.node(node).control {
                let removed = self.controls.children(container).get(index).copied();
                let view = self.node(node).view.clone();
                view.remove_control(self, node, index);
                if let Some(removed) = removed {
                    self.release_wrappers(&modifiers, removed);
                }
                return;
            }
            if !self.node(node).wrappers.is_empty() {
                modifiers.push(node);
            }
            match self.node(node).parent {
                Some(parent) => {
                    index += self.offset_of(parent, node);
                    node = parent;
                }
                None => {
                    let root = self.controls.root();
                    if let Some(removed) = self.controls.remove_child(root, index) {
                        self.release_wrappers(&modifiers, removed);
                    }
                    return;
                }
            }
        }
    }

    /// Destroy the wrappers around a control that left its container.
    ///
    /// `removed` is the outermost wrapper; each level is unwrapped in turn.
    /// Wrapped controls stay alive; their own nodes destroy them.
    fn release_wrappers(&mut self, modifiers: &[NodeId], removed: ControlId) {
        let mut current = removed;
        for &modifier in modifiers.iter().rev() {
            let wrappers = &mut self.node_mut(modifier).wrappers;
            let Some(pos) = wrappers.iter().position(|&(_, w)| w == current) else {
                continue;
            };
            let (inner, wrapper) = wrappers.remove(pos);
            self.controls.remove_child(wrapper, 0);
            self.controls.destroy(wrapper);
            current = inner;
        }
    }

    // =========================================================================
    // Updating
    // =========================================================================

    /// Install `view` as the root description.
    ///
    /// A root of the same view type is updated in place. Otherwise the old
    /// tree is destroyed and a new one built, and its controls are attached to
    /// the control tree's root.
    pub fn set_root(&mut self, view: AnyView) -> NodeId {
        if let Some(root) = self.root {
            if self.node(root).view.view_type() == view.view_type() {
                self.apply(root, view);
                return root;
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(
                from = self.node(root).view.type_name(),
                to = view.type_name(),
                "rebuilding root"
            );
            self.destroy_node(root);
        }

        let id = self.alloc(None, view.clone());
        self.root = Some(id);
        self.build(id, &view);
        for index in 0..self.size(id) {
            if let Some(control) = self.control_at(id, index) {
                let root = self.controls.root();
                self.controls.add_child(root, control, index);
            }
        }
        id
    }

    /// Update `node` with a new description of the same view type.
    ///
    /// # Errors
    ///
    /// [`ReconcileError::StructuralMismatch`] if `view` is a different type
    /// than the node holds, [`ReconcileError::UnknownNode`] if `node` does
    /// not exist. The tree is left untouched in both cases.
    pub fn update(&mut self, node: NodeId, view: AnyView) -> Result<(), ReconcileError> {
        if !self.contains(node) {
            return Err(ReconcileError::UnknownNode(node));
        }
        let current = &self.node(node).view;
        if current.view_type() != view.view_type() {
            return Err(ReconcileError::StructuralMismatch {
                expected: current.type_name(),
                found: view.type_name(),
            });
        }
        self.apply(node, view);
        Ok(())
    }

    fn apply(&mut self, node: NodeId, view: AnyView) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("reconcile", view = view.type_name()).entered();
        self.node_mut(node).view = view.clone();
        view.update_node(self, node);
    }

    /// Reconcile the `index`-th child of `node` against `view`.
    ///
    /// A child of the same view type is updated; a child of another type is
    /// replaced; a missing child is inserted.
    pub fn update_child(&mut self, node: NodeId, index: usize, view: AnyView) {
        match self.child(node, index) {
            Some(child) if self.node(child).view.view_type() == view.view_type() => {
                self.apply(child, view);
            }
            Some(_) => {
                self.remove_child(node, index);
                self.insert_child(node, index, view);
            }
            None => {
                self.insert_child(node, index, view);
            }
        }
    }

    /// Reconcile all children of `node` against `views`, position by
    /// position.
    ///
    /// Surplus children are removed from the end, missing ones appended.
    pub fn reconcile_children(&mut self, node: NodeId, views: &[AnyView]) {
        while self.node(node).children.len() > views.len() {
            let last = self.node(node).children.len() - 1;
            self.remove_child(node, last);
        }
        for (index, view) in views.iter().enumerate() {
            self.update_child(node, index, view.clone());
        }
    }

    /// Build a new child of `node` at `index` and announce its controls.
    pub fn insert_child(&mut self, node: NodeId, index: usize, view: AnyView) -> NodeId {
        let child = self.add_node(node, index, view);
        let offset = self.offset_of(node, child);
        for k in 0..self.size(child) {
            self.propagate_insert(node, offset + k);
        }
        child
    }

    /// Withdraw the controls of `node`'s `index`-th child and destroy it.
    pub fn remove_child(&mut self, node: NodeId, index: usize) {
        let Some(child) = self.child(node, index) else {
            return;
        };
        let offset = self.offset_of(node, child);
        for k in (0..self.size(child)).rev() {
            self.propagate_remove(node, offset + k);
        }
        self.node_mut(node).children.remove(index);
        self.destroy_node(child);
    }

    /// Destroy `id`, its descendants, and every control they own.
    fn destroy_node(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.destroy_node(child);
        }
        let Some(node) = self.nodes[id.index()].take() else {
            return;
        };
        self.free.push(id.0);
        if self.root == Some(id) {
            self.root = None;
        }
        // Wrapped controls went with the children, so wrappers are empty now.
        for (_, wrapper) in node.wrappers {
            self.controls.destroy(wrapper);
        }
        if let Some(control) = node.control {
            self.controls.destroy(control);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlBehavior;
    use weft_core::geometry::Size;

    struct Leaf;

    impl ControlBehavior for Leaf {
        fn size(&self, _tree: &ControlTree, _id: ControlId, _proposed: Size) -> Size {
            Size::new(1, 1)
        }
    }

    struct Dot;

    impl View for Dot {
        fn build_node(&self, rec: &mut Reconciler, node: NodeId) {
            rec.set_control(node, Box::new(Leaf));
        }

        fn update_node(&self, _rec: &mut Reconciler, _node: NodeId) {}
    }

    struct Many(Vec<AnyView>);

    impl View for Many {
        fn build_node(&self, rec: &mut Reconciler, node: NodeId) {
            for (i, view) in self.0.iter().enumerate() {
                rec.add_node(node, i, view.clone());
            }
        }

        fn update_node(&self, rec: &mut Reconciler, node: NodeId) {
            rec.reconcile_children(node, &self.0);
        }
    }

    fn dots(n: usize) -> AnyView {
        Many((0..n).map(|_| Dot.into_any()).collect()).into_any()
    }

    #[test]
    fn composite_contributes_children_controls() {
        let mut rec = Reconciler::headless(Size::new(10, 10));
        let root = rec.set_root(dots(3));
        assert_eq!(rec.size(root), 3);
        assert_eq!(rec.len(), 4);
        let top = rec.controls().root();
        assert_eq!(rec.controls().children(top).len(), 3);
        for i in 0..3 {
            let child = rec.child(root, i).unwrap();
            assert_eq!(rec.control_at(root, i), rec.control(child));
        }
        assert_eq!(rec.control_at(root, 3), None);
    }

    #[test]
    fn growing_and_shrinking_tracks_control_order() {
        let mut rec = Reconciler::headless(Size::new(10, 10));
        let root = rec.set_root(dots(2));
        let top = rec.controls().root();
        let before: Vec<_> = rec.controls().children(top).to_vec();

        rec.update(root, dots(4)).unwrap();
        let grown = rec.controls().children(top).to_vec();
        assert_eq!(grown.len(), 4);
        assert_eq!(&grown[..2], before.as_slice());

        rec.update(root, dots(1)).unwrap();
        assert_eq!(rec.controls().children(top), &before[..1]);
        assert_eq!(rec.len(), 2);
        assert_eq!(rec.controls().len(), 2);
    }

    #[test]
    fn nested_composites_offset_indices() {
        let mut rec = Reconciler::headless(Size::new(10, 10));
        let tree = |inner: usize| Many(vec![dots(2), dots(inner), dots(1)]).into_any();
        let root = rec.set_root(tree(1));
        let top = rec.controls().root();
        let last = rec.controls().children(top)[3];

        rec.update(root, tree(3)).unwrap();
        let children = rec.controls().children(top).to_vec();
        assert_eq!(children.len(), 6);
        assert_eq!(children[5], last);
        for i in 0..6 {
            assert_eq!(rec.control_at(root, i), Some(children[i]));
        }
    }

    #[test]
    fn mismatched_update_is_rejected() {
        let mut rec = Reconciler::headless(Size::new(10, 10));
        let root = rec.set_root(dots(2));
        let err = rec.update(root, Dot.into_any()).unwrap_err();
        assert!(matches!(err, ReconcileError::StructuralMismatch { .. }));
        assert!(err.to_string().contains("Dot"));
        assert_eq!(rec.size(root), 2);
    }

    #[test]
    fn mismatched_child_is_replaced() {
        let mut rec = Reconciler::headless(Size::new(10, 10));
        let root = rec.set_root(Many(vec![Dot.into_any(), Dot.into_any()]).into_any());
        let top = rec.controls().root();
        let first = rec.controls().children(top)[0];

        rec.update(root, Many(vec![Dot.into_any(), dots(2)]).into_any())
            .unwrap();
        let children = rec.controls().children(top).to_vec();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0], first);
        assert_eq!(rec.size(root), 3);
    }

    #[test]
    fn set_root_with_new_type_rebuilds() {
        let mut rec = Reconciler::headless(Size::new(10, 10));
        rec.set_root(dots(3));
        let root = rec.set_root(Dot.into_any());
        assert_eq!(rec.len(), 1);
        assert_eq!(rec.controls().len(), 2);
        let top = rec.controls().root();
        assert_eq!(rec.controls().children(top), &[rec.control(root).unwrap()]);
    }

    #[test]
    fn unknown_node_is_reported() {
        let mut rec = Reconciler::headless(Size::new(10, 10));
        let root = rec.set_root(dots(1));
        let child = rec.child(root, 0).unwrap();
        rec.update(root, dots(0)).unwrap();
        assert_eq!(
            rec.update(child, Dot.into_any()),
            Err(ReconcileError::UnknownNode(child))
        );
    }
}
