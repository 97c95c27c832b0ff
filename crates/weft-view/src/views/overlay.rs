#![forbid(unsafe_code)]

//! Z-stacked container.

use weft_core::geometry::{Rect, Size};

use crate::alignment::Alignment;
use crate::control::{ControlBehavior, ControlId, ControlTree, Direction};
use crate::node::{AnyView, NodeId, Reconciler, View};

/// Children stacked on top of each other, each aligned within the overlay.
///
/// The last declared child is on top.
#[derive(Clone, Default)]
pub struct Overlay {
    alignment: Alignment,
    children: Vec<AnyView>,
}

impl Overlay {
    /// An empty stack placing each child by `alignment`.
    pub fn new(alignment: Alignment) -> Self {
        Self {
            alignment,
            children: Vec::new(),
        }
    }

    /// Stack a view on top of the existing children.
    pub fn child(mut self, view: impl View) -> Self {
        self.children.push(view.into_any());
        self
    }

    /// Stack an already shared view on top of the existing children.
    pub fn child_any(mut self, view: AnyView) -> Self {
        self.children.push(view);
        self
    }

    /// How children are placed inside the overlay.
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }
}

impl View for Overlay {
    fn build_node(&self, rec: &mut Reconciler, node: NodeId) {
        for (index, child) in self.children.iter().enumerate() {
            rec.add_node(node, index, child.clone());
        }
        rec.set_control(node, Box::new(OverlayControl::new(self.alignment)));
    }

    fn update_node(&self, rec: &mut Reconciler, node: NodeId) {
        if let Some(control) = rec.control(node) {
            let behavior = Box::new(OverlayControl::new(self.alignment));
            rec.controls_mut().set_behavior(control, behavior);
        }
        rec.reconcile_children(node, &self.children);
    }

    fn load_data(&self, rec: &mut Reconciler, node: NodeId) {
        let Some(control) = rec.control(node) else {
            return;
        };
        for (index, child) in rec.content_controls(node).into_iter().enumerate() {
            rec.controls_mut().add_child(control, child, index);
        }
    }

    fn insert_control(&self, rec: &mut Reconciler, node: NodeId, index: usize) {
        let Some(control) = rec.control(node) else {
            return;
        };
        if let Some(child) = rec.content_control(node, index) {
            rec.controls_mut().add_child(control, child, index);
        }
    }

    fn remove_control(&self, rec: &mut Reconciler, node: NodeId, index: usize) {
        if let Some(control) = rec.control(node) {
            rec.controls_mut().remove_child(control, index);
        }
    }
}

/// Places every child by alignment and searches focus in stacking order.
pub(crate) struct OverlayControl {
    alignment: Alignment,
}

impl OverlayControl {
    pub(crate) fn new(alignment: Alignment) -> Self {
        Self { alignment }
    }
}

impl ControlBehavior for OverlayControl {
    fn size(&self, tree: &ControlTree, id: ControlId, proposed: Size) -> Size {
        tree.children(id)
            .iter()
            .fold(Size::ZERO, |acc, &child| acc.max(tree.size(child, proposed)))
    }

    fn place_children(&self, tree: &ControlTree, id: ControlId, size: Size) -> Vec<Rect> {
        tree.children(id)
            .iter()
            .map(|&child| self.alignment.place(tree.size(child, size), size))
            .collect()
    }

    fn selectable_element(
        &self,
        tree: &ControlTree,
        id: ControlId,
        direction: Direction,
        from: usize,
    ) -> Option<ControlId> {
        let local = match direction {
            Direction::Down | Direction::Left => tree.search_forward(id, from),
            Direction::Up | Direction::Right => tree.search_backward(id, from),
        };
        local.or_else(|| tree.bubble_selection(id, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{Selectable, Text};
    use weft_core::geometry::Point;

    #[test]
    fn size_is_bounding_size_of_children() {
        let mut rec = Reconciler::headless(Size::new(20, 5));
        let overlay = Overlay::new(Alignment::CENTER)
            .child(Text::new("wide label"))
            .child(Text::new("x"));
        let root = rec.set_root(overlay.into_any());
        let control = rec.control(root).unwrap();
        assert_eq!(rec.controls().size(control, Size::new(20, 5)), Size::new(10, 1));
        assert_eq!(rec.controls().size(control, Size::new(4, 5)), Size::new(4, 1));
    }

    #[test]
    fn children_are_aligned_and_stacked() {
        let mut rec = Reconciler::headless(Size::new(7, 3));
        let overlay = Overlay::new(Alignment::CENTER)
            .child(Text::new("abcde"))
            .child(Text::new("X"));
        let root = rec.set_root(overlay.into_any());
        rec.controls_mut().layout_root();

        let control = rec.control(root).unwrap();
        let children = rec.controls().children(control).to_vec();
        assert_eq!(rec.controls().frame(control), Rect::new(0, 0, 5, 1));
        assert_eq!(rec.controls().frame(children[0]), Rect::new(0, 0, 5, 1));
        assert_eq!(rec.controls().frame(children[1]), Rect::new(2, 0, 1, 1));
        assert_eq!(rec.controls().compose(Point::new(2, 0)).map(|c| c.ch), Some('X'));
        assert_eq!(rec.controls().compose(Point::new(1, 0)).map(|c| c.ch), Some('b'));
    }

    #[test]
    fn selection_follows_stacking_order() {
        let mut rec = Reconciler::headless(Size::new(10, 3));
        let overlay = Overlay::new(Alignment::TOP_LEADING)
            .child(Selectable::new("a"))
            .child(Text::new("-"))
            .child(Selectable::new("c"));
        let root = rec.set_root(overlay.into_any());
        let control = rec.control(root).unwrap();
        let children = rec.controls().children(control).to_vec();
        let (a, c) = (children[0], children[2]);

        let tree = rec.controls_mut();
        assert_eq!(tree.move_focus(Direction::Down), Some(a));
        assert_eq!(tree.move_focus(Direction::Left), Some(c));
        assert_eq!(tree.move_focus(Direction::Right), Some(a));
        assert_eq!(tree.move_focus(Direction::Up), None);
        assert_eq!(tree.focused(), Some(a));
        assert_eq!(tree.move_focus(Direction::Down), Some(c));
        assert_eq!(tree.move_focus(Direction::Down), None);
    }
}
