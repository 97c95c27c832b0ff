#![forbid(unsafe_code)]

//! Background fill modifier.

use weft_core::geometry::{Point, Rect, Size};
use weft_render::{Cell, Color};

use crate::control::{ControlBehavior, ControlId, ControlTree};
use crate::node::{AnyView, NodeId, Reconciler, View};

/// Fills the area behind each control of its content with a color.
///
/// Every control the content contributes is wrapped in a decorating control
/// of the same size, so a content of several controls gets several fills.
#[derive(Clone)]
pub struct Background {
    color: Color,
    content: AnyView,
}

impl Background {
    /// Fill `content`'s frame with `color` behind it.
    pub fn new(color: Color, content: impl View) -> Self {
        Self::with_any(color, content.into_any())
    }

    /// [`new`](Self::new) with an already shared view.
    pub fn with_any(color: Color, content: AnyView) -> Self {
        Self { color, content }
    }

    /// The fill color.
    pub fn color(&self) -> Color {
        self.color
    }
}

impl View for Background {
    fn build_node(&self, rec: &mut Reconciler, node: NodeId) {
        rec.add_node(node, 0, self.content.clone());
    }

    fn update_node(&self, rec: &mut Reconciler, node: NodeId) {
        rec.update_child(node, 0, self.content.clone());
        for wrapper in rec.wrappers(node) {
            rec.controls_mut()
                .set_behavior(wrapper, Box::new(BackgroundControl { color: self.color }));
        }
    }

    fn pass_control(&self, rec: &mut Reconciler, node: NodeId, control: ControlId) -> ControlId {
        let color = self.color;
        rec.wrap(node, control, || Box::new(BackgroundControl { color }))
    }
}

/// Sizes itself like its only child and fills its frame.
pub(crate) struct BackgroundControl {
    color: Color,
}

impl ControlBehavior for BackgroundControl {
    fn size(&self, tree: &ControlTree, id: ControlId, proposed: Size) -> Size {
        tree.children(id)
            .first()
            .map_or(Size::ZERO, |&child| tree.size(child, proposed))
    }

    fn place_children(&self, tree: &ControlTree, id: ControlId, size: Size) -> Vec<Rect> {
        tree.children(id)
            .iter()
            .map(|_| Rect::from_size(size))
            .collect()
    }

    fn cell(&self, _at: Point) -> Option<Cell> {
        Some(Cell::fill(self.color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{Group, Text};

    #[test]
    fn wraps_content_and_fills_behind_text() {
        let mut rec = Reconciler::headless(Size::new(6, 1));
        let root = rec.set_root(Background::new(Color::BLUE, Text::new("hi")).into_any());
        rec.controls_mut().layout_root();

        let wrappers = rec.wrappers(root);
        assert_eq!(wrappers.len(), 1);
        let top = rec.controls().root();
        assert_eq!(rec.controls().children(top), wrappers.as_slice());
        assert_eq!(rec.controls().frame(wrappers[0]), Rect::new(0, 0, 2, 1));

        let cell = rec.controls().compose(Point::new(1, 0)).unwrap();
        assert_eq!(cell.ch, 'i');
        assert_eq!(cell.bg, Some(Color::BLUE));
        assert_eq!(rec.controls().compose(Point::new(2, 0)), None);
    }

    #[test]
    fn each_content_control_gets_its_own_fill() {
        let mut rec = Reconciler::headless(Size::new(6, 2));
        let content = Group::new().child(Text::new("a")).child(Text::new("b"));
        let root = rec.set_root(Background::new(Color::RED, content).into_any());
        assert_eq!(rec.size(root), 2);
        assert_eq!(rec.wrappers(root).len(), 2);
        let top = rec.controls().root();
        assert_eq!(rec.controls().children(top), rec.wrappers(root).as_slice());
    }

    #[test]
    fn color_change_updates_existing_wrapper() {
        let mut rec = Reconciler::headless(Size::new(6, 1));
        let root = rec.set_root(Background::new(Color::BLUE, Text::new("hi")).into_any());
        let wrapper = rec.wrappers(root)[0];
        rec.update(root, Background::new(Color::GREEN, Text::new("hi")).into_any())
            .unwrap();
        rec.controls_mut().layout_root();

        assert_eq!(rec.wrappers(root), vec![wrapper]);
        let cell = rec.controls().compose(Point::ZERO).unwrap();
        assert_eq!(cell.bg, Some(Color::GREEN));
    }

    #[test]
    fn removing_content_controls_destroys_their_wrappers() {
        let mut rec = Reconciler::headless(Size::new(6, 2));
        let two = Group::new().child(Text::new("a")).child(Text::new("b"));
        let root = rec.set_root(Background::new(Color::RED, two).into_any());
        assert_eq!(rec.controls().len(), 5);

        let one = Group::new().child(Text::new("a"));
        rec.update(root, Background::new(Color::RED, one).into_any())
            .unwrap();
        assert_eq!(rec.wrappers(root).len(), 1);
        assert_eq!(rec.controls().len(), 3);
        let top = rec.controls().root();
        assert_eq!(rec.controls().children(top), rec.wrappers(root).as_slice());
    }
}
