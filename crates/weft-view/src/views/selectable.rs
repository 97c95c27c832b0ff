#![forbid(unsafe_code)]

//! Focusable label.

use crate::node::{NodeId, Reconciler, View};
use crate::views::Text;

/// A label that can take focus.
///
/// Draws like [`Text`]; while focused its cells are highlighted, which the
/// renderer shows as inverted video.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selectable {
    label: Text,
}

impl Selectable {
    /// A focusable control drawing `label`.
    pub fn new(label: impl Into<Text>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// The label drawn.
    pub fn label(&self) -> &Text {
        &self.label
    }
}

impl View for Selectable {
    fn build_node(&self, rec: &mut Reconciler, node: NodeId) {
        rec.set_control(node, self.label.control(true));
    }

    fn update_node(&self, rec: &mut Reconciler, node: NodeId) {
        if let Some(control) = rec.control(node) {
            rec.controls_mut().set_behavior(control, self.label.control(true));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::geometry::{Point, Size};

    #[test]
    fn focus_survives_label_change() {
        let mut rec = Reconciler::headless(Size::new(10, 1));
        let root = rec.set_root(Selectable::new("ok").into_any());
        rec.controls_mut().layout_root();
        let control = rec.control(root).unwrap();
        assert_eq!(rec.controls_mut().focus_first(), Some(control));

        rec.update(root, Selectable::new("done").into_any()).unwrap();
        rec.controls_mut().layout_root();
        assert_eq!(rec.controls().focused(), Some(control));
        let cell = rec.controls().compose(Point::new(3, 0)).unwrap();
        assert_eq!(cell.ch, 'e');
        assert!(cell.highlighted);
    }
}
