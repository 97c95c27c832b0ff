#![forbid(unsafe_code)]

//! Single-line styled text.

use unicode_width::UnicodeWidthChar;
use weft_core::geometry::{Point, Size};
use weft_render::{Cell, Color, StyleFlags};

use crate::control::{ControlBehavior, ControlId, ControlTree};
use crate::node::{NodeId, Reconciler, View};

/// A line of text.
///
/// The text occupies its display width on a single row. Positions it does
/// not cover are transparent, and so is the background unless one is set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Text {
    content: String,
    fg: Color,
    bg: Option<Color>,
    attrs: StyleFlags,
}

impl Text {
    /// Unstyled text.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Set the foreground color.
    pub fn fg(mut self, fg: Color) -> Self {
        self.fg = fg;
        self
    }

    /// Give the text an opaque background.
    pub fn bg(mut self, bg: Color) -> Self {
        self.bg = Some(bg);
        self
    }

    /// Replace the style attributes.
    pub fn attrs(mut self, attrs: StyleFlags) -> Self {
        self.attrs = attrs;
        self
    }

    /// Add [`StyleFlags::BOLD`].
    pub fn bold(self) -> Self {
        let attrs = self.attrs | StyleFlags::BOLD;
        self.attrs(attrs)
    }

    /// The text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub(crate) fn control(&self, selectable: bool) -> Box<dyn ControlBehavior> {
        Box::new(TextControl::new(self, selectable))
    }
}

impl From<&str> for Text {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for Text {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

impl View for Text {
    fn build_node(&self, rec: &mut Reconciler, node: NodeId) {
        rec.set_control(node, self.control(false));
    }

    fn update_node(&self, rec: &mut Reconciler, node: NodeId) {
        if let Some(control) = rec.control(node) {
            rec.controls_mut().set_behavior(control, self.control(false));
        }
    }
}

/// Draws a laid-out line of text.
///
/// `columns[x]` is the character starting at column `x`, or `None` for the
/// second column of a wide character.
pub(crate) struct TextControl {
    columns: Vec<Option<char>>,
    fg: Color,
    bg: Option<Color>,
    attrs: StyleFlags,
    selectable: bool,
}

impl TextControl {
    fn new(text: &Text, selectable: bool) -> Self {
        let mut columns = Vec::with_capacity(text.content.len());
        for ch in text.content.chars() {
            if ch.is_control() {
                columns.push(Some(' '));
                continue;
            }
            match ch.width() {
                // Zero-width characters would need a cell to combine with.
                Some(0) | None => {}
                Some(1) => columns.push(Some(ch)),
                Some(_) => {
                    columns.push(Some(ch));
                    columns.push(None);
                }
            }
        }
        Self {
            columns,
            fg: text.fg,
            bg: text.bg,
            attrs: text.attrs,
            selectable,
        }
    }

    fn width(&self) -> u16 {
        u16::try_from(self.columns.len()).unwrap_or(u16::MAX)
    }
}

impl ControlBehavior for TextControl {
    fn size(&self, _tree: &ControlTree, _id: ControlId, proposed: Size) -> Size {
        Size::new(self.width(), 1).min(proposed)
    }

    fn cell(&self, at: Point) -> Option<Cell> {
        if at.y != 0 {
            return None;
        }
        let ch = (*self.columns.get(usize::from(at.x))?)?;
        let cell = Cell::from_char(ch).with_fg(self.fg).with_attrs(self.attrs);
        Some(match self.bg {
            Some(bg) => cell.with_bg(bg),
            None => cell,
        })
    }

    fn is_selectable(&self) -> bool {
        self.selectable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(s: &str) -> TextControl {
        TextControl::new(&Text::new(s), false)
    }

    #[test]
    fn size_is_display_width_clamped() {
        let tree = ControlTree::headless(Size::new(10, 10));
        let root = tree.root();
        let control = layout("hello");
        assert_eq!(control.size(&tree, root, Size::new(10, 3)), Size::new(5, 1));
        assert_eq!(control.size(&tree, root, Size::new(3, 3)), Size::new(3, 1));
        assert_eq!(control.size(&tree, root, Size::new(10, 0)), Size::new(5, 0));
        assert_eq!(layout("").size(&tree, root, Size::new(4, 4)), Size::new(0, 1));
    }

    #[test]
    fn wide_characters_take_two_columns() {
        let control = layout("a中b");
        assert_eq!(control.width(), 4);
        assert_eq!(control.cell(Point::new(1, 0)).map(|c| c.ch), Some('中'));
        assert_eq!(control.cell(Point::new(2, 0)), None);
        assert_eq!(control.cell(Point::new(3, 0)).map(|c| c.ch), Some('b'));
    }

    #[test]
    fn control_characters_become_blanks() {
        let control = layout("a\tb");
        assert_eq!(control.width(), 3);
        assert_eq!(control.cell(Point::new(1, 0)).map(|c| c.ch), Some(' '));
    }

    #[test]
    fn outside_content_is_transparent() {
        let control = layout("hi");
        assert_eq!(control.cell(Point::new(2, 0)), None);
        assert_eq!(control.cell(Point::new(0, 1)), None);
    }

    #[test]
    fn style_reaches_cells() {
        let text = Text::new("x").fg(Color::RED).bg(Color::BLUE).bold();
        let cell = TextControl::new(&text, false).cell(Point::ZERO).unwrap();
        assert_eq!(cell.fg, Color::RED);
        assert_eq!(cell.bg, Some(Color::BLUE));
        assert!(cell.attrs.contains(StyleFlags::BOLD));

        let plain = layout("x").cell(Point::ZERO).unwrap();
        assert_eq!(plain.bg, None);
    }
}
