#![forbid(unsafe_code)]

//! Two-axis alignment of a child within a container.

use weft_core::geometry::{Point, Rect, Size};

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlignment {
    /// Align to the left edge (default).
    #[default]
    Leading,
    /// Center horizontally.
    Center,
    /// Align to the right edge.
    Trailing,
}

/// Vertical alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAlignment {
    /// Align to the top edge (default).
    #[default]
    Top,
    /// Center vertically.
    Center,
    /// Align to the bottom edge.
    Bottom,
}

/// Combined horizontal and vertical alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Alignment {
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
}

impl Alignment {
    /// Top edge, leading edge.
    pub const TOP_LEADING: Self = Self::new(HorizontalAlignment::Leading, VerticalAlignment::Top);
    /// Top edge, centered horizontally.
    pub const TOP: Self = Self::new(HorizontalAlignment::Center, VerticalAlignment::Top);
    /// Top edge, trailing edge.
    pub const TOP_TRAILING: Self =
        Self::new(HorizontalAlignment::Trailing, VerticalAlignment::Top);
    /// Leading edge, centered vertically.
    pub const LEADING: Self = Self::new(HorizontalAlignment::Leading, VerticalAlignment::Center);
    /// Centered on both axes.
    pub const CENTER: Self = Self::new(HorizontalAlignment::Center, VerticalAlignment::Center);
    /// Trailing edge, centered vertically.
    pub const TRAILING: Self =
        Self::new(HorizontalAlignment::Trailing, VerticalAlignment::Center);
    /// Bottom edge, leading edge.
    pub const BOTTOM_LEADING: Self =
        Self::new(HorizontalAlignment::Leading, VerticalAlignment::Bottom);
    /// Bottom edge, centered horizontally.
    pub const BOTTOM: Self = Self::new(HorizontalAlignment::Center, VerticalAlignment::Bottom);
    /// Bottom edge, trailing edge.
    pub const BOTTOM_TRAILING: Self =
        Self::new(HorizontalAlignment::Trailing, VerticalAlignment::Bottom);

    /// Create an alignment from its two axes.
    pub const fn new(horizontal: HorizontalAlignment, vertical: VerticalAlignment) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Origin of a `child`-sized box aligned inside a `container`-sized box.
    ///
    /// A child larger than the container on some axis is pinned to the
    /// leading/top edge on that axis.
    pub fn offset(&self, child: Size, container: Size) -> Point {
        let spare_w = container.width.saturating_sub(child.width);
        let spare_h = container.height.saturating_sub(child.height);

        let x = match self.horizontal {
            HorizontalAlignment::Leading => 0,
            HorizontalAlignment::Center => spare_w / 2,
            HorizontalAlignment::Trailing => spare_w,
        };
        let y = match self.vertical {
            VerticalAlignment::Top => 0,
            VerticalAlignment::Center => spare_h / 2,
            VerticalAlignment::Bottom => spare_h,
        };
        Point::new(x, y)
    }

    /// Frame of a `child`-sized box aligned inside a `container`-sized box.
    pub fn place(&self, child: Size, container: Size) -> Rect {
        Rect::at(self.offset(child, container), child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_top_leading() {
        assert_eq!(Alignment::default(), Alignment::TOP_LEADING);
    }

    #[test]
    fn offsets_on_each_axis() {
        let child = Size::new(4, 2);
        let container = Size::new(10, 7);
        assert_eq!(Alignment::TOP_LEADING.offset(child, container), Point::new(0, 0));
        assert_eq!(Alignment::CENTER.offset(child, container), Point::new(3, 2));
        assert_eq!(Alignment::BOTTOM_TRAILING.offset(child, container), Point::new(6, 5));
        assert_eq!(Alignment::TOP.offset(child, container), Point::new(3, 0));
        assert_eq!(Alignment::LEADING.offset(child, container), Point::new(0, 2));
    }

    #[test]
    fn oversized_child_pins_to_origin() {
        let child = Size::new(12, 9);
        let container = Size::new(10, 7);
        assert_eq!(Alignment::BOTTOM_TRAILING.offset(child, container), Point::ZERO);
        assert_eq!(Alignment::CENTER.offset(child, container), Point::ZERO);
    }

    #[test]
    fn place_keeps_child_size() {
        let frame = Alignment::TRAILING.place(Size::new(3, 1), Size::new(8, 3));
        assert_eq!(frame, Rect::new(5, 1, 3, 1));
    }
}
