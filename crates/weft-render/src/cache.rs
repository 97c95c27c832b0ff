#![forbid(unsafe_code)]

//! Screen cache.
//!
//! A row-major grid remembering the last cell written at each screen
//! position. `None` means nothing has been written there since the cache was
//! created or cleared, so any cell drawn at that position is a change.

use weft_core::geometry::{Point, Size};

use crate::cell::Cell;

/// Last-written cell per screen position.
#[derive(Debug, Clone)]
pub struct ScreenCache {
    width: u16,
    height: u16,
    cells: Vec<Option<Cell>>,
}

impl ScreenCache {
    /// Create an empty cache covering `size`.
    pub fn new(size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
            cells: vec![None; size.area() as usize],
        }
    }

    /// Dimensions of the cached screen.
    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether `point` lies on the screen.
    #[inline]
    pub const fn contains(&self, point: Point) -> bool {
        point.x < self.width && point.y < self.height
    }

    #[inline]
    fn index(&self, point: Point) -> Option<usize> {
        if self.contains(point) {
            Some(point.y as usize * self.width as usize + point.x as usize)
        } else {
            None
        }
    }

    /// The cell last written at `point`, if any.
    #[inline]
    pub fn get(&self, point: Point) -> Option<&Cell> {
        self.index(point)
            .and_then(|idx| self.cells.get(idx))
            .and_then(Option::as_ref)
    }

    /// Record `cell` at `point`.
    ///
    /// Returns `false` and records nothing when `point` is off screen.
    #[inline]
    pub fn set(&mut self, point: Point, cell: Cell) -> bool {
        match self.index(point).and_then(|idx| self.cells.get_mut(idx)) {
            Some(slot) => {
                *slot = Some(cell);
                true
            }
            None => false,
        }
    }

    /// Forget the cell at `point`, so the next cell drawn there is a change.
    #[inline]
    pub fn forget(&mut self, point: Point) {
        if let Some(slot) = self.index(point).and_then(|idx| self.cells.get_mut(idx)) {
            *slot = None;
        }
    }

    /// Record `cell` at every position.
    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(Some(cell));
    }

    /// Forget every cached cell.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Number of positions holding a cached cell.
    pub fn populated(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}
