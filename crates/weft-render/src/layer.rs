#![forbid(unsafe_code)]

//! Layer tree: invalidation and compositing.
//!
//! Layers form a tree rooted at a screen-sized root layer. Each layer has a
//! frame in its parent's coordinate space, an ordered child list (later
//! children are on top), and an optional [`ContentKey`] naming the content
//! provider that supplies its own cells.
//!
//! # Compositing
//!
//! [`LayerTree::cell_at`] resolves one position. Children containing the point
//! are visited from topmost to bottommost. The first child that yields any
//! cell supplies the character and style. The scan then continues only until
//! some child yields a concrete background. The layer's own content fills
//! whatever is still missing. A cell with `bg == None` is therefore
//! transparent to the background below it but still opaque for its character.
//!
//! # Invalidation
//!
//! Invalidated rectangles are translated up through every ancestor's frame
//! origin and unioned into a single pending rectangle at the root. Each
//! accepted invalidation notifies the [`UpdateScheduler`]. Empty rectangles
//! are dropped before they reach the root.
//!
//! Layers live in an arena and are addressed by [`LayerId`]. Ids are not
//! generation-checked: using an id after [`LayerTree::destroy`] panics or
//! addresses an unrelated layer.

use std::rc::Rc;

use smallvec::SmallVec;
use weft_core::geometry::{Point, Rect, Size};
use weft_core::schedule::{NoopScheduler, UpdateScheduler};

use crate::cell::{Cell, Color};
use crate::renderer::Surface;

/// Handle to a layer in a [`LayerTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u32);

impl LayerId {
    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Opaque handle naming the provider of a layer's own cells.
///
/// The layer tree never interprets the key; it hands it back to the
/// [`ContentSource`] passed to [`LayerTree::cell_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentKey(u32);

impl ContentKey {
    /// Wrap a raw key.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw key value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Supplies the cells a layer's content draws, in layer-local coordinates.
pub trait ContentSource {
    /// The cell `key` draws at `at`, or `None` where it draws nothing.
    fn content_cell(&self, key: ContentKey, at: Point) -> Option<Cell>;
}

impl<F> ContentSource for F
where
    F: Fn(ContentKey, Point) -> Option<Cell>,
{
    fn content_cell(&self, key: ContentKey, at: Point) -> Option<Cell> {
        self(key, at)
    }
}

#[derive(Debug, Clone)]
struct Layer {
    parent: Option<LayerId>,
    children: SmallVec<[LayerId; 4]>,
    frame: Rect,
    content: Option<ContentKey>,
}

impl Layer {
    fn new(frame: Rect) -> Self {
        Self {
            parent: None,
            children: SmallVec::new(),
            frame,
            content: None,
        }
    }
}

/// Arena of layers plus the root's pending invalidated rectangle.
pub struct LayerTree {
    slots: Vec<Option<Layer>>,
    free: Vec<u32>,
    root: LayerId,
    invalidated: Option<Rect>,
    scheduler: Rc<dyn UpdateScheduler>,
}

impl std::fmt::Debug for LayerTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerTree")
            .field("layers", &self.len())
            .field("root", &self.root)
            .field("invalidated", &self.invalidated)
            .finish()
    }
}

impl LayerTree {
    /// Create a tree whose root covers `size` and reports invalidations to
    /// `scheduler`.
    pub fn new(size: Size, scheduler: Rc<dyn UpdateScheduler>) -> Self {
        Self {
            slots: vec![Some(Layer::new(Rect::from_size(size)))],
            free: Vec::new(),
            root: LayerId(0),
            invalidated: None,
            scheduler,
        }
    }

    /// Create a tree with a scheduler that ignores requests.
    pub fn headless(size: Size) -> Self {
        Self::new(size, Rc::new(NoopScheduler))
    }

    /// The root layer.
    #[inline]
    pub const fn root(&self) -> LayerId {
        self.root
    }

    /// Number of live layers, including the root.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Whether only the root exists.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Whether `id` addresses a live layer.
    pub fn contains(&self, id: LayerId) -> bool {
        matches!(self.slots.get(id.index()), Some(Some(_)))
    }

    fn layer(&self, id: LayerId) -> &Layer {
        match self.slots.get(id.index()) {
            Some(Some(layer)) => layer,
            _ => panic!("stale layer id {id:?}"),
        }
    }

    fn layer_mut(&mut self, id: LayerId) -> &mut Layer {
        match self.slots.get_mut(id.index()) {
            Some(Some(layer)) => layer,
            _ => panic!("stale layer id {id:?}"),
        }
    }

    /// Allocate a detached layer with an empty frame and no content.
    pub fn create(&mut self) -> LayerId {
        let layer = Layer::new(Rect::default());
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx as usize] = Some(layer);
                LayerId(idx)
            }
            None => {
                let idx = self.slots.len() as u32;
                self.slots.push(Some(layer));
                LayerId(idx)
            }
        }
    }

    /// Parent of `id`, if attached.
    pub fn parent(&self, id: LayerId) -> Option<LayerId> {
        self.layer(id).parent
    }

    /// Children of `id`, bottommost first.
    pub fn children(&self, id: LayerId) -> &[LayerId] {
        &self.layer(id).children
    }

    /// Frame of `id` in its parent's coordinates.
    pub fn frame(&self, id: LayerId) -> Rect {
        self.layer(id).frame
    }

    /// Content key of `id`.
    pub fn content(&self, id: LayerId) -> Option<ContentKey> {
        self.layer(id).content
    }

    /// Insert `child` into `parent`'s child list at `index`.
    ///
    /// `index` is clamped to the list length. A child still attached elsewhere
    /// is detached first. The area the child covers is invalidated in its new
    /// parent.
    pub fn add_layer(&mut self, parent: LayerId, child: LayerId, index: usize) {
        assert_ne!(parent, child, "a layer cannot contain itself");
        if let Some(old_parent) = self.layer(child).parent {
            self.detach(old_parent, child);
        }
        let siblings = &mut self.layer_mut(parent).children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        self.layer_mut(child).parent = Some(parent);

        let frame = self.layer(child).frame;
        self.invalidate(parent, frame);
    }

    /// Remove the child at `index` from `parent`, returning it.
    ///
    /// The area it covered is invalidated in `parent`. Returns `None` when
    /// `index` is out of range.
    pub fn remove_layer(&mut self, parent: LayerId, index: usize) -> Option<LayerId> {
        let child = *self.layer(parent).children.get(index)?;
        self.detach(parent, child);
        Some(child)
    }

    fn detach(&mut self, parent: LayerId, child: LayerId) {
        let frame = self.layer(child).frame;
        self.layer_mut(parent).children.retain(|c| *c != child);
        self.layer_mut(child).parent = None;
        self.invalidate(parent, frame);
    }

    /// Free `id`, detaching it from its parent.
    ///
    /// Remaining children are orphaned, not destroyed. Destroying the root is
    /// ignored.
    pub fn destroy(&mut self, id: LayerId) {
        if id == self.root {
            return;
        }
        if let Some(parent) = self.layer(id).parent {
            self.detach(parent, id);
        }
        let children = std::mem::take(&mut self.layer_mut(id).children);
        for child in children {
            self.layer_mut(child).parent = None;
        }
        self.slots[id.index()] = None;
        self.free.push(id.0);
    }

    /// Move or resize `id`.
    ///
    /// When the frame changes, both the old and the new area are invalidated
    /// in the parent. The root has no parent and invalidates its new bounds.
    pub fn set_frame(&mut self, id: LayerId, frame: Rect) {
        let layer = self.layer_mut(id);
        let old = layer.frame;
        if old == frame {
            return;
        }
        layer.frame = frame;
        let parent = layer.parent;
        match parent {
            Some(parent) => {
                self.invalidate(parent, old);
                self.invalidate(parent, frame);
            }
            None if id == self.root => self.invalidate(id, Rect::from_size(frame.size())),
            None => {}
        }
    }

    /// Attach or clear the content provider of `id`, invalidating its bounds.
    pub fn set_content(&mut self, id: LayerId, content: Option<ContentKey>) {
        let layer = self.layer_mut(id);
        if layer.content == content {
            return;
        }
        layer.content = content;
        self.invalidate_all(id);
    }

    /// Mark `rect` (in `id`'s local coordinates) as needing a redraw.
    ///
    /// The rectangle is translated through every ancestor's origin and
    /// unioned into the root's pending region. Empty rectangles and layers not
    /// connected to the root invalidate nothing.
    pub fn invalidate(&mut self, id: LayerId, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let mut rect = rect;
        let mut current = id;
        while let Some(parent) = self.layer(current).parent {
            rect = rect.offset_by(self.layer(current).frame.origin());
            current = parent;
        }
        if current != self.root {
            #[cfg(feature = "tracing")]
            tracing::trace!(?id, "invalidation on detached layer dropped");
            return;
        }
        self.invalidated = Some(match self.invalidated {
            Some(pending) => pending.union(&rect),
            None => rect,
        });
        self.scheduler.schedule_update();
    }

    /// Invalidate the whole of `id`.
    pub fn invalidate_all(&mut self, id: LayerId) {
        let size = self.layer(id).frame.size();
        self.invalidate(id, Rect::from_size(size));
    }

    /// The pending invalidated rectangle in root coordinates.
    #[inline]
    pub const fn invalidated(&self) -> Option<Rect> {
        self.invalidated
    }

    /// Take and clear the pending invalidated rectangle.
    #[inline]
    pub fn take_invalidated(&mut self) -> Option<Rect> {
        self.invalidated.take()
    }

    /// Composite the cell at `at` (local to `id`).
    ///
    /// Returns `None` when neither a child nor the layer's own content draws
    /// at `at`. The returned background may still be `None`. A wide
    /// character that would spill past the layer's right edge comes back as
    /// a blank in its style.
    pub fn cell_at<S>(&self, id: LayerId, at: Point, source: &S) -> Option<Cell>
    where
        S: ContentSource + ?Sized,
    {
        let layer = self.layer(id);
        let mut found: Option<Cell> = None;
        let mut background: Option<Color> = None;

        for &child_id in layer.children.iter().rev() {
            let frame = self.layer(child_id).frame;
            if !frame.contains(at) {
                continue;
            }
            let Some(local) = at.relative_to(frame.origin()) else {
                continue;
            };
            let Some(cell) = self.cell_at(child_id, local, source) else {
                continue;
            };
            if found.is_none() {
                found = Some(cell);
            }
            if cell.bg.is_some() {
                background = cell.bg;
                break;
            }
        }

        if let Some(key) = layer.content
            && (found.is_none() || background.is_none())
            && let Some(cell) = source.content_cell(key, at)
        {
            let cell = clip_to_width(cell, at, layer.frame.width);
            if found.is_none() {
                found = Some(cell);
            }
            if background.is_none() {
                background = cell.bg;
            }
        }

        found.map(|cell| Cell {
            bg: background,
            ..cell
        })
    }

    /// Composite the screen cell at `at`, resolving a missing background to
    /// [`Color::Default`].
    pub fn compose<S>(&self, at: Point, source: &S) -> Option<Cell>
    where
        S: ContentSource + ?Sized,
    {
        self.cell_at(self.root, at, source).map(Cell::resolved)
    }

    /// Pair the tree with a content source for the renderer.
    pub fn surface<'a, S>(&'a mut self, source: &'a S) -> Composition<'a, S>
    where
        S: ContentSource + ?Sized,
    {
        Composition {
            layers: self,
            source,
        }
    }
}

/// A [`LayerTree`] borrowed together with its content, ready to render.
///
/// Screen positions no layer draws at compose to a default blank, so areas a
/// layer stops covering are cleared on the next draw.
pub struct Composition<'a, S: ?Sized> {
    layers: &'a mut LayerTree,
    source: &'a S,
}

impl<S> Surface for Composition<'_, S>
where
    S: ContentSource + ?Sized,
{
    fn take_invalidated(&mut self) -> Option<Rect> {
        self.layers.take_invalidated()
    }

    fn compose(&self, at: Point) -> Option<Cell> {
        let screen = self.layers.frame(self.layers.root);
        if !screen.contains(at) {
            return None;
        }
        Some(
            self.layers
                .compose(at, self.source)
                .unwrap_or_else(|| Cell::default().resolved()),
        )
    }
}

/// Blank a character that does not fit in the `width` columns of its layer.
fn clip_to_width(cell: Cell, at: Point, width: u16) -> Cell {
    if usize::from(at.x) + cell.width() > usize::from(width) {
        Cell { ch: ' ', ..cell }
    } else {
        cell
    }
}
