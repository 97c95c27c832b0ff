#![forbid(unsafe_code)]

//! Control tree: layout negotiation and directional selection.
//!
//! Every control owns exactly one layer in the tree's [`LayerTree`], and the
//! control hierarchy and the layer hierarchy are kept congruent: a control's
//! `i`-th child owns its layer's `i`-th child layer. What a control *does*
//! (its size, how it places children, what it draws, whether it can take
//! focus) is delegated to a boxed [`ControlBehavior`].
//!
//! # Layout
//!
//! Layout is two-pass. [`ControlTree::size`] asks a control how large it wants
//! to be for a proposed size; it must be pure, since containers may ask
//! several times before deciding. [`ControlTree::layout`] then commits a size
//! top-down: the control's behavior returns a frame per child
//! ([`ControlBehavior::place_children`]) and the tree applies each through the
//! invalidating frame setter before recursing.
//!
//! # Selection
//!
//! Focus movement is a distributed search. A control asked for the next
//! selectable element in some direction searches its own children past the
//! index it was asked from, and bubbles the question to its parent when it
//! finds nothing. The default behavior bubbles immediately. The root searches
//! its children in order and never bubbles, so every search terminates.

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;
use weft_core::geometry::{Point, Rect, Size};
use weft_core::schedule::{NoopScheduler, UpdateScheduler};
use weft_render::layer::{Composition, ContentKey, ContentSource, LayerId, LayerTree};
use weft_render::Cell;

/// Handle to a control in a [`ControlTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(u32);

impl ControlId {
    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    const fn key(self) -> ContentKey {
        ContentKey::new(self.0)
    }
}

/// Direction of a focus move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// What a control does.
///
/// Hooks that need to look at children receive the tree and the control's own
/// id. They take `&self`: any state a behavior needs to change is replaced
/// wholesale through [`ControlTree::set_behavior`].
pub trait ControlBehavior {
    /// Desired size for a proposed size. Must be idempotent.
    fn size(&self, tree: &ControlTree, id: ControlId, proposed: Size) -> Size;

    /// Frame of each child, in this control's coordinates, once this control
    /// is `size`.
    ///
    /// The default stacks every child at the origin with its desired size.
    fn place_children(&self, tree: &ControlTree, id: ControlId, size: Size) -> Vec<Rect> {
        tree.children(id)
            .iter()
            .map(|&child| Rect::from_size(tree.size(child, size)))
            .collect()
    }

    /// Cell drawn at a position local to this control.
    fn cell(&self, _at: Point) -> Option<Cell> {
        None
    }

    /// Whether this control can take focus.
    fn is_selectable(&self) -> bool {
        false
    }

    /// Next selectable control in `direction`, searching from child `from`.
    ///
    /// The default does not search locally and asks the parent instead.
    fn selectable_element(
        &self,
        tree: &ControlTree,
        id: ControlId,
        direction: Direction,
        _from: usize,
    ) -> Option<ControlId> {
        tree.bubble_selection(id, direction)
    }

    /// Called when this control gains or loses focus.
    fn focus_changed(&mut self, _focused: bool) {}

    /// Name used in debug output.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// The control at the root of every tree: fills the screen and searches its
/// children in order.
struct RootControl;

impl ControlBehavior for RootControl {
    fn size(&self, _tree: &ControlTree, _id: ControlId, proposed: Size) -> Size {
        proposed
    }

    fn selectable_element(
        &self,
        tree: &ControlTree,
        id: ControlId,
        direction: Direction,
        from: usize,
    ) -> Option<ControlId> {
        match direction {
            Direction::Down | Direction::Right => tree.search_forward(id, from),
            Direction::Up | Direction::Left => tree.search_backward(id, from),
        }
    }
}

struct Control {
    parent: Option<ControlId>,
    children: SmallVec<[ControlId; 4]>,
    layer: LayerId,
    behavior: Box<dyn ControlBehavior>,
}

/// Control arena and focus state.
///
/// Serves as the [`ContentSource`] of the layer tree: a layer's content key
/// names the control that owns it. Cells of the focused control are marked
/// highlighted.
pub struct Controls {
    slots: Vec<Option<Control>>,
    free: Vec<u32>,
    focused: Option<ControlId>,
}

impl Controls {
    fn get(&self, id: ControlId) -> &Control {
        match self.slots.get(id.index()) {
            Some(Some(control)) => control,
            _ => panic!("stale control id {id:?}"),
        }
    }

    fn get_mut(&mut self, id: ControlId) -> &mut Control {
        match self.slots.get_mut(id.index()) {
            Some(Some(control)) => control,
            _ => panic!("stale control id {id:?}"),
        }
    }
}

impl ContentSource for Controls {
    fn content_cell(&self, key: ContentKey, at: Point) -> Option<Cell> {
        let id = ControlId(key.get());
        let control = self.slots.get(id.index())?.as_ref()?;
        let cell = control.behavior.cell(at)?;
        Some(cell.with_highlight(self.focused == Some(id)))
    }
}

/// Controls, their layers, and the focused control.
pub struct ControlTree {
    controls: Controls,
    layers: LayerTree,
    root: ControlId,
}

impl fmt::Debug for ControlTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlTree")
            .field("controls", &self.len())
            .field("focused", &self.controls.focused)
            .field("layers", &self.layers)
            .finish()
    }
}

impl ControlTree {
    /// Create a tree whose root control covers `size`.
    pub fn new(size: Size, scheduler: Rc<dyn UpdateScheduler>) -> Self {
        let layers = LayerTree::new(size, scheduler);
        let root = Control {
            parent: None,
            children: SmallVec::new(),
            layer: layers.root(),
            behavior: Box::new(RootControl),
        };
        Self {
            controls: Controls {
                slots: vec![Some(root)],
                free: Vec::new(),
                focused: None,
            },
            layers,
            root: ControlId(0),
        }
    }

    /// Create a tree that schedules nothing.
    pub fn headless(size: Size) -> Self {
        Self::new(size, Rc::new(NoopScheduler))
    }

    /// The root control.
    #[inline]
    pub const fn root(&self) -> ControlId {
        self.root
    }

    /// Size of the screen the root covers.
    pub fn screen_size(&self) -> Size {
        self.layers.frame(self.layers.root()).size()
    }

    /// Number of live controls, including the root.
    pub fn len(&self) -> usize {
        self.controls.slots.len() - self.controls.free.len()
    }

    /// Whether only the root exists.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Whether `id` addresses a live control.
    pub fn contains(&self, id: ControlId) -> bool {
        matches!(self.controls.slots.get(id.index()), Some(Some(_)))
    }

    /// Parent of `id`, if attached.
    pub fn parent(&self, id: ControlId) -> Option<ControlId> {
        self.controls.get(id).parent
    }

    /// Children of `id` in order.
    pub fn children(&self, id: ControlId) -> &[ControlId] {
        &self.controls.get(id).children
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: ControlId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// The layer `id` owns.
    pub fn layer(&self, id: ControlId) -> LayerId {
        self.controls.get(id).layer
    }

    /// Frame of `id` in its parent's coordinates.
    pub fn frame(&self, id: ControlId) -> Rect {
        self.layers.frame(self.layer(id))
    }

    /// Behavior of `id`.
    pub fn behavior(&self, id: ControlId) -> &dyn ControlBehavior {
        self.controls.get(id).behavior.as_ref()
    }

    /// The layer tree.
    pub fn layers(&self) -> &LayerTree {
        &self.layers
    }

    /// Create a detached control with its own layer.
    pub fn create(&mut self, behavior: Box<dyn ControlBehavior>) -> ControlId {
        let layer = self.layers.create();
        let control = Control {
            parent: None,
            children: SmallVec::new(),
            layer,
            behavior,
        };
        let id = match self.controls.free.pop() {
            Some(idx) => {
                self.controls.slots[idx as usize] = Some(control);
                ControlId(idx)
            }
            None => {
                let idx = self.controls.slots.len() as u32;
                self.controls.slots.push(Some(control));
                ControlId(idx)
            }
        };
        self.layers.set_content(layer, Some(id.key()));
        id
    }

    /// Insert `child` among `parent`'s children at `index` (clamped).
    ///
    /// A child attached elsewhere is detached first.
    pub fn add_child(&mut self, parent: ControlId, child: ControlId, index: usize) {
        assert_ne!(parent, child, "a control cannot contain itself");
        self.detach(child);
        let siblings = &mut self.controls.get_mut(parent).children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        self.controls.get_mut(child).parent = Some(parent);

        let (parent_layer, child_layer) = (self.layer(parent), self.layer(child));
        self.layers.add_layer(parent_layer, child_layer, index);
    }

    /// Remove the child at `index` from `parent`, returning it.
    ///
    /// The area the child covered is invalidated. The child stays alive.
    pub fn remove_child(&mut self, parent: ControlId, index: usize) -> Option<ControlId> {
        let siblings = &mut self.controls.get_mut(parent).children;
        if index >= siblings.len() {
            return None;
        }
        let child = siblings.remove(index);
        self.controls.get_mut(child).parent = None;

        let parent_layer = self.layer(parent);
        let removed = self.layers.remove_layer(parent_layer, index);
        debug_assert_eq!(removed, Some(self.layer(child)));
        Some(child)
    }

    fn detach(&mut self, id: ControlId) {
        if let Some(parent) = self.parent(id)
            && let Some(index) = self.index_in_parent(id)
        {
            self.remove_child(parent, index);
        }
    }

    /// Destroy `id` and every control below it, along with their layers.
    ///
    /// Destroying the focused control clears focus. The root cannot be
    /// destroyed.
    pub fn destroy(&mut self, id: ControlId) {
        if id == self.root {
            return;
        }
        let children = self.controls.get(id).children.clone();
        for child in children {
            self.destroy(child);
        }
        self.detach(id);
        if self.controls.focused == Some(id) {
            self.controls.focused = None;
        }
        let layer = self.layer(id);
        self.layers.destroy(layer);
        self.controls.slots[id.index()] = None;
        self.controls.free.push(id.0);
    }

    /// Replace the behavior of `id` and repaint it.
    pub fn set_behavior(&mut self, id: ControlId, mut behavior: Box<dyn ControlBehavior>) {
        if self.controls.focused == Some(id) {
            if behavior.is_selectable() {
                behavior.focus_changed(true);
            } else {
                self.controls.focused = None;
            }
        }
        self.controls.get_mut(id).behavior = behavior;
        self.invalidate(id);
    }

    /// Mark all of `id` as needing a redraw.
    pub fn invalidate(&mut self, id: ControlId) {
        let layer = self.layer(id);
        self.layers.invalidate_all(layer);
    }

    /// The pending invalidated rectangle in screen coordinates.
    pub fn invalidated(&self) -> Option<Rect> {
        self.layers.invalidated()
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Desired size of `id` for a proposed size.
    pub fn size(&self, id: ControlId, proposed: Size) -> Size {
        self.controls.get(id).behavior.size(self, id, proposed)
    }

    /// Commit `size` to `id` and lay out its subtree.
    ///
    /// The control keeps its position; children are positioned by the
    /// control's behavior.
    pub fn layout(&mut self, id: ControlId, size: Size) {
        let layer = self.layer(id);
        let origin = self.layers.frame(layer).origin();
        self.layers.set_frame(layer, Rect::at(origin, size));

        let frames = self.controls.get(id).behavior.place_children(self, id, size);
        let children = self.controls.get(id).children.clone();
        for (child, frame) in children.into_iter().zip(frames) {
            let child_layer = self.layer(child);
            self.layers.set_frame(child_layer, frame);
            self.layout(child, frame.size());
        }
    }

    /// Lay out the whole tree against the screen size.
    pub fn layout_root(&mut self) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("layout", controls = self.len()).entered();
        let size = self.screen_size();
        self.layout(self.root, size);
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// `id` itself if selectable, else its first selectable descendant in
    /// child order.
    pub fn first_selectable_element(&self, id: ControlId) -> Option<ControlId> {
        if self.behavior(id).is_selectable() {
            return Some(id);
        }
        self.children(id)
            .iter()
            .find_map(|&child| self.first_selectable_element(child))
    }

    /// Ask `id` for the next selectable control in `direction`, starting from
    /// its child `from`.
    pub fn selectable_element(
        &self,
        id: ControlId,
        direction: Direction,
        from: usize,
    ) -> Option<ControlId> {
        self.behavior(id).selectable_element(self, id, direction, from)
    }

    /// Continue a search in `id`'s parent, past `id`'s position.
    pub fn bubble_selection(&self, id: ControlId, direction: Direction) -> Option<ControlId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.selectable_element(parent, direction, index)
    }

    /// First selectable control among `id`'s children after `from`.
    pub fn search_forward(&self, id: ControlId, from: usize) -> Option<ControlId> {
        self.children(id)
            .iter()
            .skip(from.saturating_add(1))
            .find_map(|&child| self.first_selectable_element(child))
    }

    /// First selectable control among `id`'s children before `from`, nearest
    /// first.
    pub fn search_backward(&self, id: ControlId, from: usize) -> Option<ControlId> {
        self.children(id)
            .iter()
            .take(from)
            .rev()
            .find_map(|&child| self.first_selectable_element(child))
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// The focused control.
    #[inline]
    pub fn focused(&self) -> Option<ControlId> {
        self.controls.focused
    }

    /// Move focus to `id`.
    ///
    /// Returns `false` and leaves focus alone when `id` is not selectable.
    /// Both the old and the new focused control are repainted.
    pub fn focus(&mut self, id: ControlId) -> bool {
        if !self.behavior(id).is_selectable() {
            return false;
        }
        if self.controls.focused == Some(id) {
            return true;
        }
        self.clear_focus();
        #[cfg(feature = "tracing")]
        tracing::debug!(control = ?id, "focus");
        self.controls.focused = Some(id);
        self.controls.get_mut(id).behavior.focus_changed(true);
        self.invalidate(id);
        true
    }

    /// Drop focus, repainting the previously focused control.
    pub fn clear_focus(&mut self) {
        if let Some(old) = self.controls.focused.take() {
            self.controls.get_mut(old).behavior.focus_changed(false);
            self.invalidate(old);
        }
    }

    /// Focus the first selectable control in the tree.
    pub fn focus_first(&mut self) -> Option<ControlId> {
        let first = self.first_selectable_element(self.root)?;
        self.focus(first);
        Some(first)
    }

    /// Move focus one step in `direction`.
    ///
    /// With nothing focused this focuses the first selectable control.
    /// Returns the newly focused control, or `None` when nothing lies in that
    /// direction, in which case focus is unchanged.
    pub fn move_focus(&mut self, direction: Direction) -> Option<ControlId> {
        let Some(current) = self.controls.focused else {
            return self.focus_first();
        };
        let next = self.bubble_selection(current, direction)?;
        self.focus(next);
        Some(next)
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Composited screen cell at `at`.
    pub fn compose(&self, at: Point) -> Option<Cell> {
        self.layers.compose(at, &self.controls)
    }

    /// The layer tree paired with this tree's content, for the renderer.
    pub fn surface(&mut self) -> Composition<'_, Controls> {
        self.layers.surface(&self.controls)
    }
}
