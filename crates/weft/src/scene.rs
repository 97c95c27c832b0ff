#![forbid(unsafe_code)]

//! A running scene: views, controls, and the terminal they are drawn to.
//!
//! The application owns the event loop. Each pass it hands the scene a fresh
//! view description with [`Scene::update`], applies input such as focus moves,
//! and calls [`Scene::tick`] once. Mutations only mark regions invalid and
//! raise the shared [`TickFlag`]; `tick` is where drawing happens.

use std::io::Write;
use std::rc::Rc;

use weft_core::geometry::Size;
use weft_core::schedule::TickFlag;
use weft_core::terminal::terminal_size_or_fallback;
use weft_render::{DrawStats, Renderer, RendererConfig, Surface};
use weft_view::{AnyView, ControlId, ControlTree, Direction, NodeId, Reconciler, View};

use crate::Result;

/// Scene options.
#[derive(Debug, Clone, Default)]
pub struct SceneConfig {
    /// Terminal session behavior.
    pub renderer: RendererConfig,
    /// Screen size; queried from the terminal when `None`.
    pub size: Option<Size>,
}

impl SceneConfig {
    /// Fixed-size scene that leaves the terminal session alone.
    ///
    /// Suited to tests and to drawing into a buffer.
    pub const fn headless(size: Size) -> Self {
        Self {
            renderer: RendererConfig::inline(),
            size: Some(size),
        }
    }

    /// Use a fixed screen size instead of querying the terminal.
    #[must_use]
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    /// Replace the renderer configuration.
    #[must_use]
    pub fn with_renderer(mut self, renderer: RendererConfig) -> Self {
        self.renderer = renderer;
        self
    }
}

/// Reconciler and renderer wired to one redraw flag.
///
/// Dropping an active scene ends the terminal session.
pub struct Scene<W: Write> {
    reconciler: Reconciler,
    renderer: Renderer<W>,
    ticks: TickFlag,
}

impl<W: Write> Scene<W> {
    /// Create a scene drawing to `writer`.
    pub fn new(writer: W, config: SceneConfig) -> Self {
        let size = config.size.unwrap_or_else(terminal_size_or_fallback);
        let ticks = TickFlag::new();
        let mut controls = ControlTree::new(size, Rc::new(ticks.clone()));
        // Nothing on screen is known yet, so the first tick paints everything.
        let root = controls.root();
        controls.invalidate(root);
        #[cfg(feature = "tracing")]
        tracing::info!(width = size.width, height = size.height, "scene created");
        Self {
            reconciler: Reconciler::new(controls),
            renderer: Renderer::new(writer, size, config.renderer),
            ticks,
        }
    }

    /// Screen size.
    pub fn size(&self) -> Size {
        self.renderer.size()
    }

    /// The node tree.
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Mutable access to the node tree.
    pub fn reconciler_mut(&mut self) -> &mut Reconciler {
        &mut self.reconciler
    }

    /// The laid-out controls and their layers.
    pub fn controls(&self) -> &ControlTree {
        self.reconciler.controls()
    }

    /// The renderer and its writer.
    pub fn renderer(&self) -> &Renderer<W> {
        &self.renderer
    }

    /// Whether a redraw is pending for the next [`tick`](Self::tick).
    pub fn needs_redraw(&self) -> bool {
        self.ticks.is_pending()
    }

    /// Begin the terminal session.
    pub fn start(&mut self) -> Result<()> {
        self.renderer.start()?;
        // The screen was reset; everything on it must be drawn again.
        let root = self.reconciler.controls().root();
        self.reconciler.controls_mut().invalidate(root);
        Ok(())
    }

    /// End the terminal session.
    pub fn stop(&mut self) -> Result<()> {
        self.renderer.stop()?;
        Ok(())
    }

    /// Install `view` as the scene's content and lay it out.
    ///
    /// A view of the same type as the current one updates the tree in place;
    /// any other type rebuilds it.
    pub fn update(&mut self, view: impl View) -> NodeId {
        self.update_any(view.into_any())
    }

    /// [`update`](Self::update) with an already shared view.
    pub fn update_any(&mut self, view: AnyView) -> NodeId {
        let root = self.reconciler.set_root(view);
        self.reconciler.controls_mut().layout_root();
        root
    }

    /// Update a single node in place and lay the scene out again.
    ///
    /// # Errors
    ///
    /// Fails without touching the tree when `view` does not match the node.
    pub fn update_node(&mut self, node: NodeId, view: AnyView) -> Result<()> {
        self.reconciler.update(node, view)?;
        self.reconciler.controls_mut().layout_root();
        Ok(())
    }

    /// Move focus one step in `direction`.
    pub fn move_focus(&mut self, direction: Direction) -> Option<ControlId> {
        self.reconciler.controls_mut().move_focus(direction)
    }

    /// Draw whatever changed since the last tick.
    ///
    /// Returns `None` when no redraw was requested.
    pub fn tick(&mut self) -> Result<Option<DrawStats>> {
        if !self.ticks.take() {
            return Ok(None);
        }
        let mut surface = self.reconciler.controls_mut().surface();
        Ok(self.renderer.update(&mut surface)?)
    }

    /// Redraw the whole screen regardless of invalidation.
    pub fn redraw(&mut self) -> Result<DrawStats> {
        self.ticks.take();
        let mut surface = self.reconciler.controls_mut().surface();
        surface.take_invalidated();
        Ok(self.renderer.draw_all(&surface)?)
    }
}

impl<W: Write> Drop for Scene<W> {
    fn drop(&mut self) {
        if self.renderer.is_active() {
            let _ = self.renderer.stop();
        }
    }
}
