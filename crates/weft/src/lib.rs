#![forbid(unsafe_code)]

//! weft public facade crate.
//!
//! Re-exports the types of the internal crates and wires them into a
//! [`Scene`]: a reconciler, its control tree, and a renderer sharing one
//! redraw flag. A prelude covers day-to-day use.

use std::fmt;

mod scene;

pub use scene::{Scene, SceneConfig};

// --- Core re-exports -------------------------------------------------------

pub use weft_core::geometry::{Point, Rect, Size};
pub use weft_core::schedule::{NoopScheduler, TickFlag, UpdateScheduler};
pub use weft_core::terminal::{terminal_size, terminal_size_or_fallback};

// --- Render re-exports -----------------------------------------------------

pub use weft_render::{
    Cell, Color, DrawStats, LayerTree, RenderError, Renderer, RendererConfig, StyleFlags,
};

// --- View re-exports -------------------------------------------------------

pub use weft_view::{
    Alignment, AnyView, Background, ControlBehavior, ControlId, ControlTree, Direction, ForEach,
    Group, NodeId, Overlay, ReconcileError, Reconciler, Selectable, Text, View,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for weft scenes.
#[derive(Debug)]
pub enum Error {
    /// I/O failure writing to the terminal.
    Io(std::io::Error),
    /// The renderer rejected a draw.
    Render(RenderError),
    /// A view update did not match the tree.
    Reconcile(ReconcileError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Render(err) => write!(f, "render error: {err}"),
            Self::Reconcile(err) => write!(f, "reconcile error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Render(err) => Some(err),
            Self::Reconcile(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<RenderError> for Error {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Io(err) => Self::Io(err),
            other => Self::Render(other),
        }
    }
}

impl From<ReconcileError> for Error {
    fn from(err: ReconcileError) -> Self {
        Self::Reconcile(err)
    }
}

/// Standard result type for weft APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Alignment, AnyView, Background, Color, Direction, Error, ForEach, Group, Overlay,
        Point, Rect, Result, Scene, SceneConfig, Selectable, Size, StyleFlags, Text, View,
    };

    pub use crate::{core, render, view};
}

pub use weft_core as core;
pub use weft_render as render;
pub use weft_view as view;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn render_io_errors_flatten_into_io() {
        let err: Error = RenderError::Io(std::io::Error::other("broken pipe")).into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn errors_expose_their_source() {
        let err: Error = RenderError::EmptyRect(Rect::new(1, 2, 0, 3)).into();
        assert!(err.to_string().starts_with("render error: cannot draw empty rect"));
        assert!(err.source().is_some());

        let err: Error = ReconcileError::StructuralMismatch {
            expected: "Overlay",
            found: "Text",
        }
        .into();
        assert_eq!(
            err.to_string(),
            "reconcile error: cannot update Overlay node with Text"
        );
    }
}
