#![forbid(unsafe_code)]

//! Declarative views over a persistent control tree.
//!
//! - [`node`]: the reconciler turning view descriptions into controls.
//! - [`control`]: controls, two-pass layout, and directional focus.
//! - [`alignment`]: two-axis placement used by containers.
//! - [`views`]: the reference views.

pub mod alignment;
pub mod control;
pub mod node;
pub mod views;

pub use alignment::{Alignment, HorizontalAlignment, VerticalAlignment};
pub use control::{ControlBehavior, ControlId, ControlTree, Controls, Direction};
pub use node::{AnyView, NodeId, ReconcileError, Reconciler, View};
pub use views::{Background, ForEach, Group, Overlay, Selectable, Text};
