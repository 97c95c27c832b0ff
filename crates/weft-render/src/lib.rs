#![forbid(unsafe_code)]

//! Render kernel: cells, layer compositing, and diffed ANSI output.

pub mod ansi;
pub mod cache;
pub mod cell;
pub mod counting_writer;
pub mod layer;
pub mod renderer;

pub use cell::{Cell, Color, StyleFlags};
pub use layer::{Composition, ContentKey, ContentSource, LayerId, LayerTree};
pub use renderer::{DrawStats, RenderError, Renderer, RendererConfig, Surface};
