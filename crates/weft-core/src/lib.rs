#![forbid(unsafe_code)]

//! Core: geometry, logging, redraw scheduling, and terminal size.

pub mod geometry;
pub mod logging;
pub mod schedule;
pub mod terminal;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
