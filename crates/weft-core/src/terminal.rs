#![forbid(unsafe_code)]

//! Terminal size query.
//!
//! The engine reads the terminal size once when a session starts. Resizing a
//! running session is not supported.

use std::io;

use crate::geometry::Size;

/// Size used when the terminal cannot be queried (not a tty, wasm).
pub const FALLBACK_SIZE: Size = Size::new(80, 24);

/// Query the current terminal size in cells.
#[cfg(not(target_arch = "wasm32"))]
pub fn terminal_size() -> io::Result<Size> {
    let (width, height) = crossterm::terminal::size()?;
    Ok(Size::new(width, height))
}

/// Query the current terminal size in cells.
#[cfg(target_arch = "wasm32")]
pub fn terminal_size() -> io::Result<Size> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "no terminal on wasm32",
    ))
}

/// Query the terminal size, falling back to [`FALLBACK_SIZE`] on failure or
/// when the reported size is degenerate.
pub fn terminal_size_or_fallback() -> Size {
    match terminal_size() {
        Ok(size) if !size.is_empty() => size,
        _ => {
            crate::warn!("terminal size unavailable, using fallback");
            FALLBACK_SIZE
        }
    }
}
