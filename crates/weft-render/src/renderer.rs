#![forbid(unsafe_code)]

//! Renderer: cache-diffed, state-tracked terminal output.
//!
//! The renderer pulls composited cells from a [`Surface`] and writes only what
//! changed since the last draw. Three pieces of terminal state are tracked to
//! keep output minimal:
//!
//! - **Screen cache**: the last cell written at every position. A cell equal
//!   to its cached value produces no output at all.
//! - **Cursor**: the position the terminal cursor is known to be at. A cursor
//!   move is emitted only when the next changed cell is elsewhere. Writing
//!   past the last column leaves the cursor position unknown.
//! - **Style**: the SGR state in effect. Foreground, background and each
//!   attribute flag are switched individually, only when they differ.
//!
//! All output goes through a buffered writer and is flushed once per draw.
//!
//! # Usage
//!
//! ```ignore
//! use weft_render::renderer::{Renderer, RendererConfig};
//!
//! let mut renderer = Renderer::new(std::io::stdout(), size, RendererConfig::default());
//! renderer.start()?;
//! // ... invalidate layers ...
//! renderer.update(&mut layers.surface(&content))?;
//! renderer.stop()?;
//! ```

use std::fmt;
use std::io::{self, BufWriter, Write};

use weft_core::geometry::{Point, Rect, Size};

use crate::ansi;
use crate::cache::ScreenCache;
use crate::cell::{Cell, Color, StyleFlags};
use crate::counting_writer::CountingWriter;

/// Size of the internal write buffer (64KB).
const BUFFER_CAPACITY: usize = 64 * 1024;

/// What the renderer draws from.
pub trait Surface {
    /// Take the pending invalidated rectangle, leaving none behind.
    fn take_invalidated(&mut self) -> Option<Rect>;

    /// The fully resolved cell at a screen position, or `None` where nothing
    /// is drawn.
    ///
    /// A layer tree answers every on-screen position, returning a default
    /// blank where no layer covers the point, so a shrinking layer leaves no
    /// stale cells behind. `None` is only returned off screen.
    fn compose(&self, at: Point) -> Option<Cell>;
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn take_invalidated(&mut self) -> Option<Rect> {
        (**self).take_invalidated()
    }

    fn compose(&self, at: Point) -> Option<Cell> {
        (**self).compose(at)
    }
}

/// Terminal session behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererConfig {
    /// Switch to the alternate screen buffer for the session.
    pub alternate_screen: bool,
    /// Erase the display when the session starts.
    pub clear_screen: bool,
    /// Hide the cursor for the session.
    pub hide_cursor: bool,
}

impl RendererConfig {
    /// No session sequences at all. Draws still position the cursor.
    pub const fn inline() -> Self {
        Self {
            alternate_screen: false,
            clear_screen: false,
            hide_cursor: false,
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            clear_screen: true,
            hide_cursor: true,
        }
    }
}

/// Errors from drawing.
#[derive(Debug)]
pub enum RenderError {
    /// `draw` was asked to draw an empty rectangle.
    EmptyRect(Rect),
    /// Writing to the terminal failed.
    Io(io::Error),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRect(rect) => write!(
                f,
                "cannot draw empty rect {}x{} at ({}, {})",
                rect.width, rect.height, rect.x, rect.y
            ),
            Self::Io(err) => write!(f, "terminal write failed: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::EmptyRect(_) => None,
        }
    }
}

impl From<io::Error> for RenderError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Counters from one draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Positions examined.
    pub cells_visited: u32,
    /// Positions whose cell differed from the cache and were written.
    pub cells_changed: u32,
    /// Bytes written to the terminal, escape sequences included.
    pub bytes_emitted: u64,
}

/// Style state as the terminal sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct CellStyle {
    fg: Color,
    bg: Color,
    attrs: StyleFlags,
}

impl CellStyle {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            fg: cell.fg,
            bg: cell.bg.unwrap_or(Color::Default),
            attrs: cell.effective_attrs(),
        }
    }
}

/// Diffing terminal renderer.
pub struct Renderer<W: Write> {
    writer: BufWriter<CountingWriter<W>>,
    config: RendererConfig,
    cache: ScreenCache,
    /// Known cursor position. `None` = unknown.
    cursor: Option<Point>,
    /// Style in effect. `None` = unknown.
    style: Option<CellStyle>,
    active: bool,
}

impl<W: Write> fmt::Debug for Renderer<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("size", &self.cache.size())
            .field("config", &self.config)
            .field("cursor", &self.cursor)
            .field("active", &self.active)
            .finish()
    }
}

impl<W: Write> Renderer<W> {
    /// Create a renderer for a screen of `size`.
    ///
    /// Nothing is written until [`start`](Self::start) or the first draw.
    pub fn new(writer: W, size: Size, config: RendererConfig) -> Self {
        Self {
            writer: BufWriter::with_capacity(BUFFER_CAPACITY, CountingWriter::new(writer)),
            config,
            cache: ScreenCache::new(size),
            cursor: None,
            style: None,
            active: false,
        }
    }

    /// Screen size.
    #[inline]
    pub fn size(&self) -> Size {
        self.cache.size()
    }

    /// Session configuration.
    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Whether a session is running.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The screen cache.
    #[inline]
    pub fn cache(&self) -> &ScreenCache {
        &self.cache
    }

    /// The underlying writer. Output may still be buffered.
    #[inline]
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref().inner()
    }

    /// Begin a session.
    ///
    /// Enters the alternate screen, clears it, homes the cursor and hides it,
    /// as configured. After a clear the cache holds default blanks, otherwise
    /// it is emptied and the next draw writes every cell it visits. Calling
    /// `start` on a running session does nothing.
    pub fn start(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(config = ?self.config, size = ?self.cache.size(), "renderer start");

        if self.config.alternate_screen {
            ansi::alt_screen_enter(&mut self.writer)?;
        }
        ansi::sgr_reset(&mut self.writer)?;
        if self.config.clear_screen {
            ansi::erase_display(&mut self.writer)?;
        }
        ansi::cup(&mut self.writer, 0, 0)?;
        if self.config.hide_cursor {
            ansi::cursor_hide(&mut self.writer)?;
        }
        self.writer.flush()?;

        // An erased screen is known to hold default blanks.
        if self.config.clear_screen {
            self.cache.fill(Cell::default().resolved());
        } else {
            self.cache.clear();
        }
        self.cursor = Some(Point::ZERO);
        self.style = Some(CellStyle::default());
        self.active = true;
        Ok(())
    }

    /// End a session, undoing what [`start`](Self::start) changed.
    ///
    /// Calling `stop` without a running session does nothing.
    pub fn stop(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("renderer stop");

        ansi::sgr_reset(&mut self.writer)?;
        if self.config.hide_cursor {
            ansi::cursor_show(&mut self.writer)?;
        }
        if self.config.alternate_screen {
            ansi::alt_screen_leave(&mut self.writer)?;
        }
        self.writer.flush()?;

        self.reset();
        self.active = false;
        Ok(())
    }

    /// Forget all tracked terminal state.
    ///
    /// Useful when the terminal contents were changed behind the renderer's
    /// back. The next draw rewrites every cell it visits.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.cursor = None;
        self.style = None;
    }

    /// Draw the surface's pending invalidated region, then clear it.
    ///
    /// The region is clipped to the screen. Returns `Ok(None)` when nothing
    /// was pending or the region lies entirely off screen.
    pub fn update<S>(&mut self, surface: &mut S) -> Result<Option<DrawStats>, RenderError>
    where
        S: Surface + ?Sized,
    {
        let Some(rect) = surface.take_invalidated() else {
            return Ok(None);
        };
        let visible = rect.intersection(&Rect::from_size(self.size()));
        if visible.is_empty() {
            return Ok(None);
        }
        self.draw(&*surface, visible).map(Some)
    }

    /// Redraw every position on screen.
    pub fn draw_all<S>(&mut self, surface: &S) -> Result<DrawStats, RenderError>
    where
        S: Surface + ?Sized,
    {
        let screen = Rect::from_size(self.size());
        self.draw(surface, screen)
    }

    /// Draw every position of `rect`, row by row.
    ///
    /// Positions where the surface yields no cell are skipped, as are the
    /// columns covered by a wide character drawn in the same pass. A row
    /// that starts on the right half of a wide character redraws that
    /// character instead. Positions whose cell matches the cache produce no
    /// output.
    ///
    /// # Errors
    ///
    /// [`RenderError::EmptyRect`] if `rect` has no area, or
    /// [`RenderError::Io`] if writing fails.
    pub fn draw<S>(&mut self, surface: &S, rect: Rect) -> Result<DrawStats, RenderError>
    where
        S: Surface + ?Sized,
    {
        if rect.is_empty() {
            return Err(RenderError::EmptyRect(rect));
        }
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "draw",
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height
        )
        .entered();

        self.writer.get_mut().reset_counter();
        let mut stats = DrawStats::default();
        // End of the wide character drawn last; positions before it are covered.
        let mut covered_until: Option<Point> = None;
        for at in rect.positions() {
            stats.cells_visited += 1;
            if at.x == rect.x && at.x > 0 {
                // A row starting on a continuation column redraws its glyph.
                let left = Point::new(at.x - 1, at.y);
                if let Some(cell) = surface.compose(left)
                    && cell.width() > 1
                {
                    if self.draw_pixel(cell, left)? {
                        stats.cells_changed += 1;
                    }
                    covered_until = Some(Point::new(left.x.saturating_add(cell.width() as u16), at.y));
                }
            }
            if let Some(end) = covered_until
                && end.y == at.y
                && at.x < end.x
            {
                continue;
            }
            let Some(cell) = surface.compose(at) else {
                continue;
            };
            if self.draw_pixel(cell, at)? {
                stats.cells_changed += 1;
            }
            let width = cell.width();
            covered_until = (width > 1).then(|| Point::new(at.x.saturating_add(width as u16), at.y));
        }
        self.writer.flush()?;
        stats.bytes_emitted = self.writer.get_ref().bytes_written();

        #[cfg(feature = "tracing")]
        tracing::trace!(
            cells_changed = stats.cells_changed,
            bytes = stats.bytes_emitted,
            "draw complete"
        );
        Ok(stats)
    }

    /// Write one cell at a screen position if it differs from the cache.
    ///
    /// Returns whether anything was written. Positions off screen are
    /// ignored. A missing background is treated as [`Color::Default`].
    /// Columns a wide character covers are forgotten by the cache, as is a
    /// wide character whose right half gets overwritten.
    /// Output stays buffered until the next flush.
    pub fn draw_pixel(&mut self, cell: Cell, at: Point) -> io::Result<bool> {
        if !self.cache.contains(at) {
            return Ok(false);
        }
        let cell = cell.resolved();
        if self.cache.get(at) == Some(&cell) {
            return Ok(false);
        }
        self.cache.set(at, cell);
        // Writing over the right half of a wide glyph erases the whole glyph.
        if at.x > 0 {
            let left = Point::new(at.x - 1, at.y);
            if self.cache.get(left).is_some_and(|c| c.width() > 1) {
                self.cache.forget(left);
            }
        }
        // The columns under a wide glyph no longer show what the cache holds.
        let width = cell.width();
        for dx in 1..width {
            self.cache.forget(Point::new(at.x.saturating_add(dx as u16), at.y));
        }

        self.move_cursor_to(at)?;
        self.emit_style(CellStyle::from_cell(&cell))?;
        self.emit_char(cell.ch)?;

        let next_x = usize::from(at.x) + width;
        self.cursor = if next_x < usize::from(self.cache.size().width) {
            Some(Point::new(next_x as u16, at.y))
        } else {
            None
        };
        Ok(true)
    }

    /// Flush any buffered output.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Get the inner writer (consuming the renderer).
    ///
    /// Flushes any buffered data before returning the writer.
    pub fn into_inner(self) -> io::Result<W> {
        let counting = self.writer.into_inner().map_err(|e| e.into_error())?;
        Ok(counting.into_inner())
    }

    fn move_cursor_to(&mut self, at: Point) -> io::Result<()> {
        if self.cursor == Some(at) {
            return Ok(());
        }
        ansi::cup(&mut self.writer, at.y, at.x)?;
        self.cursor = Some(at);
        Ok(())
    }

    fn emit_style(&mut self, next: CellStyle) -> io::Result<()> {
        let current = match self.style {
            Some(current) if current == next => return Ok(()),
            Some(current) => current,
            None => {
                ansi::sgr_reset(&mut self.writer)?;
                CellStyle::default()
            }
        };
        if current.fg != next.fg {
            ansi::sgr_fg(&mut self.writer, next.fg)?;
        }
        if current.bg != next.bg {
            ansi::sgr_bg(&mut self.writer, next.bg)?;
        }
        ansi::sgr_flags_transition(&mut self.writer, current.attrs, next.attrs)?;
        self.style = Some(next);
        Ok(())
    }

    fn emit_char(&mut self, ch: char) -> io::Result<()> {
        if ch.is_control() {
            return self.writer.write_all(b" ");
        }
        let mut buf = [0u8; 4];
        let encoded = ch.encode_utf8(&mut buf);
        self.writer.write_all(encoded.as_bytes())
    }
}
