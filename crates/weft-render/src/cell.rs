#![forbid(unsafe_code)]

//! Cell types and invariants.
//!
//! A [`Cell`] is one terminal character plus the color and attribute state it
//! is drawn with.
//!
//! # Background semantics
//!
//! `Cell::bg` is optional, and `None` is *not* the terminal's default
//! background. It means "whatever is composited beneath shows through". The
//! layer compositor resolves it while scanning lower layers, and root
//! composition turns any background still missing into [`Color::Default`]
//! (see [`Cell::resolved`]). Cells handed to the renderer therefore always
//! carry `Some(_)`.

use unicode_width::UnicodeWidthChar;

/// A terminal color.
///
/// Each variant maps onto one SGR family: the terminal default (39/49), the
/// 16-color palette (30–37/90–97, 40–47/100–107), the 256-color palette
/// (`38;5;n`/`48;5;n`), or 24-bit color (`38;2;r;g;b`/`48;2;r;g;b`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// The terminal's configured default.
    #[default]
    Default,
    /// One of the 16 palette colors (0–7 normal, 8–15 bright).
    Ansi(u8),
    /// A 256-color palette index.
    Indexed(u8),
    /// 24-bit color.
    Rgb(u8, u8, u8),
}

impl Color {
    /// Standard palette entry 0.
    pub const BLACK: Self = Self::Ansi(0);
    /// Standard palette entry 1.
    pub const RED: Self = Self::Ansi(1);
    /// Standard palette entry 2.
    pub const GREEN: Self = Self::Ansi(2);
    /// Standard palette entry 3.
    pub const YELLOW: Self = Self::Ansi(3);
    /// Standard palette entry 4.
    pub const BLUE: Self = Self::Ansi(4);
    /// Standard palette entry 5.
    pub const MAGENTA: Self = Self::Ansi(5);
    /// Standard palette entry 6.
    pub const CYAN: Self = Self::Ansi(6);
    /// Standard palette entry 7.
    pub const WHITE: Self = Self::Ansi(7);
    /// Bright palette entry 8.
    pub const BRIGHT_BLACK: Self = Self::Ansi(8);
    /// Bright palette entry 9.
    pub const BRIGHT_RED: Self = Self::Ansi(9);
    /// Bright palette entry 10.
    pub const BRIGHT_GREEN: Self = Self::Ansi(10);
    /// Bright palette entry 11.
    pub const BRIGHT_YELLOW: Self = Self::Ansi(11);
    /// Bright palette entry 12.
    pub const BRIGHT_BLUE: Self = Self::Ansi(12);
    /// Bright palette entry 13.
    pub const BRIGHT_MAGENTA: Self = Self::Ansi(13);
    /// Bright palette entry 14.
    pub const BRIGHT_CYAN: Self = Self::Ansi(14);
    /// Bright palette entry 15.
    pub const BRIGHT_WHITE: Self = Self::Ansi(15);

    /// Create a 24-bit color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb(r, g, b)
    }
}

bitflags::bitflags! {
    /// Cell text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        /// Bold / increased weight.
        const BOLD      = 0b0000_0001;
        /// Italic text.
        const ITALIC    = 0b0000_0010;
        /// Underlined text.
        const UNDERLINE = 0b0000_0100;
        /// Reverse video (swap fg/bg).
        const REVERSE   = 0b0000_1000;
    }
}

/// A single terminal cell.
///
/// # Default
///
/// The default cell is a blank with the default foreground, a transparent
/// (absent) background, no highlight and no attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// The character drawn at this position.
    pub ch: char,
    /// Foreground color.
    pub fg: Color,
    /// Background color; `None` inherits from the layers beneath.
    pub bg: Option<Color>,
    /// Whether the cell belongs to a highlighted (focused) element.
    pub highlighted: bool,
    /// Text attributes.
    pub attrs: StyleFlags,
}

impl Cell {
    /// Create a cell from a single character.
    #[inline]
    pub const fn from_char(ch: char) -> Self {
        Self {
            ch,
            fg: Color::Default,
            bg: None,
            highlighted: false,
            attrs: StyleFlags::empty(),
        }
    }

    /// A blank cell filled with `bg`.
    #[inline]
    pub const fn fill(bg: Color) -> Self {
        Self::from_char(' ').with_bg(bg)
    }

    /// Set the foreground color.
    #[inline]
    pub const fn with_fg(mut self, fg: Color) -> Self {
        self.fg = fg;
        self
    }

    /// Set the background color.
    #[inline]
    pub const fn with_bg(mut self, bg: Color) -> Self {
        self.bg = Some(bg);
        self
    }

    /// Set the text attributes.
    #[inline]
    pub const fn with_attrs(mut self, attrs: StyleFlags) -> Self {
        self.attrs = attrs;
        self
    }

    /// Set the highlight flag.
    #[inline]
    pub const fn with_highlight(mut self, highlighted: bool) -> Self {
        self.highlighted = highlighted;
        self
    }

    /// Replace an absent background with [`Color::Default`].
    #[inline]
    pub const fn resolved(mut self) -> Self {
        if self.bg.is_none() {
            self.bg = Some(Color::Default);
        }
        self
    }

    /// Attributes as they reach the terminal: highlight toggles reverse video.
    #[inline]
    pub fn effective_attrs(&self) -> StyleFlags {
        if self.highlighted {
            self.attrs ^ StyleFlags::REVERSE
        } else {
            self.attrs
        }
    }

    /// Display width of the character in cells.
    ///
    /// Control characters report 1 because they are written as blanks.
    #[inline]
    pub fn width(&self) -> usize {
        if self.ch.is_control() {
            1
        } else {
            self.ch.width().unwrap_or(1)
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::from_char(' ')
    }
}

#[cfg(test)]
mod tests {
    use super::{Cell, Color, StyleFlags};

    #[test]
    fn default_cell_is_transparent_blank() {
        let cell = Cell::default();
        assert_eq!(cell.ch, ' ');
        assert_eq!(cell.fg, Color::Default);
        assert_eq!(cell.bg, None);
        assert!(!cell.highlighted);
        assert!(cell.attrs.is_empty());
    }

    #[test]
    fn absent_background_differs_from_default_background() {
        let transparent = Cell::from_char('a');
        let defaulted = Cell::from_char('a').with_bg(Color::Default);
        assert_ne!(transparent, defaulted);
        assert_eq!(transparent.resolved(), defaulted);
    }

    #[test]
    fn resolved_keeps_concrete_background() {
        let cell = Cell::fill(Color::BLUE);
        assert_eq!(cell.resolved().bg, Some(Color::BLUE));
    }

    #[test]
    fn highlight_toggles_reverse() {
        let plain = Cell::from_char('x').with_attrs(StyleFlags::BOLD);
        assert_eq!(plain.effective_attrs(), StyleFlags::BOLD);

        let lit = plain.with_highlight(true);
        assert_eq!(lit.effective_attrs(), StyleFlags::BOLD | StyleFlags::REVERSE);

        let double = lit.with_attrs(StyleFlags::REVERSE);
        assert!(double.effective_attrs().is_empty());
    }

    #[test]
    fn width_of_wide_and_control_chars() {
        assert_eq!(Cell::from_char('A').width(), 1);
        assert_eq!(Cell::from_char('日').width(), 2);
        assert_eq!(Cell::from_char('\t').width(), 1);
    }

    #[test]
    fn palette_constants() {
        assert_eq!(Color::RED, Color::Ansi(1));
        assert_eq!(Color::BRIGHT_WHITE, Color::Ansi(15));
        assert_eq!(Color::rgb(1, 2, 3), Color::Rgb(1, 2, 3));
        assert_eq!(Color::default(), Color::Default);
    }
}
