#![forbid(unsafe_code)]

//! ANSI escape sequence generation helpers.
//!
//! Pure byte-generation functions for the control sequences the renderer
//! emits. No state is tracked here; the [`Renderer`](crate::renderer::Renderer)
//! decides *when* to emit, these helpers only decide *what*.
//!
//! # Sequence Reference
//!
//! | Category | Sequence | Description |
//! |----------|----------|-------------|
//! | CSI | `ESC [ n m` | SGR (Select Graphic Rendition) |
//! | CSI | `ESC [ row ; col H` | CUP (Cursor Position, 1-indexed) |
//! | CSI | `ESC [ 2 J` | ED (Erase Display) |
//! | CSI | `ESC [ ? 25 h/l` | Cursor visibility |
//! | CSI | `ESC [ ? 1049 h/l` | Alternate screen buffer |

use std::io::{self, Write};

use crate::cell::{Color, StyleFlags};

// =============================================================================
// SGR (Select Graphic Rendition)
// =============================================================================

/// SGR reset: `CSI 0 m`
pub const SGR_RESET: &[u8] = b"\x1b[0m";

/// Write SGR reset sequence.
#[inline]
pub fn sgr_reset<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(SGR_RESET)
}

/// SGR attribute codes for style flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SgrCodes {
    /// Enable code
    pub on: u8,
    /// Disable code
    pub off: u8,
}

/// SGR codes for bold (on=1, off=22).
pub const SGR_BOLD: SgrCodes = SgrCodes { on: 1, off: 22 };
/// SGR codes for italic (on=3, off=23).
pub const SGR_ITALIC: SgrCodes = SgrCodes { on: 3, off: 23 };
/// SGR codes for underline (on=4, off=24).
pub const SGR_UNDERLINE: SgrCodes = SgrCodes { on: 4, off: 24 };
/// SGR codes for reverse video (on=7, off=27).
pub const SGR_REVERSE: SgrCodes = SgrCodes { on: 7, off: 27 };

/// Ordered table of (flag, on/off codes) for iteration.
pub const FLAG_TABLE: [(StyleFlags, SgrCodes); 4] = [
    (StyleFlags::BOLD, SGR_BOLD),
    (StyleFlags::ITALIC, SGR_ITALIC),
    (StyleFlags::UNDERLINE, SGR_UNDERLINE),
    (StyleFlags::REVERSE, SGR_REVERSE),
];

#[inline]
fn write_u8_dec(buf: &mut [u8], n: u8) -> usize {
    if n >= 100 {
        buf[0] = b'0' + n / 100;
        buf[1] = b'0' + (n / 10) % 10;
        buf[2] = b'0' + n % 10;
        3
    } else if n >= 10 {
        buf[0] = b'0' + n / 10;
        buf[1] = b'0' + n % 10;
        2
    } else {
        buf[0] = b'0' + n;
        1
    }
}

/// Write a single-parameter SGR sequence: `CSI code m`.
#[inline]
pub fn sgr_code<W: Write>(w: &mut W, code: u8) -> io::Result<()> {
    let mut buf = [0u8; 6];
    buf[0] = 0x1b;
    buf[1] = b'[';
    let len = write_u8_dec(&mut buf[2..], code);
    buf[2 + len] = b'm';
    w.write_all(&buf[..2 + len + 1])
}

/// Switch every flag whose state differs between `from` and `to`.
///
/// Emits one on/off code per changed flag and nothing for unchanged ones.
/// The off codes in [`FLAG_TABLE`] are all distinct, so turning one flag off
/// never disturbs another.
pub fn sgr_flags_transition<W: Write>(
    w: &mut W,
    from: StyleFlags,
    to: StyleFlags,
) -> io::Result<()> {
    let changed = from ^ to;
    if changed.is_empty() {
        return Ok(());
    }
    for (flag, codes) in FLAG_TABLE {
        if changed.contains(flag) {
            let code = if to.contains(flag) { codes.on } else { codes.off };
            sgr_code(w, code)?;
        }
    }
    Ok(())
}

/// Write SGR sequence for true color foreground: `CSI 38;2;r;g;b m`
pub fn sgr_fg_rgb<W: Write>(w: &mut W, r: u8, g: u8, b: u8) -> io::Result<()> {
    write!(w, "\x1b[38;2;{r};{g};{b}m")
}

/// Write SGR sequence for true color background: `CSI 48;2;r;g;b m`
pub fn sgr_bg_rgb<W: Write>(w: &mut W, r: u8, g: u8, b: u8) -> io::Result<()> {
    write!(w, "\x1b[48;2;{r};{g};{b}m")
}

/// Write SGR sequence for 256-color foreground: `CSI 38;5;n m`
pub fn sgr_fg_256<W: Write>(w: &mut W, index: u8) -> io::Result<()> {
    write!(w, "\x1b[38;5;{index}m")
}

/// Write SGR sequence for 256-color background: `CSI 48;5;n m`
pub fn sgr_bg_256<W: Write>(w: &mut W, index: u8) -> io::Result<()> {
    write!(w, "\x1b[48;5;{index}m")
}

/// Write SGR sequence for 16-color foreground.
///
/// Uses codes 30-37 for normal colors, 90-97 for bright colors.
pub fn sgr_fg_16<W: Write>(w: &mut W, index: u8) -> io::Result<()> {
    let index = index & 0x0F;
    let code = if index < 8 { 30 + index } else { 90 + index - 8 };
    sgr_code(w, code)
}

/// Write SGR sequence for 16-color background.
///
/// Uses codes 40-47 for normal colors, 100-107 for bright colors.
pub fn sgr_bg_16<W: Write>(w: &mut W, index: u8) -> io::Result<()> {
    let index = index & 0x0F;
    let code = if index < 8 { 40 + index } else { 100 + index - 8 };
    sgr_code(w, code)
}

/// Write SGR default foreground: `CSI 39 m`
pub fn sgr_fg_default<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[39m")
}

/// Write SGR default background: `CSI 49 m`
pub fn sgr_bg_default<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[49m")
}

/// Write the foreground SGR sequence for `color`.
pub fn sgr_fg<W: Write>(w: &mut W, color: Color) -> io::Result<()> {
    match color {
        Color::Default => sgr_fg_default(w),
        Color::Ansi(index) => sgr_fg_16(w, index),
        Color::Indexed(index) => sgr_fg_256(w, index),
        Color::Rgb(r, g, b) => sgr_fg_rgb(w, r, g, b),
    }
}

/// Write the background SGR sequence for `color`.
pub fn sgr_bg<W: Write>(w: &mut W, color: Color) -> io::Result<()> {
    match color {
        Color::Default => sgr_bg_default(w),
        Color::Ansi(index) => sgr_bg_16(w, index),
        Color::Indexed(index) => sgr_bg_256(w, index),
        Color::Rgb(r, g, b) => sgr_bg_rgb(w, r, g, b),
    }
}

// =============================================================================
// Cursor Positioning
// =============================================================================

/// CUP (Cursor Position): `CSI row ; col H` (1-indexed)
///
/// Row and col are 0-indexed input, converted to 1-indexed for ANSI.
pub fn cup<W: Write>(w: &mut W, row: u16, col: u16) -> io::Result<()> {
    write!(
        w,
        "\x1b[{};{}H",
        u32::from(row) + 1,
        u32::from(col) + 1
    )
}

/// Hide cursor: `CSI ? 25 l`
pub const CURSOR_HIDE: &[u8] = b"\x1b[?25l";

/// Show cursor: `CSI ? 25 h`
pub const CURSOR_SHOW: &[u8] = b"\x1b[?25h";

/// Write hide cursor.
#[inline]
pub fn cursor_hide<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(CURSOR_HIDE)
}

/// Write show cursor.
#[inline]
pub fn cursor_show<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(CURSOR_SHOW)
}

// =============================================================================
// Erase / Screen Modes
// =============================================================================

/// ED (Erase Display), entire screen: `CSI 2 J`
pub const ERASE_DISPLAY: &[u8] = b"\x1b[2J";

/// Write erase entire display.
#[inline]
pub fn erase_display<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(ERASE_DISPLAY)
}

/// Enable alternate screen: `CSI ? 1049 h`
pub const ALT_SCREEN_ENTER: &[u8] = b"\x1b[?1049h";

/// Disable alternate screen: `CSI ? 1049 l`
pub const ALT_SCREEN_LEAVE: &[u8] = b"\x1b[?1049l";

/// Write alternate screen enter.
#[inline]
pub fn alt_screen_enter<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(ALT_SCREEN_ENTER)
}

/// Write alternate screen leave.
#[inline]
pub fn alt_screen_leave<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(ALT_SCREEN_LEAVE)
}

// =============================================================================
// Tests
// =============================================================================
