//! Screen output: the `Display` seam, color pairs, and the repaint engine.
//!
//! Components:
//! - `render_engine`: maps `Damage` to a repaint strategy (cursor, line,
//!   line-and-below, full, status) and paints through a `Display`.
//! - `status`: composes the bottom status bar (message or live prompt).
//! - `writer`: crossterm `Display` batching same-colored cell runs.
//! - `grid`: in-memory `Display` for tests and headless use.
//! - `partial_metrics`: per-strategy counters.
//!
//! Invariants:
//! - Every painted row spans the full width (blank padded).
//! - Text rows use `Palette::normal`; the status row uses `Palette::status`.
//!   Colors are carried per cell, so leaving the status bar never leaks the
//!   inverted pair into text rows.
//! - Column layout for text and cursor placement both go through
//!   `core_text::width`.

use anyhow::Result;
use crossterm::style::{Color, Colors};

pub mod grid;
pub mod partial_metrics;
pub mod render_engine;
pub mod status;
pub mod writer;

pub use grid::GridDisplay;
pub use render_engine::RenderEngine;
pub use writer::CrosstermDisplay;

/// Raster output the engine paints into.
pub trait Display {
    /// Write one cell. Out of range positions are ignored.
    fn put_cell(&mut self, row: u16, col: u16, byte: u8, colors: ColorPair);
    /// Position the hardware cursor.
    fn set_cursor(&mut self, row: u16, col: u16);
    /// Blank the whole screen in `colors` and home the cursor.
    fn clear(&mut self, colors: ColorPair);
    fn flush(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPair {
    pub fg: Color,
    pub bg: Color,
}

impl ColorPair {
    pub const fn new(fg: Color, bg: Color) -> Self {
        Self { fg, bg }
    }

    pub const fn inverted(self) -> Self {
        Self {
            fg: self.bg,
            bg: self.fg,
        }
    }
}

impl From<ColorPair> for Colors {
    fn from(pair: ColorPair) -> Self {
        Colors::new(pair.fg, pair.bg)
    }
}

impl Default for ColorPair {
    fn default() -> Self {
        Self::new(Color::Grey, Color::DarkBlue)
    }
}

/// Text colors and the inverted status bar colors derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub normal: ColorPair,
    pub status: ColorPair,
}

impl Palette {
    pub fn from_normal(normal: ColorPair) -> Self {
        Self {
            normal,
            status: normal.inverted(),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_normal(ColorPair::default())
    }
}
