//! Repaint strategies.
//!
//! The engine never decides how much to redraw by itself: dispatch reports a
//! `Damage` value and `render` maps it onto the cheapest correct strategy.
//!
//! | damage      | strategy                                                   |
//! |-------------|------------------------------------------------------------|
//! | `Cursor`    | move the hardware cursor only                              |
//! | `Line`      | repaint the cursor line (the status bar while prompting)   |
//! | `Below(l)`  | repaint `l` and every row under it down to the status bar  |
//! | `Full`      | clear, repaint every text row from the scroll line, status |
//! | `Status`    | repaint the status bar                                     |
//!
//! Every painted row covers the full screen width; rows past the end of the
//! document are painted blank so shrinking content leaves nothing behind.
//! Each strategy ends by repositioning the hardware cursor and flushing.

use anyhow::Result;
use core_state::{Damage, EditorState};
use core_text::LineId;
use core_text::width::expand_row;
use tracing::{debug, trace};

use crate::partial_metrics::{RenderPathMetrics, RenderPathMetricsSnapshot};
use crate::status::status_cells;
use crate::{Display, Palette};

#[derive(Debug, Default)]
pub struct RenderEngine {
    palette: Palette,
    metrics: RenderPathMetrics,
}

impl RenderEngine {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            metrics: RenderPathMetrics::default(),
        }
    }

    pub fn metrics_snapshot(&self) -> RenderPathMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Repaint whatever `damage` covers and flush the display.
    pub fn render<D: Display + ?Sized>(
        &mut self,
        state: &EditorState,
        display: &mut D,
        damage: Damage,
    ) -> Result<()> {
        match damage {
            Damage::None => return Ok(()),
            Damage::Cursor => {
                RenderPathMetrics::bump(&self.metrics.cursor_frames, 1);
                self.place_cursor(state, display);
            }
            Damage::Line => self.render_line(state, display),
            Damage::Below(line) => self.render_below(state, display, line),
            Damage::Full => self.render_full(state, display),
            Damage::Status => self.render_status(state, display),
        }
        display.flush()
    }

    /// Clear and repaint the whole screen starting at the scroll line.
    pub fn render_full<D: Display + ?Sized>(&mut self, state: &EditorState, display: &mut D) {
        RenderPathMetrics::bump(&self.metrics.full_frames, 1);
        display.clear(self.palette.normal);
        let painted = self.paint_rows(state, display, 0, Some(state.scroll().line));
        debug!(target: "render.engine", painted, "full");
        self.paint_status(state, display);
        self.place_cursor(state, display);
    }

    /// Repaint `line` and everything below it on screen. Falls back to a full
    /// repaint if `line` is not visible.
    pub fn render_below<D: Display + ?Sized>(
        &mut self,
        state: &EditorState,
        display: &mut D,
        line: LineId,
    ) {
        let Some(row) = state.row_of(line).filter(|&r| r < state.text_rows()) else {
            trace!(target: "render.engine", "below_not_visible");
            self.render_full(state, display);
            return;
        };
        RenderPathMetrics::bump(&self.metrics.below_frames, 1);
        let painted = self.paint_rows(state, display, row, Some(line));
        trace!(target: "render.engine", row, painted, "below");
        self.place_cursor(state, display);
    }

    /// Repaint only the line under the cursor.
    pub fn render_line<D: Display + ?Sized>(&mut self, state: &EditorState, display: &mut D) {
        if state.in_prompt() {
            self.render_status(state, display);
            return;
        }
        RenderPathMetrics::bump(&self.metrics.line_frames, 1);
        let row = state.cursor_row();
        let text = state.document().text(state.cursor().line);
        self.paint_text_row(display, row, text, state.width());
        self.place_cursor(state, display);
    }

    /// Repaint the status bar in inverted colors.
    pub fn render_status<D: Display + ?Sized>(&mut self, state: &EditorState, display: &mut D) {
        self.paint_status(state, display);
        self.place_cursor(state, display);
    }

    fn paint_status<D: Display + ?Sized>(&mut self, state: &EditorState, display: &mut D) {
        RenderPathMetrics::bump(&self.metrics.status_frames, 1);
        let row = state.status_row() as u16;
        let cells = status_cells(state);
        for (col, byte) in cells.iter().enumerate() {
            display.put_cell(row, col as u16, *byte, self.palette.status);
        }
        RenderPathMetrics::bump(&self.metrics.cells_written, cells.len() as u64);
    }

    /// Paint text rows from `first_row` down, walking lines from `start`.
    /// Rows with no line left are painted blank. Returns rows painted.
    fn paint_rows<D: Display + ?Sized>(
        &mut self,
        state: &EditorState,
        display: &mut D,
        first_row: usize,
        start: Option<LineId>,
    ) -> usize {
        let doc = state.document();
        let mut line = start;
        let mut row = first_row;
        while row < state.text_rows() {
            let text: &[u8] = match line {
                Some(id) => doc.text(id),
                None => &[],
            };
            self.paint_text_row(display, row, text, state.width());
            line = line.and_then(|id| doc.next(id));
            row += 1;
        }
        row - first_row
    }

    fn paint_text_row<D: Display + ?Sized>(
        &mut self,
        display: &mut D,
        row: usize,
        text: &[u8],
        width: u16,
    ) {
        let cells = expand_row(text, 0, usize::from(width));
        for (col, byte) in cells.iter().enumerate() {
            display.put_cell(row as u16, col as u16, *byte, self.palette.normal);
        }
        RenderPathMetrics::bump(&self.metrics.rows_painted, 1);
        RenderPathMetrics::bump(&self.metrics.cells_written, cells.len() as u64);
    }

    /// Move the hardware cursor to the cursor's screen position.
    pub fn place_cursor<D: Display + ?Sized>(&self, state: &EditorState, display: &mut D) {
        let max_col = usize::from(state.width()) - 1;
        let col = state.cursor_column().min(max_col) as u16;
        let row = state.cursor_row() as u16;
        display.set_cursor(row, col);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridDisplay;
    use core_text::Document;

    fn setup(width: u16, height: u16) -> (EditorState, GridDisplay, RenderEngine) {
        let doc = Document::with_budget(16 * 1024).unwrap();
        let state = EditorState::new(doc, width, height).unwrap();
        (
            state,
            GridDisplay::new(width, height),
            RenderEngine::new(Palette::default()),
        )
    }

    #[test]
    fn none_damage_does_not_flush() {
        let (state, mut grid, mut engine) = setup(10, 4);
        engine.render(&state, &mut grid, Damage::None).unwrap();
        assert_eq!(grid.flushes(), 0);
        assert_eq!(grid.writes(), 0);
    }

    #[test]
    fn line_repaint_writes_exactly_one_row() {
        let (mut state, mut grid, mut engine) = setup(10, 4);
        engine.render(&state, &mut grid, Damage::Full).unwrap();
        grid.reset_writes();
        let damage = state.insert_char(b'x').unwrap();
        engine.render(&state, &mut grid, damage).unwrap();
        assert_eq!(grid.writes(), 10);
        assert_eq!(grid.row_trimmed(0), "x");
        assert_eq!(grid.cursor(), (0, 1));
        assert_eq!(engine.metrics_snapshot().line_frames, 1);
    }

    #[test]
    fn cursor_beyond_width_is_clamped() {
        let (mut state, mut grid, mut engine) = setup(4, 3);
        for b in b"abcdef" {
            state.insert_char(*b).unwrap();
        }
        engine.render(&state, &mut grid, Damage::Full).unwrap();
        assert_eq!(grid.row_text(0), "abcd");
        assert_eq!(grid.cursor(), (0, 3));
    }
}
