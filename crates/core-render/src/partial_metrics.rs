//! Repaint strategy counters.
//!
//! One counter per strategy the engine can execute plus a running total of
//! cells written. Tests use the snapshot to assert which strategy an edit
//! selected without inspecting terminal output.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RenderPathMetrics {
    /// Clear + repaint of every visible row and the status bar.
    pub full_frames: AtomicU64,
    /// Repaints starting at one line and running to the bottom of the text area.
    pub below_frames: AtomicU64,
    /// Repaints of the single line under the cursor.
    pub line_frames: AtomicU64,
    /// Status bar repaints (standalone or as part of a full frame).
    pub status_frames: AtomicU64,
    /// Frames that only moved the hardware cursor.
    pub cursor_frames: AtomicU64,
    /// Text rows painted across all strategies (status bar excluded).
    pub rows_painted: AtomicU64,
    /// Cells handed to the display.
    pub cells_written: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderPathMetricsSnapshot {
    pub full_frames: u64,
    pub below_frames: u64,
    pub line_frames: u64,
    pub status_frames: u64,
    pub cursor_frames: u64,
    pub rows_painted: u64,
    pub cells_written: u64,
}

impl RenderPathMetrics {
    pub fn snapshot(&self) -> RenderPathMetricsSnapshot {
        RenderPathMetricsSnapshot {
            full_frames: self.full_frames.load(Ordering::Relaxed),
            below_frames: self.below_frames.load(Ordering::Relaxed),
            line_frames: self.line_frames.load(Ordering::Relaxed),
            status_frames: self.status_frames.load(Ordering::Relaxed),
            cursor_frames: self.cursor_frames.load(Ordering::Relaxed),
            rows_painted: self.rows_painted.load(Ordering::Relaxed),
            cells_written: self.cells_written.load(Ordering::Relaxed),
        }
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }
}
