//! In-memory `Display` used by tests and headless runs.

use anyhow::Result;

use crate::{ColorPair, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub byte: u8,
    pub colors: ColorPair,
}

#[derive(Debug)]
pub struct GridDisplay {
    width: u16,
    height: u16,
    cells: Vec<GridCell>,
    cursor: (u16, u16),
    writes: u64,
    flushes: u64,
}

impl GridDisplay {
    pub fn new(width: u16, height: u16) -> Self {
        let blank = GridCell {
            byte: b' ',
            colors: ColorPair::default(),
        };
        Self {
            width,
            height,
            cells: vec![blank; usize::from(width) * usize::from(height)],
            cursor: (0, 0),
            writes: 0,
            flushes: 0,
        }
    }

    fn index(&self, row: u16, col: u16) -> Option<usize> {
        (row < self.height && col < self.width)
            .then(|| usize::from(row) * usize::from(self.width) + usize::from(col))
    }

    pub fn cell(&self, row: u16, col: u16) -> Option<GridCell> {
        self.index(row, col).map(|i| self.cells[i])
    }

    /// Full row text including trailing blanks.
    pub fn row_text(&self, row: u16) -> String {
        (0..self.width)
            .filter_map(|col| self.cell(row, col))
            .map(|c| char::from(c.byte))
            .collect()
    }

    /// Row text without trailing blanks.
    pub fn row_trimmed(&self, row: u16) -> String {
        self.row_text(row).trim_end().to_string()
    }

    /// (row, col) of the hardware cursor.
    pub fn cursor(&self) -> (u16, u16) {
        self.cursor
    }

    /// Cells written since creation or the last `reset_writes`.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn reset_writes(&mut self) {
        self.writes = 0;
    }

    pub fn flushes(&self) -> u64 {
        self.flushes
    }
}

impl Display for GridDisplay {
    fn put_cell(&mut self, row: u16, col: u16, byte: u8, colors: ColorPair) {
        if let Some(i) = self.index(row, col) {
            self.cells[i] = GridCell { byte, colors };
            self.writes += 1;
        }
    }

    fn set_cursor(&mut self, row: u16, col: u16) {
        self.cursor = (row, col);
    }

    fn clear(&mut self, colors: ColorPair) {
        for cell in &mut self.cells {
            *cell = GridCell { byte: b' ', colors };
        }
        self.cursor = (0, 0);
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
