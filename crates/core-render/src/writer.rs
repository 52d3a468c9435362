//! Crossterm-backed `Display`.
//!
//! Cells are not written immediately. Consecutive cells on one row that share
//! a color pair accumulate into a single run; a run closes on any jump in
//! position or change of colors and becomes `MoveTo` (+ `Colors`) + `Print`.
//! Nothing reaches the terminal until `flush`, which queues every command,
//! restores the hardware cursor and flushes stdout once.
//!
//! Bytes map to chars one to one (Latin-1), matching the single-byte text model.

use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Print, SetColors},
    terminal::{Clear, ClearType},
};
use std::io::{Write, stdout};

use crate::{ColorPair, Display};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MoveTo(u16, u16),
    Colors(ColorPair),
    Print(String),
    ClearAll,
}

#[derive(Debug)]
struct Run {
    row: u16,
    next_col: u16,
    text: String,
}

#[derive(Debug, Default)]
pub struct CrosstermDisplay {
    cmds: Vec<Command>,
    run: Option<Run>,
    colors: Option<ColorPair>,
    cursor: (u16, u16),
    pub print_commands: u64,
}

impl CrosstermDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    fn close_run(&mut self) {
        if let Some(run) = self.run.take() {
            self.cmds.push(Command::Print(run.text));
            self.print_commands += 1;
        }
    }

    /// Commands queued since the last flush (after closing any open run).
    pub fn take_commands(&mut self) -> Vec<Command> {
        self.close_run();
        std::mem::take(&mut self.cmds)
    }
}

impl Display for CrosstermDisplay {
    fn put_cell(&mut self, row: u16, col: u16, byte: u8, colors: ColorPair) {
        let same_colors = self.colors == Some(colors);
        if let Some(run) = self.run.as_mut()
            && same_colors
            && run.row == row
            && run.next_col == col
        {
            run.text.push(char::from(byte));
            run.next_col += 1;
            return;
        }
        self.close_run();
        self.cmds.push(Command::MoveTo(col, row));
        if !same_colors {
            self.cmds.push(Command::Colors(colors));
            self.colors = Some(colors);
        }
        self.run = Some(Run {
            row,
            next_col: col + 1,
            text: char::from(byte).to_string(),
        });
    }

    fn set_cursor(&mut self, row: u16, col: u16) {
        self.cursor = (row, col);
    }

    fn clear(&mut self, colors: ColorPair) {
        self.close_run();
        self.cmds.push(Command::Colors(colors));
        self.cmds.push(Command::ClearAll);
        self.colors = Some(colors);
    }

    fn flush(&mut self) -> Result<()> {
        let cmds = self.take_commands();
        let mut out = stdout();
        for c in cmds {
            match c {
                Command::MoveTo(x, y) => queue!(out, MoveTo(x, y))?,
                Command::Colors(pair) => queue!(out, SetColors(pair.into()))?,
                Command::Print(s) => queue!(out, Print(s))?,
                Command::ClearAll => queue!(out, Clear(ClearType::All))?,
            }
        }
        let (row, col) = self.cursor;
        queue!(out, MoveTo(col, row))?;
        out.flush()?;
        Ok(())
    }
}
