//! Terminal setup and teardown.
//!
//! The editor runs in raw mode on the alternate screen with a visible cursor.
//! `TerminalGuard` leaves both on drop so an error unwinding out of the key
//! loop still hands the user back a usable shell.

use anyhow::Result;
use crossterm::{
    cursor::Show,
    execute,
    style::ResetColor,
    terminal::{
        self, EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode,
        enable_raw_mode,
    },
};
use std::io::stdout;
use tracing::{debug, warn};

/// Screen used when the size query fails.
pub const FALLBACK_SIZE: ScreenSize = ScreenSize {
    width: 80,
    height: 25,
};

/// Terminal dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u16,
    pub height: u16,
}

impl ScreenSize {
    /// At least one column and two rows (one text row plus the status bar).
    pub fn clamped(width: u16, height: u16) -> Self {
        Self {
            width: width.max(1),
            height: height.max(2),
        }
    }
}

pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
    fn set_title(&mut self, title: &str) -> Result<()>;
    fn size(&self) -> ScreenSize;
}

pub struct CrosstermBackend {
    entered: bool,
}

/// RAII guard ensuring terminal state restoration even if caller early-returns or panics.
pub struct TerminalGuard<'a> {
    backend: &'a mut CrosstermBackend,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self { entered: false }
    }

    /// Enter and return a guard that will leave on drop.
    pub fn enter_guard(&mut self) -> Result<TerminalGuard<'_>> {
        self.enter()?;
        Ok(TerminalGuard { backend: self })
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Show)?;
            self.entered = true;
            debug!(target: "runtime", "terminal_enter");
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            execute!(stdout(), ResetColor, LeaveAlternateScreen, Show)?;
            disable_raw_mode()?;
            self.entered = false;
            debug!(target: "runtime", "terminal_leave");
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        execute!(stdout(), SetTitle(title))?;
        Ok(())
    }

    fn size(&self) -> ScreenSize {
        match terminal::size() {
            Ok((w, h)) => ScreenSize::clamped(w, h),
            Err(e) => {
                warn!(target: "runtime", error = %e, "terminal_size_unavailable");
                FALLBACK_SIZE
            }
        }
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl TerminalGuard<'_> {
    pub fn backend(&mut self) -> &mut CrosstermBackend {
        self.backend
    }
}

impl Drop for TerminalGuard<'_> {
    fn drop(&mut self) {
        let _ = self.backend.leave();
    }
}
