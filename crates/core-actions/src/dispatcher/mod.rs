//! Applies a `Command` to `EditorState`.
//!
//! Sub-modules:
//! * `edit`   - text mutation (insert, newline, backspace, delete, new document)
//! * `motion` - cursor movement and paging
//! * `prompt` - opening, accepting and rejecting the status bar prompt
//!
//! Every handler returns the `Damage` reported by the state operation it
//! drives; the dispatcher never repaints by itself.

use core_events::Key;
use core_state::{Damage, EditorState};
use core_text::AllocError;
use tracing::trace;

use crate::{Command, Keymaps};

mod edit;
mod motion;
mod prompt;

/// Result of dispatching a single `Command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    pub damage: Damage,
    pub quit: bool,
    /// The command wrote its own status bar message; the key loop must not
    /// overwrite it with key diagnostics.
    pub status_posted: bool,
}

impl DispatchResult {
    pub fn damaged(damage: Damage) -> Self {
        Self {
            damage,
            quit: false,
            status_posted: false,
        }
    }

    pub fn clean() -> Self {
        Self::damaged(Damage::None)
    }

    pub fn quit() -> Self {
        Self {
            damage: Damage::None,
            quit: true,
            status_posted: false,
        }
    }

    pub fn posted(damage: Damage) -> Self {
        Self {
            damage,
            quit: false,
            status_posted: true,
        }
    }
}

/// Apply `command` to the editor. Only allocation failures are errors.
pub fn dispatch(command: Command, state: &mut EditorState) -> Result<DispatchResult, AllocError> {
    let result = match command {
        Command::InsertChar(_)
        | Command::InsertNewline
        | Command::Backspace
        | Command::DeleteForward
        | Command::NewDocument => edit::handle_edit(command, state)?,
        Command::MoveLeft
        | Command::MoveRight
        | Command::MoveUp
        | Command::MoveDown
        | Command::Home
        | Command::End
        | Command::PageUp
        | Command::PageDown => motion::handle_motion(command, state),
        Command::SaveAs | Command::AcceptPrompt | Command::RejectPrompt => {
            prompt::handle_prompt(command, state)
        }
        Command::Quit => DispatchResult::quit(),
    };
    trace!(
        target: "actions.dispatch",
        ?command,
        damage = ?result.damage,
        line = state.cursor().line.index(),
        offset = state.cursor().offset,
        "dispatch"
    );
    Ok(result)
}

/// Resolve `key` through the table active for the current mode and dispatch
/// it. Unbound keys are a no-op.
pub fn dispatch_key(
    keymaps: &Keymaps,
    key: Key,
    state: &mut EditorState,
) -> Result<DispatchResult, AllocError> {
    match keymaps.lookup(state.mode(), key) {
        Some(command) => dispatch(command, state),
        None => Ok(DispatchResult::clean()),
    }
}
