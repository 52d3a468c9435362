//! Command dispatch.
//!
//! A decoded `Key` resolves through the command table selected by the current
//! `Mode` into a `Command`; `dispatcher::dispatch` applies it to `EditorState`
//! and reports the damage the render engine has to repaint. Keys with no
//! binding in the active table are silent no-ops.

pub mod command_table;
pub mod dispatcher;

pub use command_table::{CommandTable, Keymaps};
pub use dispatcher::{DispatchResult, dispatch, dispatch_key};

/// Editing operations a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    InsertChar(u8),
    InsertNewline,
    Backspace,
    DeleteForward,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Home,
    End,
    PageUp,
    PageDown,
    NewDocument,
    SaveAs,
    AcceptPrompt,
    RejectPrompt,
    Quit,
}
