//! Text mutation commands.

use core_state::EditorState;
use core_text::AllocError;

use super::DispatchResult;
use crate::Command;

pub(crate) fn handle_edit(
    command: Command,
    state: &mut EditorState,
) -> Result<DispatchResult, AllocError> {
    let damage = match command {
        Command::InsertChar(byte) => state.insert_char(byte)?,
        Command::InsertNewline => state.insert_newline()?,
        Command::Backspace => state.backspace()?,
        Command::DeleteForward => state.delete_forward()?,
        Command::NewDocument => {
            if state.in_prompt() {
                return Ok(DispatchResult::clean());
            }
            state.new_document()?
        }
        _ => return Ok(DispatchResult::clean()),
    };
    Ok(DispatchResult::damaged(damage))
}
