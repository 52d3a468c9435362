//! Cursor motion commands. Edges of the document are silent no-ops.

use core_state::EditorState;

use super::DispatchResult;
use crate::Command;

pub(crate) fn handle_motion(command: Command, state: &mut EditorState) -> DispatchResult {
    let damage = match command {
        Command::MoveLeft => state.move_left(),
        Command::MoveRight => state.move_right(),
        Command::MoveUp => state.move_up(),
        Command::MoveDown => state.move_down(),
        Command::Home => state.move_home(),
        Command::End => state.move_end(),
        Command::PageUp => state.page_up(),
        Command::PageDown => state.page_down(),
        _ => return DispatchResult::clean(),
    };
    DispatchResult::damaged(damage)
}
