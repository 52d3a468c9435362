//! Prompt sub-mode commands.
//!
//! Leaving the prompt (either way) restores the cursor parked on entry and
//! repaints only the status bar; the text area was never touched.

use core_state::{Damage, EditorState, PromptKind, PromptOutcome};
use tracing::info;

use super::DispatchResult;
use crate::Command;

pub(crate) fn handle_prompt(command: Command, state: &mut EditorState) -> DispatchResult {
    match command {
        Command::SaveAs => DispatchResult::damaged(state.enter_prompt(PromptKind::SaveAs)),
        Command::AcceptPrompt => match state.leave_prompt() {
            Some(outcome) => {
                let message = accepted_message(&outcome);
                info!(
                    target: "actions.dispatch",
                    kind = ?outcome.kind,
                    text = %outcome.text,
                    "prompt_accepted"
                );
                state.set_status(message);
                DispatchResult::posted(Damage::Status)
            }
            None => DispatchResult::clean(),
        },
        Command::RejectPrompt => match state.leave_prompt() {
            Some(_) => DispatchResult::damaged(Damage::Status),
            None => DispatchResult::clean(),
        },
        _ => DispatchResult::clean(),
    }
}

fn accepted_message(outcome: &PromptOutcome) -> String {
    match outcome.kind {
        PromptKind::SaveAs if outcome.text.is_empty() => "No file name given".to_string(),
        PromptKind::SaveAs => format!("Cannot save {}: saving is not supported", outcome.text),
    }
}
