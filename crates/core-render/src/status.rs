//! Status bar composition.
//!
//! Two layouts share the bottom row:
//! * message: a leading blank, then the status message, padded to the width.
//! * prompt: the prompt label, then the live prompt line expanded with the
//!   same tab rule as document lines.
//!
//! The result is always exactly `width` cells so the bar never leaves residue.

use core_state::EditorState;
use core_text::width::expand_row;

pub fn status_cells(state: &EditorState) -> Vec<u8> {
    let width = usize::from(state.width());
    match state.active_prompt() {
        Some(prompt) => {
            let mut cells: Vec<u8> = prompt.label.bytes().take(width).collect();
            let origin = cells.len();
            let text = state.document().text(state.prompt_line());
            cells.extend(expand_row(text, origin, width));
            cells
        }
        None => {
            let mut cells = Vec::with_capacity(width);
            cells.push(b' ');
            cells.extend(state.status().bytes());
            cells.resize(width, b' ');
            cells
        }
    }
}
