//! Single-line prompt sub-mode.
//!
//! The prompt owns one detached line allocated once at the largest size
//! class. While a prompt is open the cursor points into that line and the
//! document cursor waits in `saved_cursor` until the prompt is accepted or
//! rejected.

use core_text::{LineId, Location};

/// Longest label (in bytes) shown in front of the prompt line.
pub const PROMPT_LABEL_MAX: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    SaveAs,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::SaveAs => "Save as:",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActivePrompt {
    pub kind: PromptKind,
    pub label: String,
    pub saved_cursor: Location,
}

impl ActivePrompt {
    pub(crate) fn new(kind: PromptKind, label: &str, saved_cursor: Location) -> Self {
        let mut end = label.len().min(PROMPT_LABEL_MAX);
        while !label.is_char_boundary(end) {
            end -= 1;
        }
        Self {
            kind,
            label: label[..end].to_string(),
            saved_cursor,
        }
    }
}

/// Text captured when a prompt closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOutcome {
    pub kind: PromptKind,
    pub text: String,
}

#[derive(Debug)]
pub(crate) struct PromptBuffer {
    pub(crate) line: LineId,
    pub(crate) active: Option<ActivePrompt>,
}
