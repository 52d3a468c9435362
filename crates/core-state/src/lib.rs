//! Editor state: document, cursor and scroll anchors, prompt sub-mode and the
//! status message.
//!
//! Both `cursor` and `scroll` are `Location`s into the live document. The
//! scroll anchor names the line drawn on screen row 0; only its `line` is
//! meaningful. Every mutator keeps the cursor line within the visible text
//! rows (`height - 1`, the last row belongs to the status bar) and reports the
//! screen area it disturbed as a `Damage` value so the caller can pick the
//! cheapest repaint.
//!
//! Invariants (after every public call):
//! * `cursor.offset <= len(cursor.line)`.
//! * `scroll.line` is at or above `cursor.line` and the distance between them
//!   is below `text_rows()` (outside prompt mode).
//! * In prompt mode `cursor.line` is the prompt line; the document cursor is
//!   parked in the active prompt and restored on exit.

use core_text::width::column_of;
use core_text::{AllocError, Deletion, Document, LineId, Location, MAX_LINE_CAPACITY, Regrowth};
use tracing::{debug, trace};

mod prompt;
pub use prompt::{ActivePrompt, PROMPT_LABEL_MAX, PromptKind, PromptOutcome};
use prompt::PromptBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Prompt,
}

/// Screen area invalidated by a state change, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damage {
    /// Nothing visible changed.
    None,
    /// Only the cursor position changed.
    Cursor,
    /// The cursor line changed in place.
    Line,
    /// The given line and everything below it on screen changed.
    Below(LineId),
    /// The viewport moved; everything must be redrawn.
    Full,
    /// Only the status bar changed.
    Status,
}

#[derive(Debug)]
pub struct EditorState {
    document: Document,
    cursor: Location,
    scroll: Location,
    width: u16,
    height: u16,
    prompt: PromptBuffer,
    status: String,
}

impl EditorState {
    /// Wrap `document` for a `width` x `height` screen.
    pub fn new(mut document: Document, width: u16, height: u16) -> Result<Self, AllocError> {
        let prompt_line = document.allocate_detached(MAX_LINE_CAPACITY)?;
        let head = Location::start_of(document.head());
        Ok(Self {
            document,
            cursor: head,
            scroll: head,
            width: width.max(1),
            height: height.max(2),
            prompt: PromptBuffer {
                line: prompt_line,
                active: None,
            },
            status: String::new(),
        })
    }

    /// Replace the document with a fresh single empty line.
    pub fn new_document(&mut self) -> Result<Damage, AllocError> {
        let head = self.document.reset()?;
        self.cursor = Location::start_of(head);
        self.scroll = self.cursor;
        self.prompt.active = None;
        Ok(Damage::Full)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn cursor(&self) -> Location {
        self.cursor
    }

    pub fn scroll(&self) -> Location {
        self.scroll
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Rows available for document text (the last row is the status bar).
    pub fn text_rows(&self) -> usize {
        usize::from(self.height) - 1
    }

    pub fn status_row(&self) -> usize {
        self.text_rows()
    }

    pub fn mode(&self) -> Mode {
        if self.prompt.active.is_some() {
            Mode::Prompt
        } else {
            Mode::Normal
        }
    }

    pub fn in_prompt(&self) -> bool {
        self.prompt.active.is_some()
    }

    pub fn active_prompt(&self) -> Option<&ActivePrompt> {
        self.prompt.active.as_ref()
    }

    pub fn prompt_line(&self) -> LineId {
        self.prompt.line
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
        trace!(target: "state.status", status = %self.status, "set");
    }

    /// Screen row of `line` relative to the scroll anchor, if it is visible.
    pub fn row_of(&self, line: LineId) -> Option<usize> {
        if line == self.prompt.line {
            return Some(self.status_row());
        }
        self.document
            .lines_from(self.scroll.line)
            .take(self.text_rows())
            .position(|id| id == line)
    }

    /// Screen row of the cursor.
    pub fn cursor_row(&self) -> usize {
        if self.in_prompt() {
            return self.status_row();
        }
        self.document
            .lines_from(self.scroll.line)
            .position(|id| id == self.cursor.line)
            .unwrap_or(0)
    }

    /// Screen column of the cursor, expanding tabs over the bytes before it.
    pub fn cursor_column(&self) -> usize {
        let origin = self.active_prompt().map_or(0, |p| p.label.len());
        column_of(
            self.document.text(self.cursor.line),
            self.cursor.offset,
            origin,
        )
    }

    fn remap(&mut self, regrowth: Option<Regrowth>) {
        if let Some(r) = regrowth {
            r.remap(&mut self.cursor);
            r.remap(&mut self.scroll);
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Edits
    // ---------------------------------------------------------------------------------------------

    /// Insert one byte at the cursor.
    pub fn insert_char(&mut self, byte: u8) -> Result<Damage, AllocError> {
        if self.in_prompt()
            && self.document.line_len(self.cursor.line) >= self.document.capacity(self.cursor.line)
        {
            return Ok(Damage::None);
        }
        let mut cursor = self.cursor;
        let regrowth = self.document.insert(&mut cursor, byte)?;
        self.remap(regrowth);
        self.cursor = cursor;
        Ok(Damage::Line)
    }

    /// Split the cursor line; scrolls when the cursor was on the last text row.
    pub fn insert_newline(&mut self) -> Result<Damage, AllocError> {
        if self.in_prompt() {
            return Ok(Damage::None);
        }
        let row = self.cursor_row();
        let original = self.cursor.line;
        let mut cursor = self.cursor;
        self.document.split(&mut cursor)?;
        self.cursor = cursor;

        if row + 1 >= self.text_rows() {
            self.scroll_down();
            Ok(Damage::Full)
        } else {
            Ok(Damage::Below(original))
        }
    }

    /// Delete the byte before the cursor, merging lines at a line start.
    pub fn backspace(&mut self) -> Result<Damage, AllocError> {
        let mut cursor = self.cursor;
        let outcome = self.document.delete_before(&mut cursor)?;
        Ok(self.apply_deletion(cursor, outcome))
    }

    /// Delete the byte under the cursor, merging the next line at a line end.
    pub fn delete_forward(&mut self) -> Result<Damage, AllocError> {
        let mut cursor = self.cursor;
        let outcome = self.document.delete_at(&mut cursor)?;
        Ok(self.apply_deletion(cursor, outcome))
    }

    fn apply_deletion(&mut self, cursor: Location, outcome: Deletion) -> Damage {
        match outcome {
            Deletion::Unchanged => Damage::None,
            Deletion::InLine => {
                self.cursor = cursor;
                Damage::Line
            }
            Deletion::Merged {
                into,
                removed,
                regrowth,
            } => {
                self.remap(regrowth);
                self.cursor = cursor;
                debug!(target: "state.edit", lines = self.document.line_count(), "merged");
                if self.scroll.line == removed {
                    self.scroll = Location::start_of(into);
                    Damage::Full
                } else {
                    Damage::Below(into)
                }
            }
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Motion
    // ---------------------------------------------------------------------------------------------

    fn scroll_down(&mut self) -> bool {
        match self.document.next(self.scroll.line) {
            Some(next) => {
                self.scroll = Location::start_of(next);
                trace!(target: "state.cursor", "scroll_down");
                true
            }
            None => false,
        }
    }

    fn scroll_up(&mut self) -> bool {
        match self.document.prev(self.scroll.line) {
            Some(prev) => {
                self.scroll = Location::start_of(prev);
                trace!(target: "state.cursor", "scroll_up");
                true
            }
            None => false,
        }
    }

    fn clamp_offset(&mut self) {
        let len = self.document.line_len(self.cursor.line);
        if self.cursor.offset > len {
            self.cursor.offset = len;
        }
    }

    fn moved(scrolled: bool) -> Damage {
        if scrolled { Damage::Full } else { Damage::Cursor }
    }

    pub fn move_up(&mut self) -> Damage {
        if self.in_prompt() {
            return Damage::None;
        }
        let Some(prev) = self.document.prev(self.cursor.line) else {
            return Damage::None;
        };
        let scrolled = self.scroll.line == self.cursor.line && self.scroll_up();
        self.cursor.line = prev;
        self.clamp_offset();
        Self::moved(scrolled)
    }

    pub fn move_down(&mut self) -> Damage {
        if self.in_prompt() {
            return Damage::None;
        }
        let Some(next) = self.document.next(self.cursor.line) else {
            return Damage::None;
        };
        let scrolled = self.cursor_row() + 1 >= self.text_rows() && self.scroll_down();
        self.cursor.line = next;
        self.clamp_offset();
        Self::moved(scrolled)
    }

    /// One byte left; from a line start continue at the end of the previous line.
    pub fn move_left(&mut self) -> Damage {
        if self.cursor.offset > 0 {
            self.cursor.offset -= 1;
            return Damage::Cursor;
        }
        if self.in_prompt() || self.document.prev(self.cursor.line).is_none() {
            return Damage::None;
        }
        let damage = self.move_up();
        self.cursor.offset = self.document.line_len(self.cursor.line);
        damage
    }

    /// One byte right; from a line end continue at the start of the next line.
    pub fn move_right(&mut self) -> Damage {
        if self.cursor.offset < self.document.line_len(self.cursor.line) {
            self.cursor.offset += 1;
            return Damage::Cursor;
        }
        if self.in_prompt() || self.document.next(self.cursor.line).is_none() {
            return Damage::None;
        }
        self.cursor.offset = 0;
        self.move_down()
    }

    pub fn move_home(&mut self) -> Damage {
        if self.cursor.offset == 0 {
            return Damage::None;
        }
        self.cursor.offset = 0;
        Damage::Cursor
    }

    pub fn move_end(&mut self) -> Damage {
        let len = self.document.line_len(self.cursor.line);
        if self.cursor.offset == len {
            return Damage::None;
        }
        self.cursor.offset = len;
        Damage::Cursor
    }

    /// Move a screenful down, dragging the viewport along.
    pub fn page_down(&mut self) -> Damage {
        if self.in_prompt() {
            return Damage::None;
        }
        let mut steps = 0;
        while steps < self.text_rows() {
            let Some(next) = self.document.next(self.cursor.line) else {
                break;
            };
            self.cursor.line = next;
            self.scroll_down();
            steps += 1;
        }
        if steps == 0 {
            return Damage::None;
        }
        self.clamp_offset();
        Damage::Full
    }

    /// Move a screenful up, dragging the viewport along.
    pub fn page_up(&mut self) -> Damage {
        if self.in_prompt() {
            return Damage::None;
        }
        let mut steps = 0;
        let mut scrolled = false;
        while steps < self.text_rows() {
            let Some(prev) = self.document.prev(self.cursor.line) else {
                break;
            };
            self.cursor.line = prev;
            scrolled |= self.scroll_up();
            steps += 1;
        }
        if steps == 0 {
            return Damage::None;
        }
        self.clamp_offset();
        Self::moved(scrolled)
    }

    // ---------------------------------------------------------------------------------------------
    // Prompt
    // ---------------------------------------------------------------------------------------------

    /// Open a prompt, parking the document cursor.
    pub fn enter_prompt(&mut self, kind: PromptKind) -> Damage {
        if self.in_prompt() {
            return Damage::None;
        }
        self.document.clear_line(self.prompt.line);
        self.prompt.active = Some(ActivePrompt::new(kind, kind.label(), self.cursor));
        self.cursor = Location::start_of(self.prompt.line);
        debug!(target: "state.prompt", ?kind, "enter");
        Damage::Status
    }

    /// Close the prompt, restoring the parked cursor and returning what was typed.
    pub fn leave_prompt(&mut self) -> Option<PromptOutcome> {
        let active = self.prompt.active.take()?;
        self.cursor = active.saved_cursor;
        let text = String::from_utf8_lossy(self.document.text(self.prompt.line)).into_owned();
        debug!(target: "state.prompt", kind = ?active.kind, len = text.len(), "leave");
        Some(PromptOutcome {
            kind: active.kind,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state(height: u16) -> EditorState {
        let doc = Document::with_budget(32 * 1024).unwrap();
        EditorState::new(doc, 20, height).unwrap()
    }

    fn type_text(st: &mut EditorState, text: &str) {
        for b in text.bytes() {
            if b == b'\n' {
                st.insert_newline().unwrap();
            } else {
                st.insert_char(b).unwrap();
            }
        }
    }

    #[test]
    fn typing_and_newline() {
        let mut st = state(10);
        type_text(&mut st, "AB\nC");
        assert_eq!(st.document().line_strings(), vec!["AB", "C"]);
        assert_eq!(st.cursor().offset, 1);
        assert_eq!(st.cursor_row(), 1);
        assert_eq!(
            st.document().next(st.document().head()),
            Some(st.cursor().line)
        );
    }

    #[test]
    fn newline_reports_split_line_for_partial_repaint() {
        let mut st = state(10);
        type_text(&mut st, "ab");
        let head = st.document().head();
        assert_eq!(st.insert_newline().unwrap(), Damage::Below(head));
    }

    #[test]
    fn newline_on_last_text_row_scrolls() {
        let mut st = state(4);
        type_text(&mut st, "a\nb\nc");
        assert_eq!(st.cursor_row(), 2);
        assert_eq!(st.insert_newline().unwrap(), Damage::Full);
        assert_eq!(st.cursor_row(), 2);
        let second = st.document().lines().nth(1).unwrap();
        assert_eq!(st.scroll().line, second);
    }

    #[test]
    fn left_at_line_start_goes_to_end_of_previous() {
        let mut st = state(10);
        type_text(&mut st, "hello\nx");
        st.move_home();
        assert_eq!(st.move_left(), Damage::Cursor);
        assert_eq!(st.cursor().line, st.document().head());
        assert_eq!(st.cursor().offset, 5);
    }

    #[test]
    fn right_at_line_end_goes_to_start_of_next() {
        let mut st = state(10);
        type_text(&mut st, "ab\ncd");
        st.move_up();
        st.move_end();
        assert_eq!(st.move_right(), Damage::Cursor);
        assert_eq!(st.cursor().offset, 0);
        assert_eq!(st.cursor_row(), 1);
    }

    #[test]
    fn edges_are_noops() {
        let mut st = state(10);
        type_text(&mut st, "ab");
        assert_eq!(st.move_right(), Damage::None);
        assert_eq!(st.move_down(), Damage::None);
        assert_eq!(st.move_up(), Damage::None);
        st.move_home();
        assert_eq!(st.move_left(), Damage::None);
        assert_eq!(st.cursor().offset, 0);
    }

    #[test]
    fn vertical_moves_clamp_offset() {
        let mut st = state(10);
        type_text(&mut st, "a\nlonger");
        assert_eq!(st.move_up(), Damage::Cursor);
        assert_eq!(st.cursor().offset, 1);
        assert_eq!(st.move_down(), Damage::Cursor);
        assert_eq!(st.cursor().offset, 1);
    }

    #[test]
    fn moving_past_viewport_scrolls_by_one() {
        let mut st = state(3);
        type_text(&mut st, "1\n2\n3\n4");
        let lines: Vec<_> = st.document().lines().collect();
        assert_eq!(st.scroll().line, lines[2]);
        assert_eq!(st.move_up(), Damage::Cursor);
        assert_eq!(st.move_up(), Damage::Full);
        assert_eq!(st.scroll().line, lines[1]);
        assert_eq!(st.move_up(), Damage::Full);
        assert_eq!(st.scroll().line, lines[0]);
        assert_eq!(st.move_down(), Damage::Cursor);
        assert_eq!(st.move_down(), Damage::Full);
        assert_eq!(st.scroll().line, lines[1]);
        assert_eq!(st.cursor_row(), 1);
    }

    #[test]
    fn regrowth_rewires_scroll_anchor() {
        let mut st = state(10);
        let head = st.document().head();
        type_text(&mut st, "123456789");
        assert_ne!(st.cursor().line, head);
        assert_eq!(st.scroll().line, st.cursor().line);
        assert_eq!(st.document().capacity(st.cursor().line), 32);
    }

    // Backspace at the start of a line joins it onto the previous one rather
    // than doing nothing.
    #[test]
    fn backspace_merge_at_scroll_top_moves_viewport() {
        let mut st = state(3);
        type_text(&mut st, "ab\ncd\nef");
        let third = st.cursor().line;
        assert_eq!(st.scroll().line, st.document().lines().nth(1).unwrap());
        st.move_up();
        st.move_home();
        assert_eq!(st.backspace().unwrap(), Damage::Full);
        assert_eq!(st.document().line_strings(), vec!["abcd", "ef"]);
        assert_eq!(st.scroll().line, st.document().head());
        assert_eq!(st.cursor().offset, 2);
        assert_eq!(st.document().next(st.cursor().line), Some(third));
    }

    #[test]
    fn column_expands_tabs() {
        let mut st = state(10);
        type_text(&mut st, "a\tb");
        assert_eq!(st.cursor_column(), 3);
        st.move_left();
        assert_eq!(st.cursor_column(), 2);
        st.move_left();
        assert_eq!(st.cursor_column(), 1);
    }

    #[test]
    fn prompt_parks_and_restores_cursor() {
        let mut st = state(10);
        type_text(&mut st, "doc");
        let before = st.cursor();
        assert_eq!(st.enter_prompt(PromptKind::SaveAs), Damage::Status);
        assert_eq!(st.mode(), Mode::Prompt);
        assert_eq!(st.cursor_row(), 9);
        type_text(&mut st, "out.txt");
        assert_eq!(st.cursor_column(), "Save as:".len() + 7);
        assert_eq!(st.move_up(), Damage::None);
        st.move_home();
        assert_eq!(st.move_left(), Damage::None);
        let outcome = st.leave_prompt().unwrap();
        assert_eq!(outcome.kind, PromptKind::SaveAs);
        assert_eq!(outcome.text, "out.txt");
        assert_eq!(st.cursor(), before);
        assert_eq!(st.mode(), Mode::Normal);
        assert_eq!(st.document().line_strings(), vec!["doc"]);
    }

    #[test]
    fn full_prompt_ignores_input() {
        let mut st = state(10);
        st.enter_prompt(PromptKind::SaveAs);
        for _ in 0..MAX_LINE_CAPACITY {
            assert_eq!(st.insert_char(b'x').unwrap(), Damage::Line);
        }
        assert_eq!(st.insert_char(b'y').unwrap(), Damage::None);
        assert_eq!(st.insert_newline().unwrap(), Damage::None);
    }

    #[test]
    fn page_motion() {
        let mut st = state(4);
        st.set_status("ready");
        for i in 0..10 {
            if i > 0 {
                st.insert_newline().unwrap();
            }
            st.insert_char(b'0' + i).unwrap();
        }
        assert_eq!(st.page_up(), Damage::Full);
        assert_eq!(st.page_up(), Damage::Full);
        assert_eq!(st.page_up(), Damage::Full);
        assert_eq!(st.cursor().line, st.document().head());
        assert_eq!(st.scroll().line, st.document().head());
        st.move_down();
        st.move_down();
        assert_eq!(st.page_up(), Damage::Cursor, "viewport already at the top");
        assert_eq!(st.cursor().line, st.document().head());
        assert_eq!(st.page_up(), Damage::None);
        assert_eq!(st.page_down(), Damage::Full);
        assert_eq!(st.cursor_row(), 0);
        assert_eq!(st.status(), "ready");
    }

    #[test]
    fn new_document_resets_locations() {
        let mut st = state(10);
        type_text(&mut st, "a\nb");
        assert_eq!(st.new_document().unwrap(), Damage::Full);
        assert_eq!(st.document().line_count(), 1);
        assert_eq!(st.cursor(), Location::start_of(st.document().head()));
        assert_eq!(st.scroll(), st.cursor());
    }
}
