//! Key to command tables.
//!
//! Two tables exist: `normal` carries every editing operation, `prompt` is the
//! restricted set usable while the status bar prompt is open. `Keymaps` holds
//! both and picks one per lookup from the editor mode, so exactly one table is
//! active at a time and switching is implied by entering or leaving the prompt.
//!
//! Printable characters are not bound one by one: a table with `self_insert`
//! maps any `Key::Char` without an explicit binding to `InsertChar` of its
//! text byte. Tab inserts text too but is bound explicitly, so the prompt
//! table can leave it out.

use std::collections::HashMap;

use core_events::Key;
use core_state::Mode;
use tracing::trace;

use crate::Command;

#[derive(Debug, Clone)]
pub struct CommandTable {
    name: &'static str,
    bindings: HashMap<Key, Command>,
    self_insert: bool,
}

impl CommandTable {
    pub fn empty(name: &'static str) -> Self {
        Self {
            name,
            bindings: HashMap::new(),
            self_insert: false,
        }
    }

    /// Full editing table.
    pub fn normal() -> Self {
        let mut table = Self::empty("normal").with_self_insert();
        table
            .bind(Key::Ctrl(b'q'), Command::Quit)
            .bind(Key::Ctrl(b's'), Command::SaveAs)
            .bind(Key::Ctrl(b'n'), Command::NewDocument)
            .bind(Key::Tab, Command::InsertChar(b'\t'))
            .bind(Key::Enter, Command::InsertNewline)
            .bind(Key::Backspace, Command::Backspace)
            .bind(Key::Delete, Command::DeleteForward)
            .bind(Key::Left, Command::MoveLeft)
            .bind(Key::Right, Command::MoveRight)
            .bind(Key::Up, Command::MoveUp)
            .bind(Key::Down, Command::MoveDown)
            .bind(Key::Home, Command::Home)
            .bind(Key::End, Command::End)
            .bind(Key::PageUp, Command::PageUp)
            .bind(Key::PageDown, Command::PageDown);
        table
    }

    /// Prompt table: characters, in-line cursor movement, accept and reject.
    pub fn prompt() -> Self {
        let mut table = Self::empty("prompt").with_self_insert();
        table
            .bind(Key::Esc, Command::RejectPrompt)
            .bind(Key::Enter, Command::AcceptPrompt)
            .bind(Key::Backspace, Command::Backspace)
            .bind(Key::Delete, Command::DeleteForward)
            .bind(Key::Left, Command::MoveLeft)
            .bind(Key::Right, Command::MoveRight)
            .bind(Key::Home, Command::Home)
            .bind(Key::End, Command::End);
        table
    }

    pub fn with_self_insert(mut self) -> Self {
        self.self_insert = true;
        self
    }

    pub fn bind(&mut self, key: Key, command: Command) -> &mut Self {
        self.bindings.insert(key, command);
        self
    }

    pub fn unbind(&mut self, key: Key) -> Option<Command> {
        self.bindings.remove(&key)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of explicit bindings (self-inserted characters not counted).
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn lookup(&self, key: Key) -> Option<Command> {
        if let Some(command) = self.bindings.get(&key) {
            return Some(*command);
        }
        match key {
            Key::Char(_) if self.self_insert => key.text_byte().map(Command::InsertChar),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Keymaps {
    normal: CommandTable,
    prompt: CommandTable,
}

impl Keymaps {
    pub fn new(normal: CommandTable, prompt: CommandTable) -> Self {
        Self { normal, prompt }
    }

    pub fn active(&self, mode: Mode) -> &CommandTable {
        match mode {
            Mode::Normal => &self.normal,
            Mode::Prompt => &self.prompt,
        }
    }

    pub fn lookup(&self, mode: Mode, key: Key) -> Option<Command> {
        let table = self.active(mode);
        let command = table.lookup(key);
        if command.is_none() {
            trace!(target: "actions.dispatch", table = table.name(), %key, "unbound");
        }
        command
    }
}

impl Default for Keymaps {
    fn default() -> Self {
        Self::new(CommandTable::normal(), CommandTable::prompt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_keys_self_insert_in_both_tables() {
        let maps = Keymaps::default();
        for mode in [Mode::Normal, Mode::Prompt] {
            assert_eq!(
                maps.lookup(mode, Key::Char(b'~')),
                Some(Command::InsertChar(b'~'))
            );
            assert_eq!(
                maps.lookup(mode, Key::Char(b' ')),
                Some(Command::InsertChar(b' '))
            );
        }
    }

    #[test]
    fn tab_inserts_only_in_the_normal_table() {
        let maps = Keymaps::default();
        assert_eq!(
            maps.lookup(Mode::Normal, Key::Tab),
            Key::Tab.text_byte().map(Command::InsertChar)
        );
        assert_eq!(maps.lookup(Mode::Prompt, Key::Tab), None);
    }

    #[test]
    fn prompt_table_is_restricted() {
        let maps = Keymaps::default();
        for key in [
            Key::Up,
            Key::Down,
            Key::PageUp,
            Key::PageDown,
            Key::Tab,
            Key::Ctrl(b'q'),
            Key::Ctrl(b's'),
        ] {
            assert_eq!(maps.lookup(Mode::Prompt, key), None, "{key:?}");
        }
        assert_eq!(
            maps.lookup(Mode::Prompt, Key::Esc),
            Some(Command::RejectPrompt)
        );
        assert_eq!(
            maps.lookup(Mode::Normal, Key::Enter),
            Some(Command::InsertNewline)
        );
        assert_eq!(maps.lookup(Mode::Normal, Key::Esc), None);
    }

    #[test]
    fn explicit_binding_wins_over_self_insert() {
        let mut table = CommandTable::empty("custom").with_self_insert();
        table.bind(Key::Char(b'q'), Command::Quit);
        assert_eq!(table.lookup(Key::Char(b'q')), Some(Command::Quit));
        assert_eq!(
            table.lookup(Key::Char(b'r')),
            Some(Command::InsertChar(b'r'))
        );
        assert_eq!(table.unbind(Key::Char(b'q')), Some(Command::Quit));
        assert_eq!(
            table.lookup(Key::Char(b'q')),
            Some(Command::InsertChar(b'q'))
        );
        assert!(table.is_empty());
    }

    #[test]
    fn table_without_self_insert_ignores_characters() {
        let table = CommandTable::empty("bare");
        assert_eq!(table.lookup(Key::Char(b'a')), None);
        assert_eq!(table.len(), 0);
    }
}
