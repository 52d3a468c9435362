//! Logical key codes produced by the input decoder and consumed by dispatch.
//!
//! A single closed enum replaces a byte-indexed key space: printable bytes
//! travel in `Key::Char`, everything else has a named variant, so no control
//! or navigation key can ever collide with a character.

use std::fmt;

const ESC: u8 = 0x1b;
const DEL: u8 = 0x7f;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Printable single-byte character (0x20..=0x7e).
    Char(u8),
    /// Ctrl + letter, stored as the lowercase letter.
    Ctrl(u8),
    Enter,
    Tab,
    Backspace,
    Esc,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Insert,
    Delete,
    PageUp,
    PageDown,
    /// Function key F1..=F12.
    F(u8),
    /// Any other byte; never bound.
    Other(u8),
}

impl Key {
    /// Classify a single byte read outside of an escape sequence.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'\r' | b'\n' => Key::Enter,
            b'\t' => Key::Tab,
            0x08 | DEL => Key::Backspace,
            ESC => Key::Esc,
            0x01..=0x1a => Key::Ctrl(b'a' + byte - 1),
            0x20..=0x7e => Key::Char(byte),
            _ => Key::Other(byte),
        }
    }

    /// Byte the key would insert into text, if any.
    pub fn text_byte(self) -> Option<u8> {
        match self {
            Key::Char(b) => Some(b),
            Key::Tab => Some(b'\t'),
            _ => None,
        }
    }

    /// Stable numeric code used in status diagnostics.
    pub fn code(self) -> u16 {
        match self {
            Key::Char(b) | Key::Other(b) => u16::from(b),
            Key::Ctrl(c) => u16::from(c - b'a' + 1),
            Key::Enter => u16::from(b'\r'),
            Key::Tab => u16::from(b'\t'),
            Key::Backspace => u16::from(DEL),
            Key::Esc => u16::from(ESC),
            Key::Up => 0xa0,
            Key::Down => 0xa1,
            Key::Left => 0xa2,
            Key::Right => 0xa3,
            Key::Home => 0xa4,
            Key::Insert => 0xa5,
            Key::Delete => 0xa6,
            Key::End => 0xa7,
            Key::PageUp => 0xa8,
            Key::PageDown => 0xa9,
            Key::F(n) => 0xaf + u16::from(n),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(b) => write!(f, "{}", char::from(*b)),
            Key::Ctrl(c) => write!(f, "Ctrl+{}", char::from(c.to_ascii_uppercase())),
            Key::F(n) => write!(f, "F{n}"),
            Key::Other(b) => write!(f, "0x{b:02X}"),
            other => write!(f, "{other:?}"),
        }
    }
}
