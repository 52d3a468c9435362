//! Escape sequence decoder.
//!
//! `KeyDecoder::feed` is a pure byte-at-a-time state machine; `next_key`
//! drives it from a blocking `ByteSource` until a whole key is available.
//!
//! Recognized sequences (after `ESC [`):
//! * `A` `B` `C` `D` arrows, `H` / `F` home / end.
//! * `1~` home, `2~` insert, `3~` delete, `4~` end, `5~` page up, `6~` page down.
//! * `1n~` F1..F8 (n in 1-5, 7-9) and `2n~` F9..F12 (n in 0, 1, 3, 4).
//! * `ESC ESC` yields a single Escape key.
//!
//! Anything else is dropped and the machine returns to idle without emitting.

use anyhow::Result;
use core_events::Key;
use tracing::trace;

use crate::ByteSource;

const ESC: u8 = 0x1b;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeState {
    #[default]
    Idle,
    /// Saw ESC.
    Escape,
    /// Saw ESC `[`.
    Bracket,
    /// Saw ESC `[1`; expecting `~` or a second digit.
    One,
    /// Saw ESC `[2`; expecting `~` or a second digit.
    Two,
    /// Sequence identified; its closing `~` is still pending.
    Tilde(Key),
}

#[derive(Debug, Default)]
pub struct KeyDecoder {
    state: DecodeState,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Advance with one byte; returns a key once a sequence completes.
    pub fn feed(&mut self, byte: u8) -> Option<Key> {
        let (next, key) = match self.state {
            DecodeState::Idle if byte == ESC => (DecodeState::Escape, None),
            DecodeState::Idle => (DecodeState::Idle, Some(Key::from_byte(byte))),
            DecodeState::Escape => match byte {
                b'[' => (DecodeState::Bracket, None),
                ESC => (DecodeState::Idle, Some(Key::Esc)),
                _ => self.discard(byte),
            },
            DecodeState::Bracket => match byte {
                b'A' => (DecodeState::Idle, Some(Key::Up)),
                b'B' => (DecodeState::Idle, Some(Key::Down)),
                b'C' => (DecodeState::Idle, Some(Key::Right)),
                b'D' => (DecodeState::Idle, Some(Key::Left)),
                b'H' => (DecodeState::Idle, Some(Key::Home)),
                b'F' => (DecodeState::Idle, Some(Key::End)),
                b'1' => (DecodeState::One, None),
                b'2' => (DecodeState::Two, None),
                b'3' => (DecodeState::Tilde(Key::Delete), None),
                b'4' => (DecodeState::Tilde(Key::End), None),
                b'5' => (DecodeState::Tilde(Key::PageUp), None),
                b'6' => (DecodeState::Tilde(Key::PageDown), None),
                _ => self.discard(byte),
            },
            DecodeState::One => match byte {
                b'~' => (DecodeState::Idle, Some(Key::Home)),
                b'1'..=b'5' => (DecodeState::Tilde(Key::F(byte - b'0')), None),
                b'7'..=b'9' => (DecodeState::Tilde(Key::F(byte - b'1')), None),
                _ => self.discard(byte),
            },
            DecodeState::Two => match byte {
                b'~' => (DecodeState::Idle, Some(Key::Insert)),
                b'0' | b'1' => (DecodeState::Tilde(Key::F(byte - b'0' + 9)), None),
                b'3' | b'4' => (DecodeState::Tilde(Key::F(byte - b'0' + 8)), None),
                _ => self.discard(byte),
            },
            DecodeState::Tilde(key) if byte == b'~' => (DecodeState::Idle, Some(key)),
            DecodeState::Tilde(_) => self.discard(byte),
        };
        self.state = next;
        key
    }

    fn discard(&self, byte: u8) -> (DecodeState, Option<Key>) {
        trace!(target: "input.decode", state = ?self.state, byte, "discard");
        (DecodeState::Idle, None)
    }

    /// Block on `source` until a complete key has been decoded.
    pub fn next_key<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<Key> {
        loop {
            let byte = source.read_byte()?;
            if let Some(key) = self.feed(byte) {
                trace!(target: "input.decode", key = %key, "key");
                return Ok(key);
            }
        }
    }
}
