//! The key loop: read one key, dispatch it, repaint, repeat.
//!
//! `Session` is generic over its `Display` and `ByteSource` so the whole loop
//! runs against an in-memory grid and a byte buffer in tests; the binary wires
//! it to the crossterm writer and raw stdin.

use anyhow::Result;
use core_actions::{Keymaps, dispatch_key};
use core_config::Config;
use core_events::Key;
use core_input::{ByteSource, KeyDecoder};
use core_render::{ColorPair, Display, Palette, RenderEngine};
use core_state::{Damage, EditorState};
use core_terminal::ScreenSize;
use core_text::Document;
use tracing::{debug, info};

pub struct Session<D, S> {
    state: EditorState,
    keymaps: Keymaps,
    engine: RenderEngine,
    decoder: KeyDecoder,
    display: D,
    source: S,
    key_info: bool,
}

impl<D: Display, S: ByteSource> Session<D, S> {
    /// Build the editor from `config` and paint the first frame.
    pub fn start(config: &Config, size: ScreenSize, display: D, source: S) -> Result<Self> {
        let document = Document::with_budget(config.effective_arena_bytes)?;
        let mut state = EditorState::new(document, size.width, size.height)?;
        state.set_status(config.effective_welcome.clone());
        let normal = ColorPair::new(config.foreground(), config.background());
        let palette = Palette::from_normal(normal);
        let mut session = Self {
            state,
            keymaps: Keymaps::default(),
            engine: RenderEngine::new(palette),
            decoder: KeyDecoder::new(),
            display,
            source,
            key_info: config.key_info(),
        };
        session.engine.render(&session.state, &mut session.display, Damage::Full)?;
        info!(
            target: "runtime",
            width = size.width,
            height = size.height,
            arena_bytes = config.effective_arena_bytes,
            "session_started"
        );
        Ok(session)
    }

    /// Run until quit. Errors (closed input, arena exhaustion, I/O) end the session.
    pub fn run(&mut self) -> Result<()> {
        while self.step()? {}
        let m = self.engine.metrics_snapshot();
        debug!(
            target: "runtime",
            full = m.full_frames,
            below = m.below_frames,
            line = m.line_frames,
            status = m.status_frames,
            cursor = m.cursor_frames,
            cells = m.cells_written,
            "render_totals"
        );
        Ok(())
    }

    /// Handle one key. Returns `false` once the user asked to quit.
    pub fn step(&mut self) -> Result<bool> {
        let key = self.decoder.next_key(&mut self.source)?;
        let result = dispatch_key(&self.keymaps, key, &mut self.state)?;
        if result.quit {
            info!(target: "runtime", "quit");
            return Ok(false);
        }
        self.engine.render(&self.state, &mut self.display, result.damage)?;

        if self.key_info && !self.state.in_prompt() && !result.status_posted {
            let line = key_info_line(key, &self.state);
            self.state.set_status(line);
            self.engine.render(&self.state, &mut self.display, Damage::Status)?;
        }
        Ok(true)
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    #[cfg(test)]
    pub fn display(&self) -> &D {
        &self.display
    }
}

/// Status diagnostics after a key: key glyph, key code, current line
/// length and capacity, free arena kilobytes.
pub fn key_info_line(key: Key, state: &EditorState) -> String {
    let glyph = match key {
        Key::Char(b) if b > b' ' => char::from(b),
        _ => '.',
    };
    let doc = state.document();
    let line = state.cursor().line;
    format!(
        "{glyph} ({:04X}) ({}, {}) {} Kb free",
        key.code(),
        doc.line_len(line),
        doc.capacity(line),
        doc.arena().free_bytes() / 1024
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_input::ReadSource;
    use core_render::GridDisplay;
    use core_text::AllocError;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    type TestSession = Session<GridDisplay, ReadSource<Cursor<Vec<u8>>>>;

    fn session_with(config: &Config, input: &[u8], width: u16, height: u16) -> TestSession {
        Session::start(
            config,
            ScreenSize::clamped(width, height),
            GridDisplay::new(width, height),
            ReadSource::new(Cursor::new(input.to_vec())),
        )
        .unwrap()
    }

    #[test]
    fn first_frame_shows_welcome() {
        let s = session_with(&Config::default(), b"", 40, 5);
        assert_eq!(
            s.display().row_trimmed(4),
            " Foenix Text Editor, Ctrl+Q to quit"
        );
        assert_eq!(s.display().cursor(), (0, 0));
    }

    #[test]
    fn typed_lines_and_quit() {
        let mut s = session_with(&Config::default(), b"AB\rC\x11", 40, 5);
        s.run().unwrap();
        assert_eq!(s.state().document().line_strings(), vec!["AB", "C"]);
        assert_eq!(s.display().row_trimmed(0), "AB");
        assert_eq!(s.display().row_trimmed(1), "C");
        assert_eq!(s.display().cursor(), (1, 1));
    }

    #[test]
    fn key_info_follows_each_key() {
        let mut s = session_with(&Config::default(), b"x", 60, 5);
        assert!(s.step().unwrap());
        let free = s.state().document().arena().free_bytes() / 1024;
        assert_eq!(
            s.display().row_trimmed(4),
            format!(" x (0078) (1, 8) {free} Kb free")
        );
    }

    #[test]
    fn key_info_can_be_disabled() {
        let mut config = Config::default();
        config.file.status.key_info = false;
        let mut s = session_with(&config, b"x", 60, 5);
        s.step().unwrap();
        assert_eq!(s.state().status(), "Foenix Text Editor, Ctrl+Q to quit");
    }

    #[test]
    fn key_info_glyphs() {
        let s = session_with(&Config::default(), b"", 60, 5);
        let st = s.state();
        assert!(key_info_line(Key::Char(b' '), st).starts_with(". (0020)"));
        assert!(key_info_line(Key::Up, st).starts_with(". (00A0)"));
        assert!(key_info_line(Key::Char(b'~'), st).starts_with("~ (007E)"));
        assert!(key_info_line(Key::Ctrl(b'q'), st).starts_with(". (0011)"));
    }

    #[test]
    fn accepted_prompt_message_survives_key_info() {
        let mut s = session_with(&Config::default(), b"\x13a.txt\r", 80, 5);
        while s.step().unwrap() {
            if !s.state().in_prompt() && s.state().status().starts_with("Cannot save") {
                break;
            }
        }
        assert_eq!(
            s.display().row_trimmed(4),
            " Cannot save a.txt: saving is not supported"
        );
    }

    #[test]
    fn closed_input_ends_the_session_with_an_error() {
        let mut s = session_with(&Config::default(), b"abc", 40, 5);
        let err = s.run().unwrap_err();
        assert!(err.to_string().contains("input closed"));
    }

    #[test]
    fn arena_exhaustion_is_fatal() {
        let mut config = Config::default();
        config.effective_arena_bytes = 1024;
        let input = vec![b'\r'; 200];
        let mut s = session_with(&config, &input, 40, 5);
        let err = s.run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AllocError>(),
            Some(AllocError::ArenaExhausted { .. })
        ));
    }
}
