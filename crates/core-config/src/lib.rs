//! Configuration loading and parsing.
//!
//! `fte.toml` is looked up in the working directory, then under the platform
//! config dir (`<config_dir>/fte/fte.toml`); the binary may pass an explicit
//! path instead. A missing or unparsable file yields defaults. Unknown fields
//! are ignored.
//!
//! ```toml
//! [memory]
//! arena_bytes = 65536
//!
//! [display]
//! foreground = "grey"
//! background = "dark_blue"
//!
//! [status]
//! welcome = "Foenix Text Editor, Ctrl+Q to quit"
//! key_info = true
//! ```
//!
//! Raw values are kept as parsed. `Config::apply_context` derives the
//! effective values for a given screen: the arena budget clamped to
//! `[MIN_ARENA_BYTES, MAX_ARENA_BYTES]` and the welcome message cut to what
//! fits on the status bar.

use anyhow::Result;
use core_text::{INITIAL_LINE_CAPACITY, LineArena, MAX_LINE_CAPACITY};
use crossterm::style::Color;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{debug, info, warn};

pub const CONFIG_FILE_NAME: &str = "fte.toml";

pub const DEFAULT_ARENA_BYTES: usize = 64 * 1024;

/// Smallest arena that still fits the document head, the prompt line and one
/// largest-class line.
pub const MIN_ARENA_BYTES: usize = LineArena::charge(INITIAL_LINE_CAPACITY)
    + 2 * LineArena::charge(MAX_LINE_CAPACITY)
    + 4;

pub const MAX_ARENA_BYTES: usize = 16 * 1024 * 1024;

pub const DEFAULT_WELCOME: &str = "Foenix Text Editor, Ctrl+Q to quit";

pub const DEFAULT_FOREGROUND: Color = Color::Grey;
pub const DEFAULT_BACKGROUND: Color = Color::DarkBlue;

/// Screen the configuration is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenContext {
    pub width: u16,
    pub height: u16,
}

impl ScreenContext {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Status bar columns available to a message (one leading blank).
    pub fn status_columns(&self) -> usize {
        usize::from(self.width).saturating_sub(1)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MemoryConfig {
    #[serde(default = "MemoryConfig::default_arena_bytes")]
    pub arena_bytes: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            arena_bytes: Self::default_arena_bytes(),
        }
    }
}

impl MemoryConfig {
    const fn default_arena_bytes() -> usize {
        DEFAULT_ARENA_BYTES
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "DisplayConfig::default_foreground")]
    pub foreground: String,
    #[serde(default = "DisplayConfig::default_background")]
    pub background: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            foreground: Self::default_foreground(),
            background: Self::default_background(),
        }
    }
}

impl DisplayConfig {
    fn default_foreground() -> String {
        "grey".to_string()
    }
    fn default_background() -> String {
        "dark_blue".to_string()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatusConfig {
    #[serde(default = "StatusConfig::default_welcome")]
    pub welcome: String,
    #[serde(default = "StatusConfig::default_key_info")]
    pub key_info: bool,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            welcome: Self::default_welcome(),
            key_info: Self::default_key_info(),
        }
    }
}

impl StatusConfig {
    fn default_welcome() -> String {
        DEFAULT_WELCOME.to_string()
    }
    const fn default_key_info() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub status: StatusConfig,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// File the values came from.
    pub path: Option<PathBuf>,
    /// Original file contents.
    pub raw: Option<String>,
    /// Parsed (or default) data.
    pub file: ConfigFile,
    pub effective_arena_bytes: usize,
    pub effective_welcome: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: None,
            raw: None,
            file: ConfigFile::default(),
            effective_arena_bytes: DEFAULT_ARENA_BYTES,
            effective_welcome: DEFAULT_WELCOME.to_string(),
        }
    }
}

/// Local `fte.toml` first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("fte").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "loaded");
            Ok(Config {
                effective_arena_bytes: file.memory.arena_bytes,
                effective_welcome: status_text(&file.status.welcome),
                path: Some(path),
                raw: Some(content),
                file,
            })
        }
        Err(e) => {
            warn!(
                target: "config",
                path = %path.display(),
                error = %e,
                "parse_failed_using_defaults"
            );
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Compute the effective values for `ctx`. Returns the arena budget.
    pub fn apply_context(&mut self, ctx: ScreenContext) -> usize {
        let raw = self.file.memory.arena_bytes;
        let clamped = raw.clamp(MIN_ARENA_BYTES, MAX_ARENA_BYTES);
        if clamped != raw {
            info!(
                target: "config",
                raw,
                clamped,
                min = MIN_ARENA_BYTES,
                max = MAX_ARENA_BYTES,
                "arena_bytes_clamped"
            );
        }
        self.effective_arena_bytes = clamped;

        let welcome = &self.file.status.welcome;
        let fit = ctx.status_columns();
        self.effective_welcome = if welcome.chars().count() > fit {
            status_text(&welcome.chars().take(fit).collect::<String>())
        } else {
            status_text(welcome)
        };
        clamped
    }

    pub fn key_info(&self) -> bool {
        self.file.status.key_info
    }

    pub fn foreground(&self) -> Color {
        parse_color(
            "foreground",
            &self.file.display.foreground,
            DEFAULT_FOREGROUND,
        )
    }

    pub fn background(&self) -> Color {
        parse_color(
            "background",
            &self.file.display.background,
            DEFAULT_BACKGROUND,
        )
    }
}

/// The status bar holds one byte per cell, so anything but printable ASCII
/// shows as `?`.
pub fn status_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| match c {
            ' '..='~' => c,
            _ => '?',
        })
        .collect();
    if cleaned != text {
        debug!(target: "config", original = text, cleaned, "status_text_replaced");
    }
    cleaned
}

/// Color by crossterm name (`"dark_blue"`, `"grey"`, ...), else `fallback`.
pub fn parse_color(field: &str, name: &str, fallback: Color) -> Color {
    match Color::try_from(name) {
        Ok(color) => color,
        Err(()) => {
            warn!(target: "config", field, name, ?fallback, "unknown_color");
            fallback
        }
    }
}
