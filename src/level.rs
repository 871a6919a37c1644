//! Message severity levels
//!
//! Levels form a fixed total order; a message is delivered only when its
//! level is at or above the logger's configured minimum.

use serde::{Deserialize, Serialize};

/// Message severity, ordered from least to most severe.
///
/// The declaration order supplies the ordering: `Debug < Info < Notice <
/// Warn < Alert < Error < Panic`. `Trace` and `Warning` are not separate
/// variants; the [`Logger`](crate::Logger) façade exposes them as method
/// aliases for `Debug` and `Warn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    Debug,
    Info,
    Notice,
    Warn,
    Alert,
    Error,
    Panic,
}

impl Level {
    /// Get the display name for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "Debug",
            Level::Info => "Info",
            Level::Notice => "Notice",
            Level::Warn => "Warn",
            Level::Alert => "Alert",
            Level::Error => "Error",
            Level::Panic => "Panic",
        }
    }

    /// The tag prepended to every rendered message, e.g. `" [Error] "`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Level::Debug => " [Debug] ",
            Level::Info => " [Info] ",
            Level::Notice => " [Notice] ",
            Level::Warn => " [Warn] ",
            Level::Alert => " [Alert] ",
            Level::Error => " [Error] ",
            Level::Panic => " [Panic] ",
        }
    }

    /// ANSI SGR code used by the console backend, one distinct code per level.
    pub(crate) fn color_code(&self) -> &'static str {
        match self {
            Level::Debug => "1;37",  // white
            Level::Info => "1;36",   // cyan
            Level::Notice => "1;32", // green
            Level::Warn => "1;33",   // yellow
            Level::Alert => "1;35",  // magenta
            Level::Error => "1;31",  // red
            Level::Panic => "1;41",  // white on red
        }
    }

    /// Wrap `text` in the ANSI escape sequence for this level.
    pub(crate) fn colorize(&self, text: &str) -> String {
        format!("\x1b[{}m{}\x1b[0m", self.color_code(), text)
    }

    pub(crate) fn from_index(index: u8) -> Level {
        match index {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Notice,
            3 => Level::Warn,
            4 => Level::Alert,
            5 => Level::Error,
            _ => Level::Panic,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
