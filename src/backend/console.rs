//! Console backend
//!
//! Renders lines to standard output through the shared [`LineWriter`],
//! optionally ANSI-colored per level. Color is forced off on Windows,
//! whose default console does not honor ANSI escapes.

use std::io::Write;

use chrono::{DateTime, Local};
use serde::Deserialize;

use super::Backend;
use crate::error::Error;
use crate::level::Level;
use crate::writer::LineWriter;

#[derive(Debug, Deserialize)]
struct ConsoleConfig {
    #[serde(default = "default_color")]
    color: bool,
}

fn default_color() -> bool {
    true
}

/// Backend writing formatted lines to standard output.
pub struct ConsoleBackend {
    colorful: bool,
    writer: LineWriter<Box<dyn Write + Send>>,
}

impl ConsoleBackend {
    /// Create a console backend over stdout with color enabled.
    pub fn new() -> Self {
        Self::with_writer(std::io::stdout())
    }

    /// Create a console backend over an arbitrary sink.
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            colorful: true,
            writer: LineWriter::new(Box::new(writer)),
        }
    }
}

impl Default for ConsoleBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for ConsoleBackend {
    fn init(&mut self, config: &str) -> Result<(), Error> {
        if !config.is_empty() {
            let parsed: ConsoleConfig = serde_json::from_str(config)?;
            self.colorful = parsed.color;
        }
        // Platform capability check, not a user preference.
        if cfg!(windows) {
            self.colorful = false;
        }
        Ok(())
    }

    fn write_message(&self, when: DateTime<Local>, msg: &str, level: Level) -> Result<(), Error> {
        if self.colorful {
            self.writer
                .write_line(when, &level.colorize(msg))
                .map_err(Error::WriteFailure)
        } else {
            self.writer.write_line(when, msg).map_err(Error::WriteFailure)
        }
    }
}
