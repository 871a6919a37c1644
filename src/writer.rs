//! Synchronized line writer
//!
//! Shared low-level helper that serializes a timestamp plus a pre-rendered
//! message into an output stream. Each line is emitted as a single
//! `write_all` under a mutex, so concurrent writers never interleave
//! partial lines.

use std::io::Write;
use std::sync::Mutex;

use chrono::{DateTime, Local};

/// Fixed timestamp format for every emitted line: `YYYY/MM/DD - HH:MM:SS.mmm`.
pub fn format_timestamp(when: DateTime<Local>) -> String {
    when.format("%Y/%m/%d - %H:%M:%S%.3f").to_string()
}

/// A minimal synchronized sink over any [`Write`] target.
pub struct LineWriter<W> {
    inner: Mutex<W>,
}

impl<W: Write> LineWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(writer),
        }
    }

    /// Write `<timestamp><msg>\n` as one atomic line.
    pub fn write_line(&self, when: DateTime<Local>, msg: &str) -> std::io::Result<()> {
        let line = format!("{}{}\n", format_timestamp(when), msg);
        // A poisoned lock only means another writer panicked mid-write;
        // the sink itself is still usable.
        let mut writer = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        writer.write_all(line.as_bytes())?;
        writer.flush()
    }
}
