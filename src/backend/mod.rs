//! Backend adapter module
//!
//! This module defines the abstraction layer for log output backends.
//! Each backend type implements the `Backend` trait so the façade can
//! fan messages out to any mix of sinks uniformly.

pub mod console;
pub mod file;

pub use console::ConsoleBackend;
pub use file::FileBackend;

use chrono::{DateTime, Local};

use crate::error::Error;
use crate::level::Level;

/// Trait for log output backends
///
/// A backend receives the fully rendered message (level tag included) plus
/// the timestamp captured at emit time, and renders it to its medium.
///
/// # Object Safety
/// This trait is object-safe to allow `Box<dyn Backend>` usage, and
/// implementations must be `Send + Sync` since the façade fans out from
/// arbitrarily many caller threads.
pub trait Backend: Send + Sync {
    /// Apply the adapter-specific JSON config payload.
    ///
    /// Called exactly once, before the backend is attached to a façade.
    /// An empty payload means "use defaults".
    fn init(&mut self, config: &str) -> Result<(), Error>;

    /// Render one message to this backend's medium.
    fn write_message(&self, when: DateTime<Local>, msg: &str, level: Level) -> Result<(), Error>;
}
