//! fanlog - leveled logging façade with pluggable backends
//!
//! Callers invoke level-tagged emit methods (Debug through Panic) on a
//! [`Logger`]; a registry of named adapter backends renders each message.
//! Two backends ship built in: `console` (stdout, optionally ANSI-colored
//! per level) and `file` (append-only file with size/line/day-based rotation
//! and age-based retention of archives).
//!
//! ```no_run
//! use fanlog::{Level, Logger};
//!
//! let log = Logger::new();
//! log.set_output("console", r#"{"color": true}"#).unwrap();
//! log.set_output("file", r#"{"filename": "app.log", "maxlines": 100000, "daily": true}"#)
//!     .unwrap();
//! log.set_level(Level::Debug);
//!
//! log.info(format_args!("listening on port {}", 8080));
//! log.error(format_args!("connect failed: {}", "timeout"));
//! ```
//!
//! Delivery is synchronous: every emit call blocks until all backends have
//! written or have failed and been reported to stderr. A failing backend
//! never aborts delivery to the others and never propagates to the caller.

pub mod backend;
pub mod error;
pub mod level;
pub mod logger;
pub mod registry;
pub mod writer;

pub use backend::{Backend, ConsoleBackend, FileBackend};
pub use error::Error;
pub use level::Level;
pub use logger::Logger;
pub use registry::{AdapterRegistry, ADAPTER_CONSOLE, ADAPTER_FILE};
pub use writer::{format_timestamp, LineWriter};
