//! Logger façade
//!
//! The public-facing object applications call into. It holds a minimum
//! display level and a list of active named backends, and fans each
//! qualifying message out to every backend synchronously, in registration
//! order.
//!
//! Emit methods take [`std::fmt::Arguments`], built with `format_args!`:
//!
//! ```
//! use fanlog::Logger;
//!
//! let log = Logger::new();
//! log.error(format_args!("connect failed after {} retries", 3));
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use chrono::Local;

use crate::backend::Backend;
use crate::error::Error;
use crate::level::Level;
use crate::registry::{AdapterRegistry, ADAPTER_CONSOLE};

struct NamedBackend {
    name: String,
    backend: Box<dyn Backend>,
}

#[derive(Default)]
struct Outputs {
    backends: Vec<NamedBackend>,
    /// Set once any backend has been successfully configured; suppresses
    /// the lazy console default from then on.
    initialized: bool,
}

/// Leveled logging façade dispatching to named backends.
///
/// All methods take `&self`; the façade may be shared freely across threads.
/// `set_output` calls are mutually exclusive with each other; emits run
/// concurrently with each other and block until every backend has written
/// (or has failed and been reported to stderr).
pub struct Logger {
    registry: Arc<AdapterRegistry>,
    /// Minimum emitted level. Stored relaxed: a level change is not
    /// synchronized with in-flight emits.
    level: AtomicU8,
    outputs: RwLock<Outputs>,
}

impl Logger {
    /// Create a façade over the built-in adapters, with minimum level Info.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(AdapterRegistry::with_builtins()))
    }

    /// Create a façade over an explicit adapter registry.
    pub fn with_registry(registry: Arc<AdapterRegistry>) -> Self {
        Self {
            registry,
            level: AtomicU8::new(Level::Info as u8),
            outputs: RwLock::new(Outputs::default()),
        }
    }

    /// Activate the named adapter on this façade.
    ///
    /// `config` is the adapter-specific JSON payload; pass `""` for
    /// defaults. Fails with [`Error::UnknownAdapter`] if the name is not
    /// registered and [`Error::DuplicateAdapter`] if it is already active
    /// here; backend `init` errors are propagated as-is. On any failure the
    /// active backend list is left untouched.
    pub fn set_output(&self, name: &str, config: &str) -> Result<(), Error> {
        let mut outputs = self.write_outputs();
        self.add_output(&mut outputs, name, config)
    }

    fn add_output(&self, outputs: &mut Outputs, name: &str, config: &str) -> Result<(), Error> {
        if outputs.backends.iter().any(|named| named.name == name) {
            return Err(Error::DuplicateAdapter(name.to_string()));
        }
        let mut backend = self
            .registry
            .create(name)
            .ok_or_else(|| Error::UnknownAdapter(name.to_string()))?;
        backend.init(config)?;
        outputs.backends.push(NamedBackend {
            name: name.to_string(),
            backend,
        });
        outputs.initialized = true;
        Ok(())
    }

    /// Set the minimum emitted level.
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// The current minimum emitted level.
    pub fn level(&self) -> Level {
        Level::from_index(self.level.load(Ordering::Relaxed))
    }

    /// Emit a message at `level`, fanning out to every active backend.
    ///
    /// A no-op below the minimum level. Per-backend write failures are
    /// reported to stderr and never abort delivery to the remaining
    /// backends or surface to the caller.
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if level < self.level() {
            return;
        }
        self.ensure_default_output();

        let msg = format!("{}{}", level.prefix(), args);
        let when = Local::now();
        let outputs = self.outputs.read().unwrap_or_else(|e| e.into_inner());
        for named in &outputs.backends {
            if let Err(err) = named.backend.write_message(when, &msg, level) {
                eprintln!("fanlog: unable to write to adapter {:?}: {err}", named.name);
            }
        }
    }

    /// Install the console default on first use, if nothing was configured.
    ///
    /// Check-and-initialize-once under the same lock as `set_output`, so
    /// two racing first emits cannot both install it.
    fn ensure_default_output(&self) {
        {
            let outputs = self.outputs.read().unwrap_or_else(|e| e.into_inner());
            if outputs.initialized {
                return;
            }
        }
        let mut outputs = self.write_outputs();
        if outputs.initialized {
            return;
        }
        let result = self.add_output(&mut outputs, ADAPTER_CONSOLE, "");
        outputs.initialized = true;
        if let Err(err) = result {
            eprintln!("fanlog: failed to install default console adapter: {err}");
        }
    }

    fn write_outputs(&self) -> RwLockWriteGuard<'_, Outputs> {
        self.outputs.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    /// Alias for [`debug`](Self::debug).
    pub fn trace(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn notice(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Notice, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    /// Alias for [`warn`](Self::warn).
    pub fn warning(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    pub fn alert(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Alert, args);
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    pub fn panic(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Panic, args);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}
