//! Adapter registry
//!
//! Maps adapter names to factories producing fresh backend instances. The
//! registry is an explicit object owned by (or shared between) façades
//! rather than hidden process-global state, so backend availability never
//! depends on import order or load-time side effects.

use std::collections::HashMap;

use crate::backend::{Backend, ConsoleBackend, FileBackend};

/// Name of the built-in console adapter.
pub const ADAPTER_CONSOLE: &str = "console";
/// Name of the built-in file adapter.
pub const ADAPTER_FILE: &str = "file";

/// Factory producing a fresh, uninitialized backend instance.
pub type BackendFactory = Box<dyn Fn() -> Box<dyn Backend> + Send + Sync>;

/// Registry of named backend factories.
///
/// Registration happens once at startup; entries live for the registry's
/// lifetime and are never removed. Registering a duplicate name is a
/// startup-time contract violation and panics.
pub struct AdapterRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry pre-populated with the built-in adapters
    /// (`console` and `file`).
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(ADAPTER_CONSOLE, || Box::new(ConsoleBackend::new()));
        registry.register(ADAPTER_FILE, || Box::new(FileBackend::new()));
        registry
    }

    /// Register a backend factory under `name`.
    ///
    /// # Panics
    /// Panics if `name` is already registered. A duplicate registration
    /// indicates a broken build, not a runtime condition.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Backend> + Send + Sync + 'static,
    {
        if self.factories.contains_key(name) {
            panic!("fanlog: adapter {name:?} is already registered");
        }
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    /// Check whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiate a fresh backend for `name`, if registered.
    pub fn create(&self, name: &str) -> Option<Box<dyn Backend>> {
        self.factories.get(name).map(|factory| factory())
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_registered() {
        let registry = AdapterRegistry::with_builtins();
        assert!(registry.contains(ADAPTER_CONSOLE));
        assert!(registry.contains(ADAPTER_FILE));
        assert!(registry.create(ADAPTER_CONSOLE).is_some());
        assert!(registry.create("syslog").is_none());
    }

    #[test]
    fn test_register_custom_adapter() {
        let mut registry = AdapterRegistry::new();
        assert!(!registry.contains(ADAPTER_CONSOLE));
        registry.register("custom", || Box::new(ConsoleBackend::new()));
        assert!(registry.contains("custom"));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_registration_panics() {
        let mut registry = AdapterRegistry::with_builtins();
        registry.register(ADAPTER_CONSOLE, || Box::new(ConsoleBackend::new()));
    }
}
