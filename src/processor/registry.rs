//! Name-to-factory registry for block processors.
//!
//! Nothing is registered implicitly: the composition root creates a
//! [`ProcessorRegistry`] and calls [`register_builtin`] (plus any custom
//! [`ProcessorRegistry::register`] calls) before building a host.

use std::collections::HashMap;

use thiserror::Error;

use super::{BlockProcessor, FrameForwarder};
use crate::conduit::BlockSender;

/// Stable identifier under which [`FrameForwarder`] is registered.
pub const PITCH_PROCESSOR: &str = "pitch-processor";

/// Builds a processor bound to the given conduit port.
pub type ProcessorFactory = Box<dyn Fn(BlockSender) -> Box<dyn BlockProcessor> + Send + Sync>;

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("processor name must not be empty")]
    EmptyName,

    #[error("a processor named '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("no processor registered under '{0}'")]
    UnknownProcessor(String),
}

// ---------------------------------------------------------------------------
// ProcessorRegistry
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ProcessorRegistry {
    factories: HashMap<String, ProcessorFactory>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::EmptyName`] for `""`, and
    /// [`RegistryError::AlreadyRegistered`] if `name` is taken.  A failed
    /// registration leaves the existing entry untouched.
    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<(), RegistryError>
    where
        F: Fn(BlockSender) -> Box<dyn BlockProcessor> + Send + Sync + 'static,
    {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.factories.contains_key(name) {
            return Err(RegistryError::AlreadyRegistered(name.to_owned()));
        }
        self.factories.insert(name.to_owned(), Box::new(factory));
        log::debug!("registered processor '{name}'");
        Ok(())
    }

    /// Build a new instance of the processor registered under `name`.
    pub fn instantiate(
        &self,
        name: &str,
        port: BlockSender,
    ) -> Result<Box<dyn BlockProcessor>, RegistryError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RegistryError::UnknownProcessor(name.to_owned()))?;
        Ok(factory(port))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Register the processors this crate ships with.
pub fn register_builtin(registry: &mut ProcessorRegistry) -> Result<(), RegistryError> {
    registry.register(PITCH_PROCESSOR, |port| Box::new(FrameForwarder::new(port)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
