//! Named plugins that can be enabled from configuration.

use std::collections::HashMap;

use tracing::debug;

use crate::{AlchemyError, Plugin};

/// Maps plugin specifiers to plugin constructors.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, fn() -> Plugin>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, constructor: fn() -> Plugin) -> &mut Self {
        self.plugins.insert(name.into(), constructor);
        self
    }

    /// Returns true if a plugin is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Builds the plugins named by `specifiers`, in the same order.
    pub fn load_plugins(&self, specifiers: &[String]) -> Result<Vec<Plugin>, AlchemyError> {
        specifiers
            .iter()
            .map(|name| {
                let constructor = self.plugins.get(name).ok_or_else(|| {
                    AlchemyError::config(format!("Could not load plugin: {}", name))
                })?;
                debug!("Loading plugin '{}'", name);
                Ok(constructor())
            })
            .collect()
    }
}
