use std::collections::BTreeMap;

use super::{FolderProvider, PhotoProvider};
use crate::config::ProviderConfig;
use crate::{Error, Result};

/// Builds a provider from its configuration section.
pub type ProviderFactory = fn(&ProviderConfig) -> Result<Box<dyn PhotoProvider>>;

/// Provider factories keyed by `provider.kind`.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every provider shipped in this crate.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(FolderProvider::KIND, folder_factory);
        registry
    }

    /// Add or replace a factory.
    pub fn register(&mut self, kind: impl Into<String>, factory: ProviderFactory) {
        self.factories.insert(kind.into(), factory);
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Build the provider named by `config.kind`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownProvider`] if nothing is registered under that name,
    /// or whatever the factory reports.
    pub fn create(&self, config: &ProviderConfig) -> Result<Box<dyn PhotoProvider>> {
        let factory = self
            .factories
            .get(&config.kind)
            .ok_or_else(|| Error::UnknownProvider {
                kind: config.kind.clone(),
                available: self.kinds().join(", "),
            })?;
        tracing::debug!(kind = %config.kind, "Creating photo provider");
        factory(config)
    }
}

fn folder_factory(config: &ProviderConfig) -> Result<Box<dyn PhotoProvider>> {
    Ok(Box::new(FolderProvider::from_config(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(kind: &str) -> ProviderConfig {
        ProviderConfig {
            kind: kind.to_string(),
            options: toml::Table::new(),
        }
    }

    #[test]
    fn builtins_include_folder() {
        assert_eq!(ProviderRegistry::with_builtins().kinds(), vec!["folder"]);
    }

    #[test]
    fn unknown_kind_lists_available() {
        let err = ProviderRegistry::with_builtins()
            .create(&config("photos-app"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::UnknownProvider { .. }));
        assert!(err.to_string().contains("folder"));
    }

    #[test]
    fn folder_requires_root_option() {
        let err = ProviderRegistry::with_builtins()
            .create(&config("folder"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::MissingField { ref field } if field == "provider.root"));
    }
}
