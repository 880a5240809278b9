//! Ordered registry of provider configs loaded from JSON sources.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::IngestError;
use crate::formats::ProviderConfig;

/// Provider configs keyed by provider key, iterated in load order.
///
/// Sources load in declared order; a key seen again later overwrites the
/// earlier entry but keeps its original position. A malformed source (or an
/// individually invalid config) is skipped with a warning, never an error:
/// the registry carries whatever loaded cleanly.
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    configs: HashMap<String, ProviderConfig>,
    order: Vec<String>,
    save_path: Option<PathBuf>,
}

impl FormatRegistry {
    /// Load configs from `sources` in order. `add` persists back to the
    /// first source unless a save path is set explicitly.
    pub fn load<P: AsRef<Path>>(sources: &[P]) -> Self {
        let mut registry = Self {
            save_path: sources.first().map(|p| p.as_ref().to_path_buf()),
            ..Self::default()
        };
        for source in sources {
            registry.load_source(source.as_ref());
        }
        log::info!("Loaded {} provider configs", registry.len());
        registry
    }

    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = Some(path.into());
        self
    }

    fn load_source(&mut self, path: &Path) {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Skipping format source {}: {e}", path.display());
                return;
            }
        };
        let entries: serde_json::Map<String, serde_json::Value> =
            match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!(
                        "Skipping malformed format source {}: {e}",
                        path.display()
                    );
                    return;
                }
            };

        for (key, value) in entries {
            let config: ProviderConfig = match serde_json::from_value(value) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Skipping config '{key}' in {}: {e}", path.display());
                    continue;
                }
            };
            if let Err(e) = config.validate() {
                log::warn!("Skipping config '{key}' in {}: {e}", path.display());
                continue;
            }
            self.insert(key, config);
        }
        log::debug!("Loaded format source {}", path.display());
    }

    /// Insert or replace an entry in memory, preserving first-seen order.
    pub fn insert(&mut self, key: impl Into<String>, config: ProviderConfig) {
        let key = key.into();
        if !self.configs.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.configs.insert(key, config);
    }

    /// Insert or replace an entry and persist the registry.
    ///
    /// The config is validated first; registering a config with an
    /// uncompilable regex is an error, not a deferred match failure.
    pub fn add(
        &mut self,
        key: impl Into<String>,
        config: ProviderConfig,
    ) -> Result<(), IngestError> {
        config.validate()?;
        self.insert(key, config);
        self.save()
    }

    /// Write the full mapping to the save path as pretty JSON.
    fn save(&self) -> Result<(), IngestError> {
        let Some(path) = &self.save_path else {
            log::debug!("Registry has no save path; keeping changes in memory");
            return Ok(());
        };
        let mut document = serde_json::Map::new();
        for key in &self.order {
            if let Some(config) = self.configs.get(key) {
                document.insert(key.clone(), serde_json::to_value(config)?);
            }
        }
        let body = serde_json::to_string_pretty(&serde_json::Value::Object(document))?;
        fs::write(path, body)?;
        log::debug!("Saved {} provider configs to {}", self.len(), path.display());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&ProviderConfig> {
        self.configs.get(key)
    }

    /// Keys in load order. Display only: callers must not rely on this order
    /// for correctness.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// (key, config) pairs in load order; detection walks this.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProviderConfig)> {
        self.order
            .iter()
            .filter_map(|key| self.configs.get(key).map(|c| (key.as_str(), c)))
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
