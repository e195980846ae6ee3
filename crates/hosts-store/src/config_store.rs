//! CRUD and single-active bookkeeping over the config collection.

use std::path::{Path, PathBuf};

use chrono::Utc;

use hosts_model::{Config, ConfigSource, HostsError, Result};

use crate::document::{load_document, save_document};

/// Store for named hosts-file profiles, backed by one JSON array document.
///
/// The collection is loaded eagerly and the whole document is rewritten on
/// every mutation. At most one config is active at a time; activation is
/// driven by the orchestrator after a successful hosts write, never by
/// callers directly.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    configs: Vec<Config>,
}

impl ConfigStore {
    /// Load the store from `path`. A missing file is an empty collection.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let configs = load_document(&path)?.unwrap_or_default();
        Ok(Self { path, configs })
    }

    /// Document location on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All configs in insertion order.
    #[must_use]
    pub fn all(&self) -> &[Config] {
        &self.configs
    }

    /// Look up a config by id.
    pub fn get(&self, id: &str) -> Result<&Config> {
        self.configs
            .iter()
            .find(|config| config.id == id)
            .ok_or_else(|| HostsError::NotFound {
                entity: "config",
                id: id.to_string(),
            })
    }

    /// The currently active config, if any.
    #[must_use]
    pub fn active(&self) -> Option<&Config> {
        self.configs.iter().find(|config| config.is_active)
    }

    /// Create a config and persist the collection.
    pub fn create(&mut self, name: &str, description: &str, content: &str) -> Result<Config> {
        validate_fields(name, content)?;
        let config = Config::new(name, description, content);
        self.configs.push(config.clone());
        self.save()?;
        tracing::info!(id = %config.id, name = %config.name, "created config");
        Ok(config)
    }

    /// Update name, description, and content of an existing config.
    pub fn update(
        &mut self,
        id: &str,
        name: &str,
        description: &str,
        content: &str,
    ) -> Result<Config> {
        validate_fields(name, content)?;
        let config = self.get_mut(id)?;
        config.name = name.to_string();
        config.description = description.to_string();
        config.content = content.to_string();
        config.updated_at = Utc::now();
        let updated = config.clone();
        self.save()?;
        Ok(updated)
    }

    /// Delete a config. Refused while the config is active.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        if self.active().is_some_and(|active| active.id == id) {
            return Err(HostsError::DeleteActiveConfig { id: id.to_string() });
        }
        let index = self
            .configs
            .iter()
            .position(|config| config.id == id)
            .ok_or_else(|| HostsError::NotFound {
                entity: "config",
                id: id.to_string(),
            })?;
        self.configs.remove(index);
        self.save()?;
        tracing::info!(id, "deleted config");
        Ok(())
    }

    /// Flip the active flag to exactly one config.
    ///
    /// Clears every flag, sets the match, and stamps `updated_at` on the
    /// now-active record only. The caller must already have written the
    /// config's content to the hosts file.
    pub fn set_active(&mut self, id: &str) -> Result<()> {
        if !self.configs.iter().any(|config| config.id == id) {
            return Err(HostsError::NotFound {
                entity: "config",
                id: id.to_string(),
            });
        }
        for config in &mut self.configs {
            let is_target = config.id == id;
            config.is_active = is_target;
            if is_target {
                config.updated_at = Utc::now();
            }
        }
        self.save()
    }

    /// Clear every active flag (restore-default path).
    pub fn clear_active(&mut self) -> Result<()> {
        for config in &mut self.configs {
            config.is_active = false;
        }
        self.save()
    }

    /// Rewrite provenance metadata only.
    pub fn update_source(
        &mut self,
        id: &str,
        source: ConfigSource,
        remote_url: Option<String>,
    ) -> Result<Config> {
        let config = self.get_mut(id)?;
        config.source = source;
        config.remote_url = remote_url;
        let updated = config.clone();
        self.save()?;
        Ok(updated)
    }

    /// Ids of configs imported from the given remote URL.
    #[must_use]
    pub fn ids_by_remote_url(&self, url: &str) -> Vec<String> {
        self.configs
            .iter()
            .filter(|config| {
                config.source == ConfigSource::Remote
                    && config.remote_url.as_deref() == Some(url)
            })
            .map(|config| config.id.clone())
            .collect()
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Config> {
        self.configs
            .iter_mut()
            .find(|config| config.id == id)
            .ok_or_else(|| HostsError::NotFound {
                entity: "config",
                id: id.to_string(),
            })
    }

    fn save(&self) -> Result<()> {
        save_document(&self.configs, &self.path)
    }
}

fn validate_fields(name: &str, content: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(HostsError::BlankField { field: "name" });
    }
    if content.trim().is_empty() {
        return Err(HostsError::BlankField { field: "content" });
    }
    Ok(())
}
