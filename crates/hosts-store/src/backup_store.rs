//! Append-only snapshot log with two retention classes.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use hosts_model::{Backup, BackupDocument, BackupStats, HostsError, Result};

use crate::document::{load_document, save_document};

/// Automatic backups kept after pruning, unless configured otherwise.
pub const DEFAULT_AUTO_BACKUP_RETENTION: usize = 10;

/// Store for hosts-content snapshots, backed by one JSON object document.
///
/// Automatic backups are deduplicated by content hash and pruned to the
/// retention cap; manual backups are exempt from pruning and individually
/// deletable, while automatic ones are not.
#[derive(Debug)]
pub struct BackupStore {
    path: PathBuf,
    retention: usize,
    backups: Vec<Backup>,
}

impl BackupStore {
    /// Load the store from `path` with the given automatic retention cap.
    /// A missing file is an empty collection.
    pub fn load(path: impl Into<PathBuf>, retention: usize) -> Result<Self> {
        let path = path.into();
        let document: BackupDocument = load_document(&path)?.unwrap_or_default();
        Ok(Self {
            path,
            retention,
            backups: document.backups,
        })
    }

    /// Document location on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Configured automatic retention cap.
    #[must_use]
    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Snapshot `content`.
    ///
    /// Returns `Ok(None)` when an automatic snapshot is skipped because an
    /// automatic backup with identical content already exists; repeated
    /// operations over unchanged content therefore never pile up snapshots.
    /// Creating an automatic backup triggers pruning of the automatic class
    /// down to the retention cap, oldest first. Manual backups are always
    /// stored, even when the content matches an existing backup.
    pub fn create(
        &mut self,
        content: &str,
        description: &str,
        is_automatic: bool,
        tags: Vec<String>,
    ) -> Result<Option<Backup>> {
        let hash = content_hash(content);
        if is_automatic
            && self
                .backups
                .iter()
                .any(|backup| backup.is_automatic && backup.hash == hash)
        {
            tracing::debug!(hash = %hash, "identical automatic backup exists, skipping");
            return Ok(None);
        }

        let backup = Backup::new(content, description, is_automatic, tags, hash);
        self.backups.push(backup.clone());
        self.save()?;
        tracing::info!(id = %backup.id, automatic = is_automatic, "created backup");

        if is_automatic {
            self.prune()?;
        }
        Ok(Some(backup))
    }

    /// All backups, most recent first. The descending order is a contract
    /// observed by every caller.
    #[must_use]
    pub fn all(&self) -> Vec<Backup> {
        let mut sorted = self.backups.clone();
        sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        sorted
    }

    /// Look up a backup by id.
    pub fn get(&self, id: &str) -> Result<&Backup> {
        self.backups
            .iter()
            .find(|backup| backup.id == id)
            .ok_or_else(|| HostsError::NotFound {
                entity: "backup",
                id: id.to_string(),
            })
    }

    /// Delete a manual backup. Automatic backups are refused.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let backup = self.get(id)?;
        if backup.is_automatic {
            return Err(HostsError::DeleteAutomaticBackup { id: id.to_string() });
        }
        self.backups.retain(|backup| backup.id != id);
        self.save()?;
        tracing::info!(id, "deleted backup");
        Ok(())
    }

    /// Replace the tag list of a backup.
    pub fn update_tags(&mut self, id: &str, tags: Vec<String>) -> Result<Backup> {
        let backup = self.get_mut(id)?;
        backup.tags = tags;
        let updated = backup.clone();
        self.save()?;
        Ok(updated)
    }

    /// Replace the description of a backup.
    pub fn update_description(&mut self, id: &str, description: &str) -> Result<Backup> {
        let backup = self.get_mut(id)?;
        backup.description = description.to_string();
        let updated = backup.clone();
        self.save()?;
        Ok(updated)
    }

    /// Content of a backup. Pure read: writing it back to the system is the
    /// orchestrator's job.
    pub fn restore(&self, id: &str) -> Result<String> {
        Ok(self.get(id)?.content.clone())
    }

    /// Delete every automatic backup, returning how many were removed.
    /// Manual backups are untouched.
    pub fn clear_automatic(&mut self) -> Result<usize> {
        let before = self.backups.len();
        self.backups.retain(|backup| !backup.is_automatic);
        let removed = before - self.backups.len();
        if removed > 0 {
            self.save()?;
        }
        tracing::info!(removed, "cleared automatic backups");
        Ok(removed)
    }

    /// Aggregate counts and summed size.
    #[must_use]
    pub fn stats(&self) -> BackupStats {
        let automatic = self
            .backups
            .iter()
            .filter(|backup| backup.is_automatic)
            .count();
        BackupStats {
            total: self.backups.len(),
            automatic,
            manual: self.backups.len() - automatic,
            total_size: self.backups.iter().map(|backup| backup.size).sum(),
        }
    }

    /// Drop the oldest automatic backups beyond the retention cap.
    fn prune(&mut self) -> Result<()> {
        let over = self
            .backups
            .iter()
            .filter(|backup| backup.is_automatic)
            .count()
            .saturating_sub(self.retention);
        if over == 0 {
            return Ok(());
        }

        let (mut automatic, manual): (Vec<Backup>, Vec<Backup>) = self
            .backups
            .drain(..)
            .partition(|backup| backup.is_automatic);
        automatic.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        automatic.truncate(self.retention);
        self.backups = automatic;
        self.backups.extend(manual);
        self.save()?;
        tracing::debug!(dropped = over, cap = self.retention, "pruned automatic backups");
        Ok(())
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Backup> {
        self.backups
            .iter_mut()
            .find(|backup| backup.id == id)
            .ok_or_else(|| HostsError::NotFound {
                entity: "backup",
                id: id.to_string(),
            })
    }

    fn save(&self) -> Result<()> {
        let document = BackupDocument {
            backups: self.backups.clone(),
        };
        save_document(&document, &self.path)
    }
}

/// SHA-256 hex digest of snapshot content, the automatic dedup key.
#[must_use]
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
