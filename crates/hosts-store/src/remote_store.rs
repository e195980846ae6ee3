//! Remote source registry with legacy-document migration.

use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use hosts_model::{HostsError, RemoteSource, Result, SourceStatus, UpdateFrequency};

use crate::document::{read_text_if_exists, save_document};

/// Store for tracked remote sources, backed by one JSON array document.
///
/// Loading is deliberately forgiving: this document historically held a
/// single object instead of an array, and hand edits happen. A legacy
/// single-object document is migrated to array form and rewritten at once;
/// any other unreadable document is treated as empty rather than blocking
/// startup.
#[derive(Debug)]
pub struct RemoteSourceStore {
    path: PathBuf,
    sources: Vec<RemoteSource>,
}

impl RemoteSourceStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut store = Self {
            path,
            sources: Vec::new(),
        };

        let Some(text) = read_text_if_exists(&store.path)? else {
            return Ok(store);
        };
        if text.trim().is_empty() {
            return Ok(store);
        }

        if let Ok(sources) = serde_json::from_str::<Vec<RemoteSource>>(&text) {
            store.sources = sources;
            // Repairs stay in memory until the next ordinary save.
            repair(&mut store.sources);
            return Ok(store);
        }

        match serde_json::from_str::<RemoteSource>(&text) {
            Ok(single) => {
                tracing::info!(
                    path = %store.path.display(),
                    "migrating legacy single-object remote document to array form"
                );
                store.sources = vec![single];
                repair(&mut store.sources);
                store.save()?;
            }
            Err(error) => {
                tracing::warn!(
                    path = %store.path.display(),
                    %error,
                    "unreadable remote source document, starting empty"
                );
            }
        }
        Ok(store)
    }

    /// Document location on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn all(&self) -> &[RemoteSource] {
        &self.sources
    }

    pub fn get(&self, id: &str) -> Result<&RemoteSource> {
        self.sources
            .iter()
            .find(|source| source.id == id)
            .ok_or_else(|| HostsError::NotFound {
                entity: "remote source",
                id: id.to_string(),
            })
    }

    /// First source registered for `url`, if any.
    #[must_use]
    pub fn find_by_url(&self, url: &str) -> Option<&RemoteSource> {
        self.sources.iter().find(|source| source.url == url)
    }

    /// Register a new source in the pending state.
    pub fn add(
        &mut self,
        name: &str,
        url: &str,
        update_freq: UpdateFrequency,
    ) -> Result<RemoteSource> {
        validate_source_params(name, url)?;
        let source = RemoteSource::new(name, url, update_freq);
        self.sources.push(source.clone());
        self.save()?;
        tracing::info!(id = %source.id, name, "added remote source");
        Ok(source)
    }

    /// Rewrite name, url, and frequency. Fetch bookkeeping fields are
    /// untouched, so the previous body still serves change detection.
    pub fn update(
        &mut self,
        id: &str,
        name: &str,
        url: &str,
        update_freq: UpdateFrequency,
    ) -> Result<RemoteSource> {
        validate_source_params(name, url)?;
        let source = self.get_mut(id)?;
        source.name = name.to_string();
        source.url = url.to_string();
        source.update_freq = update_freq;
        let updated = source.clone();
        self.save()?;
        Ok(updated)
    }

    /// Unregister a source, returning it so callers can clean up whatever
    /// was derived from it.
    pub fn remove(&mut self, id: &str) -> Result<RemoteSource> {
        let index = self
            .sources
            .iter()
            .position(|source| source.id == id)
            .ok_or_else(|| HostsError::NotFound {
                entity: "remote source",
                id: id.to_string(),
            })?;
        let removed = self.sources.remove(index);
        self.save()?;
        tracing::info!(id, name = %removed.name, "removed remote source");
        Ok(removed)
    }

    /// Transition the fetch status without touching the cached body.
    pub fn set_status(&mut self, id: &str, status: SourceStatus) -> Result<()> {
        let source = self.get_mut(id)?;
        source.status = status;
        self.save()
    }

    /// Record a successful fetch: status, timestamp, and cached body.
    pub fn record_success(&mut self, id: &str, content: &str) -> Result<RemoteSource> {
        let source = self.get_mut(id)?;
        source.status = SourceStatus::Success;
        source.last_updated_at = Some(Utc::now());
        source.last_content = content.to_string();
        let updated = source.clone();
        self.save()?;
        Ok(updated)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut RemoteSource> {
        self.sources
            .iter_mut()
            .find(|source| source.id == id)
            .ok_or_else(|| HostsError::NotFound {
                entity: "remote source",
                id: id.to_string(),
            })
    }

    fn save(&self) -> Result<()> {
        save_document(&self.sources, &self.path)
    }
}

fn validate_source_params(name: &str, url: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(HostsError::BlankField { field: "name" });
    }
    if url.trim().is_empty() {
        return Err(HostsError::BlankField { field: "url" });
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(HostsError::InvalidRemoteSource {
            reason: "url must start with http:// or https://".to_string(),
        });
    }
    Ok(())
}

/// Fill in fields a hand-edited or partial document may lack. A source
/// without a url can never fetch, so it is parked in the failed state for
/// the user to fix.
fn repair(sources: &mut [RemoteSource]) {
    for source in sources {
        if source.id.trim().is_empty() {
            source.id = Uuid::new_v4().to_string();
            tracing::info!(name = %source.name, id = %source.id, "assigned id to remote source");
        }
        if source.url.trim().is_empty() {
            source.status = SourceStatus::Failed;
            tracing::warn!(name = %source.name, "remote source has no url, marking failed");
        }
        if source.last_updated_at.is_none() {
            source.last_updated_at = Some(Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hosts_model::ErrorKind;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> RemoteSourceStore {
        RemoteSourceStore::load(dir.path().join("remote_sources.json")).unwrap()
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        assert!(store_in(&dir).all().is_empty());
    }

    #[test]
    fn add_persists_across_reload() {
        let dir = tempdir().unwrap();
        let id = {
            let mut store = store_in(&dir);
            store
                .add("ad-block", "https://example.com/hosts", UpdateFrequency::Startup)
                .unwrap()
                .id
        };

        let store = store_in(&dir);
        let source = store.get(&id).unwrap();
        assert_eq!(source.name, "ad-block");
        assert_eq!(source.update_freq, UpdateFrequency::Startup);
        assert_eq!(source.status, SourceStatus::Pending);
    }

    #[test]
    fn add_validates_name_url_and_scheme() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);

        for (name, url) in [
            ("  ", "https://example.com/hosts"),
            ("list", ""),
            ("list", "ftp://example.com/hosts"),
        ] {
            let error = store.add(name, url, UpdateFrequency::Manual).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Validation, "{name:?} {url:?}");
        }
        assert!(store.all().is_empty());
    }

    #[test]
    fn update_keeps_fetch_bookkeeping() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        let id = store
            .add("list", "https://example.com/a", UpdateFrequency::Manual)
            .unwrap()
            .id;
        store.record_success(&id, "1.1.1.1 a.com\n").unwrap();

        let updated = store
            .update(&id, "renamed", "https://example.com/b", UpdateFrequency::Startup)
            .unwrap();

        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.url, "https://example.com/b");
        assert_eq!(updated.status, SourceStatus::Success);
        assert_eq!(updated.last_content, "1.1.1.1 a.com\n");
    }

    #[test]
    fn remove_returns_the_source_then_not_found() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        let id = store
            .add("list", "https://example.com/hosts", UpdateFrequency::Manual)
            .unwrap()
            .id;

        let removed = store.remove(&id).unwrap();
        assert_eq!(removed.name, "list");

        let error = store.remove(&id).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn record_success_stamps_and_caches() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        let id = store
            .add("list", "https://example.com/hosts", UpdateFrequency::Manual)
            .unwrap()
            .id;

        store.record_success(&id, "0.0.0.0 ads.example\n").unwrap();
        store.set_status(&id, SourceStatus::Failed).unwrap();

        // A later failure keeps the last good body.
        let source = store.get(&id).unwrap();
        assert_eq!(source.status, SourceStatus::Failed);
        assert_eq!(source.last_content, "0.0.0.0 ads.example\n");
        assert!(source.last_updated_at.is_some());
    }

    #[test]
    fn legacy_single_object_document_is_migrated_and_rewritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("remote_sources.json");
        std::fs::write(
            &path,
            r#"{"id":"legacy-1","name":"old list","url":"https://example.com/hosts","updateFreq":"manual","status":"success"}"#,
        )
        .unwrap();

        let store = RemoteSourceStore::load(&path).unwrap();
        assert_eq!(store.all().len(), 1);
        assert_eq!(store.all()[0].id, "legacy-1");

        // The file itself was rewritten in array form.
        let rewritten = std::fs::read_to_string(&path).unwrap();
        assert!(rewritten.trim_start().starts_with('['));
    }

    #[test]
    fn partial_entries_are_repaired_in_memory_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("remote_sources.json");
        let original = r#"[{"name":"no id","url":"https://example.com/hosts"},{"id":"u","name":"no url"}]"#;
        std::fs::write(&path, original).unwrap();

        let store = RemoteSourceStore::load(&path).unwrap();
        assert!(!store.all()[0].id.is_empty());
        assert_eq!(store.all()[1].status, SourceStatus::Failed);
        assert!(store.all().iter().all(|source| source.last_updated_at.is_some()));

        // Array documents are not rewritten on load.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn unreadable_document_starts_empty_without_clobbering() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("remote_sources.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = RemoteSourceStore::load(&path).unwrap();
        assert!(store.all().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[test]
    fn find_by_url_matches_exactly() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        store
            .add("a", "https://example.com/a", UpdateFrequency::Manual)
            .unwrap();
        store
            .add("b", "https://example.com/b", UpdateFrequency::Manual)
            .unwrap();

        assert_eq!(store.find_by_url("https://example.com/b").unwrap().name, "b");
        assert!(store.find_by_url("https://example.com/c").is_none());
    }
}
