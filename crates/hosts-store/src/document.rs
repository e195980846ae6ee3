//! Shared persistence for the JSON document stores.
//!
//! Each store keeps one pretty-printed JSON document that is loaded eagerly
//! and rewritten in full on every mutation. Saves go through a temp file
//! plus rename so a crash never leaves a truncated document.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use hosts_model::{HostsError, Result};

/// Read a document file as text, `None` when it does not exist.
pub(crate) fn read_text_if_exists(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .map_err(|e| HostsError::Io {
            operation: "read",
            path: path.to_path_buf(),
            source: e,
        })
}

/// Load and parse a document, `None` when the file does not exist.
pub(crate) fn load_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let Some(text) = read_text_if_exists(path)? else {
        return Ok(None);
    };
    let value = serde_json::from_str(&text).map_err(|e| HostsError::InvalidDocument {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(Some(value))
}

/// Serialize `value` as indented JSON and atomically replace `path` with it.
pub(crate) fn save_document<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| HostsError::InvalidDocument {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| HostsError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("json.tmp");
    let mut file = File::create(&temp_path).map_err(|e| HostsError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;
    file.write_all(json.as_bytes()).map_err(|e| HostsError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;
    file.sync_all().map_err(|e| HostsError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| HostsError::AtomicReplace {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(path = %path.display(), "saved document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempdir().unwrap();
        let loaded: Option<Vec<String>> = load_document(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");

        save_document(&vec!["a".to_string(), "b".to_string()], &path).unwrap();
        let loaded: Option<Vec<String>> = load_document(&path).unwrap();

        assert_eq!(loaded.unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn saved_document_is_indented() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");

        save_document(&vec![1, 2], &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'));
    }

    #[test]
    fn corrupt_document_is_an_io_class_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, "{not json").unwrap();

        let error = load_document::<Vec<String>>(&path).unwrap_err();
        assert_eq!(error.kind(), hosts_model::ErrorKind::Io);
    }
}
