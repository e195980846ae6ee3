use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable point-in-time snapshot of hosts-file content.
///
/// Automatic backups are deduplicated by `hash` and pruned to a retention
/// cap; manual backups are kept until the user deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backup {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub content: String,
    /// Byte length of `content`.
    pub size: u64,
    #[serde(rename = "isAutomatic")]
    pub is_automatic: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// SHA-256 hex digest of `content`, the dedup key for automatic backups.
    pub hash: String,
}

impl Backup {
    /// Build a snapshot of `content` with a fresh id and the current time.
    /// The caller supplies the content digest.
    #[must_use]
    pub fn new(
        content: impl Into<String>,
        description: impl Into<String>,
        is_automatic: bool,
        tags: Vec<String>,
        hash: impl Into<String>,
    ) -> Self {
        let content = content.into();
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            description: description.into(),
            size: content.len() as u64,
            content,
            is_automatic,
            tags,
            hash: hash.into(),
        }
    }
}

/// Wire shape of the backups document: an object wrapping the array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupDocument {
    pub backups: Vec<Backup>,
}

/// Aggregate counts over a backup collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupStats {
    pub total: usize,
    pub automatic: usize,
    pub manual: usize,
    /// Summed `size` across all backups.
    #[serde(rename = "totalSize")]
    pub total_size: u64,
}
