use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// When a remote source is refreshed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateFrequency {
    /// Only when the user asks.
    #[default]
    Manual,
    /// Once shortly after process start.
    Startup,
}

/// Outcome of the most recent fetch attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    /// Never fetched, or a fetch is in flight.
    #[default]
    Pending,
    Success,
    Failed,
}

/// A trackable remote hosts-list origin.
///
/// The name doubles as the merge-region key in the live hosts file, so two
/// sources sharing a name overwrite each other's regions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSource {
    /// Blank ids can appear in hand-edited documents; the store assigns a
    /// fresh one on load.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "updateFreq", default)]
    pub update_freq: UpdateFrequency,
    /// Stamped on every successful fetch.
    #[serde(rename = "lastUpdatedAt", default, skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<DateTime<Utc>>,
    /// Last successfully fetched body, kept for change detection. Never
    /// overwritten by a failed fetch.
    #[serde(rename = "lastContent", default, skip_serializing_if = "String::is_empty")]
    pub last_content: String,
    #[serde(default)]
    pub status: SourceStatus,
}

impl RemoteSource {
    /// Create a fresh source in the pending state.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        update_freq: UpdateFrequency,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            url: url.into(),
            update_freq,
            last_updated_at: Some(Utc::now()),
            last_content: String::new(),
            status: SourceStatus::Pending,
        }
    }
}
