use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Provenance of a config's content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Authored locally by the user.
    #[default]
    Local,
    /// Imported from a remote hosts list.
    Remote,
}

/// A named hosts-file profile.
///
/// At most one config in a collection is active; the active config's content
/// is what was last written to the system hosts file through it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Full hosts-file text.
    pub content: String,
    pub is_active: bool,
    #[serde(default)]
    pub source: ConfigSource,
    /// Origin URL, present only for remote-sourced configs.
    #[serde(rename = "remoteUrl", default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Config {
    /// Create a fresh local config with a new id and current timestamps.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            content: content.into(),
            is_active: false,
            source: ConfigSource::Local,
            remote_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_config_is_local_and_inactive() {
        let config = Config::new("dev", "development hosts", "127.0.0.1 localhost\n");
        assert!(!config.is_active);
        assert_eq!(config.source, ConfigSource::Local);
        assert!(config.remote_url.is_none());
        assert!(!config.id.is_empty());
    }

    #[test]
    fn wire_field_names() {
        let mut config = Config::new("dev", "", "127.0.0.1 localhost\n");
        config.remote_url = Some("https://example.com/hosts".to_string());
        config.source = ConfigSource::Remote;
        let json = serde_json::to_value(&config).unwrap();
        let object = json.as_object().unwrap();
        assert!(object.contains_key("is_active"));
        assert!(object.contains_key("remoteUrl"));
        assert!(object.contains_key("created_at"));
        assert_eq!(json["source"], "remote");
    }

    #[test]
    fn remote_url_omitted_when_absent() {
        let config = Config::new("dev", "", "127.0.0.1 localhost\n");
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("remoteUrl").is_none());
    }
}
