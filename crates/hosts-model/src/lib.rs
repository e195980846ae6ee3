//! Shared data model for the hosts manager.
//!
//! Defines the three persisted record types (configs, remote sources,
//! backups) with their exact on-disk JSON field names, the error taxonomy
//! every layer returns, and the notifier contract the core uses to signal an
//! embedding UI.

pub mod backup;
pub mod config;
pub mod error;
pub mod event;
pub mod remote;

pub use backup::{Backup, BackupDocument, BackupStats};
pub use config::{Config, ConfigSource};
pub use error::{ErrorKind, HostsError, Result};
pub use event::{Event, NoopNotifier, Notifier};
pub use remote::{RemoteSource, SourceStatus, UpdateFrequency};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_roundtrips_through_json() {
        let config = Config::new("dev", "local overrides", "127.0.0.1 dev.local\n");
        let json = serde_json::to_string(&config).expect("serialize config");
        let round: Config = serde_json::from_str(&json).expect("deserialize config");
        assert_eq!(round.id, config.id);
        assert_eq!(round.content, config.content);
        assert_eq!(round.source, ConfigSource::Local);
    }

    #[test]
    fn backup_document_roundtrips() {
        let document = BackupDocument {
            backups: vec![Backup::new(
                "127.0.0.1 localhost\n",
                "before apply",
                true,
                vec![],
                "deadbeef",
            )],
        };
        let json = serde_json::to_string(&document).expect("serialize document");
        let round: BackupDocument = serde_json::from_str(&json).expect("deserialize document");
        assert_eq!(round.backups.len(), 1);
        assert!(round.backups[0].is_automatic);
    }
}
