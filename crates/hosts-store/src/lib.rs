//! JSON-document persistence for configs, backups, and remote sources.
//!
//! Each store owns one document under the data directory and keeps its
//! collection in memory; every mutation rewrites the document through an
//! atomic temp-file replace so a crash never leaves a half-written file.

pub mod backup_store;
pub mod config_store;
mod document;
pub mod remote_store;

pub use backup_store::{BackupStore, DEFAULT_AUTO_BACKUP_RETENTION, content_hash};
pub use config_store::ConfigStore;
pub use remote_store::RemoteSourceStore;
