//! Notification contract between the core and an embedding UI layer.
//!
//! The core emits an [`Event`] after each successful mutation through an
//! injected [`Notifier`]. Delivery is fire-and-forget: no acknowledgement is
//! expected and a slow or absent listener never blocks a mutation.

/// Side-channel signal emitted after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The config collection changed (create, update, delete, activation).
    ConfigListChanged,
    /// A config was applied to the system hosts file.
    ConfigApplied { id: String },
    /// The live system hosts file was rewritten.
    SystemHostsUpdated,
    /// The remote source collection changed.
    RemoteSourceListChanged,
    /// A source's fetch status moved between pending/success/failed.
    RemoteSourceStatusChanged { id: String },
    /// A source's content was merged into the system hosts file.
    RemoteAppliedToSystem { name: String },
    /// A deleted source's region was removed from the system hosts file.
    RemoteSourceCleaned { name: String },
    /// The startup reconciliation pass finished.
    StartupSourcesUpdated,
    BackupCreated { id: String },
    BackupDeleted { id: String },
    /// Backup tags or description edited.
    BackupUpdated { id: String },
    BackupRestored { id: String },
}

impl Event {
    /// Stable topic name for event-bus style listeners.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            Self::ConfigListChanged => "config-list-changed",
            Self::ConfigApplied { .. } => "config-applied",
            Self::SystemHostsUpdated => "system-hosts-updated",
            Self::RemoteSourceListChanged => "remote-source-list-changed",
            Self::RemoteSourceStatusChanged { .. } => "remote-source-status-changed",
            Self::RemoteAppliedToSystem { .. } => "remote-applied-to-system",
            Self::RemoteSourceCleaned { .. } => "remote-source-cleaned-from-system",
            Self::StartupSourcesUpdated => "startup-sources-updated",
            Self::BackupCreated { .. } => "backup-created",
            Self::BackupDeleted { .. } => "backup-deleted",
            Self::BackupUpdated { .. } => "backup-updated",
            Self::BackupRestored { .. } => "backup-restored",
        }
    }
}

/// Capability the core calls after each successful mutation.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: Event);
}

/// Notifier that drops every event. Useful for embedders without a UI.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _event: Event) {}
}
