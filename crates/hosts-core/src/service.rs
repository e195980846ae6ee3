//! The single mutation entry point for the hosts manager.
//!
//! [`HostsService`] owns the gateway, the three stores, and the HTTP client
//! behind one mutex. Every public operation locks it for the full
//! read-modify-write-persist sequence, so a user-initiated apply can never
//! interleave with the startup refresh against the same file. Events are
//! queued while the lock is held and delivered to the injected
//! [`Notifier`] after it is released, which keeps listeners from
//! re-entering the service under the lock.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use hosts_gateway::{HostsFileGateway, system_hosts_path, validate_hosts_content};
use hosts_model::{
    Backup, BackupStats, Config, ConfigSource, Event, HostsError, Notifier, RemoteSource, Result,
    SourceStatus, UpdateFrequency,
};
use hosts_remote::{FetchClient, MAX_DIRECT_RESPONSE_BYTES};
use hosts_store::{BackupStore, ConfigStore, DEFAULT_AUTO_BACKUP_RETENTION, RemoteSourceStore};

use crate::refresh::{self, RefreshHandle, STARTUP_REFRESH_DELAY};

/// Region name used when refreshing a remote config whose url has no
/// tracked source.
const UNTRACKED_SOURCE_NAME: &str = "remote source";

/// Phase of an orchestrated write, for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApplyPhase {
    Snapshotting,
    Validating,
    Writing,
    Activating,
    RollingBack,
}

impl fmt::Display for ApplyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Snapshotting => "snapshotting",
            Self::Validating => "validating",
            Self::Writing => "writing",
            Self::Activating => "activating",
            Self::RollingBack => "rolling back",
        };
        f.write_str(name)
    }
}

/// Construction parameters for [`HostsService`].
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Directory holding the three JSON documents.
    pub data_dir: PathBuf,
    /// Hosts file location override. `None` resolves the platform path.
    pub hosts_path: Option<PathBuf>,
    /// Automatic backups kept after pruning.
    pub backup_retention: usize,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            hosts_path: None,
            backup_retention: DEFAULT_AUTO_BACKUP_RETENTION,
        }
    }
}

/// `~/.hosts-manager`, falling back to a relative directory when the home
/// directory cannot be resolved.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".hosts-manager"))
        .unwrap_or_else(|| PathBuf::from(".hosts-manager"))
}

/// Outcome of a bulk refresh across remote sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Names of sources applied to the system.
    pub updated: Vec<String>,
    /// Names of sources that failed; the refresh continued past them.
    pub failed: Vec<String>,
}

/// Notifier that writes each event to the log. The production default when
/// no UI layer is listening.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

impl Notifier for LoggingNotifier {
    fn notify(&self, event: Event) {
        info!(topic = event.topic(), ?event, "event");
    }
}

struct ServiceInner {
    gateway: HostsFileGateway,
    configs: ConfigStore,
    backups: BackupStore,
    remotes: RemoteSourceStore,
    fetcher: FetchClient,
}

/// Orchestrates every mutation of the hosts file and the three stores.
pub struct HostsService {
    inner: Mutex<ServiceInner>,
    notifier: Arc<dyn Notifier>,
    refresh: Mutex<Option<RefreshHandle>>,
    data_dir: PathBuf,
    backup_retention: usize,
}

impl HostsService {
    /// Create the data directory, load the three stores, and build the
    /// service. Loading is eager so document corruption surfaces here, not
    /// in the middle of a later mutation.
    pub fn init(options: ServiceOptions, notifier: Arc<dyn Notifier>) -> Result<Self> {
        std::fs::create_dir_all(&options.data_dir).map_err(|e| HostsError::Io {
            operation: "create directory",
            path: options.data_dir.clone(),
            source: e,
        })?;

        let hosts_path = options.hosts_path.unwrap_or_else(system_hosts_path);
        info!(
            hosts_path = %hosts_path.display(),
            data_dir = %options.data_dir.display(),
            "initializing hosts service"
        );

        let inner = ServiceInner {
            gateway: HostsFileGateway::new(hosts_path),
            configs: ConfigStore::load(options.data_dir.join("configs.json"))?,
            backups: BackupStore::load(
                options.data_dir.join("backups.json"),
                options.backup_retention,
            )?,
            remotes: RemoteSourceStore::load(options.data_dir.join("remote_sources.json"))?,
            fetcher: FetchClient::new()?,
        };

        Ok(Self {
            inner: Mutex::new(inner),
            notifier,
            refresh: Mutex::new(None),
            data_dir: options.data_dir,
            backup_retention: options.backup_retention,
        })
    }

    /// Directory holding the JSON documents.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Automatic backup retention cap.
    #[must_use]
    pub fn backup_retention(&self) -> usize {
        self.backup_retention
    }

    /// Resolved hosts file location.
    #[must_use]
    pub fn hosts_path(&self) -> PathBuf {
        self.inner.lock().unwrap().gateway.path().to_path_buf()
    }

    /// Spawn the delayed startup reconciliation task.
    pub fn start_background_refresh(self: &Arc<Self>) {
        let handle = refresh::spawn_startup_refresh(Arc::clone(self), STARTUP_REFRESH_DELAY);
        *self.refresh.lock().unwrap() = Some(handle);
    }

    /// Cancel the startup task if it has not run yet and wait for it.
    pub fn shutdown(&self) {
        if let Some(handle) = self.refresh.lock().unwrap().take() {
            handle.shutdown();
        }
    }

    // ----- hosts file -----

    /// Current live hosts content. A missing file is materialized with the
    /// default document first.
    pub fn read_system_hosts(&self) -> Result<String> {
        self.with_inner(|inner, _events| inner.gateway.read())
    }

    /// Write free-form content to the hosts file: snapshot, validate,
    /// write. The active flag is untouched.
    pub fn write_system_hosts(&self, content: &str) -> Result<()> {
        self.with_inner(|inner, events| {
            orchestrated_write(inner, events, content, WriteEncoding::Utf8, SNAPSHOT_WRITE)
        })
    }

    /// Same sequence as [`Self::write_system_hosts`] but the final write
    /// re-encodes to the legacy ANSI (GBK) codepage.
    pub fn write_system_hosts_ansi(&self, content: &str) -> Result<()> {
        self.with_inner(|inner, events| {
            orchestrated_write(inner, events, content, WriteEncoding::Ansi, SNAPSHOT_WRITE)
        })
    }

    /// Rewrite the hosts file with the default document and deactivate
    /// every config.
    pub fn restore_default(&self) -> Result<()> {
        self.with_inner(|inner, events| {
            debug!(phase = %ApplyPhase::Writing, "restoring default hosts document");
            inner.gateway.materialize_default()?;
            inner.configs.clear_active()?;
            events.push(Event::ConfigListChanged);
            events.push(Event::SystemHostsUpdated);
            Ok(())
        })
    }

    // ----- configs -----

    pub fn configs(&self) -> Vec<Config> {
        self.inner.lock().unwrap().configs.all().to_vec()
    }

    pub fn config(&self, id: &str) -> Result<Config> {
        self.with_inner(|inner, _events| Ok(inner.configs.get(id)?.clone()))
    }

    pub fn active_config(&self) -> Option<Config> {
        self.inner.lock().unwrap().configs.active().cloned()
    }

    pub fn create_config(&self, name: &str, description: &str, content: &str) -> Result<Config> {
        self.with_inner(|inner, events| {
            let config = inner.configs.create(name, description, content)?;
            events.push(Event::ConfigListChanged);
            Ok(config)
        })
    }

    pub fn update_config(
        &self,
        id: &str,
        name: &str,
        description: &str,
        content: &str,
    ) -> Result<Config> {
        self.with_inner(|inner, events| {
            let config = inner.configs.update(id, name, description, content)?;
            events.push(Event::ConfigListChanged);
            Ok(config)
        })
    }

    pub fn delete_config(&self, id: &str) -> Result<()> {
        self.with_inner(|inner, events| {
            inner.configs.delete(id)?;
            events.push(Event::ConfigListChanged);
            Ok(())
        })
    }

    /// Make a config's content the live hosts file and mark it active.
    ///
    /// Runs the full sequence: look up, read current, snapshot, validate,
    /// write, activate. If activation fails to persist, the previous
    /// content is written back best-effort and the persist error surfaces;
    /// when even the rollback write fails the hosts file and the stored
    /// active flag disagree, which is logged as a recognized inconsistency.
    pub fn apply_config(&self, id: &str) -> Result<Config> {
        self.with_inner(|inner, events| {
            let target = inner.configs.get(id)?.clone();
            info!(id, name = %target.name, "applying config");

            let current = inner.gateway.read()?;
            snapshot_before_write(inner, events, &current, SNAPSHOT_APPLY);

            debug!(phase = %ApplyPhase::Validating, id, "validating config content");
            validate_hosts_content(&target.content)?;

            debug!(phase = %ApplyPhase::Writing, id, "writing config content");
            inner.gateway.write(&target.content)?;

            debug!(phase = %ApplyPhase::Activating, id, "persisting active flag");
            if let Err(error) = inner.configs.set_active(id) {
                warn!(phase = %ApplyPhase::RollingBack, id, %error, "activation failed");
                if let Err(rollback_error) = inner.gateway.write(&current) {
                    warn!(
                        id,
                        %rollback_error,
                        "rollback write failed; hosts file and active flag now disagree"
                    );
                }
                return Err(error);
            }

            events.push(Event::ConfigApplied { id: id.to_string() });
            events.push(Event::ConfigListChanged);
            Ok(inner.configs.get(id)?.clone())
        })
    }

    // ----- backups -----

    /// All backups, most recent first.
    pub fn backups(&self) -> Vec<Backup> {
        self.inner.lock().unwrap().backups.all()
    }

    pub fn backup(&self, id: &str) -> Result<Backup> {
        self.with_inner(|inner, _events| Ok(inner.backups.get(id)?.clone()))
    }

    /// Snapshot the current live content.
    ///
    /// Returns `None` when an automatic snapshot is skipped because an
    /// identical automatic backup already exists.
    pub fn create_backup(
        &self,
        description: &str,
        is_automatic: bool,
        tags: Vec<String>,
    ) -> Result<Option<Backup>> {
        self.with_inner(|inner, events| {
            let content = inner.gateway.read()?;
            let created = inner.backups.create(&content, description, is_automatic, tags)?;
            if let Some(backup) = &created {
                events.push(Event::BackupCreated {
                    id: backup.id.clone(),
                });
            }
            Ok(created)
        })
    }

    pub fn delete_backup(&self, id: &str) -> Result<()> {
        self.with_inner(|inner, events| {
            inner.backups.delete(id)?;
            events.push(Event::BackupDeleted { id: id.to_string() });
            Ok(())
        })
    }

    pub fn update_backup_tags(&self, id: &str, tags: Vec<String>) -> Result<Backup> {
        self.with_inner(|inner, events| {
            let backup = inner.backups.update_tags(id, tags)?;
            events.push(Event::BackupUpdated { id: id.to_string() });
            Ok(backup)
        })
    }

    pub fn update_backup_description(&self, id: &str, description: &str) -> Result<Backup> {
        self.with_inner(|inner, events| {
            let backup = inner.backups.update_description(id, description)?;
            events.push(Event::BackupUpdated { id: id.to_string() });
            Ok(backup)
        })
    }

    /// Write a backup's content back to the hosts file.
    ///
    /// The content that is about to be replaced is snapshotted first as an
    /// automatic backup tagged `restore`, so the restore itself can be
    /// undone.
    pub fn restore_from_backup(&self, id: &str) -> Result<()> {
        self.with_inner(|inner, events| {
            let content = inner.backups.restore(id)?;
            info!(id, "restoring hosts content from backup");
            orchestrated_write(inner, events, &content, WriteEncoding::Utf8, SNAPSHOT_RESTORE)?;
            events.push(Event::BackupRestored { id: id.to_string() });
            Ok(())
        })
    }

    /// Delete every automatic backup, returning how many were removed.
    pub fn clear_automatic_backups(&self) -> Result<usize> {
        self.with_inner(|inner, _events| inner.backups.clear_automatic())
    }

    pub fn backup_stats(&self) -> BackupStats {
        self.inner.lock().unwrap().backups.stats()
    }

    // ----- remote sources -----

    pub fn remote_sources(&self) -> Vec<RemoteSource> {
        self.inner.lock().unwrap().remotes.all().to_vec()
    }

    pub fn remote_source(&self, id: &str) -> Result<RemoteSource> {
        self.with_inner(|inner, _events| Ok(inner.remotes.get(id)?.clone()))
    }

    pub fn add_remote_source(
        &self,
        name: &str,
        url: &str,
        update_freq: UpdateFrequency,
    ) -> Result<RemoteSource> {
        self.with_inner(|inner, events| {
            let source = inner.remotes.add(name, url, update_freq)?;
            events.push(Event::RemoteSourceListChanged);
            Ok(source)
        })
    }

    pub fn update_remote_source(
        &self,
        id: &str,
        name: &str,
        url: &str,
        update_freq: UpdateFrequency,
    ) -> Result<RemoteSource> {
        self.with_inner(|inner, events| {
            let source = inner.remotes.update(id, name, url, update_freq)?;
            events.push(Event::RemoteSourceListChanged);
            Ok(source)
        })
    }

    /// Unregister a source and clean up everything derived from it: its
    /// region in the live hosts file (best-effort) and any configs imported
    /// from its url.
    pub fn delete_remote_source(&self, id: &str) -> Result<()> {
        self.with_inner(|inner, events| {
            let source = inner.remotes.get(id)?.clone();

            match inner.gateway.read() {
                Ok(current) => {
                    let cleaned = hosts_remote::clean(&current, &source.name);
                    if cleaned != current {
                        let written = validate_hosts_content(&cleaned)
                            .and_then(|()| inner.gateway.write(&cleaned));
                        match written {
                            Ok(()) => events.push(Event::SystemHostsUpdated),
                            Err(error) => warn!(
                                name = %source.name,
                                %error,
                                "failed to clean region from hosts file, deleting source anyway"
                            ),
                        }
                    }
                }
                Err(error) => warn!(
                    name = %source.name,
                    %error,
                    "could not read hosts file to clean region, deleting source anyway"
                ),
            }

            let mut deleted_configs = false;
            for config_id in inner.configs.ids_by_remote_url(&source.url) {
                match inner.configs.delete(&config_id) {
                    Ok(()) => deleted_configs = true,
                    Err(error) => warn!(
                        config_id,
                        %error,
                        "could not delete config imported from the removed source"
                    ),
                }
            }
            if deleted_configs {
                events.push(Event::ConfigListChanged);
            }

            inner.remotes.remove(id)?;
            events.push(Event::RemoteSourceListChanged);
            events.push(Event::RemoteSourceCleaned { name: source.name });
            Ok(())
        })
    }

    /// Fetch a source's url, with status bookkeeping on the record:
    /// pending while in flight, then success (stamping `lastUpdatedAt` and
    /// caching the body) or failed (leaving the previous body in place).
    pub fn fetch_remote(&self, id: &str) -> Result<String> {
        self.with_inner(|inner, events| fetch_remote_inner(inner, events, id))
    }

    /// Fetch a source and merge its content into the live hosts file.
    pub fn apply_remote_to_system(&self, id: &str) -> Result<()> {
        self.with_inner(|inner, events| {
            let body = fetch_remote_inner(inner, events, id)?;
            let name = inner.remotes.get(id)?.name.clone();
            apply_remote_body(inner, events, &name, &body)
        })
    }

    /// Apply every tracked source to the system in turn. Per-source
    /// failures are logged and collected; the loop always finishes.
    pub fn update_all_remote_sources(&self) -> RefreshSummary {
        self.with_inner_infallible(|inner, events| {
            let sources: Vec<(String, String)> = inner
                .remotes
                .all()
                .iter()
                .map(|source| (source.id.clone(), source.name.clone()))
                .collect();

            let mut summary = RefreshSummary::default();
            for (id, name) in sources {
                let applied = fetch_remote_inner(inner, events, &id)
                    .and_then(|body| apply_remote_body(inner, events, &name, &body));
                match applied {
                    Ok(()) => summary.updated.push(name),
                    Err(error) => {
                        warn!(name = %name, %error, "update failed, continuing with next source");
                        summary.failed.push(name);
                    }
                }
            }
            summary
        })
    }

    /// Import a source's content as a new config carrying the merged
    /// result and remote provenance.
    pub fn create_config_from_remote(&self, id: &str) -> Result<Config> {
        self.with_inner(|inner, events| {
            let body = fetch_remote_inner(inner, events, id)?;
            let source = inner.remotes.get(id)?.clone();

            // An unreadable hosts file degrades to merging into nothing.
            let current = inner.gateway.read().unwrap_or_default();
            let merged = hosts_remote::merge(&current, &body, &source.name);

            let config = inner.configs.create(
                &format!("{} (remote)", source.name),
                &format!("Imported from {}, merged with the local hosts content", source.url),
                &merged,
            )?;
            let config =
                inner
                    .configs
                    .update_source(&config.id, ConfigSource::Remote, Some(source.url))?;
            events.push(Event::ConfigListChanged);
            Ok(config)
        })
    }

    /// Refresh a remote-sourced config in place.
    ///
    /// Fetches through the tracked source when one matches the config's
    /// url; otherwise falls back to a direct request with a tighter size
    /// ceiling and a generic region name.
    pub fn update_config_from_remote(&self, config_id: &str) -> Result<Config> {
        self.with_inner(|inner, events| {
            let config = inner.configs.get(config_id)?.clone();
            let remote_url = match (&config.source, &config.remote_url) {
                (ConfigSource::Remote, Some(url)) if !url.is_empty() => url.clone(),
                _ => {
                    return Err(HostsError::InvalidRemoteSource {
                        reason: "config is not remote-sourced".to_string(),
                    });
                }
            };

            let (body, region_name) =
                match inner.remotes.find_by_url(&remote_url).map(|source| {
                    (source.id.clone(), source.name.clone())
                }) {
                    Some((source_id, source_name)) => {
                        let body = fetch_remote_inner(inner, events, &source_id)?;
                        (body, source_name)
                    }
                    None => {
                        let body = inner
                            .fetcher
                            .fetch_with_limit(&remote_url, MAX_DIRECT_RESPONSE_BYTES)?;
                        (body, UNTRACKED_SOURCE_NAME.to_string())
                    }
                };

            let current = inner
                .gateway
                .read()
                .unwrap_or_else(|_| config.content.clone());
            let merged = hosts_remote::merge(&current, &body, &region_name);

            inner
                .configs
                .update(config_id, &config.name, &config.description, &merged)?;
            let config = inner.configs.update_source(
                config_id,
                ConfigSource::Remote,
                Some(remote_url),
            )?;
            events.push(Event::ConfigListChanged);
            Ok(config)
        })
    }

    /// One reconciliation pass over sources flagged for startup refresh.
    ///
    /// Each is fetched once; the fetched body is applied only when it
    /// differs from the body cached before the fetch, so an unchanged
    /// source costs one request and zero writes.
    pub fn run_startup_refresh(&self) -> RefreshSummary {
        self.with_inner_infallible(|inner, events| {
            let sources: Vec<RemoteSource> = inner.remotes.all().to_vec();
            if sources.is_empty() {
                debug!("no remote sources, skipping startup refresh");
                return RefreshSummary::default();
            }

            let mut summary = RefreshSummary::default();
            for source in sources
                .into_iter()
                .filter(|source| source.update_freq == UpdateFrequency::Startup)
            {
                let prior = source.last_content.clone();
                let body = match fetch_remote_inner(inner, events, &source.id) {
                    Ok(body) => body,
                    Err(error) => {
                        warn!(name = %source.name, %error, "startup fetch failed");
                        summary.failed.push(source.name);
                        continue;
                    }
                };

                if !prior.is_empty() && prior == body {
                    debug!(name = %source.name, "content unchanged, skipping apply");
                    continue;
                }

                match apply_remote_body(inner, events, &source.name, &body) {
                    Ok(()) => summary.updated.push(source.name),
                    Err(error) => {
                        warn!(name = %source.name, %error, "startup apply failed");
                        mark_failed(inner, events, &source.id);
                        summary.failed.push(source.name);
                    }
                }
            }

            events.push(Event::StartupSourcesUpdated);
            summary
        })
    }

    fn with_inner<T>(
        &self,
        f: impl FnOnce(&mut ServiceInner, &mut Vec<Event>) -> Result<T>,
    ) -> Result<T> {
        let mut events = Vec::new();
        let result = {
            let mut inner = self.inner.lock().unwrap();
            f(&mut inner, &mut events)
        };
        // Queued events describe sub-mutations that did complete, so they
        // are delivered even when the overall operation failed.
        for event in events {
            self.notifier.notify(event);
        }
        result
    }

    fn with_inner_infallible<T>(
        &self,
        f: impl FnOnce(&mut ServiceInner, &mut Vec<Event>) -> T,
    ) -> T {
        let mut events = Vec::new();
        let result = {
            let mut inner = self.inner.lock().unwrap();
            f(&mut inner, &mut events)
        };
        for event in events {
            self.notifier.notify(event);
        }
        result
    }
}

/// How the final write encodes its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteEncoding {
    Utf8,
    Ansi,
}

/// Description and tags recorded on the automatic snapshot a write takes.
#[derive(Debug, Clone, Copy)]
struct SnapshotLabel {
    description: &'static str,
    tags: &'static [&'static str],
}

const SNAPSHOT_WRITE: SnapshotLabel = SnapshotLabel {
    description: "Automatic snapshot before write",
    tags: &[],
};
const SNAPSHOT_APPLY: SnapshotLabel = SnapshotLabel {
    description: "Automatic snapshot before apply",
    tags: &[],
};
const SNAPSHOT_RESTORE: SnapshotLabel = SnapshotLabel {
    description: "Automatic snapshot before restore",
    tags: &["restore"],
};

/// Snapshot, validate, write. Every path that replaces the hosts file
/// except the activation-aware [`HostsService::apply_config`] goes
/// through here.
fn orchestrated_write(
    inner: &mut ServiceInner,
    events: &mut Vec<Event>,
    content: &str,
    encoding: WriteEncoding,
    label: SnapshotLabel,
) -> Result<()> {
    let current = inner.gateway.read()?;
    snapshot_before_write(inner, events, &current, label);

    debug!(phase = %ApplyPhase::Validating, "validating hosts content");
    validate_hosts_content(content)?;

    debug!(phase = %ApplyPhase::Writing, ?encoding, "writing hosts content");
    match encoding {
        WriteEncoding::Utf8 => inner.gateway.write(content)?,
        WriteEncoding::Ansi => inner.gateway.write_ansi(content)?,
    }

    events.push(Event::SystemHostsUpdated);
    Ok(())
}

/// Best-effort automatic snapshot of `current`. Backup failure is logged,
/// never fatal: backups are a safety net, not a precondition.
fn snapshot_before_write(
    inner: &mut ServiceInner,
    events: &mut Vec<Event>,
    current: &str,
    label: SnapshotLabel,
) {
    debug!(phase = %ApplyPhase::Snapshotting, "snapshotting current hosts content");
    let tags = label.tags.iter().map(ToString::to_string).collect();
    match inner.backups.create(current, label.description, true, tags) {
        Ok(Some(backup)) => events.push(Event::BackupCreated { id: backup.id }),
        Ok(None) => debug!("identical automatic backup exists, snapshot skipped"),
        Err(error) => warn!(%error, "automatic backup failed, continuing without it"),
    }
}

/// Fetch with status bookkeeping, shared by every fetch-initiating path.
fn fetch_remote_inner(
    inner: &mut ServiceInner,
    events: &mut Vec<Event>,
    id: &str,
) -> Result<String> {
    let source = inner.remotes.get(id)?.clone();
    info!(name = %source.name, url = %source.url, "fetching remote source");

    set_status_best_effort(inner, id, SourceStatus::Pending);
    events.push(Event::RemoteSourceStatusChanged { id: id.to_string() });

    match inner.fetcher.fetch_url(&source.url) {
        Ok(body) => {
            inner.remotes.record_success(id, &body)?;
            events.push(Event::RemoteSourceStatusChanged { id: id.to_string() });
            Ok(body)
        }
        Err(error) => {
            mark_failed(inner, events, id);
            Err(error)
        }
    }
}

/// Merge an already-fetched body into the live hosts file through the
/// orchestrated write sequence.
fn apply_remote_body(
    inner: &mut ServiceInner,
    events: &mut Vec<Event>,
    name: &str,
    body: &str,
) -> Result<()> {
    let current = inner.gateway.read()?;
    let merged = hosts_remote::merge(&current, body, name);
    orchestrated_write(inner, events, &merged, WriteEncoding::Utf8, SNAPSHOT_WRITE)?;
    events.push(Event::RemoteAppliedToSystem {
        name: name.to_string(),
    });
    Ok(())
}

fn mark_failed(inner: &mut ServiceInner, events: &mut Vec<Event>, id: &str) {
    set_status_best_effort(inner, id, SourceStatus::Failed);
    events.push(Event::RemoteSourceStatusChanged { id: id.to_string() });
}

/// Status transitions around a fetch must not abort the fetch itself when
/// the document cannot be persisted.
fn set_status_best_effort(inner: &mut ServiceInner, id: &str, status: SourceStatus) {
    if let Err(error) = inner.remotes.set_status(id, status) {
        warn!(id, ?status, %error, "could not persist source status");
    }
}
