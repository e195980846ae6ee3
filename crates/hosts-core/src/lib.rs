//! Orchestration layer of the hosts manager.
//!
//! [`HostsService`] is the one entry point for every mutation: it owns the
//! hosts-file gateway, the three document stores, and the HTTP fetch client
//! behind a single mutex, runs the snapshot/validate/write sequence for
//! anything that touches the live hosts file, and delivers change events to
//! an injected [`hosts_model::Notifier`]. The [`refresh`] module holds the
//! one background task the process ever spawns.

pub mod refresh;
pub mod service;

pub use refresh::{RefreshHandle, STARTUP_REFRESH_DELAY, spawn_startup_refresh};
pub use service::{
    HostsService, LoggingNotifier, RefreshSummary, ServiceOptions, default_data_dir,
};
