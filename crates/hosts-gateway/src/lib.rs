//! System hosts file access.
//!
//! This crate is the sole owner of hosts-file path resolution and raw I/O:
//! platform path lookup with the Windows environment fallback chain, a
//! line-oriented validator, atomic (temp + rename) writes, materialization
//! of a default document when the file is missing, and the legacy ANSI/GBK
//! alternate write mode.
//!
//! No business logic lives here; profile bookkeeping, backups, and remote
//! merging sit above this crate and call through it.

pub mod gateway;
pub mod path;
pub mod validate;

pub use gateway::{DEFAULT_HOSTS_CONTENT, HostsFileGateway};
pub use path::{POSIX_HOSTS_PATH, system_hosts_path, windows_hosts_path};
pub use validate::validate_hosts_content;
