//! Platform resolution of the system hosts file location.

use std::path::PathBuf;

/// Fixed location on POSIX systems.
pub const POSIX_HOSTS_PATH: &str = "/etc/hosts";

/// Resolve the system hosts file path for the current platform.
#[must_use]
pub fn system_hosts_path() -> PathBuf {
    #[cfg(windows)]
    {
        windows_hosts_path(|name| std::env::var(name).ok())
    }
    #[cfg(not(windows))]
    {
        PathBuf::from(POSIX_HOSTS_PATH)
    }
}

/// Resolve the Windows hosts path from an environment lookup.
///
/// The system root comes from `SystemRoot`, then `WINDIR`, then the
/// hard-coded `C:\Windows`. Split out from [`system_hosts_path`] so the
/// fallback chain is testable on every platform.
#[must_use]
pub fn windows_hosts_path(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    let root = lookup("SystemRoot")
        .or_else(|| lookup("WINDIR"))
        .unwrap_or_else(|| r"C:\Windows".to_string());
    let mut path = PathBuf::from(root);
    path.push("System32");
    path.push("drivers");
    path.push("etc");
    path.push("hosts");
    path
}
