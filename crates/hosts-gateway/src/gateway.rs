//! Raw hosts-file I/O with atomic replacement.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use hosts_model::{HostsError, Result};

use crate::path::system_hosts_path;
use crate::validate::validate_hosts_content;

/// Minimal default document written when the hosts file is missing.
///
/// The stock header shipped on Windows, followed by the two loopback
/// entries every platform expects.
pub const DEFAULT_HOSTS_CONTENT: &str = "\
# Copyright (c) 1993-2009 Microsoft Corp.
#
# This is a sample HOSTS file used by Microsoft TCP/IP for Windows.
#
# This file contains the mappings of IP addresses to host names. Each
# entry should be kept on an individual line. The IP address should
# be placed in the first column followed by the corresponding host name.
# The IP address and the host name should be separated by at least one
# space.
#
# Additionally, comments (such as these) may be inserted on individual
# lines or following the machine name denoted by a '#' symbol.
#
# For example:
#
#      102.54.94.97     rhino.acme.com          # source server
#       38.25.63.10     x.acme.com              # x client host

# localhost name resolution is handled within DNS itself.

127.0.0.1       localhost
::1             localhost
";

/// Sole owner of hosts-file path resolution and raw I/O.
///
/// Writes go through a temp file plus rename so a crash mid-write never
/// leaves a truncated hosts file. There is no locking against other
/// processes editing the same file.
#[derive(Debug, Clone)]
pub struct HostsFileGateway {
    path: PathBuf,
}

impl HostsFileGateway {
    /// Gateway for the platform's system hosts file.
    #[must_use]
    pub fn system() -> Self {
        Self::new(system_hosts_path())
    }

    /// Gateway for an explicit path. Used by tests and by deployments that
    /// manage a non-standard location.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The resolved hosts file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full contents as text.
    ///
    /// A missing file is materialized with [`DEFAULT_HOSTS_CONTENT`] first;
    /// the read only fails if the file is unreadable after that attempt.
    pub fn read(&self) -> Result<String> {
        if !self.path.exists() {
            tracing::warn!(path = %self.path.display(), "hosts file missing, creating default");
            self.materialize_default()?;
        }
        fs::read_to_string(&self.path).map_err(|e| HostsError::Io {
            operation: "read",
            path: self.path.clone(),
            source: e,
        })
    }

    /// Overwrite the hosts file with `content`.
    ///
    /// Unconditional: no validation and no merge. Callers that need the
    /// validate-before-write contract go through the orchestrator.
    pub fn write(&self, content: &str) -> Result<()> {
        self.write_bytes(content.as_bytes())
    }

    /// Overwrite the hosts file using the legacy ANSI (GBK) codepage.
    ///
    /// Validates first, then re-encodes; if the transcoding is lossy the
    /// original UTF-8 bytes are written instead.
    pub fn write_ansi(&self, content: &str) -> Result<()> {
        validate_hosts_content(content)?;
        let (encoded, _, had_errors) = encoding_rs::GBK.encode(content);
        if had_errors {
            tracing::warn!(
                path = %self.path.display(),
                "content not representable in GBK, writing raw UTF-8"
            );
            return self.write_bytes(content.as_bytes());
        }
        self.write_bytes(&encoded)
    }

    /// Create the hosts file with the default document, including any
    /// missing parent directories.
    pub fn materialize_default(&self) -> Result<()> {
        self.write_bytes(DEFAULT_HOSTS_CONTENT.as_bytes())
    }

    fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| HostsError::Io {
                operation: "create directory",
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = File::create(&temp_path).map_err(|e| HostsError::Io {
            operation: "create",
            path: temp_path.clone(),
            source: e,
        })?;
        file.write_all(bytes).map_err(|e| HostsError::Io {
            operation: "write",
            path: temp_path.clone(),
            source: e,
        })?;
        file.sync_all().map_err(|e| HostsError::Io {
            operation: "sync",
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| HostsError::AtomicReplace {
            temp_path: temp_path.clone(),
            target_path: self.path.clone(),
            source: e,
        })?;

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "wrote hosts file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn read_materializes_default_when_missing() {
        let dir = tempdir().unwrap();
        let gateway = HostsFileGateway::new(dir.path().join("etc").join("hosts"));

        let content = gateway.read().unwrap();

        assert!(gateway.path().exists());
        assert!(content.contains("127.0.0.1       localhost"));
        assert!(content.contains("::1             localhost"));
    }

    #[test]
    fn write_then_read_roundtrips() {
        let dir = tempdir().unwrap();
        let gateway = HostsFileGateway::new(dir.path().join("hosts"));

        gateway.write("10.0.0.1 internal\n").unwrap();

        assert_eq!(gateway.read().unwrap(), "10.0.0.1 internal\n");
    }

    #[test]
    fn write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let gateway = HostsFileGateway::new(dir.path().join("hosts"));

        gateway.write("10.0.0.1 internal\n").unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("hosts")]);
    }

    #[test]
    fn write_ansi_keeps_ascii_content_byte_identical() {
        let dir = tempdir().unwrap();
        let gateway = HostsFileGateway::new(dir.path().join("hosts"));

        gateway.write_ansi("127.0.0.1 localhost\n").unwrap();

        let bytes = fs::read(gateway.path()).unwrap();
        assert_eq!(bytes, b"127.0.0.1 localhost\n");
    }

    #[test]
    fn write_ansi_rejects_invalid_content() {
        let dir = tempdir().unwrap();
        let gateway = HostsFileGateway::new(dir.path().join("hosts"));

        let error = gateway.write_ansi("badline\n").unwrap_err();
        assert_eq!(error.kind(), hosts_model::ErrorKind::Validation);
        assert!(!gateway.path().exists());
    }

    #[test]
    fn write_ansi_encodes_cjk_comments() {
        let dir = tempdir().unwrap();
        let gateway = HostsFileGateway::new(dir.path().join("hosts"));

        gateway.write_ansi("# 本地回环\n127.0.0.1 localhost\n").unwrap();

        let bytes = fs::read(gateway.path()).unwrap();
        // GBK output is not valid UTF-8 for the comment characters.
        assert!(String::from_utf8(bytes).is_err());
    }

    #[test]
    fn write_ansi_falls_back_to_utf8_for_unencodable_content() {
        let dir = tempdir().unwrap();
        let gateway = HostsFileGateway::new(dir.path().join("hosts"));

        // U+1F600 has no GBK mapping, so the input bytes land unchanged.
        let content = "# blocklist \u{1F600}\n127.0.0.1 localhost\n";
        gateway.write_ansi(content).unwrap();

        let bytes = fs::read(gateway.path()).unwrap();
        assert_eq!(bytes, content.as_bytes());
    }

    #[test]
    fn overwrite_replaces_previous_content() {
        let dir = tempdir().unwrap();
        let gateway = HostsFileGateway::new(dir.path().join("hosts"));

        gateway.write("1.1.1.1 a.com\n").unwrap();
        gateway.write("2.2.2.2 b.com\n").unwrap();

        assert_eq!(gateway.read().unwrap(), "2.2.2.2 b.com\n");
    }
}
