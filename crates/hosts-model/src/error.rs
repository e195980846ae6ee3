//! Error taxonomy shared by every layer of the hosts manager.
//!
//! Nothing in this subsystem is process-fatal: operations surface one of
//! these errors and the caller decides what to show. Each error maps onto a
//! coarse [`ErrorKind`] and offers a user-facing message plus an optional
//! remediation hint.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`HostsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad hosts syntax, blank required field, bad source parameters.
    Validation,
    /// Unknown config, backup, or remote source id.
    NotFound,
    /// Operation refused to protect an invariant.
    Conflict,
    /// Disk, permission, or document-format failure.
    Io,
    /// HTTP transport failure or non-success status.
    Network,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::NotFound => "not found",
            Self::Conflict => "conflict",
            Self::Io => "io",
            Self::Network => "network",
        };
        f.write_str(name)
    }
}

/// Error raised by hosts-manager operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HostsError {
    /// A hosts line that is neither blank nor a comment has fewer than two
    /// whitespace-separated tokens. Line numbers are 1-based.
    #[error("invalid hosts content at line {line}: {reason}")]
    InvalidHostsLine { line: usize, reason: String },

    /// A required field was empty after trimming.
    #[error("{field} must not be blank")]
    BlankField { field: &'static str },

    /// Remote source parameters failed validation.
    #[error("invalid remote source: {reason}")]
    InvalidRemoteSource { reason: String },

    /// No record with the given id.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The active config cannot be deleted.
    #[error("config {id} is active and cannot be deleted")]
    DeleteActiveConfig { id: String },

    /// Automatic backups are not user-deletable.
    #[error("backup {id} was created automatically and cannot be deleted")]
    DeleteAutomaticBackup { id: String },

    /// File I/O failure.
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The temp file could not be renamed over the target.
    #[error("failed to replace {target_path}")]
    AtomicReplace {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted JSON document did not parse.
    #[error("invalid document {path}: {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    /// HTTP transport failure (connect, timeout, read).
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },
}

impl HostsError {
    /// Classify this error into the coarse taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidHostsLine { .. }
            | Self::BlankField { .. }
            | Self::InvalidRemoteSource { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DeleteActiveConfig { .. } | Self::DeleteAutomaticBackup { .. } => {
                ErrorKind::Conflict
            }
            Self::Io { .. } | Self::AtomicReplace { .. } | Self::InvalidDocument { .. } => {
                ErrorKind::Io
            }
            Self::Network { .. } | Self::HttpStatus { .. } => ErrorKind::Network,
        }
    }

    /// Get a user-friendly message for this error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidHostsLine { line, reason } => {
                format!("Line {line} of the hosts content is malformed: {reason}")
            }
            Self::BlankField { field } => {
                format!("The {field} cannot be empty.")
            }
            Self::InvalidRemoteSource { reason } => {
                format!("The remote source settings are invalid: {reason}")
            }
            Self::NotFound { entity, id } => {
                format!("No {entity} with id {id} exists.")
            }
            Self::DeleteActiveConfig { .. } => {
                "The active config cannot be deleted. Apply another config first.".to_string()
            }
            Self::DeleteAutomaticBackup { .. } => {
                "Automatic backups cannot be deleted individually.".to_string()
            }
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::AtomicReplace { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
            Self::InvalidDocument { path, reason } => {
                format!(
                    "The file at {} is not a valid document: {}",
                    path.display(),
                    reason
                )
            }
            Self::Network { url, .. } => {
                format!("Could not reach {url}.")
            }
            Self::HttpStatus { url, status } => {
                format!("The server at {url} answered with HTTP {status}.")
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    #[must_use]
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::InvalidHostsLine { .. } => Some(
                "Each entry needs an address followed by at least one hostname.".into(),
            ),
            Self::BlankField { .. } | Self::InvalidRemoteSource { .. } => None,
            Self::NotFound { .. } => Some("List the collection to see valid ids.".into()),
            Self::DeleteActiveConfig { .. } => {
                Some("Apply a different config, then delete this one.".into())
            }
            Self::DeleteAutomaticBackup { .. } => {
                Some("Use clear-auto to remove all automatic backups at once.".into())
            }
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some(
                        "Check that you have permission to write to this location. \
                         Writing the system hosts file usually needs elevation."
                            .into(),
                    )
                }
            }
            Self::AtomicReplace { .. } => {
                Some("Free up disk space or try saving to a different location.".into())
            }
            Self::InvalidDocument { .. } => {
                Some("Fix or remove the file; a missing file is recreated empty.".into())
            }
            Self::Network { .. } => {
                Some("Check the URL and your network connection, then retry.".into())
            }
            Self::HttpStatus { .. } => None,
        }
    }
}

/// Result type alias for hosts-manager operations.
pub type Result<T> = std::result::Result<T, HostsError>;
