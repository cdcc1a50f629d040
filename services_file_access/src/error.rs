//! Error taxonomy for file access
//!
//! Hosts report failures as [`HostError`]. Everything above the host boundary
//! works with [`FileAccessError`], whose `Display` is the status line shown to
//! the user: `<ErrorKind> - <detail>`.

use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generation::EntryPoint;

/// Failure reported by a host capability call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The user dismissed a picker
    #[error("the dialog was dismissed")]
    Dismissed,

    /// The host refused a read or write grant
    #[error("{0}")]
    NotAllowed(String),

    /// The file addressed by a handle no longer exists
    #[error("file not found: {0}")]
    NotFound(String),

    /// Any other read, write or stream fault
    #[error("{0}")]
    Io(String),

    /// The host does not expose the entry point a call needs
    #[error("entry point {} is not available", .0.host_name())]
    EntryPointMissing(EntryPoint),
}

/// Error category surfaced to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Unsupported,
    UserCancelled,
    PermissionDenied,
    IoError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unsupported => "Unsupported",
            ErrorKind::UserCancelled => "UserCancelled",
            ErrorKind::PermissionDenied => "PermissionDenied",
            ErrorKind::IoError => "IOError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File access error
///
/// The rendered form is the status line handed to the status reporter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FileAccessError {
    #[error("Unsupported - {0}")]
    Unsupported(String),

    #[error("UserCancelled - {0}")]
    UserCancelled(String),

    #[error("PermissionDenied - {0}")]
    PermissionDenied(String),

    #[error("IOError - {0}")]
    Io(String),
}

impl FileAccessError {
    /// Returns the error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            FileAccessError::Unsupported(_) => ErrorKind::Unsupported,
            FileAccessError::UserCancelled(_) => ErrorKind::UserCancelled,
            FileAccessError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            FileAccessError::Io(_) => ErrorKind::IoError,
        }
    }

    /// Returns the human-readable detail without the kind prefix
    pub fn detail(&self) -> &str {
        match self {
            FileAccessError::Unsupported(detail)
            | FileAccessError::UserCancelled(detail)
            | FileAccessError::PermissionDenied(detail)
            | FileAccessError::Io(detail) => detail,
        }
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, FileAccessError::UserCancelled(_))
    }
}

impl From<HostError> for FileAccessError {
    fn from(error: HostError) -> Self {
        match error {
            HostError::Dismissed => FileAccessError::UserCancelled(error.to_string()),
            HostError::NotAllowed(detail) => FileAccessError::PermissionDenied(detail),
            HostError::NotFound(_) | HostError::Io(_) => FileAccessError::Io(error.to_string()),
            HostError::EntryPointMissing(_) => FileAccessError::Unsupported(error.to_string()),
        }
    }
}
