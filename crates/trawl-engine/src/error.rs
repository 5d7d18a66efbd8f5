//! Error types for container handling.
//!
//! These never cross the public classification calls; the classifiers turn
//! them into diagnostics or synthetic results.

use std::any::Any;
use thiserror::Error;

/// Errors raised while opening, enumerating or extracting a container.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Neither the extension nor the header identify a supported format
    #[error("unrecognized container format: {path}")]
    Unsupported {
        /// Path of the file
        path: String,
    },

    /// Every file entry in the container is encrypted
    #[error("archive is encrypted: {path}")]
    Encrypted {
        /// Path of the archive
        path: String,
    },

    /// A single member is encrypted
    #[error("member {key} is encrypted")]
    MemberEncrypted {
        /// Member key
        key: String,
    },

    /// No member with this key on re-open
    #[error("member {key} not found")]
    MemberNotFound {
        /// Member key
        key: String,
    },

    /// Member exceeds the extraction ceiling
    #[error("member {key} exceeds the extraction limit of {limit} bytes")]
    TooLarge {
        /// Member key
        key: String,
        /// Configured limit
        limit: u64,
    },

    /// ZIP structure errors
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O errors (including TAR and gzip stream errors)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// Whether the error stems from encryption rather than corruption or I/O.
    #[must_use]
    pub fn is_encryption(&self) -> bool {
        matches!(self, Self::Encrypted { .. } | Self::MemberEncrypted { .. })
    }
}

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
