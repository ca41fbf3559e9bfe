//! Errors of the contact store
//!
//! [`ContactError`]s are logical outcomes of a single operation (the contact is missing, or is
//! already there). They are reported to the user and never end the program.
//!
//! [`StorageError`]s mean the backing file could not be read or written. They are fatal for the
//! current session.

use {
    std::{io, path::PathBuf},
    thiserror::Error,
};

/// A store operation could not be applied to the named contact.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ContactError {
    #[error("{0} is not a contact.")]
    NotFound(String),
    #[error("{0} is already a contact.")]
    AlreadyExists(String),
}

/// The backing file could not be loaded or saved.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Permission denied: cannot access '{path}'")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{path}' does not contain a valid contact list")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write '{path}'")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create directory '{path}'")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to replace '{to}' with '{from}'")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Classifies a failed read of `path`.
    pub fn reading(source: io::Error, path: PathBuf) -> Self {
        match source.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied { path, source },
            _ => StorageError::Read { path, source },
        }
    }

    /// Classifies a failed write of `path`.
    pub fn writing(source: io::Error, path: PathBuf) -> Self {
        match source.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied { path, source },
            _ => StorageError::Write { path, source },
        }
    }

    pub fn path(&self) -> &PathBuf {
        match self {
            StorageError::PermissionDenied { path, .. }
            | StorageError::Read { path, .. }
            | StorageError::Parse { path, .. }
            | StorageError::Write { path, .. }
            | StorageError::CreateDirectory { path, .. } => path,
            StorageError::Rename { to, .. } => to,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
