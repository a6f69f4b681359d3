//! Error type for mount activation and navigation.
//!
//! The read-only contract is observable through fixed variants: structural
//! and property mutations are [`MountError::ConstraintViolation`], node
//! removal is [`MountError::AccessDenied`], and versioning, locking and
//! workspace operations are [`MountError::Unsupported`].

use thiserror::Error;

use crate::remote::RemoteError;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, MountError>;

#[derive(Error, Debug)]
pub enum MountError {
    /// Enumerating the remote tree failed; no snapshot was published
    #[error("Failed to build tree from {path}: {source}")]
    Build {
        path: String,
        #[source]
        source: RemoteError,
    },

    /// No node or property exists at the path
    #[error("Path not found: {path}")]
    NotFound { path: String },

    /// A named item (primary item, row column) does not exist
    #[error("Item not found: {name}")]
    ItemNotFound { name: String },

    #[error("Constraint violation: {operation} is not allowed on {path}")]
    ConstraintViolation { operation: &'static str, path: String },

    #[error("Access denied: {operation} on {path}")]
    AccessDenied { operation: &'static str, path: String },

    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: &'static str },

    /// Downloading a deferred binary failed; the next access retries
    #[error("Failed to fetch content for {path}: {source}")]
    ContentFetch {
        path: String,
        #[source]
        source: RemoteError,
    },

    #[error("Cannot convert {found} value to {expected}")]
    ValueFormat {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MountError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::ItemNotFound { .. })
    }

    #[must_use]
    pub const fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }

    #[must_use]
    pub const fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }

    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    #[must_use]
    pub const fn is_build_failure(&self) -> bool {
        matches!(self, Self::Build { .. })
    }

    #[must_use]
    pub const fn is_content_fetch(&self) -> bool {
        matches!(self, Self::ContentFetch { .. })
    }

    #[must_use]
    pub const fn is_value_format(&self) -> bool {
        matches!(self, Self::ValueFormat { .. })
    }

    pub(crate) fn constraint(operation: &'static str, path: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            operation,
            path: path.into(),
        }
    }

    pub(crate) fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported { operation }
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }
}
