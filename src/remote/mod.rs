//! Remote storage collaborators.
//!
//! A [`RemoteStore`] is the only thing the tree builder talks to. Backends
//! translate their native listing protocol into pages of [`Entry`] values
//! with a continuation cursor.

pub mod dropbox;
pub mod metrics;
pub mod s3;

pub use dropbox::DropboxStore;
pub use metrics::{MeteredStore, RemoteMetrics, RequestKind};
pub use s3::S3Store;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Kind of a remote listing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Folder,
    /// A tombstone reported by stores that list deleted entries
    Deleted,
}

/// One entry returned by a metadata lookup or folder listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub kind: EntryKind,
    /// Display name (last path segment, original case)
    pub name: String,
    /// Full remote path, lowercase-normalized by stores that are case-insensitive
    pub path_lower: String,
}

impl Entry {
    pub fn file(name: impl Into<String>, path_lower: impl Into<String>) -> Self {
        Entry {
            kind: EntryKind::File,
            name: name.into(),
            path_lower: path_lower.into(),
        }
    }

    pub fn folder(name: impl Into<String>, path_lower: impl Into<String>) -> Self {
        Entry {
            kind: EntryKind::Folder,
            name: name.into(),
            path_lower: path_lower.into(),
        }
    }

    pub fn deleted(name: impl Into<String>, path_lower: impl Into<String>) -> Self {
        Entry {
            kind: EntryKind::Deleted,
            name: name.into(),
            path_lower: path_lower.into(),
        }
    }
}

/// One page of a folder listing
#[derive(Debug, Clone, Default)]
pub struct ListFolderPage {
    pub entries: Vec<Entry>,
    /// Opaque continuation token for [`RemoteStore::list_folder_continue`]
    pub cursor: String,
    pub has_more: bool,
}

/// Errors raised by remote stores
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Remote path not found: {path}")]
    NotFound { path: String },

    #[error("{endpoint} failed with status {status}: {summary}")]
    Api {
        endpoint: String,
        status: u16,
        summary: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("S3 {operation} failed: {message}")]
    S3 { operation: String, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RemoteError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Client interface for a remote hierarchical store
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    /// Look up a single entry; `Ok(None)` when the path does not exist
    async fn get_metadata(&self, path: &str) -> Result<Option<Entry>, RemoteError>;

    /// Fetch the first page of a folder's direct children
    async fn list_folder(&self, path: &str) -> Result<ListFolderPage, RemoteError>;

    /// Fetch the page following `cursor`
    async fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderPage, RemoteError>;

    /// Download a file's full contents
    async fn download(&self, path: &str) -> Result<Bytes, RemoteError>;
}
