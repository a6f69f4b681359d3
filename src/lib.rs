//! Read-only projection of a remote folder tree (Dropbox or an S3 bucket)
//! as a navigable node/property hierarchy.
//!
//! A [`Mount`] walks the remote store once into an immutable
//! [`TreeSnapshot`]; a [`Session`] then resolves nodes, properties and the
//! one supported listing query against it. File payloads are downloaded on
//! first read only.

pub mod config;
pub mod error;
pub mod projection;
pub mod providers;
pub mod remote;
pub mod shell;
pub mod tree;
pub mod ui;

pub use config::MountConfig;
pub use error::{MountError, Result};
pub use projection::{
    Item, Mount, NodeProvider, ProjectedNode, ProjectedProperty, PropertyType, QueryManager, Row,
    Session, Value,
};
pub use remote::{Entry, EntryKind, ListFolderPage, RemoteError, RemoteStore};
pub use tree::{RemoteNode, SnapshotBuilder, TreeSnapshot};
