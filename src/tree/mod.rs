//! Remote node descriptors and the snapshot that indexes them.
//!
//! A descriptor is deliberately untyped: a small ordered map of attribute
//! name to [`Attribute`]. The projection layer turns attributes into typed
//! properties only when a node is materialized.

pub mod builder;
pub mod path;

pub use builder::{SnapshotBuilder, TreeSnapshot};
pub use path::NodePath;

use bytes::Bytes;
use futures::FutureExt;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::remote::{RemoteError, RemoteStore};

pub const JCR_PRIMARY_TYPE: &str = "jcr:primaryType";
pub const JCR_NAME: &str = "jcr:name";
pub const JCR_CONTENT: &str = "jcr:content";
pub const JCR_DATA: &str = "jcr:data";
pub const JCR_PATH: &str = "jcr:path";

pub const NT_FILE: &str = "nt:file";
pub const NT_RESOURCE: &str = "nt:resource";
pub const NT_FOLDER: &str = "nt:folder";
pub const SLING_FOLDER: &str = "sling:Folder";

/// What a descriptor stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Folder,
    File,
    /// The synthetic `jcr:content` child carrying a file's payload
    Resource,
}

impl NodeKind {
    pub fn primary_type(self) -> &'static str {
        match self {
            NodeKind::Folder => SLING_FOLDER,
            NodeKind::File => NT_FILE,
            NodeKind::Resource => NT_RESOURCE,
        }
    }
}

type LoadFuture = BoxFuture<'static, Result<Bytes, RemoteError>>;

/// A not-yet-fetched payload.
///
/// Cloning shares the loader; every call to [`DeferredBinary::fetch`] issues
/// a new request. Memoization is the job of the value that owns it.
#[derive(Clone)]
pub struct DeferredBinary {
    source: String,
    loader: Arc<dyn Fn() -> LoadFuture + Send + Sync>,
}

impl DeferredBinary {
    pub fn new<F, Fut>(source: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Bytes, RemoteError>> + Send + 'static,
    {
        DeferredBinary {
            source: source.into(),
            loader: Arc::new(move || loader().boxed()),
        }
    }

    /// Download `path` from `store` when fetched
    pub fn from_store(store: Arc<dyn RemoteStore>, path: impl Into<String>) -> Self {
        let path = path.into();
        let source = path.clone();
        Self::new(source, move || {
            let store = Arc::clone(&store);
            let path = path.clone();
            async move { store.download(&path).await }
        })
    }

    /// Remote path the payload is fetched from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub async fn fetch(&self) -> Result<Bytes, RemoteError> {
        (self.loader)().await
    }
}

impl fmt::Debug for DeferredBinary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredBinary")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// A descriptor attribute value
#[derive(Debug, Clone)]
pub enum Attribute {
    String(String),
    Binary(DeferredBinary),
}

impl Attribute {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attribute::String(s) => Some(s),
            Attribute::Binary(_) => None,
        }
    }
}

/// Cached descriptor of one remote entry
#[derive(Debug, Clone)]
pub struct RemoteNode {
    kind: NodeKind,
    name: String,
    attributes: IndexMap<String, Attribute>,
}

impl RemoteNode {
    fn with_kind(kind: NodeKind, name: String) -> Self {
        let mut attributes = IndexMap::new();
        attributes.insert(
            JCR_PRIMARY_TYPE.to_string(),
            Attribute::String(kind.primary_type().to_string()),
        );
        attributes.insert(JCR_NAME.to_string(), Attribute::String(name.clone()));
        RemoteNode {
            kind,
            name,
            attributes,
        }
    }

    pub fn folder(name: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Folder, name.into())
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::File, name.into())
    }

    /// The `jcr:content` child of a file, holding its deferred payload
    pub fn content(data: DeferredBinary) -> Self {
        let mut node = Self::with_kind(NodeKind::Resource, JCR_CONTENT.to_string());
        node.attributes
            .insert(JCR_DATA.to_string(), Attribute::Binary(data));
        node
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_type(&self) -> &str {
        self.kind.primary_type()
    }

    pub fn attributes(&self) -> &IndexMap<String, Attribute> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.attributes.get(key)
    }
}
