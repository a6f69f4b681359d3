use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::path::{concat, name_of};
use super::{DeferredBinary, JCR_CONTENT, RemoteNode};
use crate::error::{MountError, Result};
use crate::remote::{Entry, EntryKind, RemoteError, RemoteStore};

/// Immutable, path-indexed view of the remote tree.
///
/// `nodes` holds every descriptor keyed by its projected path; `children`
/// holds the ordered child list of each folder (and file) that has any.
/// Every key of `children` is also a key of `nodes`.
#[derive(Debug, Default)]
pub struct TreeSnapshot {
    nodes: HashMap<String, Arc<RemoteNode>>,
    children: HashMap<String, Vec<Arc<RemoteNode>>>,
}

impl TreeSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Descriptor at `path`
    pub fn get(&self, path: &str) -> Option<&Arc<RemoteNode>> {
        self.nodes.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    /// Children of `path` in remote enumeration order; empty when it has none
    pub fn children(&self, path: &str) -> &[Arc<RemoteNode>] {
        self.children.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All projected paths, in no particular order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Walks a [`RemoteStore`] once and produces a [`TreeSnapshot`].
///
/// Enumeration is sequential: one listing request at a time, depth first,
/// paging through each folder with its continuation cursor.
pub struct SnapshotBuilder {
    store: Arc<dyn RemoteStore>,
    nodes: HashMap<String, Arc<RemoteNode>>,
    children: HashMap<String, Vec<Arc<RemoteNode>>>,
}

impl SnapshotBuilder {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        SnapshotBuilder {
            store,
            nodes: HashMap::new(),
            children: HashMap::new(),
        }
    }

    /// Build the snapshot for `remote_path`, projected under `mount_point`.
    ///
    /// A missing `remote_path` yields an empty snapshot. Any other remote
    /// failure aborts the build.
    pub async fn build(mut self, mount_point: &str, remote_path: &str) -> Result<TreeSnapshot> {
        let started = Instant::now();

        let root = if is_store_root(remote_path) {
            Entry::folder(name_of(mount_point), "/")
        } else {
            match self.store.get_metadata(remote_path).await {
                Ok(Some(entry)) if entry.kind != EntryKind::Deleted => entry,
                Ok(_) | Err(RemoteError::NotFound { .. }) => {
                    warn!(
                        store = self.store.name(),
                        remote_path, "remote root not found, mounting an empty tree"
                    );
                    return Ok(TreeSnapshot::empty());
                }
                Err(source) => {
                    return Err(MountError::Build {
                        path: remote_path.to_string(),
                        source,
                    });
                }
            }
        };

        self.convert(mount_point.to_string(), remote_path.to_string(), root)
            .await?;

        info!(
            store = self.store.name(),
            mount_point,
            remote_path,
            nodes = self.nodes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "snapshot built"
        );

        Ok(TreeSnapshot {
            nodes: self.nodes,
            children: self.children,
        })
    }

    /// Convert one entry (and, for folders, everything below it).
    ///
    /// `root` is the projected path, `path` the remote path used in errors.
    fn convert(
        &mut self,
        root: String,
        path: String,
        entry: Entry,
    ) -> BoxFuture<'_, Result<Arc<RemoteNode>>> {
        async move {
            let node = match entry.kind {
                EntryKind::File => self.create_file(&root, &entry.path_lower),
                // deleted entries never reach conversion
                EntryKind::Folder | EntryKind::Deleted => {
                    let nodes = self.list_children(&root, &path, &entry).await?;
                    if !nodes.is_empty() {
                        self.children.insert(root.clone(), nodes);
                    }
                    Arc::new(RemoteNode::folder(name_of(&root)))
                }
            };

            self.nodes.insert(root, Arc::clone(&node));
            Ok(node)
        }
        .boxed()
    }

    /// Page through a folder listing, converting every live entry
    async fn list_children(
        &mut self,
        root: &str,
        path: &str,
        folder: &Entry,
    ) -> Result<Vec<Arc<RemoteNode>>> {
        let wrap = |source: RemoteError| MountError::Build {
            path: path.to_string(),
            source,
        };

        let mut nodes = Vec::new();
        let mut page = self
            .store
            .list_folder(&folder.path_lower)
            .await
            .map_err(wrap)?;
        let mut pages = 1usize;

        loop {
            for entry in page.entries {
                if entry.kind == EntryKind::Deleted {
                    continue;
                }
                let next_root = concat(root, &entry.name);
                let next_path = concat(path, &entry.name);
                nodes.push(self.convert(next_root, next_path, entry).await?);
            }

            if !page.has_more {
                break;
            }
            page = self
                .store
                .list_folder_continue(&page.cursor)
                .await
                .map_err(wrap)?;
            pages += 1;
        }

        debug!(path, pages, children = nodes.len(), "listed folder");
        Ok(nodes)
    }

    /// A file descriptor plus its `jcr:content` child
    fn create_file(&mut self, root: &str, path_lower: &str) -> Arc<RemoteNode> {
        let data = DeferredBinary::from_store(Arc::clone(&self.store), path_lower);
        let content = Arc::new(RemoteNode::content(data));

        self.nodes
            .insert(concat(root, JCR_CONTENT), Arc::clone(&content));
        self.children.insert(root.to_string(), vec![content]);

        Arc::new(RemoteNode::file(name_of(root)))
    }
}

fn is_store_root(path: &str) -> bool {
    path.trim_matches('/').is_empty()
}
