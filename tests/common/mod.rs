//! In-memory [`RemoteStore`] used by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cloudmount::remote::{Entry, EntryKind, ListFolderPage, RemoteError, RemoteStore};
use cloudmount::{Mount, MountConfig};

pub const MOUNT_POINT: &str = "/content/dropbox";
pub const REMOTE_ROOT: &str = "/adaptto";

/// A folder tree held in memory, listed in insertion order.
///
/// Paths are matched case-insensitively through their lowercase form, like
/// Dropbox does. Listings are split into pages of `page_size` entries.
#[derive(Default)]
pub struct MemoryStore {
    /// parent (lowercase) -> children in insertion order
    children: HashMap<String, Vec<Entry>>,
    /// lowercase path -> entry
    entries: HashMap<String, Entry>,
    files: HashMap<String, Bytes>,
    page_size: usize,
    failing_lists: HashSet<String>,
    failing_continues: HashSet<String>,
    failing_metadata: HashSet<String>,
    vanished_metadata: HashSet<String>,
    failing_downloads: AtomicUsize,

    pub metadata_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub continue_calls: AtomicUsize,
    pub downloads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            page_size: 100,
            ..Default::default()
        }
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn folder(mut self, path: &str) -> Self {
        self.insert(Entry::folder(name(path), path.to_lowercase()), path);
        self
    }

    pub fn file(mut self, path: &str, contents: &'static [u8]) -> Self {
        self.files
            .insert(path.to_lowercase(), Bytes::from_static(contents));
        self.insert(Entry::file(name(path), path.to_lowercase()), path);
        self
    }

    pub fn deleted(mut self, path: &str) -> Self {
        self.insert(Entry::deleted(name(path), path.to_lowercase()), path);
        self
    }

    /// Listing `path` (or continuing it) fails with a server error
    pub fn failing_list(mut self, path: &str) -> Self {
        self.failing_lists.insert(path.to_lowercase());
        self
    }

    /// Continuing a listing of `path` fails; the first page still succeeds
    pub fn failing_continue(mut self, path: &str) -> Self {
        self.failing_continues.insert(path.to_lowercase());
        self
    }

    /// Metadata lookups of `path` fail with a server error
    pub fn failing_metadata(mut self, path: &str) -> Self {
        self.failing_metadata.insert(path.to_lowercase());
        self
    }

    /// Metadata lookups of `path` fail with `RemoteError::NotFound` instead
    /// of returning `Ok(None)`
    pub fn vanished_metadata(mut self, path: &str) -> Self {
        self.vanished_metadata.insert(path.to_lowercase());
        self
    }

    /// The next `n` downloads fail
    pub fn failing_downloads(self, n: usize) -> Self {
        self.failing_downloads.store(n, Ordering::SeqCst);
        self
    }

    fn insert(&mut self, entry: Entry, path: &str) {
        let parent = parent(path).to_lowercase();
        self.children.entry(parent).or_default().push(entry.clone());
        self.entries.insert(path.to_lowercase(), entry);
    }

    fn page(&self, folder: &str, offset: usize) -> Result<ListFolderPage, RemoteError> {
        if self.failing_lists.contains(folder) {
            return Err(RemoteError::Api {
                endpoint: "files/list_folder".to_string(),
                status: 500,
                summary: "internal_error".to_string(),
            });
        }
        let all = self.children.get(folder).cloned().unwrap_or_default();
        let end = (offset + self.page_size).min(all.len());
        Ok(ListFolderPage {
            entries: all[offset.min(end)..end].to_vec(),
            cursor: format!("{folder}#{end}"),
            has_more: end < all.len(),
        })
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

fn name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(pos) => &path[..pos],
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_metadata(&self, path: &str) -> Result<Option<Entry>, RemoteError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        let key = path.to_lowercase();
        if self.failing_metadata.contains(&key) {
            return Err(RemoteError::Api {
                endpoint: "files/get_metadata".to_string(),
                status: 500,
                summary: "internal_error".to_string(),
            });
        }
        if self.vanished_metadata.contains(&key) {
            return Err(RemoteError::NotFound {
                path: path.to_string(),
            });
        }
        Ok(self.entries.get(&key).cloned())
    }

    async fn list_folder(&self, path: &str) -> Result<ListFolderPage, RemoteError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let folder = if path.is_empty() { "/" } else { path };
        self.page(&folder.to_lowercase(), 0)
    }

    async fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderPage, RemoteError> {
        self.continue_calls.fetch_add(1, Ordering::SeqCst);
        let (folder, offset) = cursor.rsplit_once('#').ok_or_else(|| RemoteError::Api {
            endpoint: "files/list_folder/continue".to_string(),
            status: 409,
            summary: "reset".to_string(),
        })?;
        if self.failing_continues.contains(folder) {
            return Err(RemoteError::Api {
                endpoint: "files/list_folder/continue".to_string(),
                status: 500,
                summary: "internal_error".to_string(),
            });
        }
        let offset = offset.parse().unwrap_or(0);
        self.page(folder, offset)
    }

    async fn download(&self, path: &str) -> Result<Bytes, RemoteError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let pending = self.failing_downloads.load(Ordering::SeqCst);
        if pending > 0 {
            self.failing_downloads.store(pending - 1, Ordering::SeqCst);
            return Err(RemoteError::Api {
                endpoint: "files/download".to_string(),
                status: 503,
                summary: "too_many_requests".to_string(),
            });
        }
        match self.entries.get(&path.to_lowercase()) {
            Some(entry) if entry.kind == EntryKind::File => {
                Ok(self.files.get(&path.to_lowercase()).cloned().unwrap_or_default())
            }
            _ => Err(RemoteError::NotFound {
                path: path.to_string(),
            }),
        }
    }
}

/// `/adaptto` holding `foo.txt` and `bar/` (with `bar/baz.md`)
pub fn sample_store() -> MemoryStore {
    MemoryStore::new()
        .folder("/adaptto")
        .file("/adaptto/foo.txt", b"hello from foo")
        .folder("/adaptto/bar")
        .file("/adaptto/bar/baz.md", b"# baz")
}

/// Mount `store` at [`MOUNT_POINT`] from [`REMOTE_ROOT`]
pub async fn mount(store: &Arc<MemoryStore>) -> Mount {
    mount_at(store, REMOTE_ROOT).await
}

pub async fn mount_at(store: &Arc<MemoryStore>, remote_path: &str) -> Mount {
    let config = MountConfig::new(MOUNT_POINT, remote_path);
    Mount::activate(config, Arc::clone(store) as Arc<dyn RemoteStore>)
        .await
        .expect("mount activation")
}
