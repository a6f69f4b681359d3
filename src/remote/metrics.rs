//! Metrics collection for remote store operations.
//!
//! [`MeteredStore`] wraps any [`RemoteStore`] and records each call in a
//! shared [`RemoteMetrics`] collector: request counts per kind, bytes
//! downloaded and time spent waiting on the remote.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use super::{Entry, ListFolderPage, RemoteError, RemoteStore};

/// Category of a remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Metadata,
    List,
    ListContinue,
    Download,
}

/// Metrics for a single remote request
#[derive(Debug, Clone)]
pub struct RequestMetric {
    pub kind: RequestKind,
    /// Path or cursor the request was issued for
    pub target: String,
    /// Number of payload bytes received (downloads only)
    pub bytes: u64,
    pub duration: Duration,
    pub succeeded: bool,
}

/// Thread-safe collector for remote call metrics
#[derive(Debug, Default)]
pub struct RemoteMetrics {
    total_bytes: AtomicU64,
    request_count: AtomicUsize,
    /// Total time spent in requests (nanoseconds)
    total_request_time_ns: AtomicU64,
    requests: RwLock<Vec<RequestMetric>>,
}

impl RemoteMetrics {
    /// Create a new metrics collector wrapped in Arc for sharing
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record a completed request
    pub fn record(&self, metric: RequestMetric) {
        self.total_bytes.fetch_add(metric.bytes, Ordering::Relaxed);
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.total_request_time_ns
            .fetch_add(metric.duration.as_nanos() as u64, Ordering::Relaxed);

        if let Ok(mut requests) = self.requests.write() {
            requests.push(metric);
        }
    }

    /// Get total bytes downloaded
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes.load(Ordering::Relaxed)
    }

    /// Get request count across all kinds
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Get the number of requests of one kind
    pub fn count(&self, kind: RequestKind) -> usize {
        self.requests
            .read()
            .map(|r| r.iter().filter(|m| m.kind == kind).count())
            .unwrap_or(0)
    }

    /// Get total request time
    pub fn total_request_time(&self) -> Duration {
        Duration::from_nanos(self.total_request_time_ns.load(Ordering::Relaxed))
    }

    /// Get all individual request metrics
    pub fn requests(&self) -> Vec<RequestMetric> {
        self.requests.read().map(|r| r.clone()).unwrap_or_default()
    }

    /// Reset all metrics
    pub fn reset(&self) {
        self.total_bytes.store(0, Ordering::Relaxed);
        self.request_count.store(0, Ordering::Relaxed);
        self.total_request_time_ns.store(0, Ordering::Relaxed);
        if let Ok(mut requests) = self.requests.write() {
            requests.clear();
        }
    }
}

/// A [`RemoteStore`] decorator that records every call
pub struct MeteredStore {
    inner: Arc<dyn RemoteStore>,
    metrics: Arc<RemoteMetrics>,
}

impl MeteredStore {
    pub fn new(inner: Arc<dyn RemoteStore>, metrics: Arc<RemoteMetrics>) -> Self {
        MeteredStore { inner, metrics }
    }

    pub fn metrics(&self) -> &Arc<RemoteMetrics> {
        &self.metrics
    }

    fn finish<T>(
        &self,
        kind: RequestKind,
        target: &str,
        started: Instant,
        result: &Result<T, RemoteError>,
        bytes: u64,
    ) {
        self.metrics.record(RequestMetric {
            kind,
            target: target.to_string(),
            bytes,
            duration: started.elapsed(),
            succeeded: result.is_ok(),
        });
    }
}

#[async_trait]
impl RemoteStore for MeteredStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn get_metadata(&self, path: &str) -> Result<Option<Entry>, RemoteError> {
        let started = Instant::now();
        let result = self.inner.get_metadata(path).await;
        self.finish(RequestKind::Metadata, path, started, &result, 0);
        result
    }

    async fn list_folder(&self, path: &str) -> Result<ListFolderPage, RemoteError> {
        let started = Instant::now();
        let result = self.inner.list_folder(path).await;
        self.finish(RequestKind::List, path, started, &result, 0);
        result
    }

    async fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderPage, RemoteError> {
        let started = Instant::now();
        let result = self.inner.list_folder_continue(cursor).await;
        self.finish(RequestKind::ListContinue, cursor, started, &result, 0);
        result
    }

    async fn download(&self, path: &str) -> Result<Bytes, RemoteError> {
        let started = Instant::now();
        let result = self.inner.download(path).await;
        let bytes = result.as_ref().map(|b| b.len() as u64).unwrap_or(0);
        self.finish(RequestKind::Download, path, started, &result, bytes);
        result
    }
}
