use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::{MountError, Result};
use crate::tree::DeferredBinary;

/// Type tag of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    String,
    Binary,
}

impl PropertyType {
    pub fn name(self) -> &'static str {
        match self {
            PropertyType::String => "String",
            PropertyType::Binary => "Binary",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A binary payload fetched at most once.
///
/// Clones share the buffer, so every handle to the same value observes a
/// single download. A failed fetch leaves the slot empty and the next read
/// tries again.
#[derive(Clone)]
pub struct BinaryValue {
    source: Option<DeferredBinary>,
    buffer: Arc<OnceCell<Bytes>>,
}

impl BinaryValue {
    pub fn deferred(data: DeferredBinary) -> Self {
        BinaryValue {
            source: Some(data),
            buffer: Arc::new(OnceCell::new()),
        }
    }

    /// An already materialized payload
    pub fn from_bytes(bytes: Bytes) -> Self {
        BinaryValue {
            source: None,
            buffer: Arc::new(OnceCell::new_with(Some(bytes))),
        }
    }

    /// Remote path the payload comes from, if it is deferred
    pub fn source(&self) -> Option<&str> {
        self.source.as_ref().map(DeferredBinary::source)
    }

    pub fn is_loaded(&self) -> bool {
        self.buffer.initialized()
    }

    /// Length of the buffered payload, `None` before the first fetch
    pub fn buffered_len(&self) -> Option<usize> {
        self.buffer.get().map(Bytes::len)
    }

    /// The full payload, downloading it on first access
    pub async fn bytes(&self) -> Result<Bytes> {
        let bytes = self
            .buffer
            .get_or_try_init(|| async {
                let Some(data) = &self.source else {
                    return Ok(Bytes::new());
                };
                debug!(source = data.source(), "fetching deferred binary");
                data.fetch().await.map_err(|source| MountError::ContentFetch {
                    path: data.source().to_string(),
                    source,
                })
            })
            .await?;
        Ok(bytes.clone())
    }

    pub async fn size(&self) -> Result<u64> {
        Ok(self.bytes().await?.len() as u64)
    }
}

impl fmt::Debug for BinaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryValue")
            .field("source", &self.source())
            .field("buffered_len", &self.buffered_len())
            .finish()
    }
}

impl PartialEq for BinaryValue {
    fn eq(&self, other: &Self) -> bool {
        match (self.source(), other.source()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.buffer.get() == other.buffer.get(),
            _ => false,
        }
    }
}

/// A scalar property value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Binary(BinaryValue),
}

impl Value {
    pub fn property_type(&self) -> PropertyType {
        match self {
            Value::String(_) => PropertyType::String,
            Value::Binary(_) => PropertyType::Binary,
        }
    }

    pub fn string(&self) -> Result<String> {
        match self {
            Value::String(s) => Ok(s.clone()),
            Value::Binary(_) => Err(MountError::ValueFormat {
                expected: "String",
                found: "Binary",
            }),
        }
    }

    /// The value as bytes; binary values are fetched on first access
    pub async fn stream(&self) -> Result<Bytes> {
        match self {
            Value::String(s) => Ok(Bytes::from(s.clone())),
            Value::Binary(b) => b.bytes().await,
        }
    }

    pub fn binary(&self) -> BinaryValue {
        match self {
            Value::String(s) => BinaryValue::from_bytes(Bytes::from(s.clone())),
            Value::Binary(b) => b.clone(),
        }
    }

    /// Numeric view; a binary value reports its buffered size, or -1 before
    /// it has been fetched
    pub fn long(&self) -> Result<i64> {
        match self {
            Value::String(s) => s.trim().parse().map_err(|_| MountError::ValueFormat {
                expected: "Long",
                found: "String",
            }),
            Value::Binary(b) => Ok(b.buffered_len().map(|n| n as i64).unwrap_or(-1)),
        }
    }

    pub fn double(&self) -> Result<f64> {
        match self {
            Value::String(s) => s.trim().parse().map_err(|_| MountError::ValueFormat {
                expected: "Double",
                found: "String",
            }),
            Value::Binary(_) => Err(MountError::ValueFormat {
                expected: "Double",
                found: "Binary",
            }),
        }
    }

    pub fn boolean(&self) -> Result<bool> {
        match self {
            Value::String(s) => Ok(s.trim().eq_ignore_ascii_case("true")),
            Value::Binary(_) => Err(MountError::ValueFormat {
                expected: "Boolean",
                found: "Binary",
            }),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Binary(b) => match b.buffered_len() {
                Some(n) => write!(f, "<binary, {n} bytes>"),
                None => write!(f, "<binary>"),
            },
        }
    }
}
