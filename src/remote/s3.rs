use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Entry, ListFolderPage, RemoteError, RemoteStore};

/// S3 bucket presented as a folder tree.
///
/// Keys are split on `/`: common prefixes become folders and objects become
/// files. Remote paths are `/`-prefixed keys, so `/photos/a.jpg` is the key
/// `photos/a.jpg`.
pub struct S3Store {
    client: Client,
    bucket: String,
}

/// Continuation cursor; S3 tokens are only valid together with the prefix
#[derive(Debug, Serialize, Deserialize)]
struct Cursor {
    prefix: String,
    token: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        S3Store {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn key_of(path: &str) -> &str {
        path.trim_matches('/')
    }

    fn prefix_of(path: &str) -> String {
        let key = Self::key_of(path);
        if key.is_empty() {
            String::new()
        } else {
            format!("{key}/")
        }
    }

    fn s3_error(operation: &str, err: impl std::error::Error) -> RemoteError {
        RemoteError::S3 {
            operation: operation.to_string(),
            message: DisplayErrorContext(err).to_string(),
        }
    }

    /// List one page of objects and common prefixes under `prefix`
    async fn list_page(
        &self,
        prefix: &str,
        token: Option<String>,
    ) -> Result<ListFolderPage, RemoteError> {
        let mut req = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .delimiter("/");

        if !prefix.is_empty() {
            req = req.prefix(prefix);
        }

        if let Some(token) = token {
            req = req.continuation_token(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| Self::s3_error("ListObjectsV2", e))?;

        let folders = resp
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix())
            .map(|p| {
                let name = p.trim_end_matches('/').rsplit('/').next().unwrap_or(p);
                Entry::folder(name, format!("/{}", p.trim_end_matches('/')))
            });

        let files = resp
            .contents()
            .iter()
            .filter_map(|obj| obj.key())
            // directory marker objects share the prefix itself
            .filter(|key| *key != prefix)
            .map(|key| {
                let name = key.rsplit('/').next().unwrap_or(key);
                Entry::file(name, format!("/{key}"))
            });

        let entries = folders.chain(files).collect();

        let next = resp.next_continuation_token().map(String::from);
        let has_more = resp.is_truncated().unwrap_or(false) && next.is_some();
        let cursor = match next {
            Some(token) => serde_json::to_string(&Cursor {
                prefix: prefix.to_string(),
                token,
            })?,
            None => String::new(),
        };

        Ok(ListFolderPage {
            entries,
            cursor,
            has_more,
        })
    }
}

#[async_trait]
impl RemoteStore for S3Store {
    fn name(&self) -> &str {
        "s3"
    }

    async fn get_metadata(&self, path: &str) -> Result<Option<Entry>, RemoteError> {
        let key = Self::key_of(path);
        if key.is_empty() {
            return Ok(Some(Entry::folder(self.bucket.clone(), "/")));
        }
        let name = key.rsplit('/').next().unwrap_or(key);

        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => return Ok(Some(Entry::file(name, format!("/{key}")))),
            Err(e) => {
                let missing = e.as_service_error().is_some_and(|se| se.is_not_found());
                if !missing {
                    return Err(Self::s3_error("HeadObject", e));
                }
            }
        }

        // No object under the exact key; it is a folder if anything lives below it
        let resp = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(Self::prefix_of(path))
            .max_keys(1)
            .send()
            .await
            .map_err(|e| Self::s3_error("ListObjectsV2", e))?;

        if resp.key_count().unwrap_or(0) > 0 {
            Ok(Some(Entry::folder(name, format!("/{key}"))))
        } else {
            Ok(None)
        }
    }

    async fn list_folder(&self, path: &str) -> Result<ListFolderPage, RemoteError> {
        debug!(bucket = %self.bucket, path, "s3 list_folder");
        self.list_page(&Self::prefix_of(path), None).await
    }

    async fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderPage, RemoteError> {
        let cursor: Cursor = serde_json::from_str(cursor)?;
        self.list_page(&cursor.prefix, Some(cursor.token)).await
    }

    async fn download(&self, path: &str) -> Result<Bytes, RemoteError> {
        let key = Self::key_of(path);
        debug!(bucket = %self.bucket, key, "s3 download");

        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    RemoteError::NotFound {
                        path: path.to_string(),
                    }
                } else {
                    Self::s3_error("GetObject", e)
                }
            })?;

        let bytes = resp
            .body
            .collect()
            .await
            .map_err(|e| Self::s3_error("GetObject body", e))?
            .into_bytes();

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_of() {
        assert_eq!(S3Store::prefix_of("/"), "");
        assert_eq!(S3Store::prefix_of(""), "");
        assert_eq!(S3Store::prefix_of("/photos"), "photos/");
        assert_eq!(S3Store::prefix_of("/photos/2024/"), "photos/2024/");
    }

    #[test]
    fn test_cursor_carries_prefix() {
        let encoded = serde_json::to_string(&Cursor {
            prefix: "photos/".to_string(),
            token: "abc".to_string(),
        })
        .unwrap();
        let decoded: Cursor = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.prefix, "photos/");
        assert_eq!(decoded.token, "abc");
    }
}
