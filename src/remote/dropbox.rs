//! Dropbox v2 files API backend.
//!
//! All calls are RPC-style POSTs with a JSON body; downloads pass their
//! argument in the `Dropbox-API-Arg` header and return the raw payload.
//! Lookup failures come back as HTTP 409 with an `error_summary` such as
//! `path/not_found/..`.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{Entry, EntryKind, ListFolderPage, RemoteError, RemoteStore};

const API_URL: &str = "https://api.dropboxapi.com/2";
const CONTENT_URL: &str = "https://content.dropboxapi.com/2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    #[serde(rename = ".tag")]
    tag: String,
    name: String,
    #[serde(default)]
    path_lower: Option<String>,
}

impl MetadataResponse {
    fn into_entry(self) -> Entry {
        let kind = match self.tag.as_str() {
            "file" => EntryKind::File,
            "folder" => EntryKind::Folder,
            _ => EntryKind::Deleted,
        };
        let path_lower = self
            .path_lower
            .unwrap_or_else(|| format!("/{}", self.name.to_lowercase()));
        Entry {
            kind,
            name: self.name,
            path_lower,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListFolderResponse {
    entries: Vec<MetadataResponse>,
    cursor: String,
    has_more: bool,
}

impl From<ListFolderResponse> for ListFolderPage {
    fn from(resp: ListFolderResponse) -> Self {
        ListFolderPage {
            entries: resp
                .entries
                .into_iter()
                .map(MetadataResponse::into_entry)
                .collect(),
            cursor: resp.cursor,
            has_more: resp.has_more,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error_summary: String,
}

/// Dropbox store authenticated with a bearer access token
pub struct DropboxStore {
    client: reqwest::Client,
    auth: HeaderValue,
    api_url: String,
    content_url: String,
}

impl DropboxStore {
    /// Create a store against the public Dropbox endpoints
    pub fn new(access_token: &str) -> Result<Self, RemoteError> {
        Self::with_endpoints(access_token, API_URL, CONTENT_URL)
    }

    /// Create a store against custom endpoints (proxies, test servers)
    pub fn with_endpoints(
        access_token: &str,
        api_url: &str,
        content_url: &str,
    ) -> Result<Self, RemoteError> {
        let auth = HeaderValue::from_str(&format!("Bearer {access_token}")).map_err(|_| {
            RemoteError::Api {
                endpoint: "auth".to_string(),
                status: 0,
                summary: "access token contains invalid header characters".to_string(),
            }
        })?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("cloudmount/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(DropboxStore {
            client,
            auth,
            api_url: api_url.trim_end_matches('/').to_string(),
            content_url: content_url.trim_end_matches('/').to_string(),
        })
    }

    /// Dropbox addresses its root as the empty string
    fn api_path(path: &str) -> &str {
        if path == "/" { "" } else { path }
    }

    async fn rpc(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, RemoteError> {
        let resp = self
            .client
            .post(format!("{}/{}", self.api_url, endpoint))
            .header(AUTHORIZATION, self.auth.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        check_status(endpoint, resp).await
    }
}

/// Map non-success responses to [`RemoteError`], recognizing `*/not_found/*`
async fn check_status(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, RemoteError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    let summary = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.error_summary)
        .unwrap_or(text);

    if status.as_u16() == 409 && summary.contains("not_found") {
        return Err(RemoteError::NotFound { path: summary });
    }

    Err(RemoteError::Api {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        summary,
    })
}

#[async_trait]
impl RemoteStore for DropboxStore {
    fn name(&self) -> &str {
        "dropbox"
    }

    async fn get_metadata(&self, path: &str) -> Result<Option<Entry>, RemoteError> {
        let resp = match self
            .rpc("files/get_metadata", json!({ "path": Self::api_path(path) }))
            .await
        {
            Ok(resp) => resp,
            Err(RemoteError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let text = resp.text().await?;
        let metadata: MetadataResponse = serde_json::from_str(&text)?;
        Ok(Some(metadata.into_entry()))
    }

    async fn list_folder(&self, path: &str) -> Result<ListFolderPage, RemoteError> {
        debug!(path, "dropbox list_folder");
        let resp = self
            .rpc(
                "files/list_folder",
                json!({ "path": Self::api_path(path), "recursive": false }),
            )
            .await?;

        let text = resp.text().await?;
        let listing: ListFolderResponse = serde_json::from_str(&text)?;
        Ok(listing.into())
    }

    async fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderPage, RemoteError> {
        let resp = self
            .rpc("files/list_folder/continue", json!({ "cursor": cursor }))
            .await?;

        let text = resp.text().await?;
        let listing: ListFolderResponse = serde_json::from_str(&text)?;
        Ok(listing.into())
    }

    async fn download(&self, path: &str) -> Result<Bytes, RemoteError> {
        debug!(path, "dropbox download");
        let arg = json!({ "path": path }).to_string();
        let resp = self
            .client
            .post(format!("{}/files/download", self.content_url))
            .header(AUTHORIZATION, self.auth.clone())
            .header("Dropbox-API-Arg", arg)
            .send()
            .await?;

        let resp = check_status("files/download", resp).await?;
        Ok(resp.bytes().await?)
    }
}
