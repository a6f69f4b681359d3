use std::fmt;

use crate::error::{MountError, Result};

pub const DEFAULT_PROVIDER: &str = "dropbox";
pub const DEFAULT_MOUNT_POINT: &str = "/content/dropbox";
pub const DEFAULT_REMOTE_PATH: &str = "/adaptto";

/// Everything needed to mount one remote store
#[derive(Clone)]
pub struct MountConfig {
    /// Backend name, see [`crate::providers::ProviderRegistry`]
    pub provider: String,
    /// Projected path the remote root appears at
    pub mount_point: String,
    /// Folder (or file) in the remote store to start from
    pub remote_path: String,
    /// Dropbox bearer token
    pub access_token: Option<String>,
    /// S3 bucket
    pub bucket: Option<String>,
    /// S3-compatible endpoint override
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
}

impl Default for MountConfig {
    fn default() -> Self {
        MountConfig {
            provider: DEFAULT_PROVIDER.to_string(),
            mount_point: DEFAULT_MOUNT_POINT.to_string(),
            remote_path: DEFAULT_REMOTE_PATH.to_string(),
            access_token: None,
            bucket: None,
            endpoint_url: None,
            region: None,
        }
    }
}

impl MountConfig {
    pub fn new(mount_point: impl Into<String>, remote_path: impl Into<String>) -> Self {
        MountConfig {
            mount_point: mount_point.into(),
            remote_path: remote_path.into(),
            ..Self::default()
        }
    }

    /// Check the paths and the credentials the chosen provider needs
    pub fn validate(&self) -> Result<()> {
        self.validate_paths()?;
        match self.provider.as_str() {
            "dropbox" if self.access_token.as_deref().is_none_or(str::is_empty) => Err(
                MountError::InvalidConfig("dropbox requires an access token".to_string()),
            ),
            "s3" if self.bucket.as_deref().is_none_or(str::is_empty) => Err(
                MountError::InvalidConfig("s3 requires a bucket".to_string()),
            ),
            _ => Ok(()),
        }
    }

    /// Check the mount point and remote path only
    pub fn validate_paths(&self) -> Result<()> {
        let mount = &self.mount_point;
        if !mount.starts_with('/') {
            return Err(MountError::InvalidConfig(format!(
                "mount point must be absolute: {mount:?}"
            )));
        }
        if mount == "/" {
            return Err(MountError::InvalidConfig(
                "mount point must not be the repository root".to_string(),
            ));
        }
        if mount.ends_with('/') {
            return Err(MountError::InvalidConfig(format!(
                "mount point must not end with '/': {mount:?}"
            )));
        }
        if mount[1..]
            .split('/')
            .any(|s| s.is_empty() || s == "." || s == "..")
        {
            return Err(MountError::InvalidConfig(format!(
                "mount point has an empty or relative segment: {mount:?}"
            )));
        }

        let remote = &self.remote_path;
        if !remote.is_empty() && !remote.starts_with('/') {
            return Err(MountError::InvalidConfig(format!(
                "remote path must be empty or absolute: {remote:?}"
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for MountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountConfig")
            .field("provider", &self.provider)
            .field("mount_point", &self.mount_point)
            .field("remote_path", &self.remote_path)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("bucket", &self.bucket)
            .field("endpoint_url", &self.endpoint_url)
            .field("region", &self.region)
            .finish()
    }
}
