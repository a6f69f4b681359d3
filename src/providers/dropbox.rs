use anyhow::{Context, Result};
use std::sync::Arc;

use super::Provider;
use crate::config::MountConfig;
use crate::remote::{DropboxStore, RemoteStore};

/// Dropbox, authenticated with a long-lived access token
pub struct DropboxProvider;

impl Default for DropboxProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DropboxProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Provider for DropboxProvider {
    fn name(&self) -> &str {
        "dropbox"
    }

    fn description(&self) -> &str {
        "Dropbox files API (access token)"
    }

    async fn create_store(&self, config: &MountConfig) -> Result<Arc<dyn RemoteStore>> {
        config.validate()?;
        let token = config.access_token.as_deref().unwrap_or_default();
        let store = DropboxStore::new(token).context("Failed to create Dropbox client")?;
        Ok(Arc::new(store))
    }
}
