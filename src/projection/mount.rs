use std::sync::Arc;
use tracing::info;

use super::provider::NodeProvider;
use super::session::Session;
use crate::config::MountConfig;
use crate::error::Result;
use crate::remote::RemoteStore;
use crate::tree::{SnapshotBuilder, TreeSnapshot};

/// An activated mount: the snapshot of one remote store under a mount point
#[derive(Debug, Clone)]
pub struct Mount {
    config: MountConfig,
    provider: NodeProvider,
}

impl Mount {
    /// Enumerate `store` and publish the resulting snapshot.
    ///
    /// Fails without publishing anything if the configuration is invalid or
    /// enumeration fails. Credentials are not checked here; `store` is
    /// already constructed.
    pub async fn activate(config: MountConfig, store: Arc<dyn RemoteStore>) -> Result<Self> {
        config.validate_paths()?;

        info!(
            store = store.name(),
            mount_point = %config.mount_point,
            remote_path = %config.remote_path,
            "activating mount"
        );

        let snapshot = SnapshotBuilder::new(store)
            .build(&config.mount_point, &config.remote_path)
            .await?;
        let provider = NodeProvider::new(Arc::new(snapshot), &config.mount_point);

        Ok(Mount { config, provider })
    }

    /// A new session over the published snapshot
    pub fn login(&self) -> Session {
        Session::new(self.provider.clone())
    }

    pub fn snapshot(&self) -> &Arc<TreeSnapshot> {
        self.provider.snapshot()
    }

    pub fn mount_point(&self) -> &str {
        &self.config.mount_point
    }

    pub fn config(&self) -> &MountConfig {
        &self.config
    }

    pub fn provider(&self) -> &NodeProvider {
        &self.provider
    }
}
