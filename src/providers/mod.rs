mod dropbox;
mod s3;

pub use dropbox::DropboxProvider;
pub use s3::{S3Provider, create_s3_client};

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::MountConfig;
use crate::remote::RemoteStore;

/// Trait for remote store backends
/// Providers turn a mount configuration into a ready [`RemoteStore`]
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Get provider description
    fn description(&self) -> &str;

    /// Validate `config` and construct the store it describes
    async fn create_store(&self, config: &MountConfig) -> Result<Arc<dyn RemoteStore>>;
}

/// Registry of available providers
pub struct ProviderRegistry {
    providers: HashMap<String, Box<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create a new registry with all built-in providers
    pub fn new() -> Self {
        let mut registry = Self {
            providers: HashMap::new(),
        };

        registry.register(Box::new(DropboxProvider::new()));
        registry.register(Box::new(S3Provider::new()));

        registry
    }

    /// Register a provider, replacing any with the same name
    pub fn register(&mut self, provider: Box<dyn Provider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Provider> {
        self.providers.get(name).map(|p| p.as_ref())
    }

    /// List all available providers, sorted by name
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Create the store named by `config.provider`
    pub async fn create_store(&self, config: &MountConfig) -> Result<Arc<dyn RemoteStore>> {
        let provider = self.get(&config.provider).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown provider '{}'. Available: {}",
                config.provider,
                self.list().join(", ")
            )
        })?;
        provider.create_store(config).await
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
