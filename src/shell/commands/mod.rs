use anyhow::Result;
use async_trait::async_trait;

pub mod cat;
pub mod cd;
pub mod ls;
pub mod output;
pub mod props;
pub mod query;
pub mod stats;

use super::ShellState;
use crate::projection::ProjectedNode;
use crate::tree::{NT_FOLDER, SLING_FOLDER};

/// Trait for shell commands
#[async_trait]
pub trait Command: Send + Sync {
    /// Get the command name
    fn name(&self) -> &str;

    /// Get command usage help
    fn usage(&self) -> &str;

    /// Execute the command
    async fn execute(&self, state: &mut ShellState, args: &[String]) -> Result<()>;
}

/// Folders (remote or virtual) are the only nodes `cd` enters
pub(crate) fn is_folder(node: &ProjectedNode) -> bool {
    matches!(node.primary_type(), SLING_FOLDER | NT_FOLDER)
}
