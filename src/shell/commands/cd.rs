use anyhow::{Result, anyhow};
use async_trait::async_trait;

use super::{Command, ShellState, is_folder};
use crate::tree::NodePath;

pub struct CdCommand;

#[async_trait]
impl Command for CdCommand {
    fn name(&self) -> &str {
        "cd"
    }

    fn usage(&self) -> &str {
        "cd [PATH] - Change current directory (no PATH returns to the mount point)"
    }

    async fn execute(&self, state: &mut ShellState, args: &[String]) -> Result<()> {
        let Some(path_str) = args.first() else {
            let mount_point = NodePath::parse(&state.session().mount_point());
            state.set_current_path(mount_point);
            return Ok(());
        };

        let target = state.resolve_path(path_str);
        let node = state
            .session()
            .get_node_or_none(&target.to_string())
            .ok_or_else(|| anyhow!("No such directory: {path_str}"))?;

        if !is_folder(&node) {
            return Err(anyhow!("Not a directory: {path_str}"));
        }

        state.set_current_path(target);
        Ok(())
    }
}
