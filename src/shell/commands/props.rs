use anyhow::Result;
use async_trait::async_trait;
use colored::*;

use super::output::print_line;
use super::{Command, ShellState};

pub struct PropsCommand;

#[async_trait]
impl Command for PropsCommand {
    fn name(&self) -> &str {
        "props"
    }

    fn usage(&self) -> &str {
        "props [PATH] - Show the properties of a node"
    }

    async fn execute(&self, state: &mut ShellState, args: &[String]) -> Result<()> {
        let path = args.first().map(String::as_str).unwrap_or(".");
        let node = state.resolve_node(path)?;

        print_line!("{}", node.path().bold());
        for property in node.properties() {
            let primary = node
                .primary_item()
                .is_ok_and(|item| item.path() == property.path());
            let marker = if primary { "*" } else { " " };
            print_line!(
                "{marker} {:<20} {:<8} {}",
                property.name().cyan(),
                property.property_type(),
                property.value()
            );
        }
        Ok(())
    }
}
