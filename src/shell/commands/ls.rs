use anyhow::{Result, anyhow};
use async_trait::async_trait;
use colored::*;

use super::output::print_line;
use super::{Command, ShellState, is_folder};
use crate::projection::ProjectedNode;
use crate::projection::query::matches_glob;

pub struct LsCommand;

#[async_trait]
impl Command for LsCommand {
    fn name(&self) -> &str {
        "ls"
    }

    fn usage(&self) -> &str {
        "ls [-l] [PATH|PATTERN] - List directory contents"
    }

    async fn execute(&self, state: &mut ShellState, args: &[String]) -> Result<()> {
        let mut long_format = false;
        let mut path_arg: Option<&str> = None;

        for arg in args {
            if arg == "-l" {
                long_format = true;
            } else if arg.starts_with('-') {
                return Err(anyhow!("Unknown option: {arg}"));
            } else if path_arg.is_none() {
                path_arg = Some(arg.as_str());
            }
        }

        // A wildcard in the last segment filters the parent's children
        let (dir, pattern) = match path_arg {
            Some(path) if path.contains('*') || path.contains('?') => match path.rfind('/') {
                Some(0) => ("/", Some(&path[1..])),
                Some(pos) => (&path[..pos], Some(&path[pos + 1..])),
                None => (".", Some(path)),
            },
            Some(path) => (path, None),
            None => (".", None),
        };

        let node = state.resolve_node(dir)?;
        let children: Vec<ProjectedNode> = node
            .children()
            .filter(|child| pattern.is_none_or(|p| matches_glob(child.name(), p)))
            .collect();

        if long_format {
            print_line!("{:<40} {:<14} CHILDREN", "NAME", "TYPE");
            print_line!("{}", "-".repeat(66));
            for child in &children {
                let count = child.children().size();
                if is_folder(child) {
                    print_line!(
                        "{:<40} {:<14} {}",
                        format!("{}/", child.name()).blue().bold(),
                        child.primary_type(),
                        count
                    );
                } else {
                    print_line!("{:<40} {:<14} {}", child.name(), child.primary_type(), count);
                }
            }
        } else {
            for child in &children {
                if is_folder(child) {
                    print_line!("{}/", child.name().blue().bold());
                } else {
                    print_line!("{}", child.name());
                }
            }
        }

        Ok(())
    }
}
