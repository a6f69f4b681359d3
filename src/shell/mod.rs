pub mod commands;
pub mod completion;

use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::Arc;

use crate::projection::{ProjectedNode, Session};
use crate::remote::RemoteMetrics;
use crate::tree::NodePath;
use commands::Command;
pub use completion::{CompletionCache, ShellCompleter};

/// Shell state - tracks current location and provides command execution
pub struct ShellState {
    /// Session over the mounted snapshot
    session: Session,
    /// Current path in the projected tree
    current_path: NodePath,
    /// Remote call metrics, when the store is metered
    metrics: Option<Arc<RemoteMetrics>>,
    /// Tab completion cache
    completion_cache: CompletionCache,
    /// Registered commands
    commands: HashMap<String, Arc<dyn Command>>,
}

impl ShellState {
    /// Create a shell positioned at the session's mount point
    pub fn new(session: Session, metrics: Option<Arc<RemoteMetrics>>) -> Self {
        let current_path = NodePath::parse(&session.mount_point());
        let completion_cache = CompletionCache::new(session.clone());
        completion_cache.set_current_path(current_path.clone());

        let mut state = ShellState {
            session,
            current_path,
            metrics,
            completion_cache,
            commands: HashMap::new(),
        };

        state.register_command(Arc::new(commands::ls::LsCommand));
        state.register_command(Arc::new(commands::cd::CdCommand));
        state.register_command(Arc::new(commands::cat::CatCommand));
        state.register_command(Arc::new(commands::props::PropsCommand));
        state.register_command(Arc::new(commands::query::QueryCommand));
        state.register_command(Arc::new(commands::stats::StatsCommand));

        state
    }

    /// Register a command
    pub fn register_command(&mut self, command: Arc<dyn Command>) {
        self.commands.insert(command.name().to_string(), command);
    }

    /// Execute a command line
    pub async fn execute(&mut self, line: &str) -> Result<()> {
        // Parse command line respecting quotes
        let parts = Self::parse_command_line(line.trim())?;

        if parts.is_empty() {
            return Ok(());
        }

        let cmd_name = &parts[0];
        let args = &parts[1..];

        // Check for built-in commands first
        match cmd_name.as_str() {
            "exit" | "quit" => {
                return Err(anyhow!("exit"));
            }
            "help" => {
                self.print_help();
                return Ok(());
            }
            "pwd" => {
                println!("{}", self.current_path);
                return Ok(());
            }
            _ => {}
        }

        // Look up command
        if let Some(command) = self.commands.get(cmd_name) {
            let cmd = Arc::clone(command);
            cmd.execute(self, args).await
        } else {
            Err(anyhow!("Unknown command: {cmd_name}"))
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn metrics(&self) -> Option<&Arc<RemoteMetrics>> {
        self.metrics.as_ref()
    }

    pub fn current_path(&self) -> &NodePath {
        &self.current_path
    }

    /// Move to `path`, which must already be resolved
    pub fn set_current_path(&mut self, path: NodePath) {
        self.completion_cache.set_current_path(path.clone());
        self.current_path = path;
    }

    /// Get the completion cache
    pub fn completion_cache(&self) -> &CompletionCache {
        &self.completion_cache
    }

    /// Absolute form of `path`, relative to the current path unless it starts with `/`
    pub fn resolve_path(&self, path: &str) -> NodePath {
        if path.starts_with('/') {
            NodePath::root().join(path)
        } else {
            self.current_path.join(path)
        }
    }

    /// Node at `path` (absolute or relative)
    pub fn resolve_node(&self, path: &str) -> Result<ProjectedNode> {
        let target = self.resolve_path(path);
        Ok(self.session.get_node(&target.to_string())?)
    }

    /// Print help message
    fn print_help(&self) {
        println!("Available commands:");
        let mut names: Vec<_> = self.commands.keys().collect();
        names.sort();
        for name in names {
            println!("  {}", self.commands[name].usage());
        }
        println!("  pwd - Print working directory");
        println!("  help - Show this help");
        println!("  exit/quit - Exit the shell");
    }

    /// Get the prompt string
    pub fn prompt(&self) -> String {
        format!("cloudmount:{} $ ", self.current_path)
    }

    /// Parse command line respecting quotes (both single and double)
    fn parse_command_line(line: &str) -> Result<Vec<String>> {
        let mut args = Vec::new();
        let mut current_arg = String::new();
        let mut in_single_quote = false;
        let mut in_double_quote = false;
        let mut escape_next = false;

        for ch in line.chars() {
            if escape_next {
                current_arg.push(ch);
                escape_next = false;
                continue;
            }

            match ch {
                '\\' if !in_single_quote => {
                    escape_next = true;
                }
                '\'' if !in_double_quote => {
                    in_single_quote = !in_single_quote;
                }
                '"' if !in_single_quote => {
                    in_double_quote = !in_double_quote;
                }
                ' ' | '\t' if !in_single_quote && !in_double_quote => {
                    if !current_arg.is_empty() {
                        args.push(std::mem::take(&mut current_arg));
                    }
                }
                _ => {
                    current_arg.push(ch);
                }
            }
        }

        if !current_arg.is_empty() {
            args.push(current_arg);
        }

        if in_single_quote {
            return Err(anyhow!("Unclosed single quote"));
        }
        if in_double_quote {
            return Err(anyhow!("Unclosed double quote"));
        }

        Ok(args)
    }
}
