use rustyline::Context;
use rustyline::completion::{Completer, Pair};
use std::sync::{Arc, RwLock};

use super::commands::is_folder;
use crate::projection::Session;
use crate::tree::NodePath;

/// Entry in completion cache with metadata
#[derive(Clone, Debug)]
pub struct CompletionEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Source of completions: the mounted snapshot plus the shell's location.
///
/// The snapshot never changes after mounting, so entries are read straight
/// from it instead of being cached per directory.
#[derive(Clone)]
pub struct CompletionCache {
    session: Session,
    /// Available commands
    commands: Vec<String>,
    current_path: Arc<RwLock<NodePath>>,
}

impl CompletionCache {
    pub fn new(session: Session) -> Self {
        CompletionCache {
            session,
            commands: ["ls", "cd", "cat", "props", "query", "stats", "pwd", "help", "exit"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            current_path: Arc::new(RwLock::new(NodePath::root())),
        }
    }

    pub fn set_current_path(&self, path: NodePath) {
        if let Ok(mut current) = self.current_path.write() {
            *current = path;
        }
    }

    pub fn current_path(&self) -> NodePath {
        self.current_path
            .read()
            .map(|p| p.clone())
            .unwrap_or_else(|_| NodePath::root())
    }

    /// Children of `dir` (relative to the current path unless absolute)
    pub fn entries(&self, dir: &str) -> Vec<CompletionEntry> {
        let target = if dir.starts_with('/') {
            NodePath::root().join(dir)
        } else {
            self.current_path().join(dir)
        };

        self.session
            .provider()
            .get_children(&target.to_string())
            .map(|node| CompletionEntry {
                name: node.name().to_string(),
                is_dir: is_folder(&node),
            })
            .collect()
    }

    /// Get available commands
    pub fn get_commands(&self) -> &[String] {
        &self.commands
    }
}

/// Tab completion helper for the shell
pub struct ShellCompleter {
    cache: CompletionCache,
}

impl ShellCompleter {
    pub fn new(cache: CompletionCache) -> Self {
        ShellCompleter { cache }
    }

    /// Complete a command at the start of the line
    fn complete_command(&self, line: &str) -> Vec<Pair> {
        self.cache
            .get_commands()
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect()
    }

    /// Complete a path (file or directory)
    fn complete_path(&self, path: &str, command: &str) -> Vec<Pair> {
        // Split into the directory part (with its trailing slash) and the prefix being typed
        let (dir_path, file_prefix) = match path.rfind('/') {
            Some(last_slash) => (&path[..last_slash + 1], &path[last_slash + 1..]),
            None => ("", path),
        };

        self.cache
            .entries(dir_path)
            .into_iter()
            .filter(|entry| entry.name.starts_with(file_prefix))
            // cd only shows directories
            .filter(|entry| command != "cd" || entry.is_dir)
            .map(|entry| {
                let suffix = if entry.is_dir { "/" } else { "" };
                Pair {
                    replacement: format!("{dir_path}{}{suffix}", entry.name),
                    display: entry.name,
                }
            })
            .collect()
    }
}

impl Completer for ShellCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.trim().is_empty() {
            return Ok((0, Vec::new()));
        }

        let words: Vec<&str> = line.split_whitespace().collect();

        // If we're on the first word, complete commands
        if words.len() == 1 && !line.ends_with(char::is_whitespace) {
            let completions = self.complete_command(words[0]);
            let start = line.len() - words[0].len();
            return Ok((start, completions));
        }

        let command = words[0];
        let path = if line.ends_with(char::is_whitespace) {
            ""
        } else {
            words.last().copied().unwrap_or("")
        };

        let completions = self.complete_path(path, command);
        Ok((pos - path.len(), completions))
    }
}

impl rustyline::Helper for ShellCompleter {}
impl rustyline::highlight::Highlighter for ShellCompleter {}
impl rustyline::hint::Hinter for ShellCompleter {
    type Hint = String;
}
impl rustyline::validate::Validator for ShellCompleter {}
