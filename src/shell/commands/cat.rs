use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;

use super::output::print_bytes;
use super::{Command, ShellState};
use crate::tree::{JCR_CONTENT, JCR_DATA, NT_FILE};
use crate::ui::create_spinner;

pub struct CatCommand;

#[async_trait]
impl Command for CatCommand {
    fn name(&self) -> &str {
        "cat"
    }

    fn usage(&self) -> &str {
        "cat FILE - Display file contents"
    }

    async fn execute(&self, state: &mut ShellState, args: &[String]) -> Result<()> {
        let path_str = args.first().ok_or_else(|| anyhow!("Usage: cat FILE"))?;
        let node = state.resolve_node(path_str)?;

        let data = if node.primary_type() == NT_FILE {
            node.property(&format!("{JCR_CONTENT}/{JCR_DATA}"))?
        } else {
            node.primary_item()
                .map_err(|_| anyhow!("Not a file: {path_str}"))?
        };

        let binary = data.get_binary();
        let bytes = if binary.is_loaded() {
            binary.bytes().await?
        } else {
            let spinner = create_spinner(&format!("Downloading {}...", node.name()));
            let result = binary.bytes().await;
            spinner.finish_and_clear();
            result.with_context(|| format!("Failed to read {path_str}"))?
        };

        if std::str::from_utf8(&bytes).is_ok() {
            print_bytes!(&bytes);
            if !bytes.ends_with(b"\n") {
                println!();
            }
        } else {
            eprintln!("Warning: File contains binary data");
            // Display first 1KB as hex
            let display_len = bytes.len().min(1024);
            for (i, byte) in bytes[..display_len].iter().enumerate() {
                if i % 16 == 0 {
                    print!("\n{i:08x}: ");
                }
                print!("{byte:02x} ");
            }
            println!();
            if bytes.len() > 1024 {
                eprintln!("... ({} more bytes)", bytes.len() - 1024);
            }
        }

        Ok(())
    }
}
