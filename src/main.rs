use anyhow::Context;
use clap::Parser;
use cloudmount::config::{DEFAULT_MOUNT_POINT, DEFAULT_PROVIDER, DEFAULT_REMOTE_PATH};
use cloudmount::providers::ProviderRegistry;
use cloudmount::remote::{MeteredStore, RemoteMetrics};
use cloudmount::ui::create_spinner;
use cloudmount::{Mount, MountConfig, shell};
use colored::*;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Browse a Dropbox folder or S3 bucket as a read-only content tree
#[derive(Parser, Debug)]
#[command(name = "cloudmount", version, about)]
struct Args {
    /// Backend to mount (dropbox, s3)
    #[arg(short, long, env = "CLOUDMOUNT_PROVIDER", default_value = DEFAULT_PROVIDER)]
    provider: String,

    /// Path the remote tree is projected under
    #[arg(short, long, env = "CLOUDMOUNT_MOUNT_POINT", default_value = DEFAULT_MOUNT_POINT)]
    mount_point: String,

    /// Remote folder to start from ("" or "/" for the store root)
    #[arg(short, long, env = "CLOUDMOUNT_REMOTE_PATH", default_value = DEFAULT_REMOTE_PATH)]
    remote_path: String,

    /// Dropbox access token
    #[arg(long, env = "DROPBOX_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// S3 bucket name
    #[arg(long, env = "CLOUDMOUNT_BUCKET")]
    bucket: Option<String>,

    /// S3-compatible endpoint URL
    #[arg(long, env = "CLOUDMOUNT_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// S3 region
    #[arg(long, env = "CLOUDMOUNT_REGION")]
    region: Option<String>,

    /// Log at debug level regardless of CLOUDMOUNT_LOG
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> MountConfig {
        MountConfig {
            provider: self.provider,
            mount_point: self.mount_point,
            remote_path: self.remote_path,
            access_token: self.access_token,
            bucket: self.bucket,
            endpoint_url: self.endpoint_url,
            region: self.region,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("CLOUDMOUNT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn mount(config: MountConfig, metrics: Arc<RemoteMetrics>) -> anyhow::Result<Mount> {
    let store = ProviderRegistry::new()
        .create_store(&config)
        .await
        .with_context(|| format!("Failed to create {} store", config.provider))?;
    let store = Arc::new(MeteredStore::new(store, metrics));

    let spinner = create_spinner(&format!("Mounting {}...", config.remote_path));
    let result = Mount::activate(config, store).await;
    spinner.finish_and_clear();

    Ok(result?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let config = args.into_config();

    // Print welcome message
    println!("{}", "=".repeat(60).cyan());
    println!("{}", "  cloudmount - Remote Folder Browser".bold().cyan());
    println!(
        "{}",
        format!("  {} mounted at {}", config.provider, config.mount_point).cyan()
    );
    println!("{}", "=".repeat(60).cyan());
    println!();

    let metrics = RemoteMetrics::new();
    let mount = match mount(config, Arc::clone(&metrics)).await {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    println!(
        "Mounted {} nodes. Type 'help' for available commands or 'exit' to quit",
        mount.snapshot().len()
    );
    println!();

    let mut state = shell::ShellState::new(mount.login(), Some(metrics));

    // Create readline editor with tab completion
    let completer = shell::ShellCompleter::new(state.completion_cache().clone());
    let mut rl = Editor::new()?;
    rl.set_helper(Some(completer));

    // Load history if available
    let history_file = dirs::home_dir().map(|mut p| {
        p.push(".cloudmount_history");
        p
    });

    if let Some(path) = &history_file {
        let _ = rl.load_history(path);
    }

    // REPL loop
    loop {
        let prompt = state.prompt();

        match rl.readline(&prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());

                if let Err(e) = state.execute(&line).await {
                    if e.to_string() == "exit" {
                        break;
                    }
                    eprintln!("{} {:#}", "Error:".red().bold(), e);
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D
                println!("exit");
                break;
            }
            Err(err) => {
                eprintln!("{} {:?}", "Error:".red().bold(), err);
                break;
            }
        }
    }

    // Save history
    if let Some(path) = &history_file {
        let _ = rl.save_history(path);
    }

    println!("Goodbye!");
    Ok(())
}
