use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use treespace::blocking::run_with_timeout;
use treespace::config::Config;
use treespace::space::Statvfs;
use treespace::{FREE_SPACE_UNKNOWN, create_folder_in_uri, get_free_space};

/// Inspect document-tree references: free space and folder creation
#[derive(Debug, Parser)]
#[command(name = "treespace", version, about)]
struct Cli {
    /// Config file (defaults to <config dir>/treespace/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory whose subdirectories are mounted volumes
    #[arg(long, global = true)]
    storage_root: Option<PathBuf>,

    /// Directory backing `primary:` documents
    #[arg(long, global = true)]
    primary_root: Option<PathBuf>,

    /// Give up after this many seconds
    #[arg(long, global = true, default_value_t = 10)]
    timeout: u64,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Free space of the volume backing a tree URI
    Free { uri: String },
    /// Create a folder at the root of a tree URI
    Mkdir { parent: String, name: String },
    /// List mounted volumes
    Volumes,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(root) = &cli.storage_root {
        config.storage_root = root.clone();
    }
    if let Some(root) = &cli.primary_root {
        config.primary_root = Some(root.clone());
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = Arc::new(load_config(&cli)?);
    let timeout = Duration::from_secs(cli.timeout);

    match cli.command {
        Commands::Free { uri } => {
            let config = Arc::clone(&config);
            let query = uri.clone();
            let bytes = run_with_timeout(timeout, move || {
                let volumes = config.volume_lister();
                get_free_space(volumes.as_ref(), &Statvfs, &query)
            })
            .await?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "uri": uri, "available_bytes": bytes })
                );
            } else if bytes == FREE_SPACE_UNKNOWN {
                println!("{} ({})", "unknown".yellow(), bytes);
            } else {
                println!(
                    "{} ({} bytes)",
                    humansize::format_size(bytes as u64, humansize::DECIMAL).green(),
                    bytes
                );
            }
        }

        Commands::Mkdir { parent, name } => {
            let config = Arc::clone(&config);
            let (p, n) = (parent.clone(), name.clone());
            let created = run_with_timeout(timeout, move || {
                let docs = config.documents();
                create_folder_in_uri(Some(&docs), &p, &n)
            })
            .await?;

            let Some(uri) = created else {
                bail!("Could not create {:?} under {}", name, parent);
            };

            if cli.json {
                println!("{}", serde_json::json!({ "uri": uri }));
            } else {
                println!("{}", uri);
            }
        }

        Commands::Volumes => {
            let config = Arc::clone(&config);
            let volumes = run_with_timeout(timeout, move || config.volume_lister().list_volumes())
                .await??;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&volumes)?);
            } else {
                for volume in &volumes {
                    println!(
                        "{:<12} {}",
                        volume.uuid().unwrap_or("-").cyan(),
                        volume.root().display()
                    );
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
