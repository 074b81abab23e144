//! settings-sync CLI
//!
//! The command-line host for synchronizing editor configuration across
//! machines.

mod cli;
mod commands;
mod error;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    let storage_dir = match &cli.storage_dir {
        Some(dir) => dir.clone(),
        None => sync_fs::paths::default_storage_dir()?,
    };

    match cli.command {
        Some(Commands::Init) => commands::run_init(&storage_dir),
        Some(Commands::Status { json }) => commands::run_status(&storage_dir, json),
        Some(Commands::Upload) => commands::run_upload(&storage_dir, cli.local_dir.as_ref()).await,
        Some(Commands::Download { yes }) => {
            commands::run_download(&storage_dir, cli.local_dir.as_ref(), yes).await
        }
        Some(Commands::Profile { name }) => commands::run_profile(&storage_dir, &name).await,
        Some(Commands::Reload) => commands::run_reload(&storage_dir).await,
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "setsync",
                &mut std::io::stdout(),
            );
            Ok(())
        }
        None => {
            println!("{} settings-sync CLI", "setsync".green().bold());
            println!();
            println!("Run {} for available commands.", "setsync --help".cyan());
            Ok(())
        }
    }
}
