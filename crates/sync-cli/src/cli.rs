//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// settings-sync - Synchronize editor configuration across machines
#[derive(Parser, Debug)]
#[command(name = "setsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Storage directory holding settings.yml and backend caches
    #[arg(long, global = true, env = "SETSYNC_STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Local configuration tree to synchronize
    #[arg(long, global = true, env = "SETSYNC_LOCAL_DIR")]
    pub local_dir: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Seed the settings document if it does not exist yet
    Init,

    /// Show the active backend, profile, and hooks
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Push the local configuration tree to the backend store
    Upload,

    /// Restore the backend store into the local configuration tree
    Download {
        /// Overwrite local files without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Switch the active profile
    Profile {
        /// Profile name to activate
        name: String,
    },

    /// Re-read the settings document and reconstruct the backend
    Reload,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}
