//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Solidafy Target GCS CLI
#[derive(Parser, Debug)]
#[command(name = "solidafy-target-gcs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read tap messages and write records to the bucket
    Run {
        /// Read messages from a file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write objects under a local directory instead of GCS
        #[arg(long)]
        local_dir: Option<PathBuf>,

        /// Records per batch
        #[arg(long, default_value_t = crate::sink::DEFAULT_MAX_BATCH_SIZE)]
        batch_size: usize,
    },

    /// Validate configuration
    Validate,

    /// Show supported settings
    About,
}
