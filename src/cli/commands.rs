//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Paginated gallery feed loader
#[derive(Parser, Debug)]
#[command(name = "gallery-feed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the base URL of the remote resource
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Override the endpoint path
    #[arg(long, global = true)]
    pub path: Option<String>,

    /// Override the page size
    #[arg(long, global = true)]
    pub page_size: Option<u32>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a single page
    Page {
        /// 1-based page index
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Load pages one after another until the data ends
    Scroll {
        /// Stop after this many pages (0 = until the data ends)
        #[arg(long, default_value = "0")]
        pages: u32,

        /// Probe the endpoint host every N seconds to track connectivity
        #[arg(long)]
        probe_interval: Option<u64>,
    },

    /// Print the effective configuration
    Config,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
