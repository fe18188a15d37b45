//! CLI module
//!
//! Command-line interface for loading a paginated gallery.
//!
//! # Commands
//!
//! - `page` - Fetch a single page
//! - `scroll` - Drive the feed page after page, as a user scrolling would
//! - `config` - Print the effective configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
