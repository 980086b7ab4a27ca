//! CLI interface for poly-edge
//!
//! Provides subcommands for:
//! - `scan`: One refresh cycle, print the ranked table
//! - `watch`: Auto-refresh loop with change highlighting
//! - `config`: Show current configuration

mod scan;
mod table;
mod watch;

pub use scan::ScanArgs;
pub use watch::WatchArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "poly-edge")]
#[command(about = "Fair-value scanner for Polymarket above/below equity markets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one refresh cycle and print opportunities
    Scan(ScanArgs),
    /// Auto-refresh loop with change highlighting
    Watch(WatchArgs),
    /// Show current configuration
    Config,
}
