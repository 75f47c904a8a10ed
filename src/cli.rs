// src/cli.rs
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(
    name = "archwarden",
    version,
    about = "Check architecture boundaries and complexity requirements"
)]
pub struct Cli {
    /// Target directory to check
    #[arg(default_value = "src")]
    pub target: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,

    /// Include warnings in output (default: errors only)
    #[arg(long)]
    pub include_warnings: bool,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Console,
    Json,
}
