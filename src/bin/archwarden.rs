// src/bin/archwarden.rs
use std::path::Path;
use std::process;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use archwarden_core::checker::ArchitectureChecker;
use archwarden_core::cli::{Cli, OutputFormat};
use archwarden_core::config::Config;
use archwarden_core::reporting::Reporter;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "error:".red().bold());
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load();
    config.verbose = cli.verbose;
    config.validate()?;

    if config.verbose {
        println!(
            "Checking architectural boundaries in {} ({} workers)",
            cli.target.display(),
            config.workers
        );
    }

    let checker = ArchitectureChecker::new(&cli.target, config.clone());
    let mut results = checker.run()?;

    // Warnings never affect the exit code; by default they are not shown
    // either, only counted.
    let suppressed = if cli.include_warnings {
        0
    } else {
        std::mem::take(&mut results.warnings).len()
    };

    let output_file = config.report_path.clone();
    let reporter = Reporter::new(Path::new(&output_file));
    let passed = reporter.report(&results, cli.format == OutputFormat::Json, suppressed)?;

    process::exit(i32::from(!passed));
}
