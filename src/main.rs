// src/main.rs
use std::fs::File;
use std::sync::Mutex;

use ankirubi::cli::args::{Args, Command};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging based on verbosity
    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(format!("ankirubi={}", level).parse()?);

    // The terminal view owns stdout/stderr, so it logs to a file instead
    if args.command == Command::Browse {
        let log_path = ankirubi::log_file_path()?;
        let log_file = File::create(&log_path)
            .with_context(|| format!("Failed to create log file {}", log_path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(log_file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    ankirubi::run(args)
}
