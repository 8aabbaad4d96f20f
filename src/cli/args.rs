// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to TOML config file (optional)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// AnkiConnect host, overrides the config file
    #[arg(long, value_name = "HOST", global = true)]
    pub host: Option<String>,

    /// AnkiConnect port, overrides the config file
    #[arg(long, value_name = "PORT", global = true)]
    pub port: Option<u16>,

    /// Anki search query for candidate notes, overrides the config file
    #[arg(short, long, value_name = "QUERY", global = true)]
    pub query: Option<String>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute (browse or random)
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Browse random notes interactively in the terminal
    Browse,

    /// Fetch one random note and print it
    Random {
        /// Output note as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Write a config file with default values
    InitConfig {
        /// Where to write it (defaults to the user config directory)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
