// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use application::NoteFetcher;
use infrastructure::{AnkiConnectClient, Config};
use ports::{format_note, TerminalView};
use tracing::{debug, info};

use crate::cli::args::{Args, Command};
use crate::constants::{APP_DIR_NAME, LOG_FILE_NAME};

pub fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting ankirubi with arguments");

    match &args.command {
        Command::InitConfig { path, force } => init_config(path.clone(), *force),
        Command::Browse => {
            let (config, fetcher) = connect(&args)?;
            block_on(TerminalView::new(fetcher, config.tags).run())
        }
        Command::Random { json } => {
            let (config, fetcher) = connect(&args)?;
            block_on(print_random_note(fetcher, config, *json))
        }
    }
}

/// Resolve configuration and build the fetcher it describes.
fn connect(args: &Args) -> Result<(Config, Arc<NoteFetcher<AnkiConnectClient>>)> {
    let config = Config::resolve(args.config.as_deref())?.with_overrides(
        args.host.clone(),
        args.port,
        args.query.clone(),
    );
    config.validate()?;
    debug!(?config, "Resolved configuration");

    let client = AnkiConnectClient::from_config(&config.anki_connect)?;
    let fetcher = Arc::new(NoteFetcher::new(client, config.fetch_settings()));
    Ok((config, fetcher))
}

fn block_on<F: Future<Output = Result<()>>>(future: F) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(future)
}

async fn print_random_note(
    fetcher: Arc<NoteFetcher<AnkiConnectClient>>,
    config: Config,
    json: bool,
) -> Result<()> {
    let note = fetcher
        .fetch_random_note()
        .await
        .context("Failed to fetch a random note")?;
    info!(note_id = %note.id, "Fetched note");

    if json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        print!("{}", format_note(&note, &config.tags));
    }
    Ok(())
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => Config::default_path().context("Could not determine config directory")?,
    };

    if path.exists() && !force {
        bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    Config::create_default(&path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

/// Log file used while the terminal view owns the screen.
pub fn log_file_path() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    Ok(dir.join(LOG_FILE_NAME))
}
