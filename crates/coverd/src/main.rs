use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use coverd::config::Config;
use coverd::cover;
use coverd::registry::StoredRegistry;
use coverd::reload;
use coverd::setup::CoverManager;

#[derive(Parser)]
#[command(name = "coverd", version, about = "Time-based cover provisioning")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply every enabled cover entry from the configuration file
    Run {
        /// Path to the TOML configuration file
        #[arg(short, long, default_value = "coverd.toml")]
        config: PathBuf,
    },
    /// Render a single cover entry into a covers document
    Generate {
        /// Human-readable cover name, e.g. "Bedroom Blind"
        name: String,

        /// Entity id of the switch driving the cover motor
        switch_entity: String,

        /// Full open-to-close travel time in seconds
        travel_time: f64,

        /// Covers document to merge the entry into
        #[arg(short, long, default_value = "covers.yaml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run { config } => run(config).await,
        Command::Generate {
            name,
            switch_entity,
            travel_time,
            output,
        } => generate(&name, &switch_entity, travel_time, &output),
    }
}

async fn run(config_path: PathBuf) -> anyhow::Result<()> {
    let config = Config::from_file(&config_path)?;

    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(config.logging.level))
        .init();

    tracing::info!("coverd starting");
    tracing::info!("Loaded config from: {}", config_path.display());
    tracing::info!("Platform config directory: {}", config.system.config_dir.display());

    let registry = Arc::new(
        StoredRegistry::open(&config.system.config_dir)
            .context("Failed to open entity registry store")?,
    );
    let (reload_tx, mut reload_rx) = reload::reload_channel();
    let manager = CoverManager::new(registry, config.system.config_dir.clone(), reload_tx);

    let mut failures = 0;
    for (entry_id, entry) in &config.covers {
        if !entry.enabled {
            tracing::info!("Cover entry {} is disabled, skipping", entry_id);
            continue;
        }

        if let Err(e) = manager.setup_entry(entry_id, entry).await {
            tracing::error!("[{}] Setup failed: {}", entry_id, e);
            failures += 1;
        }
    }

    // The manager holds the last sender; drop it so the drain loop ends.
    drop(manager);
    while let Some(request) = reload_rx.recv().await {
        tracing::info!("Reload requested for entry {}", request.entry_id);
    }

    if failures > 0 {
        anyhow::bail!("{} cover entries failed to set up", failures);
    }

    tracing::info!("All cover entries applied");
    Ok(())
}

fn generate(
    name: &str,
    switch_entity: &str,
    travel_time: f64,
    output: &Path,
) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .init();

    let cover_id = cover::normalize_id(name);
    let entry = cover::generate(&cover_id, name, switch_entity, travel_time)?;
    cover::apply_entry(&cover_id, entry, output)?;

    tracing::info!("Cover configuration for {} written to {}", cover_id, output.display());
    Ok(())
}
