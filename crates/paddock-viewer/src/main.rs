//! Paddock - 3D vehicle catalogue viewer

mod app;
mod config;
mod session;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use paddock_core::Catalogue;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "paddock")]
#[command(about = "Browse a catalogue of racing cars in 3D")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "paddock.toml")]
    config: PathBuf,

    /// Catalogue file (overrides the configuration)
    #[arg(long)]
    catalogue: Option<PathBuf>,

    /// Asset root directory (overrides the configuration)
    #[arg(short, long)]
    assets: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Paddock v{}", env!("CARGO_PKG_VERSION"));

    let mut config = config::load_config(&args.config)?;
    if let Some(catalogue) = args.catalogue {
        config.catalogue = Some(catalogue);
    }
    if let Some(assets) = args.assets {
        config.assets.root = assets;
    }

    let catalogue = match &config.catalogue {
        Some(path) => Catalogue::from_file(path)
            .with_context(|| format!("loading catalogue {}", path.display()))?,
        None => Catalogue::builtin().context("loading built-in catalogue")?,
    };
    info!(
        teams = catalogue.teams().len(),
        cars = catalogue.car_count(),
        assets = %config.assets.root.display(),
        "Catalogue loaded"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("paddock-loader")
        .enable_all()
        .build()
        .context("starting loader runtime")?;

    let exit = app::run(config, Arc::new(catalogue), runtime);
    info!(?exit, "Viewer closed");
    Ok(())
}
