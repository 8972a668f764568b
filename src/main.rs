use std::path::PathBuf;
use std::sync::Arc;

use campus_nav::config::ServerConfig;
use campus_nav::loading::load_campus;
use campus_nav::server::{AppState, router};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Campus navigation API server.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Address to listen on, e.g. 0.0.0.0:3000
    #[arg(long)]
    bind: Option<String>,
    /// Campus GeoJSON (outline, paths, rooms, named points)
    #[arg(long)]
    campus: Option<PathBuf>,
    /// OSM PBF extract to take walkable paths from
    #[arg(long)]
    osm: Option<PathBuf>,
    /// JSON array of named locations
    #[arg(long)]
    locations: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    // 1. Configuration: file first, then command-line overrides
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if args.campus.is_some() {
        config.campus_geojson = args.campus;
    }
    if args.osm.is_some() {
        config.osm_paths = args.osm;
    }
    if args.locations.is_some() {
        config.locations = args.locations;
    }
    config.routing.validate()?;

    // 2. Load campus data
    let (campus, directory) = load_campus(&config)?;

    let shared_state = Arc::new(AppState {
        campus,
        directory,
        config: config.routing.clone(),
    });

    // 3. Serve
    let app = router(shared_state);
    tracing::info!("API Server running on http://{}", config.bind);
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
