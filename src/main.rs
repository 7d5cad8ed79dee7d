use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use patrol_fleet::adapters::inbound::FileEventStore;
use patrol_fleet::adapters::outbound::{init_configured_logger, EventSourcedPathRepository, FilesystemDataSource};
use patrol_fleet::application::PatrolPathService;
use patrol_fleet::common::EventStore;
use patrol_fleet::domains::patrol::PathOptimizer;
use patrol_fleet::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // fast_log owns the `log` facade, so tracing gets its own subscriber
    // without the log bridge.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));
    let config = Config::load(Some(config_path.as_path()))?;
    info!("Configuration loaded from {}", config_path.display());

    let logger = init_configured_logger(&config.logging);
    logger.info("Starting patrol fleet service");

    let store: Arc<dyn EventStore> = Arc::new(FileEventStore::new(&config.storage.event_dir));
    let repository = Arc::new(EventSourcedPathRepository::new(store));
    let data_source = Arc::new(FilesystemDataSource::new(config.storage.data_dir.clone()));
    info!("Event store at {}", config.storage.event_dir.display());
    info!("Waypoint sources under {}", data_source.base().display());

    let optimizer = PathOptimizer::new(config.optimizer.clone())?;
    let service = PatrolPathService::new(repository, data_source, optimizer, logger.clone())
        .with_default_speed(config.patrol.default_speed);

    match service.import_waypoints("sample_patrol.geojson") {
        Ok(waypoints) => info!("sample_patrol.geojson holds {} waypoints", waypoints.len()),
        Err(e) => error!("Failed to load sample_patrol.geojson: {}", e),
    }

    info!("Patrol fleet service started");
    tokio::signal::ctrl_c().await?;
    logger.info("Shutting down patrol fleet service");

    Ok(())
}
