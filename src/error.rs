use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Destination not found: {0}")]
    DestinationNotFound(String),
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("No route could be computed: {0}")]
    NoRoute(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Route task failed: {0}")]
    TaskFailed(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(#[from] geojson::Error),
    #[error("OSM error: {0}")]
    OsmError(#[from] osmpbf::Error),
}
