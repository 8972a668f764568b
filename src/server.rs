//! HTTP adapter around the routing core.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Error;
use crate::config::RoutingConfig;
use crate::geometry::GeoPoint;
use crate::locations::{LocationDirectory, NamedLocation};
use crate::navigator::resolve_destination;
use crate::route::{CampusData, Destination, RouteTier, synthesize};

// Shared read-only state; every request computes its own route.
pub struct AppState {
    pub campus: CampusData,
    pub directory: LocationDirectory,
    pub config: RoutingConfig,
}

pub fn router(state: Arc<AppState>) -> Router {
    // Allows a locally served frontend to talk to the API
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/locations", get(list_locations))
        .route("/location/:place", get(find_location))
        .route("/route", post(calculate_route))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// --- API DTOs ---

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub origin: [f64; 2], // [lat, lon]
    pub destination: DestinationQuery,
}

/// A typed name, or a `[lat, lon]` picked on the map.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DestinationQuery {
    Name(String),
    Point([f64; 2]),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteResponse {
    pub geometry: GeoJsonLineString,
    pub tier: RouteTier,
    pub graph_based: bool,
    pub destination: Option<String>,
    pub total_distance_km: f64,
    pub eta_minutes: u32,
    pub advisory: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeoJsonLineString {
    pub r#type: String,
    pub coordinates: Vec<[f64; 2]>, // [lon, lat] standard for GeoJSON
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::DestinationNotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidCoordinate(_) | Error::NoRoute(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// --- Handlers ---

async fn list_locations(State(state): State<Arc<AppState>>) -> Json<Vec<NamedLocation>> {
    Json(state.directory.entries().to_vec())
}

async fn find_location(
    State(state): State<Arc<AppState>>,
    Path(place): Path<String>,
) -> Result<Json<NamedLocation>, ApiError> {
    state
        .directory
        .find(&place)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError(Error::DestinationNotFound(place)))
}

async fn calculate_route(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RouteRequest>,
) -> Result<Json<RouteResponse>, ApiError> {
    let start = GeoPoint::new(payload.origin[0], payload.origin[1]);
    let destination = match payload.destination {
        DestinationQuery::Name(name) => resolve_destination(&name, &state.directory, &state.campus)?,
        DestinationQuery::Point([lat, lon]) => Destination::at(GeoPoint::new(lat, lon)),
    };

    // Graph building and search are CPU-bound; keep them off the async workers.
    let route = {
        let state = Arc::clone(&state);
        let destination = destination.clone();
        tokio::task::spawn_blocking(move || synthesize(&state.campus, &state.config, start, &destination))
            .await
            .map_err(|e| Error::TaskFailed(e.to_string()))??
    };

    Ok(Json(RouteResponse {
        geometry: GeoJsonLineString {
            r#type: "LineString".to_string(),
            coordinates: route.polyline.iter().map(|p| [p.lon, p.lat]).collect(),
        },
        tier: route.tier,
        graph_based: route.tier.is_graph_based(),
        destination: destination.name,
        total_distance_km: route.info.distance_km,
        eta_minutes: route.info.eta_minutes,
        advisory: route.info.advisory,
    }))
}
