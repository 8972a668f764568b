//! A navigation session: tracks the current start and destination and keeps
//! exactly one route outcome, recomputed whenever an input changes.

use log::{debug, info};

use crate::Error;
use crate::config::RoutingConfig;
use crate::geometry::GeoPoint;
use crate::locations::LocationDirectory;
use crate::route::{CampusData, Destination, Route, synthesize};

/// Result of the latest recomputation.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Routed(Route),
    NotFound { query: String },
    Failed { reason: String },
}

impl RouteOutcome {
    pub fn route(&self) -> Option<&Route> {
        match self {
            RouteOutcome::Routed(route) => Some(route),
            _ => None,
        }
    }

    /// One-line summary for a status display.
    pub fn status(&self) -> String {
        match self {
            RouteOutcome::Routed(route) => format!(
                "Route ready: {:.2} km, about {} min",
                route.info.distance_km, route.info.eta_minutes
            ),
            RouteOutcome::NotFound { query } => format!("Destination \"{query}\" not found"),
            RouteOutcome::Failed { reason } => format!("Route could not be computed: {reason}"),
        }
    }
}

/// Resolves a typed destination against the location directory first and
/// the indoor rooms second.
pub fn resolve_destination(query: &str, directory: &LocationDirectory, data: &CampusData) -> Result<Destination, Error> {
    match directory.resolve(query) {
        Ok(destination) => Ok(destination),
        Err(Error::DestinationNotFound(_)) => data
            .indoor
            .as_ref()
            .and_then(|indoor| indoor.match_room(query))
            .map(|(room, _)| Destination::named(room.name.clone(), room.point))
            .ok_or_else(|| Error::DestinationNotFound(query.trim().to_string())),
        Err(e) => Err(e),
    }
}

#[derive(Debug, Clone)]
pub struct Navigator {
    data: CampusData,
    directory: LocationDirectory,
    config: RoutingConfig,
    start: Option<GeoPoint>,
    destination: Option<Destination>,
    outcome: Option<RouteOutcome>,
    revision: u64,
}

impl Navigator {
    pub fn new(data: CampusData, directory: LocationDirectory, config: RoutingConfig) -> Self {
        Self {
            data,
            directory,
            config,
            start: None,
            destination: None,
            outcome: None,
            revision: 0,
        }
    }

    /// A start coordinate arrived (GPS fix or explicit choice).
    pub fn set_start(&mut self, start: GeoPoint) -> Option<&RouteOutcome> {
        self.start = Some(start);
        self.recompute()
    }

    /// The user typed a destination name.
    pub fn select_destination(&mut self, query: &str) -> Option<&RouteOutcome> {
        match resolve_destination(query, &self.directory, &self.data) {
            Ok(destination) => {
                self.destination = Some(destination);
                self.recompute()
            }
            Err(e) => {
                debug!("Destination lookup failed: {e}");
                self.destination = None;
                self.replace(Some(RouteOutcome::NotFound {
                    query: query.trim().to_string(),
                }))
            }
        }
    }

    /// The user clicked a destination on the map.
    pub fn pick_destination(&mut self, point: GeoPoint) -> Option<&RouteOutcome> {
        self.destination = Some(Destination::at(point));
        self.recompute()
    }

    /// Campus data finished loading (or was reloaded).
    pub fn load_campus(&mut self, data: CampusData) -> Option<&RouteOutcome> {
        info!(
            "Campus data loaded (outline: {}, paths: {}, indoor: {})",
            data.campus.is_some(),
            data.paths.is_some(),
            data.indoor.is_some()
        );
        self.data = data;
        self.recompute()
    }

    pub fn outcome(&self) -> Option<&RouteOutcome> {
        self.outcome.as_ref()
    }

    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    /// Incremented on every recomputation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn status(&self) -> String {
        match (&self.outcome, &self.start, &self.destination) {
            (Some(outcome), _, _) => outcome.status(),
            (None, None, Some(_)) => "Waiting for your location".to_string(),
            _ => "Ready".to_string(),
        }
    }

    fn recompute(&mut self) -> Option<&RouteOutcome> {
        let outcome = match (self.start, &self.destination) {
            (Some(start), Some(destination)) => Some(match synthesize(&self.data, &self.config, start, destination) {
                Ok(route) => RouteOutcome::Routed(route),
                Err(e) => RouteOutcome::Failed { reason: e.to_string() },
            }),
            _ => None,
        };
        self.replace(outcome)
    }

    /// The previous outcome is dropped, never merged with the new one.
    fn replace(&mut self, outcome: Option<RouteOutcome>) -> Option<&RouteOutcome> {
        self.revision += 1;
        self.outcome = outcome;
        self.outcome.as_ref()
    }
}
