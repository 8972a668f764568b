//! Campus navigation routing core.
//!
//! Given a campus outline, optional walking paths and an optional indoor
//! floor plan, [`route::synthesize`] turns a start point and a destination
//! into a polyline plus distance, ETA and advisory text. The [`server`]
//! module exposes the same over HTTP.

pub mod config;
pub mod curve;
mod error;
pub mod geometry;
pub mod graph;
pub mod indoor;
pub mod loading;
pub mod locations;
pub mod navigator;
pub mod route;
pub mod search;
pub mod server;

pub use error::Error;

pub mod prelude {
    pub use crate::Error;
    pub use crate::config::RoutingConfig;
    pub use crate::geometry::{Boundary, GeoPoint};
    pub use crate::graph::{NavigationGraph, NodeId};
    pub use crate::indoor::{IndoorMap, IndoorRoom};
    pub use crate::locations::{LocationDirectory, NamedLocation};
    pub use crate::navigator::{Navigator, RouteOutcome};
    pub use crate::route::{CampusData, Destination, Route, RouteInfo, RouteTier, synthesize};
    pub use crate::search::{GraphPath, astar_path};
}
