//! Route synthesis: picks the first routing tier that can serve a request.
//!
//! Tiers, in order:
//! 1. indoor corridor graph, when the start is on the floor plan and the
//!    destination names a room;
//! 2. campus path graph, when both ends are on campus and the result stays
//!    inside the campus outline;
//! 3. visibility graph over the campus outline (only when a path graph is
//!    loaded), under the same containment guard;
//! 4. a direct curve, or two curves bent through the campus centroid when
//!    the straight line would leave the campus;
//! 5. an unchecked direct curve for anything off campus.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::RoutingConfig;
use crate::curve::{bend_for, bezier_between, curve_through};
use crate::geometry::{Boundary, GeoPoint, distance_meters, planar_distance, polyline_length_meters};
use crate::graph::{NavigationGraph, decimate};
use crate::indoor::IndoorMap;
use crate::search::astar_path;
use crate::Error;

/// Campus data a route is computed against. Anything missing simply
/// disables the tiers that need it.
#[derive(Debug, Clone, Default)]
pub struct CampusData {
    pub campus: Option<Boundary>,
    pub paths: Option<NavigationGraph>,
    pub indoor: Option<IndoorMap>,
}

impl CampusData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_campus(mut self, boundary: Boundary) -> Self {
        if boundary.is_valid() {
            self.campus = Some(boundary);
        } else {
            warn!(
                "Ignoring campus outline with {} usable vertices",
                boundary.vertices().len()
            );
        }
        self
    }

    pub fn with_paths<I, L>(self, lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[GeoPoint]>,
    {
        self.with_path_graph(NavigationGraph::from_lines(lines))
    }

    pub fn with_path_graph(mut self, graph: NavigationGraph) -> Self {
        if graph.edge_count() > 0 {
            self.paths = Some(graph);
        } else {
            warn!("Ignoring path graph without edges");
        }
        self
    }

    pub fn with_indoor(mut self, indoor: IndoorMap) -> Self {
        if indoor.floor().is_valid() {
            self.indoor = Some(indoor);
        } else {
            warn!("Ignoring indoor map with an invalid floor outline");
        }
        self
    }

    /// Inside the campus outline or the indoor floor plan.
    pub fn is_known_location(&self, point: &GeoPoint) -> bool {
        self.campus.as_ref().is_some_and(|c| c.contains(point))
            || self.indoor.as_ref().is_some_and(|i| i.floor().contains(point))
    }
}

/// Where the user wants to go. `name` drives indoor room matching and the
/// curve shape; `point` is the resolved coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub name: Option<String>,
    pub point: GeoPoint,
}

impl Destination {
    pub fn named(name: impl Into<String>, point: GeoPoint) -> Self {
        Self {
            name: Some(name.into()),
            point,
        }
    }

    pub fn at(point: GeoPoint) -> Self {
        Self { name: None, point }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteTier {
    Indoor,
    PathGraph,
    Visibility,
    Direct,
    CentroidBend,
    Outdoor,
}

impl RouteTier {
    /// Whether the polyline follows a graph rather than a drawn curve.
    pub fn is_graph_based(&self) -> bool {
        matches!(self, Self::Indoor | Self::PathGraph | Self::Visibility)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub distance_m: f64,
    /// Rounded to two decimals.
    pub distance_km: f64,
    pub eta_minutes: u32,
    pub advisory: Option<String>,
}

impl RouteInfo {
    pub fn from_polyline(polyline: &[GeoPoint], config: &RoutingConfig, off_campus: bool) -> Self {
        let distance_m = polyline_length_meters(polyline);
        let distance_km = (distance_m / 10.0).round() / 100.0;
        let eta_minutes = (distance_m / config.walking_speed_mps / 60.0).ceil() as u32;

        let mut notes = Vec::new();
        if off_campus {
            notes.push("Route leaves the mapped campus and may cross open outdoor terrain.".to_string());
        }
        if distance_m > config.long_route_threshold_m {
            notes.push(format!(
                "Route is {distance_km:.2} km long; consider alternate transport."
            ));
        }

        Self {
            distance_m,
            distance_km,
            eta_minutes,
            advisory: (!notes.is_empty()).then(|| notes.join(" ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub tier: RouteTier,
    pub polyline: Vec<GeoPoint>,
    pub info: RouteInfo,
}

/// Computes a route from `start` to `destination`, falling through the
/// tiers until one succeeds.
///
/// # Errors
///
/// Returns [`Error::InvalidCoordinate`] for unusable coordinates and
/// [`Error::NoRoute`] when start and destination coincide.
pub fn synthesize(
    data: &CampusData,
    config: &RoutingConfig,
    start: GeoPoint,
    destination: &Destination,
) -> Result<Route, Error> {
    let end = destination.point;
    if !start.is_valid() {
        return Err(Error::InvalidCoordinate(format!("start ({}, {})", start.lat, start.lon)));
    }
    if !end.is_valid() {
        return Err(Error::InvalidCoordinate(format!("destination ({}, {})", end.lat, end.lon)));
    }
    if planar_distance(&start, &end) < 1e-9 {
        return Err(Error::NoRoute("start and destination are the same point".to_string()));
    }

    let (tier, polyline) = select_route(data, config, start, destination);
    let off_campus = tier == RouteTier::Outdoor
        || !(data.is_known_location(&start) && data.is_known_location(&end));
    let info = RouteInfo::from_polyline(&polyline, config, off_campus);
    debug!(
        "Route via {tier:?}: {} points, {:.1} m",
        polyline.len(),
        info.distance_m
    );

    Ok(Route { tier, polyline, info })
}

fn select_route(
    data: &CampusData,
    config: &RoutingConfig,
    start: GeoPoint,
    destination: &Destination,
) -> (RouteTier, Vec<GeoPoint>) {
    let end = destination.point;
    let steps = config.containment_steps;

    if let (Some(indoor), Some(name)) = (&data.indoor, destination.name.as_deref()) {
        if let Some(polyline) = indoor_route(indoor, start, name) {
            return (RouteTier::Indoor, polyline);
        }
        debug!("Indoor tier unavailable for '{name}'");
    }

    let bend = bend_for(destination.name.as_deref(), distance_meters(&start, &end));
    let campus = data
        .campus
        .as_ref()
        .filter(|campus| campus.contains(&start) && campus.contains(&end));

    let Some(campus) = campus else {
        return (
            RouteTier::Outdoor,
            bezier_between(&start, &end, bend, config.curve_samples),
        );
    };

    if let Some(paths) = &data.paths {
        if let Some(polyline) = contained_graph_route(paths, campus, start, end, steps) {
            return (RouteTier::PathGraph, polyline);
        }
        debug!("Path graph tier rejected, trying visibility graph");

        let visibility = visibility_graph(campus, paths, start, end, config);
        if let Some(polyline) = contained_graph_route(&visibility, campus, start, end, steps) {
            return (RouteTier::Visibility, polyline);
        }
        debug!("Visibility tier rejected, drawing a curve");
    }

    if campus.contains_segment(&start, &end, steps) {
        return (
            RouteTier::Direct,
            bezier_between(&start, &end, bend, config.curve_samples),
        );
    }
    match campus.centroid() {
        Some(centroid) => (
            RouteTier::CentroidBend,
            curve_through(&[start, centroid, end], bend, config.curve_samples),
        ),
        None => (
            RouteTier::Direct,
            bezier_between(&start, &end, bend, config.curve_samples),
        ),
    }
}

/// Visibility graph seeded with both ends plus path nodes inside `campus`,
/// uniformly thinned to `visibility_max_samples`. Together with the capped
/// boundary samples this keeps the graph at most `2 * max + 2` nodes.
fn visibility_graph(
    campus: &Boundary,
    paths: &NavigationGraph,
    start: GeoPoint,
    end: GeoPoint,
    config: &RoutingConfig,
) -> NavigationGraph {
    let inside: Vec<GeoPoint> = paths
        .nodes()
        .map(|node| node.point)
        .filter(|point| campus.contains(point))
        .collect();
    let mut seeds = vec![start, end];
    seeds.extend(
        decimate(inside.len(), config.visibility_max_samples)
            .into_iter()
            .map(|idx| inside[idx]),
    );
    NavigationGraph::visibility(campus, &seeds, config.visibility_params())
}

fn indoor_route(indoor: &IndoorMap, start: GeoPoint, name: &str) -> Option<Vec<GeoPoint>> {
    if !indoor.floor().contains(&start) {
        return None;
    }
    let (room, goal) = indoor.match_room(name)?;
    let from = indoor.graph().find_nearest_node(&start)?;
    let path = astar_path(indoor.graph(), from, goal)?;
    debug!("Indoor route to '{}' over {} nodes", room.name, path.nodes.len());
    Some(assemble(start, path.points(indoor.graph()), None))
}

/// Snaps both ends to `nav`, searches, and keeps the result only if the
/// whole polyline (including the snapping legs) stays inside `campus`.
fn contained_graph_route(
    nav: &NavigationGraph,
    campus: &Boundary,
    start: GeoPoint,
    end: GeoPoint,
    steps: usize,
) -> Option<Vec<GeoPoint>> {
    let from = nav.find_nearest_node(&start)?;
    let to = nav.find_nearest_node(&end)?;
    let path = astar_path(nav, from, to)?;
    let polyline = assemble(start, path.points(nav), Some(end));

    if campus.contains_polyline(&polyline, steps) {
        Some(polyline)
    } else {
        debug!("Graph route leaves the campus outline, rejecting");
        None
    }
}

fn assemble(start: GeoPoint, middle: Vec<GeoPoint>, end: Option<GeoPoint>) -> Vec<GeoPoint> {
    let mut polyline = Vec::with_capacity(middle.len() + 2);
    polyline.push(start);
    polyline.extend(middle);
    polyline.extend(end);
    polyline.dedup_by(|a, b| planar_distance(a, b) < 1e-12);
    polyline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indoor::IndoorRoom;

    /// Square campus of side 0.01 degrees around (12.91, 74.90).
    fn square_campus() -> Boundary {
        Boundary::new(vec![
            GeoPoint::new(12.905, 74.895),
            GeoPoint::new(12.905, 74.905),
            GeoPoint::new(12.915, 74.905),
            GeoPoint::new(12.915, 74.895),
        ])
    }

    /// L-shaped campus in 0.001 degree units; the notch above (4, 4) is
    /// outside.
    fn l(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(12.90 + lat * 0.001, 74.89 + lon * 0.001)
    }

    fn l_campus() -> Boundary {
        Boundary::new(vec![
            l(0.0, 0.0),
            l(0.0, 10.0),
            l(4.0, 10.0),
            l(4.0, 4.0),
            l(10.0, 4.0),
            l(10.0, 0.0),
        ])
    }

    fn route(data: &CampusData, start: GeoPoint, destination: Destination) -> Route {
        synthesize(data, &RoutingConfig::default(), start, &destination).unwrap()
    }

    #[test]
    fn test_direct_curve_inside_square_campus() {
        let data = CampusData::new().with_campus(square_campus());
        let start = GeoPoint::new(12.9103, 74.8998);
        let library = GeoPoint::new(12.9105, 74.8999);

        let route = route(&data, start, Destination::named("Library", library));

        assert_eq!(route.tier, RouteTier::Direct);
        assert_eq!(route.polyline.first(), Some(&start));
        let straight = distance_meters(&start, &library);
        assert!(route.info.distance_m > 0.0);
        assert!(route.info.distance_m <= straight * 1.15);
        assert!(route.info.advisory.is_none());
        assert_eq!(route.info.eta_minutes, 1);
    }

    #[test]
    fn test_indoor_tier_wins_over_path_graph() {
        let floor = Boundary::new(vec![
            GeoPoint::new(12.9090, 74.8990),
            GeoPoint::new(12.9090, 74.9000),
            GeoPoint::new(12.9100, 74.9000),
            GeoPoint::new(12.9100, 74.8990),
        ]);
        let hall = GeoPoint::new(12.9098, 74.8998);
        let corridor = vec![
            GeoPoint::new(12.9092, 74.8993),
            GeoPoint::new(12.9098, 74.8993),
            hall,
        ];
        let indoor = IndoorMap::new(
            floor,
            vec![IndoorRoom {
                id: "sh".to_string(),
                name: "Seminar Hall".to_string(),
                point: hall,
            }],
            &[corridor],
        );
        let start = GeoPoint::new(12.9092, 74.8992);
        let data = CampusData::new()
            .with_campus(square_campus())
            .with_paths([vec![start, hall]])
            .with_indoor(indoor);

        let route = route(&data, start, Destination::named("seminar hall", hall));

        assert_eq!(route.tier, RouteTier::Indoor);
        assert_eq!(route.polyline.first(), Some(&start));
        assert_eq!(route.polyline.last(), Some(&hall));
        assert_eq!(route.polyline.len(), 4);
    }

    #[test]
    fn test_indoor_tier_needs_start_on_floor() {
        let floor = Boundary::new(vec![
            GeoPoint::new(12.9090, 74.8990),
            GeoPoint::new(12.9090, 74.9000),
            GeoPoint::new(12.9100, 74.9000),
            GeoPoint::new(12.9100, 74.8990),
        ]);
        let hall = GeoPoint::new(12.9098, 74.8998);
        let indoor = IndoorMap::new(
            floor,
            vec![IndoorRoom {
                id: "sh".to_string(),
                name: "Seminar Hall".to_string(),
                point: hall,
            }],
            &[vec![GeoPoint::new(12.9092, 74.8993), hall]],
        );
        let data = CampusData::new().with_campus(square_campus()).with_indoor(indoor);

        let route = route(&data, GeoPoint::new(12.9120, 74.9020), Destination::named("Seminar Hall", hall));
        assert_eq!(route.tier, RouteTier::Direct);
    }

    #[test]
    fn test_path_graph_tier_wins_over_visibility() {
        let start = GeoPoint::new(12.9080, 74.8980);
        let end = GeoPoint::new(12.9120, 74.9020);
        let path = vec![
            GeoPoint::new(12.9081, 74.8981),
            GeoPoint::new(12.9081, 74.9019),
            GeoPoint::new(12.9119, 74.9019),
        ];
        let data = CampusData::new()
            .with_campus(square_campus())
            .with_paths([path.clone()]);

        let route = route(&data, start, Destination::at(end));

        assert_eq!(route.tier, RouteTier::PathGraph);
        let mut expected = vec![start];
        expected.extend(path);
        expected.push(end);
        assert_eq!(route.polyline, expected);
    }

    #[test]
    fn test_shortcut_leaving_campus_is_rejected() {
        let start = l(2.0, 8.0);
        let end = l(8.0, 2.0);
        // The direct edge cuts across the notch; the detour via (3, 3) is legal
        // but longer, so A* on the path graph prefers the shortcut.
        let data = CampusData::new()
            .with_campus(l_campus())
            .with_paths([vec![start, end], vec![start, l(3.0, 3.0), end]]);

        let route = route(&data, start, Destination::at(end));

        assert_eq!(route.tier, RouteTier::Visibility);
        assert_eq!(route.polyline.first(), Some(&start));
        assert_eq!(route.polyline.last(), Some(&end));
        assert!(l_campus().contains_polyline(&route.polyline, 20));
        // The reflex corner is the shortest way round.
        assert!(route.polyline.len() >= 3);
    }

    /// 60 x 60 grid of walkways inside the square campus, plus one line
    /// that runs well off campus.
    fn dense_paths() -> Vec<Vec<GeoPoint>> {
        let at = |i: usize, j: usize| GeoPoint::new(12.906 + i as f64 * 0.00013, 74.896 + j as f64 * 0.00013);
        let mut lines: Vec<Vec<GeoPoint>> = (0..60).map(|i| (0..60).map(|j| at(i, j)).collect()).collect();
        lines.extend((0..60).map(|j| (0..60).map(|i| at(i, j)).collect::<Vec<_>>()));
        lines.push(vec![at(0, 0), GeoPoint::new(12.92, 74.92), GeoPoint::new(12.93, 74.93)]);
        lines
    }

    #[test]
    fn test_visibility_graph_stays_bounded_for_dense_paths() {
        let campus = square_campus();
        let paths = NavigationGraph::from_lines(dense_paths());
        assert!(paths.node_count() > 3600);
        let config = RoutingConfig {
            visibility_max_samples: 50,
            ..Default::default()
        };

        let nav = visibility_graph(&campus, &paths, GeoPoint::new(12.9055, 74.8955), GeoPoint::new(12.91, 74.90), &config);

        assert!(nav.node_count() <= 2 * config.visibility_max_samples + 2);
        for node in nav.nodes() {
            assert!(campus.contains(&node.point));
        }
    }

    #[test]
    fn test_dense_disconnected_paths_fall_back_to_visibility() {
        let start = GeoPoint::new(12.9055, 74.8955);
        let end = GeoPoint::new(12.9100, 74.9000);
        let mut lines = dense_paths();
        // Isolated stub next to the start, so the path graph has no route.
        lines.push(vec![GeoPoint::new(12.90545, 74.89545), GeoPoint::new(12.90555, 74.89545)]);
        let data = CampusData::new().with_campus(square_campus()).with_paths(&lines);
        let config = RoutingConfig {
            visibility_max_samples: 60,
            ..Default::default()
        };

        let route = synthesize(&data, &config, start, &Destination::at(end)).unwrap();

        assert_eq!(route.tier, RouteTier::Visibility);
        assert_eq!(route.polyline, vec![start, end]);
    }

    #[test]
    fn test_centroid_bend_when_straight_line_leaves_campus() {
        let start = l(2.0, 8.0);
        let end = l(8.0, 2.0);
        let data = CampusData::new().with_campus(l_campus());

        let route = route(&data, start, Destination::named("Auditorium", end));

        assert_eq!(route.tier, RouteTier::CentroidBend);
        let centroid = l_campus().centroid().unwrap();
        let joint = route.polyline[RoutingConfig::default().curve_samples];
        assert!(planar_distance(&joint, &centroid) < 1e-12);
        let advisory = route.info.advisory.unwrap_or_default();
        assert!(!advisory.contains("outdoor"));
    }

    #[test]
    fn test_outdoor_fallback_carries_advisory() {
        let start = GeoPoint::new(12.9103, 74.8998);
        let end = GeoPoint::new(12.9200, 74.9100);

        let no_data = route(&CampusData::new(), start, Destination::at(end));
        assert_eq!(no_data.tier, RouteTier::Outdoor);
        assert!(no_data.info.advisory.as_deref().unwrap().contains("outdoor"));

        let half_inside = route(
            &CampusData::new().with_campus(square_campus()),
            start,
            Destination::at(end),
        );
        assert_eq!(half_inside.tier, RouteTier::Outdoor);
        assert!(half_inside.info.advisory.is_some());
    }

    #[test]
    fn test_long_route_suggests_transport() {
        let start = GeoPoint::new(12.9000, 74.9000);
        let end = GeoPoint::new(12.9200, 74.9000);
        let route = route(&CampusData::new(), start, Destination::at(end));

        let advisory = route.info.advisory.unwrap();
        assert!(advisory.contains("alternate transport"));
        assert!(route.info.distance_m > 2_000.0);
        let expected_eta = (route.info.distance_m / 1.4 / 60.0).ceil() as u32;
        assert_eq!(route.info.eta_minutes, expected_eta);
        assert_eq!(route.info.distance_km, (route.info.distance_m / 10.0).round() / 100.0);
    }

    #[test]
    fn test_invalid_and_degenerate_requests() {
        let data = CampusData::new().with_campus(square_campus());
        let config = RoutingConfig::default();
        let start = GeoPoint::new(12.9103, 74.8998);

        let err = synthesize(&data, &config, GeoPoint::new(f64::NAN, 74.0), &Destination::at(start)).unwrap_err();
        assert!(matches!(err, Error::InvalidCoordinate(_)));

        let err = synthesize(&data, &config, start, &Destination::at(GeoPoint::new(12.0, 200.0))).unwrap_err();
        assert!(matches!(err, Error::InvalidCoordinate(_)));

        let err = synthesize(&data, &config, start, &Destination::at(start)).unwrap_err();
        assert!(matches!(err, Error::NoRoute(_)));
    }

    #[test]
    fn test_malformed_data_disables_tiers() {
        let data = CampusData::new()
            .with_campus(Boundary::new(vec![GeoPoint::new(12.9, 74.9)]))
            .with_paths(Vec::<Vec<GeoPoint>>::new());
        assert!(data.campus.is_none());
        assert!(data.paths.is_none());

        let route = route(
            &data,
            GeoPoint::new(12.9103, 74.8998),
            Destination::at(GeoPoint::new(12.9105, 74.8999)),
        );
        assert_eq!(route.tier, RouteTier::Outdoor);
    }
}
