//! Planar and geographic primitives shared by the graph builders and the
//! route synthesizer.
//!
//! Two metrics live here and they are not interchangeable:
//! - [`planar_distance`] measures in raw coordinate degrees and weights graph
//!   edges (only ever compared within one graph).
//! - [`distance_meters`] is the haversine distance used for anything shown to
//!   a user.

use geo::prelude::*;
use geo::{Coord, LineString, Point, Polygon};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Default number of sub-segments sampled by [`segment_fully_inside`].
pub const DEFAULT_CONTAINMENT_STEPS: usize = 20;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Finite and within the WGS84 latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Linear interpolation in coordinate space, `t` in `[0, 1]`.
    pub fn lerp(&self, other: &GeoPoint, t: f64) -> GeoPoint {
        GeoPoint {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }

    pub fn to_geo(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(p: Point<f64>) -> Self {
        GeoPoint::new(p.y(), p.x())
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(p: GeoPoint) -> Self {
        Coord { x: p.lon, y: p.lat }
    }
}

/// Euclidean distance in coordinate-degree space.
pub fn planar_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    a.to_geo().euclidean_distance(&b.to_geo())
}

/// Great-circle distance in meters.
pub fn distance_meters(a: &GeoPoint, b: &GeoPoint) -> f64 {
    a.to_geo().haversine_distance(&b.to_geo())
}

/// Sum of the haversine lengths of consecutive segments.
pub fn polyline_length_meters(points: &[GeoPoint]) -> f64 {
    points
        .iter()
        .tuple_windows()
        .map(|(a, b)| distance_meters(a, b))
        .sum()
}

/// Ray-casting containment test. Points exactly on an edge may land on
/// either side, but consistently so. Fewer than three vertices is never a
/// polygon and contains nothing.
pub fn point_in_polygon(point: &GeoPoint, polygon: &[GeoPoint]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let (x, y) = (point.lon, point.lat);
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = (polygon[i].lon, polygon[i].lat);
        let (xj, yj) = (polygon[j].lon, polygon[j].lat);
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Samples `steps + 1` evenly spaced points from `a` to `b` (endpoints
/// included) and requires every one of them to be inside `polygon`.
///
/// This is an approximation: on a sharply concave boundary a segment can
/// leave and re-enter the polygon between two samples.
pub fn segment_fully_inside(a: &GeoPoint, b: &GeoPoint, polygon: &[GeoPoint], steps: usize) -> bool {
    let steps = steps.max(1);
    (0..=steps).all(|i| {
        let t = i as f64 / steps as f64;
        point_in_polygon(&a.lerp(b, t), polygon)
    })
}

/// Every consecutive segment of `points` passes [`segment_fully_inside`].
pub fn polyline_fully_inside(points: &[GeoPoint], polygon: &[GeoPoint], steps: usize) -> bool {
    points
        .iter()
        .tuple_windows()
        .all(|(a, b)| segment_fully_inside(a, b, polygon, steps))
}

/// A closed campus or floor outline. The closing vertex is implicit; a
/// repeated first vertex at the end of the input is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    ring: Vec<GeoPoint>,
}

impl Boundary {
    pub fn new(mut ring: Vec<GeoPoint>) -> Self {
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        Self { ring }
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        &self.ring
    }

    /// At least three vertices, all with usable coordinates.
    pub fn is_valid(&self) -> bool {
        self.ring.len() >= 3 && self.ring.iter().all(GeoPoint::is_valid)
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        point_in_polygon(point, &self.ring)
    }

    pub fn contains_segment(&self, a: &GeoPoint, b: &GeoPoint, steps: usize) -> bool {
        segment_fully_inside(a, b, &self.ring, steps)
    }

    pub fn contains_polyline(&self, points: &[GeoPoint], steps: usize) -> bool {
        polyline_fully_inside(points, &self.ring, steps)
    }

    /// Area centroid of the outline.
    pub fn centroid(&self) -> Option<GeoPoint> {
        if !self.is_valid() {
            return None;
        }
        let exterior: LineString<f64> = self.ring.iter().map(|&p| Coord::from(p)).collect();
        Polygon::new(exterior, vec![]).centroid().map(GeoPoint::from)
    }
}
