use std::collections::HashMap;
use std::fmt;

use itertools::Itertools;
use log::{debug, info};
use petgraph::graph::{NodeIndex, UnGraph};

use crate::geometry::{Boundary, GeoPoint, planar_distance, point_in_polygon, segment_fully_inside};

/// Decimal places kept when merging coincident vertices (about 0.1 m).
pub const COORDINATE_PRECISION: i32 = 6;

/// Stable node identifier: the coordinate rounded to [`COORDINATE_PRECISION`]
/// decimal degrees. Two vertices that round to the same value are one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    lat: i64,
    lon: i64,
}

impl NodeId {
    pub fn from_point(point: &GeoPoint) -> Self {
        let scale = 10f64.powi(COORDINATE_PRECISION);
        Self {
            lat: (point.lat * scale).round() as i64,
            lon: (point.lon * scale).round() as i64,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = 10f64.powi(COORDINATE_PRECISION);
        write!(
            f,
            "{:.6},{:.6}",
            self.lat as f64 / scale,
            self.lon as f64 / scale
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GeoNode {
    pub id: NodeId,
    pub point: GeoPoint,
}

#[derive(Debug, Clone, Copy)]
pub struct WalkEdge {
    /// Planar distance between the endpoints, in degrees.
    pub distance: f64,
}

/// Tuning for [`NavigationGraph::visibility`].
#[derive(Debug, Clone, Copy)]
pub struct VisibilityParams {
    /// Upper bound on boundary vertices turned into nodes.
    pub max_samples: usize,
    /// Samples per candidate edge in the containment check.
    pub steps: usize,
    /// How far (degrees) boundary vertices are pushed into the interior.
    pub vertex_inset: f64,
}

impl Default for VisibilityParams {
    fn default() -> Self {
        Self {
            max_samples: 300,
            steps: crate::geometry::DEFAULT_CONTAINMENT_STEPS,
            vertex_inset: 1e-6,
        }
    }
}

/// Undirected walking graph. Every edge joins two distinct nodes and has a
/// strictly positive weight.
#[derive(Debug, Clone, Default)]
pub struct NavigationGraph {
    pub graph: UnGraph<GeoNode, WalkEdge>,
    index: HashMap<NodeId, NodeIndex>,
}

impl NavigationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from path polylines. Consecutive vertices of each line
    /// become edges; vertices shared between lines merge into one node.
    pub fn from_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[GeoPoint]>,
    {
        let mut nav = Self::new();
        for line in lines {
            nav.add_line(line.as_ref());
        }
        info!(
            "Path graph built: {} nodes, {} edges",
            nav.node_count(),
            nav.edge_count()
        );
        nav
    }

    /// Builds a visibility graph inside `boundary`: nodes are a uniform
    /// subsample of its vertices (nudged inward) plus `extra_points`, and any
    /// two nodes whose connecting segment stays inside are joined.
    pub fn visibility(boundary: &Boundary, extra_points: &[GeoPoint], params: VisibilityParams) -> Self {
        let mut nav = Self::new();
        if !boundary.is_valid() {
            return nav;
        }

        let ring = boundary.vertices();
        for idx in decimate(ring.len(), params.max_samples) {
            let prev = ring[(idx + ring.len() - 1) % ring.len()];
            let next = ring[(idx + 1) % ring.len()];
            if let Some(point) = inset_vertex(&prev, &ring[idx], &next, params.vertex_inset, ring) {
                nav.add_node(point);
            }
        }
        for point in extra_points {
            nav.add_node(*point);
        }

        let candidates: Vec<GeoNode> = nav.graph.node_weights().copied().collect();
        for (a, b) in candidates.iter().tuple_combinations() {
            if segment_fully_inside(&a.point, &b.point, ring, params.steps) {
                // Pairs of distinct nodes are unique here, no duplicate scan needed.
                nav.insert_edge(a.id, b.id);
            }
        }

        debug!(
            "Visibility graph built: {} nodes, {} edges",
            nav.node_count(),
            nav.edge_count()
        );
        nav
    }

    /// Adds every consecutive pair of `line` as an edge. Returns the number
    /// of edges actually inserted.
    pub fn add_line(&mut self, line: &[GeoPoint]) -> usize {
        let mut added = 0;
        for (a, b) in line.iter().tuple_windows() {
            let id_a = self.add_node(*a);
            let id_b = self.add_node(*b);
            if self.add_edge(id_a, id_b) {
                added += 1;
            }
        }
        added
    }

    /// Inserts a node for `point`, or returns the existing node it rounds to.
    pub fn add_node(&mut self, point: GeoPoint) -> NodeId {
        let id = NodeId::from_point(&point);
        let graph = &mut self.graph;
        self.index
            .entry(id)
            .or_insert_with(|| graph.add_node(GeoNode { id, point }));
        id
    }

    /// Joins two existing, distinct nodes. Self-loops, zero-length edges and
    /// duplicates are refused.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        let (Some(&idx_a), Some(&idx_b)) = (self.index.get(&a), self.index.get(&b)) else {
            return false;
        };
        if idx_a == idx_b || self.graph.find_edge(idx_a, idx_b).is_some() {
            return false;
        }
        self.insert_edge_at(idx_a, idx_b)
    }

    /// Like [`add_edge`](Self::add_edge) but without the duplicate check;
    /// the caller guarantees the pair is new.
    fn insert_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        match (self.node_index(a), self.node_index(b)) {
            (Some(idx_a), Some(idx_b)) if idx_a != idx_b => self.insert_edge_at(idx_a, idx_b),
            _ => false,
        }
    }

    fn insert_edge_at(&mut self, idx_a: NodeIndex, idx_b: NodeIndex) -> bool {
        let distance = planar_distance(&self.graph[idx_a].point, &self.graph[idx_b].point);
        if distance <= 0.0 {
            return false;
        }
        self.graph.add_edge(idx_a, idx_b, WalkEdge { distance });
        true
    }

    pub fn node_index(&self, id: NodeId) -> Option<NodeIndex> {
        self.index.get(&id).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&GeoNode> {
        self.node_index(id).map(|idx| &self.graph[idx])
    }

    pub fn point(&self, id: NodeId) -> Option<GeoPoint> {
        self.node(id).map(|node| node.point)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GeoNode> {
        self.graph.node_weights()
    }

    /// Weight of the edge between `a` and `b`, if they are adjacent.
    pub fn edge_weight(&self, a: NodeId, b: NodeId) -> Option<f64> {
        let edge = self.graph.find_edge(self.node_index(a)?, self.node_index(b)?)?;
        Some(self.graph[edge].distance)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Linear scan for the node closest to `point` in the planar metric.
    pub fn find_nearest_node(&self, point: &GeoPoint) -> Option<NodeId> {
        self.graph
            .node_weights()
            .min_by(|a, b| {
                let da = planar_distance(&a.point, point);
                let db = planar_distance(&b.point, point);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|node| node.id)
    }

    /// Coordinates of a node sequence; unknown ids are skipped.
    pub fn points_of(&self, ids: &[NodeId]) -> Vec<GeoPoint> {
        ids.iter().filter_map(|&id| self.point(id)).collect()
    }
}

/// Evenly spread indices, at most `max` of them, out of `len`.
pub(crate) fn decimate(len: usize, max: usize) -> Vec<usize> {
    if len <= max {
        return (0..len).collect();
    }
    (0..max).map(|i| i * len / max).collect()
}

/// Moves a boundary vertex `eps` degrees along its angle bisector, toward
/// whichever side is inside the ring. `None` when neither side is.
fn inset_vertex(prev: &GeoPoint, vertex: &GeoPoint, next: &GeoPoint, eps: f64, ring: &[GeoPoint]) -> Option<GeoPoint> {
    let unit = |p: &GeoPoint| {
        let (dx, dy) = (p.lon - vertex.lon, p.lat - vertex.lat);
        let len = dx.hypot(dy);
        if len > 0.0 { (dx / len, dy / len) } else { (0.0, 0.0) }
    };
    let (ax, ay) = unit(prev);
    let (bx, by) = unit(next);

    let (mut dx, mut dy) = (ax + bx, ay + by);
    let len = dx.hypot(dy);
    if len < 1e-12 {
        // Straight angle: step perpendicular to the edge instead.
        (dx, dy) = (-ay, ax);
    } else {
        (dx, dy) = (dx / len, dy / len);
    }

    [1.0, -1.0]
        .into_iter()
        .map(|sign| GeoPoint::new(vertex.lat + sign * eps * dy, vertex.lon + sign * eps * dx))
        .find(|candidate| point_in_polygon(candidate, ring))
}
