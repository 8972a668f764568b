//! A* shortest path over a [`NavigationGraph`].

use log::trace;
use petgraph::algo::astar;

use crate::geometry::{GeoPoint, planar_distance};
use crate::graph::{NavigationGraph, NodeId};

/// A node sequence from start to goal, both inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphPath {
    pub nodes: Vec<NodeId>,
    /// Sum of edge weights along `nodes`.
    pub cost: f64,
}

impl GraphPath {
    pub fn points(&self, nav: &NavigationGraph) -> Vec<GeoPoint> {
        nav.points_of(&self.nodes)
    }
}

/// Minimum-cost path between two nodes, or `None` if either id is unknown
/// or the goal is unreachable.
///
/// The heuristic is the planar distance to the goal. Edge weights use the
/// same metric, so it never overestimates and the first time the goal is
/// settled its cost is optimal.
pub fn astar_path(nav: &NavigationGraph, start: NodeId, goal: NodeId) -> Option<GraphPath> {
    let start_idx = nav.node_index(start)?;
    let goal_idx = nav.node_index(goal)?;
    let goal_point = nav.graph[goal_idx].point;

    let (cost, indices) = astar(
        &nav.graph,
        start_idx,
        |finish| finish == goal_idx,
        |e| e.weight().distance,
        |n| planar_distance(&nav.graph[n].point, &goal_point),
    )?;

    trace!("A* {start} -> {goal}: {} nodes, cost {cost:.8}", indices.len());
    Some(GraphPath {
        nodes: indices.into_iter().map(|idx| nav.graph[idx].id).collect(),
        cost,
    })
}
