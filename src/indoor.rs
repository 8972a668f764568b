//! Indoor floor plan: an outline, named rooms and the corridor graph joining them.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::geometry::{Boundary, GeoPoint, planar_distance};
use crate::graph::{NavigationGraph, NodeId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndoorRoom {
    pub id: String,
    pub name: String,
    pub point: GeoPoint,
}

#[derive(Debug, Clone)]
pub struct IndoorMap {
    floor: Boundary,
    graph: NavigationGraph,
    rooms: Vec<(IndoorRoom, NodeId)>,
}

impl IndoorMap {
    /// Builds the corridor graph and attaches every room to it. A room that
    /// is not already a corridor vertex gets one edge to the nearest other
    /// node.
    pub fn new<L: AsRef<[GeoPoint]>>(floor: Boundary, rooms: Vec<IndoorRoom>, corridors: &[L]) -> Self {
        let mut graph = NavigationGraph::from_lines(corridors);
        let mut attached = Vec::with_capacity(rooms.len());

        for room in rooms {
            let id = graph.add_node(room.point);
            let isolated = graph
                .node_index(id)
                .is_some_and(|idx| graph.graph.neighbors(idx).next().is_none());
            if isolated {
                let nearest = graph
                    .nodes()
                    .filter(|node| node.id != id)
                    .min_by(|a, b| {
                        let da = planar_distance(&a.point, &room.point);
                        let db = planar_distance(&b.point, &room.point);
                        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .map(|node| node.id);
                if let Some(nearest) = nearest {
                    graph.add_edge(id, nearest);
                    debug!("Linked room '{}' to corridor node {nearest}", room.name);
                }
            }
            attached.push((room, id));
        }

        info!(
            "Indoor map built: {} rooms, {} nodes, {} edges",
            attached.len(),
            graph.node_count(),
            graph.edge_count()
        );
        Self {
            floor,
            graph,
            rooms: attached,
        }
    }

    pub fn floor(&self) -> &Boundary {
        &self.floor
    }

    pub fn graph(&self) -> &NavigationGraph {
        &self.graph
    }

    pub fn rooms(&self) -> impl Iterator<Item = &IndoorRoom> {
        self.rooms.iter().map(|(room, _)| room)
    }

    /// Finds the room a destination query refers to: an exact
    /// (case-insensitive) name or id first, then a room whose name contains
    /// the query, then a room whose name the query contains.
    pub fn match_room(&self, query: &str) -> Option<(&IndoorRoom, NodeId)> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        let found = self
            .rooms
            .iter()
            .find(|(room, _)| room.name.to_lowercase() == query || room.id.to_lowercase() == query)
            .or_else(|| {
                self.rooms
                    .iter()
                    .find(|(room, _)| room.name.to_lowercase().contains(&query))
            })
            .or_else(|| {
                self.rooms.iter().find(|(room, _)| {
                    let name = room.name.to_lowercase();
                    !name.is_empty() && query.contains(&name)
                })
            });
        found.map(|(room, id)| (room, *id))
    }
}
