//! Waypoints and their outgoing edges

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Index of a waypoint inside its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaypointId(pub u32);

impl WaypointId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for WaypointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A traversable connection to a neighboring waypoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: WaypointId,
    pub cost: f32,
}

/// A named navigable point. Owned by a [`crate::WaypointGraph`].
#[derive(Debug, Clone)]
pub struct Waypoint {
    pub(crate) id: WaypointId,
    pub(crate) name: String,
    pub(crate) position: Vec3,
    pub(crate) edges: Vec<Edge>,
}

impl Waypoint {
    pub fn id(&self) -> WaypointId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Ids of all waypoints directly reachable from this one
    pub fn neighbors(&self) -> impl Iterator<Item = WaypointId> + '_ {
        self.edges.iter().map(|e| e.to)
    }

    pub fn is_connected_to(&self, other: WaypointId) -> bool {
        self.edges.iter().any(|e| e.to == other)
    }

    /// Insert an edge, or replace the cost of an existing one
    pub(crate) fn upsert_edge(&mut self, to: WaypointId, cost: f32) {
        match self.edges.iter_mut().find(|e| e.to == to) {
            Some(edge) => edge.cost = cost,
            None => self.edges.push(Edge { to, cost }),
        }
    }
}
