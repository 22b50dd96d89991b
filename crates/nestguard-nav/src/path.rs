//! Paths returned by the pathfinder and the cursor agents use to walk them

use glam::Vec3;
use nestguard_core::planar_distance;

use crate::waypoint::WaypointId;

/// An ordered route through the graph, inclusive of both endpoints.
///
/// `points` are the world positions to steer through: one per node, plus the
/// raw goal point when the query's goal was an off-graph position.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    nodes: Vec<WaypointId>,
    points: Vec<Vec3>,
    cost: f32,
}

impl Path {
    pub(crate) fn new(nodes: Vec<WaypointId>, points: Vec<Vec3>, cost: f32) -> Self {
        Self {
            nodes,
            points,
            cost,
        }
    }

    pub fn nodes(&self) -> &[WaypointId] {
        &self.nodes
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Sum of the edge costs along the graph portion of the path
    pub fn cost(&self) -> f32 {
        self.cost
    }

    pub fn start(&self) -> Option<WaypointId> {
        self.nodes.first().copied()
    }

    pub fn goal(&self) -> Option<WaypointId> {
        self.nodes.last().copied()
    }

    /// Number of graph nodes on the path
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Length of the polyline through all steering points
    pub fn polyline_length(&self) -> f32 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// Progress along a [`Path`].
///
/// The path itself is never modified; the cursor only moves an index.
#[derive(Debug, Clone)]
pub struct PathCursor {
    path: Path,
    next: usize,
}

impl PathCursor {
    pub fn new(path: Path) -> Self {
        Self { path, next: 0 }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The point the agent should currently steer toward
    pub fn current_target(&self) -> Option<Vec3> {
        self.path.points.get(self.next).copied()
    }

    /// Last steering point of the path
    pub fn final_point(&self) -> Option<Vec3> {
        self.path.points.last().copied()
    }

    /// Steering points not yet reached
    pub fn remaining(&self) -> &[Vec3] {
        &self.path.points[self.next.min(self.path.points.len())..]
    }

    /// Index of the next steering point
    pub fn index(&self) -> usize {
        self.next
    }

    pub fn is_complete(&self) -> bool {
        self.next >= self.path.points.len()
    }

    /// Skip the current steering point
    pub fn advance(&mut self) {
        if self.next < self.path.points.len() {
            self.next += 1;
        }
    }

    /// Consume every leading point within `tolerance` of `position` (ground
    /// plane distance). Returns how many points were consumed.
    pub fn advance_within(&mut self, position: Vec3, tolerance: f32) -> usize {
        let mut consumed = 0;
        while let Some(target) = self.current_target() {
            if planar_distance(position, target) >= tolerance {
                break;
            }
            self.next += 1;
            consumed += 1;
        }
        consumed
    }

    pub fn into_path(self) -> Path {
        self.path
    }
}
