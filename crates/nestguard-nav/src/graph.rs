//! Waypoint graph: the navigable topology of one level area

use std::collections::HashMap;

use glam::Vec3;
use nestguard_core::ensure_finite;
use serde::{Deserialize, Serialize};

use crate::data::WaypointGraphData;
use crate::error::NavError;
use crate::path::Path;
use crate::search::{Endpoint, PathSearch};
use crate::waypoint::{Edge, Waypoint, WaypointId};

/// How `connect` prices an edge
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostModel {
    /// Cost is the straight-line distance between the two waypoints
    #[default]
    Euclidean,
    /// Every edge costs the same fixed amount
    Uniform(f32),
}

/// Waypoints plus their adjacency.
///
/// Waypoints are added once at level load and never move afterwards.
#[derive(Debug, Clone)]
pub struct WaypointGraph {
    waypoints: Vec<Waypoint>,
    by_name: HashMap<String, WaypointId>,
    cost_model: CostModel,
    /// Smallest cost/length ratio seen on any edge, capped at 1.0.
    /// Scaling the straight-line heuristic by it keeps A* admissible.
    heuristic_scale: f32,
    edge_count: usize,
}

impl Default for WaypointGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl WaypointGraph {
    pub fn new() -> Self {
        Self::with_cost_model(CostModel::Euclidean)
    }

    pub fn with_cost_model(cost_model: CostModel) -> Self {
        Self {
            waypoints: Vec::new(),
            by_name: HashMap::new(),
            cost_model,
            heuristic_scale: 1.0,
            edge_count: 0,
        }
    }

    /// Build a graph from its serialized description
    pub fn from_data(data: &WaypointGraphData) -> Result<Self, NavError> {
        let mut graph = Self::with_cost_model(data.cost_model);

        for wp in &data.waypoints {
            graph.add_named_waypoint(wp.name.clone(), wp.position)?;
        }

        for edge in &data.edges {
            let from = graph.require_name(&edge.from)?;
            let to = graph.require_name(&edge.to)?;
            match (edge.cost, edge.one_way) {
                (Some(cost), false) => graph.connect_with_cost(from, to, cost)?,
                (Some(cost), true) => graph.connect_directed_with_cost(from, to, cost)?,
                (None, false) => graph.connect(from, to)?,
                (None, true) => graph.connect_directed(from, to)?,
            }
        }

        Ok(graph)
    }

    fn require_name(&self, name: &str) -> Result<WaypointId, NavError> {
        self.id_by_name(name)
            .ok_or_else(|| NavError::UnknownWaypointName(name.to_string()))
    }

    // ---- Construction ----

    /// Register a new waypoint named `wp{id}`, or `wp{id}-{n}` when a named
    /// waypoint already holds that name. Non-finite coordinates are rejected.
    pub fn add_waypoint(&mut self, position: Vec3) -> Result<WaypointId, NavError> {
        let position = ensure_finite(position)?;
        let id = self.next_id();
        let mut name = format!("wp{}", id.0);
        let mut n = 1;
        while self.by_name.contains_key(&name) {
            name = format!("wp{}-{n}", id.0);
            n += 1;
        }
        self.by_name.insert(name.clone(), id);
        self.waypoints.push(Waypoint {
            id,
            name,
            position,
            edges: Vec::new(),
        });
        Ok(id)
    }

    /// Register a new waypoint under a unique name
    pub fn add_named_waypoint(
        &mut self,
        name: impl Into<String>,
        position: Vec3,
    ) -> Result<WaypointId, NavError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(NavError::DuplicateWaypointName(name));
        }
        let position = ensure_finite(position)?;
        let id = self.next_id();
        self.by_name.insert(name.clone(), id);
        self.waypoints.push(Waypoint {
            id,
            name,
            position,
            edges: Vec::new(),
        });
        Ok(id)
    }

    fn next_id(&self) -> WaypointId {
        WaypointId(self.waypoints.len() as u32)
    }

    /// Connect two waypoints in both directions, priced by the graph's cost model
    pub fn connect(&mut self, a: WaypointId, b: WaypointId) -> Result<(), NavError> {
        let cost = self.model_cost(a, b)?;
        self.connect_with_cost(a, b, cost)
    }

    /// Add a one-way edge from `a` to `b`, priced by the graph's cost model
    pub fn connect_directed(&mut self, a: WaypointId, b: WaypointId) -> Result<(), NavError> {
        let cost = self.model_cost(a, b)?;
        self.connect_directed_with_cost(a, b, cost)
    }

    /// Connect two waypoints in both directions with an explicit cost
    pub fn connect_with_cost(
        &mut self,
        a: WaypointId,
        b: WaypointId,
        cost: f32,
    ) -> Result<(), NavError> {
        self.connect_directed_with_cost(a, b, cost)?;
        self.connect_directed_with_cost(b, a, cost)
    }

    /// Add a one-way edge with an explicit cost
    pub fn connect_directed_with_cost(
        &mut self,
        a: WaypointId,
        b: WaypointId,
        cost: f32,
    ) -> Result<(), NavError> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(NavError::InvalidCost(cost));
        }
        let length = self.position(a)?.distance(self.position(b)?);

        let from = &mut self.waypoints[a.index()];
        let existed = from.is_connected_to(b);
        from.upsert_edge(b, cost);
        if !existed {
            self.edge_count += 1;
        }

        if length > f32::EPSILON {
            self.heuristic_scale = self.heuristic_scale.min(cost / length);
        }
        Ok(())
    }

    fn model_cost(&self, a: WaypointId, b: WaypointId) -> Result<f32, NavError> {
        let pa = self.position(a)?;
        let pb = self.position(b)?;
        Ok(match self.cost_model {
            CostModel::Euclidean => pa.distance(pb),
            CostModel::Uniform(cost) => cost,
        })
    }

    // ---- Queries ----

    pub fn get(&self, id: WaypointId) -> Result<&Waypoint, NavError> {
        self.waypoints
            .get(id.index())
            .ok_or(NavError::InvalidWaypointReference(id))
    }

    pub fn position(&self, id: WaypointId) -> Result<Vec3, NavError> {
        self.get(id).map(Waypoint::position)
    }

    pub fn edges(&self, id: WaypointId) -> Result<&[Edge], NavError> {
        self.get(id).map(Waypoint::edges)
    }

    pub fn id_by_name(&self, name: &str) -> Option<WaypointId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, id: WaypointId) -> bool {
        id.index() < self.waypoints.len()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Number of directed edges
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn cost_model(&self) -> CostModel {
        self.cost_model
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }

    /// Nearest waypoint to an arbitrary point. Ties go to the lowest id.
    pub fn nearest(&self, point: Vec3) -> Option<WaypointId> {
        self.nearest_where(point, |_| true)
    }

    /// Nearest waypoint satisfying `accept`
    pub fn nearest_where(
        &self,
        point: Vec3,
        mut accept: impl FnMut(&Waypoint) -> bool,
    ) -> Option<WaypointId> {
        let mut best: Option<(WaypointId, f32)> = None;
        for wp in &self.waypoints {
            let dist = wp.position.distance_squared(point);
            if best.is_some_and(|(_, d)| dist >= d) {
                continue;
            }
            if accept(wp) {
                best = Some((wp.id, dist));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Admissible estimate of the remaining cost between two positions
    pub fn heuristic(&self, from: Vec3, to: Vec3) -> f32 {
        from.distance(to) * self.heuristic_scale.clamp(0.0, 1.0)
    }

    /// Total cost of walking `nodes` in order, or `None` if two consecutive
    /// nodes are not connected
    pub fn path_cost(&self, nodes: &[WaypointId]) -> Result<Option<f32>, NavError> {
        let mut total = 0.0;
        for pair in nodes.windows(2) {
            let edge = self.edges(pair[0])?.iter().find(|e| e.to == pair[1]);
            match edge {
                Some(edge) => total += edge.cost,
                None => return Ok(None),
            }
        }
        Ok(Some(total))
    }

    // ---- Pathfinding ----

    /// Least-cost path between two endpoints using A*.
    ///
    /// Point endpoints snap to their nearest waypoint. Returns `Ok(None)`
    /// when the goal cannot be reached (including on an empty graph).
    pub fn find_path(
        &self,
        start: impl Into<Endpoint>,
        goal: impl Into<Endpoint>,
    ) -> Result<Option<Path>, NavError> {
        PathSearch::new(self, start.into(), goal.into())?.run(self)
    }

    /// Like [`Self::find_path`], but point endpoints prefer waypoints for
    /// which `visible(point, waypoint_position)` holds
    pub fn find_path_visible(
        &self,
        start: impl Into<Endpoint>,
        goal: impl Into<Endpoint>,
        visible: impl Fn(Vec3, Vec3) -> bool,
    ) -> Result<Option<Path>, NavError> {
        PathSearch::with_visibility(self, start.into(), goal.into(), &visible)?.run(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> (WaypointGraph, [WaypointId; 4]) {
        let mut g = WaypointGraph::new();
        let a = g.add_waypoint(Vec3::new(0.0, 0.0, 0.0)).unwrap();
        let b = g.add_waypoint(Vec3::new(10.0, 0.0, 0.0)).unwrap();
        let c = g.add_waypoint(Vec3::new(10.0, 10.0, 0.0)).unwrap();
        let d = g.add_waypoint(Vec3::new(0.0, 10.0, 0.0)).unwrap();
        (g, [a, b, c, d])
    }

    #[test]
    fn test_add_rejects_non_finite() {
        let mut g = WaypointGraph::new();
        let err = g.add_waypoint(Vec3::new(f32::NAN, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, NavError::NonFinitePosition(_)));
        assert!(g.is_empty());
    }

    #[test]
    fn test_connect_is_bidirectional_euclidean() {
        let (mut g, [a, b, _, _]) = square();
        g.connect(a, b).unwrap();
        assert_eq!(g.edges(a).unwrap(), &[Edge { to: b, cost: 10.0 }]);
        assert_eq!(g.edges(b).unwrap(), &[Edge { to: a, cost: 10.0 }]);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_connect_unknown_waypoint() {
        let (mut g, [a, ..]) = square();
        let err = g.connect(a, WaypointId(99)).unwrap_err();
        assert_eq!(err, NavError::InvalidWaypointReference(WaypointId(99)));
    }

    #[test]
    fn test_reconnect_does_not_duplicate() {
        let (mut g, [a, b, _, _]) = square();
        g.connect(a, b).unwrap();
        g.connect_with_cost(a, b, 4.0).unwrap();
        assert_eq!(g.edges(a).unwrap().len(), 1);
        assert_eq!(g.edges(a).unwrap()[0].cost, 4.0);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_invalid_cost() {
        let (mut g, [a, b, _, _]) = square();
        assert_eq!(
            g.connect_with_cost(a, b, -1.0),
            Err(NavError::InvalidCost(-1.0))
        );
    }

    #[test]
    fn test_uniform_cost_model() {
        let mut g = WaypointGraph::with_cost_model(CostModel::Uniform(1.0));
        let a = g.add_waypoint(Vec3::ZERO).unwrap();
        let b = g.add_waypoint(Vec3::new(50.0, 0.0, 0.0)).unwrap();
        g.connect(a, b).unwrap();
        assert_eq!(g.edges(a).unwrap()[0].cost, 1.0);
        // heuristic must not exceed the cheap edge cost
        assert!(g.heuristic(Vec3::ZERO, Vec3::new(50.0, 0.0, 0.0)) <= 1.0);
    }

    #[test]
    fn test_named_waypoints() {
        let mut g = WaypointGraph::new();
        let door = g.add_named_waypoint("door", Vec3::ZERO).unwrap();
        assert_eq!(g.id_by_name("door"), Some(door));
        assert_eq!(g.get(door).unwrap().name(), "door");
        assert_eq!(
            g.add_named_waypoint("door", Vec3::ONE),
            Err(NavError::DuplicateWaypointName("door".into()))
        );
        let anon = g.add_waypoint(Vec3::ONE).unwrap();
        assert_eq!(g.get(anon).unwrap().name(), "wp1");
        assert_eq!(g.id_by_name("wp1"), Some(anon));
    }

    #[test]
    fn test_generated_names_avoid_taken_ones() {
        let mut g = WaypointGraph::new();
        let named = g.add_named_waypoint("wp1", Vec3::ZERO).unwrap();
        let anon = g.add_waypoint(Vec3::ONE).unwrap();
        assert_eq!(anon, WaypointId(1));
        assert_eq!(g.get(anon).unwrap().name(), "wp1-1");
        assert_eq!(g.id_by_name("wp1"), Some(named));
        assert_eq!(g.id_by_name("wp1-1"), Some(anon));
    }

    #[test]
    fn test_nearest() {
        let (g, [a, _, c, _]) = square();
        assert_eq!(g.nearest(Vec3::new(1.0, 1.0, 0.0)), Some(a));
        assert_eq!(g.nearest(Vec3::new(9.0, 8.0, 0.0)), Some(c));
        assert_eq!(WaypointGraph::new().nearest(Vec3::ZERO), None);
    }

    #[test]
    fn test_nearest_where_skips_rejected() {
        let (g, [a, b, _, _]) = square();
        let found = g.nearest_where(Vec3::new(1.0, 0.0, 0.0), |wp| wp.id() != a);
        assert_eq!(found, Some(b));
    }

    #[test]
    fn test_path_cost() {
        let (mut g, [a, b, c, d]) = square();
        g.connect(a, b).unwrap();
        g.connect(b, c).unwrap();
        assert_eq!(g.path_cost(&[a, b, c]).unwrap(), Some(20.0));
        assert_eq!(g.path_cost(&[a, d]).unwrap(), None);
        assert_eq!(g.path_cost(&[a]).unwrap(), Some(0.0));
    }
}
