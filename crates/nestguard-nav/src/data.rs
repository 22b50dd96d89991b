//! Serializable description of a waypoint graph, as stored in level files

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::graph::CostModel;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaypointGraphData {
    #[serde(default)]
    pub cost_model: CostModel,
    #[serde(default)]
    pub waypoints: Vec<WaypointData>,
    #[serde(default)]
    pub edges: Vec<EdgeData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointData {
    pub name: String,
    pub position: Vec3,
}

/// An edge between two waypoints, referenced by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    pub from: String,
    pub to: String,
    /// Explicit cost; the graph's cost model prices the edge when absent
    #[serde(default)]
    pub cost: Option<f32>,
    #[serde(default)]
    pub one_way: bool,
}

impl EdgeData {
    pub fn between(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            cost: None,
            one_way: false,
        }
    }
}
