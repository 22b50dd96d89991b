//! Nestguard Nav - Waypoint graphs and A* pathfinding
//!
//! A level area is described by a [`WaypointGraph`]: named points joined by
//! traversable edges. [`WaypointGraph::find_path`] answers least-cost queries
//! between waypoints or arbitrary positions; [`PathSearch`] runs the same
//! search a slice at a time. Agents walk results with a [`PathCursor`].

pub mod data;
pub mod error;
pub mod graph;
pub mod path;
pub mod search;
pub mod waypoint;

pub use data::{EdgeData, WaypointData, WaypointGraphData};
pub use error::NavError;
pub use graph::{CostModel, WaypointGraph};
pub use path::{Path, PathCursor};
pub use search::{Endpoint, PathSearch, SearchStatus};
pub use waypoint::{Edge, Waypoint, WaypointId};
