//! Nestguard Core - Core types and utilities for the Nestguard simulation
//!
//! This crate provides the foundational types used throughout the workspace:
//! - Mathematical primitives (re-exported from glam)
//! - Agent pose and heading helpers
//! - The `PositionSource` capability
//! - The tick-driven simulation clock

pub mod position;
pub mod time;
pub mod types;

pub use glam::{Vec2, Vec3};
pub use position::PositionSource;
pub use time::SimClock;
pub use types::{
    bearing_degrees, ensure_finite, planar_distance, wrap_degrees, AgentId, NonFiniteVector, Pose,
};
