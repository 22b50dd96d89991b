//! Core types used throughout the Nestguard simulation
//!
//! The ground plane is XY with Z up. Headings are in degrees, measured
//! counterclockwise from +X.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Unique identifier for an agent (player or NPC) in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

/// A vector contained a NaN or infinite component
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("non-finite coordinates ({}, {}, {})", .0.x, .0.y, .0.z)]
pub struct NonFiniteVector(pub Vec3);

/// Reject vectors that would poison distance math
pub fn ensure_finite(v: Vec3) -> Result<Vec3, NonFiniteVector> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(NonFiniteVector(v))
    }
}

/// Position and heading of an agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    /// Heading in degrees, counterclockwise from +X
    pub heading: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            heading: 0.0,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, heading: f32) -> Self {
        Self { position, heading }
    }

    /// Unit vector the agent is facing, on the ground plane
    pub fn forward(&self) -> Vec3 {
        let rad = self.heading.to_radians();
        Vec3::new(rad.cos(), rad.sin(), 0.0)
    }

    /// Unit vector to the agent's left, on the ground plane
    pub fn left(&self) -> Vec3 {
        let rad = self.heading.to_radians();
        Vec3::new(-rad.sin(), rad.cos(), 0.0)
    }

    /// Transform a point from the agent's local frame (x forward, y left) to world space
    pub fn local_to_world(&self, local: Vec2) -> Vec3 {
        self.position + self.forward() * local.x + self.left() * local.y
    }

    /// Bearing to `target` relative to the current heading, wrapped to [0, 360)
    pub fn relative_bearing(&self, target: Vec3) -> f32 {
        wrap_degrees(bearing_degrees(self.position, target) - self.heading)
    }

    /// Planar distance to `target`, ignoring height
    pub fn planar_distance(&self, target: Vec3) -> f32 {
        planar_distance(self.position, target)
    }
}

/// Wrap an angle in degrees to [0, 360)
pub fn wrap_degrees(deg: f32) -> f32 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Absolute bearing from `from` to `to` in degrees, wrapped to [0, 360)
pub fn bearing_degrees(from: Vec3, to: Vec3) -> f32 {
    let d = to - from;
    wrap_degrees(d.y.atan2(d.x).to_degrees())
}

/// Distance between two points projected onto the ground plane
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    (a.truncate() - b.truncate()).length()
}
