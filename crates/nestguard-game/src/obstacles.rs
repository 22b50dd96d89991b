//! Wall segments on the ground plane and ray queries against them

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::room::RoomBounds;

const PARALLEL_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub from: Vec2,
    pub to: Vec2,
}

#[derive(Debug, Clone, Default)]
pub struct WallSet {
    walls: Vec<Wall>,
}

impl WallSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_walls(walls: impl IntoIterator<Item = Wall>) -> Self {
        Self {
            walls: walls.into_iter().collect(),
        }
    }

    pub fn add(&mut self, from: Vec2, to: Vec2) {
        self.walls.push(Wall { from, to });
    }

    /// Add the four sides of `bounds`
    pub fn add_box(&mut self, bounds: &RoomBounds) {
        let (min, max) = (bounds.min, bounds.max);
        let corners = [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)];
        for i in 0..4 {
            self.add(corners[i], corners[(i + 1) % 4]);
        }
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    /// Distance from `from` to the first wall along the ray through
    /// `towards`, if one lies within `max_distance`
    pub fn distance_to_obstacle(&self, from: Vec3, towards: Vec3, max_distance: f32) -> Option<f32> {
        let origin = from.truncate();
        let dir = (towards.truncate() - origin).normalize_or_zero();
        if dir == Vec2::ZERO {
            return None;
        }

        self.walls
            .iter()
            .filter_map(|wall| ray_segment(origin, dir, wall))
            .filter(|&t| t <= max_distance)
            .min_by(f32::total_cmp)
    }

    /// Whether a wall crosses the straight segment from `a` to `b`
    pub fn blocks(&self, a: Vec3, b: Vec3) -> bool {
        let length = a.truncate().distance(b.truncate());
        self.distance_to_obstacle(a, b, length).is_some()
    }
}

/// Ray parameter `t` (distance along unit `dir`) where the ray meets `wall`
fn ray_segment(origin: Vec2, dir: Vec2, wall: &Wall) -> Option<f32> {
    let edge = wall.to - wall.from;
    let denom = dir.perp_dot(edge);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    let offset = wall.from - origin;
    let t = offset.perp_dot(edge) / denom;
    let u = offset.perp_dot(dir) / denom;
    (t >= 0.0 && (0.0..=1.0).contains(&u)).then_some(t)
}
