//! The queries NPCs make about the world around them

use glam::Vec3;
use nestguard_core::AgentId;

use crate::obstacles::WallSet;

/// Read-only view of the simulation, supplied by whoever owns the world
pub trait WorldQuery {
    fn player_position(&self) -> Vec3;

    fn player_in_room(&self, room: &str) -> bool;

    /// Every agent in the world except the player
    fn agent_positions(&self) -> Vec<(AgentId, Vec3)>;

    /// Distance from `from` to the nearest obstacle along the ray through
    /// `towards`, or `None` when nothing lies within `max_distance`
    fn distance_to_obstacle(&self, from: Vec3, towards: Vec3, max_distance: f32) -> Option<f32>;

    /// Whether the straight segment from `a` to `b` is unobstructed
    fn line_of_sight(&self, a: Vec3, b: Vec3) -> bool {
        let length = (b - a).truncate().length();
        self.distance_to_obstacle(a, b, length).is_none()
    }
}

/// A world snapshot rebuilt every tick from the simulation state
#[derive(Debug, Clone, Default)]
pub struct WorldSnapshot<'a> {
    pub player_position: Vec3,
    pub player_room: Option<String>,
    pub agents: Vec<(AgentId, Vec3)>,
    pub walls: Option<&'a WallSet>,
}

impl WorldQuery for WorldSnapshot<'_> {
    fn player_position(&self) -> Vec3 {
        self.player_position
    }

    fn player_in_room(&self, room: &str) -> bool {
        self.player_room.as_deref() == Some(room)
    }

    fn agent_positions(&self) -> Vec<(AgentId, Vec3)> {
        self.agents.clone()
    }

    fn distance_to_obstacle(&self, from: Vec3, towards: Vec3, max_distance: f32) -> Option<f32> {
        self.walls
            .and_then(|w| w.distance_to_obstacle(from, towards, max_distance))
    }
}
