//! Turning targets into movement intents

use glam::{Vec2, Vec3};
use nestguard_core::Pose;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Control flags for one tick, consumed by the locomotion layer.
///
/// At most one of each opposing pair is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementIntent {
    pub turn_left: bool,
    pub turn_right: bool,
    pub move_forward: bool,
    pub move_backward: bool,
}

impl MovementIntent {
    pub const IDLE: Self = Self {
        turn_left: false,
        turn_right: false,
        move_forward: false,
        move_backward: false,
    };

    pub fn forward() -> Self {
        Self {
            move_forward: true,
            ..Self::IDLE
        }
    }

    pub fn left() -> Self {
        Self {
            turn_left: true,
            ..Self::IDLE
        }
    }

    pub fn right() -> Self {
        Self {
            turn_right: true,
            ..Self::IDLE
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::IDLE
    }
}

/// Steer toward `target`.
///
/// Moves forward while the target lies within `forward_arc` degrees centred on
/// the heading, otherwise turns toward it. A target directly behind turns
/// left. Targets closer than `stop_distance` produce no movement.
pub fn seek_intent(pose: &Pose, target: Vec3, forward_arc: f32, stop_distance: f32) -> MovementIntent {
    if pose.planar_distance(target) < stop_distance {
        return MovementIntent::IDLE;
    }

    let bearing = pose.relative_bearing(target);
    let half_arc = forward_arc * 0.5;
    if bearing <= half_arc || bearing >= 360.0 - half_arc {
        MovementIntent::forward()
    } else if bearing <= 180.0 {
        MovementIntent::left()
    } else {
        MovementIntent::right()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderConfig {
    /// Radius of the circle the wander target lives on
    pub radius: f32,
    /// How far ahead of the agent the circle is centred
    pub distance: f32,
    /// Largest per-axis random displacement applied to the target
    pub jitter: f32,
    /// Ticks between jitter updates
    pub cadence_ticks: u32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            radius: 2.0,
            distance: 4.0,
            jitter: 1.0,
            cadence_ticks: 5,
        }
    }
}

/// Persistent wander target, expressed in the agent's local frame
#[derive(Debug, Clone, PartialEq)]
pub struct WanderState {
    target: Vec2,
    ticks: u32,
}

impl WanderState {
    pub fn new(config: &WanderConfig) -> Self {
        Self {
            target: Vec2::new(config.radius, 0.0),
            ticks: 0,
        }
    }

    /// Offset of the target on the wander circle
    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Steering target in the agent's local frame (x forward, y left)
    pub fn local_target(&self, config: &WanderConfig) -> Vec2 {
        self.target + Vec2::new(config.distance, 0.0)
    }

    /// Count one tick, jittering the target every `cadence_ticks`
    pub fn tick(&mut self, config: &WanderConfig, rng: &mut impl Rng) {
        self.ticks = self.ticks.wrapping_add(1);
        if config.cadence_ticks == 0 || self.ticks % config.cadence_ticks != 0 {
            return;
        }

        let j = config.jitter;
        if !j.is_finite() || j <= 0.0 {
            return;
        }
        let nudged = self.target + Vec2::new(rng.gen_range(-j..=j), rng.gen_range(-j..=j));
        self.target = match nudged.try_normalize() {
            Some(dir) => dir * config.radius,
            None => Vec2::new(config.radius, 0.0),
        };
    }

    pub fn steer(
        &mut self,
        pose: &Pose,
        config: &WanderConfig,
        forward_arc: f32,
        rng: &mut impl Rng,
    ) -> MovementIntent {
        self.tick(config, rng);
        let world_target = pose.local_to_world(self.local_target(config));
        seek_intent(pose, world_target, forward_arc, 0.0)
    }
}
