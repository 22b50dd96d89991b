//! Key-guarding NPCs

pub mod brain;
pub mod manager;
pub mod sensors;
pub mod state;
pub mod steering;

use serde::{Deserialize, Serialize};

use crate::error::TuningError;
use sensors::SensorConfig;
use steering::WanderConfig;

/// Per-NPC movement and behavior constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcTuning {
    /// Degrees per second
    pub turn_rate: f32,
    /// World units per second
    pub speed: f32,
    /// A path point counts as reached within this distance
    pub arrival_tolerance: f32,
    /// Distance at which the player is caught, or the nest is reached
    pub catch_distance: f32,
    /// The player is "within range" at or below this distance
    pub sensor_range: f32,
    /// Width in degrees of the cone in which the NPC moves instead of turning
    pub forward_arc: f32,
    pub stop_distance: f32,
    /// Turn away from obstacles the front feeler reports closer than this
    pub wall_avoid_distance: f32,
    /// Minimum ticks between automatic replans
    pub replan_cooldown_ticks: u64,
    /// Replan toward a moving goal at least this often
    pub moving_goal_replan_ticks: u64,
}

impl Default for NpcTuning {
    fn default() -> Self {
        Self {
            turn_rate: 150.0,
            speed: 20.0,
            arrival_tolerance: 2.0,
            catch_distance: 5.0,
            sensor_range: 40.0,
            forward_arc: 20.0,
            stop_distance: 0.5,
            wall_avoid_distance: 3.0,
            replan_cooldown_ticks: 10,
            moving_goal_replan_ticks: 60,
        }
    }
}

impl NpcTuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("turn_rate", self.turn_rate),
            ("speed", self.speed),
            ("arrival_tolerance", self.arrival_tolerance),
            ("catch_distance", self.catch_distance),
            ("sensor_range", self.sensor_range),
            ("forward_arc", self.forward_arc),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::NotPositive { name, value });
            }
        }
        if self.arrival_tolerance >= self.catch_distance {
            return Err(TuningError::ArrivalNotBelowCatch {
                arrival: self.arrival_tolerance,
                catch: self.catch_distance,
            });
        }
        Ok(())
    }
}

/// Everything an NPC brain is configured with
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcConfig {
    pub tuning: NpcTuning,
    pub wander: WanderConfig,
    pub sensors: SensorConfig,
}

impl NpcConfig {
    pub fn validate(&self) -> Result<(), TuningError> {
        self.tuning.validate()?;
        if self.wander.cadence_ticks == 0 {
            return Err(TuningError::ZeroCadence);
        }
        let positive = [
            ("wander.radius", self.wander.radius),
            ("sensors.feeler_range", self.sensors.feeler_range),
            ("sensors.radar_length", self.sensors.radar_length),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::NotPositive { name, value });
            }
        }
        let non_negative = [
            ("wander.distance", self.wander.distance),
            ("wander.jitter", self.wander.jitter),
            ("sensors.adjacency_threshold", self.sensors.adjacency_threshold),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(TuningError::Negative { name, value });
            }
        }
        Ok(())
    }
}
