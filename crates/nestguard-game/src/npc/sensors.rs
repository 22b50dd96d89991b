//! Range finders, radar and adjacency sensing

use std::f32::consts::TAU;

use nestguard_core::{planar_distance, AgentId, Pose};
use serde::{Deserialize, Serialize};

use crate::world::WorldQuery;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Number of range-finder rays fanned across the front half circle
    pub feeler_count: usize,
    /// Obstacles farther than this read as 0
    pub feeler_range: f32,
    pub radar_slices: usize,
    pub radar_length: f32,
    pub adjacency_threshold: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            feeler_count: 13,
            feeler_range: 100.0,
            radar_slices: 5,
            radar_length: 40.0,
            adjacency_threshold: 5.0,
        }
    }
}

/// Cached sensor data, refreshed once per tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorReadings {
    pub player_distance: f32,
    /// Distance to the nearest obstacle per feeler, right to left; 0 means clear
    pub feelers: Vec<f32>,
    /// Agents per radar slice
    pub radar: Vec<u32>,
    pub adjacent: Vec<AgentId>,
}

impl SensorReadings {
    /// Reading of the feeler pointing straight ahead
    pub fn front_feeler(&self) -> Option<f32> {
        self.feelers.get(self.feelers.len() / 2).copied()
    }

    /// Summed clearance reported by the left and right halves of the fan.
    /// A clear feeler counts as `range`.
    pub fn side_clearance(&self, range: f32) -> (f32, f32) {
        let half = self.feelers.len() / 2;
        let clearance = |d: &f32| if *d == 0.0 { range } else { *d };
        let right = self.feelers[..half].iter().map(clearance).sum();
        let left = self.feelers[self.feelers.len() - half..]
            .iter()
            .map(clearance)
            .sum();
        (left, right)
    }
}

pub fn sense(pose: &Pose, me: AgentId, world: &dyn WorldQuery, config: &SensorConfig) -> SensorReadings {
    let others: Vec<_> = world
        .agent_positions()
        .into_iter()
        .filter(|(id, _)| *id != me)
        .collect();

    SensorReadings {
        player_distance: pose.planar_distance(world.player_position()),
        feelers: range_finders(pose, world, config.feeler_count, config.feeler_range),
        radar: radar(pose, &others, config.radar_slices, config.radar_length),
        adjacent: adjacent_agents(pose, &others, config.adjacency_threshold),
    }
}

/// Headings of `count` feelers spread evenly from the agent's right (-90°)
/// to its left (+90°). A single feeler points straight ahead.
pub fn feeler_headings(heading: f32, count: usize) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![heading],
        _ => {
            let step = 180.0 / (count - 1) as f32;
            (0..count)
                .map(|i| heading - 90.0 + step * i as f32)
                .collect()
        }
    }
}

pub fn range_finders(pose: &Pose, world: &dyn WorldQuery, count: usize, range: f32) -> Vec<f32> {
    feeler_headings(pose.heading, count)
        .into_iter()
        .map(|h| {
            let ray = Pose::new(pose.position, h);
            world
                .distance_to_obstacle(pose.position, pose.position + ray.forward(), range)
                .unwrap_or(0.0)
        })
        .collect()
}

/// Radar slice covering a bearing `angle` radians counterclockwise from the
/// heading, for a radar of `slices` slices. A radar with no slices maps
/// every bearing to 0.
pub fn radar_slice(angle: f32, slices: usize) -> usize {
    if slices == 0 {
        return 0;
    }
    let angle = angle.rem_euclid(TAU);
    let slice = ((slices as f32 * angle / TAU) as usize).min(slices - 1);
    slices - slice - 1
}

pub fn radar(
    pose: &Pose,
    others: &[(AgentId, glam::Vec3)],
    slices: usize,
    length: f32,
) -> Vec<u32> {
    let mut activation = vec![0; slices];
    if slices == 0 {
        return activation;
    }
    for (_, position) in others {
        if planar_distance(pose.position, *position) > length {
            continue;
        }
        let angle = pose.relative_bearing(*position).to_radians();
        activation[radar_slice(angle, slices)] += 1;
    }
    activation
}

pub fn adjacent_agents(pose: &Pose, others: &[(AgentId, glam::Vec3)], threshold: f32) -> Vec<AgentId> {
    others
        .iter()
        .filter(|(_, p)| planar_distance(pose.position, *p) <= threshold)
        .map(|(id, _)| *id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacles::WallSet;
    use crate::world::WorldSnapshot;
    use glam::{Vec2, Vec3};

    #[test]
    fn test_feeler_fan() {
        let h = feeler_headings(0.0, 13);
        assert_eq!(h.len(), 13);
        assert_eq!(h[0], -90.0);
        assert_eq!(h[6], 0.0);
        assert_eq!(h[12], 90.0);
        assert_eq!(feeler_headings(30.0, 1), vec![30.0]);
        assert!(feeler_headings(0.0, 0).is_empty());
    }

    #[test]
    fn test_range_finders_hit_walls() {
        let mut walls = WallSet::new();
        walls.add(Vec2::new(8.0, -50.0), Vec2::new(8.0, 50.0));
        let world = WorldSnapshot {
            walls: Some(&walls),
            ..Default::default()
        };
        let pose = Pose::new(Vec3::ZERO, 0.0);
        let readings = range_finders(&pose, &world, 13, 100.0);

        assert!((readings[6] - 8.0).abs() < 1e-4);
        // the side feelers run parallel to the wall
        assert_eq!(readings[0], 0.0);
        assert_eq!(readings[12], 0.0);
        // a 45° feeler reaches the wall at 8 * sqrt(2)
        let diag = feeler_headings(0.0, 13)
            .iter()
            .position(|&h| (h - 45.0).abs() < 1e-4)
            .unwrap();
        assert!((readings[diag] - 8.0 * 2f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn test_radar_slice_index() {
        assert_eq!(radar_slice(0.1, 5), 4);
        assert_eq!(radar_slice(TAU * 0.25, 5), 3);
        assert_eq!(radar_slice(TAU * 0.75, 5), 1);
        assert_eq!(radar_slice(TAU - 1e-6, 5), 0);
        assert_eq!(radar_slice(-0.1, 5), 0);
        assert_eq!(radar_slice(1.0, 0), 0);
    }

    #[test]
    fn test_radar_counts_agents_in_range() {
        let pose = Pose::new(Vec3::ZERO, 0.0);
        let others = [
            (AgentId(1), Vec3::new(10.0, 1.0, 0.0)),
            (AgentId(2), Vec3::new(0.0, 10.0, 0.0)),
            (AgentId(3), Vec3::new(0.0, -10.0, 0.0)),
            (AgentId(4), Vec3::new(100.0, 0.0, 0.0)),
        ];
        assert_eq!(radar(&pose, &others, 5, 40.0), vec![0, 1, 0, 1, 1]);
    }

    #[test]
    fn test_adjacency() {
        let pose = Pose::new(Vec3::ZERO, 0.0);
        let others = [
            (AgentId(1), Vec3::new(3.0, 4.0, 0.0)),
            (AgentId(2), Vec3::new(6.0, 0.0, 0.0)),
        ];
        assert_eq!(adjacent_agents(&pose, &others, 5.0), vec![AgentId(1)]);
    }

    #[test]
    fn test_sense_excludes_self() {
        let world = WorldSnapshot {
            player_position: Vec3::new(3.0, 4.0, 0.0),
            agents: vec![(AgentId(1), Vec3::ZERO), (AgentId(2), Vec3::new(1.0, 0.0, 0.0))],
            ..Default::default()
        };
        let pose = Pose::new(Vec3::ZERO, 0.0);
        let readings = sense(&pose, AgentId(1), &world, &SensorConfig::default());
        assert!((readings.player_distance - 5.0).abs() < 1e-5);
        assert_eq!(readings.adjacent, vec![AgentId(2)]);
        assert_eq!(readings.radar.iter().sum::<u32>(), 1);
        assert_eq!(readings.feelers, vec![0.0; 13]);
    }

    #[test]
    fn test_side_clearance() {
        let readings = SensorReadings {
            feelers: vec![1.0, 0.0, 2.0, 0.0, 0.0],
            ..Default::default()
        };
        assert_eq!(readings.front_feeler(), Some(2.0));
        assert_eq!(readings.side_clearance(10.0), (20.0, 11.0));
    }
}
