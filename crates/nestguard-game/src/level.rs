//! Level description files and the runtime level built from them

use std::collections::HashSet;
use std::path::Path;

use glam::{Vec2, Vec3};
use nestguard_nav::{WaypointGraph, WaypointGraphData};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::LevelError;
use crate::npc::NpcTuning;
use crate::obstacles::{Wall, WallSet};
use crate::room::{Room, RoomBounds, RoomTracker};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub name: String,
    pub player_start: Vec3,
    /// Points the scripted player walks through, in order
    #[serde(default)]
    pub player_route: Vec<Vec3>,
    pub rooms: Vec<RoomData>,
    #[serde(default)]
    pub walls: Vec<Wall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomData {
    pub name: String,
    pub min: Vec2,
    pub max: Vec2,
    pub key: KeyData,
    pub guard: GuardData,
    #[serde(default)]
    pub graph: WaypointGraphData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyData {
    pub name: String,
    pub nest: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardData {
    pub name: String,
    pub spawn: Vec3,
    #[serde(default)]
    pub heading: f32,
    /// Overrides the default NPC tuning for this guard
    #[serde(default)]
    pub tuning: Option<NpcTuning>,
}

impl LevelData {
    pub fn from_toml_str(s: &str) -> Result<Self, LevelError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a `.toml` or `.json` level file
    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let read = || {
            std::fs::read_to_string(path).map_err(|source| LevelError::Io {
                path: path.to_path_buf(),
                source,
            })
        };
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&read()?),
            Some("json") => Self::from_json_str(&read()?),
            _ => Err(LevelError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// A room with its navigation graph built
#[derive(Debug, Clone)]
pub struct LevelRoom {
    pub room: Room,
    pub key: KeyData,
    pub guard: GuardData,
    pub graph: WaypointGraph,
}

#[derive(Debug, Clone)]
pub struct Level {
    pub name: String,
    pub player_start: Vec3,
    pub player_route: Vec<Vec3>,
    pub rooms: Vec<LevelRoom>,
    pub walls: WallSet,
}

impl Level {
    pub fn load(path: &Path) -> Result<Self, LevelError> {
        Self::build(LevelData::load(path)?)
    }

    pub fn build(data: LevelData) -> Result<Self, LevelError> {
        if data.rooms.is_empty() {
            return Err(LevelError::NoRooms);
        }

        let mut seen = HashSet::new();
        let mut rooms = Vec::with_capacity(data.rooms.len());
        for room in data.rooms {
            if !seen.insert(room.name.clone()) {
                return Err(LevelError::DuplicateRoom(room.name));
            }
            let bounds = RoomBounds::new(room.min, room.max);
            if bounds.is_empty() {
                return Err(LevelError::EmptyRoom { room: room.name });
            }
            if let Some(tuning) = &room.guard.tuning {
                tuning.validate()?;
            }
            let graph = WaypointGraph::from_data(&room.graph).map_err(|source| LevelError::Nav {
                room: room.name.clone(),
                source,
            })?;

            rooms.push(LevelRoom {
                room: Room {
                    name: room.name,
                    bounds,
                },
                key: room.key,
                guard: room.guard,
                graph,
            });
        }

        info!(
            level = %data.name,
            rooms = rooms.len(),
            walls = data.walls.len(),
            "Level built"
        );

        Ok(Self {
            name: data.name,
            player_start: data.player_start,
            player_route: data.player_route,
            rooms,
            walls: WallSet::from_walls(data.walls),
        })
    }

    pub fn room_tracker(&self) -> RoomTracker {
        RoomTracker::new(self.rooms.iter().map(|r| r.room.clone()).collect())
    }

    pub fn room(&self, name: &str) -> Option<&LevelRoom> {
        self.rooms.iter().find(|r| r.room.name == name)
    }
}
