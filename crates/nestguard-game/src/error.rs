//! Game error types

use std::path::PathBuf;

use nestguard_core::AgentId;
use nestguard_nav::NavError;
use thiserror::Error;

use crate::keys::KeyId;
use crate::npc::state::{NpcEvent, NpcState};

/// An event that the NPC's current state has no row for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("event {event} is not handled in state {state}")]
pub struct UnhandledTransition {
    pub state: NpcState,
    pub event: NpcEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event name '{0}'")]
pub struct UnknownEvent(pub String);

/// Failure to deliver an event to an NPC
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    #[error(transparent)]
    Unknown(#[from] UnknownEvent),

    #[error(transparent)]
    Unhandled(#[from] UnhandledTransition),

    #[error("no NPC with id {0:?}")]
    UnknownNpc(AgentId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("no key registered as {0:?}")]
    UnknownKey(KeyId),

    #[error("no key named '{0}'")]
    UnknownKeyName(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuningError {
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("{name} must be non-negative and finite, got {value}")]
    Negative { name: &'static str, value: f32 },

    #[error("arrival tolerance {arrival} must be smaller than catch distance {catch}")]
    ArrivalNotBelowCatch { arrival: f32, catch: f32 },

    #[error("wander cadence must be at least one tick")]
    ZeroCadence,
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported level file extension: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("invalid TOML level: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON level: {0}")]
    Json(#[from] serde_json::Error),

    #[error("waypoint graph of room '{room}': {source}")]
    Nav {
        room: String,
        #[source]
        source: NavError,
    },

    #[error("room '{room}' has an empty bounding box")]
    EmptyRoom { room: String },

    #[error("duplicate room name '{0}'")]
    DuplicateRoom(String),

    #[error("level has no rooms")]
    NoRooms,

    #[error("invalid NPC tuning: {0}")]
    Tuning(#[from] TuningError),
}
