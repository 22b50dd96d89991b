//! Nestguard Game - Key-guarding NPCs and the world they live in
//!
//! Each room of a [`Level`] holds a key in its nest and an NPC guarding it.
//! [`NpcManager`] drives every guard's [`NpcBrain`] once per tick: sensing,
//! reacting to events through the [`NpcState`] transition table, following
//! paths from `nestguard-nav`, and turning targets into [`MovementIntent`]s.

pub mod error;
pub mod keys;
pub mod level;
pub mod locomotion;
pub mod npc;
pub mod obstacles;
pub mod room;
pub mod world;

pub use error::{KeyError, LevelError, TransitionError, TuningError, UnhandledTransition, UnknownEvent};
pub use keys::{KeyHolder, KeyId, KeyNest, KeyRegistry};
pub use level::{GuardData, KeyData, Level, LevelData, LevelRoom, RoomData};
pub use locomotion::apply_intent;
pub use npc::brain::{Goal, NpcBrain, NpcContext};
pub use npc::manager::{NpcInstance, NpcManager};
pub use npc::sensors::{SensorConfig, SensorReadings};
pub use npc::state::{NpcEvent, NpcState, SideEffect, Transition, TransitionFacts};
pub use npc::steering::{seek_intent, MovementIntent, WanderConfig, WanderState};
pub use npc::{NpcConfig, NpcTuning};
pub use obstacles::{Wall, WallSet};
pub use room::{Room, RoomBounds, RoomEvent, RoomTracker};
pub use world::{WorldQuery, WorldSnapshot};
