//! NPC manager: spawn guards and update all of them each tick

use std::collections::{BTreeMap, HashMap};

use glam::Vec3;
use nestguard_core::{AgentId, Pose};
use nestguard_nav::WaypointGraph;
use tracing::{debug, info, warn};

use super::brain::{NpcBrain, NpcContext};
use super::state::NpcState;
use super::steering::MovementIntent;
use super::NpcConfig;
use crate::error::TransitionError;
use crate::keys::{KeyId, KeyRegistry};
use crate::level::Level;
use crate::locomotion::apply_intent;
use crate::room::RoomEvent;
use crate::world::WorldQuery;

/// A spawned NPC
pub struct NpcInstance {
    pub id: AgentId,
    pub name: String,
    pub pose: Pose,
    pub brain: NpcBrain,
    graph: usize,
}

impl NpcInstance {
    pub fn state(&self) -> NpcState {
        self.brain.state()
    }
}

/// Owns every NPC and the navigation graph of each guarded room
pub struct NpcManager {
    npcs: BTreeMap<AgentId, NpcInstance>,
    graphs: Vec<WaypointGraph>,
    by_room: HashMap<String, AgentId>,
    next_id: u64,
    seed: u64,
}

impl NpcManager {
    pub fn new(seed: u64) -> Self {
        Self {
            npcs: BTreeMap::new(),
            graphs: Vec::new(),
            by_room: HashMap::new(),
            next_id: 1,
            seed,
        }
    }

    /// Register every room's key and spawn its guard
    pub fn from_level(level: &Level, keys: &mut KeyRegistry, config: &NpcConfig, seed: u64) -> Self {
        let mut manager = Self::new(seed);
        for room in &level.rooms {
            let key = keys.register(room.key.name.clone(), room.key.nest);
            let mut guard_config = *config;
            if let Some(tuning) = room.guard.tuning {
                guard_config.tuning = tuning;
            }
            manager.spawn(
                room.guard.name.clone(),
                &room.room.name,
                room.graph.clone(),
                key,
                Pose::new(room.guard.spawn, room.guard.heading),
                guard_config,
            );
        }
        manager
    }

    fn next_npc_id(&mut self) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn spawn(
        &mut self,
        name: impl Into<String>,
        room: &str,
        graph: WaypointGraph,
        key: KeyId,
        pose: Pose,
        config: NpcConfig,
    ) -> AgentId {
        let id = self.next_npc_id();
        let name = name.into();
        let seed = self.seed.wrapping_add(id.0);

        self.graphs.push(graph);
        let instance = NpcInstance {
            id,
            name,
            pose,
            brain: NpcBrain::new(id, room, key, config, seed),
            graph: self.graphs.len() - 1,
        };

        if let Some(previous) = self.by_room.insert(room.to_string(), id) {
            warn!(room, ?previous, "Room already had a guard; replacing it for room events");
        }
        info!(npc = id.0, name = %instance.name, room, "Spawned NPC");
        self.npcs.insert(id, instance);
        id
    }

    pub fn len(&self) -> usize {
        self.npcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.npcs.is_empty()
    }

    pub fn get(&self, id: AgentId) -> Option<&NpcInstance> {
        self.npcs.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NpcInstance> {
        self.npcs.values()
    }

    pub fn guard_of(&self, room: &str) -> Option<&NpcInstance> {
        self.by_room.get(room).and_then(|id| self.npcs.get(id))
    }

    pub fn agent_positions(&self) -> Vec<(AgentId, Vec3)> {
        self.npcs.values().map(|n| (n.id, n.pose.position)).collect()
    }

    /// Sense, act and move every NPC once. Returns the intent each NPC chose.
    ///
    /// An NPC whose pose has become non-finite is skipped and logged; the
    /// others still update.
    pub fn update(
        &mut self,
        delta: f32,
        world: &dyn WorldQuery,
        keys: &mut KeyRegistry,
    ) -> Vec<(AgentId, MovementIntent)> {
        let mut intents = Vec::with_capacity(self.npcs.len());

        for npc in self.npcs.values_mut() {
            if !(npc.pose.position.is_finite() && npc.pose.heading.is_finite()) {
                warn!(npc = npc.id.0, pose = ?npc.pose, "Skipping NPC with invalid pose");
                continue;
            }

            let pose = npc.pose;
            npc.brain.sense(&pose, world);
            let mut ctx = NpcContext {
                world,
                graph: &self.graphs[npc.graph],
                keys: &mut *keys,
            };
            let intent = npc.brain.act(&pose, &mut ctx);

            let tuning = &npc.brain.config().tuning;
            let mut next = apply_intent(&pose, intent, tuning.turn_rate, tuning.speed, delta);
            if !world.line_of_sight(pose.position, next.position) {
                debug!(npc = npc.id.0, "Movement blocked by obstacle");
                next.position = pose.position;
            }
            npc.pose = next;
            intents.push((npc.id, intent));
        }

        intents
    }

    /// Route a room occupancy change to the room's guard. `Ok(None)` when no
    /// NPC guards that room.
    pub fn handle_room_event(
        &mut self,
        event: &RoomEvent,
        world: &dyn WorldQuery,
        keys: &mut KeyRegistry,
    ) -> Result<Option<NpcState>, TransitionError> {
        let Some(&id) = self.by_room.get(event.room()) else {
            return Ok(None);
        };
        let Some(npc) = self.npcs.get_mut(&id) else {
            return Err(TransitionError::UnknownNpc(id));
        };
        let mut ctx = NpcContext {
            world,
            graph: &self.graphs[npc.graph],
            keys,
        };
        let pose = npc.pose;
        Ok(Some(npc.brain.handle_transition(event.npc_event(), &pose, &mut ctx)?))
    }

    /// Deliver a named event to one NPC
    pub fn handle_named_transition(
        &mut self,
        id: AgentId,
        name: &str,
        world: &dyn WorldQuery,
        keys: &mut KeyRegistry,
    ) -> Result<NpcState, TransitionError> {
        let npc = self
            .npcs
            .get_mut(&id)
            .ok_or(TransitionError::UnknownNpc(id))?;
        let mut ctx = NpcContext {
            world,
            graph: &self.graphs[npc.graph],
            keys,
        };
        let pose = npc.pose;
        npc.brain.handle_named_transition(name, &pose, &mut ctx)
    }
}
