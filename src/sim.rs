//! Headless simulation loop: scripted player, rooms, keys and guards

use glam::Vec3;
use nestguard_core::SimClock;
use nestguard_game::{
    KeyRegistry, Level, NpcManager, NpcState, RoomTracker, WallSet, WorldSnapshot,
};
use tracing::{debug, info};

use crate::player::ScriptedPlayer;
use crate::settings::SimSettings;

pub struct Simulation {
    level: Level,
    keys: KeyRegistry,
    npcs: NpcManager,
    rooms: RoomTracker,
    player: ScriptedPlayer,
    clock: SimClock,
    pickup_reach: f32,
}

impl Simulation {
    pub fn new(level: Level, settings: &SimSettings) -> Self {
        let mut keys = KeyRegistry::new();
        let npcs = NpcManager::from_level(
            &level,
            &mut keys,
            &settings.npc_config(),
            settings.simulation.seed,
        );
        let rooms = level.room_tracker();
        let player = ScriptedPlayer::new(
            level.player_start,
            level.player_route.clone(),
            settings.simulation.player_speed,
        );
        let clock = SimClock::new(settings.simulation.delta());

        info!(
            level = %level.name,
            guards = npcs.len(),
            keys = keys.len(),
            "Simulation ready"
        );

        Self {
            level,
            keys,
            npcs,
            rooms,
            player,
            clock,
            pickup_reach: settings.simulation.pickup_reach,
        }
    }

    pub fn tick(&mut self) {
        let delta = self.clock.step();

        self.player.advance(delta);
        let player = self.player.position();
        self.keys.try_pickup(player, self.pickup_reach);

        let events = self.rooms.update(player);
        let world = snapshot(&self.level.walls, &self.rooms, &self.npcs, player);
        for event in &events {
            if let Err(err) = self.npcs.handle_room_event(event, &world, &mut self.keys) {
                debug!(%err, "Room event ignored");
            }
        }

        self.npcs.update(delta, &world, &mut self.keys);
    }

    pub fn tick_count(&self) -> u64 {
        self.clock.tick_count
    }

    pub fn elapsed(&self) -> f64 {
        self.clock.total_time
    }

    pub fn player_finished(&self) -> bool {
        self.player.is_finished()
    }

    pub fn keys(&self) -> &KeyRegistry {
        &self.keys
    }

    #[cfg(test)]
    pub fn guard_state(&self, room: &str) -> Option<NpcState> {
        self.npcs.guard_of(room).map(|n| n.state())
    }

    pub fn log_summary(&self) {
        let player = self.player.position();
        for npc in self.npcs.iter() {
            info!(
                elapsed = self.clock.total_time,
                npc = %npc.name,
                state = %npc.state(),
                x = npc.pose.position.x,
                y = npc.pose.position.y,
                player_distance = npc.pose.planar_distance(player),
                "Guard status"
            );
        }
        let carried: Vec<_> = self
            .keys
            .player_keys()
            .filter_map(|k| self.keys.name(k).ok())
            .collect();
        info!(
            x = player.x,
            y = player.y,
            room = self.rooms.room_at(player).unwrap_or("outside"),
            ?carried,
            "Player status"
        );
    }
}

fn snapshot<'a>(
    walls: &'a WallSet,
    rooms: &RoomTracker,
    npcs: &NpcManager,
    player: Vec3,
) -> WorldSnapshot<'a> {
    WorldSnapshot {
        player_position: player,
        player_room: rooms.room_at(player).map(str::to_string),
        agents: npcs.agent_positions(),
        walls: Some(walls),
    }
}
