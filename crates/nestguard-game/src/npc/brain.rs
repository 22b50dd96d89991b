//! Per-NPC decision making: sensing, transitions, path following

use glam::Vec3;
use nestguard_core::{AgentId, Pose, PositionSource};
use nestguard_nav::{PathCursor, WaypointGraph};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::sensors::{self, SensorReadings};
use super::state::{NpcEvent, NpcState, SideEffect, TransitionFacts};
use super::steering::{seek_intent, MovementIntent, WanderState};
use super::NpcConfig;
use crate::error::{KeyError, TransitionError, UnhandledTransition};
use crate::keys::{KeyId, KeyRegistry};
use crate::world::WorldQuery;

/// What an NPC is walking toward while retrieving or returning a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    Player,
    Nest,
}

/// The shared pieces of the world an NPC works with during one tick
pub struct NpcContext<'a> {
    pub world: &'a dyn WorldQuery,
    pub graph: &'a WaypointGraph,
    pub keys: &'a mut KeyRegistry,
}

pub struct NpcBrain {
    id: AgentId,
    room: String,
    key: KeyId,
    config: NpcConfig,
    state: NpcState,
    goal: Option<Goal>,
    cursor: Option<PathCursor>,
    wander: WanderState,
    readings: SensorReadings,
    rng: StdRng,
    tick: u64,
    last_plan_tick: Option<u64>,
}

impl NpcBrain {
    pub fn new(id: AgentId, room: impl Into<String>, key: KeyId, config: NpcConfig, seed: u64) -> Self {
        Self {
            id,
            room: room.into(),
            key,
            wander: WanderState::new(&config.wander),
            config,
            state: NpcState::Wander,
            goal: None,
            cursor: None,
            readings: SensorReadings::default(),
            rng: StdRng::seed_from_u64(seed),
            tick: 0,
            last_plan_tick: None,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn key(&self) -> KeyId {
        self.key
    }

    pub fn state(&self) -> NpcState {
        self.state
    }

    pub fn goal(&self) -> Option<Goal> {
        self.goal
    }

    pub fn cursor(&self) -> Option<&PathCursor> {
        self.cursor.as_ref()
    }

    pub fn readings(&self) -> &SensorReadings {
        &self.readings
    }

    pub fn config(&self) -> &NpcConfig {
        &self.config
    }

    /// Refresh the cached sensor readings
    pub fn sense(&mut self, pose: &Pose, world: &dyn WorldQuery) {
        self.readings = sensors::sense(pose, self.id, world, &self.config.sensors);
    }

    /// Decide this tick's movement. May fire automatic transitions.
    pub fn act(&mut self, pose: &Pose, ctx: &mut NpcContext<'_>) -> MovementIntent {
        self.tick += 1;

        if let Some(cursor) = self.cursor.as_mut() {
            let reached = cursor.advance_within(pose.position, self.config.tuning.arrival_tolerance);
            if reached > 0 {
                debug!(npc = self.id.0, reached, remaining = cursor.remaining().len(), "Reached path point");
            }
        }

        if let Some(event) = self.automatic_event(pose, ctx) {
            if let Err(err) = self.handle_transition(event, pose, ctx) {
                debug!(npc = self.id.0, %err, "Automatic event dropped");
            }
        }

        let tuning = self.config.tuning;
        match self.state {
            NpcState::Wander | NpcState::PlayerAbsent => self.wander(pose),
            NpcState::Seek => seek_intent(
                pose,
                ctx.world.player_position(),
                tuning.forward_arc,
                tuning.stop_distance,
            ),
            NpcState::RetrieveKey | NpcState::ReturnKey => self.follow_goal(pose, ctx),
        }
    }

    /// Deliver `event`. Unhandled events leave the state untouched.
    pub fn handle_transition(
        &mut self,
        event: NpcEvent,
        pose: &Pose,
        ctx: &mut NpcContext<'_>,
    ) -> Result<NpcState, UnhandledTransition> {
        let facts = TransitionFacts {
            player_has_key: ctx.keys.player_has(self.key),
            player_in_range: self.player_in_range(pose, ctx.world),
        };

        let Some(transition) = self.state.transition(event, &facts) else {
            debug!(npc = self.id.0, state = %self.state, %event, "Unhandled event");
            return Err(UnhandledTransition {
                state: self.state,
                event,
            });
        };

        self.apply(transition.effect, pose, ctx);
        info!(
            npc = self.id.0,
            from = %transition.from,
            to = %transition.to,
            %event,
            "NPC state changed"
        );
        self.state = transition.to;
        Ok(self.state)
    }

    /// Deliver an event by its camelCase name, e.g. `"keyTaken"`
    pub fn handle_named_transition(
        &mut self,
        name: &str,
        pose: &Pose,
        ctx: &mut NpcContext<'_>,
    ) -> Result<NpcState, TransitionError> {
        let event: NpcEvent = name.parse()?;
        Ok(self.handle_transition(event, pose, ctx)?)
    }

    fn player_in_range(&self, pose: &Pose, world: &dyn WorldQuery) -> bool {
        pose.planar_distance(world.player_position()) <= self.config.tuning.sensor_range
    }

    fn automatic_event(&self, pose: &Pose, ctx: &NpcContext<'_>) -> Option<NpcEvent> {
        let tuning = &self.config.tuning;
        let player_distance = pose.planar_distance(ctx.world.player_position());

        match self.state {
            NpcState::Wander => {
                if ctx.keys.player_has(self.key) {
                    Some(NpcEvent::KeyTaken)
                } else if ctx.world.player_in_room(&self.room)
                    && player_distance <= tuning.sensor_range
                {
                    Some(NpcEvent::WithinRange)
                } else {
                    None
                }
            }
            NpcState::Seek => {
                if ctx.keys.player_has(self.key) {
                    Some(NpcEvent::KeyTaken)
                } else if player_distance > tuning.sensor_range {
                    Some(NpcEvent::OutOfRange)
                } else {
                    None
                }
            }
            NpcState::RetrieveKey => {
                (player_distance < tuning.catch_distance).then_some(NpcEvent::GotKey)
            }
            NpcState::ReturnKey => {
                let nest = ctx.keys.nest(self.key).ok()?;
                (pose.planar_distance(nest.position()) < tuning.catch_distance)
                    .then_some(NpcEvent::KeyReturned)
            }
            NpcState::PlayerAbsent => None,
        }
    }

    fn apply(&mut self, effect: SideEffect, pose: &Pose, ctx: &mut NpcContext<'_>) {
        self.cursor = None;
        match effect {
            SideEffect::ChaseKeyThief => {
                let result = ctx.keys.take_by_player(self.key);
                self.log_key_result(result);
                self.goal = Some(Goal::Player);
                let player = ctx.world.player_position();
                self.plan(pose.position, player, ctx);
            }
            SideEffect::TargetPlayer => {
                self.goal = Some(Goal::Player);
            }
            SideEffect::CarryKeyHome => {
                let result = ctx.keys.transfer_to_npc(self.key, self.id);
                self.log_key_result(result);
                self.goal = Some(Goal::Nest);
                if let Some(nest) = self.goal_position(ctx) {
                    self.plan(pose.position, nest, ctx);
                }
            }
            SideEffect::DepositKey => {
                let result = ctx.keys.deposit_at_nest(self.key);
                self.log_key_result(result);
                self.goal = None;
            }
            SideEffect::ClearGoal => {
                self.goal = None;
            }
        }
    }

    fn log_key_result<T>(&self, result: Result<T, KeyError>) {
        if let Err(err) = result {
            warn!(npc = self.id.0, %err, "Key registry update failed");
        }
    }

    fn goal_position(&self, ctx: &NpcContext<'_>) -> Option<Vec3> {
        match self.goal? {
            Goal::Player => Some(ctx.world.player_position()),
            Goal::Nest => ctx.keys.nest(self.key).ok().map(|n| n.position()),
        }
    }

    fn wander(&mut self, pose: &Pose) -> MovementIntent {
        let tuning = &self.config.tuning;
        if let Some(front) = self.readings.front_feeler() {
            if front > 0.0 && front < tuning.wall_avoid_distance {
                let (left, right) = self.readings.side_clearance(self.config.sensors.feeler_range);
                return if left >= right {
                    MovementIntent::left()
                } else {
                    MovementIntent::right()
                };
            }
        }
        self.wander
            .steer(pose, &self.config.wander, tuning.forward_arc, &mut self.rng)
    }

    fn follow_goal(&mut self, pose: &Pose, ctx: &mut NpcContext<'_>) -> MovementIntent {
        let Some(goal) = self.goal_position(ctx) else {
            return MovementIntent::IDLE;
        };

        if self.should_replan(pose, goal, ctx) {
            debug!(npc = self.id.0, state = %self.state, "Replanning");
            self.plan(pose.position, goal, ctx);
        }

        let target = self
            .cursor
            .as_ref()
            .and_then(PathCursor::current_target)
            .unwrap_or(goal);
        let tuning = &self.config.tuning;
        seek_intent(pose, target, tuning.forward_arc, tuning.stop_distance)
    }

    fn should_replan(&self, pose: &Pose, goal: Vec3, ctx: &NpcContext<'_>) -> bool {
        let tuning = &self.config.tuning;
        let since_plan = self.last_plan_tick.map(|t| self.tick - t);
        if since_plan.is_some_and(|ticks| ticks < tuning.replan_cooldown_ticks) {
            return false;
        }

        let Some(cursor) = &self.cursor else {
            return true;
        };
        match cursor.current_target() {
            None => pose.planar_distance(goal) >= tuning.catch_distance,
            Some(next) => {
                let blocked = !ctx.world.line_of_sight(pose.position, next);
                let stale = self.goal == Some(Goal::Player)
                    && since_plan.map_or(true, |ticks| ticks >= tuning.moving_goal_replan_ticks);
                blocked || stale
            }
        }
    }

    /// Request a path from `from` to `goal`. On failure the remaining part of
    /// the previous path is kept; with nothing left the NPC steers straight
    /// at the goal.
    fn plan(&mut self, from: Vec3, goal: Vec3, ctx: &NpcContext<'_>) {
        self.last_plan_tick = Some(self.tick);
        let world = ctx.world;
        match ctx
            .graph
            .find_path_visible(from, goal, |a, b| world.line_of_sight(a, b))
        {
            Ok(Some(path)) => {
                debug!(npc = self.id.0, nodes = path.len(), cost = path.cost(), "Planned path");
                self.cursor = Some(PathCursor::new(path));
            }
            Ok(None) => {
                warn!(npc = self.id.0, ?goal, "Goal unreachable, steering directly");
                self.drop_spent_path();
            }
            Err(err) => {
                warn!(npc = self.id.0, %err, "Path request failed");
                self.drop_spent_path();
            }
        }
    }

    fn drop_spent_path(&mut self) {
        if self.cursor.as_ref().is_some_and(PathCursor::is_complete) {
            self.cursor = None;
        }
    }
}
