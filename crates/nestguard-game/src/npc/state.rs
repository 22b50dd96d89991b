//! NPC behavioral states, the events that move between them, and the
//! transition table

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownEvent;

/// What an NPC is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NpcState {
    /// Exploring the room with no particular goal
    Wander,
    /// Following the player, who is within sensor range
    Seek,
    /// Chasing the player to take back the key
    RetrieveKey,
    /// Carrying the key back to its nest
    ReturnKey,
    /// The player is not in this NPC's room
    PlayerAbsent,
}

impl NpcState {
    pub const ALL: [NpcState; 5] = [
        NpcState::Wander,
        NpcState::Seek,
        NpcState::RetrieveKey,
        NpcState::ReturnKey,
        NpcState::PlayerAbsent,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NpcState::Wander => "wander",
            NpcState::Seek => "seek",
            NpcState::RetrieveKey => "retrieveKey",
            NpcState::ReturnKey => "returnKey",
            NpcState::PlayerAbsent => "playerAbsent",
        }
    }

    /// Look up the transition table. `None` means the event is not handled
    /// in this state.
    pub fn transition(self, event: NpcEvent, facts: &TransitionFacts) -> Option<Transition> {
        use NpcEvent as E;
        use NpcState as S;

        let (to, effect) = match (self, event) {
            (S::Wander | S::Seek, E::KeyTaken) => (S::RetrieveKey, SideEffect::ChaseKeyThief),
            (S::Wander, E::WithinRange) => (S::Seek, SideEffect::TargetPlayer),
            (S::Wander | S::Seek | S::RetrieveKey, E::PlayerLeftRoom) => {
                (S::PlayerAbsent, SideEffect::ClearGoal)
            }
            (S::Seek, E::OutOfRange) => (S::Wander, SideEffect::ClearGoal),
            (S::RetrieveKey, E::GotKey) => (S::ReturnKey, SideEffect::CarryKeyHome),
            (S::ReturnKey, E::KeyReturned) => (S::Wander, SideEffect::DepositKey),
            (S::PlayerAbsent, E::PlayerEnteredRoom) => {
                if facts.player_has_key {
                    (S::RetrieveKey, SideEffect::ChaseKeyThief)
                } else if facts.player_in_range {
                    (S::Seek, SideEffect::TargetPlayer)
                } else {
                    (S::Wander, SideEffect::ClearGoal)
                }
            }
            _ => return None,
        };

        Some(Transition {
            from: self,
            to,
            event,
            effect,
        })
    }
}

impl fmt::Display for NpcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named world events injected into an NPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NpcEvent {
    KeyTaken,
    WithinRange,
    OutOfRange,
    PlayerLeftRoom,
    PlayerEnteredRoom,
    GotKey,
    KeyReturned,
}

impl NpcEvent {
    pub const ALL: [NpcEvent; 7] = [
        NpcEvent::KeyTaken,
        NpcEvent::WithinRange,
        NpcEvent::OutOfRange,
        NpcEvent::PlayerLeftRoom,
        NpcEvent::PlayerEnteredRoom,
        NpcEvent::GotKey,
        NpcEvent::KeyReturned,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NpcEvent::KeyTaken => "keyTaken",
            NpcEvent::WithinRange => "withinRange",
            NpcEvent::OutOfRange => "outOfRange",
            NpcEvent::PlayerLeftRoom => "playerLeftRoom",
            NpcEvent::PlayerEnteredRoom => "playerEnteredRoom",
            NpcEvent::GotKey => "gotKey",
            NpcEvent::KeyReturned => "keyReturned",
        }
    }
}

impl fmt::Display for NpcEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NpcEvent {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NpcEvent::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

/// World facts consulted by conditional transitions
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransitionFacts {
    /// The player is carrying this NPC's key
    pub player_has_key: bool,
    /// The player is within this NPC's sensor range
    pub player_in_range: bool,
}

/// Work the NPC performs when a transition fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Mark the key as carried by the player and plan a path to them
    ChaseKeyThief,
    /// Make the player the current target
    TargetPlayer,
    /// Take the key from the player and plan a path to the nest
    CarryKeyHome,
    /// Put the key back in its nest
    DepositKey,
    /// Drop any goal and path
    ClearGoal,
}

/// A resolved row of the transition table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: NpcState,
    pub to: NpcState,
    pub event: NpcEvent,
    pub effect: SideEffect,
}
