//! Keys, the nests they rest in, and who is carrying them

use glam::Vec3;
use nestguard_core::{planar_distance, AgentId, PositionSource};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::KeyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyHolder {
    /// Resting in its nest
    Nest,
    Player,
    Npc(AgentId),
}

/// Where a key is returned to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyNest {
    pub position: Vec3,
}

impl PositionSource for KeyNest {
    fn position(&self) -> Vec3 {
        self.position
    }
}

#[derive(Debug, Clone)]
struct KeyEntry {
    name: String,
    nest: KeyNest,
    holder: KeyHolder,
}

/// Shared record of every key in the level.
///
/// NPCs mutate it only through their own state transitions; the player side
/// of the simulation picks keys up with [`KeyRegistry::try_pickup`].
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    keys: Vec<KeyEntry>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key resting in a nest at `nest_position`
    pub fn register(&mut self, name: impl Into<String>, nest_position: Vec3) -> KeyId {
        let id = KeyId(self.keys.len() as u32);
        self.keys.push(KeyEntry {
            name: name.into(),
            nest: KeyNest {
                position: nest_position,
            },
            holder: KeyHolder::Nest,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = KeyId> + '_ {
        (0..self.keys.len()).map(|i| KeyId(i as u32))
    }

    pub fn id_by_name(&self, name: &str) -> Result<KeyId, KeyError> {
        self.keys
            .iter()
            .position(|k| k.name == name)
            .map(|i| KeyId(i as u32))
            .ok_or_else(|| KeyError::UnknownKeyName(name.to_string()))
    }

    pub fn name(&self, key: KeyId) -> Result<&str, KeyError> {
        self.entry(key).map(|e| e.name.as_str())
    }

    pub fn holder(&self, key: KeyId) -> Result<KeyHolder, KeyError> {
        self.entry(key).map(|e| e.holder)
    }

    pub fn nest(&self, key: KeyId) -> Result<&KeyNest, KeyError> {
        self.entry(key).map(|e| &e.nest)
    }

    /// Whether the player is carrying `key`. Unknown keys are never carried.
    pub fn player_has(&self, key: KeyId) -> bool {
        matches!(self.holder(key), Ok(KeyHolder::Player))
    }

    /// Keys the player is carrying
    pub fn player_keys(&self) -> impl Iterator<Item = KeyId> + '_ {
        self.ids().filter(|&k| self.player_has(k))
    }

    pub fn is_resting(&self, key: KeyId) -> bool {
        matches!(self.holder(key), Ok(KeyHolder::Nest))
    }

    /// Mark `key` as carried by the player. Returns the previous holder.
    pub fn take_by_player(&mut self, key: KeyId) -> Result<KeyHolder, KeyError> {
        self.set_holder(key, KeyHolder::Player)
    }

    /// Hand `key` to an NPC. Returns the previous holder.
    pub fn transfer_to_npc(&mut self, key: KeyId, npc: AgentId) -> Result<KeyHolder, KeyError> {
        self.set_holder(key, KeyHolder::Npc(npc))
    }

    /// Put `key` back in its nest. Returns the previous holder.
    pub fn deposit_at_nest(&mut self, key: KeyId) -> Result<KeyHolder, KeyError> {
        self.set_holder(key, KeyHolder::Nest)
    }

    /// Pick up every resting key whose nest lies within `reach` of
    /// `player_position`. Returns the keys taken.
    pub fn try_pickup(&mut self, player_position: Vec3, reach: f32) -> Vec<KeyId> {
        let mut taken = Vec::new();
        for (i, entry) in self.keys.iter_mut().enumerate() {
            if entry.holder == KeyHolder::Nest
                && planar_distance(entry.nest.position, player_position) <= reach
            {
                entry.holder = KeyHolder::Player;
                info!(key = %entry.name, "Player picked up key");
                taken.push(KeyId(i as u32));
            }
        }
        taken
    }

    fn entry(&self, key: KeyId) -> Result<&KeyEntry, KeyError> {
        self.keys
            .get(key.0 as usize)
            .ok_or(KeyError::UnknownKey(key))
    }

    fn set_holder(&mut self, key: KeyId, holder: KeyHolder) -> Result<KeyHolder, KeyError> {
        let entry = self
            .keys
            .get_mut(key.0 as usize)
            .ok_or(KeyError::UnknownKey(key))?;
        let previous = std::mem::replace(&mut entry.holder, holder);
        debug!(key = %entry.name, ?previous, ?holder, "Key changed hands");
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_rests_in_nest() {
        let mut keys = KeyRegistry::new();
        let k = keys.register("red", Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(keys.holder(k), Ok(KeyHolder::Nest));
        assert!(keys.is_resting(k));
        assert_eq!(keys.nest(k).unwrap().position(), Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(keys.id_by_name("red"), Ok(k));
    }

    #[test]
    fn test_transfers() {
        let mut keys = KeyRegistry::new();
        let k = keys.register("red", Vec3::ZERO);
        let npc = AgentId(7);

        assert_eq!(keys.take_by_player(k), Ok(KeyHolder::Nest));
        assert!(keys.player_has(k));
        assert_eq!(keys.player_keys().collect::<Vec<_>>(), vec![k]);

        assert_eq!(keys.transfer_to_npc(k, npc), Ok(KeyHolder::Player));
        assert!(!keys.player_has(k));
        assert_eq!(keys.holder(k), Ok(KeyHolder::Npc(npc)));

        assert_eq!(keys.deposit_at_nest(k), Ok(KeyHolder::Npc(npc)));
        assert!(keys.is_resting(k));
    }

    #[test]
    fn test_unknown_key() {
        let mut keys = KeyRegistry::new();
        assert_eq!(keys.take_by_player(KeyId(3)), Err(KeyError::UnknownKey(KeyId(3))));
        assert!(!keys.player_has(KeyId(3)));
        assert_eq!(
            keys.id_by_name("blue"),
            Err(KeyError::UnknownKeyName("blue".into()))
        );
    }

    #[test]
    fn test_pickup_only_resting_keys_in_reach() {
        let mut keys = KeyRegistry::new();
        let near = keys.register("near", Vec3::new(1.0, 0.0, 0.0));
        let far = keys.register("far", Vec3::new(50.0, 0.0, 0.0));
        let held = keys.register("held", Vec3::new(0.5, 0.0, 0.0));
        keys.transfer_to_npc(held, AgentId(1)).unwrap();

        assert_eq!(keys.try_pickup(Vec3::ZERO, 2.0), vec![near]);
        assert!(keys.player_has(near));
        assert!(keys.is_resting(far));
        assert_eq!(keys.holder(held), Ok(KeyHolder::Npc(AgentId(1))));
        assert!(keys.try_pickup(Vec3::ZERO, 2.0).is_empty());
    }
}
