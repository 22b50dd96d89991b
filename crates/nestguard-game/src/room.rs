//! Room bounds and the tracker that turns player movement into room events

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::npc::state::NpcEvent;

/// Axis-aligned rectangle on the ground plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl RoomBounds {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Inclusive on every edge
    pub fn contains(&self, point: Vec3) -> bool {
        let p = point.truncate();
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub name: String,
    pub bounds: RoomBounds,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    PlayerEntered(String),
    PlayerLeft(String),
}

impl RoomEvent {
    pub fn room(&self) -> &str {
        match self {
            RoomEvent::PlayerEntered(room) | RoomEvent::PlayerLeft(room) => room,
        }
    }

    pub fn npc_event(&self) -> NpcEvent {
        match self {
            RoomEvent::PlayerEntered(_) => NpcEvent::PlayerEnteredRoom,
            RoomEvent::PlayerLeft(_) => NpcEvent::PlayerLeftRoom,
        }
    }
}

/// Tracks which rooms the player occupies.
///
/// Occupancy starts unknown. The first update reports `PlayerLeft` for each
/// room the player is not in, so guards of empty rooms settle into their
/// absent state; the room the player starts in produces no event.
#[derive(Debug, Clone, Default)]
pub struct RoomTracker {
    rooms: Vec<Room>,
    occupied: Vec<Option<bool>>,
}

impl RoomTracker {
    pub fn new(rooms: Vec<Room>) -> Self {
        let occupied = vec![None; rooms.len()];
        Self { rooms, occupied }
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Name of the first room containing `point`
    pub fn room_at(&self, point: Vec3) -> Option<&str> {
        self.rooms
            .iter()
            .find(|r| r.bounds.contains(point))
            .map(|r| r.name.as_str())
    }

    pub fn is_occupied(&self, room: &str) -> bool {
        self.rooms
            .iter()
            .zip(&self.occupied)
            .any(|(r, occ)| r.name == room && *occ == Some(true))
    }

    pub fn update(&mut self, player_position: Vec3) -> Vec<RoomEvent> {
        let mut events = Vec::new();
        for (room, occupied) in self.rooms.iter().zip(self.occupied.iter_mut()) {
            let inside = room.bounds.contains(player_position);
            let event = match (*occupied, inside) {
                (None, false) | (Some(true), false) => {
                    Some(RoomEvent::PlayerLeft(room.name.clone()))
                }
                (Some(false), true) => Some(RoomEvent::PlayerEntered(room.name.clone())),
                _ => None,
            };
            *occupied = Some(inside);
            if let Some(event) = event {
                debug!(?event, "Room occupancy changed");
                events.push(event);
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> RoomTracker {
        RoomTracker::new(vec![
            Room {
                name: "hall".into(),
                bounds: RoomBounds::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0)),
            },
            Room {
                name: "vault".into(),
                bounds: RoomBounds::new(Vec2::new(10.0, 0.0), Vec2::new(20.0, 10.0)),
            },
        ])
    }

    #[test]
    fn test_bounds_normalized() {
        let b = RoomBounds::new(Vec2::new(5.0, 5.0), Vec2::new(-5.0, -5.0));
        assert_eq!(b.min, Vec2::new(-5.0, -5.0));
        assert!(b.contains(Vec3::new(5.0, -5.0, 3.0)));
        assert!(!b.contains(Vec3::new(5.1, 0.0, 0.0)));
        assert_eq!(b.center(), Vec2::ZERO);
    }

    #[test]
    fn test_first_update_reports_empty_rooms() {
        let mut t = tracker();
        let events = t.update(Vec3::new(2.0, 2.0, 0.0));
        assert_eq!(events, vec![RoomEvent::PlayerLeft("vault".into())]);
        assert!(t.is_occupied("hall"));
        assert!(t.update(Vec3::new(3.0, 2.0, 0.0)).is_empty());
    }

    #[test]
    fn test_walking_between_rooms() {
        let mut t = tracker();
        t.update(Vec3::new(2.0, 2.0, 0.0));
        let events = t.update(Vec3::new(15.0, 2.0, 0.0));
        assert_eq!(
            events,
            vec![
                RoomEvent::PlayerLeft("hall".into()),
                RoomEvent::PlayerEntered("vault".into()),
            ]
        );
        assert_eq!(events[1].npc_event(), NpcEvent::PlayerEnteredRoom);
        assert_eq!(t.room_at(Vec3::new(15.0, 2.0, 0.0)), Some("vault"));
        assert_eq!(t.room_at(Vec3::new(50.0, 2.0, 0.0)), None);
    }
}
