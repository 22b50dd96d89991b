//! A player that walks a fixed route, standing in for user input

use glam::Vec3;

pub struct ScriptedPlayer {
    position: Vec3,
    route: Vec<Vec3>,
    next: usize,
    speed: f32,
}

impl ScriptedPlayer {
    pub fn new(start: Vec3, route: Vec<Vec3>, speed: f32) -> Self {
        Self {
            position: start,
            route,
            next: 0,
            speed,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.route.len()
    }

    /// Walk toward the next route point for `delta` seconds
    pub fn advance(&mut self, delta: f32) {
        let mut budget = self.speed * delta;
        while budget > 0.0 {
            let Some(&target) = self.route.get(self.next) else {
                return;
            };
            let to_target = target - self.position;
            let distance = to_target.length();
            if distance <= budget {
                self.position = target;
                self.next += 1;
                budget -= distance;
            } else {
                self.position += to_target / distance * budget;
                budget = 0.0;
            }
        }
    }
}
