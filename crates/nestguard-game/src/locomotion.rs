//! Kinematic consumer of movement intents

use nestguard_core::{wrap_degrees, Pose};

use crate::npc::steering::MovementIntent;

/// Advance `pose` by one tick of `intent`: turn by `turn_rate * dt` degrees,
/// then move `speed * dt` along the new heading.
pub fn apply_intent(pose: &Pose, intent: MovementIntent, turn_rate: f32, speed: f32, dt: f32) -> Pose {
    let mut next = *pose;

    let turn = turn_rate * dt;
    if intent.turn_left && !intent.turn_right {
        next.heading = wrap_degrees(next.heading + turn);
    } else if intent.turn_right && !intent.turn_left {
        next.heading = wrap_degrees(next.heading - turn);
    }

    let step = speed * dt;
    if intent.move_forward && !intent.move_backward {
        next.position += next.forward() * step;
    } else if intent.move_backward && !intent.move_forward {
        next.position -= next.forward() * step;
    }

    next
}
