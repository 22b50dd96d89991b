//! Capability for anything that can report a world position

use glam::Vec3;

use crate::types::Pose;

/// Something with a world position: a pose, a key nest, a bare point.
pub trait PositionSource {
    fn position(&self) -> Vec3;
}

impl PositionSource for Vec3 {
    fn position(&self) -> Vec3 {
        *self
    }
}

impl PositionSource for Pose {
    fn position(&self) -> Vec3 {
        self.position
    }
}

impl<T: PositionSource + ?Sized> PositionSource for &T {
    fn position(&self) -> Vec3 {
        (**self).position()
    }
}
