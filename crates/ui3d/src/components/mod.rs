//! Touchable control components
//!
//! A control is a state machine core plus an optional value mapping, placed in
//! the world by a [`Transform3D`].

pub mod button;
pub mod control;
pub mod panel;
pub mod value;

pub use button::TriggerPolicy;
pub use control::{Control, ControlSpec};
pub use panel::PanelThresholds;
pub use value::{
    CommitPolicy, ControlValue, Quantization, ValueControl, ValueMapping, ValueRange, ValueSpec,
};

use glam::{Quat, Vec3};

/// Capability of anything that can be pushed by a pointer.
pub trait Pressable {
    /// Current interaction state.
    fn state(&self) -> crate::interaction::ControlState;

    /// Normalized press progress in `[0, 1]`; zero when not pressed.
    fn press_progress(&self) -> f32;

    /// What happens once the press commits.
    fn trigger_policy(&self) -> TriggerPolicy;
}

/// Capability of controls that carry a continuous or quantized value.
pub trait ValueBearing {
    /// Last committed value.
    fn value(&self) -> ControlValue;

    /// Continuous value shown while pressing; equals the committed value otherwise.
    fn display_value(&self) -> f32;

    /// Display value mapped to `[0, 1]` over the range (fill amount).
    fn fill_amount(&self) -> f32;
}

/// Transform in 3D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3D {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform3D {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Map a local point into world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * (local * self.scale)
    }

    /// Map a world point into local space. Scale must be non-zero on every axis.
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        (self.rotation.inverse() * (world - self.position)) / self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_undoes_forward() {
        let transform = Transform3D::new(Vec3::new(1.0, 2.0, -0.5))
            .with_rotation(Quat::from_rotation_z(0.7))
            .with_scale(Vec3::new(0.2, 0.4, 0.05));
        let local = Vec3::new(0.3, -0.1, 0.25);
        let back = transform.inverse_transform_point(transform.transform_point(local));
        assert!((back - local).length() < 1e-5);
    }
}
