//! Proximity metric - how far a pointer is from a control's box

use crate::components::Transform3D;
use crate::error::ConfigError;
use glam::Vec3;

/// Oriented bounding box of a control.
///
/// `half_extents` are in the control's local space, centered on the local
/// origin. The local origin plane `z = 0` is the touch surface; pushing into the
/// control moves the pointer towards negative local Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlBounds {
    /// World transform of the control.
    pub transform: Transform3D,
    /// Local half-extents of the box.
    pub half_extents: Vec3,
}

impl ControlBounds {
    /// Create bounds from a transform and local half-extents.
    pub fn new(transform: Transform3D, half_extents: Vec3) -> Self {
        Self {
            transform,
            half_extents,
        }
    }

    /// Unit box (half-extent 0.5 on every axis), sized by the transform scale.
    pub fn unit(transform: Transform3D) -> Self {
        Self::new(transform, Vec3::splat(0.5))
    }

    /// Reject boxes that would make the metric meaningless.
    pub fn validate(&self, control: &str) -> Result<(), ConfigError> {
        let h = self.half_extents;
        if !h.is_finite() || h.min_element() <= 0.0 {
            return Err(ConfigError::DegenerateBounds {
                control: control.to_string(),
                half_extents: h.to_array(),
            });
        }
        let s = self.transform.scale;
        if !s.is_finite() || s.x == 0.0 || s.y == 0.0 || s.z == 0.0 {
            return Err(ConfigError::DegenerateScale {
                control: control.to_string(),
                scale: s.to_array(),
            });
        }
        Ok(())
    }

    /// World point expressed in the control's local space.
    pub fn local_point(&self, world_point: Vec3) -> Vec3 {
        self.transform.inverse_transform_point(world_point)
    }

    /// Signed per-axis displacement from the box surface to `world_point`.
    ///
    /// Each axis is treated independently: inside `[-h, +h]` (faces included)
    /// the component is zero, otherwise it is the overshoot past the nearer
    /// face. Components are scaled by the transform scale so the result is in
    /// world units. Corner regions therefore report a separating-axis
    /// distance rather than the exact distance to the box.
    pub fn displacement(&self, world_point: Vec3) -> Vec3 {
        let local = self.local_point(world_point);
        let overshoot = Vec3::new(
            axis_overshoot(local.x, self.half_extents.x),
            axis_overshoot(local.y, self.half_extents.y),
            axis_overshoot(local.z, self.half_extents.z),
        );
        overshoot * self.transform.scale
    }

    /// Magnitude of [`Self::displacement`].
    pub fn distance(&self, world_point: Vec3) -> f32 {
        self.displacement(world_point).length()
    }

    /// Signed local-Z depth of a point relative to the touch surface.
    pub fn depth(&self, world_point: Vec3) -> f32 {
        self.local_point(world_point).z
    }
}

fn axis_overshoot(coord: f32, half: f32) -> f32 {
    if coord < -half {
        coord + half
    } else if coord > half {
        coord - half
    } else {
        0.0
    }
}
