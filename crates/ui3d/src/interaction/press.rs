//! Depth-threshold press protocol shared by every control type.
//!
//! Depth is the pointer's local Z relative to the touch surface; negative means
//! pushed in. Entering a press needs `depth < -threshold`, a press is cancelled
//! once `depth > +threshold`, and it commits once `depth < -max`.

use crate::components::PanelThresholds;
use glam::Vec3;

/// Outcome of one press drive step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressStep {
    /// Pointer pulled back out past the threshold; cancel without commit.
    Retreated,
    /// Still pressing.
    Holding(PressSample),
    /// Pushed past the commit depth.
    Committed(PressSample),
}

/// Continuous press feedback for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressSample {
    /// `inverse_lerp(0, -max, depth)` clamped to `[0, 1]`.
    pub progress: f32,
    /// Raw depth.
    pub depth: f32,
    /// Pointer local X/Y clamped onto the control face.
    pub face: (f32, f32),
}

/// `(value - a) / (b - a)`, or 0 for an empty interval.
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        0.0
    } else {
        (value - a) / (b - a)
    }
}

/// Whether a touching pointer has pushed far enough to start a press.
pub fn should_start_press(depth: f32, thresholds: &PanelThresholds) -> bool {
    depth < -thresholds.press_threshold_distance
}

/// Whether the pointer is back in front of the press threshold.
pub fn has_retreated(depth: f32, thresholds: &PanelThresholds) -> bool {
    depth > thresholds.press_threshold_distance
}

/// Whether a disabled control's latched pointer has backed out far enough.
pub fn should_re_enable(depth: f32, thresholds: &PanelThresholds) -> bool {
    depth >= thresholds.re_enable_distance()
}

/// Evaluate the press for a pointer at `local` (control-local coordinates).
pub fn evaluate(local: Vec3, half_extents: Vec3, thresholds: &PanelThresholds) -> PressStep {
    let depth = local.z;
    if has_retreated(depth, thresholds) {
        return PressStep::Retreated;
    }

    let progress = inverse_lerp(0.0, -thresholds.press_max_distance, depth).clamp(0.0, 1.0);
    let sample = PressSample {
        progress,
        depth,
        face: (
            local.x.clamp(-half_extents.x, half_extents.x),
            local.y.clamp(-half_extents.y, half_extents.y),
        ),
    };

    if depth < -thresholds.press_max_distance {
        PressStep::Committed(sample)
    } else {
        PressStep::Holding(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> PanelThresholds {
        PanelThresholds::default()
            .with_press_threshold_distance(0.01)
            .with_press_max_distance(0.4)
    }

    fn at_depth(depth: f32) -> PressStep {
        evaluate(Vec3::new(0.0, 0.0, depth), Vec3::splat(0.5), &thresholds())
    }

    #[test]
    fn start_needs_strictly_past_threshold() {
        let t = thresholds();
        assert!(!should_start_press(0.0, &t));
        assert!(!should_start_press(-0.01, &t));
        assert!(should_start_press(-0.011, &t));
    }

    #[test]
    fn retreat_cancels() {
        assert_eq!(at_depth(0.02), PressStep::Retreated);
        assert!(matches!(at_depth(0.01), PressStep::Holding(_)));
    }

    #[test]
    fn progress_is_normalized_and_clamped() {
        match at_depth(-0.2) {
            PressStep::Holding(sample) => assert!((sample.progress - 0.5).abs() < 1e-6),
            other => panic!("unexpected {other:?}"),
        }
        match at_depth(0.005) {
            PressStep::Holding(sample) => assert_eq!(sample.progress, 0.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn commit_only_beyond_max() {
        assert!(matches!(at_depth(-0.4), PressStep::Holding(_)));
        match at_depth(-0.41) {
            PressStep::Committed(sample) => assert_eq!(sample.progress, 1.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn face_point_is_clamped() {
        let step = evaluate(Vec3::new(0.9, -0.7, -0.1), Vec3::splat(0.5), &thresholds());
        match step {
            PressStep::Holding(sample) => assert_eq!(sample.face, (0.5, -0.5)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn re_enable_uses_configured_distance() {
        let t = thresholds().with_re_enable_distance(0.02);
        assert!(!should_re_enable(0.0, &t));
        assert!(should_re_enable(0.02, &t));

        let follows_touch = thresholds().with_touch_distance(0.06);
        assert!(!should_re_enable(0.05, &follows_touch));
        assert!(should_re_enable(0.06, &follows_touch));
    }

    #[test]
    fn empty_interval_lerps_to_zero() {
        assert_eq!(inverse_lerp(1.0, 1.0, 5.0), 0.0);
        assert_eq!(inverse_lerp(0.0, 4.0, 1.0), 0.25);
    }
}
