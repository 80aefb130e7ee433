//! Touchable 3D Button
//!
//! A button is a control without a value mapping whose press commits with a
//! trigger. What happens after the trigger is chosen per control.

use super::{ControlSpec, Transform3D};
use crate::interaction::ControlBounds;
use serde::{Deserialize, Serialize};

/// Behaviour after a press commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Fire once, then stay Disabled until the pointer backs out.
    #[default]
    OneShot,
    /// Fire and release back to Hover; fires again after the pointer backs out.
    Repeat,
    /// Overtravel does not fire. Used by sliders and dials.
    Never,
}

impl TriggerPolicy {
    /// Whether overtravel fires a trigger at all.
    pub fn fires(self) -> bool {
        self != TriggerPolicy::Never
    }
}

impl ControlSpec {
    /// One-shot button with a unit box sized by the transform scale.
    pub fn button(name: impl Into<String>, transform: Transform3D) -> Self {
        Self {
            name: name.into(),
            bounds: ControlBounds::unit(transform),
            trigger: TriggerPolicy::OneShot,
            value: None,
        }
    }

    /// Builder: Set trigger policy
    pub fn with_trigger(mut self, trigger: TriggerPolicy) -> Self {
        self.trigger = trigger;
        self
    }
}
