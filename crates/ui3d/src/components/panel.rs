//! Panel-wide interaction thresholds

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Distances shared by every control on a panel, in world units except the
/// press distances, which are measured in control-local depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelThresholds {
    /// Proximity at or below which a pointer hovers a control.
    pub hover_distance: f32,
    /// Proximity at or below which a pointer may touch a control.
    pub touch_distance: f32,
    /// Depth a touching pointer must pass to start a press; also the retreat
    /// distance that cancels one.
    pub press_threshold_distance: f32,
    /// Depth at which a press commits.
    pub press_max_distance: f32,
    /// Depth a disabled control's pointer must back out to before re-enabling.
    /// `None` follows `touch_distance`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub re_enable_distance: Option<f32>,
}

impl Default for PanelThresholds {
    fn default() -> Self {
        Self {
            hover_distance: 0.1,
            touch_distance: 0.02,
            press_threshold_distance: 0.01,
            press_max_distance: 0.4,
            re_enable_distance: None,
        }
    }
}

impl PanelThresholds {
    /// Builder: Set hover distance
    pub fn with_hover_distance(mut self, distance: f32) -> Self {
        self.hover_distance = distance;
        self
    }

    /// Builder: Set touch distance
    pub fn with_touch_distance(mut self, distance: f32) -> Self {
        self.touch_distance = distance;
        self
    }

    /// Builder: Set press threshold distance
    pub fn with_press_threshold_distance(mut self, distance: f32) -> Self {
        self.press_threshold_distance = distance;
        self
    }

    /// Builder: Set press max distance
    pub fn with_press_max_distance(mut self, distance: f32) -> Self {
        self.press_max_distance = distance;
        self
    }

    /// Builder: Set re-enable distance (instead of following touch distance)
    pub fn with_re_enable_distance(mut self, distance: f32) -> Self {
        self.re_enable_distance = Some(distance);
        self
    }

    /// Re-enable depth in effect: the explicit value, else the touch distance.
    pub fn re_enable_distance(&self) -> f32 {
        self.re_enable_distance.unwrap_or(self.touch_distance)
    }

    /// Check every threshold and their ordering.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("hover_distance", self.hover_distance),
            ("touch_distance", self.touch_distance),
            ("press_threshold_distance", self.press_threshold_distance),
            ("press_max_distance", self.press_max_distance),
        ];
        for (name, value) in named {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        // Zero is allowed here: re-enable as soon as the pointer is back at the surface.
        let re_enable = self.re_enable_distance();
        if !re_enable.is_finite() || re_enable < 0.0 {
            return Err(ConfigError::InvalidThreshold {
                name: "re_enable_distance",
                value: re_enable,
            });
        }
        if self.hover_distance < self.touch_distance {
            return Err(ConfigError::HoverInsideTouch {
                hover: self.hover_distance,
                touch: self.touch_distance,
            });
        }
        if self.press_max_distance <= self.press_threshold_distance {
            return Err(ConfigError::PressRangeEmpty {
                threshold: self.press_threshold_distance,
                max: self.press_max_distance,
            });
        }
        Ok(())
    }
}
