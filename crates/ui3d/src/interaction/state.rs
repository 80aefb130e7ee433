//! Control state machine core

use crate::error::{ConfigError, TransitionError};
use crate::interaction::events::{ControlEvent, Emitter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use xrpanel_core::PointerId;

/// Interaction state of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlState {
    /// No pointer nearby.
    Inactive,
    /// A pointer is within hover distance.
    Hover,
    /// A pointer is within touch distance and bound to the control.
    Touch,
    /// The bound pointer pushed past the press threshold.
    Press,
    /// Triggered one-shot control waiting for its pointer to back out.
    Disabled,
}

impl ControlState {
    /// States in which the control owns a pointer.
    pub fn holds_pointer(self) -> bool {
        matches!(self, ControlState::Touch | ControlState::Press)
    }

    /// Lower-case name, as used in traces.
    pub fn as_str(self) -> &'static str {
        match self {
            ControlState::Inactive => "inactive",
            ControlState::Hover => "hover",
            ControlState::Touch => "touch",
            ControlState::Press => "press",
            ControlState::Disabled => "disabled",
        }
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlState {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inactive" => Ok(ControlState::Inactive),
            "hover" => Ok(ControlState::Hover),
            "touch" => Ok(ControlState::Touch),
            "press" => Ok(ControlState::Press),
            "disabled" => Ok(ControlState::Disabled),
            _ => Err(ConfigError::UnknownState(s.to_string())),
        }
    }
}

/// State plus pointer binding of one control.
///
/// All mutation goes through the entry/exit actions below, which keep
/// `active_pointer.is_some() == state.holds_pointer()` and emit a
/// [`ControlEvent::StateChanged`] for every actual change.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMachine {
    state: ControlState,
    active_pointer: Option<PointerId>,
    /// Pointer that triggered a one-shot control; watched while Disabled.
    latched_pointer: Option<PointerId>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: ControlState::Inactive,
            active_pointer: None,
            latched_pointer: None,
        }
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn active_pointer(&self) -> Option<PointerId> {
        self.active_pointer
    }

    pub fn latched_pointer(&self) -> Option<PointerId> {
        self.latched_pointer
    }

    pub(crate) fn start_hover(&mut self, out: &mut Emitter<'_>) -> Result<(), TransitionError> {
        self.require("start hover", &[ControlState::Inactive])?;
        self.enter(ControlState::Hover, out);
        Ok(())
    }

    pub(crate) fn stop_hover(&mut self, out: &mut Emitter<'_>) -> Result<(), TransitionError> {
        self.require("stop hover", &[ControlState::Hover])?;
        self.enter(ControlState::Inactive, out);
        Ok(())
    }

    pub(crate) fn start_touch(
        &mut self,
        pointer: PointerId,
        out: &mut Emitter<'_>,
    ) -> Result<(), TransitionError> {
        self.require("start touch", &[ControlState::Inactive, ControlState::Hover])?;
        self.active_pointer = Some(pointer);
        self.enter(ControlState::Touch, out);
        Ok(())
    }

    pub(crate) fn stop_touch(&mut self, out: &mut Emitter<'_>) -> Result<(), TransitionError> {
        self.require("stop touch", &[ControlState::Touch])?;
        self.active_pointer = None;
        self.enter(ControlState::Hover, out);
        Ok(())
    }

    pub(crate) fn start_press(&mut self, out: &mut Emitter<'_>) -> Result<(), TransitionError> {
        self.require("start press", &[ControlState::Touch])?;
        self.enter(ControlState::Press, out);
        Ok(())
    }

    pub(crate) fn stop_press(&mut self, out: &mut Emitter<'_>) -> Result<(), TransitionError> {
        self.require("stop press", &[ControlState::Press])?;
        self.active_pointer = None;
        self.enter(ControlState::Hover, out);
        Ok(())
    }

    /// Press -> Disabled. The pointer is released but remembered for re-enable.
    pub(crate) fn disable(&mut self, out: &mut Emitter<'_>) -> Result<(), TransitionError> {
        self.require("disable", &[ControlState::Press])?;
        self.latched_pointer = self.active_pointer.take();
        self.enter(ControlState::Disabled, out);
        Ok(())
    }

    pub(crate) fn re_enable(&mut self, out: &mut Emitter<'_>) -> Result<(), TransitionError> {
        self.require("re-enable", &[ControlState::Disabled])?;
        self.latched_pointer = None;
        self.enter(ControlState::Inactive, out);
        Ok(())
    }

    /// Recovery path for broken invariants: drop every binding and fall back to Hover.
    pub(crate) fn force_release(&mut self, out: &mut Emitter<'_>) {
        self.active_pointer = None;
        self.latched_pointer = None;
        self.enter(ControlState::Hover, out);
    }

    fn require(
        &self,
        action: &'static str,
        allowed: &[ControlState],
    ) -> Result<(), TransitionError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(TransitionError::NotAllowed {
                action,
                from: self.state,
            })
        }
    }

    fn enter(&mut self, to: ControlState, out: &mut Emitter<'_>) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        debug!(control = %out.control(), tick = out.tick().0, %from, %to, "state change");
        out.emit(ControlEvent::StateChanged { from, to });
    }
}
