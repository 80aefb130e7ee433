#![warn(missing_docs)]
//! Core primitives shared across the workspace.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed simulation tick. One tick per rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

impl fmt::Display for SimTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick {}", self.0)
    }
}

/// Index of a tracked pointer within its panel.
///
/// Pointer membership is fixed when the panel is built, so the index is stable
/// for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PointerId(pub u16);

impl PointerId {
    /// Position of this pointer in the panel's pointer list.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pointer#{}", self.0)
    }
}

/// Index of a control within its panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ControlId(pub u16);

impl ControlId {
    /// Position of this control in the panel's control list.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control#{}", self.0)
    }
}
