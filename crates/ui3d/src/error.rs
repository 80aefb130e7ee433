//! Error types for panel setup and control transitions.

use crate::interaction::ControlState;
use thiserror::Error;
use xrpanel_core::{ControlId, PointerId};

/// Rejected configuration. Raised at setup or on a runtime reconfiguration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A threshold was zero, negative or not finite.
    #[error("threshold `{name}` must be positive and finite, got {value}")]
    InvalidThreshold {
        /// Threshold name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
    /// Hover must reach at least as far as touch.
    #[error("hover distance {hover} is smaller than touch distance {touch}")]
    HoverInsideTouch {
        /// Configured hover distance.
        hover: f32,
        /// Configured touch distance.
        touch: f32,
    },
    /// The commit depth has to lie beyond the press threshold.
    #[error("press max distance {max} must exceed press threshold distance {threshold}")]
    PressRangeEmpty {
        /// Press threshold distance.
        threshold: f32,
        /// Press max distance.
        max: f32,
    },
    /// Value range with min above max.
    #[error("value range is inverted: min {min} > max {max}")]
    InvertedRange {
        /// Range minimum.
        min: f32,
        /// Range maximum.
        max: f32,
    },
    /// Integer control whose range holds no whole number.
    #[error("integer range [{min}, {max}] contains no whole number")]
    EmptyIntegerRange {
        /// Range minimum.
        min: f32,
        /// Range maximum.
        max: f32,
    },
    /// Range bound or value that is NaN or infinite.
    #[error("value {0} is not finite")]
    NonFiniteValue(f32),
    /// Current value outside `[min, max]`.
    #[error("value {value} lies outside [{min}, {max}]")]
    ValueOutOfRange {
        /// Rejected value.
        value: f32,
        /// Range minimum.
        min: f32,
        /// Range maximum.
        max: f32,
    },
    /// Bounding box with a zero, negative or non-finite half-extent.
    #[error("control `{control}` has degenerate half-extents {half_extents:?}")]
    DegenerateBounds {
        /// Control name.
        control: String,
        /// Offending half-extents.
        half_extents: [f32; 3],
    },
    /// Transform scale that cannot be inverted.
    #[error("control `{control}` has non-invertible scale {scale:?}")]
    DegenerateScale {
        /// Control name.
        control: String,
        /// Offending scale.
        scale: [f32; 3],
    },
    /// Dial sweep must be positive.
    #[error("dial sweep must be positive and finite, got {0} degrees")]
    InvalidSweep(f32),
    /// Two controls or two pointers with the same name.
    #[error("duplicate {kind} name `{name}`")]
    DuplicateName {
        /// "control" or "pointer".
        kind: &'static str,
        /// Repeated name.
        name: String,
    },
    /// A panel needs at least one pointer to be useful.
    #[error("panel has no pointers")]
    NoPointers,
    /// Too many pointers or controls for the id space.
    #[error("too many {0} for a single panel")]
    TooMany(&'static str),
    /// State name that does not exist.
    #[error("unknown control state `{0}`")]
    UnknownState(String),
}

/// Entry/exit action attempted from a state that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Action not permitted from the current state.
    #[error("cannot {action} from {from:?}")]
    NotAllowed {
        /// Action name.
        action: &'static str,
        /// State the control was in.
        from: ControlState,
    },
    /// The pointer is already bound to a different control.
    #[error("{pointer} is already claimed by {owner}")]
    PointerClaimed {
        /// Requested pointer.
        pointer: PointerId,
        /// Control currently holding it.
        owner: ControlId,
    },
}

/// Broken state/pointer invariant. Programming error, reported and recovered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// Active pointer present outside Touch/Press, or missing inside them.
    #[error("{control} is {state:?} with active pointer {pointer:?}")]
    PointerStateMismatch {
        /// Control id.
        control: ControlId,
        /// Its state.
        state: ControlState,
        /// Its active pointer.
        pointer: Option<PointerId>,
    },
    /// One pointer bound to two controls.
    #[error("{pointer} is active on both {first} and {second}")]
    SharedPointer {
        /// Shared pointer.
        pointer: PointerId,
        /// First owner.
        first: ControlId,
        /// Second owner.
        second: ControlId,
    },
    /// Active pointer index outside the panel's pointer list.
    #[error("{control} references unknown {pointer}")]
    DanglingPointer {
        /// Control id.
        control: ControlId,
        /// Missing pointer.
        pointer: PointerId,
    },
}

/// Errors returned by [`crate::Panel`] operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PanelError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Control id not registered with this panel.
    #[error("unknown {0}")]
    UnknownControl(ControlId),
    /// Pointer id not registered with this panel.
    #[error("unknown {0}")]
    UnknownPointer(PointerId),
    /// Pointer batch length does not match the registered pointer count.
    #[error("expected {expected} pointer positions, got {got}")]
    PointerCountMismatch {
        /// Registered pointers.
        expected: usize,
        /// Supplied positions.
        got: usize,
    },
    /// Operation that needs a value control was called on a plain control.
    #[error("{0} does not carry a value")]
    NotAValueControl(ControlId),
    /// Value writes are refused while the pointer is driving the control.
    #[error("{0} is being pressed")]
    ControlBusy(ControlId),
}
