//! Touchable 3D panel controls for xrpanel
//!
//! This crate turns tracked pointer positions (fingertips, controller tips)
//! into press interactions on world-space controls. Each control is an
//! oriented box; pointers hover, touch and push through its front face.
//!
//! # Features
//!
//! - **Proximity**: axis-wise overshoot metric against oriented boxes
//! - **Controls**: buttons with one-shot or repeat triggers, sliders and dials
//! - **Arbitration**: one pointer per control, one control per pointer
//! - **Feedback**: state, press-progress, trigger and value events via a sink
//!
//! # Example
//!
//! ```rust
//! use glam::Vec3;
//! use xrpanel_ui3d::{ControlSpec, EventLog, Panel, PanelThresholds, Transform3D};
//!
//! let mut panel = Panel::builder(PanelThresholds::default())
//!     .pointer("right_index")
//!     .control(ControlSpec::button("ok", Transform3D::new(Vec3::ZERO)))
//!     .build()
//!     .unwrap();
//!
//! let mut events = EventLog::new();
//! panel.update_pointers(&[Vec3::new(0.0, 0.0, 0.55)]).unwrap();
//! panel.tick(&mut events);
//! ```

pub mod components;
pub mod error;
pub mod interaction;
pub mod manager;

// Re-export commonly used types
pub use components::{
    CommitPolicy, Control, ControlSpec, ControlValue, PanelThresholds, Pressable, Quantization,
    Transform3D, TriggerPolicy, ValueBearing, ValueControl, ValueMapping, ValueRange, ValueSpec,
};
pub use error::{ConfigError, InvariantViolation, PanelError, TransitionError};
pub use interaction::{
    ControlBounds, ControlEvent, ControlState, EventLog, FeedbackSink, NullSink, PanelEvent,
};
pub use manager::{Panel, PanelBuilder, PARKED_POINTER};
pub use xrpanel_core::{ControlId, PointerId, SimTick};

use anyhow::Result;

/// Version of the panel crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the panel system with default settings
pub fn init() -> Result<()> {
    tracing::info!("Initializing xrpanel-ui3d v{}", VERSION);
    Ok(())
}
