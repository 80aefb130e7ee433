//! Pointer interaction: proximity metric, control state machine, press protocol
//! and the feedback events they emit.

pub mod events;
pub mod press;
pub mod proximity;
pub mod state;

pub use events::{ControlEvent, EventLog, FeedbackSink, NullSink, PanelEvent};
pub use press::{inverse_lerp, PressSample, PressStep};
pub use proximity::ControlBounds;
pub use state::{ControlState, StateMachine};
