//! Feedback events
//!
//! The core never renders or plays audio. Every observable change is pushed to
//! a [`FeedbackSink`] synchronously, in the order it happens within a tick.
//! Consumers either react immediately or collect into an [`EventLog`] and poll.

use crate::components::ControlValue;
use crate::interaction::ControlState;
use serde::Serialize;
use xrpanel_core::{ControlId, SimTick};

/// Something a control did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlEvent {
    /// The control entered a new state.
    StateChanged {
        /// Previous state.
        from: ControlState,
        /// New state.
        to: ControlState,
    },
    /// Press progress moved while pressing.
    PressProgress {
        /// Normalized progress towards the commit depth, `[0, 1]`.
        progress: f32,
        /// Raw local-Z depth of the pointer.
        depth: f32,
        /// Pointer local X clamped to the control face.
        face_x: f32,
        /// Pointer local Y clamped to the control face.
        face_y: f32,
    },
    /// The press committed (click).
    Triggered,
    /// Uncommitted display value moved during a press.
    ValuePreview {
        /// Smoothed display value.
        display: f32,
        /// Display value normalized over the range.
        fill: f32,
    },
    /// The committed value changed.
    ValueChanged {
        /// New committed value.
        value: ControlValue,
    },
}

/// A [`ControlEvent`] stamped with where and when it happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelEvent {
    /// Tick that produced the event.
    pub tick: SimTick,
    /// Control that produced the event.
    pub control: ControlId,
    /// What happened.
    #[serde(flatten)]
    pub event: ControlEvent,
}

/// Receiver of feedback events. Called synchronously from inside the tick.
pub trait FeedbackSink {
    /// Handle one event. Must not call back into the panel.
    fn emit(&mut self, event: PanelEvent);
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FeedbackSink for NullSink {
    fn emit(&mut self, _event: PanelEvent) {}
}

/// Sink that records events for later polling.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<PanelEvent>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, oldest first.
    pub fn events(&self) -> &[PanelEvent] {
        &self.events
    }

    /// Take the recorded events, leaving the log empty.
    pub fn drain(&mut self) -> Vec<PanelEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events of one control.
    pub fn for_control(&self, control: ControlId) -> impl Iterator<Item = &ControlEvent> + '_ {
        self.events
            .iter()
            .filter(move |e| e.control == control)
            .map(|e| &e.event)
    }

    /// State transitions of one control as `(from, to)` pairs.
    pub fn transitions(&self, control: ControlId) -> Vec<(ControlState, ControlState)> {
        self.for_control(control)
            .filter_map(|e| match e {
                ControlEvent::StateChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    /// Number of triggers fired by one control.
    pub fn trigger_count(&self, control: ControlId) -> usize {
        self.for_control(control)
            .filter(|e| matches!(e, ControlEvent::Triggered))
            .count()
    }

    /// Committed value changes of one control.
    pub fn value_changes(&self, control: ControlId) -> Vec<ControlValue> {
        self.for_control(control)
            .filter_map(|e| match e {
                ControlEvent::ValueChanged { value } => Some(*value),
                _ => None,
            })
            .collect()
    }
}

impl FeedbackSink for EventLog {
    fn emit(&mut self, event: PanelEvent) {
        self.events.push(event);
    }
}

/// Stamps events for one control during one tick.
pub(crate) struct Emitter<'a> {
    tick: SimTick,
    control: ControlId,
    sink: &'a mut dyn FeedbackSink,
}

impl<'a> Emitter<'a> {
    pub(crate) fn new(tick: SimTick, control: ControlId, sink: &'a mut dyn FeedbackSink) -> Self {
        Self {
            tick,
            control,
            sink,
        }
    }

    pub(crate) fn control(&self) -> ControlId {
        self.control
    }

    pub(crate) fn tick(&self) -> SimTick {
        self.tick
    }

    pub(crate) fn emit(&mut self, event: ControlEvent) {
        self.sink.emit(PanelEvent {
            tick: self.tick,
            control: self.control,
            event,
        });
    }
}
