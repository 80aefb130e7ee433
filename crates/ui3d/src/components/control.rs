//! A touchable control: state machine core, bounds and optional value mapping

use super::{PanelThresholds, Pressable, Transform3D, TriggerPolicy, ValueControl, ValueSpec};
use crate::error::{ConfigError, TransitionError};
use crate::interaction::events::{ControlEvent, Emitter};
use crate::interaction::press::{self, PressStep};
use crate::interaction::{ControlBounds, ControlState, StateMachine};
use glam::Vec3;
use tracing::{debug, error, warn};
use xrpanel_core::{ControlId, PointerId};

/// Setup description of a control.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlSpec {
    /// Unique name within the panel.
    pub name: String,
    /// Box and world transform.
    pub bounds: ControlBounds,
    /// What a committed press does.
    pub trigger: TriggerPolicy,
    /// Value mapping for sliders and dials.
    pub value: Option<ValueSpec>,
}

impl ControlSpec {
    /// Slider or dial. Overtravel does not trigger.
    pub fn valued(name: impl Into<String>, transform: Transform3D, value: ValueSpec) -> Self {
        Self {
            name: name.into(),
            bounds: ControlBounds::unit(transform),
            trigger: TriggerPolicy::Never,
            value: Some(value),
        }
    }

    /// Builder: Set local half-extents
    pub fn with_half_extents(mut self, half_extents: Vec3) -> Self {
        self.bounds.half_extents = half_extents;
        self
    }

    /// Check bounds and value configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bounds.validate(&self.name)?;
        if let Some(value) = &self.value {
            value.validate()?;
        }
        Ok(())
    }
}

/// Live control owned by a [`crate::Panel`].
#[derive(Debug, Clone)]
pub struct Control {
    id: ControlId,
    name: String,
    bounds: ControlBounds,
    machine: StateMachine,
    trigger: TriggerPolicy,
    value: Option<ValueControl>,
    press_progress: f32,
    /// Set after a repeat trigger; no new press starts until the pointer
    /// backs out past the press threshold or leaves the control.
    awaiting_retreat: bool,
}

impl Control {
    pub(crate) fn from_spec(id: ControlId, spec: &ControlSpec) -> Result<Self, ConfigError> {
        spec.validate()?;
        let value = spec.value.as_ref().map(ValueControl::from_spec).transpose()?;
        Ok(Self {
            id,
            name: spec.name.clone(),
            bounds: spec.bounds,
            machine: StateMachine::new(),
            trigger: spec.trigger,
            value,
            press_progress: 0.0,
            awaiting_retreat: false,
        })
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> &ControlBounds {
        &self.bounds
    }

    pub fn active_pointer(&self) -> Option<PointerId> {
        self.machine.active_pointer()
    }

    /// Pointer watched while Disabled.
    pub fn latched_pointer(&self) -> Option<PointerId> {
        self.machine.latched_pointer()
    }

    /// Value state, for sliders and dials.
    pub fn value_control(&self) -> Option<&ValueControl> {
        self.value.as_ref()
    }

    pub(crate) fn value_control_mut(&mut self) -> Option<&mut ValueControl> {
        self.value.as_mut()
    }

    pub(crate) fn start_hover(&mut self, out: &mut Emitter<'_>) -> Result<(), TransitionError> {
        self.machine.start_hover(out)
    }

    pub(crate) fn stop_hover(&mut self, out: &mut Emitter<'_>) -> Result<(), TransitionError> {
        self.machine.stop_hover(out)?;
        self.awaiting_retreat = false;
        Ok(())
    }

    pub(crate) fn start_touch(
        &mut self,
        pointer: PointerId,
        out: &mut Emitter<'_>,
    ) -> Result<(), TransitionError> {
        self.machine.start_touch(pointer, out)
    }

    pub(crate) fn stop_touch(&mut self, out: &mut Emitter<'_>) -> Result<(), TransitionError> {
        self.machine.stop_touch(out)?;
        self.awaiting_retreat = false;
        Ok(())
    }

    /// Whether a repeat trigger is waiting for the pointer to back out.
    pub fn awaiting_retreat(&self) -> bool {
        self.awaiting_retreat
    }

    /// Per-tick drive step. Runs after the panel finished arbitration.
    pub(crate) fn drive(
        &mut self,
        thresholds: &PanelThresholds,
        pointers: &[Vec3],
        out: &mut Emitter<'_>,
    ) {
        match self.machine.state() {
            ControlState::Touch => {
                let Some(position) = self.pointer_position(self.active_pointer(), pointers, out)
                else {
                    return;
                };
                let depth = self.bounds.depth(position);
                if self.awaiting_retreat {
                    if press::has_retreated(depth, thresholds) {
                        debug!(control = %self.id, depth, "repeat re-armed");
                        self.awaiting_retreat = false;
                    }
                    return;
                }
                if press::should_start_press(depth, thresholds) {
                    if let Err(err) = self.start_press(out) {
                        warn!(control = %self.id, %err, "press start rejected");
                        return;
                    }
                    self.do_press(thresholds, position, out);
                }
            }
            ControlState::Press => {
                let Some(position) = self.pointer_position(self.active_pointer(), pointers, out)
                else {
                    return;
                };
                self.do_press(thresholds, position, out);
            }
            ControlState::Disabled => self.check_re_enable(thresholds, pointers, out),
            ControlState::Inactive | ControlState::Hover => {}
        }
    }

    fn start_press(&mut self, out: &mut Emitter<'_>) -> Result<(), TransitionError> {
        self.machine.start_press(out)?;
        self.press_progress = 0.0;
        Ok(())
    }

    fn do_press(&mut self, thresholds: &PanelThresholds, position: Vec3, out: &mut Emitter<'_>) {
        let local = self.bounds.local_point(position);
        let step = press::evaluate(local, self.bounds.half_extents, thresholds);
        let sample = match step {
            PressStep::Retreated => {
                debug!(control = %self.id, depth = local.z, "press cancelled by retreat");
                self.stop_press(out);
                return;
            }
            PressStep::Holding(sample) | PressStep::Committed(sample) => sample,
        };

        if sample.progress != self.press_progress {
            self.press_progress = sample.progress;
            out.emit(ControlEvent::PressProgress {
                progress: sample.progress,
                depth: sample.depth,
                face_x: sample.face.0,
                face_y: sample.face.1,
            });
        }

        if let Some(value) = self.value.as_mut() {
            value.drive(local, self.bounds.half_extents, out);
        }

        if matches!(step, PressStep::Committed(_)) && self.trigger.fires() {
            self.trigger(out);
        }
    }

    fn stop_press(&mut self, out: &mut Emitter<'_>) {
        if let Err(err) = self.machine.stop_press(out) {
            warn!(control = %self.id, %err, "stop press rejected");
            return;
        }
        self.press_progress = 0.0;
        if let Some(value) = self.value.as_mut() {
            value.release(out);
        }
    }

    fn trigger(&mut self, out: &mut Emitter<'_>) {
        debug!(control = %self.id, name = %self.name, "triggered");
        out.emit(ControlEvent::Triggered);
        match self.trigger {
            TriggerPolicy::OneShot => {
                self.press_progress = 0.0;
                if let Some(value) = self.value.as_mut() {
                    value.release(out);
                }
                if let Err(err) = self.machine.disable(out) {
                    warn!(control = %self.id, %err, "disable after trigger rejected");
                }
            }
            TriggerPolicy::Repeat => {
                self.stop_press(out);
                self.awaiting_retreat = true;
            }
            TriggerPolicy::Never => {}
        }
    }

    fn check_re_enable(
        &mut self,
        thresholds: &PanelThresholds,
        pointers: &[Vec3],
        out: &mut Emitter<'_>,
    ) {
        let depth = match self.latched_pointer() {
            Some(pointer) => match pointers.get(pointer.index()) {
                Some(position) => self.bounds.depth(*position),
                None => {
                    error!(control = %self.id, %pointer, "latched pointer missing; re-enabling");
                    f32::INFINITY
                }
            },
            None => {
                warn!(control = %self.id, "disabled without a latched pointer; re-enabling");
                f32::INFINITY
            }
        };
        if press::should_re_enable(depth, thresholds) {
            if let Err(err) = self.machine.re_enable(out) {
                warn!(control = %self.id, %err, "re-enable rejected");
            }
        }
    }

    /// Resolve the active pointer's position, releasing the control if it has none.
    fn pointer_position(
        &mut self,
        pointer: Option<PointerId>,
        pointers: &[Vec3],
        out: &mut Emitter<'_>,
    ) -> Option<Vec3> {
        let position = pointer.and_then(|p| pointers.get(p.index()).copied());
        if position.is_none() {
            error!(
                control = %self.id,
                state = %self.machine.state(),
                ?pointer,
                "active state without a usable pointer; releasing"
            );
            self.force_release(out);
        }
        position
    }

    /// Drop all bindings and return to Hover. Recovery for broken invariants.
    pub(crate) fn force_release(&mut self, out: &mut Emitter<'_>) {
        self.press_progress = 0.0;
        self.awaiting_retreat = false;
        if let Some(value) = self.value.as_mut() {
            value.release(out);
        }
        self.machine.force_release(out);
    }
}

impl Pressable for Control {
    fn state(&self) -> ControlState {
        self.machine.state()
    }

    fn press_progress(&self) -> f32 {
        self.press_progress
    }

    fn trigger_policy(&self) -> TriggerPolicy {
        self.trigger
    }
}
