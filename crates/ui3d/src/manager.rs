//! Panel - owns the controls and pointers and arbitrates between them each tick

use crate::components::{Control, ControlSpec, PanelThresholds, Pressable};
use crate::error::{ConfigError, InvariantViolation, PanelError, TransitionError};
use crate::interaction::events::Emitter;
use crate::interaction::{ControlState, FeedbackSink};
use glam::Vec3;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};
use xrpanel_core::{ControlId, PointerId, SimTick};

/// Where a pointer sits until its first position update: far in front of
/// the panel, finite so that rotated transforms stay well defined.
pub const PARKED_POINTER: Vec3 = Vec3::new(0.0, 0.0, 1.0e3);

/// Collects pointers, controls and thresholds, then validates them into a [`Panel`].
#[derive(Debug, Clone, Default)]
pub struct PanelBuilder {
    thresholds: PanelThresholds,
    pointers: Vec<String>,
    controls: Vec<ControlSpec>,
}

impl PanelBuilder {
    pub fn new(thresholds: PanelThresholds) -> Self {
        Self {
            thresholds,
            ..Default::default()
        }
    }

    /// Register a pointer. Pointers are polled in registration order.
    pub fn pointer(mut self, name: impl Into<String>) -> Self {
        self.pointers.push(name.into());
        self
    }

    /// Register a control. Controls are arbitrated in registration order.
    pub fn control(mut self, spec: ControlSpec) -> Self {
        self.controls.push(spec);
        self
    }

    pub fn build(self) -> Result<Panel, ConfigError> {
        self.thresholds.validate()?;
        if self.pointers.is_empty() {
            return Err(ConfigError::NoPointers);
        }
        if self.pointers.len() > u16::MAX as usize {
            return Err(ConfigError::TooMany("pointers"));
        }
        if self.controls.len() > u16::MAX as usize {
            return Err(ConfigError::TooMany("controls"));
        }
        check_unique("pointer", self.pointers.iter().map(String::as_str))?;
        check_unique("control", self.controls.iter().map(|c| c.name.as_str()))?;

        let controls = self
            .controls
            .iter()
            .enumerate()
            .map(|(i, spec)| Control::from_spec(ControlId(i as u16), spec))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            pointers = self.pointers.len(),
            controls = controls.len(),
            "panel built"
        );

        let pointer_count = self.pointers.len();
        Ok(Panel {
            thresholds: self.thresholds,
            pointer_names: self.pointers,
            pointer_positions: vec![PARKED_POINTER; pointer_count],
            distances: vec![f32::INFINITY; controls.len() * pointer_count],
            controls,
            tick: SimTick::ZERO,
        })
    }
}

fn check_unique<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ConfigError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// A set of controls sharing thresholds and a fixed set of pointers.
///
/// Each [`Panel::tick`] measures every pointer against every control, runs
/// hover/touch arbitration for all controls, and only then runs each
/// control's drive step. A pointer is bound to at most one control.
#[derive(Debug, Clone)]
pub struct Panel {
    thresholds: PanelThresholds,
    pointer_names: Vec<String>,
    pointer_positions: Vec<Vec3>,
    controls: Vec<Control>,
    /// Row-major `controls x pointers` proximity metrics from the last tick.
    distances: Vec<f32>,
    tick: SimTick,
}

impl Panel {
    pub fn builder(thresholds: PanelThresholds) -> PanelBuilder {
        PanelBuilder::new(thresholds)
    }

    pub fn thresholds(&self) -> &PanelThresholds {
        &self.thresholds
    }

    /// Replace the thresholds. Takes effect on the next tick; control states are kept.
    pub fn set_thresholds(&mut self, thresholds: PanelThresholds) -> Result<(), ConfigError> {
        if let Err(err) = thresholds.validate() {
            warn!(%err, "rejected threshold update");
            return Err(err);
        }
        debug!(?thresholds, "thresholds updated");
        self.thresholds = thresholds;
        Ok(())
    }

    /// Tick that the next call to [`Panel::tick`] will process.
    pub fn current_tick(&self) -> SimTick {
        self.tick
    }

    pub fn pointer_count(&self) -> usize {
        self.pointer_names.len()
    }

    pub fn pointer_id(&self, name: &str) -> Option<PointerId> {
        self.pointer_names
            .iter()
            .position(|n| n == name)
            .map(|i| PointerId(i as u16))
    }

    pub fn pointer_name(&self, id: PointerId) -> Option<&str> {
        self.pointer_names.get(id.index()).map(String::as_str)
    }

    pub fn pointer_position(&self, id: PointerId) -> Option<Vec3> {
        self.pointer_positions.get(id.index()).copied()
    }

    pub fn set_pointer_position(&mut self, id: PointerId, position: Vec3) -> Result<(), PanelError> {
        if !position.is_finite() {
            return Err(non_finite(position).into());
        }
        let slot = self
            .pointer_positions
            .get_mut(id.index())
            .ok_or(PanelError::UnknownPointer(id))?;
        *slot = position;
        Ok(())
    }

    /// Replace all pointer positions at once, in registration order.
    pub fn update_pointers(&mut self, positions: &[Vec3]) -> Result<(), PanelError> {
        if positions.len() != self.pointer_positions.len() {
            return Err(PanelError::PointerCountMismatch {
                expected: self.pointer_positions.len(),
                got: positions.len(),
            });
        }
        if let Some(bad) = positions.iter().find(|p| !p.is_finite()) {
            return Err(non_finite(*bad).into());
        }
        self.pointer_positions.copy_from_slice(positions);
        Ok(())
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn control(&self, id: ControlId) -> Option<&Control> {
        self.controls.get(id.index())
    }

    pub fn control_id(&self, name: &str) -> Option<ControlId> {
        self.controls
            .iter()
            .find(|c| c.name() == name)
            .map(Control::id)
    }

    pub fn state(&self, id: ControlId) -> Option<ControlState> {
        self.control(id).map(Pressable::state)
    }

    /// Proximity metric measured on the last tick.
    pub fn distance(&self, control: ControlId, pointer: PointerId) -> Option<f32> {
        if control.index() >= self.controls.len() || pointer.index() >= self.pointer_count() {
            return None;
        }
        self.distances
            .get(control.index() * self.pointer_count() + pointer.index())
            .copied()
    }

    /// Control that currently holds `pointer` as its active pointer.
    pub fn owner_of(&self, pointer: PointerId) -> Option<ControlId> {
        self.controls
            .iter()
            .find(|c| c.active_pointer() == Some(pointer))
            .map(Control::id)
    }

    /// Set a value control's committed value from application code.
    ///
    /// Emits a value-changed event only if the value actually changed.
    pub fn set_value(
        &mut self,
        id: ControlId,
        value: f32,
        sink: &mut dyn FeedbackSink,
    ) -> Result<bool, PanelError> {
        let tick = self.tick;
        let control = self
            .controls
            .get_mut(id.index())
            .ok_or(PanelError::UnknownControl(id))?;
        if control.state() == ControlState::Press {
            return Err(PanelError::ControlBusy(id));
        }
        let value_control = control
            .value_control_mut()
            .ok_or(PanelError::NotAValueControl(id))?;
        let mut out = Emitter::new(tick, id, sink);
        Ok(value_control.set(value, &mut out)?)
    }

    /// Run one simulation tick and return the tick that was processed.
    pub fn tick(&mut self, sink: &mut dyn FeedbackSink) -> SimTick {
        let tick = self.tick;
        self.measure();
        self.arbitrate(tick, sink);
        for control in &mut self.controls {
            let mut out = Emitter::new(tick, control.id(), sink);
            control.drive(&self.thresholds, &self.pointer_positions, &mut out);
        }
        self.repair_invariants(tick, sink);
        self.tick = tick.advance(1);
        tick
    }

    fn measure(&mut self) {
        let pointers = self.pointer_positions.len();
        for (ci, control) in self.controls.iter().enumerate() {
            let row = &mut self.distances[ci * pointers..(ci + 1) * pointers];
            for (slot, position) in row.iter_mut().zip(&self.pointer_positions) {
                *slot = control.bounds().distance(*position);
            }
        }
    }

    /// Hover/touch resolution for every control, in registration order.
    fn arbitrate(&mut self, tick: SimTick, sink: &mut dyn FeedbackSink) {
        let Self {
            thresholds,
            controls,
            distances,
            pointer_positions,
            ..
        } = self;
        let pointers = pointer_positions.len();

        let mut owners: Vec<Option<ControlId>> = vec![None; pointers];
        for control in controls.iter() {
            if let Some(pointer) = control.active_pointer() {
                if let Some(slot) = owners.get_mut(pointer.index()) {
                    if slot.is_none() {
                        *slot = Some(control.id());
                    }
                }
            }
        }

        for (ci, control) in controls.iter_mut().enumerate() {
            let state = control.state();
            if matches!(state, ControlState::Press | ControlState::Disabled) {
                continue;
            }

            let row = &distances[ci * pointers..(ci + 1) * pointers];
            let within_touch = |i: usize| row[i] <= thresholds.touch_distance;
            let touch = match control.active_pointer() {
                Some(own) => (own.index() < pointers && within_touch(own.index())).then_some(own),
                None => (0..pointers)
                    .find(|&i| within_touch(i) && owners[i].is_none())
                    .map(|i| PointerId(i as u16)),
            };
            let hover = row.iter().any(|&d| d <= thresholds.hover_distance);

            let mut out = Emitter::new(tick, control.id(), sink);
            let result = match (touch, state) {
                (Some(pointer), ControlState::Inactive | ControlState::Hover) => {
                    claim(&mut owners, pointer, control.id())
                        .and_then(|()| control.start_touch(pointer, &mut out))
                }
                (Some(_), _) => Ok(()),
                (None, ControlState::Touch) => {
                    if let Some(slot) = control
                        .active_pointer()
                        .and_then(|p| owners.get_mut(p.index()))
                    {
                        *slot = None;
                    }
                    control.stop_touch(&mut out)
                }
                (None, ControlState::Inactive) if hover => control.start_hover(&mut out),
                (None, ControlState::Hover) if !hover => control.stop_hover(&mut out),
                _ => Ok(()),
            };
            if let Err(err) = result {
                warn!(control = %control.id(), %err, "arbitration transition rejected");
            }
        }
    }

    /// Check the pointer/state invariants across all controls.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut owners: Vec<Option<ControlId>> = vec![None; self.pointer_count()];
        for control in &self.controls {
            let state = control.state();
            let pointer = control.active_pointer();
            if pointer.is_some() != state.holds_pointer() {
                return Err(InvariantViolation::PointerStateMismatch {
                    control: control.id(),
                    state,
                    pointer,
                });
            }
            let Some(pointer) = pointer else { continue };
            let slot = owners
                .get_mut(pointer.index())
                .ok_or(InvariantViolation::DanglingPointer {
                    control: control.id(),
                    pointer,
                })?;
            if let Some(first) = *slot {
                return Err(InvariantViolation::SharedPointer {
                    pointer,
                    first,
                    second: control.id(),
                });
            }
            *slot = Some(control.id());
        }
        Ok(())
    }

    /// Log each violation and force the offending control back to Hover.
    fn repair_invariants(&mut self, tick: SimTick, sink: &mut dyn FeedbackSink) {
        for _ in 0..=self.controls.len() {
            let violation = match self.check_invariants() {
                Ok(()) => return,
                Err(violation) => violation,
            };
            error!(%tick, %violation, "control invariant violated; releasing control");
            let offender = match violation {
                InvariantViolation::PointerStateMismatch { control, .. }
                | InvariantViolation::DanglingPointer { control, .. } => control,
                InvariantViolation::SharedPointer { second, .. } => second,
            };
            if let Some(control) = self.controls.get_mut(offender.index()) {
                let mut out = Emitter::new(tick, offender, sink);
                control.force_release(&mut out);
            }
        }
    }
}

/// Bind `pointer` to `control`, refusing a pointer another control already holds.
fn claim(
    owners: &mut [Option<ControlId>],
    pointer: PointerId,
    control: ControlId,
) -> Result<(), TransitionError> {
    match owners.get_mut(pointer.index()) {
        Some(Some(owner)) if *owner != control => Err(TransitionError::PointerClaimed {
            pointer,
            owner: *owner,
        }),
        Some(slot) => {
            *slot = Some(control);
            Ok(())
        }
        None => Ok(()),
    }
}

fn non_finite(position: Vec3) -> ConfigError {
    let bad = position
        .to_array()
        .into_iter()
        .find(|v| !v.is_finite())
        .unwrap_or(f32::NAN);
    ConfigError::NonFiniteValue(bad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Transform3D, ValueSpec};
    use crate::interaction::{ControlEvent, EventLog};

    fn two_buttons() -> Panel {
        Panel::builder(PanelThresholds::default())
            .pointer("left")
            .pointer("right")
            .control(ControlSpec::button("a", Transform3D::new(Vec3::ZERO)))
            .control(ControlSpec::button("b", Transform3D::new(Vec3::new(0.5, 0.0, 0.0))))
            .build()
            .expect("valid panel")
    }

    #[test]
    fn builder_rejects_bad_setups() {
        let empty = Panel::builder(PanelThresholds::default()).build();
        assert_eq!(empty.unwrap_err(), ConfigError::NoPointers);

        let dup = Panel::builder(PanelThresholds::default())
            .pointer("hand")
            .control(ControlSpec::button("x", Transform3D::default()))
            .control(ControlSpec::button("x", Transform3D::default()))
            .build();
        assert!(matches!(dup, Err(ConfigError::DuplicateName { kind: "control", .. })));

        let bad_range = Panel::builder(PanelThresholds::default())
            .pointer("hand")
            .control(ControlSpec::valued(
                "s",
                Transform3D::default(),
                ValueSpec::int_slider(4, 1, 2),
            ))
            .build();
        assert!(matches!(bad_range, Err(ConfigError::InvertedRange { .. })));

        let mut no_integer = ValueSpec::int_slider(0, 1, 0);
        no_integer.range.min = 0.3;
        no_integer.range.max = 0.7;
        no_integer.current = 0.5;
        let no_integer = Panel::builder(PanelThresholds::default())
            .pointer("hand")
            .control(ControlSpec::valued("s", Transform3D::default(), no_integer))
            .build();
        assert!(matches!(no_integer, Err(ConfigError::EmptyIntegerRange { .. })));
    }

    #[test]
    fn unpositioned_pointers_measure_finite_distances() {
        let tilted = Transform3D::new(Vec3::new(0.3, -0.2, 0.1))
            .with_rotation(glam::Quat::from_euler(glam::EulerRot::XYZ, 0.7, -1.2, 2.5))
            .with_scale(Vec3::new(0.2, 1.5, 0.05));
        let mut panel = Panel::builder(PanelThresholds::default())
            .pointer("hand")
            .control(ControlSpec::button("tilted", tilted))
            .build()
            .unwrap();
        let mut log = EventLog::new();

        assert_eq!(panel.pointer_position(PointerId(0)), Some(PARKED_POINTER));
        panel.tick(&mut log);
        let d = panel.distance(ControlId(0), PointerId(0)).unwrap();
        assert!(d.is_finite() && d > 100.0, "distance {d}");
        assert!(panel.controls()[0].bounds().depth(PARKED_POINTER).is_finite());
        assert!(log.is_empty());
        assert_eq!(panel.state(ControlId(0)), Some(ControlState::Inactive));
    }

    #[test]
    fn far_pointers_leave_everything_inactive() {
        let mut panel = two_buttons();
        let mut log = EventLog::new();
        panel
            .update_pointers(&[Vec3::new(5.0, 0.0, 0.0), Vec3::new(-5.0, 0.0, 0.0)])
            .unwrap();
        panel.tick(&mut log);
        assert!(log.is_empty());
        assert_eq!(panel.state(ControlId(0)), Some(ControlState::Inactive));
    }

    #[test]
    fn hover_then_unhover() {
        let mut panel = two_buttons();
        let mut log = EventLog::new();
        let left = PointerId(0);
        panel.update_pointers(&[Vec3::new(0.0, 0.0, 0.55), Vec3::splat(9.0)]).unwrap();
        panel.tick(&mut log);
        assert_eq!(panel.state(ControlId(0)), Some(ControlState::Hover));
        assert_eq!(panel.owner_of(left), None);

        panel.set_pointer_position(left, Vec3::new(0.0, 0.0, 3.0)).unwrap();
        panel.tick(&mut log);
        assert_eq!(panel.state(ControlId(0)), Some(ControlState::Inactive));
    }

    #[test]
    fn first_control_in_order_wins_a_shared_pointer() {
        let mut panel = two_buttons();
        let mut log = EventLog::new();
        // Inside the overlap of both boxes.
        panel.update_pointers(&[Vec3::new(0.4, 0.0, 0.0), Vec3::splat(9.0)]).unwrap();
        panel.tick(&mut log);
        assert_eq!(panel.state(ControlId(0)), Some(ControlState::Touch));
        assert_eq!(panel.state(ControlId(1)), Some(ControlState::Hover));
        assert_eq!(panel.owner_of(PointerId(0)), Some(ControlId(0)));
        assert!(panel.check_invariants().is_ok());
    }

    #[test]
    fn first_pointer_in_order_wins_a_control() {
        let mut panel = two_buttons();
        let mut log = EventLog::new();
        panel
            .update_pointers(&[Vec3::new(-0.3, 0.0, 0.0), Vec3::new(-0.2, 0.0, 0.0)])
            .unwrap();
        panel.tick(&mut log);
        assert_eq!(
            panel.control(ControlId(0)).unwrap().active_pointer(),
            Some(PointerId(0))
        );
    }

    #[test]
    fn touch_drops_back_to_hover_when_pointer_leaves() {
        let mut panel = two_buttons();
        let mut log = EventLog::new();
        panel.update_pointers(&[Vec3::new(-0.3, 0.0, 0.0), Vec3::splat(9.0)]).unwrap();
        panel.tick(&mut log);
        panel.set_pointer_position(PointerId(0), Vec3::new(-0.3, 0.0, 0.55)).unwrap();
        panel.tick(&mut log);
        assert_eq!(panel.state(ControlId(0)), Some(ControlState::Hover));
        assert_eq!(panel.owner_of(PointerId(0)), None);
    }

    #[test]
    fn pointer_batch_must_match() {
        let mut panel = two_buttons();
        assert_eq!(
            panel.update_pointers(&[Vec3::ZERO]),
            Err(PanelError::PointerCountMismatch {
                expected: 2,
                got: 1
            })
        );
        assert!(matches!(
            panel.set_pointer_position(PointerId(0), Vec3::new(f32::NAN, 0.0, 0.0)),
            Err(PanelError::Config(ConfigError::NonFiniteValue(_)))
        ));
        assert_eq!(
            panel.set_pointer_position(PointerId(7), Vec3::ZERO),
            Err(PanelError::UnknownPointer(PointerId(7)))
        );
    }

    #[test]
    fn rejected_threshold_update_keeps_old_values() {
        let mut panel = two_buttons();
        let bad = PanelThresholds::default().with_hover_distance(0.001);
        assert!(panel.set_thresholds(bad).is_err());
        assert_eq!(panel.thresholds(), &PanelThresholds::default());
    }

    #[test]
    fn set_value_emits_only_on_change() {
        let mut panel = Panel::builder(PanelThresholds::default())
            .pointer("hand")
            .control(ControlSpec::valued(
                "volume",
                Transform3D::default(),
                ValueSpec::int_slider(0, 10, 5),
            ))
            .control(ControlSpec::button("ok", Transform3D::new(Vec3::X * 3.0)))
            .build()
            .unwrap();
        let mut log = EventLog::new();
        let volume = panel.control_id("volume").unwrap();

        assert_eq!(panel.set_value(volume, 7.0, &mut log), Ok(true));
        assert_eq!(panel.set_value(volume, 7.0, &mut log), Ok(false));
        assert_eq!(log.len(), 1);
        assert!(matches!(
            log.events()[0].event,
            ControlEvent::ValueChanged { .. }
        ));
        assert_eq!(
            panel.set_value(ControlId(1), 1.0, &mut log),
            Err(PanelError::NotAValueControl(ControlId(1)))
        );
    }

    #[test]
    fn claimed_pointer_is_refused() {
        let mut owners = vec![None, Some(ControlId(3))];
        assert_eq!(claim(&mut owners, PointerId(0), ControlId(1)), Ok(()));
        assert_eq!(owners[0], Some(ControlId(1)));
        assert_eq!(
            claim(&mut owners, PointerId(1), ControlId(1)),
            Err(TransitionError::PointerClaimed {
                pointer: PointerId(1),
                owner: ControlId(3)
            })
        );
    }

    #[test]
    fn distances_are_recorded_per_pair() {
        let mut panel = two_buttons();
        panel.update_pointers(&[Vec3::new(-1.0, 0.0, 0.0), Vec3::ZERO]).unwrap();
        panel.tick(&mut crate::interaction::NullSink);
        let d = panel.distance(ControlId(0), PointerId(0)).unwrap();
        assert!((d - 0.5).abs() < 1e-6);
        assert_eq!(panel.distance(ControlId(0), PointerId(1)), Some(0.0));
        assert_eq!(panel.distance(ControlId(3), PointerId(0)), None);
    }
}
