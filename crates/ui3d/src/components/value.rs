//! Value controls - sliders and dials
//!
//! A value control maps the pressing pointer's local position to a value in
//! `[min, max]`. While pressed it shows a continuous *display* value; the
//! *committed* value only changes on release (default) or continuously,
//! depending on [`CommitPolicy`].

use super::ValueBearing;
use crate::error::ConfigError;
use crate::interaction::events::{ControlEvent, Emitter};
use crate::interaction::inverse_lerp;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default dial sweep either side of local +Y, in degrees.
pub const DEFAULT_DIAL_SWEEP_DEGREES: f32 = 150.0;

/// How a local pointer position becomes a normalized `[0, 1]` position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueMapping {
    /// Local X across the control width: `+half.x` is min, `-half.x` is max.
    Slider,
    /// Angle around local Z, `atan2(-x, y)`; `-sweep` is min, `+sweep` is max.
    Dial {
        /// Degrees either side of local +Y.
        sweep_degrees: f32,
    },
}

impl ValueMapping {
    /// Dial with the default sweep.
    pub fn dial() -> Self {
        ValueMapping::Dial {
            sweep_degrees: DEFAULT_DIAL_SWEEP_DEGREES,
        }
    }

    /// Normalized position of `local` within the mapping, clamped to `[0, 1]`.
    pub fn normalized(&self, local: Vec3, half_extents: Vec3) -> f32 {
        let t = match *self {
            ValueMapping::Slider => inverse_lerp(half_extents.x, -half_extents.x, local.x),
            ValueMapping::Dial { sweep_degrees } => {
                // atan2(0, 0) is 0, so a pointer on the axis reads as the middle.
                let angle = (-local.x).atan2(local.y).to_degrees();
                inverse_lerp(-sweep_degrees, sweep_degrees, angle)
            }
        };
        t.clamp(0.0, 1.0)
    }
}

/// Value resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantization {
    /// Whole numbers, with quintic smoothing of the display value.
    Integer,
    /// Any float in range.
    Continuous,
}

/// When the display value is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Commit once, when the press ends.
    #[default]
    OnRelease,
    /// Commit on every drive tick where the quantized value moved.
    Continuous,
}

/// Committed value as seen by the application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ControlValue {
    /// Integer-quantized control.
    Int(i32),
    /// Continuous control.
    Float(f32),
}

impl ControlValue {
    /// Value as a float.
    pub fn as_f32(self) -> f32 {
        match self {
            ControlValue::Int(v) => v as f32,
            ControlValue::Float(v) => v,
        }
    }
}

/// Inclusive value range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for v in [self.min, self.max] {
            if !v.is_finite() {
                return Err(ConfigError::NonFiniteValue(v));
            }
        }
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn lerp(&self, t: f32) -> f32 {
        self.min + (self.max - self.min) * t
    }

    pub fn normalize(&self, value: f32) -> f32 {
        inverse_lerp(self.min, self.max, value).clamp(0.0, 1.0)
    }
}

/// Setup description of a value control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueSpec {
    pub mapping: ValueMapping,
    pub range: ValueRange,
    pub quantization: Quantization,
    pub commit: CommitPolicy,
    pub current: f32,
}

impl ValueSpec {
    /// Integer slider.
    pub fn int_slider(min: i32, max: i32, current: i32) -> Self {
        Self {
            mapping: ValueMapping::Slider,
            range: ValueRange::new(min as f32, max as f32),
            quantization: Quantization::Integer,
            commit: CommitPolicy::OnRelease,
            current: current as f32,
        }
    }

    /// Continuous slider.
    pub fn float_slider(min: f32, max: f32, current: f32) -> Self {
        Self {
            mapping: ValueMapping::Slider,
            range: ValueRange::new(min, max),
            quantization: Quantization::Continuous,
            commit: CommitPolicy::OnRelease,
            current,
        }
    }

    /// Integer dial with the default sweep.
    pub fn int_dial(min: i32, max: i32, current: i32) -> Self {
        Self {
            mapping: ValueMapping::dial(),
            range: ValueRange::new(min as f32, max as f32),
            quantization: Quantization::Integer,
            commit: CommitPolicy::OnRelease,
            current: current as f32,
        }
    }

    /// Builder: Set commit policy
    pub fn with_commit(mut self, commit: CommitPolicy) -> Self {
        self.commit = commit;
        self
    }

    /// Builder: Set mapping
    pub fn with_mapping(mut self, mapping: ValueMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.range.validate()?;
        if self.quantization == Quantization::Integer
            && self.range.min.ceil() > self.range.max.floor()
        {
            return Err(ConfigError::EmptyIntegerRange {
                min: self.range.min,
                max: self.range.max,
            });
        }
        if !self.current.is_finite() {
            return Err(ConfigError::NonFiniteValue(self.current));
        }
        if !self.range.contains(self.current) {
            return Err(ConfigError::ValueOutOfRange {
                value: self.current,
                min: self.range.min,
                max: self.range.max,
            });
        }
        if let ValueMapping::Dial { sweep_degrees } = self.mapping {
            if !sweep_degrees.is_finite() || sweep_degrees <= 0.0 {
                return Err(ConfigError::InvalidSweep(sweep_degrees));
            }
        }
        Ok(())
    }
}

/// Quintic ease-in/ease-out on `[0, 1]`.
pub fn quintic_in_out(t: f32) -> f32 {
    if t < 0.5 {
        16.0 * t.powi(5)
    } else {
        16.0 * (t - 1.0).powi(5) + 1.0
    }
}

/// `floor(raw)` plus the eased fractional part, so the display lingers near
/// whole numbers instead of snapping between them.
pub fn smooth_fraction(raw: f32) -> f32 {
    let whole = raw.floor();
    whole + quintic_in_out(raw - whole)
}

/// Live value state of a slider or dial.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueControl {
    mapping: ValueMapping,
    range: ValueRange,
    quantization: Quantization,
    commit: CommitPolicy,
    current: f32,
    display: f32,
}

impl ValueControl {
    pub fn from_spec(spec: &ValueSpec) -> Result<Self, ConfigError> {
        spec.validate()?;
        let mut control = Self {
            mapping: spec.mapping,
            range: spec.range,
            quantization: spec.quantization,
            commit: spec.commit,
            current: 0.0,
            display: 0.0,
        };
        control.current = control.quantize(spec.current);
        control.display = control.current;
        Ok(control)
    }

    pub fn mapping(&self) -> ValueMapping {
        self.mapping
    }

    pub fn range(&self) -> ValueRange {
        self.range
    }

    pub fn commit_policy(&self) -> CommitPolicy {
        self.commit
    }

    /// Update the display value from the pressing pointer.
    pub(crate) fn drive(&mut self, local: Vec3, half_extents: Vec3, out: &mut Emitter<'_>) {
        let raw = self.range.lerp(self.mapping.normalized(local, half_extents));
        let display = match self.quantization {
            Quantization::Integer => smooth_fraction(raw),
            Quantization::Continuous => raw,
        };
        if display != self.display {
            self.display = display;
            out.emit(ControlEvent::ValuePreview {
                display,
                fill: self.range.normalize(display),
            });
        }
        if self.commit == CommitPolicy::Continuous {
            self.commit_display(out);
        }
    }

    /// Press ended: commit whatever is displayed, then track the committed value again.
    pub(crate) fn release(&mut self, out: &mut Emitter<'_>) {
        self.commit_display(out);
        self.display = self.current;
    }

    /// Set the committed value from application code. Returns whether it changed.
    pub(crate) fn set(&mut self, value: f32, out: &mut Emitter<'_>) -> Result<bool, ConfigError> {
        if !value.is_finite() {
            return Err(ConfigError::NonFiniteValue(value));
        }
        if !self.range.contains(value) {
            return Err(ConfigError::ValueOutOfRange {
                value,
                min: self.range.min,
                max: self.range.max,
            });
        }
        self.display = value;
        let changed = self.commit_display(out);
        self.display = self.current;
        Ok(changed)
    }

    fn commit_display(&mut self, out: &mut Emitter<'_>) -> bool {
        let candidate = self.quantize(self.display);
        if candidate == self.current {
            return false;
        }
        debug!(control = %out.control(), from = self.current, to = candidate, "value committed");
        self.current = candidate;
        out.emit(ControlEvent::ValueChanged {
            value: self.value(),
        });
        true
    }

    fn quantize(&self, value: f32) -> f32 {
        match self.quantization {
            Quantization::Integer => value
                .round()
                .clamp(self.range.min.ceil(), self.range.max.floor()),
            Quantization::Continuous => value.clamp(self.range.min, self.range.max),
        }
    }
}

impl ValueBearing for ValueControl {
    fn value(&self) -> ControlValue {
        match self.quantization {
            Quantization::Integer => ControlValue::Int(self.current as i32),
            Quantization::Continuous => ControlValue::Float(self.current),
        }
    }

    fn display_value(&self) -> f32 {
        self.display
    }

    fn fill_amount(&self) -> f32 {
        self.range.normalize(self.display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::EventLog;
    use xrpanel_core::{ControlId, SimTick};

    const HALF: Vec3 = Vec3::splat(0.5);

    /// Local point on a circle at `degrees` as measured by the dial mapping.
    fn dial_point(degrees: f32) -> Vec3 {
        let r = degrees.to_radians();
        Vec3::new(-r.sin(), r.cos(), -0.1) * 0.3
    }

    fn drive(control: &mut ValueControl, log: &mut EventLog, local: Vec3) {
        let mut out = Emitter::new(SimTick::ZERO, ControlId(0), log);
        control.drive(local, HALF, &mut out);
    }

    fn release(control: &mut ValueControl, log: &mut EventLog) {
        let mut out = Emitter::new(SimTick::ZERO, ControlId(0), log);
        control.release(&mut out);
    }

    #[test]
    fn quintic_hits_fixed_points() {
        assert_eq!(quintic_in_out(0.0), 0.0);
        assert_eq!(quintic_in_out(0.5), 0.5);
        assert_eq!(quintic_in_out(1.0), 1.0);
        assert!(quintic_in_out(0.25) < 0.25);
        assert!(quintic_in_out(0.75) > 0.75);
    }

    #[test]
    fn smoothing_keeps_rounding_side() {
        for raw in [1.1f32, 1.4, 1.6, 2.9, 3.45] {
            assert_eq!(smooth_fraction(raw).round(), raw.round(), "raw {raw}");
        }
    }

    #[test]
    fn slider_maps_width_to_range() {
        let m = ValueMapping::Slider;
        assert_eq!(m.normalized(Vec3::new(0.5, 0.0, 0.0), HALF), 0.0);
        assert_eq!(m.normalized(Vec3::new(-0.5, 0.0, 0.0), HALF), 1.0);
        assert_eq!(m.normalized(Vec3::new(0.0, 0.0, 0.0), HALF), 0.5);
        assert_eq!(m.normalized(Vec3::new(0.25, 0.0, 0.0), HALF), 0.25);
        // Past either edge clamps.
        assert_eq!(m.normalized(Vec3::new(0.9, 0.0, 0.0), HALF), 0.0);
        assert_eq!(m.normalized(Vec3::new(-0.9, 0.0, 0.0), HALF), 1.0);
    }

    #[test]
    fn dial_maps_angle_to_range() {
        let m = ValueMapping::dial();
        assert!((m.normalized(dial_point(0.0), HALF) - 0.5).abs() < 1e-5);
        assert!((m.normalized(dial_point(-150.0), HALF)).abs() < 1e-5);
        assert!((m.normalized(dial_point(75.0), HALF) - 0.75).abs() < 1e-5);
        // Behind the sweep clamps instead of wrapping.
        assert_eq!(m.normalized(dial_point(170.0), HALF), 1.0);
        assert_eq!(m.normalized(Vec3::ZERO, HALF), 0.5);
    }

    #[test]
    fn commit_on_release_emits_once() {
        let mut dial = ValueControl::from_spec(&ValueSpec::int_dial(0, 4, 1)).unwrap();
        let mut log = EventLog::new();

        for degrees in [-75.0, -60.0, -40.0, -30.0, -10.0, 0.0] {
            drive(&mut dial, &mut log, dial_point(degrees));
        }
        assert!(log.value_changes(ControlId(0)).is_empty());
        assert_eq!(dial.value(), ControlValue::Int(1));

        release(&mut dial, &mut log);
        assert_eq!(log.value_changes(ControlId(0)), vec![ControlValue::Int(2)]);
        assert_eq!(dial.display_value(), 2.0);
    }

    #[test]
    fn continuous_commit_emits_once_per_change() {
        let spec = ValueSpec::int_dial(0, 4, 1).with_commit(CommitPolicy::Continuous);
        let mut dial = ValueControl::from_spec(&spec).unwrap();
        let mut log = EventLog::new();

        for degrees in [-75.0, -60.0, -40.0, -30.0, -10.0, 0.0] {
            drive(&mut dial, &mut log, dial_point(degrees));
        }
        release(&mut dial, &mut log);
        assert_eq!(log.value_changes(ControlId(0)), vec![ControlValue::Int(2)]);
    }

    #[test]
    fn float_slider_is_not_quantized() {
        let mut slider = ValueControl::from_spec(&ValueSpec::float_slider(0.0, 1.0, 0.5)).unwrap();
        let mut log = EventLog::new();
        drive(&mut slider, &mut log, Vec3::new(0.25, 0.0, -0.1));
        release(&mut slider, &mut log);
        assert_eq!(log.value_changes(ControlId(0)), vec![ControlValue::Float(0.25)]);
    }

    #[test]
    fn unchanged_release_is_silent() {
        let mut slider = ValueControl::from_spec(&ValueSpec::int_slider(0, 5, 2)).unwrap();
        let mut log = EventLog::new();
        // Slightly off 2.0 -> rounds back to the committed value.
        drive(&mut slider, &mut log, Vec3::new(0.08, 0.0, -0.1));
        release(&mut slider, &mut log);
        assert!(log.value_changes(ControlId(0)).is_empty());
    }

    #[test]
    fn programmatic_set_is_range_checked() {
        let mut slider = ValueControl::from_spec(&ValueSpec::int_slider(0, 5, 2)).unwrap();
        let mut log = EventLog::new();
        let mut out = Emitter::new(SimTick::ZERO, ControlId(0), &mut log);
        assert_eq!(slider.set(4.0, &mut out), Ok(true));
        assert_eq!(slider.set(4.0, &mut out), Ok(false));
        assert!(slider.set(7.0, &mut out).is_err());
        drop(out);
        assert_eq!(log.value_changes(ControlId(0)), vec![ControlValue::Int(4)]);
    }

    #[test]
    fn invalid_specs_are_rejected() {
        assert!(matches!(
            ValueSpec::int_slider(5, 0, 2).validate(),
            Err(ConfigError::InvertedRange { .. })
        ));
        assert!(matches!(
            ValueSpec::int_dial(0, 4, 9).validate(),
            Err(ConfigError::ValueOutOfRange { .. })
        ));
        let no_sweep = ValueSpec::int_dial(0, 4, 1).with_mapping(ValueMapping::Dial { sweep_degrees: 0.0 });
        assert_eq!(no_sweep.validate(), Err(ConfigError::InvalidSweep(0.0)));
        assert!(ValueSpec::float_slider(f32::NAN, 1.0, 0.5).validate().is_err());
    }

    #[test]
    fn integer_range_needs_a_whole_number() {
        let mut spec = ValueSpec::int_slider(0, 1, 0);
        spec.range = ValueRange::new(0.3, 0.7);
        spec.current = 0.5;
        assert_eq!(
            spec.validate(),
            Err(ConfigError::EmptyIntegerRange { min: 0.3, max: 0.7 })
        );
        assert!(ValueControl::from_spec(&spec).is_err());

        // The same range is fine without quantization.
        assert!(ValueSpec::float_slider(0.3, 0.7, 0.5).validate().is_ok());
        // A fractional range that still holds one integer is accepted.
        spec.range = ValueRange::new(0.3, 1.2);
        let control = ValueControl::from_spec(&spec).unwrap();
        assert_eq!(control.value(), ControlValue::Int(1));
    }

    #[test]
    fn empty_range_stays_put() {
        let mut slider = ValueControl::from_spec(&ValueSpec::int_slider(3, 3, 3)).unwrap();
        let mut log = EventLog::new();
        drive(&mut slider, &mut log, Vec3::new(0.4, 0.0, -0.1));
        release(&mut slider, &mut log);
        assert_eq!(slider.value(), ControlValue::Int(3));
        assert!(log.value_changes(ControlId(0)).is_empty());
    }
}
