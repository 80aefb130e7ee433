use anyhow::{Context, Result};
use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use xrpanel_ui3d::{
    CommitPolicy, ControlSpec, Panel, PanelThresholds, Transform3D, TriggerPolicy, ValueMapping,
    ValueSpec,
};

/// Panel scenario loaded from TOML.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub name: String,
    pub thresholds: PanelThresholds,
    /// Pointer names, polled in this order.
    pub pointers: Vec<String>,
    pub controls: Vec<ControlConfig>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: "scenario".to_string(),
            thresholds: PanelThresholds::default(),
            pointers: vec!["pointer".to_string()],
            controls: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    #[default]
    Button,
    IntSlider,
    FloatSlider,
    IntDial,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlConfig {
    pub name: String,
    pub kind: ControlKind,
    pub position: [f32; 3],
    /// Euler angles in degrees, applied in XYZ order.
    pub rotation_degrees: [f32; 3],
    pub scale: [f32; 3],
    pub half_extents: [f32; 3],
    /// Defaults to one-shot for buttons; value controls never trigger.
    pub trigger: Option<TriggerPolicy>,
    pub min: f32,
    pub max: f32,
    pub value: f32,
    pub commit: CommitPolicy,
    /// Dial only.
    pub sweep_degrees: Option<f32>,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: ControlKind::Button,
            position: [0.0; 3],
            rotation_degrees: [0.0; 3],
            scale: [1.0; 3],
            half_extents: [0.5; 3],
            trigger: None,
            min: 0.0,
            max: 1.0,
            value: 0.0,
            commit: CommitPolicy::OnRelease,
            sweep_degrees: None,
        }
    }
}

impl ControlConfig {
    fn transform(&self) -> Transform3D {
        let [rx, ry, rz] = self.rotation_degrees.map(f32::to_radians);
        Transform3D::new(Vec3::from_array(self.position))
            .with_rotation(Quat::from_euler(EulerRot::XYZ, rx, ry, rz))
            .with_scale(Vec3::from_array(self.scale))
    }

    /// Integer field of an int_* control. Fractions and out-of-range values are errors.
    fn whole(&self, field: &str, value: f32) -> Result<i32> {
        if !value.is_finite()
            || value.fract() != 0.0
            || value < i32::MIN as f32
            || value >= i32::MAX as f32
        {
            anyhow::bail!(
                "control `{}`: {field} = {value} is not a whole number in i32 range",
                self.name
            );
        }
        Ok(value as i32)
    }

    fn value_spec(&self) -> Result<Option<ValueSpec>> {
        let spec = match self.kind {
            ControlKind::Button => return Ok(None),
            ControlKind::IntSlider => ValueSpec::int_slider(
                self.whole("min", self.min)?,
                self.whole("max", self.max)?,
                self.whole("value", self.value)?,
            ),
            ControlKind::FloatSlider => ValueSpec::float_slider(self.min, self.max, self.value),
            ControlKind::IntDial => {
                let spec = ValueSpec::int_dial(
                    self.whole("min", self.min)?,
                    self.whole("max", self.max)?,
                    self.whole("value", self.value)?,
                );
                match self.sweep_degrees {
                    Some(sweep_degrees) => spec.with_mapping(ValueMapping::Dial { sweep_degrees }),
                    None => spec,
                }
            }
        };
        Ok(Some(spec.with_commit(self.commit)))
    }

    pub fn to_spec(&self) -> Result<ControlSpec> {
        let transform = self.transform();
        let spec = match self.value_spec()? {
            Some(value) => ControlSpec::valued(self.name.clone(), transform, value),
            None => ControlSpec::button(self.name.clone(), transform),
        };
        let spec = spec.with_half_extents(Vec3::from_array(self.half_extents));
        Ok(match self.trigger {
            Some(trigger) => spec.with_trigger(trigger),
            None => spec,
        })
    }
}

impl ScenarioConfig {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("invalid scenario {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn build_panel(&self) -> Result<Panel> {
        let mut builder = Panel::builder(self.thresholds);
        for pointer in &self.pointers {
            builder = builder.pointer(pointer.clone());
        }
        for control in &self.controls {
            let spec = control
                .to_spec()
                .with_context(|| format!("scenario `{}` has an invalid control", self.name))?;
            builder = builder.control(spec);
        }
        builder
            .build()
            .with_context(|| format!("scenario `{}` does not describe a valid panel", self.name))
    }
}
