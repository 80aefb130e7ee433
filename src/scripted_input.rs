use anyhow::{Context, Result};
use glam::Vec3;
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};

/// Where a pointer sits before the script first mentions it, matching the
/// panel's own starting position.
pub const PARKED: Vec3 = xrpanel_ui3d::PARKED_POINTER;

#[derive(Debug, Deserialize)]
struct PointerScriptFile {
    /// Optional starting positions; anything unlisted starts parked.
    #[serde(default)]
    start: BTreeMap<String, [f32; 3]>,
    steps: Vec<PointerStep>,
}

#[derive(Debug, Clone, Deserialize)]
struct PointerStep {
    /// Ticks taken to reach the targets.
    ticks: u32,
    /// Target positions; unlisted pointers hold still.
    #[serde(default)]
    pointers: BTreeMap<String, [f32; 3]>,
}

#[derive(Debug, Clone)]
struct BoundStep {
    ticks: u32,
    targets: Vec<Option<Vec3>>,
}

/// Deterministic pointer track, linearly interpolated across each step.
#[derive(Debug, Clone)]
pub struct PointerScriptPlayer {
    steps: Vec<BoundStep>,
    index: usize,
    tick_in_step: u32,
    from: Vec<Vec3>,
    current: Vec<Vec3>,
}

impl PointerScriptPlayer {
    pub fn from_path(path: &Path, pointers: &[String]) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read pointer script {}", path.display()))?;
        Self::from_str(&contents, pointers)
            .with_context(|| format!("invalid pointer script {}", path.display()))
    }

    /// Parse a script and bind its pointer names to panel pointer order.
    pub fn from_str(contents: &str, pointers: &[String]) -> Result<Self> {
        let file: PointerScriptFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            anyhow::bail!("pointer script contains no steps");
        }

        let slot = |name: &str| {
            pointers
                .iter()
                .position(|p| p == name)
                .with_context(|| format!("pointer script names unknown pointer `{name}`"))
        };
        let finite = |name: &str, pos: [f32; 3]| {
            let v = Vec3::from_array(pos);
            if v.is_finite() {
                Ok(v)
            } else {
                anyhow::bail!("pointer `{name}` has a non-finite position {pos:?}")
            }
        };

        let mut start = vec![PARKED; pointers.len()];
        for (name, pos) in &file.start {
            start[slot(name)?] = finite(name, *pos)?;
        }

        let mut steps = Vec::with_capacity(file.steps.len());
        for (i, step) in file.steps.into_iter().enumerate() {
            if step.ticks == 0 {
                anyhow::bail!("pointer script step {i} must last at least one tick");
            }
            let mut targets = vec![None; pointers.len()];
            for (name, pos) in &step.pointers {
                targets[slot(name)?] = Some(finite(name, *pos)?);
            }
            steps.push(BoundStep {
                ticks: step.ticks,
                targets,
            });
        }

        Ok(Self {
            steps,
            index: 0,
            tick_in_step: 0,
            from: start.clone(),
            current: start,
        })
    }

    /// Positions for the next tick. Holds the final positions once finished.
    pub fn advance(&mut self) -> &[Vec3] {
        let Some(step) = self.steps.get(self.index) else {
            return &self.current;
        };

        self.tick_in_step += 1;
        let t = self.tick_in_step as f32 / step.ticks as f32;
        for ((current, from), target) in self.current.iter_mut().zip(&self.from).zip(&step.targets) {
            if let Some(target) = target {
                *current = from.lerp(*target, t);
            }
        }

        if self.tick_in_step >= step.ticks {
            self.index += 1;
            self.tick_in_step = 0;
            self.from.copy_from_slice(&self.current);
        }
        &self.current
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.steps.len()
    }

    /// Total ticks the script spans.
    pub fn total_ticks(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.ticks)).sum()
    }
}
