use anyhow::{Context, Result};
use serde::Deserialize;
use std::{collections::VecDeque, fs, path::Path};
use xrpanel_ui3d::{FeedbackSink, Panel, PanelThresholds};
use xrpanel_core::SimTick;

/// Application-side action applied to the panel between ticks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PanelCommand {
    /// Replace the thresholds; omitted fields keep library defaults.
    SetThresholds { thresholds: PanelThresholds },
    /// Write a value control's committed value.
    SetValue { control: String, value: f32 },
}

impl PanelCommand {
    /// Apply to `panel`. Rejected commands are logged and skipped.
    pub fn apply(&self, panel: &mut Panel, sink: &mut dyn FeedbackSink) {
        match self {
            PanelCommand::SetThresholds { thresholds } => {
                if let Err(err) = panel.set_thresholds(*thresholds) {
                    tracing::warn!(%err, "set_thresholds command rejected");
                }
            }
            PanelCommand::SetValue { control, value } => {
                let Some(id) = panel.control_id(control) else {
                    tracing::warn!(%control, "set_value names an unknown control");
                    return;
                };
                match panel.set_value(id, *value, sink) {
                    Ok(changed) => tracing::debug!(%control, value, changed, "set_value applied"),
                    Err(err) => tracing::warn!(%err, %control, "set_value command rejected"),
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommandScriptFile {
    steps: Vec<CommandScriptStepDef>,
}

#[derive(Debug, Clone, Deserialize)]
struct CommandScriptStepDef {
    tick: u64,
    command: PanelCommand,
}

#[derive(Debug, Clone)]
struct CommandScriptStep {
    tick: SimTick,
    command: PanelCommand,
}

/// Deterministic command script runner.
///
/// Scripts are a list of `{tick, command}` steps, executed in file order
/// before the panel processes that tick.
#[derive(Debug)]
pub struct CommandScriptPlayer {
    pending: VecDeque<CommandScriptStep>,
}

impl CommandScriptPlayer {
    /// Load a command script from a JSON file on disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read command script {}", path.display()))?;
        Self::from_str(&contents)
    }

    /// Load a command script from an in-memory JSON string.
    pub fn from_str(contents: &str) -> Result<Self> {
        let file: CommandScriptFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            anyhow::bail!("command script contains no steps");
        }

        let mut pending = VecDeque::with_capacity(file.steps.len());
        let mut last_tick: Option<u64> = None;
        for step in file.steps {
            if let Some(prev) = last_tick {
                if step.tick < prev {
                    anyhow::bail!("command script steps must be sorted by tick");
                }
            }
            last_tick = Some(step.tick);

            pending.push_back(CommandScriptStep {
                tick: SimTick(step.tick),
                command: step.command,
            });
        }

        Ok(Self { pending })
    }

    /// Drain and return all commands scheduled for ticks `<= tick`.
    pub fn drain_ready_commands(&mut self, tick: SimTick) -> Vec<PanelCommand> {
        let mut commands = Vec::new();
        while self.pending.front().is_some_and(|step| step.tick <= tick) {
            if let Some(step) = self.pending.pop_front() {
                commands.push(step.command);
            }
        }
        commands
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_script_rejects_unsorted_ticks() {
        let json = r#"{
            "steps": [
                {"tick": 2, "command": {"op": "set_value", "control": "a", "value": 1}},
                {"tick": 1, "command": {"op": "set_value", "control": "a", "value": 2}}
            ]
        }"#;
        let err = CommandScriptPlayer::from_str(json).unwrap_err();
        assert!(
            err.to_string().contains("sorted by tick"),
            "unexpected error: {err:#}"
        );
    }

    #[test]
    fn command_script_drains_in_order_and_is_deterministic() {
        let json = r#"{
            "steps": [
                {"tick": 1, "command": {"op": "set_value", "control": "volume", "value": 3}},
                {"tick": 1, "command": {"op": "set_thresholds", "thresholds": {"touch_distance": 0.05}}},
                {"tick": 3, "command": {"op": "set_value", "control": "volume", "value": 0}}
            ]
        }"#;
        let mut script = CommandScriptPlayer::from_str(json).expect("script should parse");

        assert!(script.drain_ready_commands(SimTick(0)).is_empty());
        let first = script.drain_ready_commands(SimTick(1));
        assert_eq!(first.len(), 2);
        assert_eq!(
            first[0],
            PanelCommand::SetValue {
                control: "volume".into(),
                value: 3.0
            }
        );
        match &first[1] {
            PanelCommand::SetThresholds { thresholds } => {
                assert_eq!(thresholds.touch_distance, 0.05);
                assert_eq!(thresholds.hover_distance, 0.1);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(script.drain_ready_commands(SimTick(2)).is_empty());
        assert_eq!(script.drain_ready_commands(SimTick(3)).len(), 1);
        assert!(script.is_finished());
    }

    #[test]
    fn unknown_ops_fail_to_parse() {
        let json = r#"{"steps": [{"tick": 0, "command": {"op": "explode"}}]}"#;
        assert!(CommandScriptPlayer::from_str(json).is_err());
    }
}
