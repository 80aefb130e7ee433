use crate::command_script::CommandScriptPlayer;
use crate::config::ScenarioConfig;
use crate::scripted_input::PointerScriptPlayer;
use anyhow::{Context, Result};
use std::path::PathBuf;
use xrpanel_testkit::{EventRecord, JsonlSink};
use xrpanel_ui3d::{ControlEvent, FeedbackSink, PanelEvent};

pub struct HeadlessConfig {
    pub scenario: ScenarioConfig,
    pub pointer_script: Option<PathBuf>,
    pub command_script: Option<PathBuf>,
    pub events: Option<PathBuf>,
    pub max_ticks: Option<u64>,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub events: usize,
    pub state_changes: usize,
    pub triggers: usize,
    pub value_changes: usize,
}

/// Feedback sink for headless runs: tallies events and optionally streams them to JSONL.
struct HeadlessFeedback {
    jsonl: Option<JsonlSink>,
    summary: RunSummary,
    write_error: Option<anyhow::Error>,
}

impl FeedbackSink for HeadlessFeedback {
    fn emit(&mut self, event: PanelEvent) {
        self.summary.events += 1;
        match event.event {
            ControlEvent::StateChanged { .. } => self.summary.state_changes += 1,
            ControlEvent::Triggered => self.summary.triggers += 1,
            ControlEvent::ValueChanged { .. } => self.summary.value_changes += 1,
            ControlEvent::PressProgress { .. } | ControlEvent::ValuePreview { .. } => {}
        }
        if self.write_error.is_some() {
            return;
        }
        if let Some(jsonl) = self.jsonl.as_mut() {
            if let Err(err) = jsonl.write(&event) {
                self.write_error = Some(err);
            }
        }
    }
}

pub fn run(cfg: HeadlessConfig) -> Result<RunSummary> {
    let mut panel = cfg.scenario.build_panel()?;
    let pointer_names: Vec<String> = (0..panel.pointer_count())
        .filter_map(|i| panel.pointer_name(xrpanel_core::PointerId(i as u16)))
        .map(str::to_string)
        .collect();

    let mut pointers = cfg
        .pointer_script
        .as_deref()
        .map(|path| PointerScriptPlayer::from_path(path, &pointer_names))
        .transpose()?;
    let mut commands = cfg
        .command_script
        .as_deref()
        .map(CommandScriptPlayer::from_path)
        .transpose()?;

    let ticks = match (cfg.max_ticks, pointers.as_ref()) {
        (Some(max), _) => max,
        (None, Some(script)) => script.total_ticks(),
        (None, None) => anyhow::bail!("headless run needs --pointer-script or --max-ticks"),
    };

    let jsonl = cfg
        .events
        .as_deref()
        .map(JsonlSink::create)
        .transpose()
        .context("failed to open events output")?;
    let mut feedback = HeadlessFeedback {
        jsonl,
        summary: RunSummary::default(),
        write_error: None,
    };

    if let Some(jsonl) = feedback.jsonl.as_mut() {
        jsonl.write(&EventRecord {
            tick: panel.current_tick(),
            kind: "run_started",
            payload: &cfg.scenario.name,
        })?;
    }

    for _ in 0..ticks {
        if let Some(script) = commands.as_mut() {
            for command in script.drain_ready_commands(panel.current_tick()) {
                command.apply(&mut panel, &mut feedback);
            }
        }
        if let Some(script) = pointers.as_mut() {
            panel.update_pointers(script.advance())?;
        }
        panel.tick(&mut feedback);
        if let Some(err) = feedback.write_error.take() {
            return Err(err.context("failed to write events"));
        }
    }
    feedback.summary.ticks = ticks;

    if let Some(jsonl) = feedback.jsonl.as_mut() {
        jsonl.write(&EventRecord {
            tick: panel.current_tick(),
            kind: "run_finished",
            payload: &cfg.scenario.name,
        })?;
        jsonl.flush()?;
    }

    if pointers.as_ref().is_some_and(|p| !p.is_finished()) {
        tracing::warn!(ticks, "pointer script was cut short by --max-ticks");
    }

    let summary = feedback.summary;
    tracing::info!(
        scenario = %cfg.scenario.name,
        ticks = summary.ticks,
        events = summary.events,
        state_changes = summary.state_changes,
        triggers = summary.triggers,
        value_changes = summary.value_changes,
        "headless run finished"
    );
    Ok(summary)
}
