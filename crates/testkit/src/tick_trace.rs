//! Tick-trace harness for deterministic, tick-based scenario tests.
//!
//! A trace steps a small simulation for a fixed number of ticks and records a
//! snapshot after each step. Tests then assert on the frames directly, or
//! compare two traces through [`crate::assert_same_json`].

use serde::Serialize;
use xrpanel_core::SimTick;

/// Configuration for a tick trace.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Human-readable name (kept in the report).
    pub name: String,
    /// Number of ticks to step (the trace includes the initial frame at tick 0).
    pub ticks: u64,
}

impl TraceConfig {
    /// Trace `ticks` steps under `name`.
    pub fn new(name: impl Into<String>, ticks: u64) -> Self {
        Self {
            name: name.into(),
            ticks,
        }
    }
}

/// Single snapshot frame captured at a given tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceFrame<S> {
    /// Tick number.
    pub tick: u64,
    /// Snapshot payload.
    pub snapshot: S,
}

/// All frames of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickTrace<S> {
    /// Name from the config.
    pub name: String,
    /// Frames in tick order, starting at tick 0.
    pub frames: Vec<TraceFrame<S>>,
}

impl<S> TickTrace<S> {
    /// Snapshot after the final step.
    pub fn last(&self) -> Option<&S> {
        self.frames.last().map(|f| &f.snapshot)
    }

    /// First tick whose snapshot matches `pred`.
    pub fn first_tick_where(&self, mut pred: impl FnMut(&S) -> bool) -> Option<u64> {
        self.frames
            .iter()
            .find(|f| pred(&f.snapshot))
            .map(|f| f.tick)
    }

    /// Snapshots in order, without tick numbers.
    pub fn snapshots(&self) -> impl Iterator<Item = &S> + '_ {
        self.frames.iter().map(|f| &f.snapshot)
    }
}

/// Run a tick trace.
///
/// Captures the initial snapshot at tick 0, then steps `config.ticks` times,
/// capturing a snapshot after each step (so the trace contains `ticks + 1` frames).
pub fn run_tick_trace<State, Snapshot, StepFn, SnapFn>(
    config: TraceConfig,
    mut state: State,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> TickTrace<Snapshot>
where
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let mut frames = Vec::with_capacity(config.ticks as usize + 1);

    let mut tick = SimTick::ZERO;
    frames.push(TraceFrame {
        tick: tick.0,
        snapshot: snapshot(tick, &state),
    });

    for _ in 0..config.ticks {
        step(tick, &mut state);
        tick = tick.advance(1);
        frames.push(TraceFrame {
            tick: tick.0,
            snapshot: snapshot(tick, &state),
        });
    }

    tracing::debug!(name = %config.name, frames = frames.len(), "tick trace finished");
    TickTrace {
        name: config.name,
        frames,
    }
}
