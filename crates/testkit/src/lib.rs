#![warn(missing_docs)]
//! Deterministic testing surfaces: JSONL event capture and tick traces.

mod canonical;
mod tick_trace;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use xrpanel_core::SimTick;

pub use canonical::*;
pub use tick_trace::*;

/// Header or marker record written alongside panel events by headless runs.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Simulation tick when the record was written.
    pub tick: SimTick,
    /// Human-readable kind label.
    pub kind: &'a str,
    /// Free-form payload for smoke tests.
    pub payload: &'a str,
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: BufWriter<File>,
    lines: usize,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create event log {}", path.display()))?;
        Ok(Self {
            file: BufWriter::new(file),
            lines: 0,
        })
    }

    /// Append one record as a single JSON line.
    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<()> {
        let line = serde_json::to_string(record)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    /// Number of lines written so far.
    pub fn lines_written(&self) -> usize {
        self.lines
    }

    /// Flush buffered lines to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.file.flush()?;
        tracing::debug!(lines = self.lines, "event log flushed");
        Ok(())
    }
}

/// Read a JSONL file back, one value per non-empty line.
pub fn read_jsonl<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read event log {}", path.display()))?;
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{}:{}: malformed JSON line", path.display(), i + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn jsonl_sink_round_trips_lines() {
        let path = std::env::temp_dir().join(format!(
            "xrpanel-events-{}.jsonl",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let mut sink = JsonlSink::create(&path).expect("sink create");
        sink.write(&EventRecord {
            tick: SimTick(3),
            kind: "run_started",
            payload: "demo",
        })
        .expect("write succeeds");
        sink.write(&serde_json::json!({ "tick": 4, "kind": "triggered" }))
            .expect("write succeeds");
        assert_eq!(sink.lines_written(), 2);
        sink.flush().expect("flush");

        let lines: Vec<serde_json::Value> = read_jsonl(&path).expect("readable");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["kind"], "run_started");
        assert_eq!(lines[0]["tick"], 3);
        assert_eq!(lines[1]["kind"], "triggered");
        let _ = fs::remove_file(&path);
    }
}
