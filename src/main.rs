//! xrpanel - proximity-driven touchable 3D controls
//!
//! Headless runner: loads a panel scenario, replays a pointer script against it
//! and streams the resulting feedback events as JSONL.

mod command_script;
mod config;
mod headless;
mod scripted_input;

use anyhow::Result;
use config::ScenarioConfig;
use headless::HeadlessConfig;
use std::{env, path::PathBuf};
use tracing::info;

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting xrpanel v{}", env!("CARGO_PKG_VERSION"));
    xrpanel_ui3d::init()?;

    let cli = CliOptions::parse(env::args().skip(1));
    if cli.help {
        println!("{USAGE}");
        return Ok(());
    }

    let Some(scenario_path) = cli.scenario else {
        anyhow::bail!("--scenario is required\n\n{USAGE}");
    };
    let scenario = ScenarioConfig::load_from_path(&scenario_path)?;

    let summary = headless::run(HeadlessConfig {
        scenario,
        pointer_script: cli.pointer_script,
        command_script: cli.command_script,
        events: cli.events,
        max_ticks: cli.max_ticks,
    })?;

    println!(
        "ticks={} events={} state_changes={} triggers={} value_changes={}",
        summary.ticks,
        summary.events,
        summary.state_changes,
        summary.triggers,
        summary.value_changes
    );
    Ok(())
}

const USAGE: &str = "usage: xrpanel --scenario <toml> [--pointer-script <json>] \
[--command-script <json>] [--events <jsonl>] [--max-ticks <n>]";

#[derive(Clone, Default)]
struct CliOptions {
    help: bool,
    scenario: Option<PathBuf>,
    pointer_script: Option<PathBuf>,
    command_script: Option<PathBuf>,
    events: Option<PathBuf>,
    max_ticks: Option<u64>,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => opts.help = true,
                "--scenario" => {
                    if let Some(path) = args.next() {
                        opts.scenario = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--scenario requires a file path");
                    }
                }
                "--pointer-script" => {
                    if let Some(path) = args.next() {
                        opts.pointer_script = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--pointer-script requires a file path");
                    }
                }
                "--command-script" => {
                    if let Some(path) = args.next() {
                        opts.command_script = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--command-script requires a file path");
                    }
                }
                "--events" => {
                    if let Some(path) = args.next() {
                        opts.events = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--events requires a file path");
                    }
                }
                "--max-ticks" => {
                    if let Some(raw) = args.next() {
                        match raw.parse::<u64>() {
                            Ok(value) => opts.max_ticks = Some(value),
                            Err(err) => {
                                tracing::error!(%err, value = %raw, "--max-ticks must be an integer");
                            }
                        }
                    } else {
                        tracing::error!("--max-ticks requires an integer");
                    }
                }
                other => tracing::warn!(arg = other, "ignoring unknown argument"),
            }
        }

        opts
    }
}
