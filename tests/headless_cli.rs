use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "xrpanel_cli_{tag}_{:08x}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

const SCENARIO: &str = r#"
name = "volume-panel"
pointers = ["right_index"]

[[controls]]
name = "volume"
kind = "int_slider"
min = 0
max = 10
value = 5
"#;

// Touch the slider near its max end (local -x), push in, release back out.
const POINTER_SCRIPT: &str = r#"{
    "start": { "right_index": [-0.4, 0.0, 0.7] },
    "steps": [
        { "ticks": 2, "pointers": { "right_index": [-0.4, 0.0, 0.0] } },
        { "ticks": 3, "pointers": { "right_index": [-0.4, 0.0, -0.2] } },
        { "ticks": 3, "pointers": { "right_index": [-0.4, 0.0, 0.7] } }
    ]
}"#;

#[test]
fn headless_run_writes_value_change() {
    let dir = scratch_dir("slider");
    let scenario = dir.join("panel.toml");
    let script = dir.join("pointer.json");
    let events = dir.join("events.jsonl");
    fs::write(&scenario, SCENARIO).expect("write scenario");
    fs::write(&script, POINTER_SCRIPT).expect("write script");

    let output = Command::new(env!("CARGO_BIN_EXE_xrpanel"))
        .arg("--scenario")
        .arg(&scenario)
        .arg("--pointer-script")
        .arg(&script)
        .arg("--events")
        .arg(&events)
        .output()
        .expect("spawn xrpanel");
    assert!(
        output.status.success(),
        "xrpanel failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ticks=8"), "unexpected summary: {stdout}");
    assert!(stdout.contains("triggers=0"), "unexpected summary: {stdout}");

    let contents = fs::read_to_string(&events).expect("events written");
    let lines: Vec<serde_json::Value> = contents
        .lines()
        .map(|l| serde_json::from_str(l).expect("json line"))
        .collect();
    let changes: Vec<&serde_json::Value> = lines
        .iter()
        .filter(|l| l["kind"] == "value_changed")
        .collect();
    assert_eq!(changes.len(), 1, "events: {contents}");
    assert_eq!(changes[0]["value"], 9);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_scenario_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_xrpanel"))
        .arg("--max-ticks")
        .arg("3")
        .output()
        .expect("spawn xrpanel");
    assert!(!output.status.success());
}
