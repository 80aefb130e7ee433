use xrpanel_core::SimTick;
use xrpanel_testkit::{read_jsonl, EventRecord, JsonlSink};
use xrpanel_ui3d::{ControlEvent, ControlId, PanelEvent};

#[test]
fn deterministic_event_stream_can_be_written() {
    let path = std::env::temp_dir().join(format!("xrpanel-eventlog-{}.jsonl", std::process::id()));
    let mut sink = JsonlSink::create(&path).expect("can create temp log");
    let tick = SimTick::ZERO.advance(1);
    let record = EventRecord {
        tick,
        kind: "SmokeTest",
        payload: "ok",
    };
    sink.write(&record).expect("can write event");
    sink.write(&PanelEvent {
        tick,
        control: ControlId(2),
        event: ControlEvent::Triggered,
    })
    .expect("can write panel event");
    sink.flush().expect("flush");

    let lines: Vec<serde_json::Value> = read_jsonl(&path).expect("log readable");
    assert_eq!(lines[1], serde_json::json!({ "tick": 1, "control": 2, "kind": "triggered" }));
    let _ = std::fs::remove_file(&path);
}
