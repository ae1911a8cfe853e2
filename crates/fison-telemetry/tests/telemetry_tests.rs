//! Integration tests for the telemetry crate.

use fison_telemetry::{EventBus, EventKind, MeshDecision, RunEvent, VecSink};

// ─────────────────────────── Bus Dispatch ───────────────────────────

#[test]
fn emit_and_flush_delivers_to_sink() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    let events = sink.events();
    bus.add_sink(Box::new(sink));

    bus.emit_kind(0, EventKind::TimestepBegin { t: 0.1, dt: 0.1 });
    bus.emit_kind(
        0,
        EventKind::CouplingConverged {
            iterations: 3,
            increment: 1.2e-7,
        },
    );

    // Nothing is delivered until flush.
    assert!(events.lock().unwrap().is_empty());

    bus.flush();
    let collected = events.lock().unwrap();
    assert_eq!(collected.len(), 2);
    assert_eq!(collected[0].timestep, 0);
    match &collected[1].kind {
        EventKind::CouplingConverged { iterations, .. } => assert_eq!(*iterations, 3),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn disabled_bus_drops_events() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    let events = sink.events();
    bus.add_sink(Box::new(sink));

    bus.set_enabled(false);
    bus.emit_kind(1, EventKind::TimestepBegin { t: 0.2, dt: 0.1 });
    bus.flush();
    assert!(events.lock().unwrap().is_empty());

    bus.set_enabled(true);
    bus.emit_kind(1, EventKind::TimestepBegin { t: 0.2, dt: 0.1 });
    bus.flush();
    assert_eq!(events.lock().unwrap().len(), 1);
}

#[test]
fn multiple_sinks_each_receive_every_event() {
    let mut bus = EventBus::new();
    let first = VecSink::new();
    let second = VecSink::new();
    let first_events = first.events();
    let second_events = second.events();
    bus.add_sink(Box::new(first));
    bus.add_sink(Box::new(second));
    assert_eq!(bus.sink_count(), 2);

    bus.emit_kind(
        2,
        EventKind::CouplingIteration {
            iteration: 1,
            increment: 0.5,
            tolerance: 1e-3,
        },
    );
    bus.finalize();

    assert_eq!(first_events.lock().unwrap().len(), 1);
    assert_eq!(second_events.lock().unwrap().len(), 1);
}

// ─────────────────────────── Serialization ───────────────────────────

#[test]
fn events_round_trip_through_json() {
    let event = RunEvent::new(
        7,
        EventKind::RefinementPass {
            level: 2,
            error: 3.5e-4,
            tolerance: 1e-3,
        },
    );

    let json = serde_json::to_string(&event).unwrap();
    let back: RunEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(back.timestep, 7);
    match back.kind {
        EventKind::RefinementPass { level, .. } => assert_eq!(level, 2),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn mesh_action_serializes_decision_variant() {
    let event = RunEvent::new(
        0,
        EventKind::MeshAction {
            decision: MeshDecision::RefinedByIndicators,
            cells: 96,
        },
    );

    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("RefinedByIndicators"));
    assert!(json.contains("96"));
}
