//! Integration tests for drape-telemetry.

use drape_telemetry::bus::EventBus;
use drape_telemetry::events::{EventKind, SimulationEvent};
use drape_telemetry::sinks::{EventSink, TracingSink, VecSink};

#[test]
fn emit_and_flush_reaches_sink() {
    let sink = VecSink::new();
    let events = sink.events();
    let mut bus = EventBus::new().with_sink(sink);

    bus.emit(SimulationEvent::new(0, EventKind::FrameBegin { dt: 0.016, substeps: 20 }));
    bus.emit(SimulationEvent::new(0, EventKind::FrameEnd { wall_time: 0.001 }));
    assert!(events.lock().unwrap().is_empty());

    bus.flush();
    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0].kind, EventKind::FrameBegin { substeps: 20, .. }));
}

#[test]
fn disabled_bus_drops_events() {
    let sink = VecSink::new();
    let events = sink.events();
    let mut bus = EventBus::new().with_sink(sink);
    bus.set_enabled(false);
    assert!(!bus.is_enabled());
    bus.emit(SimulationEvent::new(0, EventKind::SelfContacts { pairs: 3 }));
    bus.flush();
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn multiple_sinks_each_see_events() {
    let a = VecSink::new();
    let b = VecSink::new();
    let (ea, eb) = (a.events(), b.events());
    let mut bus = EventBus::new();
    bus.add_sink(Box::new(a));
    bus.add_sink(Box::new(b));
    bus.add_sink(Box::new(TracingSink::default()));
    assert_eq!(bus.sink_count(), 3);

    bus.emit(SimulationEvent::new(4, EventKind::StateReset { particles: vec![7] }));
    bus.finish();
    assert_eq!(ea.lock().unwrap().len(), 1);
    assert_eq!(eb.lock().unwrap().len(), 1);
}

#[test]
fn event_serialization() {
    let event = SimulationEvent::new(
        5,
        EventKind::Diagnostics {
            penetrating: 2,
            total: 100,
            avg_depth: 0.002,
            max_depth: 0.004,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    let recovered: SimulationEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, event);
}

#[test]
fn interaction_event_names_fields() {
    let event = SimulationEvent::new(
        10,
        EventKind::InteractionEnd {
            particle: 42,
            throw_speed: 1.5,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("throw_speed"));
}

#[test]
fn sink_names() {
    assert_eq!(VecSink::new().name(), "vec_sink");
    assert_eq!(TracingSink::new(tracing::Level::INFO).name(), "tracing_sink");
}
