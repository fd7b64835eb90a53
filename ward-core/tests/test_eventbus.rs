use std::sync::{Arc, Mutex};

use ward_core::domain::PipelineStage;
use ward_core::eventbus::{EventBus, EventKind, EventPayload, LogLevel};

fn log_event(message: &str) -> EventPayload {
    EventPayload::LogMessage {
        level: LogLevel::Info,
        message: message.to_string(),
    }
}

#[test]
fn per_kind_subscribers_only_see_their_kind() {
    let bus = EventBus::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    bus.subscribe(EventKind::LogMessage, move |event| {
        sink.lock().unwrap().push(event.kind());
    });

    bus.publish(log_event("hello"));
    bus.publish(EventPayload::StageStarted {
        stage: PipelineStage::Provider,
    });
    bus.publish(log_event("again"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.as_slice(), &[EventKind::LogMessage, EventKind::LogMessage]);
}

#[test]
fn wildcard_handlers_run_before_per_kind_handlers() {
    let bus = EventBus::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let sink = order.clone();
    bus.subscribe(EventKind::LogMessage, move |_| {
        sink.lock().unwrap().push("typed");
    });
    let sink = order.clone();
    bus.subscribe_all(move |_| {
        sink.lock().unwrap().push("wildcard");
    });

    bus.publish(log_event("x"));

    assert_eq!(order.lock().unwrap().as_slice(), &["wildcard", "typed"]);
}

#[test]
fn handlers_fire_in_registration_order() {
    let bus = EventBus::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    for label in ["first", "second", "third"] {
        let sink = order.clone();
        bus.subscribe(EventKind::LogMessage, move |_| {
            sink.lock().unwrap().push(label);
        });
    }

    bus.publish(log_event("x"));

    assert_eq!(
        order.lock().unwrap().as_slice(),
        &["first", "second", "third"]
    );
}

#[test]
fn close_makes_publish_a_no_op() {
    let bus = EventBus::new();
    let count = Arc::new(Mutex::new(0usize));

    let sink = count.clone();
    bus.subscribe_all(move |_| {
        *sink.lock().unwrap() += 1;
    });

    bus.publish(log_event("before"));
    bus.close();
    bus.publish(log_event("after"));
    bus.publish(log_event("after again"));

    assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
fn events_carry_timestamps_and_kinds() {
    let bus = EventBus::new();
    let kinds = Arc::new(Mutex::new(Vec::new()));

    let sink = kinds.clone();
    bus.subscribe_all(move |event| {
        sink.lock().unwrap().push((event.kind(), event.timestamp));
    });

    bus.publish(EventPayload::ScanStarted {
        project_path: "/tmp/fx".into(),
        scanner_count: 3,
    });

    let kinds = kinds.lock().unwrap();
    assert_eq!(kinds.len(), 1);
    assert_eq!(kinds[0].0, EventKind::ScanStarted);
    assert_eq!(kinds[0].0.as_str(), "scan.started");
}
