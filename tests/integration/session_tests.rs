//! End-to-end session scenarios: controller → state machine → transport,
//! driven through the same inbound handlers a radio adapter would call.

use std::sync::{Arc, Mutex};

use biolink::app::service::SessionController;
use biolink::config::AcquisitionConfig;
use biolink::frame::RawRecord;
use biolink::fsm::ConnectionState;
use biolink::registry::DeviceIdentity;

use crate::mock_transport::{disconnect_count, MockTransport, TransportCall};

fn controller() -> (
    SessionController<MockTransport>,
    std::rc::Rc<std::cell::RefCell<Vec<TransportCall>>>,
) {
    let transport = MockTransport::new();
    let log = transport.log();
    (
        SessionController::with_transport(transport, AcquisitionConfig::default()),
        log,
    )
}

fn good_record(identifier: &str, sequence: u32) -> RawRecord {
    RawRecord {
        identifier: Some(identifier.to_string()),
        sequence: Some(sequence),
        analog_channels: vec![32_767],
        digital_input: Some(0),
        comments: None,
    }
}

// ── Discovery ─────────────────────────────────────────────────

#[test]
fn scan_clears_registry_and_dedups_discoveries() {
    let (mut c, log) = controller();

    c.scan(true);
    assert_eq!(log.borrow()[0], TransportCall::Scan { enable: true });

    c.on_device_found(DeviceIdentity::new("AA:BB"));
    c.on_device_found(DeviceIdentity::new("AA:BB"));
    let addrs: Vec<String> = c.registry().list().iter().map(|d| d.address.clone()).collect();
    assert_eq!(addrs, ["AA:BB"]);

    // A new scan starts from an empty list.
    c.scan(true);
    assert!(c.registry().is_empty());
}

#[test]
fn device_found_notifies_only_new_devices() {
    let (mut c, _log) = controller();
    let found = Arc::new(Mutex::new(Vec::new()));
    {
        let found = Arc::clone(&found);
        c.events().subscribe_device_found(move |identity| {
            found.lock().unwrap().push(identity.address.clone());
        });
    }

    c.scan(true);
    c.on_device_found(DeviceIdentity::new("AA:BB"));
    c.on_device_found(DeviceIdentity::new("AA:BB"));
    c.on_device_found(DeviceIdentity::new("CC:DD"));

    assert_eq!(*found.lock().unwrap(), ["AA:BB", "CC:DD"]);
}

// ── Connection ────────────────────────────────────────────────

#[test]
fn connect_then_transport_reports_reach_connected() {
    let (mut c, log) = controller();
    let states = Arc::new(Mutex::new(Vec::new()));
    {
        let states = Arc::clone(&states);
        c.events().subscribe_connection_changed(move |_, state| {
            states.lock().unwrap().push(state);
        });
    }

    c.connect("AA:BB").unwrap();
    assert_eq!(
        log.borrow().last().unwrap(),
        &TransportCall::Connect {
            identifier: "AA:BB".into()
        }
    );

    c.on_connection_state_changed("AA:BB", ConnectionState::Connecting.code());
    assert!(!c.is_sensor_connected());

    c.on_connection_state_changed("AA:BB", ConnectionState::Connected.code());
    assert!(c.is_sensor_connected());

    assert_eq!(
        *states.lock().unwrap(),
        [ConnectionState::Connecting, ConnectionState::Connected]
    );
}

#[test]
fn second_connect_to_a_different_device_is_rejected() {
    let (mut c, log) = controller();
    c.connect("AA:BB").unwrap();
    c.on_connection_state_changed("AA:BB", ConnectionState::Connecting.code());

    assert!(c.connect("CC:DD").is_err());
    assert_eq!(c.target(), Some("AA:BB"));

    let connects = log
        .borrow()
        .iter()
        .filter(|call| matches!(call, TransportCall::Connect { .. }))
        .count();
    assert_eq!(connects, 1, "rejected connect must not reach the transport");
}

// ── Acquisition lifecycle ─────────────────────────────────────

fn drive_to_acquisition(c: &mut SessionController<MockTransport>, id: &str) {
    c.connect(id).unwrap();
    for state in [
        ConnectionState::Connecting,
        ConnectionState::Connected,
        ConnectionState::AcquisitionTrying,
        ConnectionState::AcquisitionOk,
    ] {
        c.on_connection_state_changed(id, state.code());
    }
}

#[test]
fn device_ready_auto_starts_with_the_default_profile() {
    let (mut c, log) = controller();
    c.connect("AA:BB").unwrap();
    c.on_connection_state_changed("AA:BB", ConnectionState::Connected.code());

    c.on_device_ready("AA:BB");

    assert_eq!(
        log.borrow().last().unwrap(),
        &TransportCall::StartAcquisition {
            identifier: "AA:BB".into(),
            frequency_hz: 1000,
            channel_count: 1,
            frequency_divisor: 100,
        }
    );
}

#[test]
fn acquisition_stopping_triggers_exactly_one_disconnect() {
    let (mut c, log) = controller();
    drive_to_acquisition(&mut c, "AA:BB");
    assert_eq!(c.state(), ConnectionState::AcquisitionOk);

    c.on_connection_state_changed("AA:BB", ConnectionState::AcquisitionStopping.code());
    assert_eq!(c.state(), ConnectionState::AcquisitionStopping);
    assert_eq!(disconnect_count(&log.borrow(), "AA:BB"), 1);

    // Re-asserted stopping state must not disconnect again.
    c.on_connection_state_changed("AA:BB", ConnectionState::AcquisitionStopping.code());
    assert_eq!(disconnect_count(&log.borrow(), "AA:BB"), 1);

    c.on_connection_state_changed("AA:BB", ConnectionState::Disconnected.code());
    assert!(!c.is_sensor_connected());
    assert_eq!(c.target(), None);
    assert_eq!(disconnect_count(&log.borrow(), "AA:BB"), 1);
}

#[test]
fn disconnect_while_streaming_stops_acquisition_first() {
    let (mut c, log) = controller();
    drive_to_acquisition(&mut c, "AA:BB");

    c.disconnect("AA:BB");
    assert_eq!(
        log.borrow().last().unwrap(),
        &TransportCall::StopAcquisition {
            identifier: "AA:BB".into()
        }
    );
}

#[test]
fn disconnect_outside_streaming_issues_no_command() {
    let (mut c, log) = controller();
    c.connect("AA:BB").unwrap();
    c.on_connection_state_changed("AA:BB", ConnectionState::Connected.code());

    let before = log.borrow().len();
    c.disconnect("AA:BB");
    assert_eq!(log.borrow().len(), before);
}

// ── Streaming ─────────────────────────────────────────────────

#[test]
fn frames_flow_to_subscribers_and_bad_records_do_not_stall() {
    let (mut c, _log) = controller();
    drive_to_acquisition(&mut c, "AA:BB");

    let frames = Arc::new(Mutex::new(Vec::new()));
    let failures = Arc::new(Mutex::new(0u32));
    {
        let frames = Arc::clone(&frames);
        c.events().subscribe_frame_received(move |frame| {
            frames.lock().unwrap().push(frame.sequence);
        });
        let failures = Arc::clone(&failures);
        c.events().subscribe_decode_failed(move |_| {
            *failures.lock().unwrap() += 1;
        });
    }

    c.on_frame_received(good_record("AA:BB", 1));
    c.on_frame_received(RawRecord {
        analog_channels: vec![],
        ..good_record("AA:BB", 2)
    });
    c.on_frame_received(good_record("AA:BB", 3));

    assert_eq!(*frames.lock().unwrap(), [1, 3]);
    assert_eq!(*failures.lock().unwrap(), 1);
}

#[test]
fn display_consumer_can_map_frames_to_a_fill_level() {
    let (mut c, _log) = controller();
    drive_to_acquisition(&mut c, "AA:BB");

    let fractions = Arc::new(Mutex::new(Vec::new()));
    {
        let fractions = Arc::clone(&fractions);
        let mut level = biolink::level::SignalLevel::new();
        c.events().subscribe_frame_received(move |frame| {
            fractions
                .lock()
                .unwrap()
                .push(level.update(frame.analog_channels[0]));
        });
    }

    for (sequence, sample) in [(1, 32_767 + 1000), (2, 32_767 + 500), (3, 32_767)] {
        c.on_frame_received(RawRecord {
            analog_channels: vec![sample],
            ..good_record("AA:BB", sequence)
        });
    }

    let fractions = fractions.lock().unwrap();
    assert_eq!(fractions.len(), 3);
    assert!((fractions[0] - 1.0).abs() < 1e-6);
    assert!((fractions[1] - 0.5).abs() < 1e-6);
    assert_eq!(fractions[2], 0.0);
}

#[test]
fn frame_from_another_device_is_still_delivered() {
    let (mut c, _log) = controller();
    drive_to_acquisition(&mut c, "AA:BB");

    let frames = Arc::new(Mutex::new(Vec::new()));
    {
        let frames = Arc::clone(&frames);
        c.events().subscribe_frame_received(move |frame| {
            frames.lock().unwrap().push(frame.source_identifier.clone());
        });
    }

    c.on_frame_received(good_record("FF:FF", 1));
    assert_eq!(*frames.lock().unwrap(), ["FF:FF"]);
}

#[test]
fn link_view_follows_the_transport_not_the_session() {
    let transport = MockTransport {
        link_connected: true,
        ..MockTransport::new()
    };
    let mut c = SessionController::with_transport(transport, AcquisitionConfig::default());

    // No target yet: nothing to ask the transport about.
    assert!(!c.link_is_connected());

    c.connect("AA:BB").unwrap();
    assert!(c.link_is_connected());
    // The session predicate still says "not connected" until the transport
    // reports a state past Connecting.
    assert!(!c.is_sensor_connected());
}

// ── Anomalies ─────────────────────────────────────────────────

#[test]
fn unknown_state_code_falls_back_to_no_connection() {
    let (mut c, _log) = controller();
    let states = Arc::new(Mutex::new(Vec::new()));
    {
        let states = Arc::clone(&states);
        c.events().subscribe_connection_changed(move |_, state| {
            states.lock().unwrap().push(state);
        });
    }

    c.connect("AA:BB").unwrap();
    c.on_connection_state_changed("AA:BB", 42);

    assert_eq!(c.state(), ConnectionState::NoConnection);
    assert_eq!(*states.lock().unwrap(), [ConnectionState::NoConnection]);
}

// ── Teardown ──────────────────────────────────────────────────

#[test]
fn close_resets_session_and_detaches_subscribers() {
    let (mut c, log) = controller();
    drive_to_acquisition(&mut c, "AA:BB");

    let hits = Arc::new(Mutex::new(0u32));
    {
        let hits = Arc::clone(&hits);
        c.events().subscribe_connection_changed(move |_, _| {
            *hits.lock().unwrap() += 1;
        });
    }

    c.close();
    assert_eq!(c.state(), ConnectionState::NoConnection);
    assert_eq!(c.target(), None);
    assert!(c.registry().is_empty());
    assert!(!c.has_transport());

    // Events after teardown reach nobody, commands reach no transport.
    c.on_connection_state_changed("AA:BB", ConnectionState::Connected.code());
    assert_eq!(*hits.lock().unwrap(), 0);

    let before = log.borrow().len();
    c.scan(true);
    assert_eq!(log.borrow().len(), before);

    // Idempotent.
    c.close();
}
