use waterfall::protocol::{encode, WireFormat};
use waterfall::session::{
    ChannelDisplay, DisplayEvent, IgnoreReason, MessageOutcome, NullDisplay, SessionController,
    SessionState,
};
use waterfall::transport::{Payload, TransportEvent};
use waterfall::{ChannelKey, SpectrogramFrame, WaterfallConfig};

fn form_b(begin: u32, end: u32, powers: &[i8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0u64.to_le_bytes());
    bytes.extend_from_slice(&begin.to_le_bytes());
    bytes.extend_from_slice(&end.to_le_bytes());
    bytes.extend_from_slice(&1_000_000u32.to_le_bytes());
    bytes.extend_from_slice(&(powers.len() as u32).to_le_bytes());
    bytes.extend(powers.iter().map(|p| *p as u8));
    bytes
}

fn connected() -> SessionController<NullDisplay> {
    let mut controller = SessionController::new(&WaterfallConfig::default(), NullDisplay);
    controller.connect();
    controller
}

#[test]
fn test_frames_route_to_one_channel() {
    let mut controller = connected();

    let first = controller.handle_message(None, &Payload::Binary(form_b(100_000_000, 200_000_000, &[-10, -20, -30])));
    let second = controller.handle_message(None, &Payload::Binary(form_b(100_000_000, 200_000_000, &[-1, -2, -3])));

    let first = first.route().cloned().unwrap();
    let second = second.route().cloned().unwrap();
    assert!(first.is_new_channel);
    assert!(!second.is_new_channel);
    assert_eq!(first.key, second.key);
    assert_eq!(first.bandwidth, 100_000_000);
    assert_eq!(first.center_frequency, 150_000_000);

    let snapshot = controller.registry().get(&first.key).unwrap();
    assert_eq!(
        snapshot.to_rows(),
        vec![vec![-10.0, -20.0, -30.0], vec![-1.0, -2.0, -3.0]]
    );
}

#[test]
fn test_invalid_range_creates_no_channel() {
    let mut controller = connected();

    let outcome = controller.handle_message(None, &Payload::Binary(form_b(200, 100, &[1, 2])));
    let error = outcome.error().unwrap();

    assert_eq!(error.kind(), "invalid_range");
    assert!(controller.registry().is_empty());
    assert_eq!(controller.metrics().snapshot().dropped.invalid_range, 1);
}

#[test]
fn test_truncated_frame_leaves_registry_unchanged() {
    let mut controller = SessionController::new(
        &WaterfallConfig {
            wire_format: WireFormat::BinaryB,
            ..WaterfallConfig::default()
        },
        NullDisplay,
    );
    controller.connect();
    controller.handle_message(None, &Payload::Binary(form_b(100, 200, &[1, 2, 3])));

    // Declares ten samples, carries five
    let mut bytes = form_b(100, 200, &[1, 2, 3, 4, 5]);
    bytes[20..24].copy_from_slice(&10u32.to_le_bytes());
    let outcome = controller.handle_message(None, &Payload::Binary(bytes));

    assert_eq!(outcome.error().map(|e| e.kind()), Some("truncated_buffer"));
    assert_eq!(controller.registry().len(), 1);
    assert_eq!(controller.registry().keys(), vec![ChannelKey::new(100, 200, 3)]);
    assert_eq!(controller.state(), SessionState::Connected);
}

#[test]
fn test_foreign_topic_is_ignored() {
    let mut controller = connected();

    let outcome = controller.handle_message(
        Some("sdr/iq"),
        &Payload::Binary(form_b(100, 200, &[1])),
    );
    assert!(matches!(
        outcome,
        MessageOutcome::Ignored(IgnoreReason::WrongTopic)
    ));

    let outcome = controller.handle_message(
        Some("sdr/spectrogram"),
        &Payload::Binary(form_b(100, 200, &[1])),
    );
    assert!(outcome.is_routed());

    let snapshot = controller.metrics().snapshot();
    assert_eq!(snapshot.ignored_topic, 1);
    assert_eq!(snapshot.frames_received, 2);
    assert_eq!(snapshot.frames_routed, 1);
}

#[test]
fn test_reconnect_resets_channels() {
    let (display, rx) = ChannelDisplay::new();
    let mut controller = SessionController::new(&WaterfallConfig::default(), display);

    controller.handle_event(TransportEvent::Connected);
    controller.handle_message(None, &Payload::Binary(form_b(100, 200, &[1, 2])));
    controller.handle_event(TransportEvent::Disconnected);
    assert_eq!(controller.registry().len(), 1);

    controller.handle_event(TransportEvent::Connected);
    assert!(controller.registry().is_empty());
    assert_eq!(controller.registry().generation(), 2);

    let outcome = controller.handle_message(None, &Payload::Binary(form_b(100, 200, &[3, 4])));
    assert!(outcome.route().unwrap().is_new_channel);

    let events: Vec<DisplayEvent> = rx.try_iter().collect();
    let key = ChannelKey::new(100, 200, 2);
    assert_eq!(
        events,
        vec![
            DisplayEvent::SessionReset,
            DisplayEvent::ChannelCreated {
                key,
                bandwidth: 100,
                center_frequency: 150
            },
            DisplayEvent::ChannelUpdated {
                key,
                row: vec![1.0, 2.0]
            },
            DisplayEvent::SessionReset,
            DisplayEvent::ChannelCreated {
                key,
                bandwidth: 100,
                center_frequency: 150
            },
            DisplayEvent::ChannelUpdated {
                key,
                row: vec![3.0, 4.0]
            },
        ]
    );
}

#[test]
fn test_text_payload_is_structured() {
    let mut controller = SessionController::new(
        &WaterfallConfig {
            wire_format: WireFormat::BinaryA,
            ..WaterfallConfig::default()
        },
        NullDisplay,
    );
    controller.connect();

    let frame = SpectrogramFrame::from_bins(Some(1), vec![10, 20, 30], vec![-1.0, -2.0, -3.0]).unwrap();
    let text = String::from_utf8(encode(&frame, WireFormat::Structured).unwrap()).unwrap();

    let outcome = controller.handle_message(None, &Payload::Text(text));
    assert_eq!(outcome.route().unwrap().key, ChannelKey::new(10, 30, 3));
}

#[test]
fn test_unknown_message_type_is_dropped() {
    let mut controller = connected();
    let text = r#"{"type":"status","frequencies":[],"powers":[]}"#.to_string();

    let outcome = controller.handle_message(None, &Payload::Text(text));
    assert_eq!(outcome.error().map(|e| e.kind()), Some("unknown_format"));
    assert_eq!(controller.metrics().frames_dropped(), 1);
}

#[test]
fn test_default_config_reports_truncation() {
    let mut controller = connected();

    // Declares ten samples, carries five
    let mut bytes = form_b(100, 200, &[1, 2, 3, 4, 5]);
    bytes[20..24].copy_from_slice(&10u32.to_le_bytes());
    let outcome = controller.handle_message(None, &Payload::Binary(bytes));

    assert_eq!(outcome.error().map(|e| e.kind()), Some("truncated_buffer"));
    assert!(controller.registry().is_empty());
    assert_eq!(controller.metrics().snapshot().dropped.truncated_buffer, 1);
}

#[test]
fn test_full_u64_span_routes() {
    let mut controller = connected();
    let text = r#"{"type":"spectrogram","frequencies":[0,18446744073709551615],"powers":[-1.0,-2.0]}"#;

    let outcome = controller.handle_message(None, &Payload::Text(text.to_string()));
    let routed = outcome.route().cloned().unwrap();
    assert_eq!(routed.bandwidth, u64::MAX);
    assert_eq!(routed.center_frequency, u64::MAX / 2 + 1);

    // Registry still usable afterwards
    let outcome = controller.handle_message(None, &Payload::Binary(form_b(100, 200, &[1])));
    assert!(outcome.is_routed());
    assert_eq!(controller.registry().len(), 2);
}

#[test]
fn test_zero_width_frame_routes() {
    let mut controller = connected();

    let outcome = controller.handle_message(None, &Payload::Binary(form_b(100, 200, &[])));
    let routed = outcome.route().cloned().unwrap();
    assert_eq!(routed.key, ChannelKey::new(100, 200, 0));
    assert_eq!(routed.rows, 1);
    assert!(routed.row.is_empty());
}
