use std::sync::Arc;
use waterfall::observability::SessionMonitor;
use waterfall::session::{NullDisplay, SessionController};
use waterfall::transport::Payload;
use waterfall::WaterfallConfig;

fn form_b(begin: u32, end: u32, count: u32, powers: &[i8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0u64.to_le_bytes());
    bytes.extend_from_slice(&begin.to_le_bytes());
    bytes.extend_from_slice(&end.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&count.to_le_bytes());
    bytes.extend(powers.iter().map(|p| *p as u8));
    bytes
}

#[test]
fn test_empty_report() {
    let controller = SessionController::new(&WaterfallConfig::default(), NullDisplay);
    let monitor = SessionMonitor::new(
        Arc::clone(controller.metrics()),
        Arc::clone(controller.registry()),
    );

    let report = monitor.generate_report();
    assert!(report.contains("Received: 0"));
    assert!(report.contains("Dropped: 0 frames"));
    assert!(report.contains("No channels registered"));
}

#[test]
fn test_report_lists_channels_and_drops() {
    let mut controller = SessionController::new(&WaterfallConfig::default(), NullDisplay);
    let monitor = SessionMonitor::new(
        Arc::clone(controller.metrics()),
        Arc::clone(controller.registry()),
    );

    controller.connect();
    controller.handle_message(None, &Payload::Binary(form_b(100_000_000, 102_500_000, 2, &[-5, -6])));
    controller.handle_message(None, &Payload::Binary(form_b(100_000_000, 102_500_000, 2, &[-7, -8])));
    controller.handle_message(None, &Payload::Binary(form_b(200, 100, 1, &[0])));

    let report = monitor.generate_report();
    assert!(report.contains("Routed: 2"));
    assert!(report.contains("Dropped: 1 frame\n"));
    assert!(report.contains("invalid_range: 1"));
    assert!(report.contains("[100.000.000 - 102.500.000 Hz (2 bins)]"));
    assert!(report.contains("Rows: 2/512"));
    assert_eq!(monitor.metrics().frames_received(), 3);
}
