use waterfall::protocol::{encode, WireFormat};
use waterfall::session::{NullDisplay, SessionController};
use waterfall::transport::{run_session, ChannelSource, ReplaySource, TransportEvent};
use waterfall::{SpectrogramFrame, WaterfallConfig};

fn frame_bytes(begin: u64, powers: Vec<f32>) -> Vec<u8> {
    let frame = SpectrogramFrame::from_range(Some(1), begin, begin + 1_000, Some(10), powers).unwrap();
    encode(&frame, WireFormat::BinaryB).unwrap()
}

#[tokio::test]
async fn test_run_session_over_channel() {
    let config = WaterfallConfig::default();
    let mut controller = SessionController::new(&config, NullDisplay);
    let (tx, mut source) = ChannelSource::new(config.channel_capacity);

    let producer = tokio::spawn(async move {
        tx.send(TransportEvent::Connected).await.unwrap();
        for i in 0..10 {
            tx.send(TransportEvent::message("sdr/spectrogram", frame_bytes(0, vec![i as f32; 8])))
                .await
                .unwrap();
        }
        tx.send(TransportEvent::message("sdr/spectrogram", vec![1u8, 2, 3]))
            .await
            .unwrap();
        tx.send(TransportEvent::Disconnected).await.unwrap();
    });

    let summary = run_session(&mut source, &mut controller).await;
    producer.await.unwrap();

    assert_eq!(summary.events, 13);
    assert_eq!(summary.connects, 1);
    assert_eq!(summary.disconnects, 1);
    assert_eq!(summary.routed, 10);
    assert_eq!(summary.dropped, 1);
    assert_eq!(summary.channels, 1);
    assert_eq!(summary.metrics.channels_created, 1);
    assert_eq!(summary.metrics.dropped.unknown_format, 1);
}

#[tokio::test]
async fn test_messages_before_connect_are_ignored() {
    let mut controller = SessionController::new(&WaterfallConfig::default(), NullDisplay);
    let mut source = ReplaySource::new(vec![
        TransportEvent::untopiced(frame_bytes(0, vec![1.0])),
        TransportEvent::Connected,
        TransportEvent::untopiced(frame_bytes(0, vec![1.0])),
    ]);

    let summary = run_session(&mut source, &mut controller).await;

    assert_eq!(summary.ignored, 1);
    assert_eq!(summary.routed, 1);
    assert_eq!(summary.metrics.ignored_disconnected, 1);
}

#[test]
fn test_replay_with_block_on() {
    let mut controller = SessionController::new(&WaterfallConfig::default(), NullDisplay);
    let mut source = ReplaySource::new(vec![
        TransportEvent::Connected,
        TransportEvent::untopiced(frame_bytes(0, vec![1.0, 2.0])),
        TransportEvent::untopiced(frame_bytes(5_000, vec![1.0, 2.0])),
        TransportEvent::Connected,
        TransportEvent::untopiced(frame_bytes(0, vec![3.0, 4.0])),
    ]);

    let summary = tokio_test::block_on(run_session(&mut source, &mut controller));

    assert_eq!(summary.connects, 2);
    assert_eq!(summary.channels, 1);
    assert_eq!(summary.metrics.channels_created, 3);
    assert_eq!(summary.metrics.session_resets, 2);
}
