use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use waterfall::observability::SessionMonitor;
use waterfall::protocol::{encode, WireFormat};
use waterfall::session::{ChannelDisplay, DisplayEvent, SessionController};
use waterfall::transport::{run_session, ChannelSource, TransportEvent};
use waterfall::{SpectrogramFrame, WaterfallConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => WaterfallConfig::load(&path).await?,
        None => WaterfallConfig::default(),
    };
    config.validate()?;

    println!("Waterfall ingest demo");
    println!("=====================\n");

    let (display, display_rx) = ChannelDisplay::new();
    let mut controller = SessionController::new(&config, display);
    let monitor = SessionMonitor::new(
        Arc::clone(controller.metrics()),
        Arc::clone(controller.registry()),
    );

    // Render side: just counts what it would draw
    let renderer = std::thread::spawn(move || {
        let mut rows = 0usize;
        for event in display_rx.iter() {
            match event {
                DisplayEvent::ChannelCreated { key, .. } => println!("  + channel {}", key),
                DisplayEvent::ChannelUpdated { .. } => rows += 1,
                DisplayEvent::SessionReset => println!("  * display cleared"),
            }
        }
        rows
    });

    let (tx, mut source) = ChannelSource::new(config.channel_capacity);
    let producer = tokio::spawn(produce(tx, config.topic.clone()));

    let summary = run_session(&mut source, &mut controller).await;
    producer.await.context("producer task panicked")??;

    println!("\n{}", monitor.generate_report());
    println!("Summary: {}", serde_json::to_string_pretty(&summary)?);

    drop(controller);
    let rows = renderer
        .join()
        .map_err(|_| anyhow::anyhow!("renderer thread panicked"))?;
    println!("Renderer received {} rows", rows);

    Ok(())
}

/// Synthetic scanner: every layout once per sweep plus a few bad frames
async fn produce(tx: mpsc::Sender<TransportEvent>, topic: String) -> Result<()> {
    tx.send(TransportEvent::Connected).await?;

    for sweep in 0..4u64 {
        let powers: Vec<f32> = (0..16)
            .map(|i| -60.0 + ((i as u64 * 7 + sweep * 3) % 50) as f32)
            .collect();

        let wide = SpectrogramFrame::from_range(
            Some(sweep),
            88_000_000,
            108_000_000,
            Some(1_250_000),
            powers.clone(),
        )?;
        tx.send(TransportEvent::message(&topic, encode(&wide, WireFormat::BinaryB)?))
            .await?;

        let bins: Vec<u64> = (0..16).map(|i| 433_000_000 + i * 25_000).collect();
        let narrow = SpectrogramFrame::from_bins(Some(sweep), bins, powers)?;
        tx.send(TransportEvent::message(&topic, encode(&narrow, WireFormat::BinaryA)?))
            .await?;
        tx.send(TransportEvent::message(
            &topic,
            encode(&narrow, WireFormat::BinaryACompact)?,
        ))
        .await?;
        tx.send(TransportEvent::untopiced(String::from_utf8(encode(
            &narrow,
            WireFormat::Structured,
        )?)?))
        .await?;
    }

    // Unrecognised shape, foreign topic, foreign message type
    tx.send(TransportEvent::message(&topic, vec![0u8; 7])).await?;
    tx.send(TransportEvent::message("sdr/iq", vec![0u8; 32])).await?;
    tx.send(TransportEvent::untopiced(
        r#"{"type":"status","frequencies":[],"powers":[]}"#.to_string(),
    ))
    .await?;

    tx.send(TransportEvent::Disconnected).await?;
    Ok(())
}
