use crate::observability::MetricsSnapshot;
use crate::session::{DisplaySink, MessageOutcome, SessionController};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::VecDeque;
use tokio::sync::mpsc;

/// Body of one delivered message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Binary(Vec<u8>),
    /// Text frames are always the structured layout
    Text(String),
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(bytes)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    /// `topic` is `None` for socket delivery
    Message {
        topic: Option<String>,
        payload: Payload,
    },
}

impl TransportEvent {
    pub fn message(topic: impl Into<String>, payload: impl Into<Payload>) -> Self {
        Self::Message {
            topic: Some(topic.into()),
            payload: payload.into(),
        }
    }

    pub fn untopiced(payload: impl Into<Payload>) -> Self {
        Self::Message {
            topic: None,
            payload: payload.into(),
        }
    }
}

/// Anything that delivers transport events in arrival order
#[async_trait]
pub trait FrameSource: Send {
    /// `None` once the source is exhausted
    async fn next_event(&mut self) -> Option<TransportEvent>;
}

/// Source fed by a host transport through a bounded tokio channel
pub struct ChannelSource {
    rx: mpsc::Receiver<TransportEvent>,
}

impl ChannelSource {
    pub fn new(capacity: usize) -> (mpsc::Sender<TransportEvent>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self { rx })
    }

    pub fn from_receiver(rx: mpsc::Receiver<TransportEvent>) -> Self {
        Self { rx }
    }
}

#[async_trait]
impl FrameSource for ChannelSource {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        self.rx.recv().await
    }
}

/// Fixed event list, mostly for tests and replays
#[derive(Debug, Default)]
pub struct ReplaySource {
    events: VecDeque<TransportEvent>,
}

impl ReplaySource {
    pub fn new(events: impl IntoIterator<Item = TransportEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

#[async_trait]
impl FrameSource for ReplaySource {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.pop_front()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub events: u64,
    pub connects: u64,
    pub disconnects: u64,
    pub routed: u64,
    pub ignored: u64,
    pub dropped: u64,
    /// Channels alive when the source ended
    pub channels: usize,
    pub metrics: MetricsSnapshot,
}

/// Drain `source` into `controller` one event at a time
pub async fn run_session<S, D>(source: &mut S, controller: &mut SessionController<D>) -> SessionSummary
where
    S: FrameSource + ?Sized,
    D: DisplaySink,
{
    let mut summary = SessionSummary::default();

    while let Some(event) = source.next_event().await {
        summary.events += 1;

        match &event {
            TransportEvent::Connected => summary.connects += 1,
            TransportEvent::Disconnected => summary.disconnects += 1,
            TransportEvent::Message { .. } => {}
        }

        match controller.handle_event(event) {
            Some(MessageOutcome::Routed(_)) => summary.routed += 1,
            Some(MessageOutcome::Ignored(_)) => summary.ignored += 1,
            Some(MessageOutcome::Dropped(_)) => summary.dropped += 1,
            None => {}
        }
    }

    summary.channels = controller.registry().len();
    summary.metrics = controller.metrics().snapshot();

    tracing::info!(
        events = summary.events,
        routed = summary.routed,
        dropped = summary.dropped,
        channels = summary.channels,
        "source exhausted"
    );
    summary
}
