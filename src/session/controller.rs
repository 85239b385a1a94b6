use super::{DisplaySink, SessionState};
use crate::config::WaterfallConfig;
use crate::error::IngestError;
use crate::observability::IngestMetrics;
use crate::protocol::FrameDecoder;
use crate::registry::{ChannelRegistry, RouteOutcome};
use crate::transport::{Payload, TransportEvent};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Delivered on a topic other than the configured one
    WrongTopic,
    Disconnected,
}

/// What happened to one message event
#[derive(Debug)]
pub enum MessageOutcome {
    Routed(RouteOutcome),
    Ignored(IgnoreReason),
    Dropped(IngestError),
}

impl MessageOutcome {
    pub fn is_routed(&self) -> bool {
        matches!(self, Self::Routed(_))
    }

    pub fn route(&self) -> Option<&RouteOutcome> {
        match self {
            Self::Routed(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&IngestError> {
        match self {
            Self::Dropped(e) => Some(e),
            _ => None,
        }
    }
}

/// Connect/reset lifecycle plus the per-message ingest path
///
/// Owns the registry and hands out `Arc` clones so a display adapter can read
/// channels while messages keep arriving.
pub struct SessionController<D: DisplaySink> {
    state: SessionState,
    registry: Arc<ChannelRegistry>,
    decoder: FrameDecoder,
    display: D,
    metrics: Arc<IngestMetrics>,
    topic: String,
}

impl<D: DisplaySink> SessionController<D> {
    pub fn new(config: &WaterfallConfig, display: D) -> Self {
        Self {
            state: SessionState::default(),
            registry: Arc::new(ChannelRegistry::from_config(config)),
            decoder: FrameDecoder::new(config.wire_format),
            display,
            metrics: Arc::new(IngestMetrics::new()),
            topic: config.topic.clone(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    pub fn metrics(&self) -> &Arc<IngestMetrics> {
        &self.metrics
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn decoder(&self) -> &FrameDecoder {
        &self.decoder
    }

    /// (Re)connect: every channel from the previous session is discarded
    ///
    /// Returns how many channels were dropped.
    pub fn connect(&mut self) -> usize {
        let target = SessionState::Connected;
        if !self.state.can_transition_to(&target) {
            return 0;
        }

        let discarded = self.registry.reset();
        self.metrics.record_reset();
        self.display.session_reset();

        tracing::info!(
            from = self.state.name(),
            discarded,
            generation = self.registry.generation(),
            "session connected"
        );
        self.state = target;
        discarded
    }

    /// Channels survive until the next connect
    pub fn disconnect(&mut self) {
        let target = SessionState::Disconnected;
        if !self.state.can_transition_to(&target) {
            return;
        }

        tracing::info!(channels = self.registry.len(), "session disconnected");
        self.state = target;
    }

    pub fn handle_event(&mut self, event: TransportEvent) -> Option<MessageOutcome> {
        match event {
            TransportEvent::Connected => {
                self.connect();
                None
            }
            TransportEvent::Disconnected => {
                self.disconnect();
                None
            }
            TransportEvent::Message { topic, payload } => {
                Some(self.handle_message(topic.as_deref(), &payload))
            }
        }
    }

    /// Decode one delivered payload and route it to its channel
    ///
    /// Failures are recovered here: logged, counted, and the frame discarded
    /// with the registry untouched.
    pub fn handle_message(&mut self, topic: Option<&str>, payload: &Payload) -> MessageOutcome {
        self.metrics.record_received();

        if let Some(topic) = topic {
            if topic != self.topic {
                tracing::trace!(topic, "message on foreign topic ignored");
                self.metrics.record_ignored_topic();
                return MessageOutcome::Ignored(IgnoreReason::WrongTopic);
            }
        }

        if !self.state.is_connected() {
            tracing::debug!("message while disconnected ignored");
            self.metrics.record_ignored_disconnected();
            return MessageOutcome::Ignored(IgnoreReason::Disconnected);
        }

        let start = self.metrics.start_processing();
        let outcome = self.ingest(payload);
        self.metrics.finish_processing(start);
        outcome
    }

    fn ingest(&mut self, payload: &Payload) -> MessageOutcome {
        let decoded = match payload {
            Payload::Binary(bytes) => self.decoder.decode(bytes),
            Payload::Text(text) => self.decoder.decode_text(text),
        };

        let frame = match decoded {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, "frame dropped");
                let error = IngestError::from(e);
                self.metrics.record_dropped(&error);
                return MessageOutcome::Dropped(error);
            }
        };
        self.metrics.record_decoded();

        match self.registry.ingest(frame) {
            Ok(outcome) => {
                self.metrics.record_routed(outcome.is_new_channel);

                if outcome.is_new_channel {
                    tracing::info!(
                        channel = %outcome.key,
                        bandwidth = outcome.bandwidth,
                        center = outcome.center_frequency,
                        "channel created"
                    );
                    self.display.channel_created(
                        outcome.key,
                        outcome.bandwidth,
                        outcome.center_frequency,
                    );
                }
                self.display.channel_updated(outcome.key, &outcome.row);

                tracing::debug!(channel = %outcome.key, rows = outcome.rows, "frame routed");
                MessageOutcome::Routed(outcome)
            }
            Err(error) => {
                tracing::error!(kind = error.kind(), error = %error, "frame dropped");
                self.metrics.record_dropped(&error);
                MessageOutcome::Dropped(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::NullDisplay;

    #[test]
    fn test_messages_before_connect_are_ignored() {
        let mut controller = SessionController::new(&WaterfallConfig::default(), NullDisplay);
        let outcome = controller.handle_message(None, &Payload::Binary(vec![0; 12]));

        assert!(matches!(
            outcome,
            MessageOutcome::Ignored(IgnoreReason::Disconnected)
        ));
        assert!(controller.registry().is_empty());
    }

    #[test]
    fn test_disconnect_keeps_channels() {
        let mut controller = SessionController::new(&WaterfallConfig::default(), NullDisplay);
        controller.connect();

        let text = r#"{"type":"spectrogram","frequencies":[1,2],"powers":[-1.0,-2.0]}"#;
        let outcome = controller.handle_message(None, &Payload::Text(text.to_string()));
        assert!(outcome.is_routed());

        controller.disconnect();
        assert_eq!(controller.state(), SessionState::Disconnected);
        assert_eq!(controller.registry().len(), 1);
    }
}
