use crate::registry::ChannelKey;
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Serialize;

/// Outbound notifications to whatever renders the waterfall
///
/// Calls arrive from the delivery path, never under the registry lock.
/// Implementations must not block.
pub trait DisplaySink: Send {
    fn channel_created(&mut self, key: ChannelKey, bandwidth: u64, center_frequency: u64);

    fn channel_updated(&mut self, key: ChannelKey, row: &[f32]);

    fn session_reset(&mut self);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DisplayEvent {
    ChannelCreated {
        key: ChannelKey,
        bandwidth: u64,
        center_frequency: u64,
    },
    ChannelUpdated {
        key: ChannelKey,
        row: Vec<f32>,
    },
    SessionReset,
}

/// Headless sink
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn channel_created(&mut self, _key: ChannelKey, _bandwidth: u64, _center_frequency: u64) {}

    fn channel_updated(&mut self, _key: ChannelKey, _row: &[f32]) {}

    fn session_reset(&mut self) {}
}

/// Forwards events to a render thread over a crossbeam channel
///
/// The channel is unbounded so delivery never waits on the renderer.
/// Events sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelDisplay {
    tx: Sender<DisplayEvent>,
}

impl ChannelDisplay {
    pub fn new() -> (Self, Receiver<DisplayEvent>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }

    fn send(&self, event: DisplayEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("display receiver dropped, event discarded");
        }
    }
}

impl DisplaySink for ChannelDisplay {
    fn channel_created(&mut self, key: ChannelKey, bandwidth: u64, center_frequency: u64) {
        self.send(DisplayEvent::ChannelCreated {
            key,
            bandwidth,
            center_frequency,
        });
    }

    fn channel_updated(&mut self, key: ChannelKey, row: &[f32]) {
        self.send(DisplayEvent::ChannelUpdated {
            key,
            row: row.to_vec(),
        });
    }

    fn session_reset(&mut self) {
        self.send(DisplayEvent::SessionReset);
    }
}
