use crate::error::IngestError;
use crate::protocol::DecodeError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Lock-free counters for one ingest session
#[derive(Debug, Default)]
pub struct IngestMetrics {
    frames_received: AtomicU64,
    frames_decoded: AtomicU64,
    frames_routed: AtomicU64,
    ignored_topic: AtomicU64,
    ignored_disconnected: AtomicU64,
    dropped_truncated: AtomicU64,
    dropped_invalid_range: AtomicU64,
    dropped_unknown_format: AtomicU64,
    dropped_length_mismatch: AtomicU64,
    dropped_malformed: AtomicU64,
    dropped_sample_count: AtomicU64,
    channels_created: AtomicU64,
    session_resets: AtomicU64,
    total_latency_us: AtomicU64,
    latency_samples: AtomicU64,
}

impl IngestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decoded(&self) {
        self.frames_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_routed(&self, is_new_channel: bool) {
        self.frames_routed.fetch_add(1, Ordering::Relaxed);
        if is_new_channel {
            self.channels_created.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_ignored_topic(&self) {
        self.ignored_topic.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ignored_disconnected(&self) {
        self.ignored_disconnected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self, error: &IngestError) {
        let counter = match error {
            IngestError::Decode(DecodeError::TruncatedBuffer { .. }) => &self.dropped_truncated,
            IngestError::Decode(DecodeError::InvalidRange { .. }) => &self.dropped_invalid_range,
            IngestError::Decode(DecodeError::UnknownFormat(_)) => &self.dropped_unknown_format,
            IngestError::Decode(DecodeError::LengthMismatch { .. }) => &self.dropped_length_mismatch,
            IngestError::Decode(DecodeError::Malformed(_)) => &self.dropped_malformed,
            IngestError::SampleCountMismatch { .. } => &self.dropped_sample_count,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reset(&self) {
        self.session_resets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn start_processing(&self) -> Instant {
        Instant::now()
    }

    pub fn finish_processing(&self, start: Instant) {
        let latency_us = start.elapsed().as_micros() as u64;
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);
        self.latency_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received.load(Ordering::Relaxed)
    }

    pub fn frames_routed(&self) -> u64 {
        self.frames_routed.load(Ordering::Relaxed)
    }

    pub fn frames_dropped(&self) -> u64 {
        self.snapshot().dropped.total()
    }

    pub fn avg_latency_us(&self) -> u64 {
        let samples = self.latency_samples.load(Ordering::Relaxed);
        if samples == 0 {
            return 0;
        }
        self.total_latency_us.load(Ordering::Relaxed) / samples
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);

        MetricsSnapshot {
            frames_received: load(&self.frames_received),
            frames_decoded: load(&self.frames_decoded),
            frames_routed: load(&self.frames_routed),
            ignored_topic: load(&self.ignored_topic),
            ignored_disconnected: load(&self.ignored_disconnected),
            dropped: DropCounts {
                truncated_buffer: load(&self.dropped_truncated),
                invalid_range: load(&self.dropped_invalid_range),
                unknown_format: load(&self.dropped_unknown_format),
                length_mismatch: load(&self.dropped_length_mismatch),
                malformed: load(&self.dropped_malformed),
                sample_count_mismatch: load(&self.dropped_sample_count),
            },
            channels_created: load(&self.channels_created),
            session_resets: load(&self.session_resets),
            avg_latency_us: self.avg_latency_us(),
        }
    }
}

/// Dropped frames by error kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropCounts {
    pub truncated_buffer: u64,
    pub invalid_range: u64,
    pub unknown_format: u64,
    pub length_mismatch: u64,
    pub malformed: u64,
    pub sample_count_mismatch: u64,
}

impl DropCounts {
    pub fn total(&self) -> u64 {
        self.truncated_buffer
            + self.invalid_range
            + self.unknown_format
            + self.length_mismatch
            + self.malformed
            + self.sample_count_mismatch
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub frames_received: u64,
    pub frames_decoded: u64,
    pub frames_routed: u64,
    pub ignored_topic: u64,
    pub ignored_disconnected: u64,
    pub dropped: DropCounts,
    pub channels_created: u64,
    pub session_resets: u64,
    pub avg_latency_us: u64,
}
