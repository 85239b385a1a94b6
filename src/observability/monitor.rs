use super::IngestMetrics;
use crate::registry::ChannelRegistry;
use std::sync::Arc;

/// Text report over a session's counters and channels
pub struct SessionMonitor {
    metrics: Arc<IngestMetrics>,
    registry: Arc<ChannelRegistry>,
}

impl SessionMonitor {
    pub fn new(metrics: Arc<IngestMetrics>, registry: Arc<ChannelRegistry>) -> Self {
        Self { metrics, registry }
    }

    pub fn generate_report(&self) -> String {
        let snapshot = self.metrics.snapshot();
        let dropped = snapshot.dropped.total();

        let mut report = String::from("=== Ingest Metrics ===\n");
        report.push_str(&format!(
            "  Received: {}\n  Decoded: {}\n  Routed: {}\n  Ignored: {} (topic {}, disconnected {})\n  Dropped: {}\n",
            snapshot.frames_received,
            snapshot.frames_decoded,
            snapshot.frames_routed,
            snapshot.ignored_topic + snapshot.ignored_disconnected,
            snapshot.ignored_topic,
            snapshot.ignored_disconnected,
            if dropped > 0 {
                format!("{} frame{}", dropped, if dropped == 1 { "" } else { "s" })
            } else {
                "0 frames".to_string()
            },
        ));

        let kinds = [
            ("truncated_buffer", snapshot.dropped.truncated_buffer),
            ("invalid_range", snapshot.dropped.invalid_range),
            ("unknown_format", snapshot.dropped.unknown_format),
            ("length_mismatch", snapshot.dropped.length_mismatch),
            ("malformed", snapshot.dropped.malformed),
            ("sample_count_mismatch", snapshot.dropped.sample_count_mismatch),
        ];
        for (kind, count) in kinds.iter().filter(|(_, count)| *count > 0) {
            report.push_str(&format!("    {}: {}\n", kind, count));
        }

        report.push_str(&format!(
            "  Channels created: {}\n  Session resets: {}\n  Avg Latency: {}μs\n",
            snapshot.channels_created, snapshot.session_resets, snapshot.avg_latency_us
        ));

        let keys = self.registry.keys();
        if keys.is_empty() {
            report.push_str("\nNo channels registered\n");
            return report;
        }

        report.push_str(&format!("\n=== Channels (generation {}) ===\n", self.registry.generation()));
        for key in keys {
            let rows = self
                .registry
                .with_channel(&key, |entry| (entry.buffer().len(), entry.buffer().capacity()));
            if let Some((len, capacity)) = rows {
                report.push_str(&format!("\n[{}]\n  Rows: {}/{}\n", key, len, capacity));
            }
        }

        report
    }

    pub fn metrics(&self) -> &IngestMetrics {
        &self.metrics
    }
}
