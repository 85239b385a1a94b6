pub mod metrics;
pub mod monitor;

pub use metrics::{DropCounts, IngestMetrics, MetricsSnapshot};
pub use monitor::SessionMonitor;
