use super::ChannelKey;
use crate::buffers::{BufferError, RollingBuffer};
use crate::config::DisplayRange;
use serde::Serialize;
use std::sync::Arc;

/// One channel's rolling history plus its metadata
#[derive(Debug)]
pub struct ChannelEntry {
    key: ChannelKey,
    bandwidth: u64,
    center_frequency: u64,
    last_seen: Option<u64>,
    frames_accepted: u64,
    observed: Option<DisplayRange>,
    buffer: RollingBuffer,
}

impl ChannelEntry {
    pub(crate) fn new(key: ChannelKey, history_rows: usize, range: DisplayRange) -> Self {
        let bandwidth = key.bandwidth();
        let center_frequency = key.center_frequency();

        let mut buffer = RollingBuffer::new(history_rows, key.sample_count());
        buffer.set_span(bandwidth);
        buffer.set_center(center_frequency);
        buffer.set_range(range.min_db, range.max_db);

        Self {
            key,
            bandwidth,
            center_frequency,
            last_seen: None,
            frames_accepted: 0,
            observed: None,
            buffer,
        }
    }

    /// Push one row; metadata only moves when the row is accepted
    ///
    /// `bounds` is the row's `observed_bounds`, computed by the caller so
    /// this stays constant time under the registry lock.
    pub(crate) fn accept(
        &mut self,
        timestamp: Option<u64>,
        row: Arc<[f32]>,
        bounds: Option<DisplayRange>,
        auto_range: bool,
    ) -> Result<(), BufferError> {
        self.buffer.push(row)?;

        self.frames_accepted += 1;
        if timestamp.is_some() {
            self.last_seen = timestamp;
        }

        if let Some(bounds) = bounds {
            let merged = match self.observed {
                Some(current) => DisplayRange::new(
                    current.min_db.min(bounds.min_db),
                    current.max_db.max(bounds.max_db),
                ),
                None => bounds,
            };
            self.observed = Some(merged);

            if auto_range {
                self.buffer.set_range(merged.min_db, merged.max_db);
            }
        }

        Ok(())
    }

    pub fn key(&self) -> ChannelKey {
        self.key
    }

    pub fn bandwidth(&self) -> u64 {
        self.bandwidth
    }

    pub fn center_frequency(&self) -> u64 {
        self.center_frequency
    }

    /// Timestamp of the newest frame that carried one
    pub fn last_seen(&self) -> Option<u64> {
        self.last_seen
    }

    pub fn frames_accepted(&self) -> u64 {
        self.frames_accepted
    }

    /// Power range seen so far, snapped outward to 10 dB steps
    pub fn observed_range(&self) -> Option<DisplayRange> {
        self.observed
    }

    pub fn buffer(&self) -> &RollingBuffer {
        &self.buffer
    }

    /// Copies one pointer per row; the row data itself is shared
    pub fn snapshot(&self, generation: u64) -> ChannelSnapshot {
        ChannelSnapshot {
            key: self.key,
            generation,
            bandwidth: self.bandwidth,
            center_frequency: self.center_frequency,
            last_seen: self.last_seen,
            range: self.buffer.range(),
            rows: self.buffer.shared_rows(),
        }
    }
}

/// Owned copy of a channel, safe to hold across a session reset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSnapshot {
    pub key: ChannelKey,
    /// Registry generation the copy was taken in
    pub generation: u64,
    pub bandwidth: u64,
    pub center_frequency: u64,
    pub last_seen: Option<u64>,
    pub range: DisplayRange,
    /// Oldest first
    pub rows: Vec<Arc<[f32]>>,
}

impl ChannelSnapshot {
    /// Deep copy of the rows, oldest first
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.rows.iter().map(|row| row.to_vec()).collect()
    }
}

/// min floored to a multiple of 10, max floored to a multiple of 10 plus 10
pub(crate) fn observed_bounds(powers: &[f32]) -> Option<DisplayRange> {
    let mut finite = powers.iter().copied().filter(|p| p.is_finite());
    let first = finite.next()?;
    let (min, max) = finite.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));

    Some(DisplayRange::new(
        (min / 10.0).floor() * 10.0,
        (max / 10.0).floor() * 10.0 + 10.0,
    ))
}
