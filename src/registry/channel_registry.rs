use super::channel::observed_bounds;
use super::{resolve, ChannelEntry, ChannelKey, ChannelSnapshot};
use crate::buffers::BufferError;
use crate::config::{DisplayRange, WaterfallConfig};
use crate::core::SpectrogramFrame;
use crate::error::IngestError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Result of routing one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    pub key: ChannelKey,
    pub is_new_channel: bool,
    pub bandwidth: u64,
    pub center_frequency: u64,
    /// Rows held by the channel after the push
    pub rows: usize,
    pub generation: u64,
    /// The pushed row, shared with the buffer
    pub row: Arc<[f32]>,
}

struct RegistryInner {
    channels: HashMap<ChannelKey, ChannelEntry>,
    generation: u64,
}

/// Channel key -> rolling buffer map for one session
///
/// The whole map sits behind one mutex. Every public call takes the lock for
/// its own duration only; decoding and display callouts happen outside it.
/// Nothing done under the lock scales with a frame's sample count: rows are
/// shared slices and per-row scans run before the lock is taken.
pub struct ChannelRegistry {
    inner: Mutex<RegistryInner>,
    history_rows: usize,
    default_range: DisplayRange,
    auto_range: bool,
}

impl ChannelRegistry {
    pub fn new(history_rows: usize, default_range: DisplayRange) -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                channels: HashMap::new(),
                generation: 0,
            }),
            history_rows,
            default_range,
            auto_range: false,
        }
    }

    pub fn from_config(config: &WaterfallConfig) -> Self {
        Self::new(config.history_rows, config.display_range).with_auto_range(config.auto_range)
    }

    pub fn with_auto_range(mut self, auto_range: bool) -> Self {
        self.auto_range = auto_range;
        self
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn history_rows(&self) -> usize {
        self.history_rows
    }

    /// Find or create the frame's channel without pushing data
    pub fn route(&self, frame: &SpectrogramFrame) -> (ChannelKey, bool) {
        let key = resolve(frame);
        let mut inner = self.lock();

        let is_new_channel = !inner.channels.contains_key(&key);
        if is_new_channel {
            inner
                .channels
                .insert(key, ChannelEntry::new(key, self.history_rows, self.default_range));
        }

        (key, is_new_channel)
    }

    /// Route the frame and push its powers as one atomic step
    ///
    /// A rejected row never leaves a fresh, empty channel behind.
    pub fn ingest(&self, frame: SpectrogramFrame) -> Result<RouteOutcome, IngestError> {
        let key = resolve(&frame);
        let timestamp = frame.timestamp();
        let row: Arc<[f32]> = frame.into_powers().into();
        let bounds = observed_bounds(&row);

        let mut guard = self.lock();
        let inner = &mut *guard;

        let is_new_channel = !inner.channels.contains_key(&key);
        let entry = inner
            .channels
            .entry(key)
            .or_insert_with(|| ChannelEntry::new(key, self.history_rows, self.default_range));

        match entry.accept(timestamp, Arc::clone(&row), bounds, self.auto_range) {
            Ok(()) => Ok(RouteOutcome {
                key,
                is_new_channel,
                bandwidth: entry.bandwidth(),
                center_frequency: entry.center_frequency(),
                rows: entry.buffer().len(),
                generation: inner.generation,
                row,
            }),
            Err(BufferError::SampleCountMismatch { expected, actual }) => {
                if is_new_channel {
                    inner.channels.remove(&key);
                }
                Err(IngestError::SampleCountMismatch {
                    key,
                    expected,
                    actual,
                })
            }
        }
    }

    /// Owned copy of a channel for the display layer
    ///
    /// Rows are shared with the buffer, so this copies one pointer per row.
    pub fn get(&self, key: &ChannelKey) -> Option<ChannelSnapshot> {
        let inner = self.lock();
        inner
            .channels
            .get(key)
            .map(|entry| entry.snapshot(inner.generation))
    }

    /// Borrow a channel under the lock; keep `f` short
    pub fn with_channel<R>(&self, key: &ChannelKey, f: impl FnOnce(&ChannelEntry) -> R) -> Option<R> {
        self.lock().channels.get(key).map(f)
    }

    pub fn contains(&self, key: &ChannelKey) -> bool {
        self.lock().channels.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys in frequency order
    pub fn keys(&self) -> Vec<ChannelKey> {
        let mut keys: Vec<ChannelKey> = self.lock().channels.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Number of resets so far
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Drop every channel; returns how many were discarded
    pub fn reset(&self) -> usize {
        let mut inner = self.lock();
        let discarded = inner.channels.len();
        inner.channels.clear();
        inner.generation += 1;
        discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(begin: u64, end: u64, powers: Vec<f32>) -> SpectrogramFrame {
        SpectrogramFrame::from_range(Some(1), begin, end, None, powers).unwrap()
    }

    #[test]
    fn test_route_does_not_push() {
        let registry = ChannelRegistry::new(4, DisplayRange::default());
        let (key, is_new) = registry.route(&frame(0, 100, vec![1.0, 2.0]));

        assert!(is_new);
        let rows = registry.with_channel(&key, |e| e.buffer().len()).unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn test_reset_bumps_generation() {
        let registry = ChannelRegistry::new(4, DisplayRange::default());
        registry.ingest(frame(0, 100, vec![1.0])).unwrap();

        assert_eq!(registry.generation(), 0);
        assert_eq!(registry.reset(), 1);
        assert_eq!(registry.generation(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_shares_pushed_row() {
        let registry = ChannelRegistry::new(4, DisplayRange::default());
        let outcome = registry.ingest(frame(0, 100, vec![1.0, 2.0, 3.0])).unwrap();

        let snapshot = registry.get(&outcome.key).unwrap();
        assert!(Arc::ptr_eq(&snapshot.rows[0], &outcome.row));
    }

    #[test]
    fn test_observed_range_tracked_without_auto_range() {
        let registry = ChannelRegistry::new(4, DisplayRange::default());
        let key = registry.ingest(frame(0, 100, vec![-73.0, -5.0])).unwrap().key;

        let (observed, range) = registry
            .with_channel(&key, |e| (e.observed_range(), e.buffer().range()))
            .unwrap();
        assert_eq!(observed, Some(DisplayRange::new(-80.0, 0.0)));
        assert_eq!(range, DisplayRange::default());
    }
}
