use crate::core::{center_frequency, format_frequency, SpectrogramFrame};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one logical channel
///
/// Sample count is part of the identity: the same span scanned at two
/// resolutions is two channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelKey {
    begin_frequency: u64,
    end_frequency: u64,
    sample_count: usize,
}

impl ChannelKey {
    pub fn new(begin_frequency: u64, end_frequency: u64, sample_count: usize) -> Self {
        Self {
            begin_frequency,
            end_frequency,
            sample_count,
        }
    }

    pub fn begin_frequency(&self) -> u64 {
        self.begin_frequency
    }

    pub fn end_frequency(&self) -> u64 {
        self.end_frequency
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn bandwidth(&self) -> u64 {
        self.end_frequency.saturating_sub(self.begin_frequency)
    }

    pub fn center_frequency(&self) -> u64 {
        center_frequency(self.begin_frequency, self.end_frequency)
    }
}

/// Display label only
impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} Hz ({} bins)",
            format_frequency(self.begin_frequency),
            format_frequency(self.end_frequency),
            self.sample_count
        )
    }
}

/// Channel a frame belongs to
pub fn resolve(frame: &SpectrogramFrame) -> ChannelKey {
    ChannelKey::new(
        frame.begin_frequency(),
        frame.end_frequency(),
        frame.sample_count(),
    )
}
