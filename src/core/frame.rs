use crate::protocol::DecodeError;
use serde::{Deserialize, Serialize};

/// Decoded spectrum measurement for one frequency range
///
/// Every wire layout decodes into this shape. Powers are always `f32` dB
/// values here, whatever width the producer used on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrogramFrame {
    /// Milliseconds since epoch, absent in the structured form
    timestamp: Option<u64>,

    begin_frequency: u64,
    end_frequency: u64,

    /// Bin spacing in Hz, when the producer declared one
    step_frequency: Option<u64>,

    /// Explicit per-bin frequencies, when the layout carries them
    frequencies: Option<Vec<u64>>,

    /// Relative power in dB, one reading per bin
    powers: Vec<f32>,
}

impl SpectrogramFrame {
    /// Build a frame whose bins are implied by `begin`/`step`
    pub fn from_range(
        timestamp: Option<u64>,
        begin_frequency: u64,
        end_frequency: u64,
        step_frequency: Option<u64>,
        powers: Vec<f32>,
    ) -> Result<Self, DecodeError> {
        check_range(begin_frequency, end_frequency)?;

        Ok(Self {
            timestamp,
            begin_frequency,
            end_frequency,
            step_frequency,
            frequencies: None,
            powers,
        })
    }

    /// Build a frame from explicit bin frequencies
    ///
    /// The range is taken from the first and last bin. An empty frame has a
    /// zero-width range at 0 Hz.
    pub fn from_bins(
        timestamp: Option<u64>,
        frequencies: Vec<u64>,
        powers: Vec<f32>,
    ) -> Result<Self, DecodeError> {
        if frequencies.len() != powers.len() {
            return Err(DecodeError::LengthMismatch {
                frequencies: frequencies.len(),
                powers: powers.len(),
            });
        }

        let begin_frequency = frequencies.first().copied().unwrap_or(0);
        let end_frequency = frequencies.last().copied().unwrap_or(0);
        check_range(begin_frequency, end_frequency)?;

        let step_frequency = match frequencies.len() {
            0 | 1 => None,
            n => Some((end_frequency - begin_frequency) / (n as u64 - 1)),
        };

        Ok(Self {
            timestamp,
            begin_frequency,
            end_frequency,
            step_frequency,
            frequencies: Some(frequencies),
            powers,
        })
    }

    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    pub fn begin_frequency(&self) -> u64 {
        self.begin_frequency
    }

    pub fn end_frequency(&self) -> u64 {
        self.end_frequency
    }

    pub fn step_frequency(&self) -> Option<u64> {
        self.step_frequency
    }

    pub fn frequencies(&self) -> Option<&[u64]> {
        self.frequencies.as_deref()
    }

    pub fn powers(&self) -> &[f32] {
        &self.powers
    }

    pub fn into_powers(self) -> Vec<f32> {
        self.powers
    }

    pub fn sample_count(&self) -> usize {
        self.powers.len()
    }

    pub fn bandwidth(&self) -> u64 {
        self.end_frequency - self.begin_frequency
    }

    pub fn center_frequency(&self) -> u64 {
        center_frequency(self.begin_frequency, self.end_frequency)
    }

    /// Frequency of bin `index`, explicit or interpolated from the range
    pub fn frequency_at(&self, index: usize) -> Option<u64> {
        if index >= self.sample_count() {
            return None;
        }

        if let Some(frequencies) = &self.frequencies {
            return frequencies.get(index).copied();
        }

        let step = match self.step_frequency {
            Some(step) => step,
            None if self.sample_count() > 1 => {
                self.bandwidth() / (self.sample_count() as u64 - 1)
            }
            None => 0,
        };

        Some(self.begin_frequency.saturating_add(step.saturating_mul(index as u64)))
    }
}

/// `begin + round(bandwidth / 2)`, halves rounded up
///
/// Written so it cannot overflow for any `begin <= end`.
pub fn center_frequency(begin: u64, end: u64) -> u64 {
    let bandwidth = end.saturating_sub(begin);
    begin + bandwidth / 2 + bandwidth % 2
}

fn check_range(begin: u64, end: u64) -> Result<(), DecodeError> {
    if end < begin {
        return Err(DecodeError::InvalidRange { begin, end });
    }
    Ok(())
}

/// Render a frequency as `MHz.kHz.Hz` groups, e.g. `"100.000.000"`
///
/// For log lines and display labels only; never used as a lookup key.
pub fn format_frequency(frequency: u64) -> String {
    format!(
        "{}.{:03}.{:03}",
        frequency / 1_000_000,
        (frequency / 1_000) % 1_000,
        frequency % 1_000
    )
}
