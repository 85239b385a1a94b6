pub mod frame;

pub use frame::{center_frequency, format_frequency, SpectrogramFrame};
