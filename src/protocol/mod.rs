//! Wire layouts for spectrogram frames
//!
//! Each layout has its own isolated parser; `decode` is the single entry
//! point that dispatches on the configured or detected `WireFormat`.

pub mod binary;
pub mod decoder;
pub mod error;
mod reader;
pub mod structured;

pub use decoder::{decode, decode_tagged, detect, encode, encode_tagged, FrameDecoder, WireFormat};
pub use error::{DecodeError, EncodeError};
pub use structured::{decode_message, StructuredMessage};
