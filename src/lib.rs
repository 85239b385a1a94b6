pub mod buffers;
pub mod config;
pub mod core;
pub mod error;
pub mod observability;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod transport;

pub use config::{DisplayRange, WaterfallConfig};
pub use crate::core::SpectrogramFrame;
pub use error::IngestError;
pub use registry::{ChannelKey, ChannelRegistry};
pub use session::SessionController;
