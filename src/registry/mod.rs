pub mod channel;
pub mod channel_registry;
pub mod key;

pub use channel::{ChannelEntry, ChannelSnapshot};
pub use channel_registry::{ChannelRegistry, RouteOutcome};
pub use key::{resolve, ChannelKey};
