pub mod controller;
pub mod display;
pub mod state;

pub use controller::{IgnoreReason, MessageOutcome, SessionController};
pub use display::{ChannelDisplay, DisplayEvent, DisplaySink, NullDisplay};
pub use state::SessionState;
