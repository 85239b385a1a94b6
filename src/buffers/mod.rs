pub mod rolling;

pub use rolling::{BufferError, RollingBuffer};
