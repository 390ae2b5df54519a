//! Message bridge between the map runtime and the native host shell.
//!
//! The host exposes a single string-based send primitive and delivers
//! commands as text events. Everything on the wire is one JSON object per
//! message with a `type` discriminator.

pub mod channel;
pub mod error;
pub mod protocol;
pub mod stats;
pub mod transport;

pub use channel::*;
pub use error::*;
pub use protocol::*;
pub use stats::*;
pub use transport::*;
