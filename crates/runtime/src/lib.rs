pub mod rotation;

pub use rotation::*;
