pub mod cache;
pub mod key;
pub mod layer;
pub mod providers;
pub mod source;

pub use cache::*;
pub use key::*;
pub use layer::*;
pub use providers::*;
pub use source::*;
