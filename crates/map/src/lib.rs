pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod headless;
pub mod map_runtime;
pub mod surface;
pub mod switcher;

pub use backend::*;
pub use config::*;
pub use controller::*;
pub use error::*;
pub use headless::*;
pub use map_runtime::*;
pub use surface::*;
pub use switcher::*;
