use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The renderer could not bind to the mount target.
    Mount(String),
    /// The map configuration is unusable.
    Config(String),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Mount(e) => write!(f, "failed to mount map: {e}"),
            MapError::Config(e) => write!(f, "invalid map config: {e}"),
        }
    }
}

impl std::error::Error for MapError {}
