use std::fmt;
use std::str::FromStr;

use crate::providers::BuiltinLayer;

/// Logical identity of a tile layer.
///
/// Built-in providers are addressed by their reserved name; anything else is a
/// custom tile URL and the raw URL is the identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerKey {
    Builtin(BuiltinLayer),
    Custom(String),
}

impl LayerKey {
    pub fn parse(raw: &str) -> Result<Self, LayerError> {
        if let Some(builtin) = BuiltinLayer::from_name(raw) {
            return Ok(LayerKey::Builtin(builtin));
        }
        if looks_like_url(raw) {
            return Ok(LayerKey::Custom(raw.to_string()));
        }
        Err(LayerError::UnknownKey(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            LayerKey::Builtin(b) => b.name(),
            LayerKey::Custom(url) => url,
        }
    }
}

fn looks_like_url(raw: &str) -> bool {
    raw.starts_with("//") || raw.contains("://")
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerKey {
    type Err = LayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayerKey::parse(s)
    }
}

impl From<BuiltinLayer> for LayerKey {
    fn from(b: BuiltinLayer) -> Self {
        LayerKey::Builtin(b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerError {
    /// Neither a reserved provider name nor a tile URL.
    UnknownKey(String),
}

impl fmt::Display for LayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerError::UnknownKey(key) => write!(f, "unknown layer key: {key:?}"),
        }
    }
}

impl std::error::Error for LayerError {}
