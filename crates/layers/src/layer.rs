use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use crate::key::LayerKey;
use crate::source::TileSource;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

pub trait Layer {
    fn id(&self) -> LayerId;
}

/// A constructed tile layer: the logical key it was built for plus the
/// descriptor a renderer needs to materialize it.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    id: LayerId,
    key: LayerKey,
    source: TileSource,
}

impl TileLayer {
    pub fn new(id: LayerId, key: LayerKey, source: TileSource) -> Self {
        Self { id, key, source }
    }

    pub fn key(&self) -> &LayerKey {
        &self.key
    }

    pub fn source(&self) -> &TileSource {
        &self.source
    }
}

impl Layer for TileLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}

/// Shared reference to a cached [`TileLayer`].
///
/// Equality is identity: two handles are equal only if they point at the same
/// allocation, which is what the layer cache hands out for a repeated key.
#[derive(Debug, Clone)]
pub struct LayerHandle(Rc<TileLayer>);

impl LayerHandle {
    pub fn new(layer: TileLayer) -> Self {
        Self(Rc::new(layer))
    }

    pub fn ptr_eq(a: &LayerHandle, b: &LayerHandle) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl Deref for LayerHandle {
    type Target = TileLayer;

    fn deref(&self) -> &TileLayer {
        &self.0
    }
}

impl PartialEq for LayerHandle {
    fn eq(&self, other: &Self) -> bool {
        LayerHandle::ptr_eq(self, other)
    }
}

impl Eq for LayerHandle {}

impl Layer for LayerHandle {
    fn id(&self) -> LayerId {
        self.0.id
    }
}

#[cfg(test)]
mod tests {
    use super::{Layer, LayerHandle, LayerId, TileLayer};
    use crate::key::LayerKey;
    use crate::source::TileSource;
    use foundation::Projection;

    fn layer(id: u64) -> TileLayer {
        let url = "https://tiles.example.com/{z}/{x}/{y}.png";
        TileLayer::new(
            LayerId(id),
            LayerKey::Custom(url.to_string()),
            TileSource::xyz(url, Projection::WebMercator),
        )
    }

    #[test]
    fn equality_is_identity_not_structure() {
        let a = LayerHandle::new(layer(1));
        let b = LayerHandle::new(layer(1));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.id(), b.id());
    }
}
