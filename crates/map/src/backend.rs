use foundation::{LonLat, Projection, ZoomBounds};
use layers::{LayerId, TileLayer};

use crate::error::MapError;

/// Where the renderer draws, as supplied by the hosting screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountTarget(pub String);

impl MountTarget {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Initial view of a map surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewOptions {
    pub center: LonLat,
    pub projection: Projection,
    pub zoom: f64,
    pub zoom_bounds: ZoomBounds,
}

/// The tiled-map renderer the runtime drives.
///
/// Implementations own the actual drawing. Layer-level calls are infallible
/// from the runtime's point of view; a renderer that can fail internally is
/// expected to log and carry on.
pub trait MapBackend {
    fn mount(&mut self, target: &MountTarget, view: &ViewOptions) -> Result<(), MapError>;

    /// Build the renderer-side object for `layer`. Called once per layer.
    fn create_tile_layer(&mut self, layer: &TileLayer);

    fn attach_layer(&mut self, id: LayerId);

    fn detach_layer(&mut self, id: LayerId);

    fn force_redraw(&mut self);

    /// Current view rotation in radians.
    fn rotation(&self) -> f64;

    fn set_rotation(&mut self, radians: f64);

    fn set_center(&mut self, center: LonLat);

    fn set_zoom(&mut self, zoom: f64);
}
