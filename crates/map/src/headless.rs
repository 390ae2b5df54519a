use foundation::LonLat;
use layers::{Layer, LayerId, TileLayer};

use crate::backend::{MapBackend, MountTarget, ViewOptions};
use crate::error::MapError;

/// A renderer call, as recorded by [`HeadlessBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendOp {
    Mount(MountTarget),
    CreateLayer(LayerId),
    Attach(LayerId),
    Detach(LayerId),
    Redraw,
    SetRotation(f64),
    SetCenter(LonLat),
    SetZoom(f64),
}

/// In-memory renderer that draws nothing and records every call.
///
/// Used where no real renderer is present: native tools, and tests that need
/// to inspect what the runtime asked for.
#[derive(Debug, Default, Clone)]
pub struct HeadlessBackend {
    ops: Vec<BackendOp>,
    rotation: f64,
    center: Option<LonLat>,
    zoom: Option<f64>,
    reject_mount: Option<String>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose `mount` fails with `reason`.
    pub fn rejecting_mount(reason: impl Into<String>) -> Self {
        Self {
            reject_mount: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn ops(&self) -> &[BackendOp] {
        &self.ops
    }

    pub fn center(&self) -> Option<LonLat> {
        self.center
    }

    pub fn zoom(&self) -> Option<f64> {
        self.zoom
    }

    pub fn redraw_count(&self) -> usize {
        self.ops.iter().filter(|op| **op == BackendOp::Redraw).count()
    }
}

impl MapBackend for HeadlessBackend {
    fn mount(&mut self, target: &MountTarget, view: &ViewOptions) -> Result<(), MapError> {
        if let Some(reason) = &self.reject_mount {
            return Err(MapError::Mount(reason.clone()));
        }
        self.ops.push(BackendOp::Mount(target.clone()));
        self.center = Some(view.center);
        self.zoom = Some(view.zoom);
        Ok(())
    }

    fn create_tile_layer(&mut self, layer: &TileLayer) {
        self.ops.push(BackendOp::CreateLayer(layer.id()));
    }

    fn attach_layer(&mut self, id: LayerId) {
        self.ops.push(BackendOp::Attach(id));
    }

    fn detach_layer(&mut self, id: LayerId) {
        self.ops.push(BackendOp::Detach(id));
    }

    fn force_redraw(&mut self) {
        self.ops.push(BackendOp::Redraw);
    }

    fn rotation(&self) -> f64 {
        self.rotation
    }

    fn set_rotation(&mut self, radians: f64) {
        self.rotation = radians;
        self.ops.push(BackendOp::SetRotation(radians));
    }

    fn set_center(&mut self, center: LonLat) {
        self.center = Some(center);
        self.ops.push(BackendOp::SetCenter(center));
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.zoom = Some(zoom);
        self.ops.push(BackendOp::SetZoom(zoom));
    }
}
