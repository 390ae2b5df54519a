use std::collections::BTreeSet;

use foundation::LonLat;
use layers::{Layer, LayerHandle, LayerId};
use tracing::debug;

use crate::backend::{MapBackend, MountTarget, ViewOptions};
use crate::error::MapError;

/// The live map: a mounted renderer plus the layers attached to it.
///
/// Only [`crate::BaseLayerSwitcher`] changes which layers are attached. View
/// state (center, zoom, rotation) follows user interaction and host commands.
#[derive(Debug)]
pub struct MapSurface<B> {
    target: MountTarget,
    view: ViewOptions,
    layers: Vec<LayerHandle>,
    materialized: BTreeSet<LayerId>,
    backend: B,
}

impl<B: MapBackend> MapSurface<B> {
    pub(crate) fn mount(
        target: MountTarget,
        view: ViewOptions,
        mut backend: B,
    ) -> Result<Self, MapError> {
        backend.mount(&target, &view)?;
        Ok(Self {
            target,
            view,
            layers: Vec::new(),
            materialized: BTreeSet::new(),
            backend,
        })
    }

    pub fn target(&self) -> &MountTarget {
        &self.target
    }

    pub fn view(&self) -> &ViewOptions {
        &self.view
    }

    /// Attached layers, bottom first.
    pub fn layers(&self) -> &[LayerHandle] {
        &self.layers
    }

    pub fn is_attached(&self, layer: &LayerHandle) -> bool {
        self.layers.iter().any(|l| l == layer)
    }

    pub fn rotation(&self) -> f64 {
        self.backend.rotation()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[cfg(test)]
    pub(crate) fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Move the view. `zoom` is clamped to the view's bounds.
    pub fn recenter(&mut self, center: LonLat, zoom: Option<f64>) -> Result<(), MapError> {
        if !center.is_valid() {
            return Err(MapError::Config(format!(
                "center out of range: [{}, {}]",
                center.lon, center.lat
            )));
        }
        self.view.center = center;
        self.backend.set_center(center);
        if let Some(zoom) = zoom {
            let zoom = self.view.zoom_bounds.clamp(zoom);
            self.view.zoom = zoom;
            self.backend.set_zoom(zoom);
        }
        Ok(())
    }

    pub fn set_rotation(&mut self, radians: f64) {
        self.backend.set_rotation(radians);
    }

    /// Append `layer` on top. Attaching an attached layer does nothing.
    pub(crate) fn attach(&mut self, layer: &LayerHandle) -> bool {
        if self.is_attached(layer) {
            return false;
        }
        if self.materialized.insert(layer.id()) {
            self.backend.create_tile_layer(layer);
        }
        self.backend.attach_layer(layer.id());
        self.layers.push(layer.clone());
        debug!(key = %layer.key(), id = %layer.id(), "attached layer");
        true
    }

    pub(crate) fn detach(&mut self, layer: &LayerHandle) -> bool {
        let Some(pos) = self.layers.iter().position(|l| l == layer) else {
            return false;
        };
        self.layers.remove(pos);
        self.backend.detach_layer(layer.id());
        true
    }

    pub(crate) fn redraw(&mut self) {
        self.backend.force_redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::MapSurface;
    use crate::backend::{MountTarget, ViewOptions};
    use crate::headless::{BackendOp, HeadlessBackend};
    use foundation::{LonLat, Projection, ZoomBounds};
    use layers::{Layer, LayerHandle, LayerId, LayerKey, TileLayer, TileSource};
    use pretty_assertions::assert_eq;

    fn view() -> ViewOptions {
        ViewOptions {
            center: LonLat::new(116.391, 39.907),
            projection: Projection::WebMercator,
            zoom: 12.0,
            zoom_bounds: ZoomBounds::new(2.0, 18.0).unwrap(),
        }
    }

    fn handle(id: u64) -> LayerHandle {
        let url = format!("https://t{id}.example/{{z}}/{{x}}/{{y}}");
        LayerHandle::new(TileLayer::new(
            LayerId(id),
            LayerKey::Custom(url.clone()),
            TileSource::xyz(url, Projection::WebMercator),
        ))
    }

    fn surface() -> MapSurface<HeadlessBackend> {
        MapSurface::mount(MountTarget::new("map"), view(), HeadlessBackend::new()).unwrap()
    }

    #[test]
    fn layer_objects_are_created_once_per_surface() {
        let mut s = surface();
        let a = handle(1);
        assert!(s.attach(&a));
        assert!(s.detach(&a));
        assert!(s.attach(&a));

        let creates = s
            .backend()
            .ops()
            .iter()
            .filter(|op| matches!(op, BackendOp::CreateLayer(_)))
            .count();
        assert_eq!(creates, 1);
    }

    #[test]
    fn double_attach_is_a_noop() {
        let mut s = surface();
        let a = handle(1);
        assert!(s.attach(&a));
        assert!(!s.attach(&a));
        assert_eq!(s.layers().len(), 1);
        assert!(!s.detach(&handle(2)));
    }

    #[test]
    fn recenter_clamps_zoom_and_rejects_bad_center() {
        let mut s = surface();
        s.recenter(LonLat::new(120.0, 30.0), Some(40.0)).unwrap();
        assert_eq!(s.view().zoom, 18.0);
        assert_eq!(s.backend().zoom(), Some(18.0));
        assert_eq!(s.backend().center(), Some(LonLat::new(120.0, 30.0)));

        assert!(s.recenter(LonLat::new(0.0, 95.0), None).is_err());
        assert_eq!(s.view().center, LonLat::new(120.0, 30.0));
    }

    #[test]
    fn ids_flow_to_backend() {
        let mut s = surface();
        let a = handle(7);
        s.attach(&a);
        assert_eq!(
            s.backend().ops()[1..].to_vec(),
            vec![BackendOp::CreateLayer(a.id()), BackendOp::Attach(a.id())]
        );
    }
}
