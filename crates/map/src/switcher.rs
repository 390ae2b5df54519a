use layers::LayerHandle;
use tracing::debug;

use crate::backend::MapBackend;
use crate::surface::MapSurface;

/// Keeps a surface's base layers in step with the last requested set.
///
/// The switcher remembers what it attached last time, detaches exactly that,
/// attaches the new targets in order, and always forces a redraw.
#[derive(Debug, Default)]
pub struct BaseLayerSwitcher {
    previous: Vec<LayerHandle>,
}

impl BaseLayerSwitcher {
    pub fn new() -> Self {
        Self {
            previous: Vec::new(),
        }
    }

    /// Layers attached by the last successful switch.
    pub fn active(&self) -> &[LayerHandle] {
        &self.previous
    }

    /// Make `targets` the surface's base layers.
    ///
    /// Does nothing when there is no surface or `targets` is empty. A layer
    /// listed more than once is attached at its first position only.
    pub fn switch_base_layers<B: MapBackend>(
        &mut self,
        surface: Option<&mut MapSurface<B>>,
        targets: &[LayerHandle],
    ) {
        let Some(surface) = surface else {
            debug!("base layer switch before map init; ignoring");
            return;
        };
        if targets.is_empty() {
            debug!("empty base layer switch; ignoring");
            return;
        }

        for layer in &self.previous {
            if surface.is_attached(layer) {
                surface.detach(layer);
            }
        }
        let mut next: Vec<LayerHandle> = Vec::with_capacity(targets.len());
        for layer in targets {
            if next.contains(layer) {
                continue;
            }
            surface.attach(layer);
            next.push(layer.clone());
        }
        self.previous = next;
        surface.redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::BaseLayerSwitcher;
    use crate::backend::{MountTarget, ViewOptions};
    use crate::headless::{BackendOp, HeadlessBackend};
    use crate::surface::MapSurface;
    use foundation::{LonLat, Projection, ZoomBounds};
    use layers::{LayerCache, LayerHandle, LayerKey, ProviderRegistry};
    use pretty_assertions::assert_eq;
    use std::convert::Infallible;

    struct Fixture {
        surface: MapSurface<HeadlessBackend>,
        cache: LayerCache,
        registry: ProviderRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            let view = ViewOptions {
                center: LonLat::new(116.391, 39.907),
                projection: Projection::WebMercator,
                zoom: 12.0,
                zoom_bounds: ZoomBounds::new(2.0, 18.0).unwrap(),
            };
            Self {
                surface: MapSurface::mount(MountTarget::new("map"), view, HeadlessBackend::new())
                    .unwrap(),
                cache: LayerCache::new(),
                registry: ProviderRegistry::new("token"),
            }
        }

        fn layer(&mut self, key: &str) -> LayerHandle {
            let registry = &self.registry;
            self.cache
                .get_or_create(LayerKey::parse(key).unwrap(), |k| {
                    Ok::<_, Infallible>(registry.source_for(k))
                })
                .unwrap()
        }

        fn keys(&self) -> Vec<String> {
            self.surface
                .layers()
                .iter()
                .map(|l| l.key().to_string())
                .collect()
        }
    }

    #[test]
    fn second_switch_replaces_first_exactly() {
        let mut fx = Fixture::new();
        let a = fx.layer("tdSatellite");
        let b = fx.layer("tdSatelliteLabel");
        let c = fx.layer("tdVector");
        let mut switcher = BaseLayerSwitcher::new();

        switcher.switch_base_layers(Some(&mut fx.surface), &[a.clone(), b.clone()]);
        assert_eq!(fx.keys(), vec!["tdSatellite", "tdSatelliteLabel"]);

        switcher.switch_base_layers(Some(&mut fx.surface), &[c.clone()]);
        assert_eq!(fx.keys(), vec!["tdVector"]);
        assert!(!fx.surface.is_attached(&a));
        assert!(!fx.surface.is_attached(&b));
        assert_eq!(switcher.active(), &[c][..]);
    }

    #[test]
    fn repeating_a_switch_does_not_duplicate() {
        let mut fx = Fixture::new();
        let a = fx.layer("tdSatellite");
        let b = fx.layer("tdSatelliteLabel");
        let mut switcher = BaseLayerSwitcher::new();

        for _ in 0..2 {
            switcher.switch_base_layers(Some(&mut fx.surface), &[a.clone(), b.clone()]);
            assert_eq!(fx.surface.layers(), &[a.clone(), b.clone()][..]);
        }
    }

    #[test]
    fn repeated_target_is_attached_once() {
        let mut fx = Fixture::new();
        let a = fx.layer("tdSatellite");
        let b = fx.layer("tdSatelliteLabel");
        let mut switcher = BaseLayerSwitcher::new();

        switcher.switch_base_layers(Some(&mut fx.surface), &[a.clone(), a.clone()]);
        assert_eq!(fx.surface.layers(), &[a.clone()][..]);
        assert_eq!(switcher.active(), fx.surface.layers());

        switcher.switch_base_layers(Some(&mut fx.surface), &[b.clone(), a.clone(), b.clone()]);
        assert_eq!(fx.surface.layers(), &[b.clone(), a.clone()][..]);
        assert_eq!(switcher.active(), fx.surface.layers());
    }

    #[test]
    fn order_follows_request() {
        let mut fx = Fixture::new();
        let a = fx.layer("tdVector");
        let b = fx.layer("tdVectorLabel");
        let mut switcher = BaseLayerSwitcher::new();

        switcher.switch_base_layers(Some(&mut fx.surface), &[a.clone(), b.clone()]);
        switcher.switch_base_layers(Some(&mut fx.surface), &[b.clone(), a.clone()]);
        assert_eq!(fx.keys(), vec!["tdVectorLabel", "tdVector"]);
    }

    #[test]
    fn empty_target_leaves_layers_untouched() {
        let mut fx = Fixture::new();
        let a = fx.layer("tdSatellite");
        let mut switcher = BaseLayerSwitcher::new();
        switcher.switch_base_layers(Some(&mut fx.surface), &[a.clone()]);
        let ops_before = fx.surface.backend().ops().len();

        switcher.switch_base_layers(Some(&mut fx.surface), &[]);

        assert_eq!(fx.keys(), vec!["tdSatellite"]);
        assert_eq!(fx.surface.backend().ops().len(), ops_before);
        assert_eq!(switcher.active(), &[a][..]);
    }

    #[test]
    fn missing_surface_is_a_noop() {
        let mut fx = Fixture::new();
        let a = fx.layer("tdSatellite");
        let mut switcher = BaseLayerSwitcher::new();

        switcher.switch_base_layers::<HeadlessBackend>(None, &[a]);
        assert!(switcher.active().is_empty());
    }

    #[test]
    fn redraw_is_forced_even_when_unchanged() {
        let mut fx = Fixture::new();
        let a = fx.layer("tdSatellite");
        let mut switcher = BaseLayerSwitcher::new();

        switcher.switch_base_layers(Some(&mut fx.surface), &[a.clone()]);
        switcher.switch_base_layers(Some(&mut fx.surface), &[a.clone()]);

        assert_eq!(fx.surface.backend().redraw_count(), 2);
        let ops = fx.surface.backend().ops();
        assert_eq!(ops.last(), Some(&BackendOp::Redraw));
    }
}
