use std::cell::Cell;

use foundation::{LonLat, Projection};
use layers::{Layer, LayerId, TileLayer};
use map::{MapBackend, MapError, MountTarget, ViewOptions};
use serde::Serialize;
use tracing::warn;
use wasm_bindgen::prelude::*;

// The page provides `globalThis.fieldmapRenderer`, an adapter over the tiled
// map library. These shims only forward and turn a missing adapter into a
// thrown error.
#[wasm_bindgen(inline_js = "
function renderer() {
    const r = globalThis.fieldmapRenderer;
    if (!r) {
        throw new Error('fieldmapRenderer is not loaded');
    }
    return r;
}
export function fm_mount(target, view) { renderer().mount(target, view); }
export function fm_create_tile_layer(id, source) { renderer().createTileLayer(id, source); }
export function fm_attach_layer(id) { renderer().attachLayer(id); }
export function fm_detach_layer(id) { renderer().detachLayer(id); }
export function fm_force_redraw() { renderer().forceRedraw(); }
export function fm_get_rotation() { return renderer().getRotation(); }
export function fm_set_rotation(radians) { renderer().setRotation(radians); }
export function fm_set_center(x, y) { renderer().setCenter([x, y]); }
export function fm_set_zoom(zoom) { renderer().setZoom(zoom); }
")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn fm_mount(target: &str, view: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn fm_create_tile_layer(id: f64, source: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn fm_attach_layer(id: f64) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn fm_detach_layer(id: f64) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn fm_force_redraw() -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn fm_get_rotation() -> Result<f64, JsValue>;

    #[wasm_bindgen(catch)]
    fn fm_set_rotation(radians: f64) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn fm_set_center(x: f64, y: f64) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn fm_set_zoom(zoom: f64) -> Result<(), JsValue>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewSpec<'a> {
    center: [f64; 2],
    projection: &'a str,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceSpec<'a> {
    key: &'a str,
    url: &'a str,
    subdomains: &'a [String],
    projection: &'a str,
    tile_size: u32,
    max_zoom: u8,
}

/// [`MapBackend`] over the page's JS renderer adapter.
#[derive(Debug)]
pub struct JsRendererBackend {
    projection: Projection,
    rotation_failed: Cell<bool>,
}

impl JsRendererBackend {
    pub fn new() -> Self {
        Self {
            projection: Projection::WebMercator,
            rotation_failed: Cell::new(false),
        }
    }
}

impl Default for JsRendererBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn js_id(id: LayerId) -> f64 {
    id.0 as f64
}

fn log_failure(op: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        warn!(op, error = ?err, "renderer call failed");
    }
}

impl MapBackend for JsRendererBackend {
    fn mount(&mut self, target: &MountTarget, view: &ViewOptions) -> Result<(), MapError> {
        let spec = ViewSpec {
            center: view.center.project(view.projection),
            projection: view.projection.code(),
            zoom: view.zoom,
            min_zoom: view.zoom_bounds.min,
            max_zoom: view.zoom_bounds.max,
        };
        let spec = serde_wasm_bindgen::to_value(&spec).map_err(|e| MapError::Mount(e.to_string()))?;
        fm_mount(target.as_str(), spec).map_err(|e| MapError::Mount(format!("{e:?}")))?;
        self.projection = view.projection;
        Ok(())
    }

    fn create_tile_layer(&mut self, layer: &TileLayer) {
        let source = layer.source();
        let spec = SourceSpec {
            key: layer.key().as_str(),
            url: &source.url_template,
            subdomains: &source.subdomains,
            projection: source.projection.code(),
            tile_size: source.tile_size,
            max_zoom: source.max_zoom,
        };
        match serde_wasm_bindgen::to_value(&spec) {
            Ok(spec) => log_failure("createTileLayer", fm_create_tile_layer(js_id(layer.id()), spec)),
            Err(err) => warn!(key = %layer.key(), %err, "could not encode tile source"),
        }
    }

    fn attach_layer(&mut self, id: LayerId) {
        log_failure("attachLayer", fm_attach_layer(js_id(id)));
    }

    fn detach_layer(&mut self, id: LayerId) {
        log_failure("detachLayer", fm_detach_layer(js_id(id)));
    }

    fn force_redraw(&mut self) {
        log_failure("forceRedraw", fm_force_redraw());
    }

    fn rotation(&self) -> f64 {
        match fm_get_rotation() {
            Ok(r) => {
                self.rotation_failed.set(false);
                r
            }
            Err(err) => {
                // Polled every frame; only log the first failure of a run.
                if !self.rotation_failed.replace(true) {
                    warn!(error = ?err, "renderer rotation unavailable");
                }
                0.0
            }
        }
    }

    fn set_rotation(&mut self, radians: f64) {
        log_failure("setRotation", fm_set_rotation(radians));
    }

    fn set_center(&mut self, center: LonLat) {
        let [x, y] = center.project(self.projection);
        log_failure("setCenter", fm_set_center(x, y));
    }

    fn set_zoom(&mut self, zoom: f64) {
        log_failure("setZoom", fm_set_zoom(zoom));
    }
}
