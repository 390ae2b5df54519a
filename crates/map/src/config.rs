use foundation::{LonLat, Projection, ZoomBounds};
use serde::{Deserialize, Serialize};

use crate::backend::ViewOptions;
use crate::error::MapError;

/// Map runtime configuration, supplied by the host when the page loads.
///
/// Every field has a default, so the host only sends what it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapConfig {
    /// Initial view center as `[lon, lat]`.
    pub center: [f64; 2],
    pub projection: String,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Access token for the built-in Tianditu layers.
    pub tianditu_token: String,
    /// `error`, `warn`, `info`, `debug`, `trace` or `off`.
    pub log_level: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: [116.391, 39.907],
            projection: Projection::WebMercator.code().to_string(),
            zoom: 12.0,
            min_zoom: 2.0,
            max_zoom: 18.0,
            tianditu_token: String::new(),
            log_level: "info".to_string(),
        }
    }
}

impl MapConfig {
    pub fn from_json(text: &str) -> Result<Self, MapError> {
        let config: MapConfig =
            serde_json::from_str(text).map_err(|e| MapError::Config(e.to_string()))?;
        config.view_options()?;
        Ok(config)
    }

    /// Validate and convert into the initial view.
    pub fn view_options(&self) -> Result<ViewOptions, MapError> {
        let center = LonLat::from(self.center);
        if !center.is_valid() {
            return Err(MapError::Config(format!(
                "center out of range: {:?}",
                self.center
            )));
        }
        let projection: Projection = self
            .projection
            .parse()
            .map_err(|e: foundation::UnknownProjection| MapError::Config(e.to_string()))?;
        let zoom_bounds = ZoomBounds::new(self.min_zoom, self.max_zoom).ok_or_else(|| {
            MapError::Config(format!(
                "bad zoom bounds: min={} max={}",
                self.min_zoom, self.max_zoom
            ))
        })?;
        if !zoom_bounds.contains(self.zoom) {
            return Err(MapError::Config(format!(
                "zoom {} outside [{}, {}]",
                self.zoom, self.min_zoom, self.max_zoom
            )));
        }
        Ok(ViewOptions {
            center,
            projection,
            zoom: self.zoom,
            zoom_bounds,
        })
    }
}
