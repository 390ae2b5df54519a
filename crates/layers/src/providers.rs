use foundation::Projection;
use tracing::warn;

use crate::key::LayerKey;
use crate::source::TileSource;

const TIANDITU_SUBDOMAINS: [&str; 8] = ["t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7"];

/// The reserved tile providers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuiltinLayer {
    /// Tianditu imagery.
    TdSatellite,
    /// Place-name annotation drawn over imagery.
    TdSatelliteLabel,
    /// Tianditu street map.
    TdVector,
    /// Place-name annotation drawn over the street map.
    TdVectorLabel,
}

impl BuiltinLayer {
    pub const ALL: [BuiltinLayer; 4] = [
        BuiltinLayer::TdSatellite,
        BuiltinLayer::TdSatelliteLabel,
        BuiltinLayer::TdVector,
        BuiltinLayer::TdVectorLabel,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinLayer::TdSatellite => "tdSatellite",
            BuiltinLayer::TdSatelliteLabel => "tdSatelliteLabel",
            BuiltinLayer::TdVector => "tdVector",
            BuiltinLayer::TdVectorLabel => "tdVectorLabel",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    fn tianditu_layer(&self) -> &'static str {
        match self {
            BuiltinLayer::TdSatellite => "img_w",
            BuiltinLayer::TdSatelliteLabel => "cia_w",
            BuiltinLayer::TdVector => "vec_w",
            BuiltinLayer::TdVectorLabel => "cva_w",
        }
    }

    pub fn source(&self, token: &str) -> TileSource {
        let url = format!(
            "https://{{s}}.tianditu.gov.cn/DataServer?T={}&x={{x}}&y={{y}}&l={{z}}&tk={}",
            self.tianditu_layer(),
            token
        );
        TileSource::xyz(url, Projection::WebMercator)
            .with_subdomains(TIANDITU_SUBDOMAINS)
            .with_max_zoom(18)
    }
}

/// Builds tile source descriptors for layer keys.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    token: String,
}

impl ProviderRegistry {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn source_for(&self, key: &LayerKey) -> TileSource {
        match key {
            LayerKey::Builtin(builtin) => {
                if self.token.is_empty() {
                    warn!(layer = builtin.name(), "no provider token configured; tiles will be rejected");
                }
                builtin.source(&self.token)
            }
            LayerKey::Custom(url) => TileSource::xyz(url.clone(), Projection::WebMercator),
        }
    }
}
