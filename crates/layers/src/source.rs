use foundation::Projection;

/// Everything a renderer needs to build a tile source.
///
/// Building one is pure: no tiles are fetched until a renderer attaches the
/// layer and starts drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSource {
    /// XYZ template with `{x}`, `{y}`, `{z}` and an optional `{s}` subdomain slot.
    pub url_template: String,
    /// Values substituted for `{s}`, picked round-robin by tile.
    pub subdomains: Vec<String>,
    pub projection: Projection,
    pub tile_size: u32,
    pub max_zoom: u8,
}

impl TileSource {
    pub fn xyz(url_template: impl Into<String>, projection: Projection) -> Self {
        Self {
            url_template: url_template.into(),
            subdomains: Vec::new(),
            projection,
            tile_size: 256,
            max_zoom: 18,
        }
    }

    pub fn with_subdomains<I, S>(mut self, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdomains = subdomains.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_zoom(mut self, max_zoom: u8) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    /// Expand the template for one tile.
    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        let mut url = self
            .url_template
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string());
        if !self.subdomains.is_empty() {
            let idx = (x as usize + y as usize) % self.subdomains.len();
            url = url.replace("{s}", &self.subdomains[idx]);
        }
        url
    }
}
