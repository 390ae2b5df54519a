use std::fmt;
use std::str::FromStr;

/// WGS84 semi-major axis (meters), also the Web Mercator sphere radius.
pub const WGS84_A: f64 = 6_378_137.0;

/// Latitude limit of the Web Mercator square.
pub const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }

    /// Project into the coordinate space of `projection`.
    ///
    /// Latitudes beyond the Web Mercator limit are clamped before projecting.
    pub fn project(&self, projection: Projection) -> [f64; 2] {
        match projection {
            Projection::Wgs84 => [self.lon, self.lat],
            Projection::WebMercator => {
                let lat = self
                    .lat
                    .clamp(-WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_MAX_LAT)
                    .to_radians();
                let x = WGS84_A * self.lon.to_radians();
                let y = WGS84_A * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();
                [x, y]
            }
        }
    }
}

impl From<[f64; 2]> for LonLat {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<LonLat> for [f64; 2] {
    fn from(v: LonLat) -> Self {
        [v.lon, v.lat]
    }
}

/// Map projections the runtime knows how to describe to a renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Projection {
    /// EPSG:4326
    Wgs84,
    /// EPSG:3857
    WebMercator,
}

impl Projection {
    pub fn code(&self) -> &'static str {
        match self {
            Projection::Wgs84 => "EPSG:4326",
            Projection::WebMercator => "EPSG:3857",
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProjection(pub String);

impl fmt::Display for UnknownProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown projection: {}", self.0)
    }
}

impl std::error::Error for UnknownProjection {}

impl FromStr for Projection {
    type Err = UnknownProjection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EPSG:4326" | "WGS84" => Ok(Projection::Wgs84),
            "EPSG:3857" | "EPSG:900913" | "WEBMERCATOR" => Ok(Projection::WebMercator),
            _ => Err(UnknownProjection(s.to_string())),
        }
    }
}
