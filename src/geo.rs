/// A geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Wrap longitude back into [-180, 180)
#[inline(always)]
pub fn wrap_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Clamp latitude to the range Web Mercator can represent
#[inline(always)]
pub fn clamp_lat(lat: f64) -> f64 {
    lat.clamp(-85.0, 85.0)
}
