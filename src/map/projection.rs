use crate::geo::{clamp_lat, wrap_lon, LatLon};
use std::f64::consts::PI;

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 12.0;

/// Map camera in slippy-map terms. Zoom 1 fits the whole world across the canvas,
/// each further level doubles the scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: LatLon,
    pub zoom: f64,
}

impl Camera {
    /// Whole-world view used when nothing else applies
    pub const WORLD: Camera = Camera {
        center: LatLon::new(0.0, 0.0),
        zoom: 1.0,
    };

    pub fn new(center: LatLon, zoom: f64) -> Self {
        Self { center, zoom }
    }

    /// Linear scale factor relative to the world view
    pub fn scale(&self) -> f64 {
        2f64.powf(self.zoom - 1.0)
    }
}

/// A camera bound to a canvas size, for projecting to braille pixels
#[derive(Debug, Clone)]
pub struct Viewport {
    pub camera: Camera,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

/// Web Mercator y in [0, 1] for a latitude in degrees
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = clamp_lat(lat) * PI / 180.0;
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

fn mercator_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

impl Viewport {
    pub fn new(camera: Camera, width: usize, height: usize) -> Self {
        Self { camera, width, height }
    }

    fn pixels_per_world(&self) -> f64 {
        self.camera.scale() * self.width.max(1) as f64
    }

    /// Project a geographic coordinate to pixel coordinates
    pub fn project(&self, point: LatLon) -> (i32, i32) {
        let scale = self.pixels_per_world();
        let x = mercator_x(point.lon) - mercator_x(self.camera.center.lon);
        let y = mercator_y(point.lat) - mercator_y(self.camera.center.lat);

        let px = (x * scale + self.width as f64 / 2.0).round() as i32;
        let py = (y * scale + self.height as f64 / 2.0).round() as i32;
        (px, py)
    }

    /// Unproject pixel coordinates back to a geographic coordinate
    pub fn unproject(&self, px: i32, py: i32) -> LatLon {
        let scale = self.pixels_per_world();
        let x = (px as f64 - self.width as f64 / 2.0) / scale + mercator_x(self.camera.center.lon);
        let y = (py as f64 - self.height as f64 / 2.0) / scale + mercator_y(self.camera.center.lat);

        let lon = x * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * y)).sinh().atan() * 180.0 / PI;
        LatLon::new(clamp_lat(lat), wrap_lon(lon))
    }

    /// Pan the camera by a pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let target = self.unproject(self.width as i32 / 2 + dx, self.height as i32 / 2 + dy);
        self.camera.center = target;
    }

    /// Change zoom by `levels`, keeping the point under (px, py) fixed
    pub fn zoom_at(&mut self, px: i32, py: i32, levels: f64) {
        let anchor = self.unproject(px, py);
        self.camera.zoom = (self.camera.zoom + levels).clamp(MIN_ZOOM, MAX_ZOOM);

        let (new_px, new_py) = self.project(anchor);
        self.pan(new_px - px, new_py - py);
    }

    /// Check if a projected point is near enough to the canvas to draw
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10 && px < self.width as i32 + 10 && py >= -10 && py < self.height as i32 + 10
    }

    /// Rough bounding box check for a line segment
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(Camera::WORLD, 100, 100);
        assert_eq!(vp.project(LatLon::new(0.0, 0.0)), (50, 50));
    }

    #[test]
    fn test_unproject_roundtrips_center() {
        let camera = Camera::new(LatLon::new(35.68, 139.69), 5.0);
        let vp = Viewport::new(camera, 200, 120);
        let back = vp.unproject(100, 60);
        assert!((back.lat - 35.68).abs() < 0.5);
        assert!((back.lon - 139.69).abs() < 0.5);
    }

    #[test]
    fn test_pan_moves_east() {
        let mut vp = Viewport::new(Camera::WORLD, 100, 100);
        vp.pan(10, 0);
        assert!(vp.camera.center.lon > 0.0);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut vp = Viewport::new(Camera::WORLD, 100, 100);
        vp.zoom_at(50, 50, 100.0);
        assert_eq!(vp.camera.zoom, MAX_ZOOM);
        vp.zoom_at(50, 50, -100.0);
        assert_eq!(vp.camera.zoom, MIN_ZOOM);
    }
}
