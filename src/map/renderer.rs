use crate::braille::BrailleCanvas;
use crate::map::controller::CityMarker;
use crate::map::geometry::{draw_line, draw_ring};
use crate::map::projection::Viewport;

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Level of detail for coastline data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lod {
    Low,    // 110m - world view
    Medium, // 50m - regional
}

impl Lod {
    /// Select LOD based on camera zoom level
    pub fn from_zoom(zoom: f64) -> Self {
        if zoom < 3.0 {
            Lod::Low
        } else {
            Lod::Medium
        }
    }
}

/// A marker projected to terminal cells
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    /// Index into the frame's marker list
    pub index: usize,
    pub col: u16,
    pub row: u16,
}

/// Coastline backdrop and marker placement for the disaster map
pub struct MapRenderer {
    coastlines_low: Vec<LineString>,
    coastlines_medium: Vec<LineString>,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self {
            coastlines_low: Vec::new(),
            coastlines_medium: Vec::new(),
        }
    }

    /// Coastlines for the LOD, falling back to the coarser set
    fn coastlines(&self, lod: Lod) -> &[LineString] {
        match lod {
            Lod::Medium if !self.coastlines_medium.is_empty() => &self.coastlines_medium,
            _ => &self.coastlines_low,
        }
    }

    /// Draw the coastline layer
    pub fn render_coastlines(&self, canvas: &mut BrailleCanvas, viewport: &Viewport) {
        for line in self.coastlines(Lod::from_zoom(viewport.camera.zoom)) {
            draw_linestring(canvas, line, viewport);
        }
    }

    /// Draw a halo around every marker at full opacity, return cell positions for glyphs
    pub fn render_markers(
        &self,
        canvas: &mut BrailleCanvas,
        markers: &[CityMarker],
        viewport: &Viewport,
    ) -> Vec<PlacedMarker> {
        let mut placed = Vec::with_capacity(markers.len());
        for (index, marker) in markers.iter().enumerate() {
            let (px, py) = viewport.project(marker.city.coord);
            if px < 0 || py < 0 || !viewport.is_visible(px, py) {
                continue;
            }
            if marker.opacity >= 1.0 {
                draw_ring(canvas, px, py, 4);
            }
            let (col, row) = ((px / 2) as u16, (py / 4) as u16);
            if (col as usize) < canvas.width() && (row as usize) < canvas.height() {
                placed.push(PlacedMarker { index, col, row });
            }
        }
        placed
    }

    /// Add coastline data at a specific LOD
    pub fn add_coastline(&mut self, line: LineString, lod: Lod) {
        match lod {
            Lod::Low => self.coastlines_low.push(line),
            Lod::Medium => self.coastlines_medium.push(line),
        }
    }

    /// Check if any coastline data is loaded
    pub fn has_data(&self) -> bool {
        !self.coastlines_low.is_empty() || !self.coastlines_medium.is_empty()
    }
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw a linestring with viewport culling
fn draw_linestring(canvas: &mut BrailleCanvas, line: &LineString, viewport: &Viewport) {
    let mut prev: Option<(i32, i32)> = None;

    for &(lon, lat) in line {
        let (px, py) = viewport.project(crate::geo::LatLon::new(lat, lon));

        if let Some((prev_x, prev_y)) = prev {
            // Long jumps are antimeridian wraps, not real segments
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                draw_line(canvas, prev_x, prev_y, px, py);
            }
        }

        prev = Some((px, py));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cities;
    use crate::map::controller::FULL_OPACITY;
    use crate::map::projection::Camera;

    fn marker(name: &str) -> CityMarker {
        CityMarker {
            city: cities::find(name).unwrap(),
            hover: Vec::new(),
            records: 1,
            opacity: FULL_OPACITY,
        }
    }

    #[test]
    fn test_lod_from_zoom() {
        assert_eq!(Lod::from_zoom(1.0), Lod::Low);
        assert_eq!(Lod::from_zoom(5.0), Lod::Medium);
    }

    #[test]
    fn test_medium_falls_back_to_low() {
        let mut renderer = MapRenderer::new();
        renderer.add_coastline(vec![(0.0, 0.0), (10.0, 10.0)], Lod::Low);
        assert_eq!(renderer.coastlines(Lod::Medium).len(), 1);
    }

    #[test]
    fn test_focused_city_lands_in_canvas_center() {
        let renderer = MapRenderer::new();
        let mut canvas = BrailleCanvas::new(40, 20);
        let tokyo = cities::find("Tokyo").unwrap();
        let viewport = Viewport::new(Camera::new(tokyo.coord, 5.0), 80, 80);

        let placed = renderer.render_markers(&mut canvas, &[marker("Tokyo")], &viewport);
        assert_eq!(placed, vec![PlacedMarker { index: 0, col: 20, row: 10 }]);
        assert!(canvas.glyphs().count() > 0);
    }

    #[test]
    fn test_offscreen_markers_dropped() {
        let renderer = MapRenderer::new();
        let mut canvas = BrailleCanvas::new(40, 20);
        let tokyo = cities::find("Tokyo").unwrap();
        let viewport = Viewport::new(Camera::new(tokyo.coord, 8.0), 80, 80);

        let placed = renderer.render_markers(&mut canvas, &[marker("London")], &viewport);
        assert!(placed.is_empty());
    }
}
