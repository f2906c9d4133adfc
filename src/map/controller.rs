//! Animated disaster map state.
//!
//! The controller owns everything the map page remembers between frames: the
//! selected year and city filter, the month the time slider shows, whether the
//! slider is auto-advancing, the blink phase of the markers and the last
//! viewport the user panned or zoomed to. The two timers that drive it (month
//! advance and blink) are independent; see [`crate::timer`].

use crate::data::cities::{self, City};
use crate::data::{format_number, DisasterTable};
use crate::map::projection::Camera;
use std::fmt;

/// Zoom level forced when the map is filtered to a single city
pub const CITY_ZOOM: f64 = 5.0;
pub const FULL_OPACITY: f32 = 1.0;
pub const DIM_OPACITY: f32 = 0.2;

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Name of a month 1..=12
pub fn month_name(month: u8) -> &'static str {
    MONTH_NAMES[(month.clamp(1, 12) - 1) as usize]
}

/// "All" or one known city
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CityFilter {
    All,
    City(&'static City),
}

impl CityFilter {
    /// Parse a dropdown value; unknown city names are rejected
    pub fn parse(value: &str) -> Option<Self> {
        if value == "All" {
            Some(CityFilter::All)
        } else {
            cities::find(value).map(CityFilter::City)
        }
    }

    pub fn city_name(&self) -> Option<&'static str> {
        match self {
            CityFilter::All => None,
            CityFilter::City(c) => Some(c.name),
        }
    }

    /// Dropdown options: "All" followed by every known city alphabetically
    pub fn options() -> Vec<CityFilter> {
        std::iter::once(CityFilter::All)
            .chain(cities::sorted().into_iter().map(CityFilter::City))
            .collect()
    }
}

impl fmt::Display for CityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CityFilter::All => f.write_str("All Cities"),
            CityFilter::City(c) => f.write_str(c.name),
        }
    }
}

/// Which rule produced the camera of a render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraSource {
    CityFocus,
    User,
    World,
}

/// Viewport precedence: a city filter beats the user's pan/zoom, which beats the world view
pub fn resolve_camera(filter: CityFilter, user: Option<Camera>) -> (Camera, CameraSource) {
    match (filter, user) {
        (CityFilter::City(city), _) => (Camera::new(city.coord, CITY_ZOOM), CameraSource::CityFocus),
        (CityFilter::All, Some(camera)) => (camera, CameraSource::User),
        (CityFilter::All, None) => (Camera::WORLD, CameraSource::World),
    }
}

/// One marker on the rendered map
#[derive(Debug, Clone, PartialEq)]
pub struct CityMarker {
    pub city: &'static City,
    /// Hover text, one line per entry, blocks separated by a rule
    pub hover: Vec<String>,
    pub records: usize,
    pub opacity: f32,
}

/// Everything the map page needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct MapFrame {
    pub year: i32,
    pub month: u8,
    pub markers: Vec<CityMarker>,
    pub camera: Camera,
    pub camera_source: CameraSource,
    pub playing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapViewState {
    pub selected_year: i32,
    pub city_filter: CityFilter,
    /// 1..=12
    pub current_month: u8,
    pub playing: bool,
    pub blink_phase: bool,
    /// Last pan/zoom the user made while the filter was "All"
    pub user_camera: Option<Camera>,
}

impl MapViewState {
    /// Fresh state for a page mount: earliest year, all cities, January, paused
    pub fn new(available_years: &[i32], fallback_year: i32) -> Self {
        let selected_year = available_years.iter().copied().min().unwrap_or(fallback_year);
        Self {
            selected_year,
            city_filter: CityFilter::All,
            current_month: 1,
            playing: false,
            blink_phase: false,
            user_camera: None,
        }
    }

    pub fn set_year(&mut self, year: i32) {
        self.selected_year = year;
    }

    pub fn set_city_filter(&mut self, filter: CityFilter) {
        tracing::debug!(filter = %filter, "map city filter changed");
        self.city_filter = filter;
    }

    /// Move the time slider directly
    pub fn set_month(&mut self, month: u8) {
        self.current_month = month.clamp(1, 12);
    }

    pub fn toggle_play(&mut self) {
        self.playing = !self.playing;
    }

    /// Advance one month, 12 wraps to 1
    pub fn on_tick(&mut self) {
        self.current_month = if self.current_month >= 12 { 1 } else { self.current_month + 1 };
    }

    pub fn on_blink_tick(&mut self) {
        self.blink_phase = !self.blink_phase;
    }

    /// Remember a user pan/zoom. Ignored while a single city is in focus.
    pub fn record_user_camera(&mut self, camera: Camera) -> bool {
        match self.city_filter {
            CityFilter::All => {
                self.user_camera = Some(camera);
                true
            }
            CityFilter::City(_) => false,
        }
    }

    pub fn opacity(&self) -> f32 {
        if self.blink_phase {
            DIM_OPACITY
        } else {
            FULL_OPACITY
        }
    }

    pub fn camera(&self) -> Camera {
        resolve_camera(self.city_filter, self.user_camera).0
    }

    pub fn play_label(&self) -> &'static str {
        if self.playing {
            "Pause"
        } else {
            "Play"
        }
    }

    /// Build the frame for the current state
    pub fn render(&self, table: &DisasterTable) -> MapFrame {
        let rows = table.map_rows(self.selected_year, self.current_month, self.city_filter.city_name());
        let opacity = self.opacity();

        let mut markers: Vec<CityMarker> = Vec::new();
        for row in rows {
            let Some(city) = cities::find(&row.city) else {
                continue;
            };
            let idx = match markers.iter().position(|m| m.city.name == city.name) {
                Some(idx) => idx,
                None => {
                    markers.push(CityMarker {
                        city,
                        hover: Vec::new(),
                        records: 0,
                        opacity,
                    });
                    markers.len() - 1
                }
            };
            let marker = &mut markers[idx];
            marker.records += 1;
            marker.hover.extend([
                format!("Disaster: {}", row.disaster),
                format!("Severity: {}", row.severity),
                format!("Scale: {}", format_number(row.scale)),
                format!("Value: {} {}", format_number(row.value), row.unit),
                "------------------------".to_string(),
            ]);
        }

        let (camera, camera_source) = resolve_camera(self.city_filter, self.user_camera);
        MapFrame {
            year: self.selected_year,
            month: self.current_month,
            markers,
            camera,
            camera_source,
            playing: self.playing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::read_year;
    use crate::geo::LatLon;

    fn table() -> DisasterTable {
        let body = "City,Month,Disaster,Severity,Scale,Value,Unit\n\
                    Tokyo,2027-03,Flood,High,7,120.5,mm\n\
                    Atlantis,2027-03,Flood,High,7,1,mm\n\
                    Tokyo,2027-03,Typhoon,Very High,9,180,km/h\n\
                    Houston,2027-04,Heatwave,Medium,5,41,C\n\
                    Paris,2027-03,Storm,Medium,4,90,km/h\n";
        DisasterTable::new(read_year(body.as_bytes(), 2027).unwrap())
    }

    fn state() -> MapViewState {
        MapViewState::new(&[2028, 2027], 2026)
    }

    #[test]
    fn test_defaults_on_mount() {
        let s = state();
        assert_eq!(s.selected_year, 2027);
        assert_eq!(s.city_filter, CityFilter::All);
        assert_eq!(s.current_month, 1);
        assert!(!s.playing);
        assert_eq!(MapViewState::new(&[], 2026).selected_year, 2026);
    }

    #[test]
    fn test_tick_wraps_december_to_january() {
        let mut s = state();
        s.set_month(12);
        s.on_tick();
        assert_eq!(s.current_month, 1);
    }

    #[test]
    fn test_twelve_ticks_return_to_start() {
        for start in 1..=12 {
            let mut s = state();
            s.set_month(start);
            let mut seen = Vec::new();
            for _ in 0..12 {
                s.on_tick();
                assert!((1..=12).contains(&s.current_month));
                seen.push(s.current_month);
            }
            assert_eq!(s.current_month, start);
            seen.sort_unstable();
            assert_eq!(seen, (1..=12).collect::<Vec<u8>>());
        }
    }

    #[test]
    fn test_toggle_play_leaves_month() {
        let mut s = state();
        s.set_month(4);
        s.toggle_play();
        assert!(s.playing);
        assert_eq!(s.current_month, 4);
        assert_eq!(s.play_label(), "Pause");
    }

    #[test]
    fn test_blink_independent_of_play() {
        let mut s = state();
        assert_eq!(s.opacity(), FULL_OPACITY);
        s.on_blink_tick();
        assert_eq!(s.opacity(), DIM_OPACITY);
        s.toggle_play();
        s.on_blink_tick();
        assert_eq!(s.opacity(), FULL_OPACITY);
        s.toggle_play();
        s.on_blink_tick();
        assert_eq!(s.opacity(), DIM_OPACITY);
        assert!(!s.playing);
    }

    #[test]
    fn test_set_year_keeps_month_and_play() {
        let mut s = state();
        s.set_month(7);
        s.toggle_play();
        s.set_year(2029);
        assert_eq!((s.selected_year, s.current_month, s.playing), (2029, 7, true));
    }

    #[test]
    fn test_city_filter_overrides_user_camera() {
        let mut s = state();
        assert!(s.record_user_camera(Camera::new(LatLon::new(10.0, 20.0), 3.0)));

        let tokyo = CityFilter::parse("Tokyo").unwrap();
        s.set_city_filter(tokyo);
        let camera = s.camera();
        assert_eq!(camera.center, LatLon::new(35.68, 139.69));
        assert_eq!(camera.zoom, CITY_ZOOM);

        // pans while focused are not kept
        assert!(!s.record_user_camera(Camera::new(LatLon::new(0.0, 0.0), 8.0)));
        assert_eq!(s.camera().zoom, CITY_ZOOM);

        s.set_city_filter(CityFilter::All);
        assert_eq!(s.camera(), Camera::new(LatLon::new(10.0, 20.0), 3.0));
    }

    #[test]
    fn test_every_city_forces_its_coordinate() {
        for filter in CityFilter::options().into_iter().skip(1) {
            let mut s = state();
            s.record_user_camera(Camera::new(LatLon::new(-40.0, 100.0), 9.0));
            s.set_city_filter(filter);
            let (camera, source) = resolve_camera(s.city_filter, s.user_camera);
            let CityFilter::City(city) = filter else { unreachable!() };
            assert_eq!(camera.center, city.coord);
            assert_eq!(camera.zoom, 5.0);
            assert_eq!(source, CameraSource::CityFocus);
        }
    }

    #[test]
    fn test_world_view_by_default() {
        let frame = state().render(&table());
        assert_eq!(frame.camera, Camera::WORLD);
        assert_eq!(frame.camera_source, CameraSource::World);
    }

    #[test]
    fn test_render_groups_rows_by_city() {
        let mut s = state();
        s.set_month(3);
        let frame = s.render(&table());

        let names: Vec<&str> = frame.markers.iter().map(|m| m.city.name).collect();
        assert_eq!(names, vec!["Tokyo", "Paris"]);
        let tokyo = &frame.markers[0];
        assert_eq!(tokyo.records, 2);
        assert!(tokyo.hover.contains(&"Disaster: Typhoon".to_string()));
        assert!(tokyo.hover.contains(&"Value: 120.5 mm".to_string()));
        assert!(tokyo.hover.contains(&"Severity: Very High".to_string()));
    }

    #[test]
    fn test_render_uses_blink_opacity() {
        let mut s = state();
        s.set_month(3);
        s.on_blink_tick();
        let frame = s.render(&table());
        assert!(frame.markers.iter().all(|m| m.opacity == DIM_OPACITY));
    }

    #[test]
    fn test_houston_empty_month_recenters_with_no_markers() {
        let mut s = state();
        s.set_year(2027);
        s.set_city_filter(CityFilter::parse("Houston").unwrap());
        s.set_month(3);
        let frame = s.render(&table());
        assert!(frame.markers.is_empty());
        assert_eq!(frame.camera.center, LatLon::new(29.76, -95.36));
        assert_eq!(frame.camera.zoom, CITY_ZOOM);

        s.on_tick();
        let frame = s.render(&table());
        assert_eq!(frame.markers.len(), 1);
        assert_eq!(frame.markers[0].city.name, "Houston");
    }

    #[test]
    fn test_unknown_city_filter_rejected() {
        assert_eq!(CityFilter::parse("All"), Some(CityFilter::All));
        assert!(CityFilter::parse("Atlantis").is_none());
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_name(1), "Jan");
        assert_eq!(month_name(12), "Dec");
    }
}
