pub mod controller;
mod geometry;
mod projection;
mod renderer;

pub use controller::{CameraSource, CityFilter, CityMarker, MapFrame, MapViewState};
pub use geometry::{draw_line, draw_ring};
pub use projection::{Camera, Viewport};
pub use renderer::{Lod, MapRenderer, PlacedMarker};
