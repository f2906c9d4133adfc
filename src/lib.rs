//! Terminal weather and disaster dashboard.
//!
//! Disaster records are loaded from yearly CSV files and explored through a
//! drill-down treemap, an animated braille world map and filterable charts.

pub mod app;
pub mod auth;
pub mod braille;
pub mod charts;
pub mod config;
pub mod controls;
pub mod data;
pub mod event;
pub mod export;
pub mod geo;
pub mod logging;
pub mod map;
pub mod routes;
pub mod timer;
pub mod treemap;
pub mod ui;
