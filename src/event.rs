use crate::map::{Camera, CityFilter};
use crate::routes::Route;
use crate::treemap::Level;

/// Output files the export keys can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Text snapshot of the current page
    Snapshot,
    /// PDF report (bar and pie pages)
    Pdf,
}

/// Everything that can change dashboard state. [`crate::app::App::dispatch`] is the only consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum DashEvent {
    Navigate(Route),
    Signup { email: String, password: String },
    Login { email: String, password: String },
    /// Treemap clicks, tagged with the chart they came from
    ClickYear(String),
    ClickMonth(String),
    ClickCity(String),
    ClickDisaster(String),
    /// Month-advance timer
    Tick,
    /// Marker blink timer
    BlinkTick,
    TogglePlay,
    SetMapYear(i32),
    SetCityFilter(CityFilter),
    SetMonth(u8),
    /// Pan or zoom made by the user on the map
    UserCamera(Camera),
    Export(ExportKind),
    Quit,
}

impl DashEvent {
    /// Treemap click coming from the chart of `level`
    pub fn treemap_click(level: Level, label: impl Into<String>) -> Self {
        let label = label.into();
        match level {
            Level::Year => DashEvent::ClickYear(label),
            Level::Month => DashEvent::ClickMonth(label),
            Level::City => DashEvent::ClickCity(label),
            Level::Disaster => DashEvent::ClickDisaster(label),
        }
    }

    /// Trigger chart and label of a treemap click
    pub fn as_treemap_click(&self) -> Option<(Level, &str)> {
        match self {
            DashEvent::ClickYear(l) => Some((Level::Year, l)),
            DashEvent::ClickMonth(l) => Some((Level::Month, l)),
            DashEvent::ClickCity(l) => Some((Level::City, l)),
            DashEvent::ClickDisaster(l) => Some((Level::Disaster, l)),
            _ => None,
        }
    }
}
