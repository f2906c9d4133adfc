//! Stateless filter -> figure transforms for the bar, pie and 3D pages.

pub mod bar;
pub mod pie;
pub mod scatter3d;

use crate::data::Severity;
use ratatui::style::Color;

/// A chart, or the titled placeholder shown when the filter selects nothing
#[derive(Debug, Clone, PartialEq)]
pub enum Figure<T> {
    Empty { title: String },
    Ready(T),
}

impl<T> Figure<T> {
    pub fn empty(title: impl Into<String>) -> Self {
        Figure::Empty { title: title.into() }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Figure::Ready(chart) => Some(chart),
            Figure::Empty { .. } => None,
        }
    }
}

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Low => Color::Green,
        Severity::Medium => Color::Magenta,
        Severity::High => Color::Rgb(255, 165, 0),
        Severity::VeryHigh => Color::Blue,
    }
}

const SERIES_COLORS: [Color; 8] = [
    Color::Cyan,
    Color::Yellow,
    Color::LightRed,
    Color::LightGreen,
    Color::LightMagenta,
    Color::LightBlue,
    Color::White,
    Color::Red,
];

/// Stable colour for the n-th series of a chart
pub fn series_color(n: usize) -> Color {
    SERIES_COLORS[n % SERIES_COLORS.len()]
}
