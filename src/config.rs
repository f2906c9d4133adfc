use crate::routes::Route;
use anyhow::{bail, Result};
use clap::Parser;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Terminal weather and disaster dashboard")]
pub struct Args {
    /// Directory holding `<year>.csv` tables and `above_threshold_counts.csv`
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory holding Natural Earth coastline GeoJSON
    #[arg(long, default_value = "data")]
    pub geo_dir: PathBuf,

    /// Where snapshots and PDF reports are written
    #[arg(long, default_value = "exports")]
    pub export_dir: PathBuf,

    #[arg(long, default_value_t = 2026)]
    pub first_year: i32,

    #[arg(long, default_value_t = 2030)]
    pub last_year: i32,

    /// Month-advance period while the map is playing
    #[arg(long, default_value_t = 1000)]
    pub tick_ms: u64,

    /// Marker blink period
    #[arg(long, default_value_t = 500)]
    pub blink_ms: u64,

    /// Write logs here; stdout belongs to the terminal UI
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Page to open after login, e.g. `/treemaps`
    #[arg(long, default_value = "/home")]
    pub start_page: String,
}

impl Args {
    /// Fails when `--first-year` comes after `--last-year`
    pub fn years(&self) -> Result<RangeInclusive<i32>> {
        if self.first_year > self.last_year {
            bail!(
                "--first-year {} is after --last-year {}",
                self.first_year,
                self.last_year
            );
        }
        Ok(self.first_year..=self.last_year)
    }

    pub fn settings(&self) -> Result<Settings> {
        Ok(Settings {
            years: self.years()?.collect(),
            export_dir: self.export_dir.clone(),
            tick: Duration::from_millis(self.tick_ms.max(1)),
            blink: Duration::from_millis(self.blink_ms.max(1)),
            start_page: match Route::parse(&self.start_page) {
                Route::Logout => Route::Home,
                route => route,
            },
        })
    }
}

/// Runtime settings the app needs after startup
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Configured year tokens, ascending
    pub years: Vec<i32>,
    pub export_dir: PathBuf,
    pub tick: Duration,
    pub blink: Duration,
    pub start_page: Route,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            years: (2026..=2030).collect(),
            export_dir: PathBuf::from("exports"),
            tick: Duration::from_millis(1000),
            blink: Duration::from_millis(500),
            start_page: Route::Home,
        }
    }
}
