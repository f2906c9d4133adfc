pub mod cities;
pub mod geo;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::ops::RangeInclusive;
use std::path::Path;

/// Disaster severity, ordered from mildest to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Severity::Low, Severity::Medium, Severity::High, Severity::VeryHigh];

    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::VeryHigh => "Very High",
        }
    }

    /// High and Very High rows count as "above threshold"
    pub fn above_threshold(self) -> bool {
        self >= Severity::High
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One disaster event row, tagged with the year file it came from
#[derive(Debug, Clone, PartialEq)]
pub struct DisasterRecord {
    pub city: String,
    /// "YYYY-MM"
    pub month: String,
    pub disaster: String,
    pub severity: Severity,
    pub scale: f64,
    pub value: f64,
    pub unit: String,
    pub year: i32,
    pub month_num: u8,
}

/// Format a table number the way it appears in the source CSV (no trailing ".0")
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthParseError(pub String);

impl fmt::Display for MonthParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected YYYY-MM, got {:?}", self.0)
    }
}

impl std::error::Error for MonthParseError {}

/// Split a "YYYY-MM" label into (year, month 1..=12)
pub fn parse_month(label: &str) -> Result<(i32, u8), MonthParseError> {
    let err = || MonthParseError(label.to_string());
    let (year, month) = label.split_once('-').ok_or_else(err)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(err());
    }
    let year: i32 = year.parse().map_err(|_| err())?;
    let month: u8 = month.parse().map_err(|_| err())?;
    if !(1..=12).contains(&month) {
        return Err(err());
    }
    Ok((year, month))
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Month")]
    month: String,
    #[serde(rename = "Disaster")]
    disaster: String,
    #[serde(rename = "Severity")]
    severity: Severity,
    #[serde(rename = "Scale")]
    scale: f64,
    #[serde(rename = "Value")]
    value: f64,
    #[serde(rename = "Unit")]
    unit: String,
}

/// Parse one year table. Malformed rows are skipped with a warning.
pub fn read_year<R: Read>(reader: R, year: i32) -> Result<Vec<DisasterRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();

    for (line, row) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(year, line = line + 2, "skipping malformed row: {e}");
                continue;
            }
        };
        let month_num = match parse_month(&row.month) {
            Ok((_, m)) => m,
            Err(e) => {
                tracing::warn!(year, line = line + 2, "skipping row: {e}");
                continue;
            }
        };
        records.push(DisasterRecord {
            city: row.city,
            month: row.month,
            disaster: row.disaster,
            severity: row.severity,
            scale: row.scale,
            value: row.value,
            unit: row.unit,
            year,
            month_num,
        });
    }

    Ok(records)
}

fn load_year(data_dir: &Path, year: i32) -> Result<Option<Vec<DisasterRecord>>> {
    let path = data_dir.join(format!("{year}.csv"));
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(year, "no table for year, skipping");
            return Ok(None);
        }
        Err(e) => return Err(e).with_context(|| format!("opening {}", path.display())),
    };
    let records = read_year(file, year).with_context(|| format!("reading {}", path.display()))?;
    tracing::info!(year, rows = records.len(), "loaded year table");
    Ok(Some(records))
}

/// Every loaded disaster row, across all year files
#[derive(Debug, Clone, Default)]
pub struct DisasterTable {
    records: Vec<DisasterRecord>,
}

impl DisasterTable {
    pub fn new(records: Vec<DisasterRecord>) -> Self {
        Self { records }
    }

    /// Read `<data_dir>/<year>.csv` for every year in range, skipping missing files
    pub fn load(data_dir: &Path, years: RangeInclusive<i32>) -> Result<Self> {
        let years: Vec<i32> = years.collect();
        let tables = years
            .par_iter()
            .map(|&year| load_year(data_dir, year))
            .collect::<Result<Vec<_>>>()?;

        let records: Vec<DisasterRecord> = tables.into_iter().flatten().flatten().collect();
        Ok(Self { records })
    }

    pub fn records(&self) -> &[DisasterRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Years that actually have rows, ascending
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    pub fn cities(&self) -> Vec<&str> {
        sorted_unique(self.records.iter().map(|r| r.city.as_str()))
    }

    pub fn disasters(&self) -> Vec<&str> {
        sorted_unique(self.records.iter().map(|r| r.disaster.as_str()))
    }

    /// Distinct cities with rows in `month` of the `year` table, in first-appearance order
    pub fn cities_in_month(&self, year: i32, month: &str) -> Vec<&str> {
        let mut cities: Vec<&str> = Vec::new();
        for r in self.records.iter().filter(|r| r.year == year && r.month == month) {
            if !cities.contains(&r.city.as_str()) {
                cities.push(&r.city);
            }
        }
        cities
    }

    /// Rows for one city in one month of the `year` table
    pub fn city_month_rows(&self, year: i32, month: &str, city: &str) -> Vec<&DisasterRecord> {
        self.records
            .iter()
            .filter(|r| r.year == year && r.month == month && r.city == city)
            .collect()
    }

    /// Rows shown on the map for a year, a month number and an optional city
    pub fn map_rows(&self, year: i32, month_num: u8, city: Option<&str>) -> Vec<&DisasterRecord> {
        self.records
            .iter()
            .filter(|r| r.year == year && r.month_num == month_num)
            .filter(|r| city.map_or(true, |c| r.city == c))
            .collect()
    }
}

fn sorted_unique<'a>(iter: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut items: Vec<&str> = iter.collect();
    items.sort_unstable();
    items.dedup();
    items
}

/// Pre-aggregated count of above-threshold events
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThresholdCount {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Disaster")]
    pub disaster: String,
    #[serde(rename = "Count")]
    pub count: u32,
}

/// Load `above_threshold_counts.csv` if it exists
pub fn load_threshold_counts(path: &Path) -> Result<Option<Vec<ThresholdCount>>> {
    if !path.exists() {
        return Ok(None);
    }
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let counts = rdr
        .deserialize::<ThresholdCount>()
        .filter_map(|row| match row {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::warn!("skipping threshold row: {e}");
                None
            }
        })
        .collect::<Vec<_>>();
    tracing::info!(rows = counts.len(), "loaded threshold counts");
    Ok(Some(counts))
}
