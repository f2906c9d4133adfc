use crate::charts::Figure;
use crate::data::{DisasterTable, ThresholdCount};

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub disaster: String,
    pub count: u32,
    /// Fraction of the whole, 0..=1
    pub share: f64,
}

impl PieSlice {
    /// "Flood 42.9%"
    pub fn label(&self) -> String {
        format!("{} {:.1}%", self.disaster, self.share * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

/// Where above-threshold counts come from
#[derive(Debug, Clone, Copy)]
pub enum CountSource<'a> {
    /// Pre-aggregated counts file
    Counts(&'a [ThresholdCount]),
    /// High and Very High rows of the disaster table
    Derived(&'a DisasterTable),
}

impl<'a> CountSource<'a> {
    pub fn new(table: &'a DisasterTable, counts: Option<&'a [ThresholdCount]>) -> Self {
        match counts {
            Some(counts) => CountSource::Counts(counts),
            None => CountSource::Derived(table),
        }
    }

    /// (year, city, disaster, count) for every above-threshold group
    fn entries(&self) -> Vec<(i32, &'a str, &'a str, u32)> {
        match *self {
            CountSource::Counts(counts) => counts
                .iter()
                .map(|c| (c.year, c.city.as_str(), c.disaster.as_str(), c.count))
                .collect(),
            CountSource::Derived(table) => {
                let mut entries: Vec<(i32, &'a str, &'a str, u32)> = Vec::new();
                for r in table.records().iter().filter(|r| r.severity.above_threshold()) {
                    match entries
                        .iter_mut()
                        .find(|e| e.0 == r.year && e.1 == r.city && e.2 == r.disaster)
                    {
                        Some(entry) => entry.3 += 1,
                        None => entries.push((r.year, &r.city, &r.disaster, 1)),
                    }
                }
                entries
            }
        }
    }

    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.entries().iter().map(|e| e.0).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    pub fn cities(&self) -> Vec<String> {
        let mut cities: Vec<String> = self.entries().iter().map(|e| e.1.to_string()).collect();
        cities.sort();
        cities.dedup();
        cities
    }

    pub fn disasters(&self) -> Vec<String> {
        let mut disasters: Vec<String> = self.entries().iter().map(|e| e.2.to_string()).collect();
        disasters.sort();
        disasters.dedup();
        disasters
    }
}

pub fn build(source: CountSource<'_>, city: Option<&str>, year: Option<i32>, disasters: &[String]) -> Figure<PieChart> {
    let (Some(city), Some(year)) = (city, year) else {
        return Figure::empty("No data selected");
    };
    if disasters.is_empty() {
        return Figure::empty("No data selected");
    }

    let mut slices: Vec<PieSlice> = Vec::new();
    for (_, _, disaster, count) in source
        .entries()
        .into_iter()
        .filter(|e| e.0 == year && e.1 == city && disasters.iter().any(|d| d == e.2))
    {
        match slices.iter_mut().find(|s| s.disaster == disaster) {
            Some(slice) => slice.count += count,
            None => slices.push(PieSlice {
                disaster: disaster.to_string(),
                count,
                share: 0.0,
            }),
        }
    }
    slices.retain(|s| s.count > 0);

    let total: u32 = slices.iter().map(|s| s.count).sum();
    if total == 0 {
        return Figure::empty("No data available for selection");
    }
    for slice in &mut slices {
        slice.share = slice.count as f64 / total as f64;
    }

    Figure::Ready(PieChart {
        title: format!("Weather Conditions Above Threshold for {city} in {year}"),
        slices,
    })
}

/// Slice table for the PDF export
pub fn report_lines(chart: &PieChart) -> Vec<String> {
    chart
        .slices
        .iter()
        .map(|s| format!("{} | {} events | {:.1}%", s.disaster, s.count, s.share * 100.0))
        .collect()
}
