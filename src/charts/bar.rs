use crate::charts::Figure;
use crate::data::{format_number, parse_month, DisasterRecord, DisasterTable};

/// At most this many cities are charted at once
pub const MAX_CITIES: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub disaster: String,
    /// Summed scale per month, aligned with [`BarPanel::months`]
    pub values: Vec<Option<f64>>,
}

/// One facet row of the chart
#[derive(Debug, Clone, PartialEq)]
pub struct BarPanel {
    pub city: String,
    pub months: Vec<String>,
    pub series: Vec<BarSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub year: i32,
    pub panels: Vec<BarPanel>,
    /// Highest / lowest value summary line
    pub writeup: String,
    /// The filtered rows, for the PDF report
    pub rows: Vec<DisasterRecord>,
}

/// Years that appear in any row's "YYYY-MM" label
pub fn years(table: &DisasterTable) -> Vec<i32> {
    let mut years: Vec<i32> = table
        .records()
        .iter()
        .filter_map(|r| parse_month(&r.month).ok().map(|(y, _)| y))
        .collect();
    years.sort_unstable();
    years.dedup();
    years
}

/// Rows matching the first two cities, the year and the disaster set
pub fn filter_rows<'a>(
    table: &'a DisasterTable,
    cities: &[String],
    year: i32,
    disasters: &[String],
) -> Vec<&'a DisasterRecord> {
    let cities = &cities[..cities.len().min(MAX_CITIES)];
    let prefix = format!("{year}-");
    table
        .records()
        .iter()
        .filter(|r| cities.contains(&r.city))
        .filter(|r| r.month.starts_with(&prefix))
        .filter(|r| disasters.contains(&r.disaster))
        .collect()
}

pub fn build(table: &DisasterTable, cities: &[String], year: Option<i32>, disasters: &[String]) -> Figure<BarChart> {
    let Some(year) = year else {
        return Figure::empty("No data selected");
    };
    if cities.is_empty() || disasters.is_empty() {
        return Figure::empty("No data selected");
    }

    let rows = filter_rows(table, cities, year, disasters);
    if rows.is_empty() {
        return Figure::empty("No data available");
    }

    let panels = cities
        .iter()
        .take(MAX_CITIES)
        .map(|city| build_panel(city, &rows))
        .collect();

    Figure::Ready(BarChart {
        title: format!("Weather Forecast {year} (Max 2 Cities)"),
        year,
        panels,
        writeup: writeup(&rows),
        rows: rows.into_iter().cloned().collect(),
    })
}

fn build_panel(city: &str, rows: &[&DisasterRecord]) -> BarPanel {
    let city_rows: Vec<&DisasterRecord> = rows.iter().copied().filter(|r| r.city == city).collect();

    let mut months: Vec<String> = city_rows.iter().map(|r| r.month.clone()).collect();
    months.sort();
    months.dedup();

    let mut disasters: Vec<&str> = city_rows.iter().map(|r| r.disaster.as_str()).collect();
    disasters.sort_unstable();
    disasters.dedup();

    let series = disasters
        .into_iter()
        .map(|disaster| BarSeries {
            disaster: disaster.to_string(),
            values: months
                .iter()
                .map(|m| {
                    city_rows
                        .iter()
                        .filter(|r| &r.month == m && r.disaster == disaster)
                        .map(|r| r.scale)
                        .reduce(|a, b| a + b)
                })
                .collect(),
        })
        .collect();

    BarPanel {
        city: city.to_string(),
        months,
        series,
    }
}

fn writeup(rows: &[&DisasterRecord]) -> String {
    let mut max = rows[0];
    let mut min = rows[0];
    for r in rows.iter().skip(1) {
        if r.value > max.value {
            max = r;
        }
        if r.value < min.value {
            min = r;
        }
    }
    format!(
        "Highest: {} in {} ({} {}) | Lowest: {} in {} ({} {})",
        max.disaster,
        max.city,
        format_number(max.value),
        max.unit,
        min.disaster,
        min.city,
        format_number(min.value),
        min.unit,
    )
}

/// One line per row for the PDF report
pub fn report_lines(chart: &BarChart) -> Vec<String> {
    chart
        .rows
        .iter()
        .map(|r| {
            format!(
                "{} | {} | {} | {} {} | Severity: {}",
                r.city,
                r.month,
                r.disaster,
                format_number(r.value),
                r.unit,
                r.severity
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::sample_table;

    fn s(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_selection_placeholder() {
        let table = sample_table();
        let fig = build(&table, &[], Some(2026), &s(&["Flood"]));
        assert_eq!(fig, Figure::empty("No data selected"));
        let fig = build(&table, &s(&["Tokyo"]), None, &s(&["Flood"]));
        assert_eq!(fig, Figure::empty("No data selected"));
    }

    #[test]
    fn test_no_rows_placeholder() {
        let fig = build(&sample_table(), &s(&["Tokyo"]), Some(2030), &s(&["Flood"]));
        assert_eq!(fig, Figure::empty("No data available"));
    }

    #[test]
    fn test_only_first_two_cities_used() {
        let table = sample_table();
        let rows = filter_rows(&table, &s(&["Houston", "Paris", "Tokyo"]), 2026, &s(&["Flood", "Heatwave", "Storm", "Typhoon"]));
        assert!(rows.iter().all(|r| r.city != "Tokyo"));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_build_panels_and_writeup() {
        let table = sample_table();
        let disasters = s(&["Flood", "Typhoon", "Snowstorm", "Heatwave"]);
        let fig = build(&table, &s(&["Tokyo", "Houston"]), Some(2026), &disasters);
        let chart = fig.ready().unwrap();

        assert_eq!(chart.title, "Weather Forecast 2026 (Max 2 Cities)");
        assert_eq!(chart.panels.len(), 2);
        let tokyo = &chart.panels[0];
        assert_eq!(tokyo.months, s(&["2026-02", "2026-03"]));
        let flood = tokyo.series.iter().find(|s| s.disaster == "Flood").unwrap();
        assert_eq!(flood.values, vec![Some(7.0), None]);

        assert_eq!(
            chart.writeup,
            "Highest: Typhoon in Tokyo (180 km/h) | Lowest: Snowstorm in Tokyo (15 cm)"
        );
        assert_eq!(report_lines(chart).len(), 4);
        assert_eq!(report_lines(chart)[0], "Tokyo | 2026-02 | Flood | 120.5 mm | Severity: High");
    }

    #[test]
    fn test_years_from_month_labels() {
        assert_eq!(years(&sample_table()), vec![2026]);
    }
}
