use crate::charts::Figure;
use crate::data::{DisasterRecord, DisasterTable, Severity};
use glam::{DMat3, DVec3};

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    /// Index into `x_labels`
    pub x: usize,
    /// Index into `y_labels`
    pub y: usize,
    pub z: f64,
    pub severity: Severity,
}

/// Categorical x/y, numeric z, points coloured by severity
#[derive(Debug, Clone, PartialEq)]
pub struct Scatter3d {
    pub title: String,
    pub x_axis: &'static str,
    pub y_axis: &'static str,
    pub z_axis: &'static str,
    pub x_labels: Vec<String>,
    pub y_labels: Vec<String>,
    pub z_range: (f64, f64),
    pub points: Vec<ScatterPoint>,
}

/// Value of each selected city over time for one disaster type
pub fn by_cities(table: &DisasterTable, cities: &[String], disaster: Option<&str>) -> Figure<Scatter3d> {
    let Some(disaster) = disaster else {
        return Figure::empty("No data selected");
    };
    let rows: Vec<&DisasterRecord> = table
        .records()
        .iter()
        .filter(|r| r.disaster == disaster && cities.contains(&r.city))
        .collect();
    build(
        format!("3D Surface: {disaster} by City"),
        ("Month", "City", "Value"),
        &rows,
        |r| r.city.clone(),
        |r| r.value,
    )
}

/// Scale of every disaster type over time for one city
pub fn by_disaster(table: &DisasterTable, city: Option<&str>) -> Figure<Scatter3d> {
    let Some(city) = city else {
        return Figure::empty("No data selected");
    };
    let rows: Vec<&DisasterRecord> = table.records().iter().filter(|r| r.city == city).collect();
    build(
        format!("3D Subplot: Weather Scaling for {city}"),
        ("Month", "Disaster", "Scale"),
        &rows,
        |r| r.disaster.clone(),
        |r| r.scale,
    )
}

fn build(
    title: String,
    axes: (&'static str, &'static str, &'static str),
    rows: &[&DisasterRecord],
    y_of: impl Fn(&DisasterRecord) -> String,
    z_of: impl Fn(&DisasterRecord) -> f64,
) -> Figure<Scatter3d> {
    if rows.is_empty() {
        return Figure::empty("No data available");
    }

    let mut x_labels: Vec<String> = rows.iter().map(|r| r.month.clone()).collect();
    x_labels.sort();
    x_labels.dedup();
    let mut y_labels: Vec<String> = Vec::new();
    for r in rows {
        let y = y_of(r);
        if !y_labels.contains(&y) {
            y_labels.push(y);
        }
    }

    let mut z_range = (f64::INFINITY, f64::NEG_INFINITY);
    let points = rows
        .iter()
        .map(|r| {
            let z = z_of(r);
            z_range = (z_range.0.min(z), z_range.1.max(z));
            let y = y_of(r);
            ScatterPoint {
                x: x_labels.iter().position(|m| *m == r.month).unwrap_or(0),
                y: y_labels.iter().position(|l| *l == y).unwrap_or(0),
                z,
                severity: r.severity,
            }
        })
        .collect();

    Figure::Ready(Scatter3d {
        title,
        x_axis: axes.0,
        y_axis: axes.1,
        z_axis: axes.2,
        x_labels,
        y_labels,
        z_range,
        points,
    })
}

/// Camera orbit around the unit cube the scatter is normalised into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub yaw: f64,
    pub pitch: f64,
}

impl Default for Orbit {
    fn default() -> Self {
        Self {
            yaw: -0.6,
            pitch: 0.45,
        }
    }
}

impl Orbit {
    pub fn rotate(&mut self, d_yaw: f64, d_pitch: f64) {
        self.yaw = (self.yaw + d_yaw).rem_euclid(std::f64::consts::TAU);
        self.pitch = (self.pitch + d_pitch).clamp(-1.4, 1.4);
    }

    fn matrix(&self) -> DMat3 {
        DMat3::from_rotation_x(self.pitch) * DMat3::from_rotation_z(self.yaw)
    }

    /// Orthographic projection of a cube-space point to canvas pixels, plus depth (larger is nearer)
    pub fn project(&self, p: DVec3, width: usize, height: usize) -> (i32, i32, f64) {
        let r = self.matrix() * p;
        let s = width.min(height * 2) as f64 * 0.3;
        let px = width as f64 / 2.0 + r.x * s;
        let py = height as f64 / 2.0 - r.z * s * 0.5;
        (px.round() as i32, py.round() as i32, -r.y)
    }
}

impl Scatter3d {
    /// Map a point into the [-1, 1] cube
    pub fn cube_position(&self, p: &ScatterPoint) -> DVec3 {
        let norm = |i: usize, n: usize| if n <= 1 { 0.0 } else { i as f64 / (n - 1) as f64 * 2.0 - 1.0 };
        let (lo, hi) = self.z_range;
        let z = if hi > lo { (p.z - lo) / (hi - lo) * 2.0 - 1.0 } else { 0.0 };
        DVec3::new(norm(p.x, self.x_labels.len()), norm(p.y, self.y_labels.len()), z)
    }
}

/// Cube-space endpoints of the three axes, starting at the shared origin corner
pub const AXES: [(DVec3, DVec3); 3] = [
    (DVec3::new(-1.0, -1.0, -1.0), DVec3::new(1.0, -1.0, -1.0)),
    (DVec3::new(-1.0, -1.0, -1.0), DVec3::new(-1.0, 1.0, -1.0)),
    (DVec3::new(-1.0, -1.0, -1.0), DVec3::new(-1.0, -1.0, 1.0)),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::sample_table;

    #[test]
    fn test_by_cities_axes() {
        let table = sample_table();
        let fig = by_cities(&table, &["Tokyo".into(), "Houston".into()], Some("Flood"));
        let chart = fig.ready().unwrap();
        assert_eq!(chart.title, "3D Surface: Flood by City");
        assert_eq!(chart.y_labels, vec!["Tokyo".to_string()]);
        assert_eq!(chart.points.len(), 1);
        assert_eq!(chart.z_range, (120.5, 120.5));
    }

    #[test]
    fn test_by_disaster_uses_scale() {
        let fig = by_disaster(&sample_table(), Some("Tokyo"));
        let chart = fig.ready().unwrap();
        assert_eq!(chart.x_labels, vec!["2026-02".to_string(), "2026-03".to_string()]);
        assert_eq!(chart.y_labels.len(), 3);
        assert_eq!(chart.z_range, (2.0, 9.0));
        assert_eq!(chart.z_axis, "Scale");
    }

    #[test]
    fn test_empty_selection() {
        let table = sample_table();
        assert_eq!(by_cities(&table, &[], Some("Flood")), Figure::empty("No data available"));
        assert_eq!(by_disaster(&table, None), Figure::empty("No data selected"));
    }

    #[test]
    fn test_cube_position_bounds() {
        let fig = by_disaster(&sample_table(), Some("Tokyo"));
        let chart = fig.ready().unwrap();
        for p in &chart.points {
            let v = chart.cube_position(p);
            assert!(v.abs().max_element() <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn test_origin_projects_to_center() {
        let orbit = Orbit::default();
        let (px, py, _) = orbit.project(DVec3::ZERO, 100, 50);
        assert_eq!((px, py), (50, 25));
    }

    #[test]
    fn test_pitch_clamped() {
        let mut orbit = Orbit::default();
        orbit.rotate(0.0, 10.0);
        assert_eq!(orbit.pitch, 1.4);
    }
}
