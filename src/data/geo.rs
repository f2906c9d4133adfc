use crate::map::{Lod, MapRenderer};
use anyhow::{Context, Result};
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;

/// Load whichever Natural Earth coastline files exist in `geo_dir`
pub fn load_coastlines(renderer: &mut MapRenderer, geo_dir: &Path) -> Result<()> {
    let coastline_files = [
        ("ne_110m_coastline.json", Lod::Low),
        ("ne_50m_coastline.json", Lod::Medium),
    ];

    for (filename, lod) in coastline_files {
        let path = geo_dir.join(filename);
        if !path.exists() {
            continue;
        }
        match read_geojson(&path) {
            Ok(geojson) => {
                let mut count = 0usize;
                process_geojson_lines(&geojson, |line| {
                    renderer.add_coastline(line, lod);
                    count += 1;
                });
                tracing::info!(file = filename, lines = count, "loaded coastlines");
            }
            Err(e) => tracing::warn!(file = filename, "failed to load coastlines: {e:#}"),
        }
    }

    Ok(())
}

fn read_geojson(path: &Path) -> Result<GeoJson> {
    let mut bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let geojson = simd_json::serde::from_slice::<GeoJson>(&mut bytes)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(geojson)
}

/// Walk any GeoJSON value and hand every line or ring exterior to `add_line`
fn process_geojson_lines<F>(geojson: &GeoJson, mut add_line: F)
where
    F: FnMut(Vec<(f64, f64)>),
{
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    process_geometry_lines(geometry, &mut add_line);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                process_geometry_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Geometry(geometry) => process_geometry_lines(geometry, &mut add_line),
    }
}

fn process_geometry_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(Vec<(f64, f64)>),
{
    let to_line = |coords: &Vec<Vec<f64>>| -> Vec<(f64, f64)> {
        coords.iter().filter(|c| c.len() >= 2).map(|c| (c[0], c[1])).collect()
    };

    match &geometry.value {
        Value::LineString(coords) => add_line(to_line(coords)),
        Value::MultiLineString(lines) => lines.iter().for_each(|l| add_line(to_line(l))),
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                add_line(to_line(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                if let Some(exterior) = rings.first() {
                    add_line(to_line(exterior));
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                process_geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}

/// Rough continent outlines so the disaster map has a backdrop without data files
pub fn generate_simple_world(renderer: &mut MapRenderer) {
    let outlines: [&[(f64, f64)]; 7] = [
        // North America
        &[
            (-168.0, 65.0), (-166.0, 60.0), (-141.0, 60.0), (-130.0, 55.0),
            (-125.0, 48.0), (-124.0, 40.0), (-117.0, 32.0), (-110.0, 25.0),
            (-97.0, 25.0), (-97.0, 28.0), (-82.0, 24.0), (-80.0, 25.0),
            (-81.0, 31.0), (-75.0, 35.0), (-70.0, 41.0), (-67.0, 45.0),
            (-55.0, 47.0), (-58.0, 55.0), (-64.0, 60.0), (-80.0, 63.0),
            (-95.0, 62.0), (-110.0, 68.0), (-145.0, 70.0), (-168.0, 65.0),
        ],
        // South America
        &[
            (-80.0, 10.0), (-70.0, 5.0), (-50.0, 0.0), (-35.0, -5.0),
            (-40.0, -22.0), (-55.0, -34.0), (-65.0, -42.0), (-68.0, -50.0),
            (-75.0, -52.0), (-72.0, -40.0), (-70.0, -20.0), (-80.0, -5.0),
            (-80.0, 10.0),
        ],
        // Europe
        &[
            (-10.0, 36.0), (0.0, 38.0), (5.0, 43.0), (15.0, 45.0),
            (20.0, 40.0), (30.0, 40.0), (40.0, 43.0), (40.0, 55.0),
            (30.0, 60.0), (20.0, 70.0), (10.0, 71.0), (5.0, 58.0),
            (-5.0, 58.0), (-10.0, 52.0), (-5.0, 43.0), (-10.0, 36.0),
        ],
        // Southern Africa
        &[
            (-17.0, 15.0), (-10.0, 5.0), (10.0, 5.0), (20.0, -5.0),
            (35.0, -20.0), (30.0, -30.0), (18.0, -35.0), (10.0, -15.0),
            (10.0, 0.0), (-10.0, 10.0), (-17.0, 15.0),
        ],
        // Northern Africa
        &[
            (-17.0, 15.0), (-15.0, 28.0), (-5.0, 35.0), (10.0, 37.0),
            (25.0, 32.0), (35.0, 30.0), (42.0, 12.0), (50.0, 12.0),
            (35.0, -5.0), (35.0, -20.0),
        ],
        // Asia
        &[
            (35.0, 42.0), (50.0, 40.0), (60.0, 25.0), (70.0, 20.0),
            (80.0, 8.0), (88.0, 22.0), (100.0, 14.0), (105.0, 10.0),
            (110.0, 20.0), (122.0, 25.0), (130.0, 35.0), (140.0, 40.0),
            (145.0, 50.0), (135.0, 55.0), (130.0, 43.0), (120.0, 40.0),
            (90.0, 50.0), (60.0, 55.0), (35.0, 42.0),
        ],
        // Australia
        &[
            (115.0, -20.0), (130.0, -12.0), (145.0, -15.0), (153.0, -30.0),
            (145.0, -38.0), (135.0, -35.0), (115.0, -35.0), (115.0, -20.0),
        ],
    ];

    for outline in outlines {
        renderer.add_coastline(outline.to_vec(), Lod::Low);
    }
}
