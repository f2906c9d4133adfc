//! Criterion benchmarks for the per-frame paths.
//!
//! Run with: cargo bench --bench hot_paths

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ratatui::layout::Rect;
use weather_dash::braille::BrailleCanvas;
use weather_dash::data::cities::CITIES;
use weather_dash::data::{geo, DisasterRecord, DisasterTable, Severity};
use weather_dash::map::{Camera, MapRenderer, MapViewState, Viewport};
use weather_dash::treemap::{squarify, LayoutRect, Level, TreemapNavigator};

const DISASTERS: [&str; 6] = ["Flood", "Typhoon", "Heatwave", "Snowstorm", "Storm", "Drought"];

/// Every city reports every disaster every month of 2026
fn dense_table() -> DisasterTable {
    let mut records = Vec::new();
    for month in 1..=12u8 {
        for (c, city) in CITIES.iter().enumerate() {
            for (d, disaster) in DISASTERS.iter().enumerate() {
                records.push(DisasterRecord {
                    city: city.name.to_string(),
                    month: format!("2026-{month:02}"),
                    disaster: disaster.to_string(),
                    severity: Severity::ALL[(c + d) % 4],
                    scale: ((c + d + month as usize) % 10) as f64 + 1.0,
                    value: 10.0 * d as f64,
                    unit: "mm".to_string(),
                    year: 2026,
                    month_num: month,
                });
            }
        }
    }
    DisasterTable::new(records)
}

fn bench_squarify(c: &mut Criterion) {
    let mut group = c.benchmark_group("treemap_layout");
    let area = LayoutRect::from_rect(Rect::new(0, 0, 200, 60));
    let weights: Vec<f64> = (1..=CITIES.len()).map(|i| i as f64).collect();

    group.bench_function("squarify_31", |b| {
        b.iter(|| black_box(squarify(black_box(&weights), area)));
    });

    let table = dense_table();
    let mut nav = TreemapNavigator::new(vec!["2026".into()], &table);
    nav.click(Level::Year, "2026", &table);
    nav.click(Level::Month, "2026-06", &table);
    group.bench_function("city_figure_layout", |b| {
        b.iter(|| black_box(nav.visible_figure().layout(Rect::new(1, 2, 200, 50))));
    });

    group.bench_function("drill_down", |b| {
        b.iter(|| {
            let mut nav = TreemapNavigator::new(vec!["2026".into()], &table);
            nav.click(Level::Year, "2026", &table);
            nav.click(Level::Month, "2026-06", &table);
            nav.click(Level::City, "Tokyo", &table);
            black_box(nav.level())
        });
    });

    group.finish();
}

fn bench_map_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_frame");
    let table = dense_table();
    let mut renderer = MapRenderer::new();
    geo::generate_simple_world(&mut renderer);
    let state = MapViewState::new(&[2026], 2026);
    let frame = state.render(&table);
    let viewport = Viewport::new(Camera::WORLD, 400, 200);

    group.bench_function("controller_render", |b| {
        b.iter(|| black_box(state.render(black_box(&table))));
    });

    group.bench_function("coastlines", |b| {
        b.iter(|| {
            let mut canvas = BrailleCanvas::new(200, 50);
            renderer.render_coastlines(&mut canvas, &viewport);
            black_box(canvas)
        });
    });

    group.bench_function("markers", |b| {
        b.iter(|| {
            let mut canvas = BrailleCanvas::new(200, 50);
            black_box(renderer.render_markers(&mut canvas, &frame.markers, &viewport))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_squarify, bench_map_frame);
criterion_main!(benches);
