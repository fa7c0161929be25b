//! Criterion benchmarks for the per-frame paths.
//!
//! Benchmarks:
//!   - top/bottom rankings over ~1100 municipalities
//!   - color scale fit over the same rates
//!   - choropleth rasterization of a 40x30 grid of municipalities
//!
//! Run with: cargo bench --bench hot_paths

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::num::NonZeroUsize;

use homicide_map::data::{Dataset, GeoFeature, MunicipalRecord};
use homicide_map::map::{ChoroplethRenderer, Highlight, Viewport};
use homicide_map::stats::{ColorScale, RankingAxis, DEFAULT_GAMMA};

const MUNICIPALITIES: usize = 1_100;

/// Deterministic pseudo-random rate in [0, 120)
fn rate(i: usize) -> f64 {
    ((i * 7_919) % 12_000) as f64 / 100.0
}

fn dataset() -> Dataset {
    let records = (0..MUNICIPALITIES)
        .map(|i| {
            let population = 3_000 + (i as u64 * 3_571) % 500_000;
            let rate = rate(i);
            let homicides = (rate * population as f64 / 100_000.0) as u64;
            MunicipalRecord::new(
                &format!("Departamento {}", i % 32),
                &format!("Municipio {}", i),
                homicides,
                population,
                rate,
            )
        })
        .collect();
    Dataset::new(records).expect("non-empty")
}

fn features() -> Vec<GeoFeature> {
    let (cols, rows) = (40, 30);
    (0..cols * rows)
        .map(|i| {
            let lon = -79.0 + (i % cols) as f64 * 0.3;
            let lat = -4.0 + (i / cols) as f64 * 0.55;
            GeoFeature::new(
                Some(format!("Departamento {}", i % 32)),
                Some(format!("Municipio {}", i)),
                (i % 17 != 0).then(|| rate(i)),
                vec![vec![vec![
                    (lon, lat),
                    (lon + 0.3, lat),
                    (lon + 0.3, lat + 0.55),
                    (lon, lat + 0.55),
                    (lon, lat),
                ]]],
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Benchmark: rankings
// ---------------------------------------------------------------------------

fn bench_rankings(c: &mut Criterion) {
    let mut group = c.benchmark_group("rankings");
    let data = dataset();
    let n = NonZeroUsize::new(10).expect("non-zero");

    group.bench_function("extremes_by_count", |b| {
        b.iter(|| black_box(data.extremes(black_box(RankingAxis::Count), n)));
    });
    group.bench_function("extremes_by_rate", |b| {
        b.iter(|| black_box(data.extremes(black_box(RankingAxis::Rate), n)));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: color scale
// ---------------------------------------------------------------------------

fn bench_color_scale(c: &mut Criterion) {
    let rates: Vec<Option<f64>> = (0..MUNICIPALITIES).map(|i| Some(rate(i))).collect();

    c.bench_function("color_scale_fit", |b| {
        b.iter(|| black_box(ColorScale::fit(rates.iter().copied(), DEFAULT_GAMMA)));
    });
}

// ---------------------------------------------------------------------------
// Benchmark: choropleth rasterization
// ---------------------------------------------------------------------------

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("choropleth_render");
    let renderer = ChoroplethRenderer::new(features(), DEFAULT_GAMMA);
    let bounds = renderer.bounds().expect("features loaded");
    let highlight = Highlight {
        department: "Departamento 3",
        municipality: "Municipio 35",
    };

    let home = Viewport::fit(&bounds, 200, 160);
    group.bench_function("home_view", |b| {
        b.iter(|| black_box(renderer.render(100, 40, black_box(&home), Some(highlight))));
    });

    let mut zoomed = home.clone();
    for _ in 0..5 {
        zoomed.zoom_in();
    }
    group.bench_function("zoomed_view", |b| {
        b.iter(|| black_box(renderer.render(100, 40, black_box(&zoomed), Some(highlight))));
    });

    group.finish();
}

criterion_group!(benches, bench_rankings, bench_color_scale, bench_render);
criterion_main!(benches);
