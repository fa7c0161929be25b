//! End-to-end checks over the bundled sample data in `data/`.

use homicide_map::config::AppConfig;
use homicide_map::dashboard::{render_report, DashboardView};
use homicide_map::data::{load_dataset, load_features, Dataset, PropertyNames};
use homicide_map::map::{ChoroplethRenderer, Viewport};
use homicide_map::stats::{round2, RankingAxis, Selection, DEFAULT_GAMMA};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

fn sample(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn dataset() -> Dataset {
    load_dataset(&sample("homicidios_2024.csv")).unwrap()
}

fn n(value: usize) -> NonZeroUsize {
    NonZeroUsize::new(value).unwrap()
}

#[test]
fn loads_every_record() {
    let data = dataset();
    assert_eq!(data.records().len(), 17);
    assert_eq!(
        data.list_departments(),
        vec!["Antioquia", "Bogotá D.C.", "Boyacá", "Cauca", "Valle del Cauca"]
    );
}

#[test]
fn rankings_over_sample() {
    let data = dataset();

    let top: Vec<&str> = data.top_by_count(n(3)).iter().map(|r| r.municipality.as_str()).collect();
    assert_eq!(top, vec!["Bogotá", "Cali", "Medellín"]);

    let bottom: Vec<&str> = data.bottom_by_count(n(3)).iter().map(|r| r.municipality.as_str()).collect();
    assert_eq!(bottom, vec!["Pisba", "Sogamoso", "Tunja"]);

    let top_rate: Vec<&str> = data.top_by_rate(n(3)).iter().map(|r| r.municipality.as_str()).collect();
    assert_eq!(top_rate, vec!["Jamundí", "El Tambo", "Santander de Quilichao"]);
}

#[test]
fn department_aggregates_over_sample() {
    let data = dataset();
    assert_eq!(round2(data.department_rate("Boyacá").unwrap()), 3.0);

    let totals = data.department_totals();
    assert_eq!(totals.len(), 5);
    assert!(totals.contains(&("Valle del Cauca".to_string(), 1416)));

    let summed: u64 = totals.iter().map(|(_, h)| h).sum();
    let direct: u64 = data.records().iter().map(|r| r.homicides).sum();
    assert_eq!(summed, direct);
}

#[test]
fn report_for_default_selection() {
    let data = dataset();
    let selection = Selection::first(&data).unwrap();
    let view = DashboardView::build(&data, &selection, RankingAxis::Count, n(5));

    let report = render_report(&view);
    assert!(report.starts_with("Homicides 2024: Antioquia / Apartadó"));
    assert!(report.contains("Bogotá"));
    assert!(report.trim_end().lines().count() > 10);
}

#[test]
fn boundaries_match_records() {
    let features = load_features(&sample("municipios.geojson"), &PropertyNames::default()).unwrap();
    // The point feature is skipped
    assert_eq!(features.len(), 17);

    let data = dataset();
    for feature in &features {
        let department = feature.department.as_deref().unwrap();
        let municipality = feature.municipality.as_deref().unwrap();
        assert!(data.resolve_record(department, municipality).is_ok(), "{municipality}");
    }

    let renderer = ChoroplethRenderer::new(features, DEFAULT_GAMMA);
    assert_eq!(renderer.coverage(), (15, 2));
    assert_eq!(renderer.scale().range(), Some((1.57, 63.69)));

    let viewport = Viewport::fit(&renderer.bounds().unwrap(), 120, 120);
    let layers = renderer.render(60, 30, &viewport, None);
    let painted = (0..30)
        .flat_map(|row| (0..60).map(move |col| (col, row)))
        .filter(|&(col, row)| layers.fill.cell(col, row).is_some())
        .count();
    assert!(painted > 0);

    let cali = renderer.feature_at(-76.45, 3.5).and_then(|f| f.municipality.as_deref());
    assert_eq!(cali, Some("Cali"));
}

#[test]
fn bundled_config_parses() {
    let config = AppConfig::load_from_file(&Path::new(env!("CARGO_MANIFEST_DIR")).join("config.toml")).unwrap();
    assert_eq!(config.display.top_n.get(), 10);
    assert_eq!(config.display.gamma, DEFAULT_GAMMA);
}
