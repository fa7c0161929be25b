use crate::braille::BrailleCanvas;
use crate::data::{Bounds, GeoFeature};
use crate::map::geometry::{draw_line, fill_polygon};
use crate::map::projection::Viewport;
use crate::map::spatial::FeatureGrid;
use crate::stats::{ColorScale, Shade};
use rayon::prelude::*;

/// Grid cell size in degrees; a typical municipality spans one or two cells
const GRID_CELL_DEGREES: f64 = 0.5;

/// A feature's polygons in pixel space
type ProjectedFeature = Vec<Vec<Vec<(f64, f64)>>>;

/// The municipality whose department and outline are highlighted
#[derive(Clone, Copy, Debug)]
pub struct Highlight<'a> {
    pub department: &'a str,
    pub municipality: &'a str,
}

/// Rendered map layers, back to front
pub struct MapLayers {
    pub fill: BrailleCanvas,
    pub department: BrailleCanvas,
    pub selected: BrailleCanvas,
}

/// Choropleth renderer over municipal boundaries
pub struct ChoroplethRenderer {
    features: Vec<GeoFeature>,
    shades: Vec<Shade>,
    scale: ColorScale,
    grid: FeatureGrid,
    bounds: Option<Bounds>,
}

impl ChoroplethRenderer {
    /// Fit the color scale to the features' rates and index their extents
    pub fn new(features: Vec<GeoFeature>, gamma: f64) -> Self {
        let scale = ColorScale::fit_or_flat(features.iter().map(|f| f.rate), gamma);
        let shades = features.iter().map(|f| scale.shade(f.rate)).collect();
        let grid = FeatureGrid::build(features.iter().map(|f| &f.bbox), GRID_CELL_DEGREES);
        let bounds = features.iter().map(|f| f.bbox).reduce(Bounds::union);

        Self {
            features,
            shades,
            scale,
            grid,
            bounds,
        }
    }

    /// Check if any geometry is loaded
    pub fn has_data(&self) -> bool {
        !self.features.is_empty()
    }

    pub fn scale(&self) -> &ColorScale {
        &self.scale
    }

    /// Extent of every feature
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn features(&self) -> &[GeoFeature] {
        &self.features
    }

    /// Number of features per shade category: (with rate, without)
    pub fn coverage(&self) -> (usize, usize) {
        let missing = self.shades.iter().filter(|s| **s == Shade::NoData).count();
        (self.shades.len() - missing, missing)
    }

    /// Render all visible features onto canvases of the given character size
    pub fn render(
        &self,
        width: usize,
        height: usize,
        viewport: &Viewport,
        highlight: Option<Highlight>,
    ) -> MapLayers {
        let mut layers = MapLayers {
            fill: BrailleCanvas::new(width, height),
            department: BrailleCanvas::new(width, height),
            selected: BrailleCanvas::new(width, height),
        };

        let visible = viewport.visible_bounds();
        let candidates: Vec<usize> = self
            .grid
            .query(&visible)
            .into_iter()
            .filter(|&idx| self.features[idx].bbox.intersects(&visible))
            .collect();

        let projected: Vec<(usize, ProjectedFeature)> = candidates
            .par_iter()
            .map(|&idx| (idx, project_feature(&self.features[idx], viewport)))
            .collect();

        for (idx, polygons) in &projected {
            let shade = self.shades[*idx];
            let mut painted = 0;
            for rings in polygons {
                painted += fill_polygon(&mut layers.fill, rings, shade);
            }

            // Keep sub-pixel municipalities visible as a single dot
            if painted == 0 {
                let bbox = &self.features[*idx].bbox;
                let (px, py) = viewport.project_f(
                    (bbox.min_lon + bbox.max_lon) / 2.0,
                    (bbox.min_lat + bbox.max_lat) / 2.0,
                );
                if px >= 0.0 && py >= 0.0 {
                    layers.fill.paint(px as usize, py as usize, shade);
                }
            }
        }

        if let Some(highlight) = highlight {
            for (idx, polygons) in &projected {
                let feature = &self.features[*idx];
                if feature.is_municipality(highlight.department, highlight.municipality) {
                    draw_outline(&mut layers.selected, polygons, viewport);
                } else if feature.in_department(highlight.department) {
                    draw_outline(&mut layers.department, polygons, viewport);
                }
            }
        }

        layers
    }

    /// Feature containing the geographic point, topmost (last drawn) first
    pub fn feature_at(&self, lon: f64, lat: f64) -> Option<&GeoFeature> {
        let point = Bounds {
            min_lon: lon,
            min_lat: lat,
            max_lon: lon,
            max_lat: lat,
        };
        self.grid
            .query(&point)
            .into_iter()
            .rev()
            .map(|idx| &self.features[idx])
            .find(|f| {
                f.bbox.intersects(&point) && f.contains(lon, lat)
            })
    }
}

fn project_feature(feature: &GeoFeature, viewport: &Viewport) -> ProjectedFeature {
    feature
        .polygons
        .iter()
        .map(|polygon| {
            polygon
                .iter()
                .map(|ring| {
                    ring.iter()
                        .map(|&(lon, lat)| viewport.project_f(lon, lat))
                        .collect()
                })
                .collect()
        })
        .collect()
}

/// Draw every ring with viewport culling
fn draw_outline(canvas: &mut BrailleCanvas, polygons: &ProjectedFeature, viewport: &Viewport) {
    for ring in polygons.iter().flatten() {
        let mut prev: Option<(i32, i32)> = None;
        for &(x, y) in ring {
            let point = (x as i32, y as i32);
            if let Some(last) = prev {
                if viewport.line_might_be_visible(last, point) {
                    draw_line(canvas, last.0, last.1, point.0, point.1);
                }
            }
            prev = Some(point);
        }
    }
}
