use crate::data::Bounds;
use std::collections::HashMap;

/// Spatial index for map features using conservative approximation.
/// Each feature's bounding box is indexed into every cell it overlaps,
/// guaranteeing no false negatives while allowing false positives
/// (eliminated by the caller's exact bbox or polygon checks).
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Build from feature bounding boxes, in feature order
    pub fn build<'a>(bboxes: impl Iterator<Item = &'a Bounds>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, bbox) in bboxes.enumerate() {
            let min_cell = grid.to_cell(bbox.min_lon, bbox.min_lat);
            let max_cell = grid.to_cell(bbox.max_lon, bbox.max_lat);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Sorted, deduplicated indices of features whose cells overlap `bounds`
    pub fn query(&self, bounds: &Bounds) -> Vec<usize> {
        let min_cell = self.to_cell(bounds.min_lon, bounds.min_lat);
        let max_cell = self.to_cell(bounds.max_lon, bounds.max_lat);

        let mut results = Vec::new();
        if max_cell.0 - min_cell.0 > 4096 || max_cell.1 - min_cell.1 > 4096 {
            // Zoomed far out: walking the occupied cells is cheaper
            for indices in self.cells.values() {
                results.extend_from_slice(indices);
            }
        } else {
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    if let Some(indices) = self.cells.get(&(x, y)) {
                        results.extend_from_slice(indices);
                    }
                }
            }
        }

        results.sort_unstable();
        results.dedup();
        results
    }
}
