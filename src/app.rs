use crate::dashboard::DashboardView;
use crate::data::Dataset;
use crate::map::{ChoroplethRenderer, Highlight, Viewport};
use crate::stats::{RankingAxis, Selection};
use std::num::NonZeroUsize;
use tracing::{debug, warn};

/// Largest N the ranking panels accept
const MAX_TOP_N: usize = 50;

/// Center of Colombia, used when no boundaries are loaded
const FALLBACK_CENTER: (f64, f64) = (-73.5, 4.5);

/// Which panel receives navigation keys
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Departments,
    Municipalities,
    Map,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Departments => Focus::Municipalities,
            Focus::Municipalities => Focus::Map,
            Focus::Map => Focus::Departments,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Departments => Focus::Map,
            Focus::Municipalities => Focus::Departments,
            Focus::Map => Focus::Municipalities,
        }
    }
}

/// Application state for one dashboard session
pub struct App {
    pub dataset: Dataset,
    pub map: ChoroplethRenderer,
    pub selection: Selection,
    pub departments: Vec<String>,
    pub focus: Focus,
    pub axis: RankingAxis,
    pub top_n: NonZeroUsize,
    pub viewport: Viewport,
    pub should_quit: bool,
    /// Last mouse position (map pixels) for drag tracking
    pub last_mouse: Option<(i32, i32)>,
    /// Message shown in the status bar until the next action
    pub status: Option<String>,
}

impl App {
    pub fn new(dataset: Dataset, map: ChoroplethRenderer, selection: Selection, top_n: NonZeroUsize) -> Self {
        let departments = dataset.list_departments();
        let viewport = home_viewport(&map, 2, 4);

        Self {
            dataset,
            map,
            selection,
            departments,
            focus: Focus::Departments,
            axis: RankingAxis::default(),
            top_n,
            viewport,
            should_quit: false,
            last_mouse: None,
            status: None,
        }
    }

    /// Derived views for the current selection
    pub fn view(&self) -> DashboardView<'_> {
        DashboardView::build(&self.dataset, &self.selection, self.axis, self.top_n)
    }

    pub fn highlight(&self) -> Highlight<'_> {
        Highlight {
            department: self.selection.department(),
            municipality: self.selection.municipality(),
        }
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Update map canvas size (braille pixels) when the terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        self.viewport.set_size(width, height);
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn department_index(&self) -> Option<usize> {
        self.departments
            .iter()
            .position(|d| d == self.selection.department())
    }

    pub fn municipality_index(&self) -> Option<usize> {
        self.selection
            .municipalities()
            .iter()
            .position(|m| m == self.selection.municipality())
    }

    /// Arrow keys: move the focused list, or pan the map
    pub fn move_vertical(&mut self, delta: i32) {
        match self.focus {
            Focus::Departments => {
                let idx = step(self.department_index(), delta, self.departments.len());
                self.select_department(idx);
            }
            Focus::Municipalities => {
                let idx = step(self.municipality_index(), delta, self.selection.municipalities().len());
                self.select_municipality(idx);
            }
            Focus::Map => self.pan(0, delta * 6),
        }
    }

    pub fn select_department(&mut self, idx: usize) {
        let Some(department) = self.departments.get(idx).cloned() else {
            return;
        };
        self.status = None;
        if let Err(e) = self.selection.set_department(&self.dataset, &department) {
            warn!(error = %e, "department change rejected");
            self.status = Some(e.to_string());
        }
    }

    pub fn select_municipality(&mut self, idx: usize) {
        let Some(municipality) = self.selection.municipalities().get(idx).cloned() else {
            return;
        };
        self.status = None;
        if let Err(e) = self.selection.set_municipality(&municipality) {
            self.status = Some(e.to_string());
        }
    }

    /// Select the municipality drawn under a map pixel
    pub fn select_at(&mut self, px: i32, py: i32) {
        let (lon, lat) = self.viewport.unproject(px, py);
        let Some(feature) = self.map.feature_at(lon, lat) else {
            return;
        };
        let (Some(department), Some(municipality)) =
            (feature.department.clone(), feature.municipality.clone())
        else {
            self.status = Some("boundary has no department/municipality keys".to_string());
            return;
        };

        debug!(%department, %municipality, "map selection");
        // Applied to a copy so a rejected pick leaves the current selection intact
        let mut next = self.selection.clone();
        let result = next
            .set_department(&self.dataset, &department)
            .and_then(|_| next.set_municipality(&municipality));
        match result {
            Ok(()) => {
                self.selection = next;
                self.status = None;
            }
            Err(e) => self.status = Some(format!("invalid selection: {}", e)),
        }
    }

    pub fn toggle_axis(&mut self) {
        self.axis = self.axis.toggle();
    }

    pub fn grow_n(&mut self) {
        let next = (self.top_n.get() + 1).min(MAX_TOP_N);
        self.top_n = NonZeroUsize::new(next).unwrap_or(self.top_n);
    }

    pub fn shrink_n(&mut self) {
        if let Some(next) = NonZeroUsize::new(self.top_n.get() - 1) {
            self.top_n = next;
        }
    }

    /// Pan the map
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Zoom towards a map pixel
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.viewport.zoom_in_at(px, py);
    }

    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.viewport.zoom_out_at(px, py);
    }

    /// Frame every boundary again
    pub fn reset_view(&mut self) {
        self.viewport = home_viewport(&self.map, self.viewport.width, self.viewport.height);
    }

    /// Handle mouse drag in map pixels
    pub fn handle_drag(&mut self, px: i32, py: i32) {
        if let Some((last_x, last_y)) = self.last_mouse {
            self.pan(last_x - px, last_y - py);
        }
        self.last_mouse = Some((px, py));
    }

    /// Reset drag state when mouse button released
    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }
}

fn home_viewport(map: &ChoroplethRenderer, width: usize, height: usize) -> Viewport {
    match map.bounds() {
        Some(bounds) => Viewport::fit(&bounds, width, height),
        None => Viewport::new(FALLBACK_CENTER.0, FALLBACK_CENTER.1, 1.0, width, height),
    }
}

/// Move an index by `delta`, staying within `0..len`
fn step(current: Option<usize>, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let current = current.unwrap_or(0) as i64;
    (current + delta as i64).clamp(0, len as i64 - 1) as usize
}
