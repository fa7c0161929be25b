use crate::data::Bounds;
use std::f64::consts::PI;

const MIN_ZOOM: f64 = 0.5;
const MAX_ZOOM: f64 = 100.0;

/// Web Mercator x in [0, 1]
#[inline]
fn mercator_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

/// Web Mercator y in [0, 1], growing southwards
#[inline]
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat * PI / 180.0;
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

#[inline]
fn inverse_mercator(x: f64, y: f64) -> (f64, f64) {
    let lon = x * 360.0 - 180.0;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    (lon, lat_rad * 180.0 / PI)
}

/// Viewport representing the visible map area and zoom level.
///
/// Zoom is relative to a home extent: at zoom 1 the extent exactly fits the
/// canvas, whatever the canvas aspect ratio.
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-85 to 85)
    pub center_lat: f64,
    /// Zoom level (higher = more zoomed in)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
    /// Mercator width and height of the home extent
    extent: (f64, f64),
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
            extent: (1.0, 1.0),
        }
    }

    /// Frame the given bounds with a small margin
    pub fn fit(bounds: &Bounds, width: usize, height: usize) -> Self {
        let x0 = mercator_x(bounds.min_lon);
        let x1 = mercator_x(bounds.max_lon);
        let y0 = mercator_y(bounds.max_lat);
        let y1 = mercator_y(bounds.min_lat);

        let (center_lon, center_lat) = inverse_mercator((x0 + x1) / 2.0, (y0 + y1) / 2.0);

        Self {
            center_lon,
            center_lat,
            zoom: 1.0,
            width,
            height,
            extent: (((x1 - x0) * 1.05).max(1e-9), ((y1 - y0) * 1.05).max(1e-9)),
        }
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// Pixels per Mercator unit
    fn scale(&self) -> f64 {
        let fit = (self.width as f64 / self.extent.0).min(self.height as f64 / self.extent.1);
        self.zoom * fit.max(1e-9)
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = self.scale();
        let x = mercator_x(self.center_lon) + dx as f64 / scale;
        let y = mercator_y(self.center_lat) + dy as f64 / scale;
        let (lon, lat) = inverse_mercator(x, y);

        // Wrap longitude
        self.center_lon = if lon > 180.0 {
            lon - 360.0
        } else if lon < -180.0 {
            lon + 360.0
        } else {
            lon
        };

        // Clamp latitude
        self.center_lat = lat.clamp(-85.0, 85.0);
    }

    /// Zoom in by a factor
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(MAX_ZOOM);
    }

    /// Zoom out by a factor
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(MIN_ZOOM);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.5);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / 1.5);
    }

    /// Zoom by factor keeping the point under (px, py) fixed
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);

        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);

        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Project a geographic coordinate to fractional pixel coordinates
    pub fn project_f(&self, lon: f64, lat: f64) -> (f64, f64) {
        let scale = self.scale();
        let px = (mercator_x(lon) - mercator_x(self.center_lon)) * scale + self.width as f64 / 2.0;
        let py = (mercator_y(lat) - mercator_y(self.center_lat)) * scale + self.height as f64 / 2.0;
        (px, py)
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let (px, py) = self.project_f(lon, lat);
        (px as i32, py as i32)
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.scale();
        let x = (px as f64 - self.width as f64 / 2.0) / scale + mercator_x(self.center_lon);
        let y = (py as f64 - self.height as f64 / 2.0) / scale + mercator_y(self.center_lat);
        inverse_mercator(x, y)
    }

    /// Geographic bounds of the canvas
    pub fn visible_bounds(&self) -> Bounds {
        let (west, north) = self.unproject(0, 0);
        let (east, south) = self.unproject(self.width as i32, self.height as i32);
        Bounds {
            min_lon: west,
            min_lat: south,
            max_lon: east,
            max_lat: north,
        }
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0
            && min_x < self.width as i32
            && max_y >= 0
            && min_y < self.height as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colombia() -> Bounds {
        Bounds {
            min_lon: -79.0,
            min_lat: -4.2,
            max_lon: -66.8,
            max_lat: 12.5,
        }
    }

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        let (x, y) = vp.project(0.0, 0.0);
        assert_eq!(x, 50);
        assert_eq!(y, 50);
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
        vp.pan(0, 10);
        assert!(vp.center_lat < 0.0);
    }

    #[test]
    fn test_fit_contains_bounds() {
        for (w, h) in [(200, 100), (80, 160), (120, 120)] {
            let vp = Viewport::fit(&colombia(), w, h);
            for (lon, lat) in [(-79.0, -4.2), (-66.8, 12.5), (-79.0, 12.5), (-66.8, -4.2)] {
                let (px, py) = vp.project(lon, lat);
                assert!(px >= 0 && px <= w as i32, "{lon},{lat} -> {px} in {w}x{h}");
                assert!(py >= 0 && py <= h as i32, "{lon},{lat} -> {py} in {w}x{h}");
            }
        }
    }

    #[test]
    fn test_unproject_inverts_project() {
        let vp = Viewport::fit(&colombia(), 160, 120);
        let (px, py) = vp.project_f(-74.08, 4.6);
        let (lon, lat) = vp.unproject(px.round() as i32, py.round() as i32);
        assert!((lon + 74.08).abs() < 0.2);
        assert!((lat - 4.6).abs() < 0.2);
    }

    #[test]
    fn test_zoom_at_keeps_point_fixed() {
        let mut vp = Viewport::fit(&colombia(), 160, 120);
        let before = vp.unproject(40, 30);
        vp.zoom_in_at(40, 30);
        let after = vp.unproject(40, 30);
        assert!(vp.zoom > 1.0);
        assert!((before.0 - after.0).abs() < 0.3);
        assert!((before.1 - after.1).abs() < 0.3);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        for _ in 0..50 {
            vp.zoom_in();
        }
        assert_eq!(vp.zoom, MAX_ZOOM);
        for _ in 0..50 {
            vp.zoom_out();
        }
        assert_eq!(vp.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_visible_bounds_contain_center() {
        let vp = Viewport::fit(&colombia(), 160, 120);
        let b = vp.visible_bounds();
        assert!(b.min_lon < vp.center_lon && vp.center_lon < b.max_lon);
        assert!(b.min_lat < vp.center_lat && vp.center_lat < b.max_lat);
        assert!(b.min_lon <= -79.0 && b.max_lat >= 12.5);
    }
}
