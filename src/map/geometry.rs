use crate::braille::BrailleCanvas;
use crate::stats::Shade;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Fill a polygon given in pixel space (exterior ring plus holes) with the
/// even-odd rule, sampling at pixel centers. Returns the number of pixels painted.
pub fn fill_polygon(canvas: &mut BrailleCanvas, rings: &[Vec<(f64, f64)>], shade: Shade) -> usize {
    let (width, height) = canvas.pixel_size();
    if width == 0 || height == 0 {
        return 0;
    }

    let (min_y, max_y) = rings
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| {
            (lo.min(y), hi.max(y))
        });
    if min_y > max_y || max_y < 0.0 || min_y >= height as f64 {
        return 0;
    }

    let first_row = min_y.floor().max(0.0) as usize;
    let last_row = (max_y.ceil() as usize).min(height - 1);

    let mut painted = 0;
    let mut crossings: Vec<f64> = Vec::new();

    for row in first_row..=last_row {
        let sy = row as f64 + 0.5;
        crossings.clear();

        for ring in rings {
            if ring.len() < 2 {
                continue;
            }
            let mut prev = ring[ring.len() - 1];
            for &point in ring {
                if (prev.1 <= sy) != (point.1 <= sy) {
                    let t = (sy - prev.1) / (point.1 - prev.1);
                    crossings.push(prev.0 + t * (point.0 - prev.0));
                }
                prev = point;
            }
        }

        crossings.sort_by(|a, b| a.total_cmp(b));

        for span in crossings.chunks_exact(2) {
            let start = (span[0] - 0.5).ceil().max(0.0);
            let end = (span[1] - 0.5).floor().min(width as f64 - 1.0);
            if start > end {
                continue;
            }
            for x in start as usize..=end as usize {
                canvas.paint(x, row, shade);
                painted += 1;
            }
        }
    }

    painted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<(f64, f64)> {
        vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]
    }

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn test_fill_square_covers_cells() {
        let mut canvas = BrailleCanvas::new(2, 1);
        let painted = fill_polygon(&mut canvas, &[square(0.0, 0.0, 4.0, 4.0)], Shade::Intensity(1.0));
        assert_eq!(painted, 16);
        assert_eq!(canvas.to_string(), "⣿⣿");
        assert_eq!(canvas.cell(1, 0).unwrap().1, Some(Shade::Intensity(1.0)));
    }

    #[test]
    fn test_fill_respects_holes() {
        let mut canvas = BrailleCanvas::new(3, 2);
        let rings = vec![square(0.0, 0.0, 6.0, 8.0), square(2.0, 0.0, 4.0, 8.0)];
        fill_polygon(&mut canvas, &rings, Shade::NoData);
        // Middle column is the hole
        assert_eq!(canvas.cell(1, 0), None);
        assert!(canvas.cell(0, 0).is_some());
        assert!(canvas.cell(2, 1).is_some());
    }

    #[test]
    fn test_fill_clips_to_canvas() {
        let mut canvas = BrailleCanvas::new(1, 1);
        let painted = fill_polygon(&mut canvas, &[square(-10.0, -10.0, 10.0, 10.0)], Shade::NoData);
        assert_eq!(painted, 8);
    }

    #[test]
    fn test_fill_offscreen_is_noop() {
        let mut canvas = BrailleCanvas::new(2, 2);
        assert_eq!(fill_polygon(&mut canvas, &[square(50.0, 50.0, 60.0, 60.0)], Shade::NoData), 0);
        assert_eq!(fill_polygon(&mut canvas, &[square(0.0, -9.0, 4.0, -1.0)], Shade::NoData), 0);
    }
}
