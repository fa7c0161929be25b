use crate::stats::Shade;
use ratatui::style::Color;

/// Viridis sampled at five evenly spaced stops
const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

/// Features without a rate
pub const NO_DATA: Color = Color::Rgb(211, 211, 211);

/// Linear interpolation along the viridis stops, `t` in [0, 1]
pub fn ramp(t: f64) -> (u8, u8, u8) {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let idx = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - idx as f64;

    let (r0, g0, b0) = VIRIDIS[idx];
    let (r1, g1, b1) = VIRIDIS[idx + 1];
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;

    (mix(r0, r1), mix(g0, g1), mix(b0, b1))
}

pub fn shade_color(shade: Shade) -> Color {
    match shade {
        Shade::NoData => NO_DATA,
        Shade::Intensity(t) => {
            let (r, g, b) = ramp(t);
            Color::Rgb(r, g, b)
        }
    }
}
