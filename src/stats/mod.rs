//! Pure statistics over an immutable [`Dataset`](crate::data::Dataset):
//! hierarchical selection, department/national aggregates, rankings and the
//! gamma color scale that shades the choropleth.

mod aggregate;
mod normalize;
mod ranking;
mod selection;

pub use aggregate::DepartmentSummary;
pub use normalize::{ColorScale, Shade, DEFAULT_GAMMA};
pub use ranking::RankingAxis;
pub use selection::Selection;

/// Round to two decimal places, as rates are displayed
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
