use crate::error::StatsError;

/// Gamma applied to the choropleth when none is configured
pub const DEFAULT_GAMMA: f64 = 0.6;

/// Visual category of one map feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shade {
    /// The feature has no rate; drawn in a separate neutral color
    NoData,
    /// Normalized intensity in [0, 1]
    Intensity(f64),
}

/// Power-law color scale over a skewed, partially missing field.
///
/// With `gamma < 1` the low and middle part of the range is stretched and the
/// long right tail compressed, so mid-range municipalities stay distinguishable
/// without clipping the outliers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorScale {
    Gamma { vmin: f64, vmax: f64, gamma: f64 },
    /// Fallback for a constant field: every present value sits mid-scale
    Flat,
}

impl ColorScale {
    /// Fit the scale to the present values. `vmin` is never below zero.
    pub fn fit<I>(values: I, gamma: f64) -> Result<Self, StatsError>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        debug_assert!(gamma.is_finite() && gamma > 0.0);

        let (min, max) = values
            .into_iter()
            .flatten()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        if min > max {
            return Err(StatsError::EmptyResult("rate".to_string()));
        }

        let vmin = min.max(0.0);
        let vmax = max;
        if vmax <= vmin {
            return Err(StatsError::DegenerateRange(vmax));
        }

        Ok(ColorScale::Gamma { vmin, vmax, gamma })
    }

    /// Like [`fit`](Self::fit), degrading to [`ColorScale::Flat`] instead of failing
    pub fn fit_or_flat<I>(values: I, gamma: f64) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Self::fit(values, gamma).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "color scale falls back to flat shading");
            ColorScale::Flat
        })
    }

    /// Map a value onto [0, 1]
    pub fn normalize(&self, value: f64) -> f64 {
        match *self {
            ColorScale::Gamma { vmin, vmax, gamma } => {
                let linear = ((value - vmin) / (vmax - vmin)).clamp(0.0, 1.0);
                linear.powf(gamma)
            }
            ColorScale::Flat => 0.5,
        }
    }

    pub fn shade(&self, value: Option<f64>) -> Shade {
        match value {
            Some(v) if v.is_finite() => Shade::Intensity(self.normalize(v)),
            _ => Shade::NoData,
        }
    }

    /// (vmin, vmax) for legends; `None` when flat
    pub fn range(&self) -> Option<(f64, f64)> {
        match *self {
            ColorScale::Gamma { vmin, vmax, .. } => Some((vmin, vmax)),
            ColorScale::Flat => None,
        }
    }
}
