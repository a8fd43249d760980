//! Balance metrics derived from the latest display-rate values.

use crate::layout::{ChannelRole, SurfaceLayout};
use crate::session::DisplaySeries;

/// Guard against division by zero when the plate is unloaded. With all
/// forces at zero the numerator vanishes first, so both ratios tend to 0
/// rather than 0.5.
pub const RATIO_EPS: f64 = 1e-12;

/// Normalized load-position indicators on a surface, each in [0,1] for
/// non-negative force inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceRatios {
    /// Rightward load share: 0 = fully left, 1 = fully right.
    pub lateral: f32,
    /// Forward load share: 0 = fully back, 1 = fully forward.
    pub anterior_posterior: f32,
}

/// Per-surface derived values, recomputed on every update and never
/// persisted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurfaceMetrics {
    /// Mean of the latest display value across the surface's load-bearing
    /// channels, in the raw force unit.
    pub mean_load: f32,
    /// `None` for layouts that cannot resolve load position (six-axis);
    /// the load marker is unsupported there rather than drawn at a
    /// fabricated position.
    pub balance: Option<BalanceRatios>,
}

/// Computes `SurfaceMetrics` from the most recent slot of a display
/// series. Which formulas apply is a property of the layout.
#[derive(Debug, Clone, Copy)]
pub struct MetricEstimator {
    layout: SurfaceLayout,
}

impl MetricEstimator {
    pub fn new(layout: SurfaceLayout) -> Self {
        Self { layout }
    }

    pub fn recompute(&self, series: &DisplaySeries) -> SurfaceMetrics {
        let mean_load = series.mean().last().copied().unwrap_or(0.0);
        let balance = if self.layout.supports_balance_ratios() {
            Some(self.corner_ratios(series))
        } else {
            None
        };
        SurfaceMetrics { mean_load, balance }
    }

    fn corner_ratios(&self, series: &DisplaySeries) -> BalanceRatios {
        let fl = f64::from(series.latest(ChannelRole::FrontLeft).unwrap_or(0.0));
        let fr = f64::from(series.latest(ChannelRole::FrontRight).unwrap_or(0.0));
        let bl = f64::from(series.latest(ChannelRole::BackLeft).unwrap_or(0.0));
        let br = f64::from(series.latest(ChannelRole::BackRight).unwrap_or(0.0));

        let left = fl + bl;
        let right = fr + br;
        let fwd = fl + fr;
        let back = bl + br;

        BalanceRatios {
            lateral: (right / (left + right + RATIO_EPS)) as f32,
            anterior_posterior: (fwd / (fwd + back + RATIO_EPS)) as f32,
        }
    }
}
