//! Read-only mapping from snapshots to drawable coordinates.
//!
//! The core owns no rendering; it only turns a display series into a
//! polyline and the balance ratios into an on-plate marker position, in
//! the pixel space the caller configures. The geometry mirrors the
//! two-plate layout the display has always used: plates on top, force
//! plots below, with equal gutters.

use crate::metrics::SurfaceMetrics;

/// Axis-aligned rectangle in pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Screen regions for both surfaces, derived from the screen size.
#[derive(Debug, Clone, Copy)]
pub struct ScreenLayout {
    pub left_plate: Rect,
    pub right_plate: Rect,
    pub left_plot: Rect,
    pub right_plot: Rect,
    /// Radius of the load marker circle.
    pub marker_radius: f32,
}

impl ScreenLayout {
    /// Plates take 40% of the width and 50% of the height each; plots sit
    /// below at 30% height. Gutters split the remaining space evenly.
    pub fn new(screen_w: f32, screen_h: f32) -> Self {
        let plate_w = 0.4 * screen_w;
        let plate_h = 0.5 * screen_h;
        let plot_w = plate_w;
        let plot_h = 0.3 * screen_h;

        let y_gutter = (screen_h - plate_h - plot_h) / 3.0;
        let plate_y = y_gutter;
        let plot_y = plate_y + y_gutter + plate_h;

        let x_gutter = (screen_w - 2.0 * plate_w) / 3.0;
        let left_x = x_gutter;
        let right_x = 2.0 * x_gutter + plate_w;

        Self {
            left_plate: Rect {
                x: left_x,
                y: plate_y,
                w: plate_w,
                h: plate_h,
            },
            right_plate: Rect {
                x: right_x,
                y: plate_y,
                w: plate_w,
                h: plate_h,
            },
            left_plot: Rect {
                x: left_x,
                y: plot_y,
                w: plot_w,
                h: plot_h,
            },
            right_plot: Rect {
                x: right_x,
                y: plot_y,
                w: plot_w,
                h: plot_h,
            },
            marker_radius: 12.0,
        }
    }
}

/// Map a display series into polyline vertices inside `plot`.
///
/// X spreads the slots left to right, oldest first; Y grows downward from
/// the plot's bottom edge, normalized by `force_max`, so larger forces
/// plot higher. Values beyond `force_max` extend past the top edge rather
/// than clipping.
pub fn force_polyline(series: &[f32], plot: &Rect, force_max: f32) -> Vec<(f32, f32)> {
    let m = series.len();
    if m == 0 || force_max <= 0.0 {
        return Vec::new();
    }
    series
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let x = plot.x + (i as f32) / (m as f32) * plot.w;
            let y = plot.y + plot.h - v / force_max * plot.h;
            (x, y)
        })
        .collect()
}

/// Marker position on the plate for the current balance ratios, or `None`
/// when the surface is effectively unloaded (mean load at or below the
/// threshold) or the layout cannot resolve load position.
pub fn load_marker(metrics: &SurfaceMetrics, plate: &Rect, force_threshold: f32) -> Option<(f32, f32)> {
    if metrics.mean_load <= force_threshold {
        return None;
    }
    let balance = metrics.balance?;
    let x = plate.x + plate.w * balance.lateral;
    // anterior_posterior = 1 is fully forward = top of the plate rect
    let y = plate.y + plate.h * (1.0 - balance.anterior_posterior);
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{BalanceRatios, SurfaceMetrics};

    #[test]
    fn layout_partitions_the_screen() {
        let l = ScreenLayout::new(600.0, 600.0);
        assert_eq!(l.left_plate.w, 240.0);
        assert_eq!(l.left_plate.h, 300.0);
        assert_eq!(l.left_plot.h, 180.0);
        // Plots sit below the plates
        assert!(l.left_plot.y > l.left_plate.y + l.left_plate.h);
        // Right column starts after the left one
        assert!(l.right_plate.x > l.left_plate.x + l.left_plate.w);
    }

    #[test]
    fn polyline_spans_plot_and_scales_force() {
        let plot = Rect {
            x: 10.0,
            y: 20.0,
            w: 100.0,
            h: 50.0,
        };
        let pts = force_polyline(&[0.0, 500.0, 1000.0], &plot, 1000.0);
        assert_eq!(pts.len(), 3);
        assert_eq!(pts[0], (10.0, 70.0)); // zero force at bottom edge
        assert_eq!(pts[2].1, 20.0); // full-scale force at top edge
        assert!(pts[2].0 < plot.x + plot.w);
    }

    #[test]
    fn marker_hidden_below_threshold() {
        let plate = Rect {
            x: 0.0,
            y: 0.0,
            w: 100.0,
            h: 100.0,
        };
        let m = SurfaceMetrics {
            mean_load: 50.0,
            balance: Some(BalanceRatios {
                lateral: 0.5,
                anterior_posterior: 0.5,
            }),
        };
        assert!(load_marker(&m, &plate, 100.0).is_none());
    }

    #[test]
    fn marker_follows_ratios_when_loaded() {
        let plate = Rect {
            x: 100.0,
            y: 200.0,
            w: 100.0,
            h: 100.0,
        };
        let m = SurfaceMetrics {
            mean_load: 500.0,
            balance: Some(BalanceRatios {
                lateral: 1.0,
                anterior_posterior: 1.0,
            }),
        };
        // Fully right and fully forward: right edge, top edge.
        assert_eq!(load_marker(&m, &plate, 100.0), Some((200.0, 200.0)));
    }

    #[test]
    fn marker_unsupported_without_ratios() {
        let plate = Rect {
            x: 0.0,
            y: 0.0,
            w: 10.0,
            h: 10.0,
        };
        let m = SurfaceMetrics {
            mean_load: 1e6,
            balance: None,
        };
        assert!(load_marker(&m, &plate, 100.0).is_none());
    }
}
