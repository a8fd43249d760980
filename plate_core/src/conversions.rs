//! `From`/`TryFrom` implementations bridging `plate_config` types to
//! `plate_core` types.
//!
//! These keep the CLI free of manual field-by-field mapping.

use crate::error::Result;
use crate::layout::{ChannelRole, SurfaceLayout};
use crate::params::StreamParams;
use crate::session::ChannelAssignments;

// ── StreamParams ─────────────────────────────────────────────────────────────

impl From<&plate_config::StreamCfg> for StreamParams {
    fn from(c: &plate_config::StreamCfg) -> Self {
        Self {
            sample_rate_hz: c.sample_rate_hz,
            display_rate_hz: c.display_rate_hz,
            history_secs: c.history_secs,
        }
    }
}

// ── SurfaceLayout ────────────────────────────────────────────────────────────

impl From<plate_config::LayoutKind> for SurfaceLayout {
    fn from(k: plate_config::LayoutKind) -> Self {
        match k {
            plate_config::LayoutKind::SixAxis => SurfaceLayout::SixAxis,
            plate_config::LayoutKind::FourCorner => SurfaceLayout::FourCorner,
        }
    }
}

// ── ChannelAssignments ───────────────────────────────────────────────────────

/// Resolve the configured role→channel-id assignments for both surfaces.
/// Fails when a four-corner surface is missing explicit ids.
pub fn assignments_from_config(cfg: &plate_config::Config) -> Result<ChannelAssignments> {
    let layout: SurfaceLayout = cfg.surfaces.layout.into();
    let (left, right) = match cfg.surfaces.layout {
        plate_config::LayoutKind::SixAxis => (
            six_axis_pairs(&cfg.surfaces.left.six_axis(plate_config::LEFT_SIX_AXIS_BASE)),
            six_axis_pairs(&cfg.surfaces.right.six_axis(plate_config::RIGHT_SIX_AXIS_BASE)),
        ),
        plate_config::LayoutKind::FourCorner => {
            let l = cfg.surfaces.left.four_corner().ok_or_else(|| {
                eyre::eyre!("four_corner layout requires explicit channel ids for surfaces.left")
            })?;
            let r = cfg.surfaces.right.four_corner().ok_or_else(|| {
                eyre::eyre!("four_corner layout requires explicit channel ids for surfaces.right")
            })?;
            (four_corner_pairs(&l), four_corner_pairs(&r))
        }
    };
    let assignments = ChannelAssignments {
        layout,
        left,
        right,
    };
    assignments.validate()?;
    Ok(assignments)
}

fn six_axis_pairs(ids: &[u16; 7]) -> Vec<(ChannelRole, u16)> {
    SurfaceLayout::SixAxis
        .roles()
        .iter()
        .copied()
        .zip(ids.iter().copied())
        .collect()
}

fn four_corner_pairs(ids: &[u16; 4]) -> Vec<(ChannelRole, u16)> {
    SurfaceLayout::FourCorner
        .roles()
        .iter()
        .copied()
        .zip(ids.iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_axis_defaults_match_the_capture_server() {
        let cfg = plate_config::Config::default();
        let a = assignments_from_config(&cfg).unwrap();
        assert_eq!(a.left.len(), 7);
        assert_eq!(a.left[0], (ChannelRole::Fx, 32));
        assert_eq!(a.left[6], (ChannelRole::Zero, 38));
        assert_eq!(a.right[0], (ChannelRole::Fx, 39));
        assert_eq!(a.right[6], (ChannelRole::Zero, 45));
    }

    #[test]
    fn four_corner_without_ids_is_rejected() {
        let mut cfg = plate_config::Config::default();
        cfg.surfaces.layout = plate_config::LayoutKind::FourCorner;
        assert!(assignments_from_config(&cfg).is_err());
    }
}
