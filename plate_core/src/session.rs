//! Process-wide sensor session state.
//!
//! `SensorSession` exclusively owns every rolling buffer, display series,
//! and metrics record for both surfaces. Nothing else holds copies; the
//! ingestor mutates it and readers get immutable snapshots published after
//! each full recompute.

use crate::buffer::ChannelBuffer;
use crate::downsample::Downsampler;
use crate::error::Result;
use crate::layout::{ChannelRole, Surface, SurfaceLayout};
use crate::metrics::{MetricEstimator, SurfaceMetrics};
use crate::params::StreamParams;

/// Role-to-DAQ-channel-id assignments for both surfaces, fixed at startup.
#[derive(Debug, Clone)]
pub struct ChannelAssignments {
    pub layout: SurfaceLayout,
    pub left: Vec<(ChannelRole, u16)>,
    pub right: Vec<(ChannelRole, u16)>,
}

impl ChannelAssignments {
    pub fn for_surface(&self, surface: Surface) -> &[(ChannelRole, u16)] {
        match surface {
            Surface::Left => &self.left,
            Surface::Right => &self.right,
        }
    }

    /// Startup check: every assigned role must belong to the layout and no
    /// channel id may serve two roles.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for surface in Surface::BOTH {
            for (role, id) in self.for_surface(surface) {
                if self.layout.role_index(*role).is_none() {
                    eyre::bail!(
                        "channel role {} does not belong to the configured layout",
                        role.name()
                    );
                }
                if !seen.insert(*id) {
                    eyre::bail!("channel id {id} assigned to more than one role");
                }
            }
        }
        Ok(())
    }
}

/// One rolling raw history per channel role of a surface.
#[derive(Debug, Clone)]
pub struct SurfaceBufferSet {
    layout: SurfaceLayout,
    buffers: Vec<ChannelBuffer>,
}

impl SurfaceBufferSet {
    pub fn zeroed(layout: SurfaceLayout, raw_len: usize) -> Self {
        let buffers = layout
            .roles()
            .iter()
            .map(|_| ChannelBuffer::zeroed(raw_len))
            .collect();
        Self { layout, buffers }
    }

    pub fn layout(&self) -> SurfaceLayout {
        self.layout
    }

    pub fn buffer(&self, role: ChannelRole) -> Option<&ChannelBuffer> {
        self.layout.role_index(role).map(|i| &self.buffers[i])
    }

    pub(crate) fn buffer_mut(&mut self, role: ChannelRole) -> Option<&mut ChannelBuffer> {
        self.layout.role_index(role).map(|i| &mut self.buffers[i])
    }

    fn by_index(&self, idx: usize) -> &ChannelBuffer {
        &self.buffers[idx]
    }
}

/// Display-rate block means per channel role, plus the synthetic mean
/// series averaged across the surface's load-bearing channels.
#[derive(Debug, Clone)]
pub struct DisplaySeries {
    layout: SurfaceLayout,
    channels: Vec<Vec<f32>>,
    mean: Vec<f32>,
}

impl DisplaySeries {
    pub fn zeroed(layout: SurfaceLayout, display_len: usize) -> Self {
        let channels = layout
            .roles()
            .iter()
            .map(|_| vec![0.0; display_len])
            .collect();
        Self {
            layout,
            channels,
            mean: vec![0.0; display_len],
        }
    }

    pub fn layout(&self) -> SurfaceLayout {
        self.layout
    }

    /// Display slots per channel (`M`).
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    pub fn channel(&self, role: ChannelRole) -> Option<&[f32]> {
        self.layout
            .role_index(role)
            .map(|i| self.channels[i].as_slice())
    }

    /// Most recent display value for `role`, if it belongs to the layout.
    pub fn latest(&self, role: ChannelRole) -> Option<f32> {
        self.channel(role).and_then(|s| s.last().copied())
    }

    /// The synthetic mean-load series.
    pub fn mean(&self) -> &[f32] {
        &self.mean
    }

    pub(crate) fn channel_mut_by_index(&mut self, idx: usize) -> &mut [f32] {
        &mut self.channels[idx]
    }

    /// Re-derive the mean series from the load-bearing channels, slot by
    /// slot.
    pub(crate) fn recompute_mean(&mut self) {
        let load_roles = self.layout.load_roles();
        let indices: Vec<usize> = load_roles
            .iter()
            .filter_map(|r| self.layout.role_index(*r))
            .collect();
        let n = indices.len().max(1) as f64;
        for slot in 0..self.mean.len() {
            let sum: f64 = indices
                .iter()
                .map(|&i| f64::from(self.channels[i][slot]))
                .sum();
            self.mean[slot] = (sum / n) as f32;
        }
    }

    #[cfg(test)]
    pub(crate) fn set_latest_for_test(&mut self, role: ChannelRole, value: f32) {
        if let Some(i) = self.layout.role_index(role)
            && let Some(last) = self.channels[i].last_mut()
        {
            *last = value;
        }
    }
}

/// Buffers, display series, and metrics for one surface.
#[derive(Debug, Clone)]
pub struct SurfaceState {
    pub(crate) buffers: SurfaceBufferSet,
    pub display: DisplaySeries,
    pub metrics: SurfaceMetrics,
}

impl SurfaceState {
    /// Read-only access to the raw rolling histories.
    pub fn buffers(&self) -> &SurfaceBufferSet {
        &self.buffers
    }

    fn zeroed(layout: SurfaceLayout, params: &StreamParams) -> Self {
        Self {
            buffers: SurfaceBufferSet::zeroed(layout, params.raw_len()),
            display: DisplaySeries::zeroed(layout, params.display_len()),
            metrics: SurfaceMetrics::default(),
        }
    }

    /// Re-derive display series and metrics from the raw buffers.
    fn recompute(&mut self, ds: &Downsampler, est: &MetricEstimator) {
        let roles = self.buffers.layout().roles();
        for idx in 0..roles.len() {
            let buf = self.buffers.by_index(idx);
            ds.recompute(buf, self.display.channel_mut_by_index(idx));
        }
        self.display.recompute_mean();
        self.metrics = est.recompute(&self.display);
    }
}

/// Owner of all per-process streaming state for both surfaces.
pub struct SensorSession {
    params: StreamParams,
    downsampler: Downsampler,
    estimator: MetricEstimator,
    assignments: ChannelAssignments,
    /// Interleave order of DAQ channel ids, learned from device metadata.
    stream_order: Option<Vec<u16>>,
    left: SurfaceState,
    right: SurfaceState,
}

impl SensorSession {
    /// Create an all-zero session. Fails fast on invalid rate ratios or
    /// channel assignments; nothing here is recoverable at runtime.
    pub fn new(params: StreamParams, assignments: ChannelAssignments) -> Result<Self> {
        params.validate()?;
        assignments.validate()?;
        let layout = assignments.layout;
        Ok(Self {
            params,
            downsampler: Downsampler::new(params.downsample_ratio()),
            estimator: MetricEstimator::new(layout),
            assignments,
            stream_order: None,
            left: SurfaceState::zeroed(layout, &params),
            right: SurfaceState::zeroed(layout, &params),
        })
    }

    pub fn params(&self) -> &StreamParams {
        &self.params
    }

    pub fn layout(&self) -> SurfaceLayout {
        self.assignments.layout
    }

    pub fn assignments(&self) -> &ChannelAssignments {
        &self.assignments
    }

    pub fn stream_order(&self) -> Option<&[u16]> {
        self.stream_order.as_deref()
    }

    pub fn set_stream_order(&mut self, ids: Vec<u16>) {
        self.stream_order = Some(ids);
    }

    pub fn surface(&self, surface: Surface) -> &SurfaceState {
        match surface {
            Surface::Left => &self.left,
            Surface::Right => &self.right,
        }
    }

    pub(crate) fn surface_mut(&mut self, surface: Surface) -> &mut SurfaceState {
        match surface {
            Surface::Left => &mut self.left,
            Surface::Right => &mut self.right,
        }
    }

    /// Downsample every channel of `surface` and refresh its metrics.
    /// Called once per ingested batch, after all appends for the batch.
    pub fn recompute(&mut self, surface: Surface) {
        let ds = self.downsampler;
        let est = self.estimator;
        self.surface_mut(surface).recompute(&ds, &est);
    }

    /// Immutable, internally consistent copy for the presentation side.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            left: SurfaceSnapshot {
                display: self.left.display.clone(),
                metrics: self.left.metrics,
            },
            right: SurfaceSnapshot {
                display: self.right.display.clone(),
                metrics: self.right.metrics,
            },
        }
    }
}

/// Read-only view of one surface for rendering.
#[derive(Debug, Clone)]
pub struct SurfaceSnapshot {
    pub display: DisplaySeries,
    pub metrics: SurfaceMetrics,
}

/// Read-only view of both surfaces, published as a unit so a renderer
/// never observes a half-updated series/metrics pair.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub left: SurfaceSnapshot,
    pub right: SurfaceSnapshot,
}

impl SessionSnapshot {
    pub fn surface(&self, surface: Surface) -> &SurfaceSnapshot {
        match surface {
            Surface::Left => &self.left,
            Surface::Right => &self.right,
        }
    }
}
