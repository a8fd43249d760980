use std::f32::consts::TAU;
use std::time::Duration;

use plate_traits::{DaqEvent, DaqSource};

use crate::error::DaqError;

/// Default six-axis channel ids: 32..=38 left plate, 39..=45 right plate.
pub const DEFAULT_SIX_AXIS_IDS: [u16; 14] =
    [32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45];

/// Which per-plate channel roles the simulated frames carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelPlan {
    /// Seven channels per plate: forces, moments, and the padding channel.
    SixAxis,
    /// Four vertical corner loads per plate.
    FourCorner,
}

impl ChannelPlan {
    fn channels_per_plate(self) -> usize {
        match self {
            ChannelPlan::SixAxis => 7,
            ChannelPlan::FourCorner => 4,
        }
    }
}

/// A scripted dual-plate session with gait-like load transfer.
///
/// Emits one `DeviceInfo` event carrying the channel-id option string, then
/// interleaved little-endian i16 batches. Vertical load shifts smoothly
/// between the left and right plate with a configurable stride period, so
/// the downstream ratios sweep the full lateral range. In six-axis mode the
/// moment channels stay zero and the horizontal channels carry a small sway
/// so the plots are not flat lines; in four-corner mode the plate load rocks
/// between the front and back corner pairs.
pub struct SimulatedDaq {
    channel_ids: Vec<u16>,
    plan: ChannelPlan,
    sample_rate_hz: u32,
    samples_per_batch: usize,
    stride_period_s: f32,
    peak_load: i16,
    batches_remaining: Option<u64>,
    fail_after: Option<u64>,
    paced: bool,
    sent_info: bool,
    done: bool,
    sample_index: u64,
}

impl SimulatedDaq {
    /// A six-axis session on the default channel ids.
    ///
    /// `batches` bounds the session length; `None` streams until stopped.
    pub fn six_axis(sample_rate_hz: u32, samples_per_batch: usize, batches: Option<u64>) -> Self {
        Self::with_plan(
            DEFAULT_SIX_AXIS_IDS.to_vec(),
            ChannelPlan::SixAxis,
            sample_rate_hz,
            samples_per_batch,
            batches,
        )
    }

    /// A four-corner session on the given per-plate corner ids, each in
    /// frontleft, frontright, backleft, backright order.
    pub fn four_corner(
        left: [u16; 4],
        right: [u16; 4],
        sample_rate_hz: u32,
        samples_per_batch: usize,
        batches: Option<u64>,
    ) -> Self {
        let ids = left.iter().chain(right.iter()).copied().collect();
        Self::with_plan(
            ids,
            ChannelPlan::FourCorner,
            sample_rate_hz,
            samples_per_batch,
            batches,
        )
    }

    fn with_plan(
        channel_ids: Vec<u16>,
        plan: ChannelPlan,
        sample_rate_hz: u32,
        samples_per_batch: usize,
        batches: Option<u64>,
    ) -> Self {
        SimulatedDaq {
            channel_ids,
            plan,
            sample_rate_hz: sample_rate_hz.max(1),
            samples_per_batch: samples_per_batch.max(1),
            stride_period_s: 2.0,
            peak_load: 4000,
            batches_remaining: batches,
            fail_after: None,
            paced: false,
            sent_info: false,
            done: false,
            sample_index: 0,
        }
    }

    /// Sleep one batch period per `Samples` event so a live render loop
    /// sees data arrive at wall-clock rate.
    pub fn paced(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    /// Drop the session with a peer-closed error after this many batches.
    /// Exercises the terminal-error path in consumers.
    pub fn fail_after(mut self, batches: u64) -> Self {
        self.fail_after = Some(batches);
        self
    }

    pub fn stride_period(mut self, seconds: f32) -> Self {
        self.stride_period_s = seconds.max(0.1);
        self
    }

    pub fn peak_load(mut self, counts: i16) -> Self {
        self.peak_load = counts;
        self
    }

    fn options_string(&self) -> String {
        let ids: Vec<String> = self.channel_ids.iter().map(|id| id.to_string()).collect();
        format!("channelids={}", ids.join(","))
    }

    /// Fraction of total load on the left plate at sample `t`, in [0, 1].
    fn left_share(&self, t: u64) -> f32 {
        let period = self.stride_period_s * self.sample_rate_hz as f32;
        let phase = TAU * (t as f32 / period);
        0.5 * (1.0 + phase.sin())
    }

    fn sample_for(&self, t: u64, pos: usize) -> i16 {
        let cpp = self.plan.channels_per_plate();
        let share = self.left_share(t);
        let plate_share = if pos < cpp { share } else { 1.0 - share };
        let peak = f32::from(self.peak_load);
        match self.plan {
            ChannelPlan::SixAxis => match pos % cpp {
                // f_x, f_y: shear sway at twice the stride rate
                0 | 1 => {
                    let period = 0.5 * self.stride_period_s * self.sample_rate_hz as f32;
                    let sway = (TAU * (t as f32 / period)).sin();
                    (0.05 * peak * plate_share * sway) as i16
                }
                // f_z carries the transferred vertical load
                2 => (peak * plate_share) as i16,
                // moments and the padding channel stay quiet
                _ => 0,
            },
            ChannelPlan::FourCorner => {
                // plate load rocks between the front and back corner pairs
                // at twice the stride rate
                let period = 0.5 * self.stride_period_s * self.sample_rate_hz as f32;
                let front = 0.5 + 0.2 * (TAU * (t as f32 / period)).sin();
                let corner_share = match pos % cpp {
                    0 | 1 => front / 2.0,
                    _ => (1.0 - front) / 2.0,
                };
                (peak * plate_share * corner_share) as i16
            }
        }
    }

    fn next_batch(&mut self) -> Vec<u8> {
        let n_ch = self.channel_ids.len();
        let mut data = Vec::with_capacity(2 * n_ch * self.samples_per_batch);
        for p in 0..self.samples_per_batch {
            let t = self.sample_index + p as u64;
            for pos in 0..n_ch {
                data.extend_from_slice(&self.sample_for(t, pos).to_le_bytes());
            }
        }
        self.sample_index += self.samples_per_batch as u64;
        data
    }
}

impl DaqSource for SimulatedDaq {
    fn next_event(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<DaqEvent>, Box<dyn std::error::Error + Send + Sync>> {
        if self.done {
            return Ok(Some(DaqEvent::Done));
        }
        if !self.sent_info {
            self.sent_info = true;
            let options = self.options_string();
            tracing::debug!(%options, "simulated daq advertising channels");
            return Ok(Some(DaqEvent::DeviceInfo { options }));
        }
        if let Some(fail) = &mut self.fail_after {
            if *fail == 0 {
                tracing::debug!(samples = self.sample_index, "simulated daq injected fault");
                return Err(Box::new(DaqError::SessionClosed));
            }
            *fail -= 1;
        }
        if let Some(remaining) = &mut self.batches_remaining {
            if *remaining == 0 {
                self.done = true;
                tracing::debug!(samples = self.sample_index, "simulated daq finished");
                return Ok(Some(DaqEvent::Done));
            }
            *remaining -= 1;
        }
        if self.paced {
            let batch_period = Duration::from_secs_f64(
                self.samples_per_batch as f64 / f64::from(self.sample_rate_hz),
            );
            std::thread::sleep(batch_period.min(timeout));
        }
        Ok(Some(DaqEvent::Samples {
            data: self.next_batch(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_transfer_conserves_total() {
        let daq = SimulatedDaq::six_axis(1000, 10, None);
        // left f_z + right f_z stays within rounding of the peak
        for t in [0, 250, 500, 999, 1750] {
            let left = daq.sample_for(t, 2) as i32;
            let right = daq.sample_for(t, 2 + 7) as i32;
            let total = left + right;
            assert!((total - 4000).abs() <= 2, "t={t}: {left}+{right}");
            assert!(left >= 0 && right >= 0);
        }
    }

    #[test]
    fn corner_loads_conserve_total() {
        let daq = SimulatedDaq::four_corner(
            [10, 11, 12, 13],
            [14, 15, 16, 17],
            1000,
            10,
            None,
        );
        for t in [0, 250, 500, 999, 1750] {
            let total: i32 = (0..8).map(|pos| daq.sample_for(t, pos) as i32).sum();
            assert!((total - 4000).abs() <= 8, "t={t}: {total}");
        }
    }

    #[test]
    fn moment_channels_stay_zero() {
        let daq = SimulatedDaq::six_axis(1000, 10, None);
        for pos in [3, 4, 5, 6, 10, 11, 12, 13] {
            assert_eq!(daq.sample_for(123, pos), 0);
        }
    }
}
