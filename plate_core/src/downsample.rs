//! Block-average downsampling from raw rate to display rate.

use crate::buffer::ChannelBuffer;

/// Reduces an N-sample raw history to M display slots by averaging
/// contiguous, non-overlapping blocks of `ratio` samples, oldest block
/// first.
///
/// The ratio is fixed at construction; callers guarantee (via
/// `StreamParams::validate`) that every buffer it sees divides evenly.
#[derive(Debug, Clone, Copy)]
pub struct Downsampler {
    ratio: usize,
}

impl Downsampler {
    pub fn new(ratio: usize) -> Self {
        debug_assert!(ratio > 0, "downsample ratio must be positive");
        Self { ratio: ratio.max(1) }
    }

    pub fn ratio(&self) -> usize {
        self.ratio
    }

    /// Recompute the display series for one channel in place.
    ///
    /// `out.len() * ratio` must equal the buffer length; this is a startup
    /// invariant, not a runtime case.
    pub fn recompute(&self, buffer: &ChannelBuffer, out: &mut [f32]) {
        let raw = buffer.as_slice();
        debug_assert_eq!(raw.len(), out.len() * self.ratio);
        for (slot, block) in out.iter_mut().zip(raw.chunks_exact(self.ratio)) {
            let sum: i64 = block.iter().map(|&v| i64::from(v)).sum();
            *slot = (sum as f64 / self.ratio as f64) as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_buffer_yields_exact_constant_slots() {
        let mut b = ChannelBuffer::zeroed(12);
        b.append(&[7; 12]);
        let ds = Downsampler::new(4);
        let mut out = [0.0f32; 3];
        ds.recompute(&b, &mut out);
        assert_eq!(out, [7.0, 7.0, 7.0]);
    }

    #[test]
    fn blocks_average_oldest_first() {
        let mut b = ChannelBuffer::zeroed(6);
        b.append(&[1, 2, 3, 4, 5, 6]);
        let ds = Downsampler::new(3);
        let mut out = [0.0f32; 2];
        ds.recompute(&b, &mut out);
        assert_eq!(out, [2.0, 5.0]);
    }

    #[test]
    fn recompute_is_idempotent_without_new_data() {
        let mut b = ChannelBuffer::zeroed(10);
        b.append(&[3, 1, 4, 1, 5, 9, 2, 6, 5, 3]);
        let ds = Downsampler::new(2);
        let mut first = [0.0f32; 5];
        let mut second = [0.0f32; 5];
        ds.recompute(&b, &mut first);
        ds.recompute(&b, &mut second);
        assert_eq!(first, second);
    }

    #[test]
    fn negative_samples_average_correctly() {
        let mut b = ChannelBuffer::zeroed(4);
        b.append(&[-10, 10, -3, -5]);
        let ds = Downsampler::new(2);
        let mut out = [0.0f32; 2];
        ds.recompute(&b, &mut out);
        assert_eq!(out, [0.0, -4.0]);
    }
}
