//! Fixed-capacity rolling history for one physical channel.

/// Ordered raw samples for a single channel, oldest to newest.
///
/// Length is fixed at construction and never changes; appending `k`
/// samples evicts the `k` oldest. The shift-and-write form is O(N) per
/// call, cheap at kHz rates, and keeps the stored order identical to the
/// externally observed sequence.
#[derive(Debug, Clone)]
pub struct ChannelBuffer {
    samples: Vec<i32>,
}

impl ChannelBuffer {
    /// All-zero history of exactly `len` samples.
    pub fn zeroed(len: usize) -> Self {
        Self {
            samples: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The full history, oldest first.
    pub fn as_slice(&self) -> &[i32] {
        &self.samples
    }

    /// Most recent sample.
    pub fn latest(&self) -> i32 {
        self.samples.last().copied().unwrap_or(0)
    }

    /// Append `batch` in order, discarding the oldest `batch.len()` values.
    ///
    /// A batch larger than capacity keeps only its most recent values; the
    /// overflow is silently discarded, matching the roll semantics of the
    /// raw history.
    pub fn append(&mut self, batch: &[i32]) {
        let n = self.samples.len();
        if n == 0 {
            return;
        }
        let k = batch.len();
        if k >= n {
            self.samples.copy_from_slice(&batch[k - n..]);
            return;
        }
        self.samples.copy_within(k.., 0);
        self.samples[n - k..].copy_from_slice(batch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed_at_fixed_length() {
        let b = ChannelBuffer::zeroed(8);
        assert_eq!(b.len(), 8);
        assert!(b.as_slice().iter().all(|&v| v == 0));
        assert_eq!(b.latest(), 0);
    }

    #[test]
    fn append_keeps_fifo_order() {
        let mut b = ChannelBuffer::zeroed(5);
        b.append(&[1, 2]);
        b.append(&[3]);
        assert_eq!(b.as_slice(), &[0, 0, 1, 2, 3]);
        assert_eq!(b.latest(), 3);
    }

    #[test]
    fn oversized_batch_keeps_most_recent() {
        let mut b = ChannelBuffer::zeroed(4);
        b.append(&[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(b.as_slice(), &[4, 5, 6, 7]);
    }

    #[test]
    fn batch_exactly_at_capacity_replaces_all() {
        let mut b = ChannelBuffer::zeroed(3);
        b.append(&[9, 8, 7]);
        assert_eq!(b.as_slice(), &[9, 8, 7]);
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let mut b = ChannelBuffer::zeroed(3);
        b.append(&[1, 2, 3]);
        b.append(&[]);
        assert_eq!(b.as_slice(), &[1, 2, 3]);
    }
}
