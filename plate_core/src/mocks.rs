//! Test and helper mocks for plate_core.

use plate_traits::{DaqEvent, DaqSource};
use std::collections::VecDeque;
use std::time::Duration;

/// A source that replays a scripted sequence of events, then reports done.
/// `None` entries simulate a quiet poll cycle.
pub struct ScriptedDaq {
    events: VecDeque<Option<DaqEvent>>,
}

impl ScriptedDaq {
    pub fn new(events: impl IntoIterator<Item = Option<DaqEvent>>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    /// Convenience: every entry is a real event, no quiet cycles.
    pub fn of_events(events: impl IntoIterator<Item = DaqEvent>) -> Self {
        Self::new(events.into_iter().map(Some))
    }
}

impl DaqSource for ScriptedDaq {
    fn next_event(
        &mut self,
        _timeout: Duration,
    ) -> Result<Option<DaqEvent>, Box<dyn std::error::Error + Send + Sync>> {
        match self.events.pop_front() {
            Some(ev) => Ok(ev),
            None => Ok(Some(DaqEvent::Done)),
        }
    }
}

/// A source whose first poll fails terminally; for error-path tests.
pub struct FailingDaq;

impl DaqSource for FailingDaq {
    fn next_event(
        &mut self,
        _timeout: Duration,
    ) -> Result<Option<DaqEvent>, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("daq connection lost")))
    }
}

/// Pack per-channel values into one interleaved little-endian 16-bit
/// payload with `points` samples per channel. `values[ch][p]` is the
/// p-th sample of the ch-th stream channel.
pub fn interleave_payload(values: &[Vec<i16>]) -> Vec<u8> {
    let points = values.first().map_or(0, Vec::len);
    debug_assert!(values.iter().all(|v| v.len() == points));
    let mut data = Vec::with_capacity(2 * points * values.len());
    for p in 0..points {
        for ch in values {
            data.extend_from_slice(&ch[p].to_le_bytes());
        }
    }
    data
}
