//! Payload decode and ingest orchestration.
//!
//! One `on_batch` call per device payload: decode the interleaved 16-bit
//! samples, append one value per channel into the matching rolling buffer,
//! then recompute the display series and metrics of every touched surface.
//! Malformed payloads and the channel-metadata startup race are transient:
//! the batch is dropped, logged, and the pipeline continues.

use crate::error::{PlateError, Result};
use crate::layout::Surface;
use crate::session::SensorSession;

/// Ingest lifecycle. Transitions only move forward:
/// `Uninitialized → ChannelsKnown` on device metadata,
/// `ChannelsKnown → Streaming` on the first successfully decoded batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    Uninitialized,
    ChannelsKnown,
    Streaming,
}

/// Why a batch was dropped instead of applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Channel metadata has not arrived yet (recoverable startup race).
    NoChannelInfo,
    /// Zero-length payload.
    EmptyPayload,
    /// Payload byte count is not a whole number of 16-bit samples.
    OddPayload,
    /// Sample count is not a multiple of the advertised channel count.
    Misaligned,
}

/// Result of one `on_batch` call. Never an error: transient failures are
/// absorbed here by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Batch decoded and applied; `points` samples were appended per
    /// channel.
    Applied { points: usize },
    Dropped(DropReason),
}

/// Parse the `channelids=` entry of a DAQ device option string, e.g.
/// `"rate=1000 channelids=32,33,,34"`. Empty list entries are skipped.
pub fn parse_channel_ids(options: &str) -> Result<Vec<u16>> {
    let list = options
        .split_whitespace()
        .filter_map(|kv| kv.split_once('='))
        .find(|(k, _)| *k == "channelids")
        .map(|(_, v)| v)
        .ok_or_else(|| PlateError::Decode("channelids entry not found".into()))?;

    let mut ids = Vec::new();
    for part in list.split(',').filter(|p| !p.is_empty()) {
        let id: u16 = part
            .parse()
            .map_err(|_| PlateError::Decode(format!("bad channel id '{part}'")))?;
        ids.push(id);
    }
    if ids.is_empty() {
        return Err(PlateError::Decode("channelids list is empty".into()).into());
    }
    Ok(ids)
}

/// Drives the session from raw device events.
#[derive(Debug)]
pub struct StreamIngestor {
    state: IngestState,
    applied: u64,
    dropped: u64,
}

impl Default for StreamIngestor {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamIngestor {
    pub fn new() -> Self {
        Self {
            state: IngestState::Uninitialized,
            applied: 0,
            dropped: 0,
        }
    }

    pub fn state(&self) -> IngestState {
        self.state
    }

    pub fn batches_applied(&self) -> u64 {
        self.applied
    }

    pub fn batches_dropped(&self) -> u64 {
        self.dropped
    }

    /// Learn the stream interleave order from device metadata. Refreshes
    /// are accepted until the first batch is applied; once samples are
    /// streaming a late metadata event is rejected instead of rewiring
    /// live buffers. A failure is transient; the caller logs it and the
    /// state is unchanged.
    pub fn on_device_info(&mut self, session: &mut SensorSession, options: &str) -> Result<()> {
        if self.state == IngestState::Streaming {
            tracing::warn!("channel metadata arrived mid-stream; keeping existing order");
            return Err(
                PlateError::State("channel metadata refresh after streaming started".into())
                    .into(),
            );
        }
        let ids = parse_channel_ids(options)?;
        tracing::info!(channels = ids.len(), "channel metadata received");
        session.set_stream_order(ids);
        if self.state == IngestState::Uninitialized {
            self.state = IngestState::ChannelsKnown;
        }
        Ok(())
    }

    /// Decode one interleaved payload and fold it into the session.
    ///
    /// Transient failures never escape: the batch is dropped, counted,
    /// and logged, leaving buffers and state untouched.
    pub fn on_batch(&mut self, session: &mut SensorSession, data: &[u8]) -> BatchOutcome {
        let Some(order) = session.stream_order() else {
            tracing::warn!("no channel information yet; dropping batch");
            return self.drop_batch(DropReason::NoChannelInfo);
        };
        let order = order.to_vec();

        if data.is_empty() {
            tracing::debug!("empty payload dropped");
            return self.drop_batch(DropReason::EmptyPayload);
        }
        if !data.len().is_multiple_of(2) {
            tracing::warn!(bytes = data.len(), "payload is not whole 16-bit samples");
            return self.drop_batch(DropReason::OddPayload);
        }
        let num_samples = data.len() / 2;
        let n_ch = order.len();
        if !num_samples.is_multiple_of(n_ch) {
            tracing::warn!(
                samples = num_samples,
                channels = n_ch,
                "sample count not aligned to channel count"
            );
            return self.drop_batch(DropReason::Misaligned);
        }
        let points = num_samples / n_ch;

        let mut batch = Vec::with_capacity(points);
        for surface in Surface::BOTH {
            let pairs = session.assignments().for_surface(surface).to_vec();
            let mut touched = false;
            for (role, id) in pairs {
                let Some(pos) = order.iter().position(|&c| c == id) else {
                    // Configured channel not in the stream; it simply never
                    // updates. The remaining channels still do.
                    tracing::debug!(id, role = role.name(), "channel id absent from stream");
                    continue;
                };
                batch.clear();
                for p in 0..points {
                    let off = 2 * (p * n_ch + pos);
                    let v = i16::from_le_bytes([data[off], data[off + 1]]);
                    batch.push(i32::from(v));
                }
                if let Some(buf) = session.surface_mut(surface).buffers.buffer_mut(role) {
                    buf.append(&batch);
                    touched = true;
                }
            }
            if touched {
                session.recompute(surface);
            }
        }

        if self.state != IngestState::Streaming {
            tracing::info!(points, "first batch decoded; streaming");
            self.state = IngestState::Streaming;
        }
        self.applied += 1;
        BatchOutcome::Applied { points }
    }

    fn drop_batch(&mut self, reason: DropReason) -> BatchOutcome {
        self.dropped += 1;
        BatchOutcome::Dropped(reason)
    }
}
