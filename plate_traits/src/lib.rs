/// One event delivered by the device/session layer.
///
/// The motion-capture server interleaves 16-bit DAQ samples across all
/// advertised channels; `Samples` carries the raw bytes untouched so the
/// core owns the decode. Channel metadata may arrive after streaming has
/// already begun.
#[derive(Debug, Clone)]
pub enum DaqEvent {
    /// Device metadata as an option string (e.g. `"channelids=32,33,34"`).
    DeviceInfo { options: String },
    /// A batch of interleaved little-endian 16-bit samples.
    Samples { data: Vec<u8> },
    /// The server finished the session normally.
    Done,
}

/// A connected DAQ/motion-capture session yielding timestamped payloads.
///
/// `next_event` must honor the timeout: a quiet cycle returns `Ok(None)`
/// rather than blocking indefinitely. A returned error is terminal for the
/// session; the caller is expected to stop ingesting and drop the source.
pub trait DaqSource {
    fn next_event(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<Option<DaqEvent>, Box<dyn std::error::Error + Send + Sync>>;
}
