//! Ingest-thread orchestration and snapshot publication.
//!
//! Spawns a thread that owns the `DaqSource` and the `SensorSession`,
//! folds device events into the session, and publishes an immutable
//! snapshot after each fully applied batch. The render side polls
//! `SnapshotRx::latest()` at its own frame rate and always sees a
//! complete, consistent series/metrics pair.
//!
//! Safety: each run spawns exactly one thread that exits when the shutdown
//! flag is set, the source reports done, or the receiver is dropped.

use crossbeam_channel as xch;
use plate_traits::{DaqEvent, DaqSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::{PlateError, Result};
use crate::ingest::{BatchOutcome, IngestState, StreamIngestor};
use crate::session::{SensorSession, SessionSnapshot};

/// Receiving side of the snapshot stream. Keeps the most recent snapshot
/// so a quiet device does not blank the display.
pub struct SnapshotRx {
    rx: xch::Receiver<Arc<SessionSnapshot>>,
    last: Option<Arc<SessionSnapshot>>,
}

impl SnapshotRx {
    /// Latest published snapshot, if any batch has been applied yet.
    pub fn latest(&mut self) -> Option<Arc<SessionSnapshot>> {
        if let Some(snap) = self.rx.try_iter().last() {
            self.last = Some(snap);
        }
        self.last.clone()
    }

    /// Whether the ingest thread still holds its sending end. A snapshot
    /// observed while probing is kept, never lost.
    pub fn is_connected(&mut self) -> bool {
        match self.rx.try_recv() {
            Ok(snap) => {
                self.last = Some(snap);
                true
            }
            Err(xch::TryRecvError::Empty) => true,
            Err(xch::TryRecvError::Disconnected) => false,
        }
    }
}

/// Final accounting returned by the ingest loop on a clean stop.
#[derive(Debug, Clone, Copy)]
pub struct IngestReport {
    pub batches_applied: u64,
    pub batches_dropped: u64,
    pub final_state: IngestState,
}

/// Handle to the running ingest thread.
pub struct IngestHandle {
    join_handle: Option<std::thread::JoinHandle<Result<IngestReport>>>,
    shutdown: Arc<AtomicBool>,
}

impl IngestHandle {
    /// Request a stop and wait for the loop to finish its in-flight cycle.
    pub fn stop(mut self) -> Result<IngestReport> {
        self.shutdown.store(true, Ordering::Relaxed);
        self.join_inner()
    }

    /// Wait for the loop to end on its own (device done or error).
    pub fn join(mut self) -> Result<IngestReport> {
        self.join_inner()
    }

    fn join_inner(&mut self) -> Result<IngestReport> {
        match self.join_handle.take() {
            Some(h) => match h.join() {
                Ok(res) => res,
                Err(_) => Err(PlateError::State("ingest thread panicked".into()).into()),
            },
            None => Err(PlateError::State("ingest thread already joined".into()).into()),
        }
    }
}

impl Drop for IngestHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(h) = self.join_handle.take() {
            match h.join() {
                Ok(Ok(report)) => {
                    tracing::debug!(?report, "ingest thread joined on drop");
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "ingest thread ended with error");
                }
                Err(e) => {
                    tracing::warn!(?e, "ingest thread panicked during shutdown");
                }
            }
        }
    }
}

/// Spawn the ingest loop over `source`, consuming the session.
///
/// `poll_timeout` bounds each device poll; a timeout is a skipped cycle,
/// not an error. The returned shutdown flag may be shared with a signal
/// handler.
pub fn spawn_ingest<D>(
    mut source: D,
    mut session: SensorSession,
    poll_timeout: Duration,
    shutdown: Arc<AtomicBool>,
) -> (SnapshotRx, IngestHandle)
where
    D: DaqSource + Send + 'static,
{
    let (tx, rx) = xch::bounded::<Arc<SessionSnapshot>>(1);
    let shutdown_clone = shutdown.clone();

    let join_handle = std::thread::spawn(move || {
        let mut ingestor = StreamIngestor::new();
        let report = |ing: &StreamIngestor| IngestReport {
            batches_applied: ing.batches_applied(),
            batches_dropped: ing.batches_dropped(),
            final_state: ing.state(),
        };

        loop {
            if shutdown_clone.load(Ordering::Relaxed) {
                tracing::debug!("ingest thread received shutdown signal");
                return Ok(report(&ingestor));
            }

            let event = match source.next_event(poll_timeout) {
                Ok(Some(ev)) => ev,
                Ok(None) => continue, // quiet cycle, not an error
                Err(e) => {
                    // Terminal device error: stop cleanly, propagate.
                    tracing::error!(error = %e, "device session failed");
                    return Err(PlateError::Device(e.to_string()).into());
                }
            };

            match event {
                DaqEvent::DeviceInfo { options } => {
                    if let Err(e) = ingestor.on_device_info(&mut session, &options) {
                        tracing::warn!(error = %e, "ignoring unusable device metadata");
                    }
                }
                DaqEvent::Samples { data } => {
                    if let BatchOutcome::Applied { .. } = ingestor.on_batch(&mut session, &data) {
                        let snap = Arc::new(session.snapshot());
                        // Capacity-1 mailbox: if the renderer has not
                        // drained the previous snapshot yet, skip this one;
                        // the next applied batch re-publishes fresh state.
                        match tx.try_send(snap) {
                            Ok(()) | Err(xch::TrySendError::Full(_)) => {}
                            Err(xch::TrySendError::Disconnected(_)) => {
                                tracing::debug!("snapshot consumer disconnected, exiting");
                                return Ok(report(&ingestor));
                            }
                        }
                    }
                }
                DaqEvent::Done => {
                    tracing::info!("device session done");
                    return Ok(report(&ingestor));
                }
            }
        }
    });

    (
        SnapshotRx { rx, last: None },
        IngestHandle {
            join_handle: Some(join_handle),
            shutdown,
        },
    )
}
