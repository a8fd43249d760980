//! Stream execution: config mapping, session assembly, and the render-side
//! polling loop over the snapshot mailbox.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use plate_core::conversions::assignments_from_config;
use plate_core::error::Result as CoreResult;
use plate_core::presentation::{ScreenLayout, load_marker};
use plate_core::runner::{IngestReport, spawn_ingest};
use plate_core::{SensorSession, SessionSnapshot, StreamParams, Surface};
use plate_daq::SimulatedDaq;
use plate_traits::DaqEvent;

use crate::cli::RtLock;
use crate::rt::setup_rt_once;

pub struct RunOpts {
    pub duration_secs: Option<u64>,
    pub batches: Option<u64>,
    pub paced: bool,
    pub json: bool,
    pub rt: bool,
    pub rt_prio: Option<i32>,
    pub rt_lock: Option<RtLock>,
    pub rt_cpu: Option<usize>,
}

/// Run the ingest thread over a simulated dual-plate session and poll its
/// snapshots at the configured frame rate, emitting one telemetry line per
/// second until the stream ends or `shutdown` is raised.
pub fn run_stream(
    cfg: &plate_config::Config,
    opts: &RunOpts,
    shutdown: Arc<AtomicBool>,
) -> CoreResult<IngestReport> {
    #[cfg(target_os = "linux")]
    {
        let mode = opts.rt_lock.unwrap_or(RtLock::os_default());
        setup_rt_once(opts.rt, opts.rt_prio, mode, opts.rt_cpu);
    }
    #[cfg(target_os = "macos")]
    {
        let mode = opts.rt_lock.unwrap_or(RtLock::os_default());
        setup_rt_once(opts.rt, mode);
    }

    let params: StreamParams = (&cfg.stream).into();
    let assignments = assignments_from_config(cfg)?;
    let session = SensorSession::new(params, assignments)?;

    // One batch per display cycle keeps the simulator aligned with the
    // downsample grid.
    let samples_per_batch = (cfg.stream.sample_rate_hz / cfg.stream.display_rate_hz) as usize;
    let batch_limit = opts.batches.or_else(|| {
        opts.duration_secs
            .map(|secs| secs * u64::from(cfg.stream.display_rate_hz))
    });
    let source = sim_source(cfg, samples_per_batch, batch_limit)?.paced(opts.paced);

    let poll_timeout = Duration::from_millis(cfg.daq.poll_timeout_ms);
    let (mut rx, handle) = spawn_ingest(source, session, poll_timeout, shutdown.clone());

    // Validated config guarantees a non-zero frame rate.
    let frame_period = Duration::from_secs_f64(1.0 / f64::from(cfg.render.frame_rate_hz));
    let view = ViewCtx {
        layout: ScreenLayout::new(
            cfg.render.screen_width as f32,
            cfg.render.screen_height as f32,
        ),
        threshold: cfg.force.threshold_n,
        json: opts.json,
    };
    let mut last_emit = Instant::now();
    tracing::info!(
        sample_rate_hz = cfg.stream.sample_rate_hz,
        display_rate_hz = cfg.stream.display_rate_hz,
        frame_rate_hz = cfg.render.frame_rate_hz,
        "stream started"
    );

    let report = loop {
        if shutdown.load(Ordering::Relaxed) {
            break handle.stop()?;
        }
        if !rx.is_connected() {
            break handle.join()?;
        }
        std::thread::sleep(frame_period);
        if let Some(snap) = rx.latest()
            && last_emit.elapsed() >= Duration::from_secs(1)
        {
            emit_telemetry(&snap, &view);
            last_emit = Instant::now();
        }
    };

    if let Some(snap) = rx.latest() {
        emit_telemetry(&snap, &view);
    }
    tracing::info!(
        batches_applied = report.batches_applied,
        batches_dropped = report.batches_dropped,
        final_state = ?report.final_state,
        "stream finished"
    );
    Ok(report)
}

/// Build a simulated source matching the configured surface layout, so a
/// four-corner config streams on its own corner ids.
fn sim_source(
    cfg: &plate_config::Config,
    samples_per_batch: usize,
    batches: Option<u64>,
) -> CoreResult<SimulatedDaq> {
    let source = match cfg.surfaces.layout {
        plate_config::LayoutKind::SixAxis => {
            SimulatedDaq::six_axis(cfg.stream.sample_rate_hz, samples_per_batch, batches)
        }
        plate_config::LayoutKind::FourCorner => {
            let corners = |side: &plate_config::ChannelIds, name: &str| {
                side.four_corner().ok_or_else(|| {
                    plate_core::PlateError::Config(format!(
                        "four_corner layout requires explicit channel ids for surfaces.{name}"
                    ))
                })
            };
            let left = corners(&cfg.surfaces.left, "left")?;
            let right = corners(&cfg.surfaces.right, "right")?;
            SimulatedDaq::four_corner(
                left,
                right,
                cfg.stream.sample_rate_hz,
                samples_per_batch,
                batches,
            )
        }
    };
    Ok(source)
}

struct ViewCtx {
    layout: ScreenLayout,
    threshold: f32,
    json: bool,
}

fn emit_telemetry(snap: &SessionSnapshot, view: &ViewCtx) {
    let left = &snap.surface(Surface::Left).metrics;
    let right = &snap.surface(Surface::Right).metrics;
    let left_marker = load_marker(left, &view.layout.left_plate, view.threshold);
    let right_marker = load_marker(right, &view.layout.right_plate, view.threshold);
    if view.json {
        let balance = |m: &plate_core::SurfaceMetrics| {
            m.balance.map(|b| {
                serde_json::json!({
                    "lateral": b.lateral,
                    "anterior_posterior": b.anterior_posterior,
                })
            })
        };
        let marker = |m: Option<(f32, f32)>| m.map(|(x, y)| serde_json::json!([x, y]));
        let line = serde_json::json!({
            "left_load": left.mean_load,
            "right_load": right.mean_load,
            "left_balance": balance(left),
            "right_balance": balance(right),
            "left_marker": marker(left_marker),
            "right_marker": marker(right_marker),
        });
        println!("{line}");
    } else {
        println!(
            "load L={:.1} R={:.1}  balance L={}  R={}",
            left.mean_load,
            right.mean_load,
            fmt_balance(left),
            fmt_balance(right)
        );
    }
}

fn fmt_balance(m: &plate_core::SurfaceMetrics) -> String {
    match m.balance {
        Some(b) => format!("({:.2}, {:.2})", b.lateral, b.anterior_posterior),
        None => "n/a".to_string(),
    }
}

/// A device this quiet is a dead session, not a slow one.
const SELF_CHECK_MAX_QUIET_POLLS: u32 = 50;

/// Push one simulated batch through a fresh session without spawning the
/// ingest thread. Proves the config maps to a working pipeline.
pub fn self_check(cfg: &plate_config::Config) -> CoreResult<()> {
    let samples_per_batch = (cfg.stream.sample_rate_hz / cfg.stream.display_rate_hz) as usize;
    let source = sim_source(cfg, samples_per_batch, Some(1))?;
    self_check_with(cfg, source)
}

fn self_check_with<D: plate_traits::DaqSource>(
    cfg: &plate_config::Config,
    mut source: D,
) -> CoreResult<()> {
    use plate_core::{BatchOutcome, StreamIngestor};

    let params: StreamParams = (&cfg.stream).into();
    let assignments = assignments_from_config(cfg)?;
    let mut session = SensorSession::new(params, assignments)?;

    let mut ingestor = StreamIngestor::new();
    let timeout = Duration::from_millis(cfg.daq.poll_timeout_ms);
    let mut quiet_polls = 0u32;

    loop {
        match source.next_event(timeout) {
            Ok(Some(DaqEvent::DeviceInfo { options })) => {
                ingestor.on_device_info(&mut session, &options)?;
            }
            Ok(Some(DaqEvent::Samples { data })) => {
                match ingestor.on_batch(&mut session, &data) {
                    BatchOutcome::Applied { points } => {
                        tracing::debug!(points, "self-check batch applied");
                    }
                    BatchOutcome::Dropped(reason) => {
                        return Err(plate_core::PlateError::Decode(format!(
                            "self-check batch dropped: {reason:?}"
                        ))
                        .into());
                    }
                }
            }
            Ok(Some(DaqEvent::Done)) => break,
            Ok(None) => {
                quiet_polls += 1;
                if quiet_polls > SELF_CHECK_MAX_QUIET_POLLS {
                    return Err(plate_core::PlateError::Timeout.into());
                }
            }
            Err(e) => return Err(plate_core::PlateError::Device(e.to_string()).into()),
        }
    }

    let snap = session.snapshot();
    let left = &snap.surface(Surface::Left).metrics;
    println!("self-check ok (left mean load {:.1})", left.mean_load);
    Ok(())
}
