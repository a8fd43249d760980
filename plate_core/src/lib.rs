#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Streaming core for the dual-plate balance display (device-agnostic).
//!
//! This crate turns a high-rate interleaved DAQ stream into per-surface
//! rolling histories, a low-rate smoothed series for plotting, and two
//! normalized balance ratios. All device interaction goes through
//! `plate_traits::DaqSource`.
//!
//! ## Architecture
//!
//! - **Buffers**: fixed-capacity rolling raw histories (`buffer` module)
//! - **Layout**: closed channel-role enums per surface variant (`layout`)
//! - **Downsampling**: non-overlapping block means (`downsample`)
//! - **Metrics**: mean load + lateral/AP ratios (`metrics`)
//! - **Ingest**: payload decode and state machine (`ingest`)
//! - **Session**: owned per-process state, no globals (`session`)
//! - **Runner**: ingest thread + snapshot publication (`runner`)
//!
//! Raw samples stay `i32` DAQ counts end to end; only block means and the
//! derived ratios are floating point, which keeps the hot append path free
//! of per-sample float work.

pub mod buffer;
pub mod conversions;
pub mod downsample;
pub mod error;
pub mod ingest;
pub mod layout;
pub mod metrics;
pub mod mocks;
pub mod params;
pub mod presentation;
pub mod runner;
pub mod session;

pub use buffer::ChannelBuffer;
pub use downsample::Downsampler;
pub use error::{PlateError, Result};
pub use ingest::{BatchOutcome, DropReason, IngestState, StreamIngestor};
pub use layout::{ChannelRole, Surface, SurfaceLayout};
pub use metrics::{BalanceRatios, MetricEstimator, SurfaceMetrics, RATIO_EPS};
pub use params::StreamParams;
pub use session::{DisplaySeries, SensorSession, SessionSnapshot, SurfaceSnapshot};
