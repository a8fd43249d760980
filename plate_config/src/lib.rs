#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and channel-map parsing for the balance-plate streamer.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The channel-map CSV loader enforces headers and rejects duplicate
//!   (surface, role) assignments before they reach the core.
use serde::Deserialize;

/// Which physical sensor set a surface carries.
///
/// `SixAxis` is a force/moment transducer (plus the vendor's padding
/// channel); `FourCorner` is four independent corner load cells.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    #[default]
    SixAxis,
    FourCorner,
}

/// Stream rates and rolling history length.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct StreamCfg {
    /// Raw ingest rate in Hz.
    pub sample_rate_hz: u32,
    /// Smoothed series rate in Hz. Must divide `sample_rate_hz` evenly.
    pub display_rate_hz: u32,
    /// Rolling history per channel in seconds.
    pub history_secs: u32,
}

impl Default for StreamCfg {
    fn default() -> Self {
        Self {
            sample_rate_hz: 1000,
            display_rate_hz: 10,
            history_secs: 10,
        }
    }
}

/// Per-surface DAQ channel-id assignments.
///
/// Only the fields matching the configured layout are consulted. The
/// six-axis fields fall back to the ids the capture server has always
/// advertised (32..=38 left, 39..=45 right); corner cells have no such
/// convention and must be assigned explicitly.
#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(default)]
pub struct ChannelIds {
    pub f_x: Option<u16>,
    pub f_y: Option<u16>,
    pub f_z: Option<u16>,
    pub m_x: Option<u16>,
    pub m_y: Option<u16>,
    pub m_z: Option<u16>,
    pub zero: Option<u16>,
    pub frontleft: Option<u16>,
    pub frontright: Option<u16>,
    pub backleft: Option<u16>,
    pub backright: Option<u16>,
}

impl ChannelIds {
    /// Ids for the six-axis layout in role order, with per-surface defaults.
    pub fn six_axis(&self, base: u16) -> [u16; 7] {
        [
            self.f_x.unwrap_or(base),
            self.f_y.unwrap_or(base + 1),
            self.f_z.unwrap_or(base + 2),
            self.m_x.unwrap_or(base + 3),
            self.m_y.unwrap_or(base + 4),
            self.m_z.unwrap_or(base + 5),
            self.zero.unwrap_or(base + 6),
        ]
    }

    /// Ids for the four-corner layout in role order, if fully assigned.
    pub fn four_corner(&self) -> Option<[u16; 4]> {
        Some([
            self.frontleft?,
            self.frontright?,
            self.backleft?,
            self.backright?,
        ])
    }
}

/// Default six-axis channel-id base for the left surface.
pub const LEFT_SIX_AXIS_BASE: u16 = 32;
/// Default six-axis channel-id base for the right surface.
pub const RIGHT_SIX_AXIS_BASE: u16 = 39;

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(default)]
pub struct SurfacesCfg {
    pub layout: LayoutKind,
    pub left: ChannelIds,
    pub right: ChannelIds,
}

/// Force normalization and marker visibility.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct ForceCfg {
    /// Full-scale force in Newtons used to normalize plot heights.
    pub max_n: f32,
    /// Minimum mean load in Newtons before the load marker is shown.
    pub threshold_n: f32,
}

impl Default for ForceCfg {
    fn default() -> Self {
        Self {
            max_n: 5000.0,
            threshold_n: 100.0,
        }
    }
}

/// Presentation geometry consumed by the snapshot-to-pixels mapping.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct RenderCfg {
    pub frame_rate_hz: u32,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl Default for RenderCfg {
    fn default() -> Self {
        Self {
            frame_rate_hz: 60,
            screen_width: 600,
            screen_height: 600,
        }
    }
}

/// Device/session connection settings.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DaqCfg {
    /// Capture server address.
    pub server: String,
    /// Max wait per event poll (ms). A quiet poll is a skipped cycle.
    pub poll_timeout_ms: u64,
}

impl Default for DaqCfg {
    fn default() -> Self {
        Self {
            server: "192.168.1.230".to_string(),
            poll_timeout_ms: 20,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub stream: StreamCfg,
    pub surfaces: SurfacesCfg,
    pub force: ForceCfg,
    pub render: RenderCfg,
    pub daq: DaqCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Stream rates
        if self.stream.sample_rate_hz == 0 {
            eyre::bail!("stream.sample_rate_hz must be > 0");
        }
        if self.stream.display_rate_hz == 0 {
            eyre::bail!("stream.display_rate_hz must be > 0");
        }
        if self.stream.display_rate_hz > self.stream.sample_rate_hz {
            eyre::bail!("stream.display_rate_hz must not exceed stream.sample_rate_hz");
        }
        if !self
            .stream
            .sample_rate_hz
            .is_multiple_of(self.stream.display_rate_hz)
        {
            eyre::bail!(
                "stream.sample_rate_hz ({}) must be evenly divisible by stream.display_rate_hz ({})",
                self.stream.sample_rate_hz,
                self.stream.display_rate_hz
            );
        }
        if self.stream.history_secs == 0 {
            eyre::bail!("stream.history_secs must be >= 1");
        }
        if self.stream.history_secs > 600 {
            eyre::bail!("stream.history_secs is unreasonably large (>10min)");
        }

        // Channel assignments for the chosen layout
        let ids = self.resolved_channel_ids()?;
        let mut seen = std::collections::BTreeSet::new();
        for id in &ids {
            if !seen.insert(*id) {
                eyre::bail!("channel id {id} assigned to more than one (surface, role)");
            }
        }

        // Force
        if !(self.force.max_n.is_finite() && self.force.max_n > 0.0) {
            eyre::bail!("force.max_n must be a positive finite value");
        }
        if !(self.force.threshold_n.is_finite() && self.force.threshold_n >= 0.0) {
            eyre::bail!("force.threshold_n must be >= 0");
        }

        // Render
        if self.render.frame_rate_hz == 0 {
            eyre::bail!("render.frame_rate_hz must be > 0");
        }
        if self.render.screen_width == 0 || self.render.screen_height == 0 {
            eyre::bail!("render screen dimensions must be > 0");
        }

        // Daq
        if self.daq.server.is_empty() {
            eyre::bail!("daq.server must not be empty");
        }
        if self.daq.poll_timeout_ms == 0 {
            eyre::bail!("daq.poll_timeout_ms must be >= 1");
        }

        Ok(())
    }

    /// All configured channel ids for the active layout, left then right,
    /// each surface in role order. Fails when a four-corner surface is
    /// missing explicit assignments.
    pub fn resolved_channel_ids(&self) -> eyre::Result<Vec<u16>> {
        match self.surfaces.layout {
            LayoutKind::SixAxis => {
                let mut out = Vec::with_capacity(14);
                out.extend(self.surfaces.left.six_axis(LEFT_SIX_AXIS_BASE));
                out.extend(self.surfaces.right.six_axis(RIGHT_SIX_AXIS_BASE));
                Ok(out)
            }
            LayoutKind::FourCorner => {
                let left = self.surfaces.left.four_corner().ok_or_else(|| {
                    eyre::eyre!("four_corner layout requires explicit channel ids for surfaces.left")
                })?;
                let right = self.surfaces.right.four_corner().ok_or_else(|| {
                    eyre::eyre!(
                        "four_corner layout requires explicit channel ids for surfaces.right"
                    )
                })?;
                let mut out = Vec::with_capacity(8);
                out.extend(left);
                out.extend(right);
                Ok(out)
            }
        }
    }
}

// ── Channel-map CSV ─────────────────────────────────────────────────────────

/// Channel-map CSV schema.
///
/// Expected headers:
/// surface,role,channel
///
/// Example:
/// surface,role,channel
/// left,f_z,34
/// right,f_z,41
#[derive(Debug, Deserialize, Clone)]
pub struct ChannelMapRow {
    pub surface: SurfaceName,
    pub role: RoleName,
    pub channel: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceName {
    Left,
    Right,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    #[serde(rename = "f_x")]
    Fx,
    #[serde(rename = "f_y")]
    Fy,
    #[serde(rename = "f_z")]
    Fz,
    #[serde(rename = "m_x")]
    Mx,
    #[serde(rename = "m_y")]
    My,
    #[serde(rename = "m_z")]
    Mz,
    Zero,
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

pub fn load_channel_map_csv(path: &std::path::Path) -> eyre::Result<Vec<ChannelMapRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open channel map CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["surface", "role", "channel"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "channel map CSV must have headers 'surface,role,channel', got: {}",
            actual.join(",")
        );
    }

    let mut rows: Vec<ChannelMapRow> = Vec::new();
    for (idx, rec) in rdr.deserialize::<ChannelMapRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    // Reject duplicate (surface, role) assignments
    let mut seen = std::collections::BTreeSet::new();
    for row in &rows {
        if !seen.insert((row.surface, row.role)) {
            eyre::bail!(
                "duplicate channel map entry for {:?}/{:?}",
                row.surface,
                row.role
            );
        }
    }

    Ok(rows)
}

impl Config {
    /// Overlay CSV channel-map rows onto the TOML assignments.
    pub fn apply_channel_map(&mut self, rows: &[ChannelMapRow]) {
        for row in rows {
            let ids = match row.surface {
                SurfaceName::Left => &mut self.surfaces.left,
                SurfaceName::Right => &mut self.surfaces.right,
            };
            let slot = match row.role {
                RoleName::Fx => &mut ids.f_x,
                RoleName::Fy => &mut ids.f_y,
                RoleName::Fz => &mut ids.f_z,
                RoleName::Mx => &mut ids.m_x,
                RoleName::My => &mut ids.m_y,
                RoleName::Mz => &mut ids.m_z,
                RoleName::Zero => &mut ids.zero,
                RoleName::FrontLeft => &mut ids.frontleft,
                RoleName::FrontRight => &mut ids.frontright,
                RoleName::BackLeft => &mut ids.backleft,
                RoleName::BackRight => &mut ids.backright,
            };
            *slot = Some(row.channel);
        }
    }
}
