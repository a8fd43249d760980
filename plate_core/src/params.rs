//! Runtime stream parameters for the buffering and downsampling core.
//!
//! These are the validated, runtime counterparts of the TOML-deserialized
//! `plate_config::StreamCfg`.

use crate::error::Result;

/// Rates and history length driving every buffer size in the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct StreamParams {
    /// Raw ingest rate in Hz.
    pub sample_rate_hz: u32,
    /// Smoothed series rate in Hz.
    pub display_rate_hz: u32,
    /// Rolling history in seconds.
    pub history_secs: u32,
}

impl Default for StreamParams {
    fn default() -> Self {
        Self {
            sample_rate_hz: 1000,
            display_rate_hz: 10,
            history_secs: 10,
        }
    }
}

impl StreamParams {
    /// Raw samples held per channel (`N`).
    pub fn raw_len(&self) -> usize {
        (self.sample_rate_hz as usize) * (self.history_secs as usize)
    }

    /// Display slots per channel (`M`).
    pub fn display_len(&self) -> usize {
        (self.display_rate_hz as usize) * (self.history_secs as usize)
    }

    /// Raw samples averaged into one display slot.
    pub fn downsample_ratio(&self) -> usize {
        (self.sample_rate_hz / self.display_rate_hz.max(1)) as usize
    }

    /// Fail-fast startup invariant check. Uneven rate ratios are a
    /// configuration error; the downsampler never handles them at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate_hz == 0 {
            eyre::bail!("sample_rate_hz must be > 0");
        }
        if self.display_rate_hz == 0 {
            eyre::bail!("display_rate_hz must be > 0");
        }
        if self.history_secs == 0 {
            eyre::bail!("history_secs must be >= 1");
        }
        if !self.sample_rate_hz.is_multiple_of(self.display_rate_hz) {
            eyre::bail!(
                "sample_rate_hz ({}) must be evenly divisible by display_rate_hz ({})",
                self.sample_rate_hz,
                self.display_rate_hz
            );
        }
        debug_assert_eq!(self.raw_len(), self.display_len() * self.downsample_ratio());
        Ok(())
    }
}
