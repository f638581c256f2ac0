//! Configuration for the quadfm receiver.
//!
//! All fields have working defaults for a 96 kHz FunCube-style stream, so a
//! TOML file only needs to name what it changes:
//!
//! ```toml
//! [audio]
//! block_frames = 4096
//!
//! [receiver]
//! gain = 150.0
//! deemphasis = "75us"
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::constants::{
    CHANNELS, DEFAULT_BLOCK_FRAMES, DEFAULT_GAIN, DEFAULT_SAMPLE_RATE, FRAME_BYTES,
};
use crate::error::{DemodError, Result};

/// De-emphasis time constant
///
/// # Parsing formats
/// - `none` or `off` - de-emphasis disabled
/// - `75us` or `75μs` - time constant in microseconds
/// - `75` - bare number, microseconds
///
/// # Example
/// ```
/// use quadfm::config::DeemphasisTime;
///
/// let tau: DeemphasisTime = "50us".parse().unwrap();
/// assert_eq!(tau.as_micros(), Some(50.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(try_from = "String")]
pub struct DeemphasisTime(Option<f64>);

impl DeemphasisTime {
    pub const NONE: Self = Self(None);

    pub fn from_micros(us: f64) -> Self {
        Self(Some(us))
    }

    /// Time constant in microseconds, `None` when disabled
    pub fn as_micros(&self) -> Option<f64> {
        self.0
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Display for DeemphasisTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(us) => write!(f, "{}us", us),
            None => write!(f, "none"),
        }
    }
}

impl FromStr for DeemphasisTime {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        if s.eq_ignore_ascii_case("none") || s.eq_ignore_ascii_case("off") {
            return Ok(Self::NONE);
        }

        let num = s
            .strip_suffix("us")
            .or_else(|| s.strip_suffix("μs"))
            .unwrap_or(s);

        let us: f64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid de-emphasis time: {}", s))?;
        if !us.is_finite() || us <= 0.0 {
            return Err("de-emphasis time must be positive".to_string());
        }
        Ok(Self::from_micros(us))
    }
}

impl TryFrom<String> for DeemphasisTime {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Top-level receiver configuration
///
/// # Example
/// ```
/// use quadfm::config::DemodConfig;
///
/// let mut config = DemodConfig::default();
/// config.receiver.gain = 150.0;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DemodConfig {
    /// Stream format and device selection
    pub audio: AudioConfig,
    /// Demodulation chain parameters
    pub receiver: ReceiverConfig,
}

/// Stream format negotiated with the sample source and sink
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate in Hz per channel (typically 96000)
    pub sample_rate: u32,
    /// Frames per block delivered by the source
    pub block_frames: usize,
    /// Interleaved channel count (must be 2)
    pub channels: u16,
    /// Capture device name, default input device when unset
    pub input_device: Option<String>,
    /// Playback device name, default output device when unset
    pub output_device: Option<String>,
}

/// Demodulation chain parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Linear gain applied after the low-pass filter
    pub gain: f64,
    /// Clip level applied to the input before detection, disabled when unset
    pub limiter: Option<f64>,
    /// De-emphasis applied after the low-pass filter
    pub deemphasis: DeemphasisTime,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_frames: DEFAULT_BLOCK_FRAMES,
            channels: CHANNELS as u16,
            input_device: None,
            output_device: None,
        }
    }
}

impl AudioConfig {
    /// Size in bytes of one full block
    pub fn block_bytes(&self) -> usize {
        self.block_frames * FRAME_BYTES
    }

    /// Wall-clock duration covered by one block
    pub fn block_duration(&self) -> Duration {
        Duration::from_secs_f64(self.block_frames as f64 / self.sample_rate as f64)
    }
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            gain: DEFAULT_GAIN,
            limiter: None,
            deemphasis: DeemphasisTime::NONE,
        }
    }
}

impl DemodConfig {
    /// Load a configuration from a TOML file, filling unset fields with defaults
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the pipeline relies on
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(DemodError::Config("sample rate must be positive".into()));
        }
        if self.audio.block_frames == 0 {
            return Err(DemodError::Config("block size must be positive".into()));
        }
        if self.audio.channels as usize != CHANNELS {
            return Err(DemodError::Config(format!(
                "expected {} channels, got {}",
                CHANNELS, self.audio.channels
            )));
        }
        if !self.receiver.gain.is_finite() {
            return Err(DemodError::Config(format!(
                "gain must be finite, got {}",
                self.receiver.gain
            )));
        }
        if let Some(level) = self.receiver.limiter
            && (!level.is_finite() || level <= 0.0)
        {
            return Err(DemodError::Config(format!(
                "limiter level must be positive, got {}",
                level
            )));
        }
        if let Some(us) = self.receiver.deemphasis.as_micros()
            && (!us.is_finite() || us <= 0.0)
        {
            return Err(DemodError::Config(format!(
                "de-emphasis time constant must be positive, got {}us",
                us
            )));
        }
        Ok(())
    }
}
