//! Stream format and receiver constants
//!
//! Defaults match a FunCube-style dongle delivering 96 kHz stereo 16-bit PCM
//! with the signal of interest centered at a quarter of the sample rate.

/// Scale between 16-bit PCM integers and normalized floats.
pub const FULL_SCALE: f64 = 32768.0;

/// Number of interleaved channels in every raw block.
pub const CHANNELS: usize = 2;

/// Bytes per 16-bit sample.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Bytes per interleaved frame (one sample for each channel).
pub const FRAME_BYTES: usize = CHANNELS * BYTES_PER_SAMPLE;

/// Reference sample rate in Hz (per channel).
pub const DEFAULT_SAMPLE_RATE: u32 = 96_000;

/// Reference block size in frames (40960 bytes per block).
pub const DEFAULT_BLOCK_FRAMES: usize = 10_240;

/// Output gain compensating for demodulation and low-pass attenuation.
pub const DEFAULT_GAIN: f64 = 200.0;
