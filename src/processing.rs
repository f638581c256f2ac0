use crate::audio::{RawBlock, codec};
use crate::config::{DemodConfig, ReceiverConfig};
use crate::error::Result;
use crate::signal_processing::{
    Deemphasis, Gain, Limiter, NbfmLowpass, QuadratureDemodulator, Stage,
};

/// Per-block measurements taken while processing
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BlockStats {
    pub frames: usize,
    /// Largest absolute amplified sample before encoding
    pub peak: f64,
    /// Left-channel samples that saturated when encoded
    pub clipped: usize,
}

/// Narrowband FM receive chain for one stream
///
/// decode -> [limit] -> detect -> low-pass -> [de-emphasis] -> gain -> encode
///
/// Channel 0 of the input is demodulated and the audio is written to both
/// output channels. All filter state lives in this value: one receiver per
/// stream, kept for the whole run. Optional stages are off by default and
/// the chain then reduces to the plain detect/low-pass/gain pipeline.
#[derive(Debug, Clone)]
pub struct FmReceiver {
    limiter: Option<Limiter>,
    demodulator: QuadratureDemodulator,
    lowpass: NbfmLowpass,
    deemphasis: Option<Deemphasis>,
    gain: Gain,
    last_stats: BlockStats,
}

impl FmReceiver {
    /// Build a receiver from a validated configuration
    pub fn new(config: &DemodConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(&config.receiver, config.audio.sample_rate))
    }

    /// Reference chain: detector, low-pass and `gain`, nothing else
    pub fn with_gain(gain: f64) -> Self {
        Self {
            limiter: None,
            demodulator: QuadratureDemodulator::new(),
            lowpass: NbfmLowpass::new(),
            deemphasis: None,
            gain: Gain::new(gain),
            last_stats: BlockStats::default(),
        }
    }

    fn from_parts(receiver: &ReceiverConfig, sample_rate: u32) -> Self {
        let mut rx = Self::with_gain(receiver.gain);
        rx.limiter = receiver.limiter.map(Limiter::new);
        rx.deemphasis = receiver
            .deemphasis
            .as_micros()
            .map(|tau_us| Deemphasis::new(sample_rate as f64, tau_us));
        rx
    }

    /// Run normalized samples through every stage between the codecs, in-place
    pub fn process_samples(&mut self, samples: &mut [f64]) {
        if let Some(limiter) = self.limiter.as_mut() {
            limiter.process_buffer(samples);
        }
        self.demodulator.process_buffer(samples);
        self.lowpass.process_buffer(samples);
        if let Some(deemphasis) = self.deemphasis.as_mut() {
            deemphasis.process_buffer(samples);
        }
        self.gain.process_buffer(samples);
    }

    /// Demodulate one raw block into one raw block of the same size
    ///
    /// # Errors
    /// Returns `DemodError::MalformedBlock` if the block is not a whole
    /// number of frames. Filter state is left untouched in that case.
    pub fn process_block(&mut self, block: &RawBlock) -> Result<RawBlock> {
        let (mut audio, _) = codec::decode(block)?;
        self.process_samples(&mut audio);

        self.last_stats = BlockStats {
            frames: audio.len(),
            peak: audio.iter().fold(0.0f64, |m, &x| m.max(x.abs())),
            clipped: audio.iter().filter(|&&x| codec::clips(x)).count(),
        };

        codec::encode(&audio, &audio)
    }

    /// Measurements for the most recently processed block
    pub fn last_stats(&self) -> BlockStats {
        self.last_stats
    }

    pub fn gain(&self) -> f64 {
        self.gain.factor()
    }

    /// Previous input sample held by the detector
    pub fn demodulator_state(&self) -> f64 {
        self.demodulator.previous()
    }

    /// Low-pass history, oldest first
    pub fn filter_state(&self) -> Vec<f64> {
        self.lowpass.history()
    }

    /// Clear all carried state, as for the start of a new stream
    pub fn reset(&mut self) {
        if let Some(limiter) = self.limiter.as_mut() {
            limiter.reset();
        }
        Stage::reset(&mut self.demodulator);
        Stage::reset(&mut self.lowpass);
        if let Some(deemphasis) = self.deemphasis.as_mut() {
            deemphasis.reset();
        }
        self.last_stats = BlockStats::default();
    }
}
