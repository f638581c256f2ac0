use super::{FirFilterCore, Stage};

/// Number of taps in the narrowband FM audio low-pass filter
pub const NBFM_LOWPASS_NUM_TAPS: usize = 27;

/// Narrowband FM audio low-pass taps
///
/// Equiripple design at 96 kHz: passband 0-7 kHz, stopband 11-48 kHz.
/// Narrowband FM channels are 15-20 kHz wide, so the lowest modulated
/// component around the fs/4 carrier sits at 14 kHz or above and is rejected
/// along with the 2*fc product at Nyquist. Symmetric, so linear phase.
pub const NBFM_LOWPASS_TAPS: [f64; NBFM_LOWPASS_NUM_TAPS] = [
    -0.003751090021725844,
    -0.016457936753412384,
    -0.02294181624990546,
    -0.03409024368571728,
    -0.040497886062356034,
    -0.04050365821080267,
    -0.03036303211675522,
    -0.008740203839825258,
    0.02361683260953284,
    0.06325335897807506,
    0.10457588980440596,
    0.14085278715905142,
    0.1656876520146318,
    0.1745193485322739,
    0.1656876520146318,
    0.14085278715905142,
    0.10457588980440596,
    0.06325335897807506,
    0.02361683260953284,
    -0.008740203839825258,
    -0.03036303211675522,
    -0.04050365821080267,
    -0.040497886062356034,
    -0.03409024368571728,
    -0.02294181624990546,
    -0.016457936753412384,
    -0.003751090021725844,
];

/// Fixed-coefficient low-pass filter for the demodulated signal
///
/// Carries its 27-sample history across calls, so a stream filtered in
/// blocks matches the same stream filtered in one pass sample for sample.
#[derive(Debug, Clone)]
pub struct NbfmLowpass {
    core: FirFilterCore,
}

impl NbfmLowpass {
    pub fn new() -> Self {
        Self {
            core: FirFilterCore::new(NBFM_LOWPASS_TAPS.to_vec()),
        }
    }

    /// Process a single sample through the filter
    pub fn process(&mut self, sample: f64) -> f64 {
        self.core.process(sample)
    }

    /// Process an entire buffer of samples in-place
    pub fn process_buffer(&mut self, buffer: &mut [f64]) {
        self.core.process_buffer(buffer)
    }

    /// Get the number of taps (filter length)
    pub fn num_taps(&self) -> usize {
        self.core.num_taps()
    }

    /// Get the group delay in samples (half the filter length for linear phase)
    pub fn group_delay_samples(&self) -> usize {
        self.core.group_delay_samples()
    }

    /// History in chronological order, oldest first
    pub fn history(&self) -> Vec<f64> {
        self.core.history().collect()
    }
}

impl Default for NbfmLowpass {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for NbfmLowpass {
    fn process(&mut self, sample: f64) -> f64 {
        NbfmLowpass::process(self, sample)
    }

    fn reset(&mut self) {
        self.core.reset();
    }
}
