use super::Stage;

/// Quadrature FM detector for a real signal centered at fs/4
///
/// Multiplies each sample by the previous one. At a quarter of the sample
/// rate a one-sample delay is a 90 degree phase shift, so the product holds
/// a term proportional to the sine of the phase advance per sample (the
/// instantaneous frequency offset) plus a 2*fc term at Nyquist that the
/// following low-pass removes.
///
/// The previous sample is carried across calls and never reset between
/// blocks.
#[derive(Debug, Clone, Default)]
pub struct QuadratureDemodulator {
    previous: f64,
}

impl QuadratureDemodulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detect a single sample
    pub fn process(&mut self, sample: f64) -> f64 {
        let output = self.previous * sample;
        self.previous = sample;
        output
    }

    /// Detect an entire buffer in-place
    pub fn process_buffer(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Last input sample seen, 0.0 before any input
    pub fn previous(&self) -> f64 {
        self.previous
    }
}

impl Stage for QuadratureDemodulator {
    fn process(&mut self, sample: f64) -> f64 {
        QuadratureDemodulator::process(self, sample)
    }

    fn reset(&mut self) {
        self.previous = 0.0;
    }
}
