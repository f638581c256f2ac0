use super::Stage;

/// Scale every sample by `gain` in-place
///
/// No clamping happens here; saturation is left to the encoder.
pub fn amplify(buffer: &mut [f64], gain: f64) {
    for sample in buffer.iter_mut() {
        *sample *= gain;
    }
}

/// Fixed linear output gain
#[derive(Debug, Clone, Copy)]
pub struct Gain {
    factor: f64,
}

impl Gain {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn process_buffer(&self, buffer: &mut [f64]) {
        amplify(buffer, self.factor);
    }
}

impl Stage for Gain {
    fn process(&mut self, sample: f64) -> f64 {
        sample * self.factor
    }

    fn process_buffer(&mut self, buffer: &mut [f64]) {
        amplify(buffer, self.factor);
    }

    fn reset(&mut self) {}
}
