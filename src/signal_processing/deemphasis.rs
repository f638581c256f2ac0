use super::Stage;

/// Single-pole de-emphasis low-pass
///
/// `y[n] = y[n-1] + alpha * (x[n] - y[n-1])` with
/// `alpha = 1 - exp(-1 / (fs * tau))`. Unity gain at DC, -3 dB at
/// `1 / (2 * pi * tau)`. The last output is carried across calls.
#[derive(Debug, Clone)]
pub struct Deemphasis {
    alpha: f64,
    state: f64,
}

impl Deemphasis {
    /// Create a de-emphasis filter from its time constant in microseconds
    pub fn new(sample_rate: f64, tau_us: f64) -> Self {
        let tau = tau_us * 1e-6;
        let alpha = 1.0 - (-1.0 / (sample_rate * tau)).exp();
        Self { alpha, state: 0.0 }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Stage for Deemphasis {
    fn process(&mut self, sample: f64) -> f64 {
        self.state += self.alpha * (sample - self.state);
        self.state
    }

    fn reset(&mut self) {
        self.state = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn tone_amplitude(filter: &mut Deemphasis, freq: f64) -> f64 {
        let mut buffer: Vec<f64> = (0..48000)
            .map(|i| (2.0 * PI * freq * i as f64 / 96000.0).sin())
            .collect();
        filter.process_buffer(&mut buffer);
        buffer[24000..].iter().fold(0.0f64, |m, &x| m.max(x.abs()))
    }

    #[test]
    fn test_deemphasis_settles_to_dc() {
        let mut filter = Deemphasis::new(96000.0, 75.0);
        let mut buffer = vec![0.5; 2000];
        filter.process_buffer(&mut buffer);
        assert!((buffer[1999] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_deemphasis_rolls_off_highs() {
        let mut low = Deemphasis::new(96000.0, 75.0);
        let mut high = Deemphasis::new(96000.0, 75.0);
        let low_amp = tone_amplitude(&mut low, 300.0);
        let high_amp = tone_amplitude(&mut high, 6000.0);
        assert!(low_amp > 0.9, "300 Hz amplitude {}", low_amp);
        assert!(high_amp < 0.5, "6 kHz amplitude {}", high_amp);
    }
}
