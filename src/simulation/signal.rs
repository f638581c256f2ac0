use std::f64::consts::PI;

/// Parameters for a synthetic narrowband FM recording
///
/// The defaults describe a 1 kHz tone at 400 Hz deviation on a carrier at a
/// quarter of 96 kHz, half full-scale.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(default)]
pub struct FmSignal {
    pub sample_rate: u32,
    /// Carrier frequency in Hz, `sample_rate / 4` for the detector to work
    pub carrier_hz: f64,
    /// Sine message frequency in Hz
    pub message_hz: f64,
    /// Peak frequency deviation in Hz
    pub deviation_hz: f64,
    /// Peak amplitude in normalized units
    pub amplitude: f64,
    pub duration_secs: f64,
}

impl Default for FmSignal {
    fn default() -> Self {
        Self {
            sample_rate: 96_000,
            carrier_hz: 24_000.0,
            message_hz: 1000.0,
            deviation_hz: 400.0,
            amplitude: 0.5,
            duration_secs: 0.5,
        }
    }
}

impl FmSignal {
    pub fn num_samples(&self) -> usize {
        (self.duration_secs * self.sample_rate as f64) as usize
    }
}

/// Generate a real FM signal with a sine message
///
/// `x[n] = A cos(2 pi fc n / fs + (dev / fm) sin(2 pi fm n / fs))`
pub fn generate_fm_signal(params: &FmSignal) -> Vec<f64> {
    let fs = params.sample_rate as f64;
    let carrier = 2.0 * PI * params.carrier_hz / fs;
    let message = 2.0 * PI * params.message_hz / fs;
    let beta = if params.message_hz > 0.0 {
        params.deviation_hz / params.message_hz
    } else {
        0.0
    };

    (0..params.num_samples())
        .map(|n| {
            let n = n as f64;
            let phase = carrier * n + beta * (message * n).sin();
            params.amplitude * phase.cos()
        })
        .collect()
}

/// Quantize a mono signal into interleaved 16-bit stereo
///
/// Left carries the signal, right is silent.
pub fn to_stereo_pcm(signal: &[f64]) -> Vec<i16> {
    let mut samples = Vec::with_capacity(signal.len() * 2);
    for &x in signal {
        let v = (x * 32767.0).round().clamp(i16::MIN as f64, i16::MAX as f64) as i16;
        samples.push(v);
        samples.push(0);
    }
    samples
}
