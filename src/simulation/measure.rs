use num_complex::Complex;
use std::f64::consts::PI;

pub fn signal_power(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().map(|&x| x * x).sum::<f64>() / signal.len() as f64
}

pub fn peak_amplitude(signal: &[f64]) -> f64 {
    signal.iter().fold(0.0f64, |m, &x| m.max(x.abs()))
}

/// Left channel of interleaved 16-bit stereo, normalized
pub fn left_channel(interleaved: &[i16]) -> Vec<f64> {
    interleaved
        .iter()
        .step_by(2)
        .map(|&s| s as f64 / 32768.0)
        .collect()
}

/// Frequency with the largest DFT magnitude among candidates
/// `min_hz, min_hz + step_hz, ..., <= max_hz`
///
/// The mean is removed first so DC never wins. Returns `None` for an empty
/// signal or an empty candidate range.
pub fn dominant_frequency(
    signal: &[f64],
    sample_rate: f64,
    min_hz: f64,
    max_hz: f64,
    step_hz: f64,
) -> Option<f64> {
    if signal.is_empty() || step_hz <= 0.0 || max_hz < min_hz {
        return None;
    }

    let mean = signal.iter().sum::<f64>() / signal.len() as f64;
    let bins = ((max_hz - min_hz) / step_hz).floor() as usize + 1;

    (0..bins)
        .map(|b| {
            let freq = min_hz + b as f64 * step_hz;
            let omega = 2.0 * PI * freq / sample_rate;
            let sum: Complex<f64> = signal
                .iter()
                .enumerate()
                .map(|(n, &x)| Complex::from_polar(x - mean, -omega * n as f64))
                .sum();
            (freq, sum.norm())
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(freq, _)| freq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_frequency_finds_tone() {
        let signal: Vec<f64> = (0..4800)
            .map(|n| 0.2 + (2.0 * std::f64::consts::PI * 3000.0 * n as f64 / 48000.0).sin())
            .collect();
        let freq = dominant_frequency(&signal, 48000.0, 100.0, 10000.0, 100.0);
        assert_eq!(freq, Some(3000.0));
    }

    #[test]
    fn test_dominant_frequency_empty() {
        assert_eq!(dominant_frequency(&[], 48000.0, 100.0, 1000.0, 100.0), None);
    }

    #[test]
    fn test_left_channel_and_peak() {
        let left = left_channel(&[16384, 1, -8192, 2]);
        assert_eq!(left, vec![0.5, -0.25]);
        assert_eq!(peak_amplitude(&left), 0.5);
    }
}
