use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use super::signal_power;

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

/// Add white Gaussian noise at `snr_db` relative to the signal power
///
/// A silent signal is left untouched.
pub fn add_awgn(signal: &mut [f64], snr_db: f64, seed: Option<u64>) {
    let sig_power = signal_power(signal);
    if sig_power == 0.0 {
        return;
    }

    let snr_linear = 10.0_f64.powf(snr_db / 10.0);
    let noise_std = (sig_power / snr_linear).sqrt();

    let Ok(normal) = Normal::new(0.0, noise_std) else {
        return;
    };

    let mut rng = create_rng(seed);
    for sample in signal.iter_mut() {
        *sample += normal.sample(&mut rng);
    }
}
