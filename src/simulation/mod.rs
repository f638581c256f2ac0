mod measure;
mod noise;
mod signal;

pub use measure::{dominant_frequency, left_channel, peak_amplitude, signal_power};
pub use noise::add_awgn;
pub use signal::{FmSignal, generate_fm_signal, to_stereo_pcm};
