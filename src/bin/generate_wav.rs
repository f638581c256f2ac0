use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use quadfm::save_wav;
use quadfm::simulation::{FmSignal, add_awgn, generate_fm_signal, to_stereo_pcm};

#[derive(Parser, Debug)]
#[command(name = "generate_wav")]
#[command(about = "Generate a synthetic narrowband FM recording centered at fs/4")]
struct Args {
    /// Output WAV file
    #[arg(short, long, default_value = "nbfm_test.wav")]
    output: PathBuf,

    /// TOML signal description (fields of FmSignal); CLI flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Signal duration in seconds
    #[arg(short, long)]
    duration: Option<f64>,

    /// Sample rate in Hz (carrier follows at a quarter of it)
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Message tone frequency in Hz
    #[arg(short, long)]
    message_hz: Option<f64>,

    /// Peak deviation in Hz
    #[arg(long)]
    deviation_hz: Option<f64>,

    /// Peak amplitude (0-1 range)
    #[arg(short, long)]
    amplitude: Option<f64>,

    /// AWGN SNR in dB
    #[arg(long)]
    snr: Option<f64>,

    /// Noise seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,
}

fn load_signal(args: &Args) -> Result<FmSignal> {
    let mut signal = match &args.config {
        Some(path) => {
            let content = fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        }
        None => FmSignal::default(),
    };

    if let Some(rate) = args.sample_rate {
        signal.sample_rate = rate;
        signal.carrier_hz = rate as f64 / 4.0;
    }
    if let Some(duration) = args.duration {
        signal.duration_secs = duration;
    }
    if let Some(hz) = args.message_hz {
        signal.message_hz = hz;
    }
    if let Some(hz) = args.deviation_hz {
        signal.deviation_hz = hz;
    }
    if let Some(amplitude) = args.amplitude {
        signal.amplitude = amplitude;
    }
    Ok(signal)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let params = load_signal(&args)?;

    let mut signal = generate_fm_signal(&params);
    if let Some(snr) = args.snr {
        add_awgn(&mut signal, snr, args.seed);
    }

    let samples = to_stereo_pcm(&signal);
    save_wav(&args.output, &samples, params.sample_rate)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "Wrote {}: {:.2}s at {} Hz, {} Hz tone, {} Hz deviation, carrier {} Hz",
        args.output.display(),
        params.duration_secs,
        params.sample_rate,
        params.message_hz,
        params.deviation_hz,
        params.carrier_hz
    );
    Ok(())
}
