use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use quadfm::audio::{
    BlockSink, BlockSource, DeviceSink, DeviceSource, WavFileSink, WavFileSource,
};
use quadfm::config::{DeemphasisTime, DemodConfig};
use quadfm::{FmReceiver, RunSummary, run_pipeline};

#[derive(Parser, Debug)]
#[command(name = "quadfm")]
#[command(about = "Narrowband FM quadrature demodulator for fs/4-centered stereo PCM", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read baseband from a 16-bit stereo WAV file instead of the input device
    #[arg(short = 'i', long)]
    input_wav: Option<PathBuf>,

    /// Write audio to a 16-bit stereo WAV file instead of the output device
    #[arg(short = 'o', long)]
    output_wav: Option<PathBuf>,

    /// Capture device name
    #[arg(long)]
    input_device: Option<String>,

    /// Playback device name
    #[arg(long)]
    output_device: Option<String>,

    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Frames per block
    #[arg(long)]
    block_frames: Option<usize>,

    /// Output gain
    #[arg(short, long)]
    gain: Option<f64>,

    /// Clip the input to this level before detection
    #[arg(long)]
    limit: Option<f64>,

    /// De-emphasis time constant (e.g., "75us", "50us", "none")
    #[arg(long)]
    deemphasis: Option<DeemphasisTime>,

    /// Stop after this many seconds
    #[arg(short, long)]
    duration: Option<f64>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = build_config(&args)?;
    config.validate().context("Invalid configuration")?;

    let stop = Arc::new(AtomicBool::new(false));
    spawn_ctrl_c_handler(stop.clone())?;
    if let Some(secs) = args.duration {
        spawn_stop_timer(stop.clone(), secs)?;
    }

    let mut source: Box<dyn BlockSource> = match &args.input_wav {
        Some(path) => Box::new(
            WavFileSource::new(path, config.audio.block_frames)
                .with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(
            DeviceSource::new(&config.audio, stop.clone())
                .context("Failed to start audio capture")?,
        ),
    };

    let mut config = config;
    if source.sample_rate() != config.audio.sample_rate {
        log::warn!(
            "Source runs at {} Hz, overriding configured {} Hz",
            source.sample_rate(),
            config.audio.sample_rate
        );
        config.audio.sample_rate = source.sample_rate();
    }

    let mut sink: Box<dyn BlockSink> = match &args.output_wav {
        Some(path) => Box::new(
            WavFileSink::create(path, config.audio.sample_rate)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(
            DeviceSink::new(&config.audio, stop.clone())
                .context("Failed to start audio playback")?,
        ),
    };

    let mut receiver = FmReceiver::new(&config)?;

    log::info!(
        "Demodulating at {} Hz, {} frames per block ({:.1} ms), gain {}",
        config.audio.sample_rate,
        config.audio.block_frames,
        config.audio.block_duration().as_secs_f64() * 1000.0,
        receiver.gain()
    );

    let summary = run_pipeline(
        &mut receiver,
        source.as_mut(),
        sink.as_mut(),
        config.audio.block_frames,
        &stop,
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, config.audio.sample_rate);
    }

    Ok(())
}

fn build_config(args: &Args) -> anyhow::Result<DemodConfig> {
    let mut config = match &args.config {
        Some(path) => DemodConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => DemodConfig::default(),
    };

    if let Some(rate) = args.sample_rate {
        config.audio.sample_rate = rate;
    }
    if let Some(frames) = args.block_frames {
        config.audio.block_frames = frames;
    }
    if args.input_device.is_some() {
        config.audio.input_device = args.input_device.clone();
    }
    if args.output_device.is_some() {
        config.audio.output_device = args.output_device.clone();
    }
    if let Some(gain) = args.gain {
        config.receiver.gain = gain;
    }
    if args.limit.is_some() {
        config.receiver.limiter = args.limit;
    }
    if let Some(deemphasis) = args.deemphasis {
        config.receiver.deemphasis = deemphasis;
    }

    Ok(config)
}

fn spawn_stop_timer(stop: Arc<AtomicBool>, secs: f64) -> anyhow::Result<()> {
    let delay = Duration::try_from_secs_f64(secs)
        .with_context(|| format!("Invalid duration: {}", secs))?;
    std::thread::Builder::new()
        .name("stop-timer".into())
        .spawn(move || {
            std::thread::sleep(delay);
            log::info!("Duration elapsed, stopping");
            stop.store(true, Ordering::Relaxed);
        })
        .context("Failed to spawn stop timer")?;
    Ok(())
}

/// Raise `stop` on the first Ctrl+C so the run loop can finish the sink;
/// a second Ctrl+C exits immediately
fn spawn_ctrl_c_handler(stop: Arc<AtomicBool>) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build signal runtime")?;
    std::thread::Builder::new()
        .name("ctrl-c".into())
        .spawn(move || {
            rt.block_on(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::warn!("Ctrl+C handler unavailable: {}", e);
                    return;
                }
                log::info!("Ctrl+C received, stopping");
                stop.store(true, Ordering::Relaxed);

                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Second Ctrl+C, exiting without cleanup");
                    std::process::exit(130);
                }
            });
        })
        .context("Failed to spawn Ctrl+C handler")?;
    Ok(())
}

fn print_summary(summary: &RunSummary, sample_rate: u32) {
    println!("=== quadfm run summary ===");
    println!("Stopped: {:?}", summary.stop_reason);
    println!(
        "Processed: {} blocks, {} frames ({:.2}s)",
        summary.blocks,
        summary.frames,
        summary.frames as f64 / sample_rate as f64
    );
    println!("Clipped samples: {}", summary.clipped_samples);
    if let Some(peak) = &summary.peak {
        println!(
            "Block peak: mean {:.3}, std {:.3}, min {:.3}, max {:.3}",
            peak.mean, peak.std_dev, peak.min, peak.max
        );
    }
}
