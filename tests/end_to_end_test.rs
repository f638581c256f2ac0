use std::sync::atomic::AtomicBool;

use quadfm::audio::{MemorySink, MemorySource};
use quadfm::simulation::{
    FmSignal, add_awgn, dominant_frequency, generate_fm_signal, left_channel, peak_amplitude,
    to_stereo_pcm,
};
use quadfm::{DemodConfig, FmReceiver, RunSummary, StopReason, run_pipeline};

const SAMPLE_RATE: f64 = 96000.0;

fn demodulate(signal: &[f64], block_frames: usize) -> (RunSummary, Vec<i16>) {
    let config = DemodConfig::default();
    let mut receiver = FmReceiver::new(&config).unwrap();
    let pcm = to_stereo_pcm(signal);
    let mut source = MemorySource::from_samples(&pcm, block_frames, config.audio.sample_rate);
    let mut sink = MemorySink::new();
    let stop = AtomicBool::new(false);

    let summary =
        run_pipeline(&mut receiver, &mut source, &mut sink, block_frames, &stop).unwrap();
    (summary, sink.samples())
}

fn message_frequency(output: &[i16]) -> Option<f64> {
    // Skip the filter start-up, then analyze 100 ms
    let audio = left_channel(output);
    dominant_frequency(&audio[1000..10600], SAMPLE_RATE, 100.0, 10000.0, 100.0)
}

#[test]
fn test_recovers_message_tone() {
    let signal = generate_fm_signal(&FmSignal::default());
    let (summary, output) = demodulate(&signal, 10240);

    // 48000 frames: four full blocks, the short remainder stops the run
    assert_eq!(summary.blocks, 4);
    assert_eq!(summary.frames, 40960);
    assert_eq!(summary.stop_reason, StopReason::PartialBlock);
    assert_eq!(output.len(), 40960 * 2);

    assert_eq!(message_frequency(&output), Some(1000.0));
}

#[test]
fn test_half_scale_input_stays_within_clamp_range() {
    let signal = generate_fm_signal(&FmSignal::default());
    let (summary, output) = demodulate(&signal, 10240);

    assert_eq!(summary.clipped_samples, 0);
    let peak = summary.peak.expect("peak stats");
    assert!(peak.max < 1.0, "amplified peak {} exceeds full scale", peak.max);

    let audio = left_channel(&output);
    let out_peak = peak_amplitude(&audio);
    assert!(out_peak > 0.2, "demodulated audio too quiet: {}", out_peak);
    assert!(out_peak < 1.0);
}

#[test]
fn test_right_channel_carries_offset_audio() {
    let signal = generate_fm_signal(&FmSignal::default());
    let (_, output) = demodulate(&signal, 10240);

    // right = left + 32768 before clamping
    for frame in output.chunks_exact(2) {
        let expected = (frame[0] as i32 + 32768).min(i16::MAX as i32) as i16;
        assert!(
            (frame[1] as i32 - expected as i32).abs() <= 1,
            "left {} right {}",
            frame[0],
            frame[1]
        );
    }
}

#[test]
fn test_block_size_does_not_change_output() {
    let params = FmSignal {
        duration_secs: 0.1,
        ..FmSignal::default()
    };
    let signal = generate_fm_signal(&params);

    let (_, reference) = demodulate(&signal, 9600);
    let (summary, small) = demodulate(&signal, 480);
    assert_eq!(summary.stop_reason, StopReason::EndOfStream);
    assert_eq!(summary.blocks, 20);
    assert_eq!(small, reference);
}

#[test]
fn test_other_message_frequency() {
    let params = FmSignal {
        message_hz: 2000.0,
        ..FmSignal::default()
    };
    let signal = generate_fm_signal(&params);
    let (_, output) = demodulate(&signal, 10240);
    assert_eq!(message_frequency(&output), Some(2000.0));
}

#[test]
fn test_tone_survives_noise() {
    let mut signal = generate_fm_signal(&FmSignal::default());
    add_awgn(&mut signal, 20.0, Some(1234));
    let (_, output) = demodulate(&signal, 10240);
    assert_eq!(message_frequency(&output), Some(1000.0));
}

#[test]
fn test_unmodulated_carrier_is_nearly_silent() {
    let params = FmSignal {
        deviation_hz: 0.0,
        ..FmSignal::default()
    };
    let signal = generate_fm_signal(&params);
    let (_, output) = demodulate(&signal, 10240);

    let audio = left_channel(&output);
    let settled_peak = peak_amplitude(&audio[100..]);
    assert!(settled_peak < 0.05, "carrier leaked: {}", settled_peak);
}
