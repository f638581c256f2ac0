use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, TryRecvError};

use super::capture::select_device;
use crate::config::AudioConfig;
use crate::error::{DemodError, Result};

/// Callback-side queue: whole blocks in, device-sized buffers out
///
/// Once the sender is dropped and every queued sample has been played,
/// `drained` is raised so the producer can wait for the tail of the stream.
struct PlaybackQueue {
    rx: Receiver<Vec<i16>>,
    pending: VecDeque<i16>,
    disconnected: bool,
    underrun_samples: Arc<AtomicU64>,
    drained: Arc<AtomicBool>,
}

impl PlaybackQueue {
    fn new(rx: Receiver<Vec<i16>>, capacity: usize) -> Self {
        Self {
            rx,
            pending: VecDeque::with_capacity(capacity),
            disconnected: false,
            underrun_samples: Arc::new(AtomicU64::new(0)),
            drained: Arc::new(AtomicBool::new(false)),
        }
    }

    fn fill(&mut self, data: &mut [i16]) {
        while !self.disconnected && self.pending.len() < data.len() {
            match self.rx.try_recv() {
                Ok(block) => self.pending.extend(block),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.disconnected = true,
            }
        }

        let mut missing = 0u64;
        for sample in data.iter_mut() {
            *sample = self.pending.pop_front().unwrap_or_else(|| {
                missing += 1;
                0
            });
        }

        if self.disconnected && self.pending.is_empty() {
            self.drained.store(true, Ordering::Release);
        } else if missing > 0 {
            self.underrun_samples.fetch_add(missing, Ordering::Relaxed);
        }
    }
}

/// Live playback of interleaved 16-bit stereo samples
///
/// The device callback drains whole blocks from `rx`; when nothing is queued
/// it plays silence and counts the missing samples as underrun.
pub struct AudioPlayback {
    stream: cpal::Stream,
    underrun_samples: Arc<AtomicU64>,
    drained: Arc<AtomicBool>,
}

impl AudioPlayback {
    /// Initialize playback on the configured (or default) output device
    pub fn new(config: &AudioConfig, rx: Receiver<Vec<i16>>, stop: Arc<AtomicBool>) -> Result<Self> {
        let host = cpal::default_host();

        let devices = host
            .output_devices()
            .map_err(|e| DemodError::AudioDevice(format!("{}", e)))?;
        let device = select_device(
            devices,
            host.default_output_device(),
            config.output_device.as_deref(),
            "output",
        )?;

        match device.description() {
            Ok(desc) => log::info!("Output device: {:?}", desc),
            Err(_) => log::info!("Output device: Unknown"),
        }

        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.block_frames as u32),
        };

        let mut queue = PlaybackQueue::new(rx, config.block_frames * config.channels as usize * 4);
        let underrun_samples = queue.underrun_samples.clone();
        let drained = queue.drained.clone();

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| queue.fill(data),
                move |err| {
                    log::error!("Audio playback stream error: {}", err);
                    stop.store(true, Ordering::Relaxed);
                },
                None,
            )
            .map_err(|e| DemodError::AudioStream(format!("{}", e)))?;

        stream
            .play()
            .map_err(|e| DemodError::AudioStream(format!("{}", e)))?;

        Ok(Self {
            stream,
            underrun_samples,
            drained,
        })
    }

    /// Samples replaced by silence because no audio was queued
    pub fn underrun_samples(&self) -> u64 {
        self.underrun_samples.load(Ordering::Relaxed)
    }

    /// Whether every sample sent before the sender was dropped has been played
    pub fn is_drained(&self) -> bool {
        self.drained.load(Ordering::Acquire)
    }
}

impl Drop for AudioPlayback {
    fn drop(&mut self) {
        let _ = self.stream.pause();
        log::info!("Audio playback stopped");
    }
}
