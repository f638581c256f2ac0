use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use hound::{WavSpec, WavWriter};

use super::{AudioPlayback, RawBlock};
use crate::config::AudioConfig;
use crate::constants::CHANNELS;
use crate::error::{DemodError, Result};

/// Consumer of processed blocks, in stream order
pub trait BlockSink {
    /// Deliver one whole block
    fn write_block(&mut self, block: &RawBlock) -> Result<()>;

    /// Flush and release the sink; called once when the run ends
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

const PLAYBACK_QUEUE_BLOCKS: usize = 4;
const DRAIN_POLL: Duration = Duration::from_millis(10);

/// Blocks played live on a sound card
pub struct DeviceSink {
    tx: Option<Sender<Vec<i16>>>,
    playback: AudioPlayback,
    block_duration: Duration,
}

impl DeviceSink {
    pub fn new(config: &AudioConfig, stop: Arc<AtomicBool>) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::bounded(PLAYBACK_QUEUE_BLOCKS);
        let playback = AudioPlayback::new(config, rx, stop)?;
        Ok(Self {
            tx: Some(tx),
            playback,
            block_duration: config.block_duration(),
        })
    }
}

impl BlockSink for DeviceSink {
    fn write_block(&mut self, block: &RawBlock) -> Result<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| DemodError::AudioStream("playback sink already finished".into()))?;
        // Blocks when the device is behind, which paces the run loop
        tx.send(block.to_samples())
            .map_err(|_| DemodError::AudioStream("playback stream closed".into()))
    }

    /// Close the queue and wait for the device to play what is left
    fn finish(&mut self) -> Result<()> {
        if self.tx.take().is_none() {
            return Ok(());
        }

        // Queued blocks plus the one in the callback, with a block of slack
        let budget = self.block_duration * (PLAYBACK_QUEUE_BLOCKS as u32 + 2);
        let deadline = Instant::now() + budget;
        while !self.playback.is_drained() {
            if Instant::now() >= deadline {
                log::warn!("Playback did not drain within {:?}", budget);
                break;
            }
            std::thread::sleep(DRAIN_POLL);
        }

        let underrun = self.playback.underrun_samples();
        if underrun > 0 {
            log::warn!("Playback underran by {} samples", underrun);
        }
        Ok(())
    }
}

/// Blocks written to a 16-bit stereo WAV file
pub struct WavFileSink {
    writer: Option<WavWriter<BufWriter<File>>>,
}

impl WavFileSink {
    pub fn create<P: AsRef<Path>>(path: P, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: CHANNELS as u16,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = WavWriter::create(path.as_ref(), spec)?;
        log::info!("Writing {}", path.as_ref().display());
        Ok(Self {
            writer: Some(writer),
        })
    }
}

impl BlockSink for WavFileSink {
    fn write_block(&mut self, block: &RawBlock) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| DemodError::AudioStream("WAV sink already finished".into()))?;
        for sample in block.to_samples() {
            writer.write_sample(sample)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
        }
        Ok(())
    }
}

/// Blocks collected in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    blocks: Vec<RawBlock>,
    finish_calls: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[RawBlock] {
        &self.blocks
    }

    /// All delivered samples, concatenated
    pub fn samples(&self) -> Vec<i16> {
        self.blocks.iter().flat_map(|b| b.to_samples()).collect()
    }

    pub fn finish_calls(&self) -> usize {
        self.finish_calls
    }
}

impl BlockSink for MemorySink {
    fn write_block(&mut self, block: &RawBlock) -> Result<()> {
        self.blocks.push(block.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finish_calls += 1;
        Ok(())
    }
}
