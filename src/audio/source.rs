use std::collections::VecDeque;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use hound::WavReader;

use super::{AudioCapture, RawBlock};
use crate::config::AudioConfig;
use crate::constants::CHANNELS;
use crate::error::{DemodError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Supplier of raw blocks, in stream order
pub trait BlockSource {
    /// Next block, or `None` once the stream has ended
    ///
    /// A returned block may be shorter than the negotiated size only when it
    /// is the last one.
    fn next_block(&mut self) -> Result<Option<RawBlock>>;

    fn sample_rate(&self) -> u32;
}

/// Regroups variable-sized capture buffers into fixed-size blocks
struct BlockAssembler {
    rx: Receiver<Vec<i16>>,
    pending: Vec<i16>,
    block_samples: usize,
    stop: Arc<AtomicBool>,
}

impl BlockAssembler {
    fn new(rx: Receiver<Vec<i16>>, block_samples: usize, stop: Arc<AtomicBool>) -> Self {
        Self {
            rx,
            pending: Vec::with_capacity(block_samples * 2),
            block_samples,
            stop,
        }
    }

    /// Next whole block, or `None` once capture has stopped
    ///
    /// A block completed after `stop` went up is not returned: an overflow
    /// raises the flag and the samples may straddle the gap.
    fn next_block(&mut self) -> Option<RawBlock> {
        while self.pending.len() < self.block_samples {
            match self.rx.recv_timeout(POLL_INTERVAL) {
                Ok(data) => self.pending.extend_from_slice(&data),
                Err(RecvTimeoutError::Timeout) => {
                    if self.stop.load(Ordering::Relaxed) {
                        return None;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }

        if self.stop.load(Ordering::Relaxed) {
            return None;
        }

        let block = RawBlock::from_samples(&self.pending[..self.block_samples]);
        self.pending.drain(..self.block_samples);
        Some(block)
    }
}

/// Blocks captured live from a sound card
pub struct DeviceSource {
    blocks: BlockAssembler,
    sample_rate: u32,
    _capture: AudioCapture,
}

impl DeviceSource {
    pub fn new(config: &AudioConfig, stop: Arc<AtomicBool>) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::bounded(16);
        let capture = AudioCapture::new(config, tx, stop.clone())?;
        let block_samples = config.block_frames * config.channels as usize;
        Ok(Self {
            blocks: BlockAssembler::new(rx, block_samples, stop),
            sample_rate: config.sample_rate,
            _capture: capture,
        })
    }
}

impl BlockSource for DeviceSource {
    fn next_block(&mut self) -> Result<Option<RawBlock>> {
        Ok(self.blocks.next_block())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Blocks read from a 16-bit stereo WAV recording
pub struct WavFileSource {
    reader: WavReader<BufReader<File>>,
    block_samples: usize,
    sample_rate: u32,
}

impl WavFileSource {
    pub fn new<P: AsRef<Path>>(path: P, block_frames: usize) -> Result<Self> {
        let reader = WavReader::open(path.as_ref())?;
        let spec = reader.spec();

        if spec.channels as usize != CHANNELS {
            return Err(DemodError::UnsupportedFormat(format!(
                "expected stereo WAV file, got {} channels",
                spec.channels
            )));
        }
        if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(DemodError::UnsupportedFormat(format!(
                "expected 16-bit integer WAV file, got {} bit {:?}",
                spec.bits_per_sample, spec.sample_format
            )));
        }

        log::info!(
            "Reading {}: {} Hz, {} frames",
            path.as_ref().display(),
            spec.sample_rate,
            reader.duration()
        );

        Ok(Self {
            reader,
            block_samples: block_frames * CHANNELS,
            sample_rate: spec.sample_rate,
        })
    }
}

impl BlockSource for WavFileSource {
    fn next_block(&mut self) -> Result<Option<RawBlock>> {
        let samples = self
            .reader
            .samples::<i16>()
            .take(self.block_samples)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if samples.is_empty() {
            return Ok(None);
        }
        Ok(Some(RawBlock::from_samples(&samples)))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Blocks held in memory
pub struct MemorySource {
    blocks: VecDeque<RawBlock>,
    sample_rate: u32,
}

impl MemorySource {
    pub fn new(blocks: Vec<RawBlock>, sample_rate: u32) -> Self {
        Self {
            blocks: blocks.into(),
            sample_rate,
        }
    }

    /// Split interleaved samples into blocks of `block_frames` frames
    pub fn from_samples(samples: &[i16], block_frames: usize, sample_rate: u32) -> Self {
        let blocks = samples
            .chunks(block_frames * CHANNELS)
            .map(RawBlock::from_samples)
            .collect();
        Self::new(blocks, sample_rate)
    }

    pub fn remaining(&self) -> usize {
        self.blocks.len()
    }
}

impl BlockSource for MemorySource {
    fn next_block(&mut self) -> Result<Option<RawBlock>> {
        Ok(self.blocks.pop_front())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_chunks_samples() {
        let samples: Vec<i16> = (0..20).collect();
        let mut source = MemorySource::from_samples(&samples, 4, 96000);
        assert_eq!(source.remaining(), 3);

        let first = source.next_block().unwrap().unwrap();
        assert_eq!(first.frames(), 4);
        assert_eq!(first.to_samples(), (0..8).collect::<Vec<i16>>());

        source.next_block().unwrap();
        let last = source.next_block().unwrap().unwrap();
        assert_eq!(last.frames(), 2);
        assert!(source.next_block().unwrap().is_none());
    }

    #[test]
    fn test_assembler_regroups_capture_buffers() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let stop = Arc::new(AtomicBool::new(false));
        let mut blocks = BlockAssembler::new(rx, 4, stop);

        tx.send(vec![1, 2, 3]).unwrap();
        tx.send(vec![4, 5, 6]).unwrap();
        tx.send(vec![7, 8]).unwrap();

        assert_eq!(blocks.next_block().unwrap().to_samples(), vec![1, 2, 3, 4]);
        assert_eq!(blocks.next_block().unwrap().to_samples(), vec![5, 6, 7, 8]);

        drop(tx);
        assert!(blocks.next_block().is_none());
    }

    #[test]
    fn test_assembler_withholds_block_completed_after_stop() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let stop = Arc::new(AtomicBool::new(false));
        let mut blocks = BlockAssembler::new(rx, 4, stop.clone());

        tx.send(vec![1, 2]).unwrap();
        stop.store(true, Ordering::Relaxed);
        tx.send(vec![3, 4]).unwrap();

        assert!(blocks.next_block().is_none());
    }
}
