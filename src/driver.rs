//! Blocking pull-process-push loop between a block source and a block sink.

use std::sync::atomic::{AtomicBool, Ordering};

use rolling_stats::Stats;
use serde::Serialize;

use crate::audio::{BlockSink, BlockSource};
use crate::constants::FRAME_BYTES;
use crate::error::Result;
use crate::processing::FmReceiver;

/// Why a run ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The source had no more blocks
    EndOfStream,
    /// The stop flag was raised
    Cancelled,
    /// The source delivered a short trailing block, which was not processed
    PartialBlock,
}

/// Summary statistics over per-block output peaks
#[derive(Debug, Clone, Serialize)]
pub struct PeakSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl PeakSummary {
    fn from_stats(stats: &Stats<f64>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub blocks: u64,
    pub frames: u64,
    pub clipped_samples: u64,
    pub stop_reason: StopReason,
    pub peak: Option<PeakSummary>,
}

/// Drive blocks from `source` through `receiver` into `sink` until the
/// source ends or `stop` is raised
///
/// `stop` is only checked between blocks, so every block that reaches the
/// sink is whole. A well-formed block shorter than `block_frames` ends the
/// run before it is decoded. `sink.finish()` is called exactly once on every
/// exit path; when the loop itself failed, that error wins.
///
/// # Errors
/// `DemodError::MalformedBlock` for a block that is not a whole number of
/// frames (fatal, the stream cannot be resynchronized), and any source or
/// sink failure.
pub fn run_pipeline(
    receiver: &mut FmReceiver,
    source: &mut dyn BlockSource,
    sink: &mut dyn BlockSink,
    block_frames: usize,
    stop: &AtomicBool,
) -> Result<RunSummary> {
    let result = run_blocks(receiver, source, sink, block_frames, stop);
    let finished = sink.finish();

    match (result, finished) {
        (Ok(summary), Ok(())) => {
            log::info!(
                "Run ended ({:?}) after {} blocks, {} frames",
                summary.stop_reason,
                summary.blocks,
                summary.frames
            );
            Ok(summary)
        }
        (Ok(_), Err(e)) => Err(e),
        (Err(e), finished) => {
            if let Err(finish_err) = finished {
                log::warn!("Sink failed to finish after error: {}", finish_err);
            }
            Err(e)
        }
    }
}

fn run_blocks(
    receiver: &mut FmReceiver,
    source: &mut dyn BlockSource,
    sink: &mut dyn BlockSink,
    block_frames: usize,
    stop: &AtomicBool,
) -> Result<RunSummary> {
    let expected_bytes = block_frames * FRAME_BYTES;
    let mut blocks = 0u64;
    let mut frames = 0u64;
    let mut clipped_samples = 0u64;
    let mut peaks: Stats<f64> = Stats::new();

    let stop_reason = loop {
        if stop.load(Ordering::Relaxed) {
            break StopReason::Cancelled;
        }

        let block = match source.next_block()? {
            Some(block) => block,
            None if stop.load(Ordering::Relaxed) => break StopReason::Cancelled,
            None => break StopReason::EndOfStream,
        };

        if block.len().is_multiple_of(FRAME_BYTES) && block.len() < expected_bytes {
            log::warn!(
                "Partial block of {} bytes (expected {}), stopping",
                block.len(),
                expected_bytes
            );
            break StopReason::PartialBlock;
        }

        let output = receiver.process_block(&block)?;
        sink.write_block(&output)?;

        let stats = receiver.last_stats();
        blocks += 1;
        frames += stats.frames as u64;
        clipped_samples += stats.clipped as u64;
        peaks.update(stats.peak);

        if stats.clipped > 0 {
            log::debug!(
                "Block {}: peak {:.3}, {} samples clipped",
                blocks,
                stats.peak,
                stats.clipped
            );
        } else {
            log::trace!("Block {}: peak {:.3}", blocks, stats.peak);
        }
    };

    Ok(RunSummary {
        blocks,
        frames,
        clipped_samples,
        stop_reason,
        peak: PeakSummary::from_stats(&peaks),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{MemorySink, MemorySource, RawBlock};
    use crate::error::DemodError;

    /// Endless silence that raises `stop` once `limit` blocks have been handed out
    struct StopAfter<'a> {
        stop: &'a AtomicBool,
        limit: usize,
        served: usize,
    }

    impl BlockSource for StopAfter<'_> {
        fn next_block(&mut self) -> Result<Option<RawBlock>> {
            self.served += 1;
            if self.served == self.limit {
                self.stop.store(true, Ordering::Relaxed);
            }
            Ok(Some(RawBlock::from_samples(&[0; 8])))
        }

        fn sample_rate(&self) -> u32 {
            96000
        }
    }

    #[test]
    fn test_empty_source_ends_immediately() {
        let mut rx = FmReceiver::with_gain(200.0);
        let mut source = MemorySource::new(Vec::new(), 96000);
        let mut sink = MemorySink::new();
        let stop = AtomicBool::new(false);

        let summary = run_pipeline(&mut rx, &mut source, &mut sink, 4, &stop).unwrap();
        assert_eq!(summary.stop_reason, StopReason::EndOfStream);
        assert_eq!(summary.blocks, 0);
        assert!(summary.peak.is_none());
        assert_eq!(sink.finish_calls(), 1);
    }

    #[test]
    fn test_stop_flag_checked_before_first_block() {
        let mut rx = FmReceiver::with_gain(200.0);
        let mut source = MemorySource::from_samples(&[0; 64], 4, 96000);
        let mut sink = MemorySink::new();
        let stop = AtomicBool::new(true);

        let summary = run_pipeline(&mut rx, &mut source, &mut sink, 4, &stop).unwrap();
        assert_eq!(summary.stop_reason, StopReason::Cancelled);
        assert!(sink.blocks().is_empty());
        assert_eq!(source.remaining(), 8);
        assert_eq!(sink.finish_calls(), 1);
    }

    #[test]
    fn test_malformed_block_is_fatal_and_sink_finished() {
        let mut rx = FmReceiver::with_gain(200.0);
        let mut source = MemorySource::new(
            vec![
                RawBlock::from_samples(&[0; 8]),
                RawBlock::from_bytes(vec![0; 17]),
                RawBlock::from_samples(&[0; 8]),
            ],
            96000,
        );
        let mut sink = MemorySink::new();
        let stop = AtomicBool::new(false);

        let err = run_pipeline(&mut rx, &mut source, &mut sink, 4, &stop);
        assert!(matches!(err, Err(DemodError::MalformedBlock { len: 17, .. })));
        assert_eq!(sink.blocks().len(), 1);
        assert_eq!(sink.finish_calls(), 1);
    }

    #[test]
    fn test_stop_mid_run_keeps_whole_blocks() {
        let mut rx = FmReceiver::with_gain(200.0);
        let stop = AtomicBool::new(false);
        let mut source = StopAfter {
            stop: &stop,
            limit: 2,
            served: 0,
        };
        let mut sink = MemorySink::new();

        let summary = run_pipeline(&mut rx, &mut source, &mut sink, 4, &stop).unwrap();
        assert_eq!(summary.stop_reason, StopReason::Cancelled);
        assert_eq!(summary.blocks, 2);
        assert_eq!(sink.blocks().len(), 2);
        assert!(sink.blocks().iter().all(|b| b.frames() == 4));
        assert_eq!(sink.finish_calls(), 1);
    }
}
