use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use audio_thread_priority::RtPriorityHandle;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Sender, TrySendError};

use crate::config::AudioConfig;
use crate::error::{DemodError, Result};

/// Callback-side hand-off of captured buffers
///
/// After the queue overflows once, nothing more is sent: a later buffer would
/// follow a gap and the stream is no longer contiguous.
struct CaptureForwarder {
    tx: Sender<Vec<i16>>,
    stop: Arc<AtomicBool>,
    overflowed: bool,
}

impl CaptureForwarder {
    fn new(tx: Sender<Vec<i16>>, stop: Arc<AtomicBool>) -> Self {
        Self {
            tx,
            stop,
            overflowed: false,
        }
    }

    fn forward(&mut self, data: &[i16]) {
        if self.overflowed {
            return;
        }
        match self.tx.try_send(data.to_vec()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                log::warn!("Capture queue full, stopping");
                self.overflowed = true;
                self.stop.store(true, Ordering::Relaxed);
            }
            Err(TrySendError::Disconnected(_)) => {
                log::warn!("Audio receiver dropped");
            }
        }
    }
}

/// Find a device by name, or fall back to the host default
#[allow(deprecated)]
pub(crate) fn select_device<I>(
    devices: I,
    default: Option<cpal::Device>,
    name: Option<&str>,
    kind: &str,
) -> Result<cpal::Device>
where
    I: IntoIterator<Item = cpal::Device>,
{
    match name {
        Some(wanted) => devices
            .into_iter()
            .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
            .ok_or_else(|| DemodError::AudioDevice(format!("No {} device named '{}'", kind, wanted))),
        None => default
            .ok_or_else(|| DemodError::AudioDevice(format!("No {} device found", kind))),
    }
}

/// Live capture of interleaved 16-bit stereo samples
///
/// Each device callback buffer is forwarded as-is over `tx`; regrouping into
/// fixed-size blocks happens in `DeviceSource`. Stream errors raise `stop`.
pub struct AudioCapture {
    stream: cpal::Stream,
    _rt_handle: Option<RtPriorityHandle>,
}

impl AudioCapture {
    /// Initialize audio capture on the configured (or default) input device
    pub fn new(config: &AudioConfig, tx: Sender<Vec<i16>>, stop: Arc<AtomicBool>) -> Result<Self> {
        let host = cpal::default_host();

        let devices = host
            .input_devices()
            .map_err(|e| DemodError::AudioDevice(format!("{}", e)))?;
        let device = select_device(
            devices,
            host.default_input_device(),
            config.input_device.as_deref(),
            "input",
        )?;

        match device.description() {
            Ok(desc) => log::info!("Input device: {:?}", desc),
            Err(_) => log::info!("Input device: Unknown"),
        }

        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.block_frames as u32),
        };

        let err_stop = stop.clone();
        let mut forwarder = CaptureForwarder::new(tx, stop);
        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| forwarder.forward(data),
                move |err| {
                    log::error!("Audio capture stream error: {}", err);
                    err_stop.store(true, Ordering::Relaxed);
                },
                None,
            )
            .map_err(|e| DemodError::AudioStream(format!("{}", e)))?;

        // Attempt to promote the processing thread to real-time priority
        let rt_handle = audio_thread_priority::promote_current_thread_to_real_time(
            config.block_frames as u32,
            config.sample_rate,
        );

        let rt_handle = match rt_handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Could not set real-time priority: {}", e);
                None
            }
        };

        stream
            .play()
            .map_err(|e| DemodError::AudioStream(format!("{}", e)))?;

        Ok(Self {
            stream,
            _rt_handle: rt_handle,
        })
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        let _ = self.stream.pause();
        log::info!("Audio capture stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwarder_latches_after_overflow() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let stop = Arc::new(AtomicBool::new(false));
        let mut forwarder = CaptureForwarder::new(tx, stop.clone());

        forwarder.forward(&[1, 2]);
        forwarder.forward(&[3, 4]);
        assert!(stop.load(Ordering::Relaxed));

        // Room again, but nothing after the gap may be sent
        assert_eq!(rx.try_recv().unwrap(), vec![1, 2]);
        forwarder.forward(&[5, 6]);
        assert!(rx.try_recv().is_err());
    }
}
