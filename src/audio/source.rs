//! Frame acquisition from the system microphone via CPAL.
//!
//! The audio callback runs on CPAL's thread; it converts incoming samples to
//! 16-bit PCM, chunks them into fixed-size frames, and hands them over a
//! bounded channel. The pull side blocks in [`FrameSource::next_frame`], so
//! the rest of the pipeline stays a single synchronous loop.

use super::{CHANNELS, FRAME_SAMPLES, SAMPLE_RATE};
use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, SampleRate, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// One fixed-size chunk of mono 16-bit PCM samples. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    samples: Vec<i16>,
}

impl Frame {
    pub fn from_samples(samples: Vec<i16>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Pull-based stream of fixed-size frames.
///
/// `next_frame` blocks until exactly one frame of audio is available and
/// advances the stream by exactly one frame duration. A closed or unavailable
/// device is fatal; the error propagates to the caller with no local retry.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Frame>;
}

/// Microphone-backed frame source.
///
/// Opens a capture-only stream at the fixed format (mono, 16-bit, 16 kHz,
/// 1024-sample frames). The device's native sample representation is converted
/// to i16 in the callback so the pipeline never sees another format.
pub struct MicSource {
    receiver: Receiver<Frame>,
    dropped: Arc<AtomicUsize>,
    // Held so the capture stream stays alive for the lifetime of the source.
    _stream: cpal::Stream,
}

impl MicSource {
    /// List microphone names so the CLI can expose a human-friendly selector.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host.input_devices().context("no input devices available")?;
        let mut names = Vec::new();
        for device in devices {
            if let Ok(name) = device.name() {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Open the capture stream, optionally forcing a specific device so users
    /// can pick the right microphone when a machine exposes multiple inputs.
    pub fn open(preferred_device: Option<&str>, channel_capacity: usize) -> Result<Self> {
        let host = cpal::default_host();
        let device = match preferred_device {
            Some(name) => {
                let mut devices = host.input_devices().context("no input devices available")?;
                devices
                    .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                    .ok_or_else(|| anyhow!("input device '{name}' not found"))?
            }
            None => host
                .default_input_device()
                .context("no default input device available")?,
        };
        let device_name = device
            .name()
            .unwrap_or_else(|_| "unknown input device".to_string());

        // The capture format is fixed; only the sample representation follows
        // the device. Hosts that cannot deliver 16 kHz mono fail here, which
        // is fatal for the whole pipeline.
        let format = device.default_input_config()?.sample_format();
        let stream_config = StreamConfig {
            channels: CHANNELS,
            sample_rate: SampleRate(SAMPLE_RATE),
            buffer_size: BufferSize::Default,
        };
        tracing::debug!(device = %device_name, ?format, "opening capture stream");

        let (sender, receiver) = bounded::<Frame>(channel_capacity.max(1));
        let dropped = Arc::new(AtomicUsize::new(0));
        let pump = FramePump::new(FRAME_SAMPLES, sender, dropped.clone());

        let err_fn = |err: cpal::StreamError| tracing::warn!("audio_stream_error: {err}");
        let stream = match format {
            SampleFormat::F32 => device.build_input_stream(
                &stream_config,
                {
                    let mut pump = pump;
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        pump.push(data, |sample| {
                            (sample * 32_768.0).clamp(-32_768.0, 32_767.0) as i16
                        });
                    }
                },
                err_fn,
                None,
            )?,
            SampleFormat::I16 => device.build_input_stream(
                &stream_config,
                {
                    let mut pump = pump;
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        pump.push(data, |sample| sample);
                    }
                },
                err_fn,
                None,
            )?,
            SampleFormat::U16 => device.build_input_stream(
                &stream_config,
                {
                    let mut pump = pump;
                    move |data: &[u16], _: &cpal::InputCallbackInfo| {
                        pump.push(data, |sample| (i32::from(sample) - 32_768) as i16);
                    }
                },
                err_fn,
                None,
            )?,
            other => return Err(anyhow!("unsupported sample format: {other:?}")),
        };

        stream
            .play()
            .with_context(|| format!("failed to start capture on '{device_name}'"))?;

        Ok(Self {
            receiver,
            dropped,
            _stream: stream,
        })
    }

    /// Frames discarded because the pull loop fell behind the device.
    pub fn dropped_frames(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl FrameSource for MicSource {
    fn next_frame(&mut self) -> Result<Frame> {
        self.receiver
            .recv()
            .context("audio stream disconnected while waiting for a frame")
    }
}

/// Chunks converted samples into fixed frames inside the audio callback.
///
/// The callback must never block, so a full channel counts the frame as
/// dropped instead of waiting for the consumer.
struct FramePump {
    frame_samples: usize,
    pending: Vec<i16>,
    sender: Sender<Frame>,
    dropped: Arc<AtomicUsize>,
}

impl FramePump {
    fn new(frame_samples: usize, sender: Sender<Frame>, dropped: Arc<AtomicUsize>) -> Self {
        Self {
            frame_samples: frame_samples.max(1),
            pending: Vec::with_capacity(frame_samples),
            sender,
            dropped,
        }
    }

    fn push<T, F>(&mut self, data: &[T], convert: F)
    where
        T: Copy,
        F: FnMut(T) -> i16,
    {
        self.pending.extend(data.iter().copied().map(convert));
        while self.pending.len() >= self.frame_samples {
            let samples: Vec<i16> = self.pending.drain(..self.frame_samples).collect();
            match self.sender.try_send(Frame::from_samples(samples)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                }
                Err(TrySendError::Disconnected(_)) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn pump_emits_fixed_size_frames() {
        let (sender, receiver) = bounded(8);
        let mut pump = FramePump::new(4, sender, Arc::new(AtomicUsize::new(0)));
        pump.push(&[1i16, 2, 3, 4, 5, 6], |s| s);
        let frame = receiver.try_recv().expect("one full frame");
        assert_eq!(frame.samples(), &[1, 2, 3, 4]);
        assert!(receiver.try_recv().is_err(), "remainder stays pending");
        pump.push(&[7i16, 8], |s| s);
        let frame = receiver.try_recv().expect("second frame");
        assert_eq!(frame.samples(), &[5, 6, 7, 8]);
    }

    #[test]
    fn pump_counts_dropped_frames_when_channel_is_full() {
        let (sender, _receiver) = bounded(1);
        let dropped = Arc::new(AtomicUsize::new(0));
        let mut pump = FramePump::new(2, sender, dropped.clone());
        pump.push(&[0i16; 6], |s| s);
        assert_eq!(dropped.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn pump_applies_sample_conversion() {
        let (sender, receiver) = bounded(2);
        let mut pump = FramePump::new(2, sender, Arc::new(AtomicUsize::new(0)));
        pump.push(&[0u16, 65_535], |sample| (i32::from(sample) - 32_768) as i16);
        let frame = receiver.try_recv().expect("converted frame");
        assert_eq!(frame.samples(), &[-32_768, 32_767]);
    }
}
