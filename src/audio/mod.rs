//! Microphone capture and utterance detection pipeline.
//!
//! Frames are pulled from the input device at a fixed rate, measured for
//! loudness, and fed through a two-state detector that decides where one
//! utterance starts and stops. Finished utterances are written out as WAV
//! so the transcription stage can pick them up.

use std::time::Duration;

/// Fixed capture sample rate.
pub const SAMPLE_RATE: u32 = 16_000;

/// Fixed channel count (mono capture only).
pub const CHANNELS: u16 = 1;

/// Samples per frame pulled from the device.
pub const FRAME_SAMPLES: usize = 1024;

/// Bits per sample in the persisted artifact.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Wall-clock duration of one frame at the fixed rate (64 ms).
pub fn frame_duration() -> Duration {
    Duration::from_nanos(FRAME_SAMPLES as u64 * 1_000_000_000 / u64::from(SAMPLE_RATE))
}

mod calibrate;
mod capture;
mod loudness;
mod ring;
mod sink;
mod source;

pub use calibrate::{calibrate_threshold, Calibration, Calibrator};
pub use capture::{
    offline_capture_from_pcm, CaptureConfig, CapturePipeline, Utterance, UtteranceDetector,
};
pub use loudness::rms_loudness;
pub use ring::PreTriggerBuffer;
pub use sink::WavSink;
pub use source::{Frame, FrameSource, MicSource};
