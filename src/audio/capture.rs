//! Utterance capture state machine and the pipeline loop that drives it.
//!
//! Two states: idle and recording. Idle frames feed the pre-trigger buffer;
//! a frame louder than the threshold starts a recording seeded with the
//! buffer snapshot. While recording, every frame is kept and any loud frame
//! pushes the stop deadline out by one timeout, so brief pauses mid-sentence
//! do not split an utterance. The deadline passing finalizes the recording.

use super::calibrate::{calibrate_threshold, Calibration};
use super::loudness::{rms, rms_loudness};
use super::ring::PreTriggerBuffer;
use super::sink::WavSink;
use super::source::{Frame, FrameSource};
use super::{frame_duration, FRAME_SAMPLES, SAMPLE_RATE};
use anyhow::Result;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Tunable parameters for the capture pipeline.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Silence tail that ends a recording (rolling deadline).
    pub timeout_ms: u64,
    /// Frames of pre-roll retained ahead of the trigger; 0 disables pre-roll.
    pub pre_trigger_frames: usize,
    pub calibration_window_ms: u64,
    pub calibration_margin: f32,
    /// Threshold used when calibration yields no frames.
    pub fallback_threshold: f32,
    /// Capacity of the frame channel between the audio callback and the loop.
    pub channel_capacity: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 1_000,
            pre_trigger_frames: 10,
            calibration_window_ms: 1_000,
            calibration_margin: 15.0,
            fallback_threshold: 10.0,
            channel_capacity: 64,
        }
    }
}

impl From<&crate::config::CapturePipelineConfig> for CaptureConfig {
    fn from(cfg: &crate::config::CapturePipelineConfig) -> Self {
        Self {
            timeout_ms: cfg.timeout_ms,
            pre_trigger_frames: cfg.pre_trigger_frames,
            calibration_window_ms: cfg.calibration_window_ms,
            calibration_margin: cfg.calibration_margin,
            fallback_threshold: cfg.fallback_threshold,
            channel_capacity: cfg.channel_capacity,
        }
    }
}

/// One detected speech event: the pre-trigger prefix plus every frame
/// observed while recording, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    frames: Vec<Frame>,
}

impl Utterance {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn sample_count(&self) -> usize {
        self.frames.iter().map(Frame::len).sum()
    }

    pub fn duration(&self) -> Duration {
        Duration::from_nanos(self.sample_count() as u64 * 1_000_000_000 / u64::from(SAMPLE_RATE))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Recording,
}

/// Decides where one utterance starts and stops.
///
/// Time is an explicit argument: `on_frame` takes a monotonic `now` supplied
/// by the caller, so the trigger and stop rules are a pure function of
/// (state, elapsed time, loudness) and testable without a live clock. The
/// driving loop feeds `Instant`-derived elapsed time.
pub struct UtteranceDetector {
    threshold: f32,
    timeout: Duration,
    ring: PreTriggerBuffer,
    phase: Phase,
    pending: Vec<Frame>,
    deadline: Duration,
}

impl UtteranceDetector {
    pub fn new(threshold: f32, timeout: Duration, pre_trigger_frames: usize) -> Self {
        Self {
            threshold,
            timeout,
            ring: PreTriggerBuffer::new(pre_trigger_frames),
            phase: Phase::Idle,
            pending: Vec::new(),
            deadline: Duration::ZERO,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn is_recording(&self) -> bool {
        self.phase == Phase::Recording
    }

    /// Feed one frame observed at time `now`. Returns the finalized utterance
    /// when the stop condition fires, `None` otherwise.
    ///
    /// `now` must be monotonically non-decreasing across calls while a
    /// recording is in progress.
    pub fn on_frame(&mut self, frame: Frame, loudness: f32, now: Duration) -> Option<Utterance> {
        match self.phase {
            Phase::Idle => {
                // Push before the comparison so the triggering frame itself
                // lands in the snapshot.
                self.ring.push(frame);
                if loudness > self.threshold {
                    self.pending = self.ring.snapshot();
                    self.deadline = now + self.timeout;
                    self.phase = Phase::Recording;
                    tracing::debug!(loudness = f64::from(loudness), "utterance started");
                }
                None
            }
            Phase::Recording => {
                self.pending.push(frame);
                if loudness > self.threshold {
                    // Speech continuing extends the window.
                    self.deadline = now + self.timeout;
                }
                if now > self.deadline {
                    self.phase = Phase::Idle;
                    let utterance = Utterance::new(std::mem::take(&mut self.pending));
                    tracing::debug!(frames = utterance.frame_count(), "utterance finalized");
                    Some(utterance)
                } else {
                    None
                }
            }
        }
    }

    /// Discard any in-progress recording (cancellation path). Pre-trigger
    /// contents are kept so the next trigger still has its pre-roll.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.pending.clear();
    }
}

/// Synchronous pull loop: frame source -> loudness meter -> detector.
///
/// The threshold is owned here, set once by calibration (or injected), and
/// read by every comparison. Nothing else mutates it.
pub struct CapturePipeline<S> {
    source: S,
    cfg: CaptureConfig,
    threshold: f32,
}

impl<S: FrameSource> CapturePipeline<S> {
    pub fn new(source: S, cfg: CaptureConfig) -> Self {
        let threshold = cfg.fallback_threshold;
        Self {
            source,
            cfg,
            threshold,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Inject a threshold directly, skipping calibration.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    /// Sample ambient loudness and install the derived threshold.
    pub fn calibrate(&mut self) -> Result<Calibration> {
        let calibration = calibrate_threshold(
            &mut self.source,
            Duration::from_millis(self.cfg.calibration_window_ms),
            self.cfg.calibration_margin,
            self.threshold,
        )?;
        self.threshold = calibration.threshold;
        tracing::info!(
            ambient_mean = f64::from(calibration.ambient_mean),
            threshold = f64::from(calibration.threshold),
            frames = calibration.frames_sampled,
            "calibration complete"
        );
        Ok(calibration)
    }

    /// Run the detector until one utterance is finalized.
    ///
    /// Returns `Ok(None)` when the stop flag is raised between frames; an
    /// in-progress recording is discarded, never persisted partially.
    pub fn capture_utterance(&mut self, stop: Option<&AtomicBool>) -> Result<Option<Utterance>> {
        let mut detector = self.detector();
        let start = Instant::now();
        loop {
            if let Some(flag) = stop {
                if flag.load(Ordering::Relaxed) {
                    return Ok(None);
                }
            }
            let frame = self.source.next_frame()?;
            let loudness = rms_loudness(&frame)?;
            if let Some(utterance) = detector.on_frame(frame, loudness, start.elapsed()) {
                return Ok(Some(utterance));
            }
        }
    }

    /// One-shot entry point: calibrate, capture a single utterance, persist
    /// it. Returns whether a capture was persisted (`false` only when
    /// cancelled via the stop flag).
    pub fn capture_once(&mut self, sink: &WavSink, stop: Option<&AtomicBool>) -> Result<bool> {
        self.calibrate()?;
        match self.capture_utterance(stop)? {
            Some(utterance) => {
                sink.write(&utterance)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Continuous mode: keep detecting utterances until the stop flag is
    /// raised. A persistence failure is reported for that utterance only and
    /// the loop moves on to the next one. The pre-trigger buffer carries over
    /// between utterances, matching the single long-lived listen loop.
    pub fn listen<F>(
        &mut self,
        sink: &WavSink,
        stop: Option<&AtomicBool>,
        mut on_artifact: F,
    ) -> Result<()>
    where
        F: FnMut(&Path),
    {
        let mut detector = self.detector();
        let start = Instant::now();
        loop {
            if let Some(flag) = stop {
                if flag.load(Ordering::Relaxed) {
                    return Ok(());
                }
            }
            let frame = self.source.next_frame()?;
            let loudness = rms_loudness(&frame)?;
            if let Some(utterance) = detector.on_frame(frame, loudness, start.elapsed()) {
                match sink.write(&utterance) {
                    Ok(path) => on_artifact(&path),
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to persist utterance; continuing")
                    }
                }
            }
        }
    }

    fn detector(&self) -> UtteranceDetector {
        UtteranceDetector::new(
            self.threshold,
            Duration::from_millis(self.cfg.timeout_ms),
            self.cfg.pre_trigger_frames,
        )
    }
}

/// Drive the detector with synthetic PCM as if frames arrived in real time,
/// one frame duration apart. Lets benchmarks and tests exercise the trigger
/// and stop rules without a microphone.
pub fn offline_capture_from_pcm(
    samples: &[i16],
    threshold: f32,
    cfg: &CaptureConfig,
) -> Option<Utterance> {
    let mut detector = UtteranceDetector::new(
        threshold,
        Duration::from_millis(cfg.timeout_ms),
        cfg.pre_trigger_frames,
    );
    let step = frame_duration();
    for (index, chunk) in samples.chunks(FRAME_SAMPLES).enumerate() {
        let mut padded = chunk.to_vec();
        padded.resize(FRAME_SAMPLES, 0);
        let loudness = rms(&padded);
        let frame = Frame::from_samples(padded);
        if let Some(utterance) = detector.on_frame(frame, loudness, step * (index as u32 + 1)) {
            return Some(utterance);
        }
    }
    None
}
