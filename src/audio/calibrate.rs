//! Ambient-noise calibration.
//!
//! Samples loudness for a fixed wall-clock window and derives the triggering
//! threshold from the running mean plus a margin. The margin biases toward
//! fewer false triggers from residual room noise.

use super::loudness::rms_loudness;
use super::source::FrameSource;
use anyhow::Result;
use std::time::{Duration, Instant};

/// Result of one calibration pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Mean loudness over the sampled window; 0 when no frames arrived.
    pub ambient_mean: f32,
    /// Operative threshold: ambient mean plus margin, or the fallback when
    /// the window yielded no frames.
    pub threshold: f32,
    pub frames_sampled: usize,
}

/// Running-mean accumulator over observed loudness values.
///
/// Kept separate from the wall-clock driver so the arithmetic is testable
/// with injected values.
pub struct Calibrator {
    sum: f64,
    count: usize,
    margin: f32,
    fallback: f32,
}

impl Calibrator {
    pub fn new(margin: f32, fallback: f32) -> Self {
        Self {
            sum: 0.0,
            count: 0,
            margin,
            fallback,
        }
    }

    pub fn observe(&mut self, loudness: f32) {
        self.sum += f64::from(loudness);
        self.count += 1;
    }

    /// Mean of everything observed so far. `None` before the first frame.
    pub fn running_mean(&self) -> Option<f32> {
        if self.count == 0 {
            None
        } else {
            Some((self.sum / self.count as f64) as f32)
        }
    }

    pub fn frames_observed(&self) -> usize {
        self.count
    }

    /// Finalize the threshold. A window that yielded zero frames (stalled
    /// device) keeps the fallback instead of dividing by zero.
    pub fn finish(&self) -> Calibration {
        match self.running_mean() {
            Some(mean) => Calibration {
                ambient_mean: mean,
                threshold: mean + self.margin,
                frames_sampled: self.count,
            },
            None => Calibration {
                ambient_mean: 0.0,
                threshold: self.fallback,
                frames_sampled: 0,
            },
        }
    }
}

/// Pull frames for `window` and derive the operative threshold.
///
/// The loop terminates strictly on elapsed time, not on convergence of the
/// running mean. Frame pulls block, so a stalled device stalls calibration
/// with it; that is the device-error contract of the pipeline.
pub fn calibrate_threshold<S>(
    source: &mut S,
    window: Duration,
    margin: f32,
    fallback: f32,
) -> Result<Calibration>
where
    S: FrameSource + ?Sized,
{
    let mut calibrator = Calibrator::new(margin, fallback);
    let start = Instant::now();
    while start.elapsed() < window {
        let frame = source.next_frame()?;
        calibrator.observe(rms_loudness(&frame)?);
    }
    Ok(calibrator.finish())
}
