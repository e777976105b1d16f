//! RMS loudness measurement.
//!
//! One scalar per frame: samples normalized to [-1, 1] against full scale,
//! root-mean-square, scaled by 1000 so thresholds sit in a readable range
//! (silence ~0, full-scale sine ~707).

use super::source::Frame;
use super::FRAME_SAMPLES;
use anyhow::{bail, Result};

const FULL_SCALE: f64 = 32_768.0;
const LOUDNESS_SCALE: f64 = 1_000.0;

/// Loudness of one frame. Pure function of the sample data.
///
/// A frame of the wrong length is an input-contract violation, not a runtime
/// condition the pipeline recovers from.
pub fn rms_loudness(frame: &Frame) -> Result<f32> {
    if frame.len() != FRAME_SAMPLES {
        bail!(
            "malformed frame: expected {FRAME_SAMPLES} samples, got {}",
            frame.len()
        );
    }
    Ok(rms(frame.samples()))
}

/// RMS over an arbitrary slice, used where frame length is guaranteed by
/// construction (synthetic clips).
pub(super) fn rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let normalized = f64::from(sample) / FULL_SCALE;
            normalized * normalized
        })
        .sum();
    ((sum_squares / samples.len() as f64).sqrt() * LOUDNESS_SCALE) as f32
}
