//! Synthetic harness for the utterance detector.
//!
//! Drives the capture state machine with generated clips so trigger and stop
//! behavior can be measured without a physical microphone.

use anyhow::Result;
use clap::Parser;
use std::f64::consts::PI;
use vela::audio::{self, CaptureConfig, SAMPLE_RATE};

#[derive(Debug, Parser)]
#[command(about = "Drive the utterance detector with synthetic clips")]
struct Args {
    /// Human-friendly label recorded in the output line
    #[arg(long, default_value = "clip")]
    label: String,

    /// Duration of the synthetic speech tone (milliseconds)
    #[arg(long, default_value_t = 1_000)]
    speech_ms: u64,

    /// Trailing silence appended after the tone (milliseconds)
    #[arg(long, default_value_t = 1_500)]
    silence_ms: u64,

    /// Loudness threshold handed to the detector
    #[arg(long, default_value_t = 20.0)]
    threshold: f32,

    #[arg(long = "timeout-ms", default_value_t = 1_000)]
    timeout_ms: u64,

    #[arg(long = "pre-trigger-frames", default_value_t = 10)]
    pre_trigger_frames: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let clip = synthesize_clip(args.speech_ms, args.silence_ms);
    let cfg = CaptureConfig {
        timeout_ms: args.timeout_ms,
        pre_trigger_frames: args.pre_trigger_frames,
        ..CaptureConfig::default()
    };

    match audio::offline_capture_from_pcm(&clip, args.threshold, &cfg) {
        Some(utterance) => println!(
            "capture_metrics|label={}|frames={}|samples={}|duration_ms={}",
            args.label,
            utterance.frame_count(),
            utterance.sample_count(),
            utterance.duration().as_millis()
        ),
        None => println!("capture_metrics|label={}|no_trigger", args.label),
    }
    Ok(())
}

/// Half-scale 440 Hz tone followed by silence.
fn synthesize_clip(speech_ms: u64, silence_ms: u64) -> Vec<i16> {
    let speech_samples = (u64::from(SAMPLE_RATE) * speech_ms / 1_000) as usize;
    let silence_samples = (u64::from(SAMPLE_RATE) * silence_ms / 1_000) as usize;
    let mut clip = Vec::with_capacity(speech_samples + silence_samples);
    for i in 0..speech_samples {
        let phase = 2.0 * PI * 440.0 * i as f64 / f64::from(SAMPLE_RATE);
        clip.push((phase.sin() * 16_383.0) as i16);
    }
    clip.extend(std::iter::repeat(0).take(silence_samples));
    clip
}
