//! Command-line parsing and validation helpers.

mod defaults;
#[cfg(test)]
mod tests;
mod validation;

use clap::{ArgAction, Parser};
use std::path::PathBuf;

pub use defaults::{
    default_artifact_path, default_wake_words, DEFAULT_CALIBRATION_MARGIN,
    DEFAULT_CALIBRATION_WINDOW_MS, DEFAULT_CHANNEL_CAPACITY, DEFAULT_FALLBACK_THRESHOLD,
    DEFAULT_PRE_TRIGGER_FRAMES, DEFAULT_TIMEOUT_MS,
};

/// CLI options for the vela capture pipeline. Validated values keep the
/// audio loop and downstream collaborators safe.
#[derive(Debug, Parser, Clone)]
#[command(about = "Voice-triggered utterance capture", author, version)]
pub struct AppConfig {
    /// Preferred audio input device name
    #[arg(long)]
    pub input_device: Option<String>,

    /// Print detected audio input devices and exit
    #[arg(long = "list-input-devices", default_value_t = false)]
    pub list_input_devices: bool,

    /// Capture exactly one utterance, then exit
    #[arg(long, default_value_t = false)]
    pub once: bool,

    /// Run ambient calibration, print the derived threshold, and exit
    #[arg(long = "calibrate-only", default_value_t = false)]
    pub calibrate_only: bool,

    /// Path the WAV artifact is written to (overwritten on each capture)
    #[arg(long, default_value_os_t = defaults::default_artifact_path())]
    pub output: PathBuf,

    /// Trailing silence that finalizes an utterance (milliseconds)
    #[arg(long = "timeout-ms", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Frames of pre-trigger audio retained ahead of the trigger (0 disables)
    #[arg(long = "pre-trigger-frames", default_value_t = DEFAULT_PRE_TRIGGER_FRAMES)]
    pub pre_trigger_frames: usize,

    /// Ambient noise sampling window (milliseconds)
    #[arg(long = "calibration-window-ms", default_value_t = DEFAULT_CALIBRATION_WINDOW_MS)]
    pub calibration_window_ms: u64,

    /// Margin added to the ambient mean to bias against false triggers
    #[arg(long = "calibration-margin", default_value_t = DEFAULT_CALIBRATION_MARGIN)]
    pub calibration_margin: f32,

    /// Threshold used when calibration yields no frames
    #[arg(long = "fallback-threshold", default_value_t = DEFAULT_FALLBACK_THRESHOLD)]
    pub fallback_threshold: f32,

    /// Skip calibration and use this loudness threshold directly
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Frame channel capacity between the audio callback and the pull loop
    #[arg(long = "channel-capacity", default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    pub channel_capacity: usize,

    /// Wake word a transcript must contain (repeatable; defaults to the
    /// assistant's name and common mishearings)
    #[arg(long = "wake-word", action = ArgAction::Append, value_name = "WORD")]
    pub wake_words: Vec<String>,

    /// Enable JSON trace logging to a temp file
    #[arg(long = "logs", env = "VELA_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "VELA_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,
}

impl AppConfig {
    /// Pipeline tunables extracted from the CLI surface.
    pub fn capture_pipeline(&self) -> CapturePipelineConfig {
        CapturePipelineConfig {
            timeout_ms: self.timeout_ms,
            pre_trigger_frames: self.pre_trigger_frames,
            calibration_window_ms: self.calibration_window_ms,
            calibration_margin: self.calibration_margin,
            fallback_threshold: self.fallback_threshold,
            channel_capacity: self.channel_capacity,
            threshold_override: self.threshold,
        }
    }

    /// Wake words with the default alternatives applied when none were given.
    pub fn effective_wake_words(&self) -> Vec<String> {
        if self.wake_words.is_empty() {
            defaults::default_wake_words()
        } else {
            self.wake_words.clone()
        }
    }
}

/// Tunable parameters for the capture pipeline.
#[derive(Debug, Clone)]
pub struct CapturePipelineConfig {
    pub timeout_ms: u64,
    pub pre_trigger_frames: usize,
    pub calibration_window_ms: u64,
    pub calibration_margin: f32,
    pub fallback_threshold: f32,
    pub channel_capacity: usize,
    /// When set, calibration is skipped and this value is installed directly.
    pub threshold_override: Option<f32>,
}
