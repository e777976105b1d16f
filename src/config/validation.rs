use super::defaults::{
    MAX_CALIBRATION_WINDOW_MS, MAX_CHANNEL_CAPACITY, MAX_LOUDNESS, MAX_PRE_TRIGGER_FRAMES,
    MAX_TIMEOUT_MS, MIN_CALIBRATION_WINDOW_MS, MIN_CHANNEL_CAPACITY, MIN_TIMEOUT_MS,
};
use super::AppConfig;
use anyhow::{bail, Result};
use clap::Parser;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values before any device is opened.
    pub fn validate(&mut self) -> Result<()> {
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            bail!(
                "--timeout-ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}, got {}",
                self.timeout_ms
            );
        }
        if self.pre_trigger_frames > MAX_PRE_TRIGGER_FRAMES {
            bail!(
                "--pre-trigger-frames must be at most {MAX_PRE_TRIGGER_FRAMES}, got {}",
                self.pre_trigger_frames
            );
        }
        if !(MIN_CALIBRATION_WINDOW_MS..=MAX_CALIBRATION_WINDOW_MS)
            .contains(&self.calibration_window_ms)
        {
            bail!(
                "--calibration-window-ms must be between {MIN_CALIBRATION_WINDOW_MS} and {MAX_CALIBRATION_WINDOW_MS}, got {}",
                self.calibration_window_ms
            );
        }
        if !(0.0..=MAX_LOUDNESS).contains(&self.calibration_margin) {
            bail!(
                "--calibration-margin must be between 0 and {MAX_LOUDNESS}, got {}",
                self.calibration_margin
            );
        }
        if !(0.0..=MAX_LOUDNESS).contains(&self.fallback_threshold) {
            bail!(
                "--fallback-threshold must be between 0 and {MAX_LOUDNESS}, got {}",
                self.fallback_threshold
            );
        }
        if let Some(threshold) = self.threshold {
            if !(0.0..=MAX_LOUDNESS).contains(&threshold) {
                bail!("--threshold must be between 0 and {MAX_LOUDNESS}, got {threshold}");
            }
        }
        if !(MIN_CHANNEL_CAPACITY..=MAX_CHANNEL_CAPACITY).contains(&self.channel_capacity) {
            bail!(
                "--channel-capacity must be between {MIN_CHANNEL_CAPACITY} and {MAX_CHANNEL_CAPACITY}, got {}",
                self.channel_capacity
            );
        }
        if self.wake_words.iter().any(|word| word.trim().is_empty()) {
            bail!("--wake-word values must not be empty");
        }
        if self.output.file_name().is_none() {
            bail!("--output must name a file, got {}", self.output.display());
        }
        Ok(())
    }
}
