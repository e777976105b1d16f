use std::env;
use std::path::PathBuf;

pub const DEFAULT_TIMEOUT_MS: u64 = 1_000;
pub const DEFAULT_PRE_TRIGGER_FRAMES: usize = 10;
pub const DEFAULT_CALIBRATION_WINDOW_MS: u64 = 1_000;
pub const DEFAULT_CALIBRATION_MARGIN: f32 = 15.0;
pub const DEFAULT_FALLBACK_THRESHOLD: f32 = 10.0;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

pub(super) const MIN_TIMEOUT_MS: u64 = 100;
pub(super) const MAX_TIMEOUT_MS: u64 = 30_000;
pub(super) const MIN_CALIBRATION_WINDOW_MS: u64 = 100;
pub(super) const MAX_CALIBRATION_WINDOW_MS: u64 = 10_000;
pub(super) const MAX_PRE_TRIGGER_FRAMES: usize = 512;
pub(super) const MIN_CHANNEL_CAPACITY: usize = 8;
pub(super) const MAX_CHANNEL_CAPACITY: usize = 1_024;
// Loudness is RMS normalized to full scale and scaled by 1000, so 1000 is
// the ceiling any real frame can measure.
pub(super) const MAX_LOUDNESS: f32 = 1_000.0;

/// Artifact location when the caller does not pick one. Overwritten on each
/// capture; no history is kept.
pub fn default_artifact_path() -> PathBuf {
    env::temp_dir().join("vela_capture.wav")
}

/// The assistant's name plus mishearings STT engines commonly produce.
pub fn default_wake_words() -> Vec<String> {
    ["vela", "vella", "bella", "veila", "bela"]
        .iter()
        .map(|word| word.to_string())
        .collect()
}
