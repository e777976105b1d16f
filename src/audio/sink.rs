//! WAV persistence for finalized utterances.
//!
//! Frames are serialized verbatim (no re-encoding) into a self-describing
//! container at a single fixed path. Each write overwrites the previous
//! artifact; there is no versioning or history.

use super::capture::Utterance;
use super::{BITS_PER_SAMPLE, CHANNELS, SAMPLE_RATE};
use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs;
use std::path::{Path, PathBuf};

pub struct WavSink {
    path: PathBuf,
}

impl WavSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the utterance's PCM payload, prefix frames first, in arrival
    /// order. A failure here is fatal to this capture attempt only; the
    /// pipeline may retry on the next utterance.
    pub fn write(&self, utterance: &Utterance) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create artifact directory {}", parent.display())
                })?;
            }
        }
        let spec = WavSpec {
            channels: CHANNELS,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: BITS_PER_SAMPLE,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&self.path, spec)
            .with_context(|| format!("failed to create {}", self.path.display()))?;
        for frame in utterance.frames() {
            for &sample in frame.samples() {
                writer.write_sample(sample)?;
            }
        }
        writer
            .finalize()
            .with_context(|| format!("failed to finalize {}", self.path.display()))?;
        tracing::debug!(
            path = %self.path.display(),
            frames = utterance.frame_count(),
            duration_ms = utterance.duration().as_millis() as u64,
            "utterance persisted"
        );
        Ok(self.path.clone())
    }
}
