//! Vela: a voice-triggered assistant built around a real-time microphone
//! capture and voice-activity-detection core.
//!
//! The core listens to a microphone stream, detects when the user starts and
//! stops speaking, and persists each utterance as a WAV artifact. Everything
//! downstream (speech-to-text, intent classification) is a collaborator
//! reached through the traits in [`assistant`].

pub mod assistant;
pub mod audio;
pub mod config;
pub mod telemetry;

pub use assistant::{Assistant, Exchange, Intent, IntentClassifier, Transcriber};
pub use audio::{CapturePipeline, Frame, FrameSource, Utterance, WavSink};
