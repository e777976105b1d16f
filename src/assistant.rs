//! Thin orchestration around the capture core.
//!
//! Transcription and intent classification are external collaborators; this
//! module only defines their interfaces and the loop that stitches them to
//! the capture pipeline: capture one utterance, transcribe the artifact,
//! gate on the wake word, classify.

use crate::audio::{Calibration, CapturePipeline, FrameSource, WavSink};
use anyhow::Result;
use std::path::Path;
use std::sync::atomic::AtomicBool;

/// Speech-to-text collaborator. Consumes a finished audio artifact and
/// returns recognized text, or `None` when the input was not understood.
/// The pipeline does not inspect or retry that failure.
pub trait Transcriber {
    fn transcribe(&mut self, artifact: &Path) -> Result<Option<String>>;
}

/// Intent collaborator. Consumes recognized text and returns a label from a
/// fixed set, or [`Intent::Unrecognized`].
pub trait IntentClassifier {
    fn classify(&mut self, text: &str) -> Intent;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Label(String),
    Unrecognized,
}

/// Outcome of one captured utterance, after transcription and gating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchange {
    /// The transcriber could not make sense of the audio.
    NotUnderstood,
    /// Transcribed fine, but the wake word was absent; no intent lookup.
    Ignored { transcript: String },
    /// Wake word present; the classifier was consulted.
    Classified { transcript: String, intent: Intent },
}

/// Case-insensitive containment check against the wake-word alternatives
/// (the assistant's name plus mishearings STT engines commonly produce).
pub fn contains_wake_word(text: &str, wake_words: &[String]) -> bool {
    let lowered = text.to_lowercase();
    wake_words
        .iter()
        .filter(|word| !word.is_empty())
        .any(|word| lowered.contains(&word.to_lowercase()))
}

pub struct Assistant<S, T, C> {
    pipeline: CapturePipeline<S>,
    sink: WavSink,
    transcriber: T,
    classifier: C,
    wake_words: Vec<String>,
}

impl<S, T, C> Assistant<S, T, C>
where
    S: FrameSource,
    T: Transcriber,
    C: IntentClassifier,
{
    pub fn new(
        pipeline: CapturePipeline<S>,
        sink: WavSink,
        transcriber: T,
        classifier: C,
        wake_words: Vec<String>,
    ) -> Self {
        Self {
            pipeline,
            sink,
            transcriber,
            classifier,
            wake_words,
        }
    }

    pub fn calibrate(&mut self) -> Result<Calibration> {
        self.pipeline.calibrate()
    }

    /// Capture one utterance end to end. `Ok(None)` when cancelled via the
    /// stop flag before an utterance was finalized.
    pub fn handle_once(&mut self, stop: Option<&AtomicBool>) -> Result<Option<Exchange>> {
        let Some(utterance) = self.pipeline.capture_utterance(stop)? else {
            return Ok(None);
        };
        let artifact = self.sink.write(&utterance)?;
        let transcript = self.transcriber.transcribe(&artifact)?;
        Ok(Some(self.process_transcript(transcript)))
    }

    fn process_transcript(&mut self, transcript: Option<String>) -> Exchange {
        match transcript {
            None => Exchange::NotUnderstood,
            Some(text) if text.trim().is_empty() => Exchange::NotUnderstood,
            Some(text) => {
                if contains_wake_word(&text, &self.wake_words) {
                    let intent = self.classifier.classify(&text);
                    Exchange::Classified {
                        transcript: text,
                        intent,
                    }
                } else {
                    tracing::debug!("transcript lacks wake word, skipping");
                    Exchange::Ignored { transcript: text }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{CaptureConfig, Frame, WavSink, FRAME_SAMPLES};
    use std::path::PathBuf;

    struct SilentSource;

    impl FrameSource for SilentSource {
        fn next_frame(&mut self) -> Result<Frame> {
            Ok(Frame::from_samples(vec![0; FRAME_SAMPLES]))
        }
    }

    struct FakeTranscriber;

    impl Transcriber for FakeTranscriber {
        fn transcribe(&mut self, _artifact: &Path) -> Result<Option<String>> {
            Ok(None)
        }
    }

    struct FakeClassifier {
        seen: Vec<String>,
    }

    impl IntentClassifier for FakeClassifier {
        fn classify(&mut self, text: &str) -> Intent {
            self.seen.push(text.to_string());
            Intent::Label("greeting".to_string())
        }
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    fn test_assistant() -> Assistant<SilentSource, FakeTranscriber, FakeClassifier> {
        let pipeline = CapturePipeline::new(SilentSource, CaptureConfig::default());
        let sink = WavSink::new(PathBuf::from("unused.wav"));
        Assistant::new(
            pipeline,
            sink,
            FakeTranscriber,
            FakeClassifier { seen: Vec::new() },
            words(&["vela", "bella"]),
        )
    }

    #[test]
    fn wake_word_match_is_case_insensitive() {
        let wake = words(&["vela"]);
        assert!(contains_wake_word("Hey Vela, what time is it", &wake));
        assert!(!contains_wake_word("hey there", &wake));
    }

    #[test]
    fn any_alternative_matches() {
        let wake = words(&["vela", "bella"]);
        assert!(contains_wake_word("bella turn on the lights", &wake));
    }

    #[test]
    fn empty_wake_words_never_match() {
        assert!(!contains_wake_word("vela hello", &words(&[""])));
        assert!(!contains_wake_word("vela hello", &[]));
    }

    #[test]
    fn missing_transcript_is_not_understood() {
        let mut assistant = test_assistant();
        assert_eq!(assistant.process_transcript(None), Exchange::NotUnderstood);
    }

    #[test]
    fn blank_transcript_is_not_understood() {
        let mut assistant = test_assistant();
        assert_eq!(
            assistant.process_transcript(Some("   ".to_string())),
            Exchange::NotUnderstood
        );
    }

    #[test]
    fn transcript_without_wake_word_is_ignored() {
        let mut assistant = test_assistant();
        let exchange = assistant.process_transcript(Some("play some music".to_string()));
        assert_eq!(
            exchange,
            Exchange::Ignored {
                transcript: "play some music".to_string()
            }
        );
        assert!(assistant.classifier.seen.is_empty());
    }

    #[test]
    fn wake_word_routes_to_classifier() {
        let mut assistant = test_assistant();
        let exchange = assistant.process_transcript(Some("vela say hello".to_string()));
        assert_eq!(
            exchange,
            Exchange::Classified {
                transcript: "vela say hello".to_string(),
                intent: Intent::Label("greeting".to_string()),
            }
        );
        assert_eq!(assistant.classifier.seen, vec!["vela say hello"]);
    }

    struct ScriptedSource {
        frames: std::vec::IntoIter<Frame>,
        pace: std::time::Duration,
    }

    impl FrameSource for ScriptedSource {
        fn next_frame(&mut self) -> Result<Frame> {
            std::thread::sleep(self.pace);
            self.frames
                .next()
                .ok_or_else(|| anyhow::anyhow!("scripted source exhausted"))
        }
    }

    struct CannedTranscriber(Option<String>);

    impl Transcriber for CannedTranscriber {
        fn transcribe(&mut self, _artifact: &Path) -> Result<Option<String>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn handle_once_runs_capture_through_classification() {
        let loud = Frame::from_samples(
            (0..FRAME_SAMPLES)
                .map(|i| if i % 2 == 0 { 16_384 } else { -16_384 })
                .collect(),
        );
        let mut frames = vec![loud];
        frames.extend(std::iter::repeat(Frame::from_samples(vec![0; FRAME_SAMPLES])).take(30));
        let source = ScriptedSource {
            frames: frames.into_iter(),
            pace: std::time::Duration::from_millis(5),
        };

        let cfg = CaptureConfig {
            timeout_ms: 30,
            pre_trigger_frames: 4,
            ..CaptureConfig::default()
        };
        let mut pipeline = CapturePipeline::new(source, cfg);
        pipeline.set_threshold(100.0);

        let dir = tempfile::tempdir().expect("tempdir");
        let sink = WavSink::new(dir.path().join("capture.wav"));
        let mut assistant = Assistant::new(
            pipeline,
            sink,
            CannedTranscriber(Some("vela lights on".to_string())),
            FakeClassifier { seen: Vec::new() },
            words(&["vela"]),
        );

        let exchange = assistant
            .handle_once(None)
            .expect("capture succeeds")
            .expect("not cancelled");
        assert_eq!(
            exchange,
            Exchange::Classified {
                transcript: "vela lights on".to_string(),
                intent: Intent::Label("greeting".to_string()),
            }
        );
    }
}
