use super::{
    AppConfig, DEFAULT_CALIBRATION_MARGIN, DEFAULT_PRE_TRIGGER_FRAMES, DEFAULT_TIMEOUT_MS,
};
use clap::Parser;

fn parse(args: &[&str]) -> AppConfig {
    let mut full = vec!["vela"];
    full.extend_from_slice(args);
    AppConfig::try_parse_from(full).expect("arguments parse")
}

#[test]
fn defaults_parse_and_validate() {
    let mut config = parse(&[]);
    config.validate().expect("defaults are valid");
    assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    assert_eq!(config.pre_trigger_frames, DEFAULT_PRE_TRIGGER_FRAMES);
    assert_eq!(config.calibration_margin, DEFAULT_CALIBRATION_MARGIN);
    assert!(!config.once);
    assert!(config.threshold.is_none());
}

#[test]
fn rejects_zero_timeout() {
    let mut config = parse(&["--timeout-ms", "0"]);
    let err = config.validate().expect_err("zero timeout rejected");
    assert!(err.to_string().contains("--timeout-ms"));
}

#[test]
fn rejects_excessive_timeout() {
    let mut config = parse(&["--timeout-ms", "60000"]);
    assert!(config.validate().is_err());
}

#[test]
fn accepts_zero_pre_trigger_frames() {
    let mut config = parse(&["--pre-trigger-frames", "0"]);
    config.validate().expect("pre-roll may be disabled");
}

#[test]
fn rejects_huge_pre_trigger() {
    let mut config = parse(&["--pre-trigger-frames", "4096"]);
    let err = config.validate().expect_err("excessive pre-roll rejected");
    assert!(err.to_string().contains("--pre-trigger-frames"));
}

#[test]
fn rejects_negative_margin() {
    let mut config = parse(&["--calibration-margin=-1"]);
    assert!(config.validate().is_err());
}

#[test]
fn rejects_out_of_range_threshold_override() {
    let mut config = parse(&["--threshold", "2000"]);
    let err = config.validate().expect_err("threshold out of range");
    assert!(err.to_string().contains("--threshold"));
}

#[test]
fn accepts_threshold_override_in_range() {
    let mut config = parse(&["--threshold", "25"]);
    config.validate().expect("in-range threshold");
    assert_eq!(config.threshold, Some(25.0));
    assert_eq!(config.capture_pipeline().threshold_override, Some(25.0));
}

#[test]
fn rejects_tiny_channel_capacity() {
    let mut config = parse(&["--channel-capacity", "4"]);
    assert!(config.validate().is_err());
}

#[test]
fn rejects_empty_wake_word() {
    let mut config = parse(&["--wake-word", ""]);
    let err = config.validate().expect_err("empty wake word rejected");
    assert!(err.to_string().contains("--wake-word"));
}

#[test]
fn wake_words_default_when_not_given() {
    let config = parse(&[]);
    let words = config.effective_wake_words();
    assert!(words.contains(&"vela".to_string()));
    assert!(words.len() > 1, "defaults include mishearings");
}

#[test]
fn explicit_wake_words_replace_defaults() {
    let config = parse(&["--wake-word", "nova", "--wake-word", "supernova"]);
    assert_eq!(
        config.effective_wake_words(),
        vec!["nova".to_string(), "supernova".to_string()]
    );
}

#[test]
fn capture_pipeline_mirrors_cli_values() {
    let config = parse(&[
        "--timeout-ms",
        "750",
        "--pre-trigger-frames",
        "6",
        "--calibration-window-ms",
        "500",
    ]);
    let pipeline = config.capture_pipeline();
    assert_eq!(pipeline.timeout_ms, 750);
    assert_eq!(pipeline.pre_trigger_frames, 6);
    assert_eq!(pipeline.calibration_window_ms, 500);
}
