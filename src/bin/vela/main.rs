use anyhow::Result;
use vela::audio::{CaptureConfig, CapturePipeline, MicSource, WavSink};
use vela::config::AppConfig;
use vela::telemetry;

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    telemetry::init_tracing(&config);

    if config.list_input_devices {
        for name in MicSource::list_devices()? {
            println!("{name}");
        }
        return Ok(());
    }

    let pipeline_cfg = config.capture_pipeline();
    let capture_cfg = CaptureConfig::from(&pipeline_cfg);
    let source = MicSource::open(config.input_device.as_deref(), capture_cfg.channel_capacity)?;
    let mut pipeline = CapturePipeline::new(source, capture_cfg);
    let sink = WavSink::new(config.output.clone());

    if config.calibrate_only {
        let calibration = pipeline.calibrate()?;
        println!(
            "ambient mean {:.2}, threshold {:.2} ({} frames sampled)",
            calibration.ambient_mean, calibration.threshold, calibration.frames_sampled
        );
        return Ok(());
    }

    if config.once {
        let captured = match pipeline_cfg.threshold_override {
            Some(threshold) => {
                pipeline.set_threshold(threshold);
                match pipeline.capture_utterance(None)? {
                    Some(utterance) => {
                        sink.write(&utterance)?;
                        true
                    }
                    None => false,
                }
            }
            None => pipeline.capture_once(&sink, None)?,
        };
        if captured {
            println!("captured utterance to {}", sink.path().display());
        }
        return Ok(());
    }

    match pipeline_cfg.threshold_override {
        Some(threshold) => pipeline.set_threshold(threshold),
        None => {
            pipeline.calibrate()?;
        }
    }
    println!("listening (threshold {:.2})", pipeline.threshold());
    pipeline.listen(&sink, None, |path| {
        println!("captured utterance to {}", path.display());
    })
}
