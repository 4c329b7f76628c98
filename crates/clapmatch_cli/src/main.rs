//! clapmatch - find the time offset between two recordings of one event.
//!
//! Prints the offset of the second input relative to the first, in
//! seconds, plus a confidence score. A positive offset means the second
//! input starts later than the first.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use clapmatch_core::alignment::{find_offset, AlignConfig, OffsetResult};
use clapmatch_core::config::ConfigManager;

#[derive(Parser, Debug)]
#[command(name = "clapmatch", version = clapmatch_core::version(), about)]
struct Cli {
    /// Reference recording (e.g. the camera file).
    reference: PathBuf,

    /// Recording to locate within the reference (e.g. the field recorder).
    other: PathBuf,

    /// Settings file to load (TOML). Created with defaults if missing.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Analysis sample rate in Hz.
    #[arg(long, value_name = "HZ")]
    sample_rate: Option<u32>,

    /// Maximum duration analyzed per source, in seconds.
    #[arg(long, value_name = "SECONDS")]
    max_duration: Option<f64>,

    /// Correlation window size in feature frames.
    #[arg(long, value_name = "FRAMES")]
    correlation_window: Option<usize>,

    /// Analysis window length in samples.
    #[arg(long, value_name = "SAMPLES")]
    window_length: Option<usize>,

    /// FFT size in samples.
    #[arg(long, value_name = "SAMPLES")]
    fft_size: Option<usize>,

    /// Cepstral coefficients retained per frame.
    #[arg(long, value_name = "COUNT")]
    cepstral_coefficients: Option<usize>,

    /// Name or path of the ffmpeg binary.
    #[arg(long, value_name = "PATH")]
    ffmpeg: Option<String>,

    /// Emit the result as JSON on stdout.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, String> {
    let config = build_config(cli)?;
    tracing::debug!(?config, "resolved configuration");

    let result =
        find_offset(&cli.reference, &cli.other, &config).map_err(|e| e.to_string())?;

    if cli.json {
        let json = serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?;
        println!("{json}");
    } else {
        println!(
            "offset: {:+.3} s (score {:.2})",
            result.offset_seconds, result.score
        );
    }

    if result.score == 0.0 && result.offset_seconds == 0.0 {
        eprintln!(
            "note: no alignment could be computed; the clips may be too \
             short for the correlation window or may not overlap"
        );
    } else if !result.is_confident() {
        eprintln!(
            "note: score {:.2} is below {:.1}; the match is not statistically \
             distinguishable from noise - verify the alignment manually",
            result.score,
            OffsetResult::LOW_CONFIDENCE
        );
    }

    Ok(ExitCode::SUCCESS)
}

/// Resolve the effective configuration: settings file first, then
/// command-line overrides on top.
fn build_config(cli: &Cli) -> Result<AlignConfig, String> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut manager = ConfigManager::new(path);
            manager.load_or_create().map_err(|e| e.to_string())?;
            manager.settings().align_config()
        }
        None => AlignConfig::default(),
    };

    if let Some(rate) = cli.sample_rate {
        config.sample_rate = rate;
    }
    if let Some(duration) = cli.max_duration {
        config.max_duration_s = duration;
    }
    if let Some(window) = cli.correlation_window {
        config.correlation_window_frames = window;
    }
    if let Some(length) = cli.window_length {
        config.window_len = length;
    }
    if let Some(size) = cli.fft_size {
        config.fft_size = size;
    }
    if let Some(count) = cli.cepstral_coefficients {
        config.nceps = count;
    }
    if let Some(path) = &cli.ffmpeg {
        config.ffmpeg_path = path.clone();
    }

    Ok(config)
}

/// Initialize global tracing subscriber.
///
/// Respects RUST_LOG, defaulting to warnings only so normal runs stay
/// quiet on stderr.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            reference: PathBuf::from("a.mov"),
            other: PathBuf::from("b.wav"),
            config: None,
            sample_rate: None,
            max_duration: None,
            correlation_window: None,
            window_length: None,
            fft_size: None,
            cepstral_coefficients: None,
            ffmpeg: None,
            json: false,
        }
    }

    #[test]
    fn defaults_are_engine_defaults() {
        let config = build_config(&base_cli()).unwrap();
        assert_eq!(config.sample_rate, 8000);
        assert_eq!(config.correlation_window_frames, 1000);
    }

    #[test]
    fn flags_override_defaults() {
        let mut cli = base_cli();
        cli.sample_rate = Some(16_000);
        cli.correlation_window = Some(500);
        cli.ffmpeg = Some("/opt/ffmpeg/bin/ffmpeg".to_string());

        let config = build_config(&cli).unwrap();

        assert_eq!(config.sample_rate, 16_000);
        assert_eq!(config.correlation_window_frames, 500);
        assert_eq!(config.ffmpeg_path, "/opt/ffmpeg/bin/ffmpeg");
    }

    #[test]
    fn cli_parses_positional_and_flags() {
        let cli = Cli::parse_from([
            "clapmatch",
            "cam.mov",
            "rec.wav",
            "--sample-rate",
            "16000",
            "--json",
        ]);

        assert_eq!(cli.reference, PathBuf::from("cam.mov"));
        assert_eq!(cli.other, PathBuf::from("rec.wav"));
        assert_eq!(cli.sample_rate, Some(16_000));
        assert!(cli.json);
    }
}
