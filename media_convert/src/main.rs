use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};

use media_convert::config::{check_input, prepare_output_dir, timeout_from_secs};
use media_convert::{ConsolePrompt, EngineConfig, Presets};
use shared_utils::logging::{init_logging, LogConfig};
use shared_utils::{run_conversion, MediaTranscoder, RunSummary, TargetFormat, TranscoderConfig};

#[derive(Parser, Debug)]
#[command(name = "media-convert")]
#[command(version, about = "Batch video, audio and image format converter", long_about = None)]
struct Cli {
    /// File or folder to convert. Asked interactively when omitted.
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Existing output folder. Defaults to a new "Converted Media" folder next to the input.
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Target for video files (a video or audio extension)
    #[arg(long, value_name = "EXT")]
    video_to: Option<TargetFormat>,

    /// Target for audio files
    #[arg(long, value_name = "EXT")]
    audio_to: Option<TargetFormat>,

    /// Target for image files
    #[arg(long, value_name = "EXT")]
    image_to: Option<TargetFormat>,

    /// Per-file limit for ffmpeg/ffprobe in seconds, 0 for none (default: 1800)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn print_summary(summary: &RunSummary, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", summary.to_json()?);
    } else {
        print!("{}", summary.render());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    if let Err(e) = init_logging(
        "media_convert",
        LogConfig::default()
            .with_level(level)
            .with_console_level(level),
    ) {
        eprintln!("⚠️  Logging unavailable: {:#}", e);
    }

    let presets = Presets {
        video: cli.video_to,
        audio: cli.audio_to,
        image: cli.image_to,
    };
    presets.validate()?;

    let mut prompt = ConsolePrompt::stdio();
    let interactive = cli.input.is_none();

    let input = match cli.input {
        Some(path) => {
            check_input(&path)?;
            path
        }
        None => prompt.ask_input_path().context("No input path given")?,
    };

    let chosen_output = match cli.output {
        Some(dir) => Some(dir),
        None if interactive => prompt.ask_output_folder().context("No output folder given")?,
        None => None,
    };
    let out_dir = prepare_output_dir(&input, chosen_output.as_deref())?;

    let transcoder_config = TranscoderConfig::from_env();
    let timeout = timeout_from_secs(cli.timeout, transcoder_config.timeout);
    let engine = EngineConfig::new(out_dir, transcoder_config.with_timeout(timeout));

    let missing = engine.transcoder.missing_tools();
    if !missing.is_empty() {
        warn!(
            "⚠️  Not found on PATH: {} (video and audio conversions will fail)",
            missing.join(", ")
        );
    }

    info!(
        input = %input.display(),
        out_dir = %engine.out_dir.display(),
        "Starting conversion"
    );

    let transcoder = MediaTranscoder::new(engine.transcoder.clone());
    let mut resolver = presets.into_resolver(Some(&mut prompt));
    let summary = match run_conversion(&input, &engine.out_dir, &transcoder, &mut resolver) {
        Ok(summary) => summary,
        Err(aborted) => {
            print_summary(&aborted.summary, cli.json)?;
            return Err(anyhow::Error::new(aborted.source).context("Conversion aborted"));
        }
    };
    print_summary(&summary, cli.json)?;

    if summary.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
