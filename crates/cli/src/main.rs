use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use passforge_core::{
    load_config, load_config_from_env, validate_config, Config, EncodingFormat, Engine,
    FormatPreset, PassProgress, TimeCode,
};

/// Buffer size for progress updates
const PROGRESS_BUFFER_SIZE: usize = 64;

#[derive(Parser, Debug)]
#[command(author, version, about = "Multi-pass ffmpeg encoding", long_about = None)]
struct Cli {
    /// Configuration file; defaults and PASSFORGE_* variables apply without one
    #[arg(short, long, env = "PASSFORGE_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a media file
    Encode {
        input: PathBuf,
        output: PathBuf,

        /// Format preset (x264, webm, theora, wmv, mp3, aac, flac, wav, vorbis)
        #[arg(short, long, default_value = "x264")]
        preset: FormatPreset,

        /// Number of passes, overriding the preset
        #[arg(long, allow_negative_numbers = true)]
        passes: Option<i32>,

        #[arg(long)]
        video_codec: Option<String>,

        #[arg(long)]
        audio_codec: Option<String>,

        /// Video bitrate in kbps
        #[arg(short, long)]
        bitrate: Option<u32>,

        /// Audio bitrate in kbps
        #[arg(long)]
        audio_bitrate: Option<u32>,

        /// Encoder threads, overriding the configuration
        #[arg(short, long)]
        threads: Option<u32>,

        /// Use encoder.commands from the configuration instead of the
        /// preset's codec and bitrate arguments
        #[arg(long)]
        configured_commands: bool,
    },

    /// Extract a single frame as an image
    Frame {
        input: PathBuf,
        output: PathBuf,

        /// Position as HH:MM:SS.ff
        #[arg(long)]
        at: TimeCode,

        /// Decode up to the exact position instead of seeking to a keyframe
        #[arg(long)]
        accurate: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => load_config_from_env().context("Failed to load config from environment")?,
    };

    match cli.command {
        Commands::Encode {
            input,
            output,
            preset,
            passes,
            video_codec,
            audio_codec,
            bitrate,
            audio_bitrate,
            threads,
            configured_commands,
        } => {
            if threads.is_some() {
                config.encoder.threads = threads;
            }
            validate_config(&config).context("Configuration validation failed")?;

            let mut format = EncodingFormat::from_preset(preset);
            if let Some(passes) = passes {
                format = format.with_passes(passes);
            }
            if let Some(codec) = video_codec {
                format = format.with_video_codec(codec);
            }
            if let Some(codec) = audio_codec {
                format = format.with_audio_codec(codec);
            }
            if let Some(kbps) = bitrate {
                format = format.with_kilo_bitrate(kbps);
            }
            if let Some(kbps) = audio_bitrate {
                format = format.with_audio_kilo_bitrate(kbps);
            }

            encode(config, input, output, format, configured_commands).await
        }
        Commands::Frame {
            input,
            output,
            at,
            accurate,
        } => {
            validate_config(&config).context("Configuration validation failed")?;

            let engine = Engine::from_config(config);
            let video = engine
                .open(&input)
                .await
                .with_context(|| format!("Failed to open {:?}", input))?;
            video
                .frame(at)
                .save(&output, accurate)
                .await
                .with_context(|| format!("Failed to extract frame at {}", at))?;

            info!("Frame written to {:?}", output);
            Ok(())
        }
    }
}

async fn encode(
    config: Config,
    input: PathBuf,
    output: PathBuf,
    format: EncodingFormat,
    configured_commands: bool,
) -> Result<()> {
    let engine = Engine::from_config(config);
    let video = engine
        .open(&input)
        .await
        .with_context(|| format!("Failed to open {:?}", input))?;

    let (tx, rx) = mpsc::channel(PROGRESS_BUFFER_SIZE);
    let format = format.with_progress(tx);
    let reporter = tokio::spawn(report_progress(rx));

    let result = if configured_commands {
        video
            .save_with_configured_commands(&format, &output)
            .await
            .map(|_| None)
    } else {
        video.encode(&format, &output).await.map(Some)
    };

    // Closing the channel ends the reporter.
    drop(format);
    let _ = reporter.await;

    match result.with_context(|| format!("Failed to encode {:?}", input))? {
        Some(summary) => info!(
            "Encoded {:?} in {} pass(es), {} ms",
            summary.output_path, summary.passes_run, summary.duration_ms
        ),
        None => info!("Encoded {:?} with configured commands", output),
    }
    Ok(())
}

async fn report_progress(mut rx: mpsc::Receiver<PassProgress>) {
    while let Some(progress) = rx.recv().await {
        info!(
            pass = progress.pass,
            total = progress.total_passes,
            speed = progress.speed.as_deref().unwrap_or("-"),
            "{:.1}%",
            progress.percent
        );
    }
}
