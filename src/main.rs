//! `reelforge` CLI - generate narrated short-form videos from the terminal

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use reelforge::captions::TranscribedWord;
use reelforge::clients::pinata::PinataStore;
use reelforge::clients::venice::VeniceClient;
use reelforge::clients::whisper::WhisperAsr;
use reelforge::config::Config;
use reelforge::pipeline::{GenerationRequest, Pipeline};
use reelforge::render::FfmpegRenderer;

#[derive(Parser)]
#[command(name = "reelforge")]
#[command(about = "Turns a topic prompt into a narrated short-form video")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and publish a video for a topic
    Generate {
        /// The topic of the video (e.g. "Chernobyl", "Turtles")
        #[arg(short, long)]
        content: String,

        /// The presentation style (e.g. "Minecraft Parkour", "Soap Cutting")
        #[arg(short, long)]
        style: String,

        /// Target narration length in seconds
        #[arg(short, long, default_value = "60")]
        duration: u32,

        /// Ticker symbol recorded in the metadata document
        #[arg(long)]
        ticker: Option<String>,

        /// Description override for the metadata document
        #[arg(long)]
        description: Option<String>,

        /// Fixed image count (derived from audio length when omitted)
        #[arg(long)]
        images: Option<usize>,

        /// Skip transcription and use estimated caption timing
        #[arg(long)]
        no_transcribe: bool,
    },

    /// Build a caption timeline without generating a video
    Captions {
        /// The script text, or a path to a file containing it
        script: String,

        /// Audio duration in seconds to spread the captions over
        #[arg(short, long)]
        duration: f64,

        /// JSON file with transcribed words to align against
        #[arg(short, long)]
        transcript: Option<PathBuf>,
    },

    /// Check external tool and credential availability
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            content,
            style,
            duration,
            ticker,
            description,
            images,
            no_transcribe,
        } => {
            cmd_generate(content, style, duration, ticker, description, images, no_transcribe)
                .await?;
        }
        Commands::Captions { script, duration, transcript } => {
            cmd_captions(&script, duration, transcript.as_deref())?;
        }
        Commands::Check => {
            cmd_check().await?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn cmd_generate(
    content: String,
    style: String,
    duration: u32,
    ticker: Option<String>,
    description: Option<String>,
    images: Option<usize>,
    no_transcribe: bool,
) -> Result<()> {
    let config = Config::load()?;

    let venice = Arc::new(VeniceClient::new(config.venice).context("building API client")?);
    let renderer = Arc::new(FfmpegRenderer::new(config.render));
    let store = Arc::new(PinataStore::new(config.pinata).context("building content store")?);

    let mut pipeline = Pipeline::new(venice.clone(), venice.clone(), venice, renderer, store);

    if config.whisper.enabled && !no_transcribe {
        let asr = WhisperAsr::new(config.whisper);
        if asr.check_available().await {
            pipeline = pipeline.with_asr(Arc::new(asr));
        } else {
            eprintln!("⚠️  whisper not found, captions will use estimated timing");
        }
    }

    let request = GenerationRequest {
        content,
        style,
        target_duration_secs: duration,
        ticker,
        description,
        image_count: images,
    };

    eprintln!("🎬 Generating: {} ({})", request.content, request.style);
    let start = Instant::now();
    let result = pipeline.generate(request).await?;
    let elapsed = start.elapsed();

    eprintln!("\n✅ Published in {:.1}s", elapsed.as_secs_f64());
    eprintln!("   Metadata:  {}", result.metadata_uri);
    eprintln!("   Video:     {}", result.video_uri);
    if let Some(ref thumbnail) = result.thumbnail_uri {
        eprintln!("   Thumbnail: {thumbnail}");
    }
    eprintln!("\n--- Script ---\n{}", result.script);

    Ok(())
}

fn cmd_captions(script: &str, duration: f64, transcript: Option<&std::path::Path>) -> Result<()> {
    let script_text = if std::path::Path::new(script).exists() {
        std::fs::read_to_string(script).with_context(|| format!("failed to read {script}"))?
    } else {
        script.to_string()
    };

    let words: Option<Vec<TranscribedWord>> = match transcript {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Some(serde_json::from_str(&content).context("invalid transcript JSON")?)
        }
        None => None,
    };

    let timeline = reelforge::synchronize(&script_text, duration, words.as_deref());

    for event in &timeline {
        println!(
            "{:>8.3} {:>8.3}  {}{}",
            event.start_secs,
            event.end_secs,
            event.word,
            if event.highlighted { "  *" } else { "" }
        );
    }
    eprintln!("{} caption events over {duration}s", timeline.len());

    Ok(())
}

async fn cmd_check() -> Result<()> {
    let config = Config::load()?;

    let renderer = FfmpegRenderer::new(config.render);
    let ffmpeg_ok = renderer.check_available().await;
    println!("{} ffmpeg", if ffmpeg_ok { "✅" } else { "❌" });

    let ffprobe_ok = which::which("ffprobe").is_ok();
    println!("{} ffprobe", if ffprobe_ok { "✅" } else { "❌" });

    let whisper = WhisperAsr::new(config.whisper.clone());
    let whisper_ok = whisper.check_available().await;
    let whisper_note = if config.whisper.enabled { "" } else { " (disabled)" };
    println!("{} whisper{whisper_note}", if whisper_ok { "✅" } else { "⚠️ " });

    println!("{} VENICE_API_KEY", if config.venice.api_key.is_empty() { "❌" } else { "✅" });
    println!("{} PINATA_API_KEY", if config.pinata.api_key.is_empty() { "❌" } else { "✅" });
    println!(
        "{} PINATA_SECRET_API_KEY",
        if config.pinata.secret_api_key.is_empty() { "❌" } else { "✅" }
    );

    Ok(())
}
