use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use lyric_video_core::media::infrastructure::ffmpeg_audio_probe::FfmpegAudioProbe;
use lyric_video_core::media::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;
use lyric_video_core::media::infrastructure::ffmpeg_composer::FfmpegComposer;
use lyric_video_core::pipeline::caption_lyrics_use_case::CaptionLyricsUseCase;
use lyric_video_core::pipeline::create_video_use_case::{CreateVideoUseCase, VideoJob};
use lyric_video_core::pipeline::job_settings::{AlignmentMode, JobSettings};
use lyric_video_core::pipeline::pipeline_logger::{PipelineLogger, StdoutPipelineLogger};
use lyric_video_core::transcription::domain::transcription_provider::TranscriptionProvider;
use lyric_video_core::transcription::domain::transliterator::{
    PassthroughTransliterator, Transliterator,
};
use lyric_video_core::transcription::infrastructure::devanagari_transliterator::DevanagariTransliterator;
use lyric_video_core::transcription::infrastructure::elevenlabs_provider::{
    ElevenLabsConfig, ElevenLabsProvider,
};
use lyric_video_core::transcription::infrastructure::whisper_provider::WhisperProvider;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Transcriber {
    /// ElevenLabs Scribe (needs an API key).
    Elevenlabs,
    /// Local Whisper model, downloaded on first use.
    Whisper,
    /// No transcription; lyrics are spread evenly.
    None,
}

/// Lyric video maker: times lyrics to a song and burns them over an image.
#[derive(Parser)]
#[command(name = "lyric-video")]
struct Cli {
    /// Background image (jpg, jpeg or png).
    image: PathBuf,

    /// Song audio (mp3, wav or flac).
    audio: PathBuf,

    /// Output video file, or WebVTT file with --captions-only.
    output: PathBuf,

    /// Text file with the lyrics, one line per lyric line.
    #[arg(long)]
    lyrics: PathBuf,

    /// JSON settings file; flags given on the command line take precedence.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Language hint for transcription (e.g. en, hi).
    #[arg(long)]
    language: Option<String>,

    /// Lyric font size in pixels.
    #[arg(long)]
    font_size: Option<u32>,

    /// Lyric colour: a name such as yellow or white, or #rrggbb.
    #[arg(long)]
    font_color: Option<String>,

    /// Words shown together on screen.
    #[arg(long)]
    words_per_group: Option<usize>,

    /// Seconds to shift every lyric (negative shows them earlier).
    #[arg(long, allow_hyphen_values = true)]
    timing_offset: Option<f64>,

    /// Minimum seconds each caption stays on screen.
    #[arg(long)]
    min_duration: Option<f64>,

    /// Timing strategy: auto, transcript or even.
    #[arg(long)]
    alignment_mode: Option<AlignmentMode>,

    /// Prefix each lyric with its start time.
    #[arg(long)]
    debug: bool,

    /// Speech-to-text backend used for timing.
    #[arg(long, value_enum, default_value = "elevenlabs")]
    transcriber: Transcriber,

    /// ElevenLabs API key.
    #[arg(long, env = "ELEVENLABS_API_KEY", hide_env_values = true)]
    elevenlabs_api_key: Option<String>,

    /// Keep non-Latin transcript text as-is instead of romanizing it.
    #[arg(long)]
    no_transliterate: bool,

    /// Also write the final captions to this WebVTT file.
    #[arg(long)]
    vtt: Option<PathBuf>,

    /// Only write captions (as WebVTT) to OUTPUT; do not render video.
    #[arg(long)]
    captions_only: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let settings = build_settings(&cli)?;
    let lyrics = fs::read_to_string(&cli.lyrics)
        .map_err(|e| format!("Cannot read lyrics file {}: {e}", cli.lyrics.display()))?;

    let provider = build_provider(&cli, settings.alignment_mode)?;
    let transliterator: Box<dyn Transliterator> = if cli.no_transliterate {
        Box::new(PassthroughTransliterator)
    } else {
        Box::new(DevanagariTransliterator)
    };
    let captioner = CaptionLyricsUseCase::new(provider, transliterator, &settings);
    let use_case = CreateVideoUseCase::new(
        Box::new(FfmpegAudioProbe),
        captioner,
        Box::new(FfmpegComposer::new()),
        settings,
    );

    let job = VideoJob {
        image_path: cli.image,
        audio_path: cli.audio,
        output_path: cli.output,
        lyrics,
        vtt_path: cli.vtt,
        captions_only: cli.captions_only,
    };

    let mut logger = StdoutPipelineLogger::new();
    let report = use_case.execute(&job, &mut logger)?;
    logger.summary();
    println!(
        "Created {} captions ({:?} timing) over {:.1}s -> {}",
        report.captions.len(),
        report.source,
        report.duration,
        job.output_path.display()
    );
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.captions_only && !cli.image.exists() {
        return Err(format!("Image file not found: {}", cli.image.display()).into());
    }
    if !cli.audio.exists() {
        return Err(format!("Audio file not found: {}", cli.audio.display()).into());
    }
    if !cli.lyrics.exists() {
        return Err(format!("Lyrics file not found: {}", cli.lyrics.display()).into());
    }
    if let Some(settings) = &cli.settings {
        if !settings.exists() {
            return Err(format!("Settings file not found: {}", settings.display()).into());
        }
    }
    Ok(())
}

/// Settings file (or the default location) with command-line overrides.
fn build_settings(cli: &Cli) -> Result<JobSettings, Box<dyn std::error::Error>> {
    let mut settings = match &cli.settings {
        Some(path) => JobSettings::load(path)?,
        None => JobSettings::load_or_default()?,
    };

    if let Some(language) = &cli.language {
        settings.language = Some(language.clone());
    }
    if let Some(font_size) = cli.font_size {
        settings.font_size = font_size;
    }
    if let Some(font_color) = &cli.font_color {
        settings.font_color = font_color.clone();
    }
    if let Some(words_per_group) = cli.words_per_group {
        settings.words_per_group = words_per_group;
    }
    if let Some(timing_offset) = cli.timing_offset {
        settings.timing_offset = timing_offset;
    }
    if let Some(min_duration) = cli.min_duration {
        settings.min_duration = min_duration;
    }
    if let Some(mode) = cli.alignment_mode {
        settings.alignment_mode = mode;
    }
    if cli.debug {
        settings.debug_mode = true;
    }

    settings.validate()?;
    Ok(settings)
}

fn build_provider(
    cli: &Cli,
    mode: AlignmentMode,
) -> Result<Option<Box<dyn TranscriptionProvider>>, Box<dyn std::error::Error>> {
    if mode == AlignmentMode::Even {
        return Ok(None);
    }

    match cli.transcriber {
        Transcriber::None => Ok(None),
        Transcriber::Elevenlabs => {
            let config = ElevenLabsConfig::new(cli.elevenlabs_api_key.clone().unwrap_or_default());
            if !config.has_api_key() {
                log::warn!("No ElevenLabs API key set, lyrics will be spread evenly");
                return Ok(None);
            }
            log::info!("ElevenLabs API key found ({} chars)", config.api_key.len());
            Ok(Some(Box::new(ElevenLabsProvider::new(config)?)))
        }
        Transcriber::Whisper => {
            let provider = WhisperProvider::from_model_cache(Box::new(FfmpegAudioReader))?;
            log::info!("Using Whisper model {}", provider.model_path().display());
            Ok(Some(Box::new(provider)))
        }
    }
}
