use std::path::{Path, PathBuf};

use thiserror::Error;

use super::caption_lyrics_use_case::{CaptionLyricsUseCase, CaptionSource};
use super::job_settings::JobSettings;
use super::pipeline_logger::{timed, PipelineLogger};
use crate::captions::domain::caption::Caption;
use crate::captions::domain::overlay_schedule::schedule_overlays;
use crate::captions::domain::timing_optimizer::{enforce_min_duration, optimize_timing};
use crate::captions::infrastructure::webvtt::write_webvtt;
use crate::media::domain::audio_probe::AudioProbe;
use crate::media::domain::video_composer::{CompositionRequest, VideoComposer};
use crate::shared::constants::{AUDIO_EXTENSIONS, IMAGE_EXTENSIONS};

#[derive(Error, Debug)]
pub enum JobError {
    #[error("unsupported image file {path} (expected one of: {expected})")]
    UnsupportedImage { path: PathBuf, expected: String },
    #[error("unsupported audio file {path} (expected one of: {expected})")]
    UnsupportedAudio { path: PathBuf, expected: String },
    #[error("lyrics are required")]
    MissingLyrics,
    #[error("invalid audio duration {0}")]
    InvalidDuration(f64),
}

/// Inputs and outputs of one lyric video job.
#[derive(Clone, Debug)]
pub struct VideoJob {
    pub image_path: PathBuf,
    pub audio_path: PathBuf,
    pub output_path: PathBuf,
    pub lyrics: String,
    /// Also write the final captions to this WebVTT file.
    pub vtt_path: Option<PathBuf>,
    /// Write captions to `output_path` as WebVTT instead of rendering video.
    pub captions_only: bool,
}

#[derive(Clone, Debug)]
pub struct VideoJobReport {
    pub duration: f64,
    pub source: CaptionSource,
    pub captions: Vec<Caption>,
    pub overlay_count: usize,
}

/// Full job: probe, caption, optimize timing, then render.
pub struct CreateVideoUseCase {
    probe: Box<dyn AudioProbe>,
    captioner: CaptionLyricsUseCase,
    composer: Box<dyn VideoComposer>,
    settings: JobSettings,
}

impl CreateVideoUseCase {
    pub fn new(
        probe: Box<dyn AudioProbe>,
        captioner: CaptionLyricsUseCase,
        composer: Box<dyn VideoComposer>,
        settings: JobSettings,
    ) -> Self {
        Self {
            probe,
            captioner,
            composer,
            settings,
        }
    }

    pub fn execute(
        &self,
        job: &VideoJob,
        logger: &mut dyn PipelineLogger,
    ) -> Result<VideoJobReport, Box<dyn std::error::Error>> {
        // 1. Validate inputs
        if !job.captions_only && !has_extension(&job.image_path, IMAGE_EXTENSIONS) {
            return Err(JobError::UnsupportedImage {
                path: job.image_path.clone(),
                expected: IMAGE_EXTENSIONS.join(", "),
            }
            .into());
        }
        if !has_extension(&job.audio_path, AUDIO_EXTENSIONS) {
            return Err(JobError::UnsupportedAudio {
                path: job.audio_path.clone(),
                expected: AUDIO_EXTENSIONS.join(", "),
            }
            .into());
        }
        if job.lyrics.trim().is_empty() {
            return Err(JobError::MissingLyrics.into());
        }

        // 2. Measure the audio
        let duration = timed(logger, "probe", || self.probe.duration(&job.audio_path))?;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(JobError::InvalidDuration(duration).into());
        }
        logger.info(&format!("Audio duration: {duration:.2}s"));

        // 3. Time the lyrics
        let track = self.captioner.execute(
            &job.lyrics,
            &job.audio_path,
            duration,
            self.settings.language_hint(),
            logger,
        )?;

        // 4. Make captions readable
        let captions = timed(logger, "optimize", || {
            let mut captions = optimize_timing(&track.captions);
            enforce_min_duration(&mut captions, self.settings.min_duration);
            captions
        });
        logger.info(&format!(
            "{} captions after timing optimization ({:?} timing)",
            captions.len(),
            track.source
        ));

        if let Some(vtt_path) = &job.vtt_path {
            write_webvtt(vtt_path, &captions)?;
            logger.info(&format!("Wrote captions to {}", vtt_path.display()));
        }

        if job.captions_only {
            write_webvtt(&job.output_path, &captions)?;
            logger.info(&format!("Wrote captions to {}", job.output_path.display()));
            return Ok(VideoJobReport {
                duration,
                source: track.source,
                captions,
                overlay_count: 0,
            });
        }

        // 5. Render
        let cues = schedule_overlays(&captions, duration, &self.settings.overlay_settings());
        logger.metric("overlay_count", cues.len() as f64);
        let request = CompositionRequest {
            image_path: job.image_path.clone(),
            audio_path: job.audio_path.clone(),
            output_path: job.output_path.clone(),
            duration,
            cues,
            style: self.settings.subtitle_style(),
        };
        timed(logger, "compose", || self.composer.compose(&request))?;
        logger.info(&format!("Video written to {}", job.output_path.display()));

        Ok(VideoJobReport {
            duration,
            source: track.source,
            captions,
            overlay_count: request.cues.len(),
        })
    }
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| allowed.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
