use std::path::Path;

use thiserror::Error;

use super::job_settings::{AlignmentMode, JobSettings, SettingsError};
use super::pipeline_logger::{timed, PipelineLogger};
use crate::alignment::domain::alignment_config::SegmenterConfig;
use crate::alignment::domain::even_distributor::distribute_evenly;
use crate::alignment::domain::lyrics_aligner::{
    AlignmentError, AlignmentOutcome, InconclusiveReason, LyricsAligner,
};
use crate::alignment::domain::transcript_segmenter::TranscriptSegmenter;
use crate::captions::domain::caption::Caption;
use crate::lyrics::domain::preprocessor::preprocess_lyrics;
use crate::transcription::domain::transcription_provider::TranscriptionProvider;
use crate::transcription::domain::transliterator::Transliterator;
use crate::transcription::domain::word::Word;

#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl From<AlignmentError> for CaptionError {
    fn from(err: AlignmentError) -> Self {
        match err {
            AlignmentError::InvalidInput { message } => CaptionError::InvalidInput(message),
        }
    }
}

/// Which path produced a caption track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptionSource {
    /// Lyric lines timed against the transcript.
    Aligned,
    /// Captions built from the transcript text itself.
    Transcript,
    /// Lyric lines spread evenly over the audio.
    Even,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaptionTrack {
    pub captions: Vec<Caption>,
    pub source: CaptionSource,
}

/// Times lyrics against audio, degrading from alignment to the raw
/// transcript to even distribution.
pub struct CaptionLyricsUseCase {
    provider: Option<Box<dyn TranscriptionProvider>>,
    transliterator: Box<dyn Transliterator>,
    aligner: LyricsAligner,
    segmenter: SegmenterConfig,
    mode: AlignmentMode,
    words_per_group: usize,
}

impl CaptionLyricsUseCase {
    pub fn new(
        provider: Option<Box<dyn TranscriptionProvider>>,
        transliterator: Box<dyn Transliterator>,
        settings: &JobSettings,
    ) -> Self {
        Self {
            provider,
            transliterator,
            aligner: LyricsAligner::new(settings.alignment.clone()),
            segmenter: settings.segmenter.clone(),
            mode: settings.alignment_mode,
            words_per_group: settings.words_per_group.max(1),
        }
    }

    pub fn execute(
        &self,
        lyrics_text: &str,
        audio_path: &Path,
        duration: f64,
        language: Option<&str>,
        logger: &mut dyn PipelineLogger,
    ) -> Result<CaptionTrack, CaptionError> {
        let lines = preprocess_lyrics(lyrics_text);
        if lines.is_empty() {
            return Err(CaptionError::InvalidInput(
                "Valid lyrics are required. Please provide lyrics text.".into(),
            ));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(CaptionError::InvalidInput(format!(
                "Could not determine audio duration (got {duration})"
            )));
        }
        logger.info(&format!("Processed lyrics into {} lines", lines.len()));

        let track = match self.mode {
            AlignmentMode::Even => {
                logger.info("Distributing lyrics evenly as requested");
                even(&lines, duration)
            }
            AlignmentMode::Auto | AlignmentMode::Transcript => {
                match self.fetch_transcript(audio_path, language, logger) {
                    Some(words) => self.caption_from_transcript(&lines, &words, duration, logger)?,
                    None => {
                        logger.warn("No transcript available, distributing lyrics evenly");
                        even(&lines, duration)
                    }
                }
            }
        };

        logger.metric("caption_count", track.captions.len() as f64);
        Ok(track)
    }

    /// Words from the provider, or None when there is no provider or it
    /// failed.
    fn fetch_transcript(
        &self,
        audio_path: &Path,
        language: Option<&str>,
        logger: &mut dyn PipelineLogger,
    ) -> Option<Vec<Word>> {
        let provider = self.provider.as_ref()?;
        logger.info(&format!("Transcribing audio with {}", provider.name()));

        match timed(logger, "transcribe", || provider.transcribe(audio_path, language)) {
            Ok(words) => {
                log::info!("Transcript has {} entries", words.len());
                for word in words.iter().filter(|w| w.is_word()).take(3) {
                    log::debug!("  '{}' at {:.2}s - {:.2}s", word.text, word.start, word.end);
                }
                Some(words)
            }
            Err(e) => {
                logger.warn(&format!("Transcription with {} failed: {e}", provider.name()));
                None
            }
        }
    }

    fn caption_from_transcript(
        &self,
        lines: &[String],
        words: &[Word],
        duration: f64,
        logger: &mut dyn PipelineLogger,
    ) -> Result<CaptionTrack, CaptionError> {
        let segmenter = TranscriptSegmenter::new(self.segmenter.clone(), self.transliterator.as_ref());

        if self.mode == AlignmentMode::Transcript {
            let captions = segmenter.group_words(words, self.words_per_group);
            if captions.is_empty() {
                logger.warn("Transcript has no words, distributing lyrics evenly");
                return Ok(even(lines, duration));
            }
            logger.info(&format!(
                "Using {} transcript captions directly",
                captions.len()
            ));
            return Ok(CaptionTrack {
                captions,
                source: CaptionSource::Transcript,
            });
        }

        let outcome = timed(logger, "align", || self.aligner.align(lines, words, duration))?;
        let reason = match outcome {
            AlignmentOutcome::Aligned(alignment) => {
                logger.metric("match_rate", alignment.match_rate());
                logger.info(&format!(
                    "Aligned {} lyric segments ({}/{} lines matched)",
                    alignment.segments.len(),
                    alignment.matched_lines,
                    alignment.total_lines
                ));
                return Ok(CaptionTrack {
                    captions: alignment.segments.iter().map(|s| s.to_caption()).collect(),
                    source: CaptionSource::Aligned,
                });
            }
            AlignmentOutcome::Inconclusive(reason) => reason,
        };

        if let InconclusiveReason::LowMatchRate { matched, total } = reason {
            logger.metric("match_rate", matched as f64 / total as f64);
        }
        logger.warn(&format!(
            "Lyrics could not be aligned ({}), using transcript timing",
            describe(&reason)
        ));

        let captions = segmenter.segment(words);
        if captions.is_empty() {
            logger.warn("Transcript has no words, distributing lyrics evenly");
            return Ok(even(lines, duration));
        }
        Ok(CaptionTrack {
            captions,
            source: CaptionSource::Transcript,
        })
    }
}

fn even(lines: &[String], duration: f64) -> CaptionTrack {
    CaptionTrack {
        captions: distribute_evenly(lines, duration)
            .into_iter()
            .map(Caption::from)
            .collect(),
        source: CaptionSource::Even,
    }
}

fn describe(reason: &InconclusiveReason) -> String {
    match reason {
        InconclusiveReason::NoTranscriptWords => "transcript has no words".into(),
        InconclusiveReason::LowMatchRate { matched, total } => {
            format!("only {matched}/{total} lines matched")
        }
        InconclusiveReason::NothingAligned => "no line matched".into(),
    }
}
