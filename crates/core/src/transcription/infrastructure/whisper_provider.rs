use std::path::{Path, PathBuf};

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::media::domain::audio_reader::AudioReader;
use crate::shared::constants::{WHISPER_MODEL_NAME, WHISPER_MODEL_URL, WHISPER_SAMPLE_RATE};
use crate::shared::model_resolver;
use crate::transcription::domain::transcription_provider::{
    TranscriptionError, TranscriptionProvider,
};
use crate::transcription::domain::word::Word;

const PROVIDER: &str = "whisper";
/// Peak amplitude at or below which audio is treated as silence.
const SILENCE_THRESHOLD: f32 = 1e-4;

/// One decoded Whisper token with its time span in seconds.
#[derive(Clone, Debug, PartialEq)]
struct TokenSpan {
    text: String,
    start: f64,
    end: f64,
}

/// Local speech-to-text using whisper.cpp via whisper-rs.
pub struct WhisperProvider {
    model_path: PathBuf,
    reader: Box<dyn AudioReader>,
}

impl WhisperProvider {
    pub fn new(model_path: &Path, reader: Box<dyn AudioReader>) -> Result<Self, TranscriptionError> {
        if !model_path.exists() {
            return Err(TranscriptionError::Model(format!(
                "Whisper model not found at: {}",
                model_path.display()
            )));
        }
        Ok(Self {
            model_path: model_path.to_path_buf(),
            reader,
        })
    }

    /// Uses the cached model, downloading it on first use.
    pub fn from_model_cache(reader: Box<dyn AudioReader>) -> Result<Self, TranscriptionError> {
        let progress: model_resolver::ProgressFn = Box::new(|done, total| {
            if total > 0 && done == total {
                log::info!("Whisper model downloaded ({total} bytes)");
            }
        });
        let model_path =
            model_resolver::resolve(WHISPER_MODEL_NAME, WHISPER_MODEL_URL, None, Some(progress))
                .map_err(|e| TranscriptionError::Model(e.to_string()))?;
        Self::new(&model_path, reader)
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn run_model(
        &self,
        samples: &[f32],
        language: Option<&str>,
    ) -> Result<Vec<TokenSpan>, TranscriptionError> {
        let model_path = self
            .model_path
            .to_str()
            .ok_or_else(|| TranscriptionError::Model("model path is not valid UTF-8".into()))?;
        let ctx = WhisperContext::new_with_params(model_path, WhisperContextParameters::default())
            .map_err(|e| TranscriptionError::Model(format!("failed to load Whisper model: {e}")))?;
        let mut state = ctx
            .create_state()
            .map_err(|e| TranscriptionError::Model(format!("failed to create Whisper state: {e}")))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 0 });
        params.set_language(Some(language.unwrap_or("auto")));
        params.set_translate(false);
        params.set_token_timestamps(true);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(num_cpus().min(4) as i32);

        state
            .full(params, samples)
            .map_err(|e| TranscriptionError::Model(format!("Whisper inference failed: {e}")))?;

        let mut tokens = Vec::new();
        for seg_idx in 0..state.full_n_segments() {
            let Some(segment) = state.get_segment(seg_idx) else {
                continue;
            };
            for tok_idx in 0..segment.n_tokens() {
                let Some(token) = segment.get_token(tok_idx) else {
                    continue;
                };
                let Ok(text) = token.to_str() else {
                    continue;
                };
                let data = token.token_data();
                // Token timestamps are in centiseconds.
                tokens.push(TokenSpan {
                    text: text.to_string(),
                    start: data.t0 as f64 / 100.0,
                    end: data.t1 as f64 / 100.0,
                });
            }
        }
        Ok(tokens)
    }
}

impl TranscriptionProvider for WhisperProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn transcribe(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<Vec<Word>, TranscriptionError> {
        let audio = self
            .reader
            .read_audio(audio_path, WHISPER_SAMPLE_RATE)
            .map_err(|e| TranscriptionError::Audio(e.to_string()))?
            .ok_or_else(|| {
                TranscriptionError::Audio(format!("no audio stream in {}", audio_path.display()))
            })?;

        if audio.is_empty() || audio.is_silent(SILENCE_THRESHOLD) {
            log::warn!("Audio is silent, nothing to transcribe");
            return Ok(Vec::new());
        }

        log::info!(
            "Transcribing {:.1}s of audio with local Whisper model {}",
            audio.duration(),
            self.model_path.display()
        );
        let tokens = self.run_model(audio.samples(), language)?;
        let words = merge_tokens(&tokens);
        log::info!("Whisper produced {} words", words.len());
        Ok(words)
    }
}

/// Joins sub-word tokens into words. A token starting with whitespace
/// opens a new word; special tokens and tokens without a positive span are
/// skipped.
fn merge_tokens(tokens: &[TokenSpan]) -> Vec<Word> {
    let mut words: Vec<Word> = Vec::new();
    let mut open = false;

    for token in tokens {
        let trimmed = token.text.trim();
        if trimmed.is_empty() || is_special(trimmed) {
            open = false;
            continue;
        }
        if token.end <= token.start {
            continue;
        }

        let continues_word = open && !token.text.starts_with(char::is_whitespace);
        open = true;
        if continues_word {
            if let Some(word) = words.last_mut() {
                word.text.push_str(trimmed);
                word.end = word.end.max(token.end);
                continue;
            }
        }
        words.push(Word::new(trimmed, token.start, token.end));
    }

    words
}

/// Control tokens such as `[_BEG_]`, `[_TT_150]` or `<|endoftext|>`.
fn is_special(text: &str) -> bool {
    text.starts_with("[_") || text.starts_with("<|")
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::domain::audio_segment::AudioSegment;
    use approx::assert_relative_eq;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    struct StubAudioReader {
        segment: Option<AudioSegment>,
        requested_rate: Arc<Mutex<Option<u32>>>,
    }

    impl AudioReader for StubAudioReader {
        fn read_audio(
            &self,
            _: &Path,
            target_sample_rate: u32,
        ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
            *self.requested_rate.lock().unwrap() = Some(target_sample_rate);
            Ok(self.segment.clone())
        }
    }

    fn token(text: &str, start: f64, end: f64) -> TokenSpan {
        TokenSpan {
            text: text.to_string(),
            start,
            end,
        }
    }

    /// Provider backed by a placeholder model file; only the paths that
    /// return before inference are exercised.
    fn provider_with(
        segment: Option<AudioSegment>,
    ) -> (WhisperProvider, Arc<Mutex<Option<u32>>>, TempDir) {
        let dir = TempDir::new().unwrap();
        let model = dir.path().join("ggml-test.bin");
        std::fs::write(&model, b"not a real model").unwrap();

        let requested_rate = Arc::new(Mutex::new(None));
        let reader = StubAudioReader {
            segment,
            requested_rate: requested_rate.clone(),
        };
        let provider = WhisperProvider::new(&model, Box::new(reader)).unwrap();
        (provider, requested_rate, dir)
    }

    #[test]
    fn test_new_missing_model_is_error() {
        let reader = StubAudioReader {
            segment: None,
            requested_rate: Arc::new(Mutex::new(None)),
        };
        let err = WhisperProvider::new(Path::new("/nonexistent/model.bin"), Box::new(reader))
            .err()
            .unwrap();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_merge_tokens_joins_subwords() {
        let tokens = vec![
            token("[_BEG_]", 0.0, 0.0),
            token(" Hel", 0.0, 0.3),
            token("lo", 0.3, 0.5),
            token(" world", 0.6, 1.0),
            token(".", 1.0, 1.1),
        ];
        let words = merge_tokens(&tokens);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "Hello");
        assert_relative_eq!(words[0].start, 0.0);
        assert_relative_eq!(words[0].end, 0.5);
        assert_eq!(words[1].text, "world.");
        assert_relative_eq!(words[1].end, 1.1);
        assert!(words.iter().all(Word::is_word));
    }

    #[test]
    fn test_merge_tokens_special_token_breaks_word() {
        let tokens = vec![
            token(" la", 0.0, 0.5),
            token("[_TT_50]", 0.5, 0.5),
            token("la", 1.0, 1.5),
        ];
        let words = merge_tokens(&tokens);
        assert_eq!(words.len(), 2);
    }

    #[test]
    fn test_merge_tokens_skips_empty_spans() {
        let tokens = vec![token(" ghost", 2.0, 2.0), token(" real", 2.0, 2.4)];
        let words = merge_tokens(&tokens);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "real");
    }

    #[test]
    fn test_silent_audio_yields_no_words_at_whisper_rate() {
        let (provider, rate, _dir) = provider_with(Some(AudioSegment::mono(vec![0.0; 16000], 16000)));
        let words = provider.transcribe(Path::new("song.mp3"), None).unwrap();
        assert!(words.is_empty());
        assert_eq!(*rate.lock().unwrap(), Some(WHISPER_SAMPLE_RATE));
    }

    #[test]
    fn test_missing_audio_stream_is_error() {
        let (provider, _, _dir) = provider_with(None);
        let err = provider.transcribe(Path::new("song.mp3"), None).unwrap_err();
        assert!(matches!(err, TranscriptionError::Audio(_)));
    }

    #[test]
    #[ignore] // Requires the Whisper model download
    fn test_transcribe_sine_wave_does_not_fail() {
        use crate::media::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;

        let provider = WhisperProvider::from_model_cache(Box::new(FfmpegAudioReader)).unwrap();
        let samples: Vec<f32> = (0..48_000)
            .map(|i| (2.0 * std::f64::consts::PI * 440.0 * i as f64 / 16_000.0).sin() as f32)
            .collect();
        let result = provider.run_model(&samples, Some("en"));
        assert!(result.is_ok(), "inference failed: {result:?}");
    }
}
