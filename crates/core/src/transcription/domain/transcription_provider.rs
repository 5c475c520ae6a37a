use std::path::Path;

use thiserror::Error;

use super::word::Word;

#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("no API key configured for {provider}")]
    MissingApiKey { provider: &'static str },
    #[error("authentication rejected by {provider}")]
    Unauthorized { provider: &'static str },
    #[error("rate limit exceeded or quota exhausted at {provider}")]
    RateLimited { provider: &'static str },
    #[error("{provider} returned HTTP {status}: {body}")]
    Http {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("request failed: {0}")]
    Request(String),
    #[error("could not decode transcription response: {0}")]
    Decode(String),
    #[error("speech model error: {0}")]
    Model(String),
    #[error("could not read audio: {0}")]
    Audio(String),
}

/// Domain interface for speech-to-text with word-level timestamps.
///
/// Failure of any kind means "no transcript available": callers fall back
/// to timing that does not depend on the transcript.
pub trait TranscriptionProvider: Send {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn transcribe(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<Vec<Word>, TranscriptionError>;
}
