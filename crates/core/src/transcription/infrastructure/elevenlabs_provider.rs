use std::path::Path;
use std::time::Duration;

use reqwest::blocking::multipart::Form;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::shared::constants::{ELEVENLABS_BASE_URL, ELEVENLABS_MODEL_ID};
use crate::transcription::domain::transcription_provider::{
    TranscriptionError, TranscriptionProvider,
};
use crate::transcription::domain::word::{Word, WordKind};

const PROVIDER: &str = "elevenlabs";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);
const PREVIEW_CHARS: usize = 100;

/// Credentials and endpoint for the ElevenLabs Scribe speech-to-text API.
#[derive(Clone, PartialEq)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub base_url: String,
    pub model_id: String,
}

impl ElevenLabsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: ELEVENLABS_BASE_URL.to_string(),
            model_id: ELEVENLABS_MODEL_ID.to_string(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn endpoint(&self) -> String {
        format!("{}/speech-to-text", self.base_url.trim_end_matches('/'))
    }
}

// The key must never end up in logs.
impl std::fmt::Debug for ElevenLabsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsConfig")
            .field("api_key", &format_args!("<{} chars>", self.api_key.len()))
            .field("base_url", &self.base_url)
            .field("model_id", &self.model_id)
            .finish()
    }
}

#[derive(Deserialize)]
struct ScribeResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    language_code: Option<String>,
    #[serde(default)]
    words: Option<Vec<ScribeWord>>,
}

#[derive(Deserialize)]
struct ScribeWord {
    #[serde(default)]
    text: String,
    start: Option<f64>,
    end: Option<f64>,
    #[serde(rename = "type", default)]
    kind: Option<WordKind>,
}

/// Transcribes audio through ElevenLabs Scribe, returning word timings.
pub struct ElevenLabsProvider {
    config: ElevenLabsConfig,
    client: Client,
}

impl ElevenLabsProvider {
    pub fn new(config: ElevenLabsConfig) -> Result<Self, TranscriptionError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TranscriptionError::Request(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ElevenLabsConfig {
        &self.config
    }
}

impl TranscriptionProvider for ElevenLabsProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn transcribe(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<Vec<Word>, TranscriptionError> {
        if !self.config.has_api_key() {
            return Err(TranscriptionError::MissingApiKey { provider: PROVIDER });
        }

        let size_mb = std::fs::metadata(audio_path)
            .map_err(|e| TranscriptionError::Audio(format!("{}: {e}", audio_path.display())))?
            .len() as f64
            / (1024.0 * 1024.0);
        log::info!(
            "Transcribing {} ({size_mb:.2} MB) with ElevenLabs model {}, language {}",
            audio_path.display(),
            self.config.model_id,
            language.unwrap_or("auto-detect")
        );

        let mut form = Form::new()
            .text("model_id", self.config.model_id.clone())
            .file("file", audio_path)
            .map_err(|e| TranscriptionError::Audio(format!("{}: {e}", audio_path.display())))?;
        if let Some(language) = language.filter(|l| !l.trim().is_empty()) {
            form = form.text("language_code", language.trim().to_string());
        }

        let response = self
            .client
            .post(self.config.endpoint())
            .header("xi-api-key", self.config.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .map_err(|e| TranscriptionError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| TranscriptionError::Request(e.to_string()))?;
        check_status(status, body.as_str())?;

        parse_response(&body)
    }
}

/// Maps a non-success HTTP status to the matching error.
fn check_status(status: u16, body: &str) -> Result<(), TranscriptionError> {
    match status {
        200..=299 => Ok(()),
        401 => {
            log::error!("ElevenLabs rejected the API key: {body}");
            Err(TranscriptionError::Unauthorized { provider: PROVIDER })
        }
        429 => {
            log::error!("ElevenLabs rate limit or quota exhausted: {body}");
            Err(TranscriptionError::RateLimited { provider: PROVIDER })
        }
        _ => Err(TranscriptionError::Http {
            provider: PROVIDER,
            status,
            body: body.to_string(),
        }),
    }
}

/// Extracts timestamped entries from a Scribe JSON response. Entries
/// without timing are dropped.
fn parse_response(body: &str) -> Result<Vec<Word>, TranscriptionError> {
    let response: ScribeResponse =
        serde_json::from_str(body).map_err(|e| TranscriptionError::Decode(e.to_string()))?;

    let preview: String = response.text.chars().take(PREVIEW_CHARS).collect();
    log::info!(
        "Transcription received ({}): \"{preview}\"",
        response.language_code.as_deref().unwrap_or("unknown language")
    );

    let Some(entries) = response.words else {
        log::warn!("No word-level timing in the transcription response");
        return Ok(Vec::new());
    };

    let mut words = Vec::with_capacity(entries.len());
    let mut untimed = 0;
    for entry in entries {
        let (Some(start), Some(end)) = (entry.start, entry.end) else {
            untimed += 1;
            continue;
        };
        words.push(Word {
            text: entry.text,
            start,
            end,
            kind: entry.kind.unwrap_or(WordKind::Other),
        });
    }
    if untimed > 0 {
        log::warn!("Dropped {untimed} transcript entries without timing");
    }
    log::info!("Received timing for {} words/tokens", words.len());

    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    const SAMPLE: &str = r#"{
        "language_code": "en",
        "language_probability": 0.98,
        "text": "Hello world.",
        "words": [
            {"text": "Hello", "start": 0.1, "end": 0.5, "type": "word"},
            {"text": " ", "start": 0.5, "end": 0.6, "type": "spacing"},
            {"text": "world.", "start": 0.6, "end": 1.2, "type": "word"},
            {"text": "(music)", "start": 1.2, "end": 3.0, "type": "audio_event"}
        ]
    }"#;

    #[test]
    fn test_parse_response_words() {
        let words = parse_response(SAMPLE).unwrap();
        assert_eq!(words.len(), 4);
        assert_eq!(words[0].text, "Hello");
        assert_relative_eq!(words[2].end, 1.2);
        assert_eq!(words[1].kind, WordKind::Spacing);
        assert_eq!(words[3].kind, WordKind::Other);
    }

    #[test]
    fn test_parse_response_without_words() {
        let words = parse_response(r#"{"text": "hi"}"#).unwrap();
        assert!(words.is_empty());
    }

    #[test]
    fn test_parse_response_drops_untimed_entries() {
        let body = r#"{"text": "a b", "words": [
            {"text": "a"},
            {"text": "b", "start": 1.0, "end": 1.5, "type": "word"}
        ]}"#;
        let words = parse_response(body).unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "b");
        assert!(words[0].is_word());
    }

    #[test]
    fn test_parse_response_untyped_entry_is_not_spoken() {
        let body = r#"{"text": "hum", "words": [
            {"text": "hum", "start": 0.0, "end": 0.5}
        ]}"#;
        let words = parse_response(body).unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].kind, WordKind::Other);
        assert!(!words[0].is_word());
    }

    #[test]
    fn test_parse_response_invalid_json() {
        assert!(matches!(
            parse_response("not json"),
            Err(TranscriptionError::Decode(_))
        ));
    }

    #[rstest]
    #[case::ok(200, true)]
    #[case::created(201, true)]
    #[case::unauthorized(401, false)]
    #[case::rate_limited(429, false)]
    #[case::server_error(500, false)]
    fn test_check_status(#[case] status: u16, #[case] ok: bool) {
        assert_eq!(check_status(status, "body").is_ok(), ok);
    }

    #[test]
    fn test_check_status_variants() {
        assert!(matches!(
            check_status(401, ""),
            Err(TranscriptionError::Unauthorized { .. })
        ));
        assert!(matches!(
            check_status(429, ""),
            Err(TranscriptionError::RateLimited { .. })
        ));
        match check_status(503, "down") {
            Err(TranscriptionError::Http { status, body, .. }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "down");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_api_key_fails_before_request() {
        let provider = ElevenLabsProvider::new(ElevenLabsConfig::new("  ")).unwrap();
        let err = provider
            .transcribe(Path::new("/nonexistent/song.mp3"), None)
            .unwrap_err();
        assert!(matches!(err, TranscriptionError::MissingApiKey { .. }));
    }

    #[test]
    fn test_unreadable_audio_is_audio_error() {
        let provider = ElevenLabsProvider::new(ElevenLabsConfig::new("key")).unwrap();
        let err = provider
            .transcribe(Path::new("/nonexistent/song.mp3"), Some("en"))
            .unwrap_err();
        assert!(matches!(err, TranscriptionError::Audio(_)));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let mut config = ElevenLabsConfig::new("k");
        assert_eq!(
            config.endpoint(),
            "https://api.elevenlabs.io/v1/speech-to-text"
        );
        config.base_url = "http://localhost:8080/v1/".into();
        assert_eq!(config.endpoint(), "http://localhost:8080/v1/speech-to-text");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = ElevenLabsConfig::new("super-secret");
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<12 chars>"));
    }
}
