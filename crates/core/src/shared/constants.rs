pub const WHISPER_MODEL_NAME: &str = "ggml-base.bin";
pub const WHISPER_MODEL_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.bin";
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

pub const ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io/v1";
pub const ELEVENLABS_MODEL_ID: &str = "scribe_v1";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac"];

/// Output frame rate for the still-image video.
pub const OUTPUT_FPS: u32 = 25;

/// Lowercased prefixes that mark a lyric line as a section label.
pub const SECTION_MARKERS: &[&str] = &["verse", "chorus", "bridge"];

/// All-caps lines shorter than this (in characters) are treated as section labels.
pub const SECTION_LABEL_MAX_CHARS: usize = 15;
