use std::path::Path;

use super::audio_segment::AudioSegment;

/// Domain interface for decoding an audio file to PCM.
pub trait AudioReader: Send + Sync {
    /// Decode the best audio stream to mono PCM at the given sample rate.
    /// Returns None if the file has no audio stream.
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>>;
}
