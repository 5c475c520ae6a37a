use std::path::Path;

use crate::media::domain::audio_probe::AudioProbe;
use crate::media::domain::audio_reader::AudioReader;
use crate::shared::constants::WHISPER_SAMPLE_RATE;

use super::ffmpeg_audio_reader::FfmpegAudioReader;

/// Container durations are expressed in microseconds.
const CONTAINER_TIME_BASE: f64 = 1_000_000.0;

/// Reads audio duration from stream or container metadata, decoding the
/// file as a last resort.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegAudioProbe;

impl AudioProbe for FfmpegAudioProbe {
    fn duration(&self, path: &Path) -> Result<f64, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Audio)
            .ok_or_else(|| format!("no audio stream in {}", path.display()))?;

        let from_stream = ticks_to_seconds(stream.duration(), f64::from(stream.time_base()));
        let from_container = ticks_to_seconds(ictx.duration(), 1.0 / CONTAINER_TIME_BASE);
        if let Some(seconds) = from_stream.or(from_container) {
            log::debug!("Audio duration of {}: {seconds:.3}s", path.display());
            return Ok(seconds);
        }

        log::warn!(
            "No duration metadata in {}, decoding to measure",
            path.display()
        );
        let decoded = FfmpegAudioReader
            .read_audio(path, WHISPER_SAMPLE_RATE)?
            .ok_or_else(|| format!("no audio stream in {}", path.display()))?;
        let seconds = decoded.duration();
        if seconds.is_finite() && seconds > 0.0 {
            Ok(seconds)
        } else {
            Err(format!("audio in {} has zero length", path.display()).into())
        }
    }
}

/// Converts a duration in `time_base` units to seconds. Unknown (negative)
/// or empty durations yield None.
fn ticks_to_seconds(ticks: i64, time_base: f64) -> Option<f64> {
    if ticks <= 0 {
        return None;
    }
    let seconds = ticks as f64 * time_base;
    (seconds.is_finite() && seconds > 0.0).then_some(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case::stream_ticks(441_000, 1.0 / 44_100.0, Some(10.0))]
    #[case::container_micros(2_500_000, 1.0 / CONTAINER_TIME_BASE, Some(2.5))]
    #[case::zero(0, 1.0 / 44_100.0, None)]
    #[case::no_pts(i64::MIN, 1.0 / 44_100.0, None)]
    #[case::zero_time_base(1000, 0.0, None)]
    fn test_ticks_to_seconds(#[case] ticks: i64, #[case] base: f64, #[case] expected: Option<f64>) {
        match (ticks_to_seconds(ticks, base), expected) {
            (Some(actual), Some(expected)) => assert_relative_eq!(actual, expected, epsilon = 1e-9),
            (actual, expected) => assert_eq!(actual, expected),
        }
    }

    #[test]
    fn test_nonexistent_file_is_error() {
        assert!(FfmpegAudioProbe
            .duration(Path::new("/nonexistent/track.wav"))
            .is_err());
    }
}
