use std::path::Path;

use ffmpeg_next::format::sample::Type as SampleType;
use ffmpeg_next::format::Sample;
use ffmpeg_next::util::frame::audio::Audio as AudioFrame;

use crate::media::domain::audio_reader::AudioReader;
use crate::media::domain::audio_segment::AudioSegment;

/// Decodes an audio file to mono f32 PCM using ffmpeg-next.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegAudioReader;

impl AudioReader for FfmpegAudioReader {
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
        if target_sample_rate == 0 {
            return Err("target sample rate must be positive".into());
        }
        ffmpeg_next::init()?;

        let mut ictx = ffmpeg_next::format::input(path)?;
        let Some(audio_stream) = ictx.streams().best(ffmpeg_next::media::Type::Audio) else {
            return Ok(None);
        };
        let audio_stream_index = audio_stream.index();

        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(audio_stream.parameters())?;
        let mut decoder = codec_ctx.decoder().audio()?;

        let mut resampler = ffmpeg_next::software::resampling::Context::get(
            decoder.format(),
            decoder.channel_layout(),
            decoder.rate(),
            Sample::F32(SampleType::Planar),
            ffmpeg_next::ChannelLayout::MONO,
            target_sample_rate,
        )?;

        let mut samples: Vec<f32> = Vec::new();
        let mut decoded = AudioFrame::empty();
        let mut resampled = AudioFrame::empty();

        for (stream, packet) in ictx.packets() {
            if stream.index() != audio_stream_index {
                continue;
            }
            decoder.send_packet(&packet)?;
            while decoder.receive_frame(&mut decoded).is_ok() {
                resampler.run(&decoded, &mut resampled)?;
                extract_f32_samples(&resampled, &mut samples);
            }
        }

        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded).is_ok() {
            resampler.run(&decoded, &mut resampled)?;
            extract_f32_samples(&resampled, &mut samples);
        }

        // The resampler may still hold buffered samples.
        if let Ok(Some(delay)) = resampler.flush(&mut resampled) {
            if delay.output > 0 {
                extract_f32_samples(&resampled, &mut samples);
            }
        }

        log::debug!(
            "Decoded {} samples at {target_sample_rate} Hz from {}",
            samples.len(),
            path.display()
        );
        Ok(Some(AudioSegment::mono(samples, target_sample_rate)))
    }
}

/// Appends the samples of a planar mono f32 frame.
fn extract_f32_samples(frame: &AudioFrame, out: &mut Vec<f32>) {
    let count = frame.samples();
    if count == 0 {
        return;
    }
    let data = frame.data(0);
    let available = data.len() / std::mem::size_of::<f32>();
    let count = count.min(available);
    // SAFETY: plane 0 of an F32 planar frame holds at least `count` f32 values.
    let floats = unsafe { std::slice::from_raw_parts(data.as_ptr() as *const f32, count) };
    out.extend_from_slice(floats);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_file() -> &'static Path {
        if cfg!(windows) {
            Path::new("Z:\\nonexistent\\song.mp3")
        } else {
            Path::new("/nonexistent/song.mp3")
        }
    }

    #[test]
    fn test_read_audio_nonexistent_file() {
        assert!(FfmpegAudioReader.read_audio(missing_file(), 16000).is_err());
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let err = FfmpegAudioReader.read_audio(missing_file(), 0).unwrap_err();
        assert!(err.to_string().contains("sample rate"));
    }
}
