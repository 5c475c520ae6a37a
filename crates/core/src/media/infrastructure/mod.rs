pub mod ffmpeg_audio_probe;
pub mod ffmpeg_audio_reader;
pub mod ffmpeg_composer;
