pub mod audio_probe;
pub mod audio_reader;
pub mod audio_segment;
pub mod video_composer;
