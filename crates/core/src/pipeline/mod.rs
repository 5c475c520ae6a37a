pub mod caption_lyrics_use_case;
pub mod create_video_use_case;
pub mod job_settings;
pub mod pipeline_logger;
