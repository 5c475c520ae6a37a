pub mod alignment;
pub mod captions;
pub mod lyrics;
pub mod media;
pub mod pipeline;
pub mod shared;
pub mod transcription;
