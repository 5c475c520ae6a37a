use std::path::PathBuf;

use crate::captions::domain::overlay_schedule::OverlayCue;

pub const DEFAULT_FONT_SIZE: u32 = 45;
pub const DEFAULT_FONT_COLOR: &str = "yellow";

/// How burned-in lyrics look on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct SubtitleStyle {
    pub font_size: u32,
    pub font_color: String,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            font_color: DEFAULT_FONT_COLOR.to_string(),
        }
    }
}

/// Everything needed to render one lyric video.
#[derive(Clone, Debug)]
pub struct CompositionRequest {
    pub image_path: PathBuf,
    pub audio_path: PathBuf,
    pub output_path: PathBuf,
    /// Length of the output in seconds.
    pub duration: f64,
    pub cues: Vec<OverlayCue>,
    pub style: SubtitleStyle,
}

/// Domain interface for rendering a still image, an audio track and timed
/// text into a video file.
pub trait VideoComposer: Send {
    fn compose(&self, request: &CompositionRequest) -> Result<(), Box<dyn std::error::Error>>;
}
