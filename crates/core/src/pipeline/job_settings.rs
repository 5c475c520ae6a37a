use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alignment::domain::alignment_config::{AlignmentConfig, ConfigError, SegmenterConfig};
use crate::captions::domain::overlay_schedule::OverlaySettings;
use crate::captions::domain::timing_optimizer::MIN_DURATION;
use crate::media::domain::video_composer::{SubtitleStyle, DEFAULT_FONT_COLOR, DEFAULT_FONT_SIZE};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// How lyric lines get their timing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentMode {
    /// Align lyrics to the transcript, falling back to the transcript
    /// itself and then to even distribution.
    #[default]
    Auto,
    /// Captions come straight from the transcript, grouped by word count.
    #[serde(alias = "elevenlabs")]
    Transcript,
    /// Lyrics spread evenly over the audio; no transcription.
    Even,
}

impl AlignmentMode {
    pub const ALL: &[AlignmentMode] = &[
        AlignmentMode::Auto,
        AlignmentMode::Transcript,
        AlignmentMode::Even,
    ];
}

impl fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentMode::Auto => write!(f, "auto"),
            AlignmentMode::Transcript => write!(f, "transcript"),
            AlignmentMode::Even => write!(f, "even"),
        }
    }
}

impl FromStr for AlignmentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(AlignmentMode::Auto),
            "transcript" | "elevenlabs" => Ok(AlignmentMode::Transcript),
            "even" => Ok(AlignmentMode::Even),
            other => Err(format!(
                "unknown alignment mode '{other}' (expected auto, transcript or even)"
            )),
        }
    }
}

/// Per-job options for captioning and rendering a lyric video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSettings {
    /// Language hint for transcription, e.g. `en` or `hi`. None lets the
    /// provider detect it.
    pub language: Option<String>,
    pub font_size: u32,
    pub font_color: String,
    pub words_per_group: usize,
    /// Shift applied to every overlay, in seconds.
    pub timing_offset: f64,
    /// Minimum on-screen time of a caption after optimization.
    pub min_duration: f64,
    pub alignment_mode: AlignmentMode,
    /// Prefix overlays with their start time.
    pub debug_mode: bool,
    pub alignment: AlignmentConfig,
    pub segmenter: SegmenterConfig,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            language: None,
            font_size: DEFAULT_FONT_SIZE,
            font_color: DEFAULT_FONT_COLOR.to_string(),
            words_per_group: 3,
            timing_offset: 0.0,
            min_duration: MIN_DURATION,
            alignment_mode: AlignmentMode::Auto,
            debug_mode: false,
            alignment: AlignmentConfig::default(),
            segmenter: SegmenterConfig::default(),
        }
    }
}

impl JobSettings {
    /// `settings.json` in the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Lyric Video").join("settings.json"))
    }

    /// Reads settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Settings from the default location, or defaults when there is no
    /// file there.
    pub fn load_or_default() -> Result<Self, SettingsError> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.words_per_group == 0 {
            return Err(invalid("words_per_group", "must be at least 1"));
        }
        if !self.min_duration.is_finite() || self.min_duration <= 0.0 {
            return Err(invalid(
                "min_duration",
                format!("must be positive, got {}", self.min_duration),
            ));
        }
        if self.font_size == 0 {
            return Err(invalid("font_size", "must be positive"));
        }
        if self.font_color.trim().is_empty() {
            return Err(invalid("font_color", "must not be empty"));
        }
        if !self.timing_offset.is_finite() {
            return Err(invalid("timing_offset", "must be a finite number"));
        }
        self.alignment.validate()?;
        self.segmenter.validate()?;
        Ok(())
    }

    /// Language hint with blanks treated as "detect".
    pub fn language_hint(&self) -> Option<&str> {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    pub fn overlay_settings(&self) -> OverlaySettings {
        OverlaySettings {
            timing_offset: self.timing_offset,
            words_per_group: self.words_per_group,
            debug_mode: self.debug_mode,
        }
    }

    pub fn subtitle_style(&self) -> SubtitleStyle {
        SubtitleStyle {
            font_size: self.font_size,
            font_color: self.font_color.clone(),
        }
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> SettingsError {
    SettingsError::Invalid {
        name,
        reason: reason.into(),
    }
}
