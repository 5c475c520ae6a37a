use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be between 0.0 and 1.0, got {value}")]
    OutOfUnitRange { name: &'static str, value: f64 },
    #[error("{name} must be a non-negative number, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("{name} must be at least 1")]
    Zero { name: &'static str },
}

/// Tuning knobs for lyric-to-transcript alignment.
///
/// The defaults are the values the aligner has always shipped with; there
/// is no reference corpus behind them, so change them only with evidence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// A transcript unit matches a lyric line only when the Jaccard overlap
    /// of their word sets is strictly above this value.
    pub similarity_threshold: f64,
    /// Alignment is abandoned when fewer than this fraction of lines match...
    pub min_match_rate: f64,
    /// ...and there are more than this many lyric lines.
    pub min_lines_for_abort: usize,
    /// Transcript chunks without punctuation close once they hold more than
    /// this many words.
    pub max_chunk_words: usize,
    /// Silence before the first match longer than this is fillable.
    pub leading_gap_threshold: f64,
    /// Space between two matches longer than this is fillable.
    pub inner_gap_threshold: f64,
    /// Time after the last match longer than this is fillable.
    pub trailing_gap_threshold: f64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.3,
            min_match_rate: 0.10,
            min_lines_for_abort: 5,
            max_chunk_words: 10,
            leading_gap_threshold: 1.0,
            inner_gap_threshold: 0.5,
            trailing_gap_threshold: 1.0,
        }
    }
}

impl AlignmentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        unit_range("similarity_threshold", self.similarity_threshold)?;
        unit_range("min_match_rate", self.min_match_rate)?;
        if self.max_chunk_words == 0 {
            return Err(ConfigError::Zero {
                name: "max_chunk_words",
            });
        }
        non_negative("leading_gap_threshold", self.leading_gap_threshold)?;
        non_negative("inner_gap_threshold", self.inner_gap_threshold)?;
        non_negative("trailing_gap_threshold", self.trailing_gap_threshold)?;
        Ok(())
    }
}

/// Tuning knobs for turning a raw transcript into captions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Silence between two words longer than this closes a sentence.
    pub gap_threshold: f64,
    /// Sentence captions are extended to at least this long.
    pub min_duration: f64,
    /// Word-group captions are extended to at least this long.
    pub word_group_min_duration: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            gap_threshold: 0.7,
            min_duration: 1.0,
            word_group_min_duration: 0.5,
        }
    }
}

impl SegmenterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("gap_threshold", self.gap_threshold)?;
        non_negative("min_duration", self.min_duration)?;
        non_negative("word_group_min_duration", self.word_group_min_duration)?;
        Ok(())
    }
}

fn unit_range(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_defaults() {
        let config = AlignmentConfig::default();
        assert_eq!(config.similarity_threshold, 0.3);
        assert_eq!(config.min_match_rate, 0.10);
        assert_eq!(config.min_lines_for_abort, 5);
        assert_eq!(config.max_chunk_words, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AlignmentConfig =
            serde_json::from_str(r#"{"similarity_threshold": 0.5}"#).unwrap();
        assert_eq!(config.similarity_threshold, 0.5);
        assert_eq!(config.min_match_rate, 0.10);
        assert_eq!(config.inner_gap_threshold, 0.5);
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let config = AlignmentConfig {
            similarity_threshold: 1.5,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("similarity_threshold"));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let config = AlignmentConfig {
            max_chunk_words: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Zero {
                name: "max_chunk_words"
            })
        );
    }

    #[test]
    fn test_negative_gap_rejected() {
        let config = AlignmentConfig {
            inner_gap_threshold: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_segmenter_defaults() {
        let config = SegmenterConfig::default();
        assert_eq!(config.gap_threshold, 0.7);
        assert_eq!(config.min_duration, 1.0);
        assert_eq!(config.word_group_min_duration, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_segmenter_nan_rejected() {
        let config = SegmenterConfig {
            gap_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
