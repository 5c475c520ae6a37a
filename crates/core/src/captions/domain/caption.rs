/// A timed text interval meant for on-screen display.
///
/// Times are seconds from the start of the audio track. Within a finalized
/// list captions are ordered by `start` and do not overlap.
#[derive(Clone, Debug, PartialEq)]
pub struct Caption {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Caption {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// True when the interval is non-empty and both bounds are finite.
    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.end > self.start
    }
}

/// Match score carried by segments placed into timing gaps rather than
/// matched against the transcript.
pub const GAP_FILLED_SCORE: f64 = 0.0;

/// A lyric line with the interval the aligner assigned to it.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignedSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    /// Jaccard word overlap in `[0, 1]`; [`GAP_FILLED_SCORE`] for gap-filled lines.
    pub match_score: f64,
}

impl AlignedSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>, match_score: f64) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            match_score,
        }
    }

    pub fn gap_filled(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self::new(start, end, text, GAP_FILLED_SCORE)
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_gap_filled(&self) -> bool {
        self.match_score == GAP_FILLED_SCORE
    }

    pub fn to_caption(&self) -> Caption {
        Caption::new(self.start, self.end, self.text.clone())
    }
}

impl From<AlignedSegment> for Caption {
    fn from(segment: AlignedSegment) -> Self {
        Caption::new(segment.start, segment.end, segment.text)
    }
}
