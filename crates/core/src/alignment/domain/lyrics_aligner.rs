use thiserror::Error;

use super::alignment_config::AlignmentConfig;
use super::text_normalizer::{jaccard, normalize, word_set};
use crate::captions::domain::caption::AlignedSegment;
use crate::transcription::domain::word::{spoken_words, Word};

/// Punctuation that closes a transcript chunk.
const CHUNK_BREAKS: &[char] = &['.', '!', '?'];

/// Characters of a lyric line shown in log messages.
const LOG_PREVIEW_CHARS: usize = 30;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignmentError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl AlignmentError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Lyric lines with the intervals assigned to them, ordered by start.
#[derive(Clone, Debug, PartialEq)]
pub struct Alignment {
    pub segments: Vec<AlignedSegment>,
    pub matched_lines: usize,
    pub total_lines: usize,
}

impl Alignment {
    pub fn match_rate(&self) -> f64 {
        if self.total_lines == 0 {
            0.0
        } else {
            self.matched_lines as f64 / self.total_lines as f64
        }
    }
}

/// Why the transcript could not be used to time the lyrics.
#[derive(Clone, Debug, PartialEq)]
pub enum InconclusiveReason {
    /// The transcript holds no spoken words.
    NoTranscriptWords,
    /// Too few lines matched for the transcript to be trusted.
    LowMatchRate { matched: usize, total: usize },
    /// Nothing matched and there were no segments to fill gaps around.
    NothingAligned,
}

/// Result of an alignment attempt. `Inconclusive` tells the caller to fall
/// back to the raw transcript or to even distribution.
#[derive(Clone, Debug, PartialEq)]
pub enum AlignmentOutcome {
    Aligned(Alignment),
    Inconclusive(InconclusiveReason),
}

struct LyricLine<'a> {
    original: &'a str,
    normalized: String,
}

/// A run of transcript words a lyric line can be matched against.
#[derive(Clone, Debug, PartialEq)]
struct TranscriptUnit {
    start: f64,
    end: f64,
    normalized: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Gap {
    start: f64,
    end: f64,
}

impl Gap {
    fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Assigns lyric lines to transcript timing by word-overlap similarity.
///
/// Each line greedily takes the best unused transcript unit, in lyric
/// order. Lines that find no match are placed into the silences between
/// matched lines.
#[derive(Clone, Debug, Default)]
pub struct LyricsAligner {
    config: AlignmentConfig,
}

impl LyricsAligner {
    pub fn new(config: AlignmentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    pub fn align(
        &self,
        lyric_lines: &[String],
        words: &[Word],
        duration: f64,
    ) -> Result<AlignmentOutcome, AlignmentError> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(AlignmentError::invalid_input(format!(
                "audio duration must be positive, got {duration}"
            )));
        }

        let lines: Vec<LyricLine> = lyric_lines
            .iter()
            .map(|line| LyricLine {
                original: line.as_str(),
                normalized: normalize(line),
            })
            .filter(|line| !line.normalized.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(AlignmentError::invalid_input(
                "no lyric lines contain words to align",
            ));
        }

        let words = spoken_words(words);
        if words.is_empty() {
            return Ok(AlignmentOutcome::Inconclusive(
                InconclusiveReason::NoTranscriptWords,
            ));
        }

        log::info!(
            "Aligning {} lyric lines against {} transcribed words",
            lines.len(),
            words.len()
        );

        let mut units = self.chunk_transcript(&words);
        if (units.len() as f64) < lines.len() as f64 / 2.0 {
            log::warn!(
                "Only {} transcript chunks for {} lines, matching word by word",
                units.len(),
                lines.len()
            );
            units = word_units(&words);
        }

        let (mut segments, matched) = self.match_lines(&lines, &units);
        let matched_lines = matched.iter().filter(|m| **m).count();
        let total_lines = lines.len();
        let match_rate = matched_lines as f64 / total_lines as f64;
        log::info!(
            "Match success rate: {:.1}% ({matched_lines}/{total_lines} lines matched)",
            match_rate * 100.0
        );

        if match_rate < self.config.min_match_rate && total_lines > self.config.min_lines_for_abort
        {
            log::warn!("Match rate too low, transcript timing will be used directly");
            return Ok(AlignmentOutcome::Inconclusive(
                InconclusiveReason::LowMatchRate {
                    matched: matched_lines,
                    total: total_lines,
                },
            ));
        }

        if matched_lines > 0 {
            let unmatched: Vec<&str> = lines
                .iter()
                .zip(&matched)
                .filter(|(_, m)| !**m)
                .map(|(line, _)| line.original)
                .collect();
            if !unmatched.is_empty() {
                sort_by_start(&mut segments);
                let gaps = self.find_gaps(&segments, duration);
                segments.extend(fill_gaps(&unmatched, gaps));
            }
        }

        if segments.is_empty() {
            log::warn!("No lyric line matched the transcript");
            return Ok(AlignmentOutcome::Inconclusive(
                InconclusiveReason::NothingAligned,
            ));
        }

        sort_by_start(&mut segments);
        for i in 1..segments.len() {
            let previous_end = segments[i - 1].end;
            if segments[i].start < previous_end {
                segments[i].start = previous_end;
            }
        }

        log::info!("Final alignment: {} segments", segments.len());
        for segment in segments.iter().take(5) {
            log::debug!(
                "  {:.2}s - {:.2}s: '{}'",
                segment.start,
                segment.end,
                preview(&segment.text)
            );
        }

        Ok(AlignmentOutcome::Aligned(Alignment {
            segments,
            matched_lines,
            total_lines,
        }))
    }

    /// Sentence-like chunks: a chunk closes at `.`, `!` or `?` or once it
    /// holds more than `max_chunk_words` words.
    fn chunk_transcript(&self, words: &[&Word]) -> Vec<TranscriptUnit> {
        let mut units = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut start = 0.0;
        let mut end = 0.0;

        for word in words {
            let normalized = normalize(&word.text);
            if normalized.is_empty() {
                continue;
            }
            if current.is_empty() {
                start = word.start;
            }
            current.push(normalized);
            end = word.end;

            if word.text.trim_end().ends_with(CHUNK_BREAKS)
                || current.len() > self.config.max_chunk_words
            {
                units.push(TranscriptUnit {
                    start,
                    end,
                    normalized: current.join(" "),
                });
                current.clear();
            }
        }

        if !current.is_empty() {
            units.push(TranscriptUnit {
                start,
                end,
                normalized: current.join(" "),
            });
        }

        units
    }

    /// Returns matched segments in lyric order plus a matched flag per line.
    fn match_lines(
        &self,
        lines: &[LyricLine],
        units: &[TranscriptUnit],
    ) -> (Vec<AlignedSegment>, Vec<bool>) {
        let unit_words: Vec<_> = units.iter().map(|u| word_set(&u.normalized)).collect();
        let mut used = vec![false; units.len()];
        let mut segments = Vec::new();
        let mut matched = Vec::with_capacity(lines.len());

        for (line_index, line) in lines.iter().enumerate() {
            let line_words = word_set(&line.normalized);
            let mut best: Option<(usize, f64)> = None;

            for (unit_index, candidate) in unit_words.iter().enumerate() {
                if used[unit_index] {
                    continue;
                }
                let score = jaccard(&line_words, candidate);
                let best_score = best.map_or(0.0, |(_, s)| s);
                if score > self.config.similarity_threshold && score > best_score {
                    best = Some((unit_index, score));
                }
            }

            match best {
                Some((unit_index, score)) => {
                    let unit = &units[unit_index];
                    used[unit_index] = true;
                    segments.push(AlignedSegment::new(
                        unit.start,
                        unit.end,
                        line.original,
                        score,
                    ));
                    matched.push(true);
                    log::info!(
                        "Matched line {}: '{}' with score {score:.2}",
                        line_index + 1,
                        preview(line.original)
                    );
                }
                None => {
                    matched.push(false);
                    log::warn!(
                        "No match found for line {}: '{}'",
                        line_index + 1,
                        preview(line.original)
                    );
                }
            }
        }

        (segments, matched)
    }

    /// Fillable silences around `segments` (sorted by start), largest first.
    fn find_gaps(&self, segments: &[AlignedSegment], duration: f64) -> Vec<Gap> {
        let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
            return Vec::new();
        };

        let mut gaps = Vec::new();
        if first.start > self.config.leading_gap_threshold {
            gaps.push(Gap {
                start: 0.0,
                end: first.start,
            });
        }
        for pair in segments.windows(2) {
            let gap = Gap {
                start: pair[0].end,
                end: pair[1].start,
            };
            if gap.duration() > self.config.inner_gap_threshold {
                gaps.push(gap);
            }
        }
        if last.end < duration - self.config.trailing_gap_threshold {
            gaps.push(Gap {
                start: last.end,
                end: duration,
            });
        }

        gaps.sort_by(|a, b| b.duration().total_cmp(&a.duration()));
        gaps
    }
}

/// Places unmatched lines (in lyric order) into gaps (largest first).
///
/// With no more lines than gaps, each line takes a whole gap. Otherwise
/// each gap gets the lines its share of the total gap time fits, at least
/// one while lines remain, and is split evenly between them.
fn fill_gaps(unmatched: &[&str], gaps: Vec<Gap>) -> Vec<AlignedSegment> {
    if gaps.is_empty() {
        log::warn!(
            "No gaps available for {} unmatched lines, dropping them",
            unmatched.len()
        );
        return Vec::new();
    }
    log::info!(
        "Distributing {} unmatched lines across {} gaps",
        unmatched.len(),
        gaps.len()
    );

    if unmatched.len() <= gaps.len() {
        return unmatched
            .iter()
            .zip(&gaps)
            .map(|(line, gap)| AlignedSegment::gap_filled(gap.start, gap.end, *line))
            .collect();
    }

    let counts = lines_per_gap(unmatched.len(), &gaps);
    let mut lines = unmatched.iter();
    let mut segments = Vec::with_capacity(unmatched.len());
    for (gap, count) in gaps.iter().zip(counts) {
        if count == 0 {
            continue;
        }
        let slot = gap.duration() / count as f64;
        for i in 0..count {
            let Some(line) = lines.next() else {
                break;
            };
            let start = gap.start + i as f64 * slot;
            segments.push(AlignedSegment::gap_filled(start, start + slot, *line));
        }
    }
    segments
}

/// Line count per gap, gaps sorted largest first. A gap takes
/// `max(1, floor(duration / time_per_line))` lines, capped by what is left;
/// lines still unplaced after that go one at a time to the largest gaps.
/// The counts sum to `lines`.
fn lines_per_gap(lines: usize, gaps: &[Gap]) -> Vec<usize> {
    let total: f64 = gaps.iter().map(Gap::duration).sum();
    let time_per_line = total / lines as f64;
    let mut remaining = lines;

    let mut counts: Vec<usize> = gaps
        .iter()
        .map(|gap| {
            let fits = if time_per_line > 0.0 {
                (gap.duration() / time_per_line).floor() as usize
            } else {
                0
            };
            let count = fits.max(1).min(remaining);
            remaining -= count;
            count
        })
        .collect();

    let mut index = 0;
    while remaining > 0 && !counts.is_empty() {
        counts[index % gaps.len()] += 1;
        remaining -= 1;
        index += 1;
    }
    counts
}

fn sort_by_start(segments: &mut [AlignedSegment]) {
    segments.sort_by(|a, b| a.start.total_cmp(&b.start));
}

/// Built word by word: each spoken word is its own unit.
fn word_units(words: &[&Word]) -> Vec<TranscriptUnit> {
    words
        .iter()
        .filter_map(|word| {
            let normalized = normalize(&word.text);
            (!normalized.is_empty()).then(|| TranscriptUnit {
                start: word.start,
                end: word.end,
                normalized,
            })
        })
        .collect()
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(LOG_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
