use crate::captions::domain::caption::AlignedSegment;
use crate::lyrics::domain::preprocessor::is_structural_marker;

/// Splits `duration` into equal consecutive slices, one per lyric line.
///
/// Section labels that slipped through preprocessing are dropped first.
/// Returns an empty list when there is nothing to place or no time to place
/// it in. The last slice ends exactly at `duration`.
pub fn distribute_evenly(lines: &[String], duration: f64) -> Vec<AlignedSegment> {
    if lines.is_empty() || !duration.is_finite() || duration <= 0.0 {
        return Vec::new();
    }

    let kept: Vec<&String> = lines
        .iter()
        .filter(|line| !is_structural_marker(line))
        .collect();
    if kept.is_empty() {
        return Vec::new();
    }

    let count = kept.len();
    let slice = duration / count as f64;
    kept.into_iter()
        .enumerate()
        .map(|(i, line)| {
            let start = i as f64 * slice;
            let end = if i + 1 == count {
                duration
            } else {
                (i + 1) as f64 * slice
            };
            AlignedSegment::gap_filled(start, end, line.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_four_lines_over_eight_seconds() {
        let segments = distribute_evenly(&lines(&["a", "b", "c", "d"]), 8.0);
        assert_eq!(segments.len(), 4);
        for (i, s) in segments.iter().enumerate() {
            assert_relative_eq!(s.start, i as f64 * 2.0);
            assert_relative_eq!(s.duration(), 2.0);
        }
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[3].end, 8.0);
    }

    #[test]
    fn test_contiguous_coverage_with_awkward_division() {
        let segments = distribute_evenly(&lines(&["a", "b", "c"]), 10.0);
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(segments.last().unwrap().end, 10.0);
    }

    #[test]
    fn test_markers_filtered_again() {
        let segments = distribute_evenly(&lines(&["CHORUS", "la la la", "oh oh"]), 4.0);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "la la la");
        assert_relative_eq!(segments[1].start, 2.0);
    }

    #[test]
    fn test_order_preserved_and_scores_zero() {
        let segments = distribute_evenly(&lines(&["first", "second"]), 2.0);
        assert_eq!(segments[0].text, "first");
        assert_eq!(segments[1].text, "second");
        assert!(segments.iter().all(|s| s.is_gap_filled()));
    }

    #[test]
    fn test_empty_or_non_positive_returns_empty() {
        assert!(distribute_evenly(&[], 10.0).is_empty());
        assert!(distribute_evenly(&lines(&["a"]), 0.0).is_empty());
        assert!(distribute_evenly(&lines(&["a"]), -1.0).is_empty());
        assert!(distribute_evenly(&lines(&["a"]), f64::NAN).is_empty());
    }

    #[test]
    fn test_only_markers_returns_empty() {
        assert!(distribute_evenly(&lines(&["VERSE 1", "CHORUS"]), 10.0).is_empty());
    }
}
