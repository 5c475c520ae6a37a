use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("invalid timestamp '{input}': expected HH:MM:SS or HH:MM:SS.mmm")]
    Layout { input: String },
    #[error("invalid timestamp '{input}': '{field}' is not a number")]
    NotNumeric { input: String, field: String },
    #[error("invalid timestamp '{input}': {field} out of range")]
    OutOfRange { input: String, field: &'static str },
}

const MILLIS_PER_SECOND: u64 = 1000;
const MILLIS_PER_MINUTE: u64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: u64 = 60 * MILLIS_PER_MINUTE;

/// Absorbs binary representation error so that e.g. `1.001` is not
/// truncated to `1.000`.
const TRUNCATION_EPSILON: f64 = 1e-6;

/// Formats seconds as `HH:MM:SS.mmm`.
///
/// Milliseconds are truncated, not rounded. Hours are not wrapped at 24 and
/// widen past two digits when needed. Negative or non-finite input is
/// formatted as zero.
pub fn seconds_to_timestamp(seconds: f64) -> String {
    let total_ms = if seconds.is_finite() && seconds > 0.0 {
        (seconds * MILLIS_PER_SECOND as f64 + TRUNCATION_EPSILON).floor() as u64
    } else {
        0
    };

    let hours = total_ms / MILLIS_PER_HOUR;
    let minutes = (total_ms % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE;
    let secs = (total_ms % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND;
    let millis = total_ms % MILLIS_PER_SECOND;
    format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
}

/// Parses a caption timestamp into seconds.
///
/// Accepted spellings:
/// - `HH:MM:SS.mmm` (four numeric fields split on `:` and `.`)
/// - `HH:MM:SS` (three fields, milliseconds default to zero)
/// - `HH:MM:SS,mmm` (SRT decimal comma)
///
/// Hours may have any number of digits. Minutes and seconds must be below
/// 60 and milliseconds below 1000; the millisecond field is read as an
/// integer count of milliseconds.
pub fn timestamp_to_seconds(timestamp: &str) -> Result<f64, TimestampError> {
    let input = timestamp.trim();
    let layout_error = || TimestampError::Layout {
        input: input.to_string(),
    };

    let groups: Vec<&str> = input.split(':').collect();
    let [hours, minutes, seconds_group] = groups.as_slice() else {
        return Err(layout_error());
    };

    let (seconds, millis) = match seconds_group.split_once(['.', ',']) {
        Some((secs, millis)) => (secs, Some(millis)),
        None => (*seconds_group, None),
    };
    if millis.is_some_and(|m| m.contains(['.', ','])) {
        return Err(layout_error());
    }

    let hours = parse_field(input, hours)?;
    let minutes = parse_field(input, minutes)?;
    let seconds = parse_field(input, seconds)?;
    let millis = match millis {
        Some(m) => parse_field(input, m)?,
        None => 0,
    };

    if minutes >= 60 {
        return Err(out_of_range(input, "minutes"));
    }
    if seconds >= 60 {
        return Err(out_of_range(input, "seconds"));
    }
    if millis >= MILLIS_PER_SECOND {
        return Err(out_of_range(input, "milliseconds"));
    }

    let total_ms = hours * MILLIS_PER_HOUR
        + minutes * MILLIS_PER_MINUTE
        + seconds * MILLIS_PER_SECOND
        + millis;
    Ok(total_ms as f64 / MILLIS_PER_SECOND as f64)
}

fn parse_field(input: &str, field: &str) -> Result<u64, TimestampError> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimestampError::NotNumeric {
            input: input.to_string(),
            field: field.to_string(),
        });
    }
    field.parse().map_err(|_| out_of_range(input, "value"))
}

fn out_of_range(input: &str, field: &'static str) -> TimestampError {
    TimestampError::OutOfRange {
        input: input.to_string(),
        field,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case::zero(0.0, "00:00:00.000")]
    #[case::fraction(1.5, "00:00:01.500")]
    #[case::minutes(75.25, "00:01:15.250")]
    #[case::hours(3723.004, "01:02:03.004")]
    #[case::beyond_a_day(90000.0, "25:00:00.000")]
    #[case::hundred_hours(360000.0, "100:00:00.000")]
    fn test_seconds_to_timestamp(#[case] seconds: f64, #[case] expected: &str) {
        assert_eq!(seconds_to_timestamp(seconds), expected);
    }

    #[test]
    fn test_seconds_to_timestamp_truncates_millis() {
        assert_eq!(seconds_to_timestamp(1.9999), "00:00:01.999");
        assert_eq!(seconds_to_timestamp(0.0019), "00:00:00.001");
    }

    #[rstest]
    #[case::negative(-3.0)]
    #[case::nan(f64::NAN)]
    #[case::infinite(f64::INFINITY)]
    fn test_seconds_to_timestamp_degenerate_input_is_zero(#[case] seconds: f64) {
        assert_eq!(seconds_to_timestamp(seconds), "00:00:00.000");
    }

    #[rstest]
    #[case::four_fields("01:02:03.004", 3723.004)]
    #[case::three_fields("01:02:03", 3723.0)]
    #[case::srt_comma("00:00:05,250", 5.25)]
    #[case::long_hours("100:00:00.000", 360000.0)]
    #[case::short_millis("00:00:01.5", 1.005)]
    #[case::surrounding_whitespace("  00:00:02.000 ", 2.0)]
    fn test_timestamp_to_seconds(#[case] input: &str, #[case] expected: f64) {
        assert_relative_eq!(timestamp_to_seconds(input).unwrap(), expected, epsilon = 1e-9);
    }

    #[rstest]
    #[case::empty("")]
    #[case::two_groups("00:05.000")]
    #[case::four_groups("00:00:00:05")]
    #[case::double_fraction("00:00:05.000.1")]
    fn test_timestamp_layout_errors(#[case] input: &str) {
        assert!(matches!(
            timestamp_to_seconds(input),
            Err(TimestampError::Layout { .. })
        ));
    }

    #[rstest]
    #[case::letters("aa:00:00.000")]
    #[case::empty_field("00::00.000")]
    #[case::signed("-1:00:00.000")]
    #[case::empty_millis("00:00:01.")]
    fn test_timestamp_non_numeric_errors(#[case] input: &str) {
        assert!(matches!(
            timestamp_to_seconds(input),
            Err(TimestampError::NotNumeric { .. })
        ));
    }

    #[rstest]
    #[case::minutes("00:60:00.000")]
    #[case::seconds("00:00:75.000")]
    #[case::millis("00:00:01.1000")]
    fn test_timestamp_out_of_range_errors(#[case] input: &str) {
        assert!(matches!(
            timestamp_to_seconds(input),
            Err(TimestampError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_error_message_names_input() {
        let err = timestamp_to_seconds("garbage").unwrap_err();
        assert!(err.to_string().contains("garbage"));
    }

    #[test]
    fn test_round_trip_within_one_millisecond() {
        // Every millisecond of the first minute, then a coarser sweep up to ten hours.
        let fine = (0..60_000u64).map(|ms| ms as f64 / 1000.0);
        let coarse = (0..36_000_000u64).step_by(997).map(|ms| ms as f64 / 1000.0);
        for x in fine.chain(coarse) {
            let back = timestamp_to_seconds(&seconds_to_timestamp(x)).unwrap();
            assert!(
                (back - x).abs() <= 0.001 + 1e-9,
                "round trip of {x} produced {back}"
            );
        }
    }

    #[test]
    fn test_round_trip_is_exact_on_millisecond_grid() {
        for ms in [1u64, 999, 1001, 59_999, 3_600_001, 35_999_999] {
            let x = ms as f64 / 1000.0;
            let back = timestamp_to_seconds(&seconds_to_timestamp(x)).unwrap();
            assert_relative_eq!(back, x, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_three_field_producer_round_trips() {
        // Producers that omit milliseconds still parse back to whole seconds.
        let parsed = timestamp_to_seconds("00:03:07").unwrap();
        assert_eq!(seconds_to_timestamp(parsed), "00:03:07.000");
    }
}
