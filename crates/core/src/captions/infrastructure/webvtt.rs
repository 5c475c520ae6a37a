use std::fs;
use std::path::Path;

use crate::captions::domain::caption::Caption;
use crate::captions::domain::timestamp::{seconds_to_timestamp, timestamp_to_seconds};

const HEADER: &str = "WEBVTT";
const ARROW: &str = "-->";

/// Serializes captions as a WebVTT document.
pub fn render_webvtt(captions: &[Caption]) -> String {
    let mut out = String::from(HEADER);
    out.push_str("\n\n");
    for caption in captions {
        out.push_str(&seconds_to_timestamp(caption.start));
        out.push_str(" --> ");
        out.push_str(&seconds_to_timestamp(caption.end));
        out.push('\n');
        // A blank line would terminate the cue early.
        for line in caption.text.lines().filter(|l| !l.trim().is_empty()) {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

pub fn write_webvtt(path: &Path, captions: &[Caption]) -> Result<(), std::io::Error> {
    fs::write(path, render_webvtt(captions))
}

/// Parses WebVTT cues into captions.
///
/// Cues whose timing line does not parse are skipped with a warning; the
/// rest of the document is still read. `NOTE`, `STYLE` and `REGION` blocks
/// and cue identifiers are ignored.
pub fn parse_webvtt(text: &str) -> Vec<Caption> {
    let mut captions = Vec::new();

    for block in split_blocks(text) {
        let Some(timing_index) = block.iter().position(|line| line.contains(ARROW)) else {
            continue;
        };
        if is_metadata_block(block[0]) {
            continue;
        }

        let timing = block[timing_index];
        let Some((start, end)) = parse_timing_line(timing) else {
            continue;
        };
        let body = block[timing_index + 1..].join("\n");
        captions.push(Caption::new(start, end, body));
    }

    captions
}

pub fn read_webvtt(path: &Path) -> Result<Vec<Caption>, std::io::Error> {
    let text = fs::read_to_string(path)?;
    Ok(parse_webvtt(&text))
}

fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn is_metadata_block(first_line: &str) -> bool {
    ["WEBVTT", "NOTE", "STYLE", "REGION"]
        .iter()
        .any(|kw| first_line.starts_with(kw))
}

fn parse_timing_line(line: &str) -> Option<(f64, f64)> {
    let (start, rest) = line.split_once(ARROW)?;
    // Cue settings (e.g. `align:center`) follow the end timestamp.
    let end = rest.split_whitespace().next().unwrap_or("");

    match (timestamp_to_seconds(start), timestamp_to_seconds(end)) {
        (Ok(start), Ok(end)) => Some((start, end)),
        (Err(e), _) | (_, Err(e)) => {
            log::warn!("Skipping cue with malformed timing: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    #[test]
    fn test_render_layout() {
        let vtt = render_webvtt(&[
            Caption::new(0.0, 1.5, "hello"),
            Caption::new(2.0, 3.25, "two\nlines"),
        ]);
        assert_eq!(
            vtt,
            "WEBVTT\n\n00:00:00.000 --> 00:00:01.500\nhello\n\n\
             00:00:02.000 --> 00:00:03.250\ntwo\nlines\n\n"
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_webvtt(&[]), "WEBVTT\n\n");
    }

    #[test]
    fn test_parse_reads_rendered_output() {
        let captions = vec![
            Caption::new(0.0, 1.5, "hello"),
            Caption::new(62.004, 65.0, "two\nlines"),
        ];
        let parsed = parse_webvtt(&render_webvtt(&captions));
        assert_eq!(parsed.len(), 2);
        assert_relative_eq!(parsed[1].start, 62.004, epsilon = 1e-9);
        assert_eq!(parsed[1].text, "two\nlines");
    }

    #[test]
    fn test_parse_skips_identifiers_notes_and_settings() {
        let doc = "WEBVTT - lyrics\n\nNOTE generated\n\n\
                   cue-1\n00:00:01.000 --> 00:00:02.000 align:center\nfirst\n\n\
                   00:00:03 --> 00:00:04\nsecond\n";
        let parsed = parse_webvtt(doc);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].text, "first");
        assert_relative_eq!(parsed[0].end, 2.0);
        assert_relative_eq!(parsed[1].start, 3.0);
    }

    #[test]
    fn test_parse_skips_malformed_cue_only() {
        let doc = "WEBVTT\n\n00:00:xx.000 --> 00:00:02.000\nbad\n\n\
                   00:00:05.000 --> 00:00:06.000\ngood\n";
        let parsed = parse_webvtt(doc);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].text, "good");
    }

    #[test]
    fn test_parse_handles_crlf() {
        let doc = "WEBVTT\r\n\r\n00:00:01.000 --> 00:00:02.000\r\nline\r\n";
        let parsed = parse_webvtt(doc);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].text, "line");
    }

    #[test]
    fn test_write_and_read_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("captions.vtt");
        write_webvtt(&path, &[Caption::new(1.0, 2.0, "saved")]).unwrap();
        let parsed = read_webvtt(&path).unwrap();
        assert_eq!(parsed, vec![Caption::new(1.0, 2.0, "saved")]);
    }
}
