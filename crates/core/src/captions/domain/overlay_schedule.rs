use super::caption::Caption;

/// How finalized captions are turned into on-screen text overlays.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlaySettings {
    /// Shift applied to every caption, in seconds (may be negative).
    pub timing_offset: f64,
    /// Number of words shown together; a caption is split into groups of this size.
    pub words_per_group: usize,
    /// Prefix every group with its start time, e.g. `[12.3s] `.
    pub debug_mode: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            timing_offset: 0.0,
            words_per_group: 3,
            debug_mode: false,
        }
    }
}

/// A single text overlay as it will be burned into the video.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayCue {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl OverlayCue {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Expands captions into overlay cues bounded by `[0, video_duration]`.
///
/// Each caption is shifted by the offset and clamped to the video. Its words
/// are split into consecutive groups of `words_per_group`, and the caption
/// interval is divided evenly between the groups.
pub fn schedule_overlays(
    captions: &[Caption],
    video_duration: f64,
    settings: &OverlaySettings,
) -> Vec<OverlayCue> {
    let group_size = settings.words_per_group.max(1);
    let mut cues = Vec::new();

    for caption in captions {
        let start = (caption.start + settings.timing_offset).max(0.0);
        let end = (caption.end + settings.timing_offset).min(video_duration);
        let duration = end - start;
        if duration <= 0.0 {
            continue;
        }

        let words: Vec<&str> = caption.text.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let groups: Vec<String> = words.chunks(group_size).map(|g| g.join(" ")).collect();
        let time_per_group = duration / groups.len() as f64;

        for (i, group) in groups.into_iter().enumerate() {
            let group_start = start + i as f64 * time_per_group;
            let text = if settings.debug_mode {
                format!("[{group_start:.1}s] {group}")
            } else {
                group
            };
            cues.push(OverlayCue {
                start: group_start,
                end: group_start + time_per_group,
                text,
            });
        }
    }

    log::debug!(
        "Scheduled {} overlay cues from {} captions",
        cues.len(),
        captions.len()
    );
    cues
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn settings(offset: f64, words_per_group: usize) -> OverlaySettings {
        OverlaySettings {
            timing_offset: offset,
            words_per_group,
            debug_mode: false,
        }
    }

    #[test]
    fn test_caption_split_into_word_groups() {
        let captions = vec![Caption::new(0.0, 3.0, "one two three four five six")];
        let cues = schedule_overlays(&captions, 10.0, &settings(0.0, 2));
        assert_eq!(cues.len(), 3);
        assert_eq!(cues[0].text, "one two");
        assert_eq!(cues[2].text, "five six");
        assert_relative_eq!(cues[1].start, 1.0);
        assert_relative_eq!(cues[2].end, 3.0);
    }

    #[test]
    fn test_uneven_last_group() {
        let captions = vec![Caption::new(0.0, 2.0, "a b c")];
        let cues = schedule_overlays(&captions, 10.0, &settings(0.0, 2));
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[1].text, "c");
    }

    #[test]
    fn test_offset_shifts_and_clamps_start() {
        let captions = vec![Caption::new(0.5, 2.0, "hello")];
        let cues = schedule_overlays(&captions, 10.0, &settings(-1.0, 3));
        assert_eq!(cues.len(), 1);
        assert_relative_eq!(cues[0].start, 0.0);
        assert_relative_eq!(cues[0].end, 1.0);
    }

    #[test]
    fn test_end_clamped_to_video_duration() {
        let captions = vec![Caption::new(8.0, 12.0, "tail")];
        let cues = schedule_overlays(&captions, 10.0, &settings(0.0, 3));
        assert_relative_eq!(cues[0].end, 10.0);
    }

    #[test]
    fn test_caption_pushed_outside_video_dropped() {
        let captions = vec![
            Caption::new(0.0, 1.0, "early"),
            Caption::new(9.5, 10.0, "late"),
        ];
        let cues = schedule_overlays(&captions, 10.0, &settings(1.0, 3));
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "early");
    }

    #[test]
    fn test_blank_caption_dropped() {
        let captions = vec![Caption::new(0.0, 1.0, "   ")];
        assert!(schedule_overlays(&captions, 10.0, &settings(0.0, 3)).is_empty());
    }

    #[test]
    fn test_debug_mode_prefixes_start_time() {
        let captions = vec![Caption::new(12.34, 14.0, "hey there")];
        let s = OverlaySettings {
            debug_mode: true,
            ..settings(0.0, 3)
        };
        let cues = schedule_overlays(&captions, 20.0, &s);
        assert_eq!(cues[0].text, "[12.3s] hey there");
    }

    #[test]
    fn test_zero_group_size_treated_as_one() {
        let captions = vec![Caption::new(0.0, 2.0, "a b")];
        let cues = schedule_overlays(&captions, 10.0, &settings(0.0, 0));
        assert_eq!(cues.len(), 2);
    }

    #[test]
    fn test_wrapped_caption_words_regrouped() {
        let captions = vec![Caption::new(0.0, 2.0, "first line\nsecond line")];
        let cues = schedule_overlays(&captions, 10.0, &settings(0.0, 4));
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "first line second line");
    }
}
