use super::caption::Caption;

/// Captions shorter than this absorb the caption that follows them.
pub const MIN_DURATION: f64 = 1.0;
/// Minimum spacing between the end of one caption and the start of the next.
pub const BUFFER: f64 = 0.2;
pub const MAX_CHARS_PER_LINE: usize = 60;

/// Merges short captions, spaces captions apart and wraps long lines.
///
/// The merge loop keeps one pending caption. While the pending caption is
/// shorter than `min_duration` the next caption's text and end time are
/// folded into it; otherwise it is emitted and the next caption becomes
/// pending. Each new pending caption starts no earlier than the previous
/// emitted caption's end plus `buffer`.
#[derive(Clone, Debug)]
pub struct TimingOptimizer {
    min_duration: f64,
    buffer: f64,
    max_chars_per_line: usize,
}

impl TimingOptimizer {
    pub fn new(min_duration: f64, buffer: f64, max_chars_per_line: usize) -> Self {
        Self {
            min_duration,
            buffer,
            max_chars_per_line: max_chars_per_line.max(1),
        }
    }

    pub fn optimize(&self, captions: &[Caption]) -> Vec<Caption> {
        let mut optimized: Vec<Caption> = Vec::with_capacity(captions.len());
        let mut pending: Option<Caption> = None;

        for caption in captions {
            if !caption.is_valid() {
                log::debug!(
                    "Skipping caption with empty interval {:.3}-{:.3}",
                    caption.start,
                    caption.end
                );
                continue;
            }
            let text = caption.text.trim();

            if let Some(current) = pending.as_mut() {
                if current.duration() < self.min_duration {
                    current.text = join_text(&current.text, text);
                    current.end = current.end.max(caption.end);
                    continue;
                }
            }

            if let Some(current) = pending.take() {
                optimized.push(self.finalize(current));
            }

            let mut next = Caption::new(caption.start, caption.end, text);
            if let Some(previous) = optimized.last() {
                next.start = next.start.max(previous.end + self.buffer);
            }
            pending = Some(next);
        }

        if let Some(current) = pending {
            optimized.push(self.finalize(current));
        }

        optimized
    }

    fn finalize(&self, mut caption: Caption) -> Caption {
        // The buffer shift can push a short caption's start past its end.
        if caption.end <= caption.start {
            caption.end = caption.start + self.min_duration;
        }
        if caption.text.chars().count() > self.max_chars_per_line {
            caption.text = wrap_text(&caption.text, self.max_chars_per_line);
        }
        caption
    }
}

impl Default for TimingOptimizer {
    fn default() -> Self {
        Self::new(MIN_DURATION, BUFFER, MAX_CHARS_PER_LINE)
    }
}

/// Runs the optimizer with the default constants.
pub fn optimize_timing(captions: &[Caption]) -> Vec<Caption> {
    TimingOptimizer::default().optimize(captions)
}

/// Second timing pass: guarantees every caption lasts at least
/// `min_duration` without overlapping the caption after it.
///
/// A caption that is too short is extended. If the extension runs into the
/// next caption, the current caption is trimmed back to the next start when
/// that still leaves it `min_duration`; otherwise the next caption's start
/// is pushed forward (and that caption is extended in turn).
pub fn enforce_min_duration(captions: &mut [Caption], min_duration: f64) {
    for i in 0..captions.len() {
        let start = captions[i].start;
        let mut end = captions[i].end;

        if end - start < min_duration {
            end = start + min_duration;
            captions[i].end = end;
        }

        let Some(next_start) = captions.get(i + 1).map(|next| next.start) else {
            continue;
        };
        if end > next_start {
            if next_start - start >= min_duration {
                captions[i].end = next_start;
            } else {
                captions[i + 1].start = end;
            }
        }
    }
}

/// Greedy word wrap: words are added to the current line until the next one
/// would exceed `max_chars`. A single word longer than the limit gets a line
/// of its own.
pub fn wrap_text(text: &str, max_chars: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let current_len = current.chars().count();
        if current_len > 0 && current_len + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}

fn join_text(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{a} {b}"),
    }
}
