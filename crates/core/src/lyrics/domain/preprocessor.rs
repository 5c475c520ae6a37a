use crate::shared::constants::{SECTION_LABEL_MAX_CHARS, SECTION_MARKERS};

/// Splits raw lyric text into trimmed, non-empty lines, dropping section
/// labels such as `VERSE 1`, `Chorus:` or `INTRO`. Order is preserved.
pub fn preprocess_lyrics(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !is_structural_marker(line))
        .map(str::to_string)
        .collect()
}

/// True for lines that label song structure rather than carry lyrics: lines
/// starting with "verse", "chorus" or "bridge" in any case, and short lines
/// written entirely in capitals.
pub fn is_structural_marker(line: &str) -> bool {
    let lowered = line.to_lowercase();
    if SECTION_MARKERS
        .iter()
        .any(|marker| lowered.starts_with(marker))
    {
        return true;
    }
    is_all_caps(line) && line.chars().count() < SECTION_LABEL_MAX_CHARS
}

/// At least one cased letter and no lowercase letters.
fn is_all_caps(line: &str) -> bool {
    let mut has_cased = false;
    for c in line.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}
