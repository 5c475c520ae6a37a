use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordKind {
    Word,
    Spacing,
    /// Non-speech annotations such as `(music)`.
    #[serde(other)]
    Other,
}

/// One timestamped unit of a transcript. Only [`WordKind::Word`] entries
/// take part in segmentation and alignment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub start: f64,
    pub end: f64,
    #[serde(rename = "type")]
    pub kind: WordKind,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            kind: WordKind::Word,
        }
    }

    pub fn spacing(start: f64, end: f64) -> Self {
        Self {
            text: " ".to_string(),
            start,
            end,
            kind: WordKind::Spacing,
        }
    }

    pub fn is_word(&self) -> bool {
        self.kind == WordKind::Word
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Keeps only spoken words, in transcript order.
pub fn spoken_words(words: &[Word]) -> Vec<&Word> {
    words.iter().filter(|w| w.is_word()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_word_duration() {
        let w = Word::new("hello", 1.0, 1.4);
        assert_relative_eq!(w.duration(), 0.4, epsilon = 1e-9);
        assert!(w.is_word());
    }

    #[test]
    fn test_spoken_words_filters_spacing() {
        let words = vec![
            Word::new("a", 0.0, 0.1),
            Word::spacing(0.1, 0.2),
            Word::new("b", 0.2, 0.3),
        ];
        let spoken = spoken_words(&words);
        assert_eq!(spoken.len(), 2);
        assert_eq!(spoken[1].text, "b");
    }

    #[test]
    fn test_deserialize_kinds() {
        let json = r#"[
            {"text": "hi", "start": 0.0, "end": 0.5, "type": "word"},
            {"text": " ", "start": 0.5, "end": 0.6, "type": "spacing"},
            {"text": "(music)", "start": 0.6, "end": 2.0, "type": "audio_event"}
        ]"#;
        let words: Vec<Word> = serde_json::from_str(json).unwrap();
        assert_eq!(words[0].kind, WordKind::Word);
        assert_eq!(words[1].kind, WordKind::Spacing);
        assert_eq!(words[2].kind, WordKind::Other);
    }
}
