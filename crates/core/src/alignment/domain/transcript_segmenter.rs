use super::alignment_config::SegmenterConfig;
use crate::captions::domain::caption::Caption;
use crate::transcription::domain::transliterator::{needs_transliteration, Transliterator};
use crate::transcription::domain::word::{spoken_words, Word};

/// Characters that close a sentence when they end a word.
const SENTENCE_BREAKS: &[char] = &['.', '!', '?', ',', ':', ';'];

/// Turns a raw word transcript into captions without reference to lyrics.
pub struct TranscriptSegmenter<'a> {
    config: SegmenterConfig,
    transliterator: &'a dyn Transliterator,
}

impl<'a> TranscriptSegmenter<'a> {
    pub fn new(config: SegmenterConfig, transliterator: &'a dyn Transliterator) -> Self {
        Self {
            config,
            transliterator,
        }
    }

    /// Groups words into sentence-like captions.
    ///
    /// A sentence closes after a word ending in `. ! ? , : ;`, before a
    /// silence longer than the gap threshold, and at the last word. Each
    /// caption is extended to the minimum duration.
    pub fn segment(&self, words: &[Word]) -> Vec<Caption> {
        let words = spoken_words(words);
        let mut captions = Vec::new();
        let mut sentence: Vec<&Word> = Vec::new();

        for (i, word) in words.iter().enumerate() {
            sentence.push(word);

            let is_last = i + 1 == words.len();
            let ends_sentence = word.text.trim_end().ends_with(SENTENCE_BREAKS);
            let pause_follows = words
                .get(i + 1)
                .is_some_and(|next| next.start - word.end > self.config.gap_threshold);

            if is_last || ends_sentence || pause_follows {
                captions.push(self.caption_from(&sentence, self.config.min_duration));
                sentence.clear();
            }
        }

        log::debug!(
            "Segmented {} words into {} sentence captions",
            words.len(),
            captions.len()
        );
        captions
    }

    /// Chunks words into captions of `words_per_group` consecutive words.
    pub fn group_words(&self, words: &[Word], words_per_group: usize) -> Vec<Caption> {
        let words = spoken_words(words);
        words
            .chunks(words_per_group.max(1))
            .map(|group| self.caption_from(group, self.config.word_group_min_duration))
            .collect()
    }

    fn caption_from(&self, words: &[&Word], min_duration: f64) -> Caption {
        let start = words.first().map_or(0.0, |w| w.start);
        let last_end = words.last().map_or(start, |w| w.end);
        let end = last_end.max(start + min_duration);

        let text = words
            .iter()
            .map(|w| w.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let text = if needs_transliteration(&text) {
            self.transliterator.transliterate(&text)
        } else {
            text
        };

        Caption::new(start, end, text)
    }
}
