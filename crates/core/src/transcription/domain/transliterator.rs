/// Best-effort conversion of non-Latin text to Latin script.
///
/// Implementations never fail: text they cannot handle is returned as-is.
pub trait Transliterator: Send + Sync {
    fn transliterate(&self, text: &str) -> String;
}

/// Leaves text untouched. Used when the original script should be kept.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughTransliterator;

impl Transliterator for PassthroughTransliterator {
    fn transliterate(&self, text: &str) -> String {
        text.to_string()
    }
}

/// True when any character lies outside ASCII.
pub fn needs_transliteration(text: &str) -> bool {
    !text.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_returns_input() {
        assert_eq!(PassthroughTransliterator.transliterate("नमस्ते"), "नमस्ते");
    }

    #[test]
    fn test_needs_transliteration() {
        assert!(!needs_transliteration("plain ascii, 123!"));
        assert!(needs_transliteration("café"));
        assert!(needs_transliteration("नमस्ते"));
    }
}
