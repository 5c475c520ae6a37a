use std::collections::HashSet;

/// Lowercases, drops everything but word characters and whitespace, and
/// trims. Word characters are Unicode alphanumerics and `_`, so Devanagari
/// and other scripts survive.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn word_set(normalized: &str) -> HashSet<&str> {
    normalized.split_whitespace().collect()
}

/// Intersection over union of two word sets; zero when either is empty.
pub fn jaccard(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let common = a.intersection(b).count();
    let total = a.union(b).count();
    common as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case::punctuation("Hello, World!", "hello world")]
    #[case::apostrophe("Don't stop", "dont stop")]
    #[case::outer_whitespace("  spaced out.  ", "spaced out")]
    #[case::only_punctuation("...!?", "")]
    #[case::underscore("snake_case", "snake_case")]
    #[case::devanagari("तुम ही हो।", "तुम ही हो")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn test_jaccard_identical() {
        let a = word_set("one two three");
        assert_relative_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn test_jaccard_partial() {
        let a = word_set("one two three");
        let b = word_set("two three four");
        assert_relative_eq!(jaccard(&a, &b), 0.5);
    }

    #[test]
    fn test_jaccard_duplicates_collapse() {
        let a = word_set("la la la love");
        let b = word_set("la love");
        assert_relative_eq!(jaccard(&a, &b), 1.0);
    }

    #[test]
    fn test_jaccard_empty_is_zero() {
        let a = word_set("");
        let b = word_set("anything");
        assert_eq!(jaccard(&a, &b), 0.0);
        assert_eq!(jaccard(&b, &a), 0.0);
    }
}
