//! Shared text-metric helpers used across the analysis modules.

use unicode_segmentation::UnicodeSegmentation;

/// Tokenize text into lowercase content words of at least `min_len` characters.
///
/// Word boundaries follow Unicode segmentation, so punctuation never leaks
/// into tokens ("time." tokenizes as "time").
pub(crate) fn content_tokens(text: &str, min_len: usize) -> Vec<String> {
    text.unicode_words()
        .filter(|word| word.chars().count() >= min_len)
        .map(|word| word.to_lowercase())
        .collect()
}

/// Split text into lowercase words with no length filter.
pub(crate) fn lowercase_words(text: &str) -> Vec<String> {
    text.unicode_words().map(|word| word.to_lowercase()).collect()
}

/// Levenshtein edit distance over characters.
///
/// Two-row dynamic programming, O(len_a * len_b) time and O(len_b) space.
pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Length of the longest common subsequence of two slices.
pub(crate) fn lcs_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for item_a in a {
        for (j, item_b) in b.iter().enumerate() {
            curr[j + 1] = if item_a == item_b {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Normalized common-subsequence ratio between two texts, in [0, 1].
///
/// Computed over lowercased words: `lcs / max(word_count)`. Two texts with
/// no words at all are trivially identical (ratio 1.0); if only one side is
/// empty the ratio is 0.0.
pub(crate) fn subsequence_ratio(a: &str, b: &str) -> f64 {
    let words_a = lowercase_words(a);
    let words_b = lowercase_words(b);

    let longest = words_a.len().max(words_b.len());
    if longest == 0 {
        return 1.0;
    }

    lcs_len(&words_a, &words_b) as f64 / longest as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_tokens_filters_short_words() {
        let tokens = content_tokens("Vendor shall respond within a reasonable time", 4);
        assert_eq!(
            tokens,
            vec!["vendor", "shall", "respond", "within", "reasonable", "time"]
        );
    }

    #[test]
    fn content_tokens_strips_punctuation() {
        let tokens = content_tokens("Notice: respond, promptly.", 4);
        assert_eq!(tokens, vec!["notice", "respond", "promptly"]);
    }

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
    }

    #[test]
    fn lcs_len_basics() {
        let a = ["a", "b", "c", "d"];
        let b = ["a", "x", "c", "y"];
        assert_eq!(lcs_len(&a, &b), 2);
        assert_eq!(lcs_len(&a, &a), 4);
        assert_eq!(lcs_len::<&str>(&[], &a), 0);
    }

    #[test]
    fn subsequence_ratio_bounds() {
        assert_eq!(subsequence_ratio("", ""), 1.0);
        assert_eq!(subsequence_ratio("hello", ""), 0.0);
        assert_eq!(subsequence_ratio("hello world", "hello world"), 1.0);
        assert_eq!(subsequence_ratio("alpha beta", "gamma delta"), 0.0);

        let ratio = subsequence_ratio("hello world foo", "hello world bar");
        assert!(ratio > 0.5 && ratio < 1.0);
    }

    #[test]
    fn subsequence_ratio_is_case_insensitive() {
        assert_eq!(subsequence_ratio("Hello World", "hello world"), 1.0);
    }
}
