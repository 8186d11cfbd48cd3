// Repeated contiguous word subsequences.
//
// The visualization shows which phrases a poem repeats. Every window of
// 2 to 19 words is counted across the whole text; windows seen more than
// once are reported, most frequent first.

use serde::Serialize;
use std::collections::HashMap;

/// Shortest subsequence counted.
pub const MIN_NGRAM_LEN: usize = 2;

/// Longest subsequence counted.
pub const MAX_NGRAM_LEN: usize = 19;

/// A subsequence and how many times it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NgramCount {
    pub count: usize,
    pub words: Vec<String>,
}

/// Count every window of `min_len..=max_len` words and return the ones
/// occurring more than once.
///
/// Sorted by count descending; equal counts put shorter windows first, then
/// earlier first appearance.
pub fn repeated_ngrams(words: &[String], min_len: usize, max_len: usize) -> Vec<NgramCount> {
    let mut found: Vec<(usize, usize, NgramCount)> = Vec::new();

    for n in min_len.max(1)..=max_len {
        if n > words.len() {
            break;
        }
        // window -> (count, first start index)
        let mut counts: HashMap<&[String], (usize, usize)> = HashMap::new();
        for (start, window) in words.windows(n).enumerate() {
            counts.entry(window).or_insert((0, start)).0 += 1;
        }
        found.extend(
            counts
                .into_iter()
                .filter(|(_, (count, _))| *count > 1)
                .map(|(window, (count, first))| {
                    (
                        n,
                        first,
                        NgramCount {
                            count,
                            words: window.to_vec(),
                        },
                    )
                }),
        );
    }

    found.sort_by(|a, b| {
        b.2.count
            .cmp(&a.2.count)
            .then(a.0.cmp(&b.0))
            .then(a.1.cmp(&b.1))
    });
    found.into_iter().map(|(_, _, ngram)| ngram).collect()
}

/// `repeated_ngrams` over the standard 2–19 word range.
pub fn default_repeated_ngrams(words: &[String]) -> Vec<NgramCount> {
    repeated_ngrams(words, MIN_NGRAM_LEN, MAX_NGRAM_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_rose_is_a_rose() {
        let w = words("a rose is a rose is a rose");
        let ngrams = default_repeated_ngrams(&w);

        // "a rose" occurs three times and leads the list.
        assert_eq!(ngrams[0].count, 3);
        assert_eq!(ngrams[0].words, words("a rose"));

        assert!(ngrams.iter().all(|n| n.count > 1));
        assert!(
            ngrams
                .iter()
                .any(|n| n.words == words("a rose is a rose") && n.count == 2)
        );
    }

    #[test]
    fn test_sorted_by_count_descending() {
        let w = words("x y x y x y z w z w");
        let ngrams = default_repeated_ngrams(&w);
        for pair in ngrams.windows(2) {
            assert!(pair[0].count >= pair[1].count);
        }
    }

    #[test]
    fn test_no_repeats() {
        let w = words("every word here differs");
        assert!(default_repeated_ngrams(&w).is_empty());
    }

    #[test]
    fn test_unigrams_never_reported() {
        let w = words("la la");
        let ngrams = default_repeated_ngrams(&w);
        assert!(ngrams.is_empty(), "single-word repeats are not subsequences");
    }

    #[test]
    fn test_respects_max_len() {
        let w = words("a b c a b c");
        let ngrams = repeated_ngrams(&w, 2, 2);
        assert!(ngrams.iter().all(|n| n.words.len() == 2));
        assert_eq!(ngrams.len(), 2); // "a b", "b c"
    }

    #[test]
    fn test_serializes_count_and_words() {
        let n = NgramCount {
            count: 2,
            words: words("the cat"),
        };
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(json, r#"{"count":2,"words":["the","cat"]}"#);
    }
}
