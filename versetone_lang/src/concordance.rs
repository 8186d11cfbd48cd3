// Keyword-in-context listings.
//
// For each occurrence of a word, one fixed-width line: the preceding text
// right-aligned on the left, the word, and the following text on the right.
// Matching ignores case.

use std::collections::BTreeSet;

/// Default line width, in characters.
pub const DEFAULT_WIDTH: usize = 75;

/// Default maximum number of lines per word.
pub const DEFAULT_LINES: usize = 25;

/// Tokens that never get a listing of their own.
const PUNCTUATION: &[&str] = &[".", ",", "!", "?", ";", ":", "-"];

/// Build the listing for `word` over `tokens`.
///
/// Returns an empty string when the word does not occur.
pub fn concordance(tokens: &[String], word: &str, width: usize, lines: usize) -> String {
    let half_width = width.saturating_sub(word.chars().count() + 2) / 2;
    let context = width / 4;
    let needle = word.to_lowercase();

    let mut out = String::new();
    let offsets = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.to_lowercase() == needle)
        .map(|(i, _)| i)
        .take(lines);

    for i in offsets {
        let left_words = tokens[i.saturating_sub(context)..i].join(" ");
        let right_end = (i + context).min(tokens.len());
        let right_words = tokens[(i + 1).min(right_end)..right_end].join(" ");

        let padded = format!("{}{}", " ".repeat(half_width), left_words);
        let left = take_last_chars(&padded, half_width);
        let right: String = right_words.chars().take(half_width).collect();
        out.push_str(&format!("{left}  {word}  {right}\n"));
    }
    out
}

/// Distinct words worth listing, sorted.
pub fn concordance_words(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| !PUNCTUATION.contains(&t.as_str()))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn take_last_chars(s: &str, n: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(n)).collect()
}
