// Syllable-count lookup.
//
// The timing heuristics lengthen a note by 100ms per syllable beyond the
// first. Counts come from the CMU pronouncing dictionary, where every vowel
// phoneme carries a stress digit (`AH0`, `EY1`), so a pronunciation's
// syllable count is the number of phonemes ending in a digit.
//
// Only the first listed pronunciation is consulted. Words missing from the
// dictionary count as 0 syllables; callers treat that as a normal value,
// not an error.

use crate::LangError;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Anything that can answer "how many syllables does this word have?".
pub trait SyllableLookup {
    /// Syllables in the first pronunciation of `word`, or 0 if unknown.
    fn syllable_count(&self, word: &str) -> i32;
}

/// Lookup used when no dictionary is available: every word is unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSyllables;

impl SyllableLookup for NoSyllables {
    fn syllable_count(&self, _word: &str) -> i32 {
        0
    }
}

/// Fixed table of counts keyed by lowercase word.
impl SyllableLookup for BTreeMap<String, i32> {
    fn syllable_count(&self, word: &str) -> i32 {
        self.get(&word.to_lowercase()).copied().unwrap_or(0)
    }
}

/// A parsed CMU pronouncing dictionary.
#[derive(Debug, Clone, Default)]
pub struct CmuDict {
    /// Lowercase word -> syllable count of each pronunciation, in file order.
    entries: HashMap<String, Vec<i32>>,
}

impl CmuDict {
    /// Parse dictionary text.
    ///
    /// Accepts both the classic `WORD  W ER1 D` / `WORD(1)` layout and the
    /// lowercase `word(2) w er1 d # comment` layout. Lines starting with
    /// `;;;` are comments.
    pub fn parse(text: &str) -> Self {
        let mut entries: HashMap<String, Vec<i32>> = HashMap::new();
        for line in text.lines() {
            if line.starts_with(";;;") {
                continue;
            }
            let line = line.split('#').next().unwrap_or("");
            let mut parts = line.split_whitespace();
            let Some(head) = parts.next() else {
                continue;
            };
            let word = match head.find('(') {
                Some(paren) if head.ends_with(')') && paren > 0 => &head[..paren],
                _ => head,
            };
            let syllables = parts
                .filter(|ph| ph.ends_with(|c: char| c.is_ascii_digit()))
                .count() as i32;
            entries
                .entry(word.to_lowercase())
                .or_default()
                .push(syllables);
        }
        CmuDict { entries }
    }

    /// Load a dictionary file from disk.
    pub fn load(path: &Path) -> Result<Self, LangError> {
        Ok(Self::parse(&crate::read_to_string(path)?))
    }

    /// Syllable counts of every pronunciation of `word`.
    pub fn pronunciations(&self, word: &str) -> &[i32] {
        self.entries
            .get(&word.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SyllableLookup for CmuDict {
    fn syllable_count(&self, word: &str) -> i32 {
        self.pronunciations(word).first().copied().unwrap_or(0)
    }
}
