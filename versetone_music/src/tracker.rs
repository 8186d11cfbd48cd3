// Per-session word occurrence tracking.
//
// Every distinct parsed word gets a rank the first time it appears, and the
// rank never changes afterwards: it is what the note mapper turns into a
// pitch, so a repeated word always replays its first note. Alongside the
// rank, a running occurrence count feeds the loudness and note-closing
// rules.
//
// Two ranking modes:
// - `Relative`: rank = stream position of the first occurrence + 1, so the
//   melody's shape follows where words first appear.
// - `Absolute`: rank = 1 + number of distinct words seen before, so new
//   words step through the note range one at a time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a new word's rank is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexingMode {
    #[default]
    Relative,
    Absolute,
}

/// What the tracker knows about one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordState {
    pub rank: u32,
    pub occurrence_count: u32,
}

/// Result of observing a word: the state after the observation.
pub type Observation = WordState;

/// Rank and count table for one session.
#[derive(Debug, Clone, Default)]
pub struct WordTracker {
    words: HashMap<String, WordState>,
}

impl WordTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `word` at `stream_index`.
    ///
    /// The first observation assigns the rank according to `mode`; every
    /// observation, the first included, increments the count.
    pub fn observe(&mut self, word: &str, stream_index: usize, mode: IndexingMode) -> Observation {
        let distinct = self.words.len() as u32;
        let state = self.words.entry(word.to_string()).or_insert_with(|| {
            let rank = match mode {
                IndexingMode::Absolute => distinct + 1,
                IndexingMode::Relative => stream_index as u32 + 1,
            };
            WordState {
                rank,
                occurrence_count: 0,
            }
        });
        state.occurrence_count += 1;
        *state
    }

    /// Number of distinct words ranked so far.
    pub fn distinct_words(&self) -> usize {
        self.words.len()
    }
}
