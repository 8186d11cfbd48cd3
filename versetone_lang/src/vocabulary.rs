// Vocabulary check against a plain word list.
//
// Flags words a listener might not recognize. Contractions ("don't",
// "o'er") are reported separately as "iffy" since most word lists omit them;
// anything else missing is "unknown". Counts are keyed by the form the poem
// actually spells, so a dropped-g gerund is reported as "goin'", not
// "going".

use crate::LangError;
use crate::tokens::{Token, TokenStream};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// A set of known words, one per line, compared case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    pub fn parse(text: &str) -> Self {
        WordList {
            words: text
                .lines()
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty())
                .collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, LangError> {
        Ok(Self::parse(&crate::read_to_string(path)?))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }
}

/// Words missing from a word list, with occurrence counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VocabularyReport {
    pub unknown: BTreeMap<String, u32>,
    pub iffy: BTreeMap<String, u32>,
}

impl VocabularyReport {
    pub fn is_empty(&self) -> bool {
        self.unknown.is_empty() && self.iffy.is_empty()
    }
}

/// Check every normalized token of `stream` against `list`.
pub fn vocabulary_report(stream: &TokenStream, list: &WordList) -> VocabularyReport {
    let mut report = VocabularyReport::default();
    for token in stream.tokens() {
        if list.contains(&token.normalized) {
            continue;
        }
        let key = report_key(token).to_string();
        let bucket = if token.normalized.contains('\'') {
            &mut report.iffy
        } else {
            &mut report.unknown
        };
        *bucket.entry(key).or_insert(0) += 1;
    }
    report
}

fn report_key(token: &Token) -> &str {
    if token.parsed.ends_with("in'") && token.normalized.ends_with("ing") {
        &token.parsed
    } else {
        &token.normalized
    }
}
