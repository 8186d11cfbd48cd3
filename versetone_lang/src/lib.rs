// Language-side collaborators for the versetone music engine.
//
// Everything the engine consumes about the text lives here, so the music
// crate never touches raw strings beyond the aligned token forms.
//
// Architecture:
// - `tokens.rs`: `Token` / `TokenStream`, whitespace tokenizer with the
//   cleaning rules (punctuation strip, quote trim, "in'" -> "ing")
// - `syllables.rs`: `SyllableLookup` trait, CMU pronouncing dictionary parser
// - `ngrams.rs`: repeated contiguous subsequences for the descriptive output
// - `concordance.rs`: keyword-in-context listings
// - `vocabulary.rs`: words missing from a supplied word list
// - `lib.rs` (this file): the crate's error type
//
// Part-of-speech tagging is not done here; tags arrive with annotated token
// files or default to empty strings.

pub mod concordance;
pub mod ngrams;
pub mod syllables;
pub mod tokens;
pub mod vocabulary;

pub use ngrams::NgramCount;
pub use syllables::{CmuDict, NoSyllables, SyllableLookup};
pub use tokens::{Token, TokenStream};

use std::path::PathBuf;

/// Errors raised while loading or assembling language data.
#[derive(Debug, thiserror::Error)]
pub enum LangError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed token file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("token streams misaligned: {what} has {actual} entries, expected {expected}")]
    Misaligned {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Read a whole file, tagging failures with the path.
pub(crate) fn read_to_string(path: &std::path::Path) -> Result<String, LangError> {
    std::fs::read_to_string(path).map_err(|source| LangError::Io {
        path: path.to_path_buf(),
        source,
    })
}
