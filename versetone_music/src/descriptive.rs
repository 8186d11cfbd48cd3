// Descriptive data for visualizations.
//
// One entry per token, describing the word and the note it maps to, written
// as `javascript/{dataset}.json` next to the repeated-phrase table
// `javascript/{dataset}_ngrams.json`. The page that consumes these keys
// entries by the short field names below, so they are part of the format.
//
// The pass is always a dry run with absolute indexing on a fresh session:
// no events, no randomness, and the same input always yields the same file.

use crate::emitter::{EmitOptions, emit};
use crate::error::{EngineError, Result};
use crate::preset::Preset;
use crate::session::SessionState;
use crate::tracker::IndexingMode;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use versetone_lang::ngrams::default_repeated_ngrams;
use versetone_lang::{NgramCount, SyllableLookup, TokenStream};
use versetone_prng::VerseRng;

/// Subdirectory of the output directory holding the JSON files.
pub const DESCRIPTIVE_DIR: &str = "javascript";

/// One token of the descriptive file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordEntry {
    /// Parsed form.
    pub word: String,
    /// Normalized form.
    #[serde(rename = "rword")]
    pub normalized: String,
    /// Raw form.
    #[serde(rename = "fullword")]
    pub raw: String,
    /// Rank + 1.
    pub index: u32,
    pub count: u32,
    /// Stream position + 1.
    #[serde(rename = "wordindex")]
    pub word_index: usize,
    #[serde(rename = "noteindex")]
    pub note_index: i32,
    #[serde(rename = "numsyl")]
    pub syllables: i32,
    pub pos: String,
}

/// Build the descriptive entries for a stream.
pub fn describe(
    tokens: &TokenStream,
    preset: &Preset,
    start_note: Option<i32>,
    syllables: &dyn SyllableLookup,
) -> Vec<WordEntry> {
    // Dry runs never draw, so the seed is irrelevant.
    let mut session = SessionState::new(VerseRng::new(0));
    let opts = EmitOptions {
        start_note,
        indexing: IndexingMode::Absolute,
        dry_run: true,
    };
    let records = emit(tokens, preset, &opts, &mut session, syllables);

    records
        .into_iter()
        .zip(tokens.tokens())
        .map(|(record, token)| WordEntry {
            word: token.parsed.clone(),
            normalized: token.normalized.clone(),
            raw: token.raw.clone(),
            index: record.rank + 1,
            count: record.occurrence_count,
            word_index: record.stream_index + 1,
            note_index: record.note_index,
            syllables: syllables.syllable_count(&token.parsed),
            pos: token.pos.clone(),
        })
        .collect()
}

/// Paths of the two files `write_descriptive` produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptiveFiles {
    pub words: PathBuf,
    pub ngrams: PathBuf,
}

/// Write `{dataset}.json` and `{dataset}_ngrams.json` under
/// `out_dir/javascript/`.
pub fn write_descriptive(
    out_dir: &Path,
    dataset: &str,
    entries: &[WordEntry],
    ngrams: &[NgramCount],
) -> Result<DescriptiveFiles> {
    let dir = out_dir.join(DESCRIPTIVE_DIR);
    std::fs::create_dir_all(&dir).map_err(|e| EngineError::io(&dir, e))?;

    let words = dir.join(format!("{dataset}.json"));
    write_json(&words, entries)?;
    let ngram_path = dir.join(format!("{dataset}_ngrams.json"));
    write_json(&ngram_path, ngrams)?;

    Ok(DescriptiveFiles {
        words,
        ngrams: ngram_path,
    })
}

/// Repeated phrases over the lowercased normalized forms.
pub fn stream_ngrams(tokens: &TokenStream) -> Vec<NgramCount> {
    default_repeated_ngrams(&tokens.lowered_normalized())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| EngineError::io(path, e))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer(&mut out, value)?;
    out.flush().map_err(|e| EngineError::io(path, e))?;
    Ok(())
}
