// Sequence emitter: folds a token stream through one algorithm variant.
//
// The fold is strictly sequential. For token `i` the previous full word is
// `raw[i-1]` (none for the first token); the tracker is updated before the
// variant runs, so the context always carries the count including the
// current occurrence. Dry-run and live emission share this loop, which is
// what keeps their note indices identical for the same inputs.
//
// `finish` appends the end-of-track marker. Only playable renders call it;
// the descriptive path has no events to close.

use crate::algorithm::StepContext;
use crate::event::Event;
use crate::notes::resolve_start_note;
use crate::preset::Preset;
use crate::session::SessionState;
use crate::tracker::IndexingMode;
use versetone_lang::{SyllableLookup, TokenStream};

/// How one pass over the stream runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitOptions {
    /// `None` or `Some(0)` falls back to the preset's start note.
    pub start_note: Option<i32>,
    pub indexing: IndexingMode,
    pub dry_run: bool,
}

/// What happened to one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    pub stream_index: usize,
    pub word: String,
    pub rank: u32,
    pub occurrence_count: u32,
    pub note_index: i32,
}

/// Run every token through `preset`'s variant, appending events to
/// `session` (none in a dry run).
pub fn emit(
    tokens: &TokenStream,
    preset: &Preset,
    opts: &EmitOptions,
    session: &mut SessionState,
    syllables: &dyn SyllableLookup,
) -> Vec<NoteRecord> {
    let start_note = resolve_start_note(opts.start_note, preset);
    let mut records = Vec::with_capacity(tokens.len());
    let mut previous: Option<&str> = None;

    for (i, token) in tokens.tokens().iter().enumerate() {
        let obs = session
            .tracker_mut()
            .observe(&token.parsed, i, opts.indexing);
        let ctx = StepContext {
            stream_index: i,
            word: &token.parsed,
            previous_full_word: previous,
            occurrence_count: obs.occurrence_count,
            rank: obs.rank,
            start_note,
            dry_run: opts.dry_run,
        };
        let result = preset.algorithm.step(&ctx, preset, session, syllables);
        if result.applies_state {
            session.push_events(result.events);
        }

        tracing::debug!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            token.parsed,
            obs.rank,
            obs.occurrence_count,
            result.note_index,
            token.pos,
            syllables.syllable_count(&token.parsed)
        );

        records.push(NoteRecord {
            stream_index: i,
            word: token.parsed.clone(),
            rank: obs.rank,
            occurrence_count: obs.occurrence_count,
            note_index: result.note_index,
        });
        previous = Some(&token.raw);
    }

    records
}

/// Close a playable event log.
pub fn finish(session: &mut SessionState) {
    session.push_events([Event::Advance { delta_ms: 0 }, Event::EndOfTrack]);
}
