// Versetone Music Engine
//
// Turns the words of a poem into music. Each distinct word gets a stable
// rank the first time it appears; the rank picks a note, and lexical cues
// (sentence ends, commas, syllable counts, repetition) shape timing,
// loudness and note closing. The same fold also runs in a dry-run mode that
// only maps notes, feeding the descriptive JSON behind the visualizations.
//
// Architecture:
// - preset.rs: Preset parameter bundles and the validated registry (ids 0-12)
// - tracker.rs: Per-session word rank and occurrence counting
// - notes.rs: Rank-to-note mapping, wrapped into the preset's note range
// - heuristics.rs: Timing and loudness contributions from lexical cues
// - algorithm.rs: The closed set of variants (1, 2, 3, 4, 5, 7) behind one
//   step function, sharing a compute core between dry-run and live
// - event.rs: Playback events
// - session.rs: Mutable state of one render (tracker, carried tempo, PRNG, log)
// - emitter.rs: The sequential fold over a token stream
// - midi.rs: SMF Format 0 output from event logs
// - descriptive.rs: Per-word JSON for visualizations, plus repeated phrases
// - config.rs: `GenerationConfig`, the run plan loaded from JSON
// - generator.rs: Renders a poem into every configured artifact
// - error.rs: `EngineError`
//
// Text handling (tokenizing, syllables, n-grams, concordances) lives in
// `versetone_lang`; randomness comes from `versetone_prng`. Given a seed,
// output is reproducible.

pub mod algorithm;
pub mod config;
pub mod descriptive;
pub mod emitter;
pub mod error;
pub mod event;
pub mod generator;
pub mod heuristics;
pub mod midi;
pub mod notes;
pub mod preset;
pub mod session;
pub mod tracker;

pub use error::{EngineError, Result};
