// Generator: renders one poem into every configured artifact.
//
// A `Generator` owns the token stream, the preset, the syllable lookup and
// the tempo-carry policy. Each playable render and the descriptive pass run
// on a fresh `SessionState`, so word ranks and counts never leak between
// files. The only thing that may cross from one render to the next is the
// carried tempo, and only under `TempoCarry::AcrossRenders`.
//
// Randomness: with a seed, every session's generator is derived from one
// seeded master stream, so a seeded run is reproducible render by render.
// Without one, each session draws fresh entropy.
//
// `run_all` drives a `GenerationConfig` end to end: MIDI files under
// `songs/`, descriptive JSON under `javascript/`, optional concordance
// listings under `concordances/`, and a vocabulary check reported through
// the log. All input is in memory before it starts; files are written after
// each fold completes.

use crate::config::GenerationConfig;
use crate::descriptive::{DescriptiveFiles, WordEntry, describe, stream_ngrams, write_descriptive};
use crate::emitter::{EmitOptions, NoteRecord, emit, finish};
use crate::error::{EngineError, Result};
use crate::event::{Event, total_duration_ms};
use crate::midi::{midi_file_name, write_midi};
use crate::preset::Preset;
use crate::session::SessionState;
use crate::tracker::IndexingMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use versetone_lang::concordance::{DEFAULT_LINES, DEFAULT_WIDTH, concordance, concordance_words};
use versetone_lang::vocabulary::{VocabularyReport, WordList, vocabulary_report};
use versetone_lang::{NoSyllables, SyllableLookup, TokenStream};
use versetone_prng::VerseRng;

/// Subdirectory for MIDI files.
pub const SONGS_DIR: &str = "songs";

/// Subdirectory for concordance listings.
pub const CONCORDANCE_DIR: &str = "concordances";

/// Whether the carried tempo survives from one render to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempoCarry {
    /// Every session starts from 0.
    #[default]
    PerSession,
    /// A render starts from the tempo the previous render ended with.
    AcrossRenders,
}

/// One finished playable render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendering {
    pub file_name: String,
    pub events: Vec<Event>,
    pub notes: Vec<NoteRecord>,
}

/// Everything `run_all` wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub midi_files: Vec<PathBuf>,
    pub descriptive: DescriptiveFiles,
    pub concordances: Vec<PathBuf>,
    pub vocabulary: Option<VocabularyReport>,
}

pub struct Generator {
    tokens: TokenStream,
    preset: Preset,
    syllables: Box<dyn SyllableLookup>,
    word_list: Option<WordList>,
    tempo_carry: TempoCarry,
    /// Carried tempo left by the last render.
    carried_tempo: i64,
    seed_stream: Option<VerseRng>,
}

impl Generator {
    pub fn new(tokens: TokenStream, preset: Preset) -> Self {
        Generator {
            tokens,
            preset,
            syllables: Box::new(NoSyllables),
            word_list: None,
            tempo_carry: TempoCarry::PerSession,
            carried_tempo: 0,
            seed_stream: None,
        }
    }

    pub fn with_syllables(mut self, syllables: impl SyllableLookup + 'static) -> Self {
        self.syllables = Box::new(syllables);
        self
    }

    pub fn with_word_list(mut self, list: WordList) -> Self {
        self.word_list = Some(list);
        self
    }

    pub fn with_tempo_carry(mut self, carry: TempoCarry) -> Self {
        self.tempo_carry = carry;
        self
    }

    /// Make every render reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_stream = Some(VerseRng::new(seed));
        self
    }

    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    fn session_rng(&mut self) -> VerseRng {
        match &mut self.seed_stream {
            Some(master) => VerseRng::new(master.next_u64()),
            None => VerseRng::from_entropy(),
        }
    }

    /// Render one playable event log.
    pub fn render(
        &mut self,
        start_note: Option<i32>,
        indexing: IndexingMode,
        label: &str,
    ) -> Rendering {
        let mut session = SessionState::new(self.session_rng());
        if self.tempo_carry == TempoCarry::AcrossRenders {
            session.set_carried_tempo(self.carried_tempo);
        }

        let opts = EmitOptions {
            start_note,
            indexing,
            dry_run: false,
        };
        let notes = emit(
            &self.tokens,
            &self.preset,
            &opts,
            &mut session,
            self.syllables.as_ref(),
        );
        finish(&mut session);
        self.carried_tempo = session.carried_tempo();
        tracing::debug!(
            label,
            distinct_words = session.tracker().distinct_words(),
            carried_tempo = self.carried_tempo,
            "rendered"
        );

        Rendering {
            file_name: midi_file_name(&self.preset, label),
            events: session.into_events(),
            notes,
        }
    }

    /// Descriptive entries for the whole stream.
    pub fn describe(&self, start_note: Option<i32>) -> Vec<WordEntry> {
        describe(
            &self.tokens,
            &self.preset,
            start_note,
            self.syllables.as_ref(),
        )
    }

    /// Check the stream against the word list, if one was given, logging
    /// every finding.
    pub fn vocabulary(&self) -> Option<VocabularyReport> {
        let list = self.word_list.as_ref()?;
        let report = vocabulary_report(&self.tokens, list);
        for (word, count) in &report.unknown {
            tracing::warn!(word = %word, count, "unknown word");
        }
        for (word, count) in &report.iffy {
            tracing::warn!(word = %word, count, "iffy word");
        }
        Some(report)
    }

    /// Write one listing per distinct word under `out_dir/concordances/`.
    pub fn write_concordances(&self, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let dir = out_dir.join(CONCORDANCE_DIR);
        std::fs::create_dir_all(&dir).map_err(|e| EngineError::io(&dir, e))?;

        let parsed = self.tokens.parsed();
        let mut written = Vec::new();
        for word in concordance_words(&parsed) {
            let path = dir.join(word.replace(['/', '\\'], "_"));
            let listing = concordance(&parsed, &word, DEFAULT_WIDTH, DEFAULT_LINES);
            std::fs::write(&path, listing).map_err(|e| EngineError::io(&path, e))?;
            written.push(path);
        }
        tracing::info!(count = written.len(), dir = %dir.display(), "wrote concordances");
        Ok(written)
    }

    /// Produce every artifact `config` asks for.
    pub fn run_all(&mut self, config: &GenerationConfig) -> Result<RunSummary> {
        let out_dir = config.output_dir.as_path();
        let songs = out_dir.join(SONGS_DIR);
        std::fs::create_dir_all(&songs).map_err(|e| EngineError::io(&songs, e))?;

        tracing::info!(
            dataset = config.dataset_name(),
            preset = %self.preset.name,
            algorithm = self.preset.algorithm.id(),
            words = self.tokens.len(),
            "generating"
        );

        let mut midi_files = Vec::with_capacity(config.renders.len());
        for spec in &config.renders {
            let label = spec.label_for(config.dataset_name());
            let rendering = self.render(Some(spec.start_note), spec.indexing, &label);
            let path = songs.join(&rendering.file_name);
            write_midi(&rendering.events, config.tempo_us, &path)?;
            tracing::info!(
                path = %path.display(),
                notes = rendering.notes.len(),
                duration_ms = total_duration_ms(&rendering.events),
                "wrote MIDI file"
            );
            midi_files.push(path);
        }

        let entries = self.describe(Some(config.describe_start_note));
        let descriptive = write_descriptive(
            out_dir,
            config.dataset_name(),
            &entries,
            &stream_ngrams(&self.tokens),
        )?;
        tracing::info!(path = %descriptive.words.display(), "wrote descriptive data");
        tracing::info!(path = %descriptive.ngrams.display(), "wrote repeated phrases");

        let concordances = if config.concordance {
            self.write_concordances(out_dir)?
        } else {
            Vec::new()
        };

        Ok(RunSummary {
            midi_files,
            descriptive,
            concordances,
            vocabulary: self.vocabulary(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderSpec;
    use crate::preset::PresetRegistry;

    fn generator(text: &str, preset_id: u32) -> Generator {
        let preset = PresetRegistry::builtin()
            .unwrap()
            .lookup(preset_id)
            .unwrap()
            .clone();
        Generator::new(TokenStream::from_text(text), preset)
    }

    const POEM: &str = "Tyger Tyger, burning bright, In the forests of the night; \
                        What immortal hand or eye, Could frame thy fearful symmetry?";

    #[test]
    fn test_render_file_name_and_marker() {
        let mut g = generator(POEM, 12).with_seed(1);
        let r = g.render(Some(70), IndexingMode::Relative, "tyger70.mid");
        assert_eq!(r.file_name, "a4_v12_tyger70.mid");
        assert_eq!(r.events.last(), Some(&Event::EndOfTrack));
        assert_eq!(r.notes.len(), g.tokens().len());
    }

    #[test]
    fn test_render_duration_covers_every_word() {
        let mut g = generator(POEM, 1).with_seed(4);
        let r = g.render(None, IndexingMode::Relative, "x");
        let words = g.tokens().len() as i64;
        let duration = total_duration_ms(&r.events);
        assert!((50 * words..100 * words).contains(&duration), "{duration}");
    }

    #[test]
    fn test_seeded_renders_reproducible() {
        let mut a = generator(POEM, 10).with_seed(9);
        let mut b = generator(POEM, 10).with_seed(9);
        for _ in 0..3 {
            assert_eq!(
                a.render(None, IndexingMode::Relative, "x").events,
                b.render(None, IndexingMode::Relative, "x").events
            );
        }
    }

    #[test]
    fn test_per_session_tempo_resets() {
        let mut g = generator(POEM, 8).with_seed(3);
        let first = g.render(None, IndexingMode::Relative, "x");
        assert_ne!(g.carried_tempo, 0);

        // The first advance of a fresh render uses a zero carried tempo:
        // no previous word, so carried 0 + syllables -100 + jitter.
        let second = g.render(None, IndexingMode::Relative, "x");
        for r in [&first, &second] {
            match r.events[1] {
                Event::Advance { delta_ms } => assert!((-100..-90).contains(&delta_ms)),
                ref other => panic!("expected advance, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_tempo_carried_across_renders() {
        let mut g = generator(POEM, 8)
            .with_seed(3)
            .with_tempo_carry(TempoCarry::AcrossRenders);
        g.render(None, IndexingMode::Relative, "x");
        let carried = g.carried_tempo;
        assert!((45..60).contains(&carried));
        let second = g.render(None, IndexingMode::Relative, "x");
        match second.events[1] {
            Event::Advance { delta_ms } => {
                assert!((carried - 100..carried - 90).contains(&delta_ms))
            }
            ref other => panic!("expected advance, got {other:?}"),
        }
    }

    #[test]
    fn test_describe_is_independent_of_renders() {
        let mut g = generator(POEM, 12).with_seed(4);
        let before = g.describe(Some(70));
        g.render(Some(100), IndexingMode::Absolute, "x");
        assert_eq!(g.describe(Some(70)), before);
    }

    #[test]
    fn test_run_all_writes_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let config = GenerationConfig {
            dataset: Some("tyger".into()),
            output_dir: dir.path().to_path_buf(),
            seed: Some(5),
            concordance: true,
            ..GenerationConfig::default()
        };
        let mut g = generator(POEM, 12).with_seed(5);
        let summary = g.run_all(&config).unwrap();

        assert_eq!(summary.midi_files.len(), 6);
        assert!(dir.path().join("songs/a4_v12_tyger70.mid").exists());
        assert!(dir.path().join("songs/a4_v12_tyger120_abs.mid").exists());
        for path in &summary.midi_files {
            let bytes = std::fs::read(path).unwrap();
            assert!(midly::Smf::parse(&bytes).is_ok());
        }
        assert!(dir.path().join("javascript/tyger.json").exists());
        assert!(dir.path().join("javascript/tyger_ngrams.json").exists());

        let tyger = dir.path().join("concordances/Tyger");
        assert!(summary.concordances.contains(&tyger));
        let listing = std::fs::read_to_string(tyger).unwrap();
        assert_eq!(listing.lines().count(), 2);
        assert!(summary.vocabulary.is_none());
    }

    #[test]
    fn test_run_all_custom_plan() {
        let dir = tempfile::tempdir().unwrap();
        let config = GenerationConfig {
            dataset: Some("d".into()),
            output_dir: dir.path().to_path_buf(),
            renders: vec![RenderSpec {
                start_note: 40,
                indexing: IndexingMode::Absolute,
                label: Some("low.mid".into()),
            }],
            ..GenerationConfig::default()
        };
        let mut g = generator("a b a", 1).with_seed(1);
        let summary = g.run_all(&config).unwrap();
        assert_eq!(
            summary.midi_files,
            vec![dir.path().join("songs").join("a1_v0_low.mid")]
        );
        assert!(summary.concordances.is_empty());
    }

    #[test]
    fn test_vocabulary_report() {
        let g = generator("the dog don't barkin' zzyzx", 12)
            .with_word_list(WordList::parse("the\ndog\nbarking\n"));
        let report = g.vocabulary().unwrap();
        assert_eq!(report.unknown.get("zzyzx"), Some(&1));
        assert_eq!(report.iffy.get("don't"), Some(&1));
        assert!(!report.unknown.contains_key("barkin'"));
    }
}
