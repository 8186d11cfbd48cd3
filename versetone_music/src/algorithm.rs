// Algorithm variants: how one word becomes one note.
//
// Every variant maps the word's rank to a note the same way (`notes.rs`);
// they differ in how long the note lasts before the next one, how loud it
// is and whether it is explicitly closed.
//
// - 1 `Baseline`: fixed loudness, random gap from the preset's tempo band.
// - 2 `SentenceEnd`: adds a breath after sentence ends; truncate 1 closes
//   every note, truncate 2 closes on a coin flip.
// - 3 `Lexical`: sentence ends, comma pauses and syllable length all add
//   time; repeated words get louder; periodic closing by occurrence count.
// - 4 `CarriedTempo`: sentence boundaries resample a tempo that carries over
//   to the following words and accent the next note; syllables and jitter
//   add time on top. Periodic closing as in 3.
// - 5 `ContextFree`: variant 4 run as if there were no previous word and
//   the word had never occurred, so boundaries and repetition have no
//   effect. Kept exactly as it has always behaved.
// - 7 `Absolute`: variant 4 again. It was meant to map notes by absolute
//   index, but mapping always uses the tracker's rank, so the two are
//   identical.
//
// `Algorithm::compute` is the shared core: it draws whatever randomness the
// variant needs and returns a `NotePlan`. `Algorithm::step` wraps it: in a
// dry run it only maps the note, otherwise it turns the plan into events
// and stores the new carried tempo in the session.

use crate::event::Event;
use crate::heuristics::{
    PAUSE_BASE, PAUSE_SPREAD, humanize_jitter_ms, loudness_for_count, sentence_end_time_ms,
    sentence_pause_time_ms, syllable_time_ms,
};
use crate::notes::compute_note_index;
use crate::preset::{Preset, Truncate};
use crate::session::SessionState;
use serde::{Deserialize, Serialize};
use versetone_lang::SyllableLookup;
use versetone_prng::VerseRng;

/// Loudness boost on the note after a sentence end.
const SENTENCE_END_ACCENT: i32 = 15;

/// Loudness boost on the note after a comma pause.
const PAUSE_ACCENT: i32 = 10;

/// Pause band used by the carried-tempo variants: `[100, 250)` ms.
const CARRIED_PAUSE_SPREAD: i64 = 150;
const CARRIED_PAUSE_BASE: i64 = 100;

/// The closed set of note-generation variants, identified by their
/// historical ids (there is no 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Algorithm {
    Baseline,
    SentenceEnd,
    Lexical,
    CarriedTempo,
    ContextFree,
    Absolute,
}

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Algorithm::Baseline,
        Algorithm::SentenceEnd,
        Algorithm::Lexical,
        Algorithm::CarriedTempo,
        Algorithm::ContextFree,
        Algorithm::Absolute,
    ];

    pub fn id(self) -> u8 {
        match self {
            Algorithm::Baseline => 1,
            Algorithm::SentenceEnd => 2,
            Algorithm::Lexical => 3,
            Algorithm::CarriedTempo => 4,
            Algorithm::ContextFree => 5,
            Algorithm::Absolute => 7,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }

    /// Run one step against the session.
    pub fn step(
        self,
        ctx: &StepContext<'_>,
        preset: &Preset,
        session: &mut SessionState,
        syllables: &dyn SyllableLookup,
    ) -> StepResult {
        if ctx.dry_run {
            return StepResult {
                note_index: compute_note_index(ctx.rank, ctx.start_note, preset),
                events: Vec::new(),
                applies_state: false,
            };
        }

        let carried = session.carried_tempo();
        let plan = self.compute(ctx, preset, carried, session.rng_mut(), syllables);
        session.set_carried_tempo(plan.carried_tempo);
        StepResult {
            note_index: plan.note_index,
            events: plan.events(),
            applies_state: true,
        }
    }

    /// Decide note, velocity, timing and closing for one word.
    pub fn compute(
        self,
        ctx: &StepContext<'_>,
        preset: &Preset,
        carried_tempo: i64,
        rng: &mut VerseRng,
        syllables: &dyn SyllableLookup,
    ) -> NotePlan {
        let note_index = compute_note_index(ctx.rank, ctx.start_note, preset);
        let channel = (ctx.stream_index % preset.channel_count as usize) as u8;
        let plan = NotePlan {
            note_index,
            channel,
            velocity: preset.base_loudness,
            advance_ms: 0,
            carried_tempo,
            close: NoteClose::Open,
        };

        match self {
            Algorithm::Baseline => NotePlan {
                advance_ms: rng.spread(preset.rand_base, preset.rand_spread),
                ..plan
            },
            Algorithm::SentenceEnd => {
                let extra = sentence_end_time_ms(ctx.previous_full_word, rng);
                let advance_ms = rng.spread(preset.rand_base, preset.rand_spread) + extra;
                let close = match preset.truncate {
                    Truncate::ALWAYS => NoteClose::Close,
                    Truncate::COIN_FLIP if rng.random_bool(0.5) => NoteClose::Close,
                    _ => NoteClose::Open,
                };
                NotePlan {
                    advance_ms,
                    close,
                    ..plan
                }
            }
            Algorithm::Lexical => {
                let extra = sentence_end_time_ms(ctx.previous_full_word, rng)
                    + sentence_pause_time_ms(ctx.previous_full_word, PAUSE_SPREAD, PAUSE_BASE, rng)
                    + syllable_time_ms(ctx.word, syllables);
                NotePlan {
                    velocity: loudness_for_count(ctx.occurrence_count, 0, preset),
                    advance_ms: rng.spread(preset.rand_base, preset.rand_spread) + extra,
                    close: periodic_close(preset.truncate, ctx.occurrence_count),
                    ..plan
                }
            }
            Algorithm::CarriedTempo | Algorithm::Absolute => carried_tempo_plan(
                plan,
                ctx.word,
                ctx.previous_full_word,
                ctx.occurrence_count,
                preset,
                rng,
                syllables,
            ),
            Algorithm::ContextFree => {
                carried_tempo_plan(plan, ctx.word, None, 0, preset, rng, syllables)
            }
        }
    }
}

impl TryFrom<u8> for Algorithm {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Algorithm::from_id(id).ok_or_else(|| format!("unknown algorithm id {id}"))
    }
}

impl From<Algorithm> for u8 {
    fn from(a: Algorithm) -> u8 {
        a.id()
    }
}

/// Shared base of variants 4, 5 and 7.
///
/// A sentence end only accents the note and resamples the tempo; the time
/// it would add is superseded by the pause check that follows.
fn carried_tempo_plan(
    plan: NotePlan,
    word: &str,
    previous_full_word: Option<&str>,
    occurrence_count: u32,
    preset: &Preset,
    rng: &mut VerseRng,
    syllables: &dyn SyllableLookup,
) -> NotePlan {
    let mut carried = plan.carried_tempo;
    let mut accent = 0;

    if sentence_end_time_ms(previous_full_word, rng) > 0 {
        accent = SENTENCE_END_ACCENT;
        carried = rng.spread(preset.rand_base, preset.rand_spread);
    }
    let mut extra = sentence_pause_time_ms(
        previous_full_word,
        CARRIED_PAUSE_SPREAD,
        CARRIED_PAUSE_BASE,
        rng,
    );
    if extra > 0 {
        accent = PAUSE_ACCENT;
        carried = rng.spread(preset.rand_base, preset.rand_spread);
    }
    extra += syllable_time_ms(word, syllables);
    extra += humanize_jitter_ms(rng);

    NotePlan {
        velocity: loudness_for_count(occurrence_count, accent, preset),
        advance_ms: carried + extra,
        carried_tempo: carried,
        close: periodic_close(preset.truncate, occurrence_count),
        ..plan
    }
}

fn periodic_close(truncate: Truncate, occurrence_count: u32) -> NoteClose {
    if truncate.closes_occurrence(occurrence_count) {
        NoteClose::CloseAndSettle
    } else {
        NoteClose::Open
    }
}

/// Per-step input.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub stream_index: usize,
    /// Parsed form of the current word.
    pub word: &'a str,
    /// Raw form of the word before, if any.
    pub previous_full_word: Option<&'a str>,
    /// Count after this occurrence was recorded (1 on first sight).
    pub occurrence_count: u32,
    pub rank: u32,
    pub start_note: i32,
    pub dry_run: bool,
}

/// Whether a sounded note is explicitly closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteClose {
    /// Left ringing.
    Open,
    /// Closed right after the advance.
    Close,
    /// Closed, followed by a zero-length advance.
    CloseAndSettle,
}

/// Everything a variant decided about one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotePlan {
    pub note_index: i32,
    pub channel: u8,
    pub velocity: i32,
    pub advance_ms: i64,
    /// Carried tempo after this note.
    pub carried_tempo: i64,
    pub close: NoteClose,
}

impl NotePlan {
    /// The events realizing this plan, in playback order.
    pub fn events(&self) -> Vec<Event> {
        let mut events = vec![
            Event::NoteOn {
                channel: self.channel,
                note: self.note_index,
                velocity: self.velocity,
            },
            Event::Advance {
                delta_ms: self.advance_ms,
            },
        ];
        let off = Event::NoteOff {
            channel: self.channel,
            note: self.note_index,
        };
        match self.close {
            NoteClose::Open => {}
            NoteClose::Close => events.push(off),
            NoteClose::CloseAndSettle => {
                events.push(off);
                events.push(Event::Advance { delta_ms: 0 });
            }
        }
        events
    }
}

/// What one step produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub note_index: i32,
    pub events: Vec<Event>,
    /// False for dry runs: no events and no session state touched.
    pub applies_state: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::PresetRegistry;
    use std::collections::BTreeMap;
    use versetone_lang::NoSyllables;

    fn preset(id: u32) -> Preset {
        PresetRegistry::builtin().unwrap().lookup(id).unwrap().clone()
    }

    fn ctx<'a>(word: &'a str, prev: Option<&'a str>, count: u32) -> StepContext<'a> {
        StepContext {
            stream_index: 3,
            word,
            previous_full_word: prev,
            occurrence_count: count,
            rank: 1,
            start_note: 20,
            dry_run: false,
        }
    }

    fn advances(events: &[Event]) -> Vec<i64> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Advance { delta_ms } => Some(*delta_ms),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_ids_roundtrip() {
        for a in Algorithm::ALL {
            assert_eq!(Algorithm::from_id(a.id()), Some(a));
        }
        assert_eq!(Algorithm::from_id(6), None);
        assert_eq!(Algorithm::from_id(0), None);
    }

    #[test]
    fn test_serde_uses_numeric_id() {
        assert_eq!(serde_json::to_string(&Algorithm::Absolute).unwrap(), "7");
        let a: Algorithm = serde_json::from_str("5").unwrap();
        assert_eq!(a, Algorithm::ContextFree);
        assert!(serde_json::from_str::<Algorithm>("6").is_err());
    }

    #[test]
    fn test_dry_run_only_maps_note() {
        let p = preset(12);
        let mut session = SessionState::new(VerseRng::new(1));
        session.set_carried_tempo(77);
        let mut c = ctx("rose", Some("night."), 4);
        c.dry_run = true;
        for a in Algorithm::ALL {
            let r = a.step(&c, &p, &mut session, &NoSyllables);
            assert_eq!(r.note_index, compute_note_index(1, 20, &p));
            assert!(r.events.is_empty());
            assert!(!r.applies_state);
        }
        assert_eq!(session.carried_tempo(), 77);
        assert!(session.events().is_empty());
    }

    #[test]
    fn test_dry_run_draws_no_randomness() {
        let p = preset(12);
        let mut session = SessionState::new(VerseRng::new(5));
        let mut c = ctx("rose", Some("night,"), 1);
        c.dry_run = true;
        Algorithm::CarriedTempo.step(&c, &p, &mut session, &NoSyllables);
        let mut fresh = VerseRng::new(5);
        assert_eq!(session.rng_mut().next_u64(), fresh.next_u64());
    }

    #[test]
    fn test_baseline_events() {
        let p = preset(1);
        let mut session = SessionState::new(VerseRng::new(2));
        let r = Algorithm::Baseline.step(&ctx("rose", None, 1), &p, &mut session, &NoSyllables);
        assert!(r.applies_state);
        assert_eq!(r.events.len(), 2);
        assert_eq!(
            r.events[0],
            Event::NoteOn {
                channel: 3,
                note: 21,
                velocity: 100
            }
        );
        let gap = advances(&r.events)[0];
        assert!((50..100).contains(&gap));
    }

    #[test]
    fn test_channel_rotates_by_stream_index() {
        let p = preset(1);
        let mut rng = VerseRng::new(1);
        let mut c = ctx("rose", None, 1);
        c.stream_index = 13;
        let plan = Algorithm::Baseline.compute(&c, &p, 0, &mut rng, &NoSyllables);
        assert_eq!(plan.channel, 4);
    }

    #[test]
    fn test_sentence_end_adds_breath() {
        let p = preset(3); // truncate 0
        let mut rng = VerseRng::new(3);
        for _ in 0..200 {
            let plan = Algorithm::SentenceEnd.compute(
                &ctx("x", Some("end."), 1),
                &p,
                0,
                &mut rng,
                &NoSyllables,
            );
            assert!((150..600).contains(&plan.advance_ms));
            assert_eq!(plan.close, NoteClose::Open);
        }
    }

    #[test]
    fn test_sentence_end_truncate_always() {
        let mut p = preset(3);
        p.truncate = Truncate::ALWAYS;
        let mut session = SessionState::new(VerseRng::new(4));
        let r = Algorithm::SentenceEnd.step(&ctx("x", None, 1), &p, &mut session, &NoSyllables);
        assert_eq!(r.events.len(), 3);
        assert!(r.events[2].is_note_off());
    }

    #[test]
    fn test_sentence_end_coin_flip_closes_sometimes() {
        let p = preset(0); // bass, truncate 2
        let mut rng = VerseRng::new(6);
        let closed = (0..1000)
            .filter(|_| {
                Algorithm::SentenceEnd
                    .compute(&ctx("x", None, 1), &p, 0, &mut rng, &NoSyllables)
                    .close
                    == NoteClose::Close
            })
            .count();
        assert!((400..600).contains(&closed), "closed {closed} of 1000");
    }

    #[test]
    fn test_lexical_loudness_and_syllables() {
        let p = preset(4); // base 50, spread 50, truncate 10
        let mut table = BTreeMap::new();
        table.insert("tiger".to_string(), 2);
        let mut rng = VerseRng::new(7);
        let plan = Algorithm::Lexical.compute(&ctx("tiger", None, 3), &p, 0, &mut rng, &table);
        assert_eq!(plan.velocity, 100 - 40 + 6);
        // band [50, 100) + one extra syllable
        assert!((150..200).contains(&plan.advance_ms));
        assert_eq!(plan.close, NoteClose::CloseAndSettle);
    }

    #[test]
    fn test_lexical_unknown_word_shortens_gap() {
        let p = preset(4);
        let mut rng = VerseRng::new(8);
        let plan = Algorithm::Lexical.compute(&ctx("zorp", None, 1), &p, 0, &mut rng, &NoSyllables);
        assert!((-50..0).contains(&plan.advance_ms));
    }

    #[test]
    fn test_lexical_periodic_close() {
        let p = preset(4);
        let mut rng = VerseRng::new(9);
        let tenth = Algorithm::Lexical.compute(&ctx("a", None, 10), &p, 0, &mut rng, &NoSyllables);
        assert_eq!(tenth.close, NoteClose::Open);
        let eleventh = Algorithm::Lexical.compute(
            &ctx("a", None, 11),
            &p,
            0,
            &mut rng,
            &NoSyllables,
        );
        assert_eq!(eleventh.close, NoteClose::CloseAndSettle);
        let events = eleventh.events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[3], Event::Advance { delta_ms: 0 });
    }

    #[test]
    fn test_carried_tempo_persists_until_boundary() {
        let p = preset(8);
        let mut session = SessionState::new(VerseRng::new(10));

        // No boundary: the initial tempo (0) carries.
        Algorithm::CarriedTempo.step(&ctx("a", Some("plain"), 1), &p, &mut session, &NoSyllables);
        assert_eq!(session.carried_tempo(), 0);

        // A comma resamples it into the preset band.
        Algorithm::CarriedTempo.step(&ctx("b", Some("pause,"), 1), &p, &mut session, &NoSyllables);
        let tempo = session.carried_tempo();
        assert!((45..60).contains(&tempo));

        // And it sticks for the next plain word.
        Algorithm::CarriedTempo.step(&ctx("c", Some("plain"), 1), &p, &mut session, &NoSyllables);
        assert_eq!(session.carried_tempo(), tempo);
    }

    #[test]
    fn test_carried_tempo_accents() {
        let p = preset(8);
        let mut rng = VerseRng::new(11);
        let after_period = Algorithm::CarriedTempo.compute(
            &ctx("a", Some("end."), 1),
            &p,
            0,
            &mut rng,
            &NoSyllables,
        );
        assert_eq!(after_period.velocity, 100 - 40 + 2 + 15);
        let after_comma = Algorithm::CarriedTempo.compute(
            &ctx("a", Some("so,"), 1),
            &p,
            0,
            &mut rng,
            &NoSyllables,
        );
        assert_eq!(after_comma.velocity, 100 - 40 + 2 + 10);
        let after_both = Algorithm::CarriedTempo.compute(
            &ctx("a", Some("e.g.,"), 1),
            &p,
            0,
            &mut rng,
            &NoSyllables,
        );
        assert_eq!(after_both.velocity, 100 - 40 + 2 + 10);
    }

    #[test]
    fn test_carried_tempo_gap_composition() {
        let p = preset(8);
        let mut rng = VerseRng::new(12);
        let plan = Algorithm::CarriedTempo.compute(
            &ctx("a", Some("plain"), 1),
            &p,
            40,
            &mut rng,
            &NoSyllables,
        );
        // carried 40, syllables -100, jitter [0, 10)
        assert!((-60..-50).contains(&plan.advance_ms));
        assert_eq!(plan.carried_tempo, 40);
    }

    #[test]
    fn test_sentence_end_time_superseded_in_carried_tempo() {
        let p = preset(8);
        let mut rng = VerseRng::new(13);
        for _ in 0..200 {
            let plan = Algorithm::CarriedTempo.compute(
                &ctx("a", Some("end."), 1),
                &p,
                0,
                &mut rng,
                &NoSyllables,
            );
            // new tempo [45, 60) - 100 + jitter [0, 10): no sentence-end time.
            assert!((-55..-30).contains(&plan.advance_ms), "{}", plan.advance_ms);
        }
    }

    #[test]
    fn test_loudness_clamped_in_carried_tempo() {
        let p = preset(8);
        let mut rng = VerseRng::new(14);
        let plan = Algorithm::CarriedTempo.compute(
            &ctx("a", Some("end."), 200),
            &p,
            0,
            &mut rng,
            &NoSyllables,
        );
        assert_eq!(plan.velocity, 255);
    }

    #[test]
    fn test_context_free_ignores_context() {
        let p = preset(9); // truncate 2
        let mut rng = VerseRng::new(15);
        for count in 1..20 {
            let plan = Algorithm::ContextFree.compute(
                &ctx("a", Some("end.,"), count),
                &p,
                30,
                &mut rng,
                &NoSyllables,
            );
            assert_eq!(plan.velocity, 100 - 40);
            assert_eq!(plan.carried_tempo, 30);
            assert_eq!(plan.close, NoteClose::Open);
        }
    }

    #[test]
    fn test_absolute_matches_carried_tempo() {
        let p = preset(11);
        let c = ctx("tiger", Some("bright,"), 3);
        let mut a = VerseRng::new(16);
        let mut b = VerseRng::new(16);
        let x = Algorithm::Absolute.compute(&c, &p, 12, &mut a, &NoSyllables);
        let y = Algorithm::CarriedTempo.compute(&c, &p, 12, &mut b, &NoSyllables);
        assert_eq!(x, y);
    }

    #[test]
    fn test_all_variants_share_note_mapping() {
        let p = preset(11);
        let c = ctx("w", Some("x."), 2);
        for a in Algorithm::ALL {
            let mut rng = VerseRng::new(17);
            let plan = a.compute(&c, &p, 0, &mut rng, &NoSyllables);
            assert_eq!(plan.note_index, 31);
        }
    }
}
