// Timing and loudness heuristics.
//
// Small functions that turn lexical features into millisecond deltas and
// velocity adjustments. The previous word's raw form carries the
// punctuation: a period suggests a sentence end (a long breath), a comma a
// pause (a shorter one). Both checks are crude ("St. Elmo" ends a
// sentence), and that is accepted.
//
// A heuristic that does not fire returns 0 without touching the PRNG, so
// the random stream only advances when a value is actually drawn.

use crate::preset::Preset;
use versetone_lang::SyllableLookup;
use versetone_prng::VerseRng;

/// Loudness ceiling.
pub const MAX_LOUDNESS: i32 = 255;

/// Default comma pause band: `[80, 380)` ms.
pub const PAUSE_SPREAD: i64 = 300;
pub const PAUSE_BASE: i64 = 80;

/// Up to 10ms of jitter so repeated rhythms do not sound mechanical.
pub fn humanize_jitter_ms(rng: &mut VerseRng) -> i64 {
    rng.range_i64(0, 10)
}

/// 100ms per syllable beyond the first.
///
/// An unknown word counts 0 syllables and so yields -100.
pub fn syllable_time_ms(word: &str, syllables: &dyn SyllableLookup) -> i64 {
    (syllables.syllable_count(word) as i64 - 1) * 100
}

/// `[100, 500)` ms after a word containing a period, else 0.
pub fn sentence_end_time_ms(prev_full_word: Option<&str>, rng: &mut VerseRng) -> i64 {
    match prev_full_word {
        Some(word) if word.contains('.') => rng.range_i64(100, 500),
        _ => 0,
    }
}

/// `[base, base + spread)` ms after a word containing a comma, else 0.
pub fn sentence_pause_time_ms(
    prev_full_word: Option<&str>,
    spread: i64,
    base: i64,
    rng: &mut VerseRng,
) -> i64 {
    match prev_full_word {
        Some(word) if word.contains(',') => rng.spread(base, spread),
        _ => 0,
    }
}

/// Frequently used words get louder: two steps per occurrence.
///
/// Capped at `MAX_LOUDNESS`; there is no floor.
pub fn loudness_for_count(count: u32, boost: i32, preset: &Preset) -> i32 {
    let loudness = preset.base_loudness as i64 - 40 + 2 * count as i64 + boost as i64;
    loudness.min(MAX_LOUDNESS as i64) as i32
}
