// Rank-to-note mapping.
//
// A word's rank is an offset from the start note, walked up or down and
// wrapped into the preset's note range:
//
//   up:   ((start + rank) mod range) + offset
//   down: ((start - rank) mod range) + offset
//
// The modulo is Euclidean, so the result always lies in
// `[offset, offset + range)` however far below zero `start - rank` goes.

use crate::preset::{Direction, Preset};

/// Note number for `rank` starting from `start_note`.
///
/// `preset` must come from a `PresetRegistry`, which guarantees a positive
/// note range.
pub fn compute_note_index(rank: u32, start_note: i32, preset: &Preset) -> i32 {
    let rank = rank as i64;
    let start = start_note as i64;
    let walked = match preset.direction {
        Direction::Up => start + rank,
        Direction::Down => start - rank,
    };
    (walked.rem_euclid(preset.note_range as i64) + preset.note_offset as i64) as i32
}

/// The start note a render uses: the caller's, unless absent or zero, in
/// which case the preset's own.
pub fn resolve_start_note(requested: Option<i32>, preset: &Preset) -> i32 {
    match requested {
        Some(note) if note != 0 => note,
        _ => preset.start_note,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::PresetRegistry;

    fn preset(id: u32) -> Preset {
        PresetRegistry::builtin().unwrap().lookup(id).unwrap().clone()
    }

    #[test]
    fn test_down_example() {
        // v11: range 96, offset 12, down.
        let p = preset(11);
        let notes: Vec<i32> = [1, 2, 1, 4]
            .iter()
            .map(|&r| compute_note_index(r, 20, &p))
            .collect();
        assert_eq!(notes, vec![31, 30, 31, 28]);
    }

    #[test]
    fn test_up_direction() {
        let p = preset(1); // range 127, offset 0, up
        assert_eq!(compute_note_index(1, 70, &p), 71);
        assert_eq!(compute_note_index(60, 70, &p), 3);
    }

    #[test]
    fn test_negative_dividend_wraps_non_negative() {
        let p = preset(12); // range 72, offset 24, down
        // 12 - 100 = -88; -88 mod 72 = 56
        assert_eq!(compute_note_index(100, 12, &p), 56 + 24);
    }

    #[test]
    fn test_always_in_range_both_directions() {
        for id in 0..=12 {
            let mut p = preset(id);
            for direction in [Direction::Up, Direction::Down] {
                p.direction = direction;
                for start in [-300, -1, 0, 1, 12, 70, 130, 500] {
                    for rank in [1, 2, 50, 127, 128, 1000, 100_000] {
                        let note = compute_note_index(rank, start, &p);
                        assert!(
                            (p.note_offset..p.note_offset + p.note_range).contains(&note),
                            "preset {id} {direction:?} start {start} rank {rank} -> {note}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_pure_function() {
        let p = preset(8);
        let a = compute_note_index(17, 20, &p);
        let b = compute_note_index(17, 20, &p);
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolve_start_note() {
        let p = preset(12);
        assert_eq!(resolve_start_note(Some(70), &p), 70);
        assert_eq!(resolve_start_note(Some(0), &p), 12);
        assert_eq!(resolve_start_note(None, &p), 12);
    }
}
