// Presets: named bundles of generation parameters.
//
// A preset fixes everything about a render except the token stream and the
// start note: the note range the ranks wrap around in, how many MIDI
// channels notes rotate through, the random tempo band, the base loudness,
// the note-closing policy and which algorithm variant drives the notes.
//
// The registry ships the thirteen presets (ids 0–12) the project has always
// had: `v0`–`v2` are the early experiments, `v4`–`v10` explore the lexical
// timing variants, and `v11`/`v12` are the production settings. A JSON
// presets file can replace the table (see `PresetRegistry::from_json`).
//
// Every preset is validated when the registry is built, so note computation
// never sees a zero range or an unrepresentable MIDI note.

use crate::algorithm::Algorithm;
use crate::error::{EngineError, Result};
use crate::heuristics::MAX_LOUDNESS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Preset used when none is requested.
pub const DEFAULT_PRESET_ID: u32 = 12;

/// MIDI has 16 channels.
const MAX_CHANNELS: u8 = 16;

/// Note numbers must fit in 7 bits.
const NOTE_LIMIT: i32 = 128;

/// Which way successive ranks walk through the note range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Note-closing policy.
///
/// `0` never closes, `1` always closes and `2` closes on a coin flip under
/// the sentence-end variant. The lexical variants read the raw value as a
/// period instead: a note is closed unless the word's occurrence count is a
/// multiple of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Truncate(pub u32);

impl Truncate {
    pub const NEVER: Truncate = Truncate(0);
    pub const ALWAYS: Truncate = Truncate(1);
    pub const COIN_FLIP: Truncate = Truncate(2);

    /// Periodic rule: close the `count`-th occurrence iff `count mod N != 0`.
    pub fn closes_occurrence(self, count: u32) -> bool {
        self.0 > 0 && count % self.0 != 0
    }
}

/// One generation parameter bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    /// Stable registry id.
    pub id: u32,
    /// Short name, used in output file names.
    pub name: String,
    /// Note the rank walk starts from when the caller gives none.
    pub start_note: i32,
    /// Number of distinct notes ranks wrap around in.
    pub note_range: i32,
    /// Lowest note produced.
    pub note_offset: i32,
    /// Notes rotate through channels `0..channel_count` by stream position.
    pub channel_count: u8,
    pub truncate: Truncate,
    /// Width of the random tempo band, in ms.
    pub rand_spread: i64,
    /// Bottom of the random tempo band, in ms.
    pub rand_base: i64,
    /// Velocity before count and boundary adjustments.
    pub base_loudness: i32,
    pub direction: Direction,
    /// Carried for completeness; no variant routes notes to the drum channel.
    pub drums_enabled: bool,
    pub algorithm: Algorithm,
}

impl Preset {
    /// Check the fields note computation and MIDI output depend on.
    pub fn validate(&self) -> Result<()> {
        let label = format!("{} ({})", self.id, self.name);
        if self.name.trim().is_empty() {
            return Err(EngineError::invalid(label, "name must not be empty"));
        }
        if self.note_range <= 0 {
            return Err(EngineError::invalid(
                label,
                format!("note_range must be positive, got {}", self.note_range),
            ));
        }
        if self.channel_count == 0 || self.channel_count > MAX_CHANNELS {
            return Err(EngineError::invalid(
                label,
                format!(
                    "channel_count must be in 1..={MAX_CHANNELS}, got {}",
                    self.channel_count
                ),
            ));
        }
        if self.note_offset < 0 || self.note_range > NOTE_LIMIT - self.note_offset {
            return Err(EngineError::invalid(
                label,
                format!(
                    "notes {}..{} fall outside the MIDI range",
                    self.note_offset,
                    self.note_offset as i64 + self.note_range as i64
                ),
            ));
        }
        if !(0..=MAX_LOUDNESS).contains(&self.base_loudness) {
            return Err(EngineError::invalid(
                label,
                format!(
                    "base_loudness must be in 0..={MAX_LOUDNESS}, got {}",
                    self.base_loudness
                ),
            ));
        }
        if self.rand_spread < 0 {
            return Err(EngineError::invalid(
                label,
                format!("rand_spread must not be negative, got {}", self.rand_spread),
            ));
        }
        Ok(())
    }
}

/// Validated presets indexed by id.
#[derive(Debug, Clone)]
pub struct PresetRegistry {
    presets: BTreeMap<u32, Preset>,
}

impl PresetRegistry {
    /// Build a registry, rejecting invalid presets and duplicate ids.
    pub fn from_presets(presets: impl IntoIterator<Item = Preset>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for preset in presets {
            preset.validate()?;
            let id = preset.id;
            if let Some(previous) = map.insert(id, preset) {
                return Err(EngineError::invalid(
                    format!("{id} ({})", previous.name),
                    "duplicate preset id",
                ));
            }
        }
        Ok(PresetRegistry { presets: map })
    }

    /// The built-in table.
    pub fn builtin() -> Result<Self> {
        Self::from_presets(builtin_presets())
    }

    /// Parse a JSON array of presets.
    pub fn from_json(json: &str) -> Result<Self> {
        let presets: Vec<Preset> = serde_json::from_str(json)?;
        Self::from_presets(presets)
    }

    /// Load a presets file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        Self::from_json(&json)
    }

    pub fn lookup(&self, id: u32) -> Result<&Preset> {
        self.presets.get(&id).ok_or(EngineError::UnknownPreset(id))
    }

    /// All presets in id order.
    pub fn list(&self) -> impl Iterator<Item = &Preset> {
        self.presets.values()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

fn builtin_presets() -> Vec<Preset> {
    let experimental = Preset {
        id: 0,
        name: String::new(),
        start_note: 20,
        note_range: 127,
        note_offset: 0,
        channel_count: 9,
        truncate: Truncate(10),
        rand_spread: 50,
        rand_base: 50,
        base_loudness: 0x64,
        direction: Direction::Down,
        drums_enabled: false,
        algorithm: Algorithm::Lexical,
    };
    let tuned = Preset {
        note_range: 108,
        rand_spread: 15,
        rand_base: 45,
        algorithm: Algorithm::CarriedTempo,
        ..experimental.clone()
    };

    vec![
        Preset {
            id: 0,
            name: "bass".into(),
            note_range: 30,
            note_offset: 10,
            channel_count: 1,
            truncate: Truncate(2),
            algorithm: Algorithm::SentenceEnd,
            ..experimental.clone()
        },
        Preset {
            id: 1,
            name: "v0".into(),
            start_note: 70,
            truncate: Truncate::NEVER,
            direction: Direction::Up,
            drums_enabled: true,
            algorithm: Algorithm::Baseline,
            ..experimental.clone()
        },
        Preset {
            id: 2,
            name: "v1".into(),
            start_note: 70,
            truncate: Truncate::NEVER,
            drums_enabled: true,
            algorithm: Algorithm::Baseline,
            ..experimental.clone()
        },
        Preset {
            id: 3,
            name: "v2".into(),
            truncate: Truncate::NEVER,
            algorithm: Algorithm::SentenceEnd,
            ..experimental.clone()
        },
        Preset {
            id: 4,
            name: "v4".into(),
            ..experimental.clone()
        },
        Preset {
            id: 5,
            name: "v5".into(),
            rand_spread: 15,
            rand_base: 45,
            ..experimental.clone()
        },
        Preset {
            id: 6,
            name: "v6".into(),
            start_note: 40,
            note_range: 84,
            ..tuned.clone()
        },
        Preset {
            id: 7,
            name: "v7".into(),
            note_range: 108,
            rand_spread: 35,
            rand_base: 35,
            ..experimental.clone()
        },
        Preset {
            id: 8,
            name: "v8".into(),
            ..tuned.clone()
        },
        Preset {
            id: 9,
            name: "v9".into(),
            truncate: Truncate(2),
            algorithm: Algorithm::ContextFree,
            ..tuned.clone()
        },
        Preset {
            id: 10,
            name: "v10".into(),
            truncate: Truncate(2),
            ..tuned.clone()
        },
        Preset {
            id: 11,
            name: "v11".into(),
            note_range: 96,
            note_offset: 12,
            truncate: Truncate(2),
            algorithm: Algorithm::Absolute,
            ..tuned.clone()
        },
        Preset {
            id: 12,
            name: "v12".into(),
            start_note: 12,
            note_range: 72,
            note_offset: 24,
            ..tuned
        },
    ]
}
