// Generation configuration.
//
// Everything a run needs besides the input text lives in `GenerationConfig`.
// It can be loaded from a JSON file in which every field is optional;
// missing fields take the defaults below, which reproduce the classic
// "run all" plan: three relative renders starting at notes 70, 100 and 130,
// three absolute renders at 30, 90 and 120, and a descriptive pass at 70,
// all with preset 12.
//
// The CLI (`main.rs`) layers its flags over whatever the file provides.

use crate::error::{EngineError, Result};
use crate::midi::DEFAULT_TEMPO_US;
use crate::preset::DEFAULT_PRESET_ID;
use crate::tracker::IndexingMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Start note of the descriptive pass when none is configured.
pub const DEFAULT_DESCRIBE_START_NOTE: i32 = 70;

/// Dataset name when neither the config nor the input names one.
pub const DEFAULT_DATASET: &str = "poem";

/// One playable render of the plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSpec {
    pub start_note: i32,
    #[serde(default)]
    pub indexing: IndexingMode,
    /// File label; defaults to `{dataset}{start_note}.mid`, with `_abs`
    /// before the extension for absolute indexing.
    #[serde(default)]
    pub label: Option<String>,
}

impl RenderSpec {
    pub fn new(start_note: i32, indexing: IndexingMode) -> Self {
        RenderSpec {
            start_note,
            indexing,
            label: None,
        }
    }

    /// The label this render is written under.
    pub fn label_for(&self, dataset: &str) -> String {
        match (&self.label, self.indexing) {
            (Some(label), _) => label.clone(),
            (None, IndexingMode::Relative) => format!("{dataset}{}.mid", self.start_note),
            (None, IndexingMode::Absolute) => format!("{dataset}{}_abs.mid", self.start_note),
        }
    }
}

/// The classic plan.
pub fn default_renders() -> Vec<RenderSpec> {
    let relative = [70, 100, 130]
        .into_iter()
        .map(|n| RenderSpec::new(n, IndexingMode::Relative));
    let absolute = [30, 90, 120]
        .into_iter()
        .map(|n| RenderSpec::new(n, IndexingMode::Absolute));
    relative.chain(absolute).collect()
}

/// All tunable run parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Names the output files; unset means the input's file stem, or
    /// `DEFAULT_DATASET` when there is none.
    pub dataset: Option<String>,
    /// Root under which `songs/`, `javascript/` and `concordances/` are
    /// created.
    pub output_dir: PathBuf,
    pub preset_id: u32,
    /// Microseconds per quarter note in the MIDI files.
    pub tempo_us: u32,
    pub renders: Vec<RenderSpec>,
    pub describe_start_note: i32,
    /// Let each render start from the carried tempo the previous one left.
    pub carry_tempo: bool,
    /// Fixed PRNG seed; unseeded runs differ every time.
    pub seed: Option<u64>,
    /// Also write per-word concordance listings.
    pub concordance: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            dataset: None,
            output_dir: PathBuf::from("."),
            preset_id: DEFAULT_PRESET_ID,
            tempo_us: DEFAULT_TEMPO_US,
            renders: default_renders(),
            describe_start_note: DEFAULT_DESCRIBE_START_NOTE,
            carry_tempo: false,
            seed: None,
            concordance: false,
        }
    }
}

impl GenerationConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        Self::from_json(&json)
    }

    /// Name the dataset after `input` unless one was already chosen.
    pub fn name_after_input(&mut self, input: &Path) {
        if self.dataset.is_none() {
            self.dataset = input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }
    }

    pub fn dataset_name(&self) -> &str {
        self.dataset.as_deref().unwrap_or(DEFAULT_DATASET)
    }
}
