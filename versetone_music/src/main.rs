// Versetone generator: CLI entry point.
//
// Reads a poem, renders it with one preset and writes MIDI files, the
// descriptive JSON and (optionally) concordances. The pipeline: load config
// and presets → read text and dictionaries → render → write artifacts.
//
// Usage:
//   cargo run -p versetone_music -- poem.txt [--dataset NAME] [--preset ID]
//     [--config run.json] [--presets-file presets.json] [--out-dir DIR]
//     [--seed N] [--tempo US] [--start-note N ...] [--absolute]
//     [--carry-tempo] [--concord] [--cmudict FILE] [--wordlist FILE] [-v]
//   cargo run -p versetone_music -- --list-presets
//
// Input ending in `.json` is read as an annotated token file
// (`[{parsed, normalized, raw, pos}]`, or `{parsed: [..], normalized: [..],
// raw: [..], pos: [..]}`); anything else as plain text.

use anyhow::{Context, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::Level;
use versetone_lang::vocabulary::WordList;
use versetone_lang::{CmuDict, TokenStream};
use versetone_music::config::{GenerationConfig, RenderSpec};
use versetone_music::generator::{Generator, TempoCarry};
use versetone_music::preset::PresetRegistry;
use versetone_music::tracker::IndexingMode;

/// Turn a poem into MIDI files and visualization data
#[derive(Parser)]
#[command(name = "generate")]
#[command(version)]
struct Cli {
    /// Poem to render: plain text, or an annotated token file (.json)
    input: Option<PathBuf>,

    /// Name used for output files (default: the input's file stem)
    #[arg(long)]
    dataset: Option<String>,

    /// Preset id
    #[arg(short, long)]
    preset: Option<u32>,

    /// JSON presets file replacing the built-in table
    #[arg(long)]
    presets_file: Option<PathBuf>,

    /// JSON run configuration; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory receiving songs/, javascript/ and concordances/
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Seed for reproducible timing
    #[arg(long)]
    seed: Option<u64>,

    /// Microseconds per quarter note
    #[arg(long)]
    tempo: Option<u32>,

    /// Render only these start notes (repeatable)
    #[arg(long = "start-note")]
    start_notes: Vec<i32>,

    /// Rank words by distinct-word order for --start-note renders
    #[arg(long)]
    absolute: bool,

    /// Let each render continue from the previous render's carried tempo
    #[arg(long)]
    carry_tempo: bool,

    /// Write per-word concordance listings
    #[arg(long)]
    concord: bool,

    /// CMU pronouncing dictionary for syllable counts
    #[arg(long)]
    cmudict: Option<PathBuf>,

    /// Word list for the vocabulary check
    #[arg(long)]
    wordlist: Option<PathBuf>,

    /// Print the preset table and exit
    #[arg(long)]
    list_presets: bool,

    /// Log every emitted word
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_target(false)
        .init();

    let registry = match &cli.presets_file {
        Some(path) => PresetRegistry::load(path)
            .with_context(|| format!("loading presets from {}", path.display()))?,
        None => PresetRegistry::builtin().context("building the preset table")?,
    };

    if cli.list_presets {
        print_presets(&registry);
        return Ok(());
    }

    let Some(input) = cli.input.as_deref() else {
        bail!("no input file given (see --help)");
    };
    let config = resolve_config(&cli, input)?;
    let preset = registry.lookup(config.preset_id)?.clone();

    let tokens = read_tokens(input)?;
    if tokens.is_empty() {
        tracing::warn!(path = %input.display(), "input has no words");
    }

    let mut generator = Generator::new(tokens, preset).with_tempo_carry(if config.carry_tempo {
        TempoCarry::AcrossRenders
    } else {
        TempoCarry::PerSession
    });
    if let Some(seed) = config.seed {
        generator = generator.with_seed(seed);
    }
    if let Some(path) = &cli.cmudict {
        let dict = CmuDict::load(path)
            .with_context(|| format!("loading pronouncing dictionary {}", path.display()))?;
        tracing::info!(entries = dict.len(), "loaded pronouncing dictionary");
        generator = generator.with_syllables(dict);
    }
    if let Some(path) = &cli.wordlist {
        let list = WordList::load(path)
            .with_context(|| format!("loading word list {}", path.display()))?;
        generator = generator.with_word_list(list);
    }

    let summary = generator
        .run_all(&config)
        .with_context(|| format!("writing output under {}", config.output_dir.display()))?;
    tracing::info!(
        midi = summary.midi_files.len(),
        concordances = summary.concordances.len(),
        "done"
    );
    Ok(())
}

/// Config file (or defaults) with command-line flags applied on top.
fn resolve_config(cli: &Cli, input: &Path) -> anyhow::Result<GenerationConfig> {
    let mut config = match &cli.config {
        Some(path) => GenerationConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GenerationConfig::default(),
    };

    if let Some(dataset) = &cli.dataset {
        config.dataset = Some(dataset.clone());
    }
    config.name_after_input(input);
    if let Some(id) = cli.preset {
        config.preset_id = id;
    }
    if let Some(dir) = &cli.out_dir {
        config.output_dir = dir.clone();
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(tempo) = cli.tempo {
        if tempo == 0 {
            bail!("--tempo must be positive");
        }
        config.tempo_us = tempo;
    }
    if !cli.start_notes.is_empty() {
        let indexing = if cli.absolute {
            IndexingMode::Absolute
        } else {
            IndexingMode::Relative
        };
        config.renders = cli
            .start_notes
            .iter()
            .map(|&n| RenderSpec::new(n, indexing))
            .collect();
    }
    config.carry_tempo |= cli.carry_tempo;
    config.concordance |= cli.concord;
    Ok(config)
}

fn read_tokens(input: &Path) -> anyhow::Result<TokenStream> {
    let annotated = input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let tokens = if annotated {
        TokenStream::load_json(input)
    } else {
        TokenStream::load_text(input)
    };
    tokens.with_context(|| format!("reading {}", input.display()))
}

fn print_presets(registry: &PresetRegistry) {
    println!(
        "{:>3}  {:<6} {:>4} {:>6} {:>6} {:>7} {:>9} {:>6}  dir",
        "id", "name", "algo", "start", "range", "offset", "truncate", "tempo"
    );
    for p in registry.list() {
        println!(
            "{:>3}  {:<6} {:>4} {:>6} {:>6} {:>7} {:>9} {:>6}  {:?}",
            p.id,
            p.name,
            p.algorithm.id(),
            p.start_note,
            p.note_range,
            p.note_offset,
            p.truncate.0,
            format!("{}+{}", p.rand_base, p.rand_spread),
            p.direction
        );
    }
}
