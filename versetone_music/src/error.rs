// Error type for the music engine.
//
// Only configuration and I/O can fail. Everything inside the per-token fold
// (missing previous word, unknown syllable counts, odd punctuation) resolves
// to a zero contribution instead, so once a session starts it runs to the
// end of the token stream.

use std::path::PathBuf;
use versetone_lang::LangError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unknown preset id {0}")]
    UnknownPreset(u32),
    #[error("invalid preset {preset}: {reason}")]
    InvalidConfiguration { preset: String, reason: String },
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Lang(#[from] LangError),
}

impl EngineError {
    pub(crate) fn invalid(preset: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InvalidConfiguration {
            preset: preset.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
