// Token streams: the three aligned surface forms of every word.
//
// A poem is read once into a `TokenStream`. Position `i` always names the
// same logical word in all forms:
// - `parsed`: punctuation stripped, quotes trimmed ("goin'" stays "goin'")
// - `normalized`: morphologically regularized ("goin'" becomes "going")
// - `raw`: the whitespace-delimited word exactly as written
// plus a part-of-speech tag (empty unless supplied).
//
// The music engine keys word identity on `parsed`, reads sentence
// punctuation off `raw`, and the descriptive output reports all three.
//
// Separator-only words ("-") and words that clean down to nothing are
// dropped together with their raw form, so alignment cannot drift.

use crate::LangError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Characters removed from every word before any other cleaning.
const STRIPPED_CHARS: &[char] = &['(', ')', '.', ',', '!', ';', '?', '"'];

/// Raw word used as a visual separator in source texts.
const SEPARATOR: &str = "-";

/// One position in the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub parsed: String,
    pub normalized: String,
    pub raw: String,
    #[serde(default)]
    pub pos: String,
}

/// The two layouts an annotated token file may use.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnnotatedFile {
    Rows(Vec<Token>),
    Columns {
        parsed: Vec<String>,
        normalized: Vec<String>,
        raw: Vec<String>,
        #[serde(default)]
        pos: Option<Vec<String>>,
    },
}

/// An ordered, aligned sequence of tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Tokenize plain text on whitespace and clean each word.
    pub fn from_text(text: &str) -> Self {
        let tokens = text.split_whitespace().filter_map(clean_word).collect();
        TokenStream { tokens }
    }

    /// Read and tokenize a plain-text file.
    pub fn load_text(path: &Path) -> Result<Self, LangError> {
        Ok(Self::from_text(&crate::read_to_string(path)?))
    }

    /// Parse an annotated token file: either a JSON array of
    /// `{parsed, normalized, raw, pos}` objects, or one object holding the
    /// forms as parallel arrays (`pos` optional).
    pub fn from_json(json: &str) -> Result<Self, LangError> {
        let stream = match serde_json::from_str::<AnnotatedFile>(json)? {
            AnnotatedFile::Rows(tokens) => TokenStream { tokens },
            AnnotatedFile::Columns {
                parsed,
                normalized,
                raw,
                pos,
            } => {
                let stream = Self::from_parts(parsed, normalized, raw)?;
                match pos {
                    Some(tags) => stream.with_pos_tags(tags)?,
                    None => stream,
                }
            }
        };
        Ok(stream.without_separators())
    }

    /// Read an annotated token file.
    pub fn load_json(path: &Path) -> Result<Self, LangError> {
        Self::from_json(&crate::read_to_string(path)?)
    }

    /// Assemble a stream from separately produced form sequences.
    ///
    /// Fails with `Misaligned` unless all three have the same length.
    pub fn from_parts(
        parsed: Vec<String>,
        normalized: Vec<String>,
        raw: Vec<String>,
    ) -> Result<Self, LangError> {
        let expected = parsed.len();
        check_len("normalized", expected, normalized.len())?;
        check_len("raw", expected, raw.len())?;
        let tokens = parsed
            .into_iter()
            .zip(normalized)
            .zip(raw)
            .map(|((parsed, normalized), raw)| Token {
                parsed,
                normalized,
                raw,
                pos: String::new(),
            })
            .collect();
        Ok(TokenStream { tokens })
    }

    /// Attach one part-of-speech tag per token.
    pub fn with_pos_tags(mut self, tags: Vec<String>) -> Result<Self, LangError> {
        check_len("pos", self.tokens.len(), tags.len())?;
        for (token, tag) in self.tokens.iter_mut().zip(tags) {
            token.pos = tag;
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Parsed forms in stream order.
    pub fn parsed(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.parsed.clone()).collect()
    }

    fn without_separators(mut self) -> Self {
        self.tokens.retain(|t| !t.parsed.is_empty() && t.parsed != SEPARATOR);
        self
    }

    /// Lowercased normalized forms, the input to n-gram counting.
    pub fn lowered_normalized(&self) -> Vec<String> {
        self.tokens
            .iter()
            .map(|t| t.normalized.to_lowercase())
            .collect()
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), LangError> {
    if expected == actual {
        Ok(())
    } else {
        Err(LangError::Misaligned {
            what,
            expected,
            actual,
        })
    }
}

/// Clean one raw word into a token, or `None` if nothing is left of it.
fn clean_word(raw: &str) -> Option<Token> {
    if raw == SEPARATOR {
        return None;
    }
    let stripped: String = raw.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect();
    let mut parsed = stripped.clone();
    let mut normalized = stripped;

    if parsed.chars().count() > 1 {
        if parsed.starts_with('\'') && parsed.ends_with('\'') {
            parsed = parsed.replace('\'', "");
        }
        if parsed.ends_with("in'") {
            // Dropped-g gerunds keep their spelling but normalize to "-ing".
            normalized = format!("{}g", &parsed[..parsed.len() - 1]);
        } else if parsed.ends_with('\'') {
            parsed.pop();
        }
        if parsed.starts_with('\'') {
            parsed.remove(0);
        }
    }

    if parsed.is_empty() || parsed == SEPARATOR {
        return None;
    }
    Some(Token {
        parsed,
        normalized,
        raw: raw.to_string(),
        pos: String::new(),
    })
}
