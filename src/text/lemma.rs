//! Noun lemmatizer reducing inflected words to their dictionary form.
//!
//! Lookup follows the WordNet morphology scheme for nouns: an exception table of irregular
//! forms first, then a fixed list of plural detachment rules. There is no dictionary check,
//! so the rules are guarded by a few suffix heuristics (`-ss`, `-us`, `-is`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exception table compiled into the binary.
const EMBEDDED_NOUN_EXCEPTIONS: &str = include_str!("../../assets/lemma/noun.exc");
const EMBEDDED_ORIGIN: &str = "<embedded noun.exc>";

/// Detachment rules, longest suffix first: `(suffix, replacement)`.
const NOUN_RULES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("ies", "y"),
    ("xes", "x"),
    ("zes", "z"),
    ("men", "man"),
    ("s", ""),
];

/// Suffixes of singular words that only look plural.
const SINGULAR_ENDINGS: &[&str] = &["ss", "us", "is"];

/// Words this short are never rewritten by the rules.
const MIN_RULE_LEN: usize = 4;

/// Bound on chained reductions of a single word.
const MAX_REDUCTIONS: usize = 4;

static SHARED: OnceLock<Lemmatizer> = OnceLock::new();

/// Errors raised while loading linguistic resources.
#[derive(Debug, Error)]
pub enum LemmaError {
    /// The exception file could not be read.
    #[error("failed to read lemma exceptions {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A line did not contain an inflected form followed by a lemma.
    #[error("malformed lemma exception in {origin} at line {line}: {content:?}")]
    Malformed {
        origin: String,
        line: usize,
        content: String,
    },
    /// The resource held no entries at all.
    #[error("lemma exceptions in {origin} are empty")]
    Empty { origin: String },
}

/// Rule-based noun lemmatizer with an irregular-form table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lemmatizer {
    exceptions: BTreeMap<String, String>,
}

impl Lemmatizer {
    /// Build from the table compiled into the binary.
    pub fn embedded() -> Result<Self, LemmaError> {
        Self::parse(EMBEDDED_NOUN_EXCEPTIONS, EMBEDDED_ORIGIN)
    }

    /// Build from an exception file on disk (`<inflected> <lemma>` per line).
    pub fn from_path(path: &Path) -> Result<Self, LemmaError> {
        let text = std::fs::read_to_string(path).map_err(|source| LemmaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Parse exception text. Blank lines and `#` comments are skipped; extra lemmas after
    /// the first one on a line are ignored.
    pub fn parse(text: &str, origin: &str) -> Result<Self, LemmaError> {
        let mut exceptions = BTreeMap::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (Some(inflected), Some(lemma)) = (fields.next(), fields.next()) else {
                return Err(LemmaError::Malformed {
                    origin: origin.to_string(),
                    line: idx + 1,
                    content: raw.to_string(),
                });
            };
            exceptions.insert(inflected.to_lowercase(), lemma.to_lowercase());
        }
        if exceptions.is_empty() {
            return Err(LemmaError::Empty {
                origin: origin.to_string(),
            });
        }
        Ok(Self { exceptions })
    }

    /// Number of irregular forms known to this lemmatizer.
    pub fn exception_count(&self) -> usize {
        self.exceptions.len()
    }

    /// Reduce a lowercase word to its noun lemma. Unknown shapes come back unchanged.
    ///
    /// Reductions repeat until the word stops changing, so a lemma is always its own lemma
    /// (`womens` goes through `women` to `woman`).
    pub fn lemmatize(&self, word: &str) -> String {
        let mut current = word.to_string();
        for _ in 0..MAX_REDUCTIONS {
            match self.reduce(&current) {
                Some(next) if next != current => current = next,
                _ => break,
            }
        }
        current
    }

    /// One step: an exception lookup, else the first matching detachment rule.
    fn reduce(&self, word: &str) -> Option<String> {
        if let Some(lemma) = self.exceptions.get(word) {
            return Some(lemma.clone());
        }
        if word.len() < MIN_RULE_LEN
            || !word.bytes().all(|b| b.is_ascii_alphabetic())
            || SINGULAR_ENDINGS.iter().any(|ending| word.ends_with(ending))
        {
            return None;
        }
        let (suffix, replacement) = NOUN_RULES
            .iter()
            .find(|(suffix, _)| word.ends_with(suffix))?;
        let stem = &word[..word.len() - suffix.len()];
        if stem.len() + replacement.len() < 3 {
            return None;
        }
        Some(format!("{stem}{replacement}"))
    }
}

/// Load the process-wide lemmatizer once.
///
/// `source` overrides the embedded table. Later calls return the instance from the first
/// successful call regardless of their argument.
pub fn init(source: Option<&Path>) -> Result<&'static Lemmatizer, LemmaError> {
    if let Some(existing) = SHARED.get() {
        return Ok(existing);
    }
    let loaded = match source {
        Some(path) => Lemmatizer::from_path(path)?,
        None => Lemmatizer::embedded()?,
    };
    tracing::debug!("Loaded {} lemma exceptions", loaded.exception_count());
    Ok(SHARED.get_or_init(|| loaded))
}
