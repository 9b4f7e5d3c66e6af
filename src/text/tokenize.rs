//! Message normalization and word tokenization.

use std::str::SplitWhitespace;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::lemma::Lemmatizer;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("non-alphanumeric pattern is valid"));

/// Splits raw message text into lemmatized lowercase word tokens.
///
/// The tokenizer carries its lemmatizer so a persisted model tokenizes new text exactly
/// the way it tokenized its training data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokenizer {
    lemmatizer: Lemmatizer,
}

impl Tokenizer {
    pub fn new(lemmatizer: Lemmatizer) -> Self {
        Self { lemmatizer }
    }

    /// Normalize `text` and return its token sequence.
    ///
    /// Normalization lowercases and replaces every character outside `[a-z0-9]` with a
    /// space. Tokens are produced lazily and the sequence can be iterated any number of
    /// times.
    pub fn tokenize(&self, text: &str) -> Tokens<'_> {
        let lowered = text.to_lowercase();
        let normalized = NON_ALPHANUMERIC.replace_all(&lowered, " ").into_owned();
        Tokens {
            normalized,
            lemmatizer: &self.lemmatizer,
        }
    }
}

/// Normalized text of one message; iterate it to get tokens.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    normalized: String,
    lemmatizer: &'a Lemmatizer,
}

impl<'a> Tokens<'a> {
    /// Text after lowercasing and punctuation replacement, before splitting.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn iter(&self) -> TokenIter<'_> {
        TokenIter {
            words: self.normalized.split_whitespace(),
            lemmatizer: self.lemmatizer,
        }
    }
}

impl<'t> IntoIterator for &'t Tokens<'_> {
    type Item = String;
    type IntoIter = TokenIter<'t>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the lemmatized tokens of a [`Tokens`] sequence.
#[derive(Debug, Clone)]
pub struct TokenIter<'t> {
    words: SplitWhitespace<'t>,
    lemmatizer: &'t Lemmatizer,
}

impl Iterator for TokenIter<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let word = self.words.next()?;
        Some(self.lemmatizer.lemmatize(word).trim().to_lowercase())
    }
}
