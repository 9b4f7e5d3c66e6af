//! Text normalization: tokenization and lemmatization of message text.

pub mod lemma;
pub mod tokenize;

pub use lemma::{LemmaError, Lemmatizer};
pub use tokenize::{TokenIter, Tokenizer, Tokens};
