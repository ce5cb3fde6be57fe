//! Token scanning over raw input text.
//!
//! Two scanners feed the converter: `CodepointTokenizer` yields one Unicode
//! scalar value per call, `NumberTokenizer` collapses maximal ASCII-digit
//! runs into single tokens while visiting every other character one at a
//! time. Both are finite, forward-only sequences; rescanning means
//! constructing a new tokenizer.

mod codepoint;
mod number;

pub use codepoint::CodepointTokenizer;
pub use number::NumberTokenizer;

/// One unit of scanned input, tagged by the scanner that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A single Unicode scalar value, from `CodepointTokenizer`.
    Codepoint(char),
    /// A text fragment (a digit run, a single character, or an empty
    /// placeholder during run accumulation), from `NumberTokenizer`.
    Fragment(String),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScanError {
    /// `next_token` was called with no tokens remaining. Callers are
    /// expected to check `has_more` first, so hitting this is a logic
    /// defect on their side.
    #[error("no tokens remaining")]
    Exhausted,
}

pub trait Tokenizer {
    /// The text being tokenized.
    fn input(&self) -> &str;

    /// True while at least one more token is available.
    fn has_more(&self) -> bool;

    fn next_token(&mut self) -> Result<Token, ScanError>;
}
