//! Character ↔ telegraph-code conversion passes.
//!
//! A `TranslationPass` owns the scanner matching the requested direction and
//! an accumulating result string, and advances one token per `step` call.
//! `translate` runs a whole pass synchronously; the background worker drives
//! the same pass step by step so it can abandon superseded work mid-text.


use crate::dict::{CharacterSet, CodeDictionary, DictError};
use crate::tokenizer::{CodepointTokenizer, NumberTokenizer, ScanError, Token, Tokenizer};

/// Which way a conversion pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslateMode {
    /// Chinese characters to telegraph code.
    HanToTele,
    /// Telegraph code to Chinese characters.
    TeleToHan,
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error(transparent)]
    Dict(#[from] DictError),

    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// A single in-progress conversion over one input text.
///
/// The pass is forward-only: once superseded it is dropped, never rewound or
/// reused for different input.
pub struct TranslationPass {
    mode: TranslateMode,
    charset: CharacterSet,
    tokenizer: Box<dyn Tokenizer + Send>,
    out: String,
}

impl TranslationPass {
    pub fn new(mode: TranslateMode, charset: CharacterSet, text: impl Into<String>) -> Self {
        let text = text.into();
        let tokenizer: Box<dyn Tokenizer + Send> = match mode {
            TranslateMode::HanToTele => Box::new(CodepointTokenizer::new(text)),
            TranslateMode::TeleToHan => Box::new(NumberTokenizer::new(text)),
        };
        Self {
            mode,
            charset,
            tokenizer,
            out: String::new(),
        }
    }

    /// The text this pass was built over.
    pub fn input(&self) -> &str {
        self.tokenizer.input()
    }

    /// True once every token has been consumed.
    pub fn is_done(&self) -> bool {
        !self.tokenizer.has_more()
    }

    /// Apply one conversion step. A no-op if the pass is already done.
    pub fn step(&mut self, dict: &CodeDictionary) -> Result<(), TranslateError> {
        if !self.tokenizer.has_more() {
            return Ok(());
        }

        match (self.mode, self.tokenizer.next_token()?) {
            (TranslateMode::HanToTele, Token::Codepoint(c)) => {
                match dict.tele_for(self.charset, c)? {
                    // Codes render as four zero-padded decimal digits plus
                    // one separating space.
                    Some(tele) => self.out.push_str(&format!("{tele:04} ")),
                    // Unmapped characters pass through with no separator.
                    None => self.out.push(c),
                }
            }
            (TranslateMode::TeleToHan, Token::Fragment(fragment)) => {
                let mapped = match fragment.parse::<u32>() {
                    Ok(tele) => dict.han_for(self.charset, tele)?,
                    // Non-numeric fragments are not an error; they pass
                    // through unchanged.
                    Err(_) => None,
                };
                match mapped {
                    Some(han) => self.out.push(han),
                    None => self.out.push_str(&fragment),
                }
            }
            // The scanner is chosen by mode in `new`, so the remaining
            // pairings cannot occur; treat them as pass-through anyway.
            (_, Token::Codepoint(c)) => self.out.push(c),
            (_, Token::Fragment(fragment)) => self.out.push_str(&fragment),
        }

        Ok(())
    }

    /// Consume the pass and return the accumulated result.
    pub fn finish(self) -> String {
        self.out
    }
}

/// Run a whole conversion pass over `text`. The relevant table must have
/// been loaded; `DictError::NotLoaded` is returned otherwise.
pub fn translate(
    dict: &CodeDictionary,
    mode: TranslateMode,
    charset: CharacterSet,
    text: &str,
) -> Result<String, TranslateError> {
    let mut pass = TranslationPass::new(mode, charset, text);
    while !pass.is_done() {
        pass.step(dict)?;
    }
    Ok(pass.finish())
}
