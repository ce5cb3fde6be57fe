//! Conversion engine for Chinese telegraph code (中文电码).
//!
//! Converts free-form text between Chinese characters and four-digit
//! numeric telegraph codes, in both directions, over either the simplified
//! or the traditional code table. `TranslatorWorker` runs conversions on a
//! background thread and always delivers the result of the most recently
//! published request, discarding superseded work.

pub mod converter;
pub mod dict;
pub mod settings;
pub mod tokenizer;
pub mod trace_init;
pub mod worker;

pub use converter::{translate, TranslateMode, TranslationPass};
pub use dict::{CharacterSet, CodeDictionary, CodeSource, DirSource, MemorySource};
pub use worker::{TranslateRequest, TranslatorWorker};
