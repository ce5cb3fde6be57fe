//! Bidirectional character ↔ telegraph-code tables.
//!
//! `CodeDictionary` holds one `CodeTable` per character-set variant, loaded
//! lazily from a `CodeSource`. Each table resource is UTF-8 text with one
//! mapping per line, `U+XXXX YYYY` (hexadecimal codepoint, decimal code);
//! blank or malformed lines are skipped.

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::debug;

/// Simplified vs. traditional Chinese character forms. Each variant has its
/// own independent code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterSet {
    Simplified,
    Traditional,
}

impl CharacterSet {
    pub fn as_str(self) -> &'static str {
        match self {
            CharacterSet::Simplified => "simplified",
            CharacterSet::Traditional => "traditional",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("{} table has not been loaded", .0.as_str())]
    NotLoaded(CharacterSet),
}

// ---------------------------------------------------------------------------
// CodeTable
// ---------------------------------------------------------------------------

/// One bidirectional map between Chinese characters and telegraph codes.
///
/// Both directions are maintained by a single `insert`, so they cannot drift
/// apart. Inserting a pair that collides with an existing entry on either
/// key is last-write-wins; the number of displaced pairings is counted and
/// surfaced through [`CodeTable::overwrite_count`] rather than reported as
/// an error, since the published code tables contain a handful of shared
/// codes.
#[derive(Debug, Default)]
pub struct CodeTable {
    han_to_tele: HashMap<char, u32>,
    tele_to_han: HashMap<u32, char>,
    overwrites: usize,
}

impl CodeTable {
    fn insert(&mut self, han: char, tele: u32) {
        if self.han_to_tele.insert(han, tele).is_some() {
            self.overwrites += 1;
        }
        if self.tele_to_han.insert(tele, han).is_some() {
            self.overwrites += 1;
        }
    }

    /// Telegraph code for a character, or `None` if unmapped.
    pub fn tele_for(&self, han: char) -> Option<u32> {
        self.han_to_tele.get(&han).copied()
    }

    /// Character for a telegraph code, or `None` if unmapped.
    pub fn han_for(&self, tele: u32) -> Option<char> {
        self.tele_to_han.get(&tele).copied()
    }

    pub fn len(&self) -> usize {
        self.han_to_tele.len()
    }

    pub fn is_empty(&self) -> bool {
        self.han_to_tele.is_empty()
    }

    /// Number of entries displaced by later lines sharing a key.
    pub fn overwrite_count(&self) -> usize {
        self.overwrites
    }
}

/// Parse one `U+XXXX YYYY` line. Returns `None` for blank lines, lines that
/// do not split into exactly two fields, and fields that fail to parse.
fn parse_line(line: &str) -> Option<(char, u32)> {
    let mut fields = line.split_whitespace();
    let codepoint = fields.next()?;
    let code = fields.next()?;
    if fields.next().is_some() {
        return None;
    }

    let hex = codepoint.strip_prefix("U+")?;
    let scalar = u32::from_str_radix(hex, 16).ok()?;
    let han = char::from_u32(scalar)?;
    let tele = code.parse::<u32>().ok()?;
    Some((han, tele))
}

fn read_table(reader: impl Read) -> io::Result<CodeTable> {
    let mut table = CodeTable::default();
    for line in BufReader::new(reader).lines() {
        if let Some((han, tele)) = parse_line(&line?) {
            table.insert(han, tele);
        }
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Code sources
// ---------------------------------------------------------------------------

/// Where table data comes from. The engine never assumes a filesystem; the
/// tables may equally be embedded in the binary or fabricated in tests.
pub trait CodeSource: Send + Sync {
    fn open(&self, charset: CharacterSet) -> io::Result<Box<dyn Read + Send>>;
}

/// Reads `simplified_codes.txt` / `traditional_codes.txt` from a directory.
pub struct DirSource {
    dir: PathBuf,
    simplified_file: String,
    traditional_file: String,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_files(dir, "simplified_codes.txt", "traditional_codes.txt")
    }

    pub fn with_files(
        dir: impl Into<PathBuf>,
        simplified_file: impl Into<String>,
        traditional_file: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            simplified_file: simplified_file.into(),
            traditional_file: traditional_file.into(),
        }
    }
}

impl CodeSource for DirSource {
    fn open(&self, charset: CharacterSet) -> io::Result<Box<dyn Read + Send>> {
        let file = match charset {
            CharacterSet::Simplified => &self.simplified_file,
            CharacterSet::Traditional => &self.traditional_file,
        };
        Ok(Box::new(File::open(self.dir.join(file))?))
    }
}

/// In-memory table data, for embedded tables and tests.
pub struct MemorySource {
    simplified: String,
    traditional: String,
}

impl MemorySource {
    pub fn new(simplified: impl Into<String>, traditional: impl Into<String>) -> Self {
        Self {
            simplified: simplified.into(),
            traditional: traditional.into(),
        }
    }
}

impl CodeSource for MemorySource {
    fn open(&self, charset: CharacterSet) -> io::Result<Box<dyn Read + Send>> {
        let data = match charset {
            CharacterSet::Simplified => &self.simplified,
            CharacterSet::Traditional => &self.traditional,
        };
        Ok(Box::new(Cursor::new(data.clone().into_bytes())))
    }
}

// ---------------------------------------------------------------------------
// CodeDictionary
// ---------------------------------------------------------------------------

/// Per-variant stats for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct TableStats {
    pub entries: usize,
    pub overwrites: usize,
}

/// Lazily loaded pair of code tables.
///
/// Each variant loads at most once and is immutable afterward; a failed load
/// leaves the variant unset and is retried on the next `load` call. Loaded
/// tables are shared across threads without further synchronization.
pub struct CodeDictionary {
    source: Box<dyn CodeSource>,
    simplified: OnceLock<CodeTable>,
    traditional: OnceLock<CodeTable>,
}

impl CodeDictionary {
    pub fn new(source: impl CodeSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            simplified: OnceLock::new(),
            traditional: OnceLock::new(),
        }
    }

    fn slot(&self, charset: CharacterSet) -> &OnceLock<CodeTable> {
        match charset {
            CharacterSet::Simplified => &self.simplified,
            CharacterSet::Traditional => &self.traditional,
        }
    }

    /// Load one variant's table. A variant already loaded is left untouched;
    /// failure for one variant does not affect the other.
    pub fn load(&self, charset: CharacterSet) -> Result<(), DictError> {
        if self.slot(charset).get().is_some() {
            return Ok(());
        }

        let reader = self.source.open(charset)?;
        let table = read_table(reader)?;
        debug!(
            charset = charset.as_str(),
            entries = table.len(),
            overwrites = table.overwrite_count(),
            "loaded code table"
        );
        // A concurrent load may have won the race; either table came from the
        // same source, so the loser is simply dropped.
        let _ = self.slot(charset).set(table);
        Ok(())
    }

    /// Attempt to load both variants. Both are always attempted; the first
    /// error (if any) is returned after the second attempt completes.
    pub fn load_all(&self) -> Result<(), DictError> {
        let simplified = self.load(CharacterSet::Simplified);
        let traditional = self.load(CharacterSet::Traditional);
        simplified.and(traditional)
    }

    /// True only once both variants have loaded successfully.
    pub fn is_loaded(&self) -> bool {
        self.simplified.get().is_some() && self.traditional.get().is_some()
    }

    fn table(&self, charset: CharacterSet) -> Result<&CodeTable, DictError> {
        self.slot(charset)
            .get()
            .ok_or(DictError::NotLoaded(charset))
    }

    /// Telegraph code for a character. `Err` if the variant has not been
    /// loaded (a caller precondition, never retried here); `Ok(None)` if the
    /// character has no mapping.
    pub fn tele_for(&self, charset: CharacterSet, han: char) -> Result<Option<u32>, DictError> {
        Ok(self.table(charset)?.tele_for(han))
    }

    /// Character for a telegraph code. Errors as [`CodeDictionary::tele_for`].
    pub fn han_for(&self, charset: CharacterSet, tele: u32) -> Result<Option<char>, DictError> {
        Ok(self.table(charset)?.han_for(tele))
    }

    /// Stats for a loaded variant, or `None` if it has not loaded.
    pub fn stats(&self, charset: CharacterSet) -> Option<TableStats> {
        self.slot(charset).get().map(|t| TableStats {
            entries: t.len(),
            overwrites: t.overwrite_count(),
        })
    }
}
