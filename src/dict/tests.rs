use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};

use super::*;

const SIMPLIFIED: &str = "\
U+4F60 2978
U+597D 6350
U+5417 2044
U+FF1F 3315
U+6211 2186
U+662F 6212
U+56FD 948
U+3002 6364
";

const TRADITIONAL: &str = "\
U+6211 6583
U+5F88 7239
U+597D 7311
U+FF01 2899
U+4F60 2643
U+662F 6372
U+570B 948
U+3002 9043
";

fn make_dict() -> CodeDictionary {
    CodeDictionary::new(MemorySource::new(SIMPLIFIED, TRADITIONAL))
}

#[test]
fn is_loaded_only_after_both_variants() {
    let dict = make_dict();
    assert!(!dict.is_loaded());

    dict.load(CharacterSet::Simplified).unwrap();
    assert!(!dict.is_loaded());

    dict.load(CharacterSet::Traditional).unwrap();
    assert!(dict.is_loaded());
}

#[test]
fn lookup_before_load_is_an_error() {
    let dict = make_dict();
    assert!(matches!(
        dict.tele_for(CharacterSet::Simplified, '你'),
        Err(DictError::NotLoaded(CharacterSet::Simplified))
    ));
    assert!(matches!(
        dict.han_for(CharacterSet::Traditional, 2643),
        Err(DictError::NotLoaded(CharacterSet::Traditional))
    ));

    // Loading one variant does not unlock the other.
    dict.load(CharacterSet::Simplified).unwrap();
    assert!(dict.tele_for(CharacterSet::Simplified, '你').is_ok());
    assert!(dict.han_for(CharacterSet::Traditional, 2643).is_err());
}

#[test]
fn lookup_both_directions() {
    let dict = make_dict();
    dict.load_all().unwrap();

    assert_eq!(dict.tele_for(CharacterSet::Simplified, '你').unwrap(), Some(2978));
    assert_eq!(dict.tele_for(CharacterSet::Simplified, '国').unwrap(), Some(948));
    assert_eq!(dict.han_for(CharacterSet::Simplified, 6350).unwrap(), Some('好'));
    assert_eq!(dict.han_for(CharacterSet::Simplified, 3315).unwrap(), Some('？'));

    assert_eq!(dict.tele_for(CharacterSet::Traditional, '國').unwrap(), Some(948));
    assert_eq!(dict.han_for(CharacterSet::Traditional, 6583).unwrap(), Some('我'));

    // No mapping is Ok(None), not an error.
    assert_eq!(dict.tele_for(CharacterSet::Simplified, 'A').unwrap(), None);
    assert_eq!(dict.han_for(CharacterSet::Simplified, 1).unwrap(), None);
    // The variants are independent: 很 appears only in the traditional table.
    assert_eq!(dict.tele_for(CharacterSet::Simplified, '很').unwrap(), None);
    assert_eq!(dict.tele_for(CharacterSet::Traditional, '很').unwrap(), Some(7239));
}

#[test]
fn loaded_pairs_round_trip() {
    let dict = make_dict();
    dict.load_all().unwrap();

    for han in ['你', '好', '我', '是', '。'] {
        let tele = dict.tele_for(CharacterSet::Simplified, han).unwrap().unwrap();
        assert_eq!(dict.han_for(CharacterSet::Simplified, tele).unwrap(), Some(han));
    }
}

#[test]
fn malformed_lines_are_skipped() {
    let data = "\
U+4F60 2978

not a mapping line at all
U+597D
U+5417 2044 extra
U+ZZZZ 1234
4F60 5555
U+6211 12a4
U+D800 7777
U+662F 6212
";
    let dict = CodeDictionary::new(MemorySource::new(data, ""));
    dict.load(CharacterSet::Simplified).unwrap();

    let stats = dict.stats(CharacterSet::Simplified).unwrap();
    assert_eq!(stats.entries, 2); // only 你 and 是 survive
    assert_eq!(dict.tele_for(CharacterSet::Simplified, '你').unwrap(), Some(2978));
    assert_eq!(dict.tele_for(CharacterSet::Simplified, '是').unwrap(), Some(6212));
}

#[test]
fn duplicate_keys_are_last_write_wins() {
    // 你 is given two codes, and code 7000 is given two characters.
    let data = "\
U+4F60 2978
U+4F60 1111
U+597D 7000
U+662F 7000
";
    let dict = CodeDictionary::new(MemorySource::new(data, ""));
    dict.load(CharacterSet::Simplified).unwrap();

    // Forward: later line wins.
    assert_eq!(dict.tele_for(CharacterSet::Simplified, '你').unwrap(), Some(1111));
    assert_eq!(dict.han_for(CharacterSet::Simplified, 7000).unwrap(), Some('是'));

    // The displaced pairings break the round-trip: 2978 still points at 你,
    // but 你 no longer points back. This is the documented non-bijective edge.
    assert_eq!(dict.han_for(CharacterSet::Simplified, 2978).unwrap(), Some('你'));
    assert_eq!(dict.tele_for(CharacterSet::Simplified, '好').unwrap(), Some(7000));

    let stats = dict.stats(CharacterSet::Simplified).unwrap();
    assert_eq!(stats.overwrites, 2);
}

#[test]
fn stats_unavailable_until_loaded() {
    let dict = make_dict();
    assert!(dict.stats(CharacterSet::Simplified).is_none());
    dict.load(CharacterSet::Simplified).unwrap();
    let stats = dict.stats(CharacterSet::Simplified).unwrap();
    assert_eq!(stats.entries, 8);
    assert_eq!(stats.overwrites, 0);
}

/// Fails every open until `healed` is set, then serves the given data.
struct FlakySource {
    healed: AtomicBool,
    data: &'static str,
}

impl CodeSource for FlakySource {
    fn open(&self, _charset: CharacterSet) -> io::Result<Box<dyn Read + Send>> {
        if self.healed.load(Ordering::SeqCst) {
            Ok(Box::new(io::Cursor::new(self.data.as_bytes().to_vec())))
        } else {
            Err(io::Error::new(io::ErrorKind::NotFound, "resource missing"))
        }
    }
}

#[test]
fn failed_load_is_retried_on_next_attempt() {
    struct Shared(std::sync::Arc<FlakySource>);
    impl CodeSource for Shared {
        fn open(&self, charset: CharacterSet) -> io::Result<Box<dyn Read + Send>> {
            self.0.open(charset)
        }
    }

    let source = std::sync::Arc::new(FlakySource {
        healed: AtomicBool::new(false),
        data: "U+4F60 2978\n",
    });
    let dict = CodeDictionary::new(Shared(std::sync::Arc::clone(&source)));

    assert!(dict.load(CharacterSet::Simplified).is_err());
    assert!(!dict.is_loaded());
    assert!(dict.tele_for(CharacterSet::Simplified, '你').is_err());
    assert!(dict.stats(CharacterSet::Simplified).is_none());

    source.healed.store(true, Ordering::SeqCst);
    dict.load(CharacterSet::Simplified).unwrap();
    assert_eq!(dict.tele_for(CharacterSet::Simplified, '你').unwrap(), Some(2978));
}

#[test]
fn load_all_attempts_both_despite_first_failure() {
    // Simplified resource missing, traditional readable: load_all reports the
    // failure but the traditional table is usable afterward.
    struct HalfSource;
    impl CodeSource for HalfSource {
        fn open(&self, charset: CharacterSet) -> io::Result<Box<dyn Read + Send>> {
            match charset {
                CharacterSet::Simplified => {
                    Err(io::Error::new(io::ErrorKind::NotFound, "missing"))
                }
                CharacterSet::Traditional => {
                    Ok(Box::new(io::Cursor::new(b"U+6211 6583\n".to_vec())))
                }
            }
        }
    }

    let dict = CodeDictionary::new(HalfSource);
    assert!(dict.load_all().is_err());
    assert!(!dict.is_loaded());
    assert_eq!(dict.tele_for(CharacterSet::Traditional, '我').unwrap(), Some(6583));
}

#[test]
fn dir_source_reads_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("simplified_codes.txt"), SIMPLIFIED).unwrap();
    std::fs::write(dir.path().join("traditional_codes.txt"), TRADITIONAL).unwrap();

    let dict = CodeDictionary::new(DirSource::new(dir.path()));
    dict.load_all().unwrap();
    assert!(dict.is_loaded());
    assert_eq!(dict.tele_for(CharacterSet::Simplified, '吗').unwrap(), Some(2044));
}

#[test]
fn dir_source_missing_file_fails_that_variant_only() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("traditional_codes.txt"), TRADITIONAL).unwrap();

    let dict = CodeDictionary::new(DirSource::new(dir.path()));
    assert!(dict.load(CharacterSet::Simplified).is_err());
    dict.load(CharacterSet::Traditional).unwrap();
    assert_eq!(dict.han_for(CharacterSet::Traditional, 7311).unwrap(), Some('好'));
}

#[test]
fn parse_line_cases() {
    assert_eq!(parse_line("U+4F60 2978"), Some(('你', 2978)));
    assert_eq!(parse_line("  U+4E16\t19\n"), Some(('世', 19)));
    assert_eq!(parse_line(""), None);
    assert_eq!(parse_line("U+4F60"), None);
    assert_eq!(parse_line("U+4F60 2978 junk"), None);
    assert_eq!(parse_line("4F60 2978"), None);
    assert_eq!(parse_line("U+XYZ 2978"), None);
    assert_eq!(parse_line("U+4F60 29a8"), None);
    assert_eq!(parse_line("U+4F60 -5"), None);
    // Surrogate codepoints are not Unicode scalar values.
    assert_eq!(parse_line("U+D800 1234"), None);
}
