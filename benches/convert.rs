use std::fmt::Write;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use dianma_engine::dict::{CharacterSet, CodeDictionary, MemorySource};
use dianma_engine::{translate, TranslateMode};

/// A dictionary over the first 512 CJK unified ideographs, codes assigned
/// sequentially.
fn bench_dict() -> CodeDictionary {
    let mut data = String::new();
    for i in 0..512u32 {
        writeln!(data, "U+{:04X} {}", 0x4E00 + i, 1000 + i).unwrap();
    }
    let dict = CodeDictionary::new(MemorySource::new(data, ""));
    dict.load(CharacterSet::Simplified).unwrap();
    dict
}

/// Mixed Chinese/ASCII input of roughly `chars` characters.
fn han_input(chars: usize) -> String {
    let mut text = String::new();
    for i in 0..chars {
        if i % 7 == 6 {
            text.push(' ');
        } else {
            let c = char::from_u32(0x4E00 + (i as u32 % 512)).unwrap();
            text.push(c);
        }
    }
    text
}

fn bench_han_to_tele(c: &mut Criterion) {
    let dict = bench_dict();
    let mut group = c.benchmark_group("convert/han_to_tele");
    for &chars in &[64usize, 512, 4096] {
        let input = han_input(chars);
        group.bench_with_input(BenchmarkId::from_parameter(chars), &input, |b, input| {
            b.iter(|| {
                translate(
                    &dict,
                    TranslateMode::HanToTele,
                    CharacterSet::Simplified,
                    input,
                )
                .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_tele_to_han(c: &mut Criterion) {
    let dict = bench_dict();
    let mut group = c.benchmark_group("convert/tele_to_han");
    for &chars in &[64usize, 512, 4096] {
        // Round-trip the generated text so the input is realistic code groups.
        let input = translate(
            &dict,
            TranslateMode::HanToTele,
            CharacterSet::Simplified,
            &han_input(chars),
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(chars), &input, |b, input| {
            b.iter(|| {
                translate(
                    &dict,
                    TranslateMode::TeleToHan,
                    CharacterSet::Simplified,
                    input,
                )
                .unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_han_to_tele, bench_tele_to_han);
criterion_main!(benches);
