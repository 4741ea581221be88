use std::hint::black_box;
use std::io::Cursor;

use criterion::{Criterion, criterion_group, criterion_main};

use deepn::codon::{CodonTable, translate};
use deepn::junction::JunctionScanner;
use deepn::sam::search_alignment_file;

const JUNCTION: &str = "CCTCTGCGAGTGGTGGCAACTCTGTGGCCGGCCCAGCCGGCCATGTCAGC";
const READ_COUNT: usize = 10_000;

fn filler(len: usize, seed: usize) -> String {
    b"ACGT"
        .iter()
        .cycle()
        .skip(seed % 4)
        .take(len)
        .map(|&b| b as char)
        .collect()
}

/// Unmapped reads where every tenth carries the junction motif.
fn sam_text() -> String {
    let mut text = String::from("@HD\tVN:1.6\n");
    for i in 0..READ_COUNT {
        let seq = if i % 10 == 0 {
            format!("{}{}{}", filler(20, i), &JUNCTION[30..50], filler(60, i + 1))
        } else {
            filler(100, i)
        };
        text.push_str(&format!("read{i}\t4\t*\t0\t0\t*\t*\t0\t0\t{seq}\t*\n"));
    }
    text
}

fn bench_scan_reads(c: &mut Criterion) {
    let scanner = JunctionScanner::from_junctions(&[JUNCTION], "").unwrap();
    let text = sam_text();

    c.bench_function("search_alignment_file (10k reads)", |b| {
        b.iter(|| {
            let summary =
                search_alignment_file(Cursor::new(text.as_bytes()), &scanner, std::io::sink()).unwrap();
            assert_eq!(summary.eligible, READ_COUNT);
        });
    });
}

fn bench_translate(c: &mut Criterion) {
    let table = CodonTable::standard();
    let seq = filler(3_000, 0).into_bytes();

    c.bench_function("translate (3 kb)", |b| {
        b.iter(|| translate(black_box(&seq), &table));
    });
}

criterion_group!(benches, bench_scan_reads, bench_translate);
criterion_main!(benches);
