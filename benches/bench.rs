//! Benchmarks for the `vault-adapter` crate.
//!
//! Run with:
//! - `cargo bench`

#![allow(missing_docs)]

use std::fmt::Write as _;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use vault_adapter::{CommandResult, VaultPath, parse_response};

fn abort_with_error(message: &str) -> ! {
    eprintln!("{message}");
    std::process::abort();
}

fn folder_listing(entries: usize) -> String {
    let mut out = String::from("<vault><folder name=\"$/trunk\">");
    for i in 0..entries {
        let _ = write!(out, "<folder name=\"$/trunk/dir{i:05}\"/>");
        let _ = write!(out, "<file name=\"file{i:05}.txt\" version=\"{i}\"/>");
    }
    out.push_str("</folder><result><success>true</success></result></vault>");
    out
}

fn bench_parse_response(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_response");
    for entries in [10usize, 1_000] {
        let result = CommandResult::success(folder_listing(entries));
        group.throughput(Throughput::Bytes(result.stdout.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(entries), &result, |b, result| {
            b.iter(|| {
                let response = match parse_response(black_box(result)) {
                    Ok(response) => response,
                    Err(_) => abort_with_error("parse_response failed for benchmark input"),
                };
                black_box(response.elements("folder/file").len());
            });
        });
    }
    group.finish();
}

fn bench_path_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_parse");
    for input in [
        "$",
        "Main$/trunk/src/lib",
        "/Main/$//branches/release-1.0/docs/",
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(input), input, |b, input| {
            b.iter(|| {
                let path = VaultPath::new(black_box(input));
                black_box(path.to_string());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse_response, bench_path_parse);
criterion_main!(benches);
