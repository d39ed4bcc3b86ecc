use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use swtab_core::io::{write_table, TableOptions};
use swtab_core::pipeline::build;
use swtab_core::rle::encode;
use swtab_core::{GroupMode, PipelineOptions, RunLengthTables, RunPadding, SsearchReader};

fn generate_test_sequence(length: usize) -> String {
    let pattern = "AAACGTTGGGCA";
    pattern.chars().cycle().take(length).collect()
}

/// ssearch36 -m 10 text with `queries` queries of `hits` alignments of `seq`.
fn generate_alignments(queries: usize, hits: usize, seq: &str) -> String {
    let length = seq.chars().count();
    let mut text = String::from("ssearch36 -m 10 q.fa lib.fa\n");
    for q in 0..queries {
        text.push_str(&format!(">>>q{}, {} nt vs lib.fa library\n; pg_name: ssearch36\n", q, length));
        for h in 0..hits {
            text.push_str(&format!(
                ">>t{h}\n; sw_z-score: {z}\n>q{q} ..\n; al_start: 1\n; al_stop: {n}\n{s}\n>t{h} ..\n; al_start: 1\n; al_stop: {n}\n{s}\n",
                h = h,
                q = q,
                z = 50 - h,
                n = length,
                s = seq
            ));
        }
        text.push_str(">>><<<\n");
    }
    text
}

fn bench_parse(c: &mut Criterion) {
    let text = generate_alignments(100, 10, &generate_test_sequence(500));

    c.bench_function("parse_1000_alignments", |b| {
        b.iter(|| {
            let count = SsearchReader::new(black_box(text.as_bytes())).count();
            black_box(count)
        })
    });
}

fn bench_tabulate(c: &mut Criterion) {
    let text = generate_alignments(100, 10, &generate_test_sequence(500));
    let mut group = c.benchmark_group("tabulate");

    for (name, group_mode, with_diff) in [
        ("all", GroupMode::All, false),
        ("top", GroupMode::Top, false),
        ("all_diff", GroupMode::All, true),
    ] {
        let options = PipelineOptions {
            group_mode,
            with_diff,
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(name), &options, |b, options| {
            b.iter(|| {
                let mut out = Vec::new();
                let rows = write_table(
                    &mut out,
                    build(SsearchReader::new(black_box(text.as_bytes())), options),
                    &TableOptions::default(),
                )
                .unwrap();
                black_box(rows)
            })
        });
    }

    group.finish();
}

fn bench_rle(c: &mut Criterion) {
    let mut group = c.benchmark_group("rle");

    for length in [1_000usize, 10_000, 100_000] {
        let seq = generate_test_sequence(length);
        let (compressed, table) = encode(&seq).unwrap();

        group.bench_with_input(BenchmarkId::new("encode", length), &seq, |b, seq| {
            b.iter(|| black_box(encode(black_box(seq)).unwrap()))
        });

        group.bench_with_input(BenchmarkId::new("decode_alignment", length), &compressed, |b, compressed| {
            b.iter(|| {
                black_box(
                    swtab_core::decode_alignment(compressed, table.runs(), compressed, table.runs(), RunPadding::Synchronize)
                        .unwrap(),
                )
            })
        });
    }

    group.finish();
}

fn bench_decode_pipeline(c: &mut Criterion) {
    let (compressed, table) = encode(&generate_test_sequence(500)).unwrap();
    let text = generate_alignments(10, 10, &compressed);

    let mut tables = RunLengthTables::new();
    for i in 0..10 {
        tables.insert(format!("q{}", i), table.clone());
        tables.insert(format!("t{}", i), table.clone());
    }
    let options = PipelineOptions {
        rle: Some(tables),
        padding: RunPadding::Synchronize,
        ..Default::default()
    };

    c.bench_function("decode_100_alignments", |b| {
        b.iter(|| {
            let count = build(SsearchReader::new(black_box(text.as_bytes())), &options)
                .map(|r| r.unwrap())
                .count();
            black_box(count)
        })
    });
}

criterion_group!(benches, bench_parse, bench_tabulate, bench_rle, bench_decode_pipeline);
criterion_main!(benches);
