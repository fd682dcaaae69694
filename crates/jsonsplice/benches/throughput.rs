//! Benchmark – splicing and threat validation over documents of growing size
#![allow(missing_docs)]

use std::{fmt::Write, time::Duration};

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use jsonsplice::{
    SetOptions,
    jtp::{ThreatLimits, ThreatValidator, Verifier},
};

/// `{"items":[{"id":0,"name":"item-0","tags":["a","b"]}, ...],"total":n}`
fn make_document(items: usize) -> Vec<u8> {
    let mut s = String::from(r#"{"items":["#);
    for i in 0..items {
        if i > 0 {
            s.push(',');
        }
        write!(s, r#"{{"id":{i},"name":"item-{i}","tags":["a","b"]}}"#).unwrap();
    }
    write!(s, r#"],"total":{items}}}"#).unwrap();
    s.into_bytes()
}

fn bench_validate(c: &mut Criterion) {
    let validator = ThreatValidator::new(
        ThreatLimits::default()
            .with_max_depth(16)
            .with_max_array_len(100_000)
            .with_max_key_len(64)
            .with_max_string_len(1_024)
            .with_max_entry_count(64),
    );

    let mut group = c.benchmark_group("jtp_validate");
    for &items in &[10usize, 1_000, 10_000] {
        let doc = make_document(items);
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(items), &doc, |b, doc| {
            b.iter(|| validator.verify_bytes(black_box(doc)).unwrap());
        });
    }
    group.finish();
}

fn bench_splice(c: &mut Criterion) {
    let optimistic = SetOptions {
        optimistic: true,
        ..SetOptions::default()
    };

    let mut group = c.benchmark_group("splice");
    for &items in &[10usize, 1_000, 10_000] {
        let doc = make_document(items);
        let last = format!("items.{}.name", items - 1);
        group.throughput(Throughput::Bytes(doc.len() as u64));

        group.bench_with_input(BenchmarkId::new("set_last", items), &doc, |b, doc| {
            b.iter(|| jsonsplice::set(black_box(doc), &last, "renamed").unwrap());
        });
        group.bench_with_input(
            BenchmarkId::new("set_last_optimistic", items),
            &doc,
            |b, doc| {
                b.iter(|| {
                    jsonsplice::set_with(black_box(doc), &last, "renamed", optimistic).unwrap()
                });
            },
        );
        group.bench_with_input(BenchmarkId::new("set_in_place", items), &doc, |b, doc| {
            let opts = SetOptions {
                replace_in_place: true,
                ..optimistic
            };
            let mut buf = doc.clone();
            b.iter(|| jsonsplice::set_in_place(&mut buf, "total", black_box(7), opts).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("append", items), &doc, |b, doc| {
            b.iter(|| jsonsplice::set(black_box(doc), "items.-1", 1).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("delete_first", items), &doc, |b, doc| {
            b.iter(|| jsonsplice::delete(black_box(doc), "items.0").unwrap());
        });
        group.bench_with_input(BenchmarkId::new("set_fan_out", items), &doc, |b, doc| {
            b.iter(|| jsonsplice::set(black_box(doc), "items.#.id", 0).unwrap());
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(5));
    targets = bench_validate, bench_splice
}
criterion_main!(benches);
