//! Path handling benchmarks.
//!
//! Measures the per-member cost of the two path transformations:
//! - Sanitizing a stored name into a flat recovery name
//! - Normalizing a stored name for direct extraction

#![allow(clippy::unwrap_used, missing_docs)]

use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use std::hint::black_box;
use zipsalvage_core::PathPolicy;
use zipsalvage_core::sanitize;
use zipsalvage_core::types::SafePath;

const NAMES: &[(&str, &str)] = &[
    ("simple", "Takeout/Drive/notes.txt"),
    ("traversal", "../../a../../b..r"),
    ("absolute", "/etc/../passwd"),
    ("windows", "C:\\Users\\me\\Pictures\\2019\\IMG_0001.jpg"),
    (
        "deep",
        "Takeout/Google Photos/Photos from 2019/Album/Sub/Sub/Sub/IMG_0001.jpg",
    ),
];

fn benchmark_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize");

    for (label, name) in NAMES {
        group.bench_function(*label, |b| b.iter(|| sanitize(black_box(name))));
    }

    let long = format!("{}.jpg", "x".repeat(1000));
    group.bench_function("long_truncated", |b| b.iter(|| sanitize(black_box(&long))));

    group.finish();
}

fn benchmark_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let strict = PathPolicy::default();
    let lenient = PathPolicy {
        allow_absolute_paths: true,
        ..Default::default()
    };

    for (label, name) in NAMES {
        group.bench_function(format!("{label}_strict"), |b| {
            b.iter(|| SafePath::from_stored_name(black_box(name), black_box(&strict)));
        });
        group.bench_function(format!("{label}_lenient"), |b| {
            b.iter(|| SafePath::from_stored_name(black_box(name), black_box(&lenient)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_sanitize, benchmark_normalize);
criterion_main!(benches);
