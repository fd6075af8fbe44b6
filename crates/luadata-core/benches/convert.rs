use criterion::{criterion_group, criterion_main, Criterion};
use luadata_core::{convert, parse_str, tokenize, ConvertOptions, ParseOptions};
use std::hint::black_box;

/// A prototype file with `count` item definitions.
fn prototype_file(count: usize) -> String {
    let mut src = String::from("-- generated items\ndata:extend({\n");
    for i in 0..count {
        src.push_str(&format!(
            "  {{ type = \"item\", name = \"item-{i}\", icon_size = 64, stack_size = {}, \
             weight = {}.5, flags = {{ \"hidden\" }}, --[[ note ]] tint = {{ r = 0.1, g = -0.2 }} }},\n",
            i % 200,
            i
        ));
    }
    src.push_str("})\n");
    src
}

fn bench_convert(c: &mut Criterion) {
    let small = prototype_file(10);
    let large = prototype_file(2_000);
    let options = ConvertOptions::default();

    c.bench_function("tokenize_2000_items", |b| {
        b.iter(|| tokenize(black_box(&large)).unwrap())
    });
    c.bench_function("parse_2000_items", |b| {
        b.iter(|| parse_str(black_box(&large), &ParseOptions::default()).unwrap())
    });
    c.bench_function("convert_10_items", |b| {
        b.iter(|| convert(black_box(&small), &options).unwrap())
    });
    c.bench_function("convert_2000_items", |b| {
        b.iter(|| convert(black_box(&large), &options).unwrap())
    });
}

criterion_group!(benches, bench_convert);
criterion_main!(benches);
