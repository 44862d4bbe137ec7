use criterion::{Criterion, black_box, criterion_group, criterion_main};
use vms_morph::Decomposer;

const SAMPLE: &[&str] = &[
    "qokaiin", "chedy", "daiin", "shol", "qokeedy", "otaiin", "ychedaiin", "okal", "sheey",
    "chckhy", "lchedy", "qotchy", "dar", "ol", "y",
];

fn bench_decompose(c: &mut Criterion) {
    let decomposer = Decomposer::canonical().expect("canonical tables");
    c.bench_function("decompose_sample", |b| {
        b.iter(|| {
            for token in SAMPLE {
                black_box(decomposer.decompose(black_box(token)));
            }
        });
    });
    c.bench_function("decompose_articulated_sample", |b| {
        b.iter(|| {
            for token in SAMPLE {
                black_box(decomposer.decompose_articulated(black_box(token)));
            }
        });
    });
}

criterion_group!(benches, bench_decompose);
criterion_main!(benches);
