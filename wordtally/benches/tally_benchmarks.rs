use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::num::NonZeroUsize;
use wordtally::tally::{count, parse, CountStrategy};
use wordtally::{TallyEngine, TallyOptions};

const SAMPLE_WORDS: &[&str] = &[
    "apple", "banana", "grape", "papaya", "mississippi", "bookkeeper", "committee", "cat",
    "act", "cart", "scatter", "abracadabra",
];

fn create_words(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("{}{}", SAMPLE_WORDS[i % SAMPLE_WORDS.len()], i % 97))
        .collect()
}

fn create_patterns() -> Vec<String> {
    vec![
        "\"ap\"".to_string(),
        "\"ss\"".to_string(),
        "\"cat\"".to_string(),
        "a2".to_string(),
        "s2i2".to_string(),
        "c1a1t1".to_string(),
        "o2k2e2".to_string(),
        "m2t2".to_string(),
    ]
}

fn bench_count_strategies(c: &mut Criterion) {
    let words = create_words(200_000);
    let mut group = c.benchmark_group("Count Strategy");

    for raw in ["\"ss\"", "c1a1t1"] {
        let pattern = parse(raw);
        group.bench_with_input(BenchmarkId::new("sequential", raw), &pattern, |b, p| {
            b.iter(|| black_box(count(&words, p, CountStrategy::Sequential)));
        });
        group.bench_with_input(BenchmarkId::new("parallel", raw), &pattern, |b, p| {
            b.iter(|| black_box(count(&words, p, CountStrategy::Parallel)));
        });
    }
    group.finish();
}

fn bench_word_scaling(c: &mut Criterion) {
    let patterns = create_patterns();
    let engine = TallyEngine::default();
    let mut group = c.benchmark_group("Word Scaling");

    for word_count in [1_000, 10_000, 100_000] {
        let words = create_words(word_count);
        group.bench_with_input(BenchmarkId::from_parameter(word_count), &words, |b, w| {
            b.iter(|| black_box(engine.run(w, &patterns).unwrap()));
        });
    }
    group.finish();
}

fn bench_thread_scaling(c: &mut Criterion) {
    let words = create_words(100_000);
    let patterns = create_patterns();
    let mut group = c.benchmark_group("Thread Scaling");

    for threads in [1, 2, 4, 8] {
        let engine = TallyEngine::new(TallyOptions {
            thread_count: NonZeroUsize::new(threads).unwrap(),
            ..TallyOptions::default()
        });
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, _| {
            b.iter(|| black_box(engine.run(&words, &patterns).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_count_strategies,
    bench_word_scaling,
    bench_thread_scaling
);
criterion_main!(benches);
