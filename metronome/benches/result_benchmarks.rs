use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use metronome::math::Consistency;
use metronome::{Classification, FinalResult, LiveSample, TestConfig};

fn make_history(len: usize) -> Vec<LiveSample> {
    (0..len)
        .map(|i| LiveSample {
            elapsed: (i + 1) as f64,
            wpm: 40 + (i % 7) as u32,
            raw_wpm: 45 + (i % 5) as u32,
            errors: i % 3,
        })
        .collect()
}

fn benchmark_consistency(c: &mut Criterion) {
    let mut group = c.benchmark_group("consistency");

    for len in [15, 60, 600] {
        let values: Vec<f64> = make_history(len).iter().map(|s| f64::from(s.wpm)).collect();

        group.bench_with_input(BenchmarkId::new("calculate", len), &values, |b, values| {
            b.iter(|| Consistency::calculate(black_box(values)))
        });
    }

    group.finish();
}

fn benchmark_final_result(c: &mut Criterion) {
    let mut group = c.benchmark_group("final_result");

    let config = TestConfig::default();
    let source: Vec<char> = "lorem ipsum dolor sit amet ".chars().cycle().take(1500).collect();
    let classification = Classification::compute(&source, &source[..1200]);

    for len in [15, 60, 600] {
        let history = make_history(len);

        group.bench_with_input(BenchmarkId::new("calculate", len), &history, |b, history| {
            b.iter(|| {
                FinalResult::calculate(
                    black_box(&classification),
                    black_box(&config),
                    black_box(history),
                    black_box(30),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_consistency, benchmark_final_result);
criterion_main!(benches);
