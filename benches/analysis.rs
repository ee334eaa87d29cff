use criterion::{black_box, criterion_group, criterion_main, Criterion};
use grasp_analysis::{duration::parse_runtime, summarize, Outcome, ResultRecord, RuntimeSeconds};

fn records(count: u64) -> Vec<ResultRecord> {
    (0..count)
        .map(|i| ResultRecord {
            num_nodes: Some(10 * (1 + i % 5)),
            value: Some(if i % 7 == 0 {
                Outcome::Infeasible
            } else {
                Outcome::Feasible(i as f64)
            }),
            gap_percent: Some((i % 13) as f64 * 0.5),
            iteration_log: None,
            solver: Some("GRASP".to_string()),
            runtime: None,
            runtime_seconds: RuntimeSeconds::Parsed(i as f64 * 0.25),
            graph_name: format!("G{}", i),
        })
        .collect()
}

fn bench_parse_runtime(c: &mut Criterion) {
    c.bench_function("parse_runtime", |b| {
        b.iter(|| parse_runtime(black_box("00:01:30.1234567")))
    });
}

fn bench_summarize(c: &mut Criterion) {
    let records = records(10_000);
    c.bench_function("summarize 10k", |b| b.iter(|| summarize(black_box(&records))));
}

criterion_group!(benches, bench_parse_runtime, bench_summarize);
criterion_main!(benches);
