//! Benchmark for the full assessment pipeline.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use splitmap::facts::meta;
use splitmap::{run_assessment, FactBatch, RawFact, SplitmapConfig};
use std::hint::black_box;

const TEAMS: [&str; 4] = ["checkout", "payments", "search", "identity"];

/// A layered codebase: `services` groups of `width` units with dense
/// internal references and a thin chain of calls between groups.
fn synthetic_codebase(services: usize, width: usize) -> Vec<FactBatch> {
    (0..services)
        .map(|s| {
            let team = TEAMS[s % TEAMS.len()];
            let names: Vec<String> = (0..width)
                .map(|u| format!("Svc{s:03}.Unit{u:03}"))
                .collect();
            let mut facts: Vec<RawFact> = names
                .iter()
                .map(|n| RawFact::declaration(n.as_str()).meta(meta::TEAM, team))
                .collect();
            for (i, from) in names.iter().enumerate() {
                let next = names[(i + 1) % width].as_str();
                facts.push(RawFact::reference(from.as_str(), next));
                facts.push(RawFact::table_access(
                    from.as_str(),
                    format!("svc{s}_table{}", i % 3),
                ));
            }
            if s + 1 < services {
                let downstream = format!("Svc{:03}.Unit000", s + 1);
                facts.push(RawFact::call(names[0].as_str(), downstream));
            }
            FactBatch::new(format!("svc{s:03}.jsonl"), facts)
        })
        .collect()
}

fn benchmark_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("assessment");
    group.sample_size(20);
    let config = SplitmapConfig::default();

    for services in [10, 50, 200] {
        let batches = synthetic_codebase(services, 12);
        group.bench_with_input(
            BenchmarkId::new("run_assessment", services),
            &batches,
            |b, batches| {
                b.iter(|| {
                    let result = run_assessment(black_box(batches), 25, &config);
                    black_box(result)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_full_pipeline);
criterion_main!(benches);
