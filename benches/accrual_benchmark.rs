use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lending_ledger::core::amount::ether;
use lending_ledger::engine::interest::InterestAccrualEngine;
use lending_ledger::simulation::script::replay;
use lending_ledger::simulation::stress_test::{generate_script_with, ScriptConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_compound_one_year(c: &mut Criterion) {
    c.bench_function("compound_365_days", |b| {
        b.iter(|| InterestAccrualEngine::compound(black_box(ether(50) + ether(1) / 2), 12, black_box(365)))
    });
}

fn bench_compound_ten_years(c: &mut Criterion) {
    c.bench_function("compound_3650_days", |b| {
        b.iter(|| InterestAccrualEngine::compound(black_box(ether(50) + ether(1) / 2), 12, black_box(3_650)))
    });
}

fn bench_replay_1000_steps(c: &mut Criterion) {
    let config = ScriptConfig {
        account_count: 20,
        step_count: 1_000,
        ..Default::default()
    };
    let script = generate_script_with(&config, &mut StdRng::seed_from_u64(42));

    c.bench_function("replay_1000_steps", |b| b.iter(|| replay(black_box(&script))));
}

criterion_group!(
    benches,
    bench_compound_one_year,
    bench_compound_ten_years,
    bench_replay_1000_steps
);
criterion_main!(benches);
