//! Benchmarks for marketplace ledger operations.

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use reef_core::Principal;
use reef_market::{split_payment, Marketplace, Resources, Treasury};

fn bench_split_payment(c: &mut Criterion) {
    c.bench_function("split_payment", |b| {
        b.iter(|| split_payment(black_box(1_000_000_007), black_box(5)));
    });
}

fn bench_job_lifecycle(c: &mut Criterion) {
    c.bench_function("post_assign_start_complete", |b| {
        let owner = Principal::new("owner");
        let provider = Principal::new("provider-1");
        let client = Principal::new("client-1");

        b.iter(|| {
            let mut market = Marketplace::new(owner.clone());
            let mut treasury = Treasury::new();
            let now = Utc::now();

            market
                .register_provider(&provider, "bench", Resources::new(8, 16, 100), 10, now)
                .unwrap();
            let id = market
                .post_job(&client, "bench job", Resources::new(4, 8, 0), 2, 1000, now)
                .unwrap();
            market.assign_job(&client, id, &provider, now).unwrap();
            market.start_job(&provider, id, now).unwrap();
            market
                .complete_job_and_pay(&client, id, 90, now, &mut treasury)
                .unwrap();
            black_box(market.escrow_total())
        });
    });
}

fn bench_registry_growth(c: &mut Criterion) {
    c.bench_function("register_100_providers", |b| {
        let owner = Principal::new("owner");
        b.iter(|| {
            let mut market = Marketplace::new(owner.clone());
            let now = Utc::now();
            for i in 0..100 {
                let p = Principal::new(format!("provider-{i}"));
                market
                    .register_provider(&p, "bench", Resources::new(8, 16, 100), 10, now)
                    .unwrap();
            }
            black_box(market.active_providers().len())
        });
    });
}

criterion_group!(
    benches,
    bench_split_payment,
    bench_job_lifecycle,
    bench_registry_growth
);
criterion_main!(benches);
