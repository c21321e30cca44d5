use blockwarden::core::config::SimConfig;
use blockwarden::core::notify::NullSink;
use blockwarden::core::types::{ResourceKind, TenantKind};
use blockwarden::events::{EventBook, EventScheduler};
use blockwarden::sim::run_day;
use blockwarden::world::WorldState;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

fn seeded_setup(tenants: usize) -> (WorldState, EventScheduler, SimConfig) {
    let config = SimConfig::default();
    let scheduler = EventScheduler::new(EventBook::with_defaults(), &config);
    let mut world = WorldState::new(7, &config);

    for _ in 0..tenants {
        world.building.add_room();
    }
    for i in 0..tenants {
        let kind = TenantKind::ALL[i % TenantKind::ALL.len()];
        world.hire_tenant(&format!("t{}", i), kind, &config);
    }
    for kind in ResourceKind::ALL {
        world.ledger.set_stock(kind, 1_000);
    }
    (world, scheduler, config)
}

fn bench_day(c: &mut Criterion) {
    let mut group = c.benchmark_group("day");

    for tenants in [4usize, 16, 64] {
        group.bench_with_input(
            BenchmarkId::new("tenants", tenants),
            &tenants,
            |b, &tenants| {
                b.iter_batched(
                    || seeded_setup(tenants),
                    |(mut world, scheduler, config)| {
                        run_day(&mut world, &scheduler, &config, &mut NullSink);
                    },
                    BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

criterion_group!(day_benches, bench_day);
criterion_main!(day_benches);
