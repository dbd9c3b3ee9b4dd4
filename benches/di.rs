use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use keyed_di::*;
use std::sync::Arc;

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let container = register([("answer", Registration::from_value(42u64))])
        .unwrap()
        .build();

    // Prime the singleton
    let _ = container.get::<u64>("answer").unwrap();

    c.bench_function("singleton_hit_u64", |b| {
        b.iter(|| {
            let v = container.get::<u64>(black_box("answer")).unwrap();
            black_box(v);
        })
    });
}

fn bench_singleton_cold(c: &mut Criterion) {
    struct ExpensiveToCreate {
        data: Vec<u64>,
    }

    c.bench_function("singleton_cold_expensive", |b| {
        b.iter_batched(
            || {
                register([(
                    "expensive",
                    Registration::from_fn(|_| ExpensiveToCreate {
                        data: (0..1000).collect(),
                    }),
                )])
                .unwrap()
                .build()
            },
            |container| {
                let v = container.get::<ExpensiveToCreate>("expensive").unwrap();
                black_box(v.data.len());
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_scoped_vs_transient(c: &mut Criterion) {
    struct Service {
        data: [u8; 64],
    }

    let mut group = c.benchmark_group("scoped_vs_transient");

    let container = register([
        ("scoped", Registration::from_fn(|_| Service { data: [0; 64] }).scoped()),
        ("transient", Registration::from_fn(|_| Service { data: [0; 64] }).transient()),
    ])
    .unwrap()
    .build();
    let scope = container.scope();

    group.bench_function("scoped_hit", |b| {
        b.iter(|| {
            let v = scope.get::<Service>("scoped").unwrap();
            black_box(&v.data);
        })
    });

    group.bench_function("transient", |b| {
        b.iter(|| {
            let v = scope.get::<Service>("transient").unwrap();
            black_box(&v.data);
        })
    });

    group.finish();
}

fn bench_scope_lifecycle(c: &mut Criterion) {
    struct Session(u64);

    let mut group = c.benchmark_group("scope_lifecycle");

    let container = register([
        ("config", Registration::from_value(7u64)),
        (
            "session",
            Registration::from_fn(|deps| Session(*deps.get_required::<u64>("config"))).scoped(),
        ),
    ])
    .unwrap()
    .build();

    group.bench_function("create_drop", |b| {
        b.iter(|| {
            let scope = container.scope();
            black_box(&scope);
        })
    });

    group.bench_function("create_resolve_dispose", |b| {
        b.iter(|| {
            let scope = container.scope();
            let session = scope.get::<Session>("session").unwrap();
            black_box(session.0);
            scope.dispose();
        })
    });

    group.finish();
}

fn bench_chain_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_depth");

    for &depth in &[1usize, 8, 32] {
        let links = (1..=depth).map(|i| {
            let below = format!("link{}", i - 1);
            (
                format!("link{i}"),
                Registration::from_fn(move |deps| *deps.get_required::<usize>(&below) + 1).transient(),
            )
        });
        let container = register(links)
            .unwrap()
            .register([("link0", Registration::from_value(0usize))])
            .unwrap()
            .build_with(ContainerOptions::new().max_depth(64))
            .unwrap();
        let top = format!("link{depth}");

        group.bench_with_input(BenchmarkId::new("transient_chain", depth), &depth, |b, _| {
            b.iter(|| {
                let v = container.get::<usize>(&top).unwrap();
                black_box(v);
            })
        });
    }

    group.finish();
}

fn bench_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention");

    let container = register([("answer", Registration::from_value(42u64))])
        .unwrap()
        .build();

    // Prime the singleton
    let _ = container.get::<u64>("answer").unwrap();

    for &thread_count in &[1, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("singleton_threads", thread_count),
            &thread_count,
            |b, &threads| {
                b.iter_custom(|iters| {
                    let start = std::time::Instant::now();
                    crossbeam_utils::thread::scope(|s| {
                        for _ in 0..threads {
                            let container = &container;
                            s.spawn(move |_| {
                                for _ in 0..iters / threads as u64 {
                                    let v = container.get::<u64>("answer").unwrap();
                                    black_box(v);
                                }
                            });
                        }
                    })
                    .unwrap();
                    start.elapsed()
                })
            },
        );
    }

    group.finish();
}

// ===== Macro Benchmarks =====

fn bench_large_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("large_registry");

    for &service_count in &[10, 100, 1000] {
        let filler = (0..service_count).map(|i| (format!("service{i}"), Registration::from_value(i as u32)));
        let container = register(filler)
            .unwrap()
            .register([("answer", Registration::from_value(42u64))])
            .unwrap()
            .build();

        group.bench_with_input(
            BenchmarkId::new("resolve_from_large_registry", service_count),
            &service_count,
            |b, _| {
                b.iter(|| {
                    let v = container.get::<u64>("answer").unwrap();
                    black_box(v);
                })
            },
        );
    }

    group.finish();
}

fn bench_mixed_workload(c: &mut Criterion) {
    // 70% singleton hits, 20% scoped hits, 10% transient
    struct SingletonService(u64);
    struct ScopedService(u64);
    struct TransientService(u64);

    let container = register([
        ("singleton", Registration::from_value(SingletonService(1))),
        ("scoped", Registration::from_fn(|_| ScopedService(2)).scoped()),
        ("transient", Registration::from_fn(|_| TransientService(3)).transient()),
    ])
    .unwrap()
    .build();
    let scope = container.scope();

    // Prime services
    let _ = scope.get::<SingletonService>("singleton").unwrap();
    let _: Arc<ScopedService> = scope.get("scoped").unwrap();

    c.bench_function("mixed_workload_realistic", |b| {
        b.iter(|| {
            for _ in 0..7 {
                let v = scope.get::<SingletonService>("singleton").unwrap();
                black_box(v.0);
            }

            for _ in 0..2 {
                let v = scope.get::<ScopedService>("scoped").unwrap();
                black_box(v.0);
            }

            let v = scope.get::<TransientService>("transient").unwrap();
            black_box(v.0);
        })
    });
}

criterion_group!(
    micro_benches,
    bench_singleton_hit,
    bench_singleton_cold,
    bench_scoped_vs_transient,
    bench_scope_lifecycle,
    bench_chain_depth,
    bench_contention
);

criterion_group!(macro_benches, bench_large_registry, bench_mixed_workload);

criterion_main!(micro_benches, macro_benches);
