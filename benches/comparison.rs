use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use group_pool::GroupPool;
use rayon::prelude::*;

const THREADS: usize = 4;

// fixed-amount synthetic compute, branchy enough to resist optimisation
fn compute(seed: u64) -> u64 {
    let mut sum = 0u64;
    let mut x = seed;
    for _ in 0..10_000 {
        x = x.wrapping_mul(1664525).wrapping_add(1013904223);
        sum = sum.wrapping_add(x);
        if x % 3 == 0 {
            sum = sum.wrapping_mul(17);
        }
    }
    sum
}

fn results(n: usize) -> Arc<Vec<AtomicU64>> {
    Arc::new((0..n).map(|_| AtomicU64::new(0)).collect())
}

fn bench_fanout_trivial(c: &mut Criterion) {
    let mut group = c.benchmark_group("fanout_trivial");

    for size in [100usize, 1000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("group_pool", size), &size, |b, &size| {
            let pool = GroupPool::new(THREADS, size);
            let out = results(size);
            b.iter(|| {
                let jobs = pool.new_job_group();
                for i in 0..size {
                    let out = Arc::clone(&out);
                    pool.add_job(jobs, move |_scope, _probe| {
                        out[i].store(42, Ordering::Relaxed);
                        Ok(())
                    })
                    .unwrap();
                }
                pool.wait(jobs).unwrap();
                black_box(&out);
            });
        });

        group.bench_with_input(BenchmarkId::new("rayon", size), &size, |b, &size| {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(THREADS)
                .build()
                .unwrap();
            let out = results(size);
            b.iter(|| {
                pool.scope(|s| {
                    for i in 0..size {
                        let out = Arc::clone(&out);
                        s.spawn(move |_| {
                            out[i].store(42, Ordering::Relaxed);
                        });
                    }
                });
                black_box(&out);
            });
        });
    }

    group.finish();
}

fn bench_range_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_compute");
    let size = 1000usize;
    group.throughput(Throughput::Elements(size as u64));

    group.bench_function(BenchmarkId::new("group_pool", size), |b| {
        let pool = GroupPool::new(THREADS, size);
        let out = results(size);
        b.iter(|| {
            let jobs = pool.new_job_group();
            let out_ref = Arc::clone(&out);
            pool.add_range_job(0, size, jobs, move |i, _scope, _probe| {
                out_ref[i].store(compute(i as u64), Ordering::Relaxed);
                Ok(())
            })
            .unwrap();
            pool.wait(jobs).unwrap();
            black_box(&out);
        });
    });

    group.bench_function(BenchmarkId::new("rayon", size), |b| {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(THREADS)
            .build()
            .unwrap();
        b.iter(|| {
            let out: Vec<u64> = pool.install(|| {
                (0..size)
                    .into_par_iter()
                    .map(|i| compute(i as u64))
                    .collect()
            });
            black_box(out);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_fanout_trivial, bench_range_compute);
criterion_main!(benches);
