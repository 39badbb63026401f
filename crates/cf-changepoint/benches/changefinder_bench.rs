use cf_changepoint::{ArSolver, ChangeFinder, ChangeFinderParameters, Sst, SstParameters};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;

/// Generate normal data
fn generate_normal_data(size: usize, mean: f64, std: f64, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let normal = Normal::new(mean, std).unwrap();
    (0..size).map(|_| normal.sample(&mut rng)).collect()
}

fn bench_changefinder_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("ChangeFinder");
    let data = generate_normal_data(1000, 0.0, 1.0, 42);

    for k in [1, 4, 16] {
        for solver in [ArSolver::Levinson, ArSolver::Toeplitz, ArSolver::Burg] {
            let params = ChangeFinderParameters::new(0.05, k, 10, 5).with_solver(solver);
            group.bench_with_input(
                BenchmarkId::new(format!("update/{:?}", solver), k),
                &data,
                |b, data| {
                    b.iter(|| {
                        let mut finder = ChangeFinder::new(params.clone()).unwrap();
                        for &x in data {
                            black_box(finder.update(x).unwrap());
                        }
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_sst(c: &mut Criterion) {
    let mut group = c.benchmark_group("SST");
    let data = generate_normal_data(400, 0.0, 1.0, 7);

    for window in [10, 30, 50] {
        let exact = SstParameters::new(window, 3);
        let iterative = SstParameters::new(window, 3).iterative();

        for (name, params) in [("exact", exact), ("iterative", iterative)] {
            group.bench_with_input(BenchmarkId::new(name, window), &data, |b, data| {
                let mut sst = Sst::new(params.clone()).unwrap();
                b.iter(|| sst.scan(black_box(data)).unwrap())
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_changefinder_update, bench_sst);
criterion_main!(benches);
