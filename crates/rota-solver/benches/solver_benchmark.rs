// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.


use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rota_bnb::{
    bnb::BnbSolver, bound::UncoveredHoursBound, branching::mrv::MostConstrainedShiftBuilder,
    monitor::no_op::NoOperationMonitor,
};
use rota_model::model::{Model, ModelBuilder};
use rota_solver::solver::SolverBuilder;
use std::hint::black_box;
use std::time::Duration;

/// Random instance where every worker can take about 60% of the shifts and
/// capacities leave a little slack over an even split.
fn random_model(num_workers: usize, num_shifts: usize, seed: u64) -> Model<i64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = ModelBuilder::<i64>::new();

    let mut total_hours = 0;
    for s in 0..num_shifts {
        let hours = rng.random_range(2..=8);
        total_hours += hours;
        let id = format!("S{s}");
        builder.add_shift(id.as_str()).set_shift_hours(id.as_str(), hours);
    }

    let fair_share = total_hours / num_workers as i64;
    for w in 0..num_workers {
        let id = format!("W{w}");
        let capacity = fair_share + rng.random_range(4..=12);
        builder
            .add_worker(id.as_str())
            .set_worker_capacity(id.as_str(), capacity);
        for s in 0..num_shifts {
            if rng.random_bool(0.6) {
                builder.set_availability(id.as_str(), format!("S{s}"), true);
            }
        }
    }

    for _ in 0..num_shifts / 4 {
        let a = rng.random_range(0..num_shifts);
        let b = rng.random_range(0..num_shifts);
        if a != b {
            builder.add_forbidden_pair(format!("S{a}"), format!("S{b}"));
        }
    }

    builder
        .build()
        .unwrap_or_else(|e| panic!("benchmark instance is invalid: {e}"))
}

fn bench_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("bnb_sequential");

    for &(num_workers, num_shifts) in &[(4, 10), (6, 16), (8, 24)] {
        let model = random_model(num_workers, num_shifts, 42);
        let label = format!("{num_workers}x{num_shifts}");

        let mut solver = BnbSolver::preallocated(
            model.num_workers(),
            model.num_shifts(),
            model.num_variables(),
        );
        let mut builder = MostConstrainedShiftBuilder::preallocated(model.num_workers());
        let mut bound = UncoveredHoursBound::new();

        group.throughput(Throughput::Elements(model.num_variables() as u64));
        group.bench_with_input(BenchmarkId::new("mrv", &label), &model, |b, model| {
            b.iter(|| {
                let outcome = solver.solve(
                    black_box(model),
                    &mut builder,
                    &mut bound,
                    NoOperationMonitor::new(),
                );
                black_box(outcome.statistics().nodes_explored)
            })
        });
    }
    group.finish();
}

fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("subtree_parallel");
    let model = random_model(8, 24, 42);

    for threads in [1, 2, 4] {
        let solver = SolverBuilder::new()
            .with_time_limit(Duration::from_secs(30))
            .with_threads(threads)
            .build();

        group.bench_with_input(BenchmarkId::new("threads", threads), &model, |b, model| {
            b.iter(|| black_box(solver.solve(black_box(model)).statistics().nodes_explored))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sequential, bench_parallel);
criterion_main!(benches);
