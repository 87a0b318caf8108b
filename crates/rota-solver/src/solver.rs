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

//! # Parallel Subtree Solver
//!
//! A high-level orchestrator that splits the search tree at the root, runs
//! the resulting subtrees in parallel, shares the incumbent between them and
//! enforces a single wall-clock deadline.
//!
//! ## Highlights
//!
//! - Root splitting:
//!   - `rota_bnb::split::split_root` propagates the root and branches it once.
//!   - Each child is a job whose rank is its position in sequential order.
//! - Parallel execution:
//!   - Worker threads are spawned with `std::thread::scope` and pull jobs from
//!     an atomic counter, so the cheap jobs do not strand a thread.
//!   - Every job runs behind a `CompositeMonitor<T>` with an interrupt monitor
//!     and a deadline monitor. All jobs share one absolute deadline.
//!   - Results travel back over a `crossbeam-channel` channel.
//! - Shared state:
//!   - `SharedIncumbent<T>` stores the best solution and the rank that found it.
//!     Ties on the objective go to the lower rank, which makes the returned
//!     assignment identical to that of a sequential search.
//! - Outcome construction:
//!   - `Optimal` if every job finished and a solution exists.
//!   - `Infeasible` if every job finished without a solution.
//!   - `Feasible` or `Unknown` if some job was aborted.
//!
//! ## Usage
//!
//! ```rust
//! use rota_model::model::ModelBuilder;
//! use rota_solver::solver::SolverBuilder;
//! use std::time::Duration;
//!
//! let mut builder = ModelBuilder::<i64>::new();
//! builder
//!     .add_workers(["A", "B"])
//!     .set_worker_capacity("A", 8)
//!     .set_worker_capacity("B", 8)
//!     .add_shift("S1")
//!     .set_shift_hours("S1", 4)
//!     .set_availability("A", "S1", true)
//!     .set_availability("B", "S1", true);
//! let model = builder.build().unwrap();
//!
//! let solver = SolverBuilder::new()
//!     .with_time_limit(Duration::from_secs(5))
//!     .with_threads(2)
//!     .build();
//! let outcome = solver.solve(&model);
//! assert!(outcome.is_optimal());
//! assert_eq!(outcome.solution().unwrap().objective_value(), 4);
//! ```

use crate::config::SolverConfig;
use rota_bnb::{
    bound::UncoveredHoursBound,
    branching::mrv::MostConstrainedShiftBuilder,
    split::{RootSplit, split_root},
    subtree::BnbSubtreeSolver,
};
use rota_model::{fixed::FixedAssignment, model::Model, solution::Solution};
use rota_search::{
    incumbent::SharedIncumbent,
    monitor::{
        composite::CompositeMonitor,
        deadline::{DEADLINE_REACHED, DeadlineMonitor},
        interrupt::{INTERRUPTED, InterruptMonitor},
    },
    num::SolverNumeric,
    result::{SolverOutcome, TerminationReason},
    stats::{SolverStatistics, SolverStatisticsBuilder},
    subtree::{SubtreeSolver, SubtreeSolverContext, SubtreeSolverResult},
};
use std::{
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::{Duration, Instant},
};
use tracing::{debug, info};

/// Upper limit for deadlines, guarding `Instant` arithmetic against overflow.
const MAX_TIME_LIMIT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// The outcome of a single job, tagged with its rank.
#[derive(Debug)]
struct JobReport<T>
where
    T: SolverNumeric,
{
    rank: usize,
    result: SubtreeSolverResult<T>,
}

#[derive(Debug)]
pub struct Solver {
    time_limit: Duration,
    threads: usize,
    clock_check_mask: u64,
    progress_log: Option<Duration>,
    /// Shared flag to signal all jobs to stop.
    stop_signal: AtomicBool,
}

impl Solver {
    #[inline]
    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }

    #[inline]
    pub fn clock_check_mask(&self) -> u64 {
        self.clock_check_mask
    }

    /// Asks the running solve, or the next one, to stop as soon as possible.
    /// The flag is cleared when that solve returns.
    #[inline]
    pub fn interrupt(&self) {
        self.stop_signal.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_interrupted(&self) -> bool {
        self.stop_signal.load(Ordering::Relaxed)
    }

    pub fn solve<T>(&self, model: &Model<T>) -> SolverOutcome<T>
    where
        T: SolverNumeric,
    {
        let start_time = Instant::now();
        let deadline = start_time
            .checked_add(self.time_limit.min(MAX_TIME_LIMIT))
            .unwrap_or(start_time);

        let mut root_builder = MostConstrainedShiftBuilder::preallocated(model.num_workers());
        let outcome = match split_root(model, &mut root_builder) {
            RootSplit::Infeasible(contradiction) => {
                debug!(event = "root_infeasible", reason = %contradiction);
                SolverOutcome::infeasible(self.root_statistics(start_time))
            }
            RootSplit::Solved(solution) => {
                debug!(event = "root_solved", objective = %solution.objective_value());
                SolverOutcome::optimal(solution, self.root_statistics(start_time))
            }
            RootSplit::Branches(jobs) => {
                let num_threads = self.threads.min(jobs.len()).max(1);
                info!(
                    event = "solve_started",
                    workers = model.num_workers(),
                    shifts = model.num_shifts(),
                    variables = model.num_variables(),
                    jobs = jobs.len(),
                    threads = num_threads,
                    time_limit_ms = self.time_limit.as_millis() as u64,
                );
                let reports = self.run_jobs(model, &jobs, num_threads, deadline);
                self.construct_outcome(start_time, num_threads, jobs.len(), reports)
            }
        };

        self.stop_signal.store(false, Ordering::Relaxed);

        let objective = outcome
            .solution()
            .map(|s| s.objective_value().to_string())
            .unwrap_or_else(|| "none".to_string());
        info!(
            event = "solve_finished",
            result = %outcome.result(),
            objective = %objective,
            statistics = %outcome.statistics(),
        );

        outcome
    }

    fn subtree_solver<T>(
        &self,
        model: &Model<T>,
    ) -> BnbSubtreeSolver<T, MostConstrainedShiftBuilder, UncoveredHoursBound>
    where
        T: SolverNumeric,
    {
        let solver = BnbSubtreeSolver::preallocated(
            model.num_workers(),
            model.num_shifts(),
            model.num_variables(),
            MostConstrainedShiftBuilder::preallocated(model.num_workers()),
            UncoveredHoursBound::new(),
        );
        match self.progress_log {
            Some(interval) => solver.with_progress_log(interval, self.clock_check_mask),
            None => solver,
        }
    }

    /// Spawns the worker threads and collects one report per job, sorted by rank.
    fn run_jobs<T>(
        &self,
        model: &Model<T>,
        jobs: &[FixedAssignment],
        num_threads: usize,
        deadline: Instant,
    ) -> Vec<JobReport<T>>
    where
        T: SolverNumeric,
    {
        let incumbent = SharedIncumbent::<T>::new();
        let next_job = AtomicUsize::new(0);
        let (sender, receiver) = crossbeam_channel::unbounded::<JobReport<T>>();

        std::thread::scope(|scope| {
            for thread_index in 0..num_threads {
                let sender = sender.clone();
                let incumbent = &incumbent;
                let next_job = &next_job;

                scope.spawn(move || {
                    let mut subtree_solver = self.subtree_solver(model);

                    loop {
                        let rank = next_job.fetch_add(1, Ordering::Relaxed);
                        let Some(fixed) = jobs.get(rank) else {
                            break;
                        };

                        let result = self.run_job(
                            &mut subtree_solver,
                            model,
                            incumbent,
                            rank,
                            fixed,
                            deadline,
                        );
                        debug!(
                            event = "job_finished",
                            thread = thread_index,
                            rank = rank,
                            root = %fixed,
                            result = %result.result(),
                            nodes = result.nodes_explored(),
                        );

                        if sender.send(JobReport { rank, result }).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(sender);

        let mut reports: Vec<JobReport<T>> = receiver.into_iter().collect();
        reports.sort_unstable_by_key(|report| report.rank);
        reports
    }

    fn run_job<T>(
        &self,
        subtree_solver: &mut BnbSubtreeSolver<T, MostConstrainedShiftBuilder, UncoveredHoursBound>,
        model: &Model<T>,
        incumbent: &SharedIncumbent<T>,
        rank: usize,
        fixed: &FixedAssignment,
        deadline: Instant,
    ) -> SubtreeSolverResult<T>
    where
        T: SolverNumeric,
    {
        if self.stop_signal.load(Ordering::Relaxed) {
            return SubtreeSolverResult::aborted(None, INTERRUPTED);
        }
        if Instant::now() >= deadline {
            return SubtreeSolverResult::aborted(None, DEADLINE_REACHED);
        }

        let mut monitor = CompositeMonitor::<T>::with_capacity(2);
        monitor.add_monitor(InterruptMonitor::new(&self.stop_signal));
        monitor.add_monitor(DeadlineMonitor::with_clock_check_mask(
            deadline,
            self.clock_check_mask,
        ));

        let context = SubtreeSolverContext::new(
            model,
            incumbent,
            &mut monitor,
            rank,
            std::slice::from_ref(fixed),
        );
        subtree_solver.solve(context)
    }

    fn root_statistics(&self, start_time: Instant) -> SolverStatistics {
        SolverStatisticsBuilder::new()
            .nodes_explored(1)
            .solve_duration(start_time.elapsed())
            .build()
    }

    /// Picks the best reported solution: highest objective, then lowest rank.
    fn find_best_solution<T>(reports: &[JobReport<T>]) -> Option<Solution<T>>
    where
        T: SolverNumeric,
    {
        reports
            .iter()
            .filter_map(|report| report.result.result().solution().map(|s| (report.rank, s)))
            .max_by(|(rank_a, a), (rank_b, b)| {
                a.objective_value()
                    .cmp(&b.objective_value())
                    .then_with(|| rank_b.cmp(rank_a))
            })
            .map(|(_, solution)| solution.clone())
    }

    fn construct_outcome<T>(
        &self,
        start_time: Instant,
        num_threads: usize,
        num_jobs: usize,
        reports: Vec<JobReport<T>>,
    ) -> SolverOutcome<T>
    where
        T: SolverNumeric,
    {
        let completed = reports
            .iter()
            .filter(|report| report.result.is_complete())
            .count();
        let stats = SolverStatisticsBuilder::new()
            .solutions_found(reports.iter().map(|r| r.result.solutions_found()).sum())
            .used_threads(num_threads)
            .subtrees_total(num_jobs)
            .subtrees_completed(completed)
            .nodes_explored(reports.iter().map(|r| r.result.nodes_explored()).sum())
            .max_memory_bytes(
                reports
                    .iter()
                    .map(|r| r.result.max_memory_bytes())
                    .max()
                    .unwrap_or(0),
            )
            .solve_duration(start_time.elapsed())
            .build();

        let best_solution = Self::find_best_solution(&reports);

        if stats.is_exhaustive() {
            return match best_solution {
                Some(solution) => SolverOutcome::optimal(solution, stats),
                None => SolverOutcome::infeasible(stats),
            };
        }

        SolverOutcome::aborted(best_solution, Self::determine_abort_reason(&reports), stats)
    }

    fn determine_abort_reason<T>(reports: &[JobReport<T>]) -> String
    where
        T: SolverNumeric,
    {
        reports
            .iter()
            .find_map(|report| match report.result.termination_reason() {
                TerminationReason::Aborted(msg) => Some(msg.clone()),
                _ => None,
            })
            .unwrap_or_else(|| "not every subtree was searched".to_string())
    }
}

#[derive(Debug, Clone)]
pub struct SolverBuilder {
    time_limit: Duration,
    threads: usize,
    clock_check_mask: u64,
    progress_log: Option<Duration>,
}

impl Default for SolverBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SolverBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::from_config(&SolverConfig::default())
    }

    /// Creates a builder that mirrors the given configuration.
    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            time_limit: config.time_limit(),
            threads: config.resolved_threads(),
            clock_check_mask: config.clock_check_mask,
            progress_log: config.log_progress.then(|| config.log_interval()),
        }
    }

    #[inline]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    /// Sets the number of threads. `0` uses the available parallelism.
    #[inline]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = match threads {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            n => n,
        };
        self
    }

    #[inline]
    pub fn with_clock_check_mask(mut self, clock_check_mask: u64) -> Self {
        self.clock_check_mask = clock_check_mask;
        self
    }

    #[inline]
    pub fn with_progress_log(mut self, interval: Duration) -> Self {
        self.progress_log = Some(interval);
        self
    }

    #[inline]
    pub fn build(self) -> Solver {
        Solver {
            time_limit: self.time_limit,
            threads: self.threads.max(1),
            clock_check_mask: self.clock_check_mask,
            progress_log: self.progress_log,
            stop_signal: AtomicBool::new(false),
        }
    }
}
